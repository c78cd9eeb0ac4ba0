pub mod http;
pub mod response;

pub use http::*;
pub use response::*;

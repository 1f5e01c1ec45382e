mod implementation;
mod service;

pub use implementation::*;
pub use service::*;

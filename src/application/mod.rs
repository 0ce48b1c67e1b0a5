// Application layer - use cases the host UI calls into

pub mod error;
mod imports;
mod service;

pub use error::*;
pub use imports::*;
pub use service::*;

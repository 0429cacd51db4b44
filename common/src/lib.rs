pub mod config;
pub mod err;
pub mod log;

pub use err::{EngineError, Result};

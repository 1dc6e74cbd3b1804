//! Fundlift Core - shared error, configuration and logging primitives
//!
//! Every other crate in the workspace builds on the types defined here

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tracing;

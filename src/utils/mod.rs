//! Shared utilities

pub mod error;

pub use error::{AuthzError, Result};

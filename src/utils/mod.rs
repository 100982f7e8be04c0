pub mod error;
pub mod logger;
pub mod signal;
pub mod validation;

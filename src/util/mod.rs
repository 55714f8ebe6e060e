//! Utility functions and helpers
//!
//! ## Modules
//!
//! - [`retry`] - Exponential backoff shared by every upstream call

pub mod retry;

//! NetGuard Application Layer
//!
//! Ports (traits) the infrastructure implements, plus the thin use cases
//! that orchestrate them.
pub mod ports;
pub mod use_cases;

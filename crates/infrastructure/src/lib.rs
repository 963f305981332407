//! NetGuard Infrastructure Layer
//!
//! Concrete implementations of the application ports: the SQLite rule store,
//! the in-memory filter engine, the NFQUEUE listener, the feed pipeline, the
//! scan coordinator and the ONNX classifier.
pub mod analysis;
pub mod database;
pub mod feeds;
pub mod filter;
pub mod inference;
pub mod packet;
pub mod repositories;

//! HTTP layer: thin plumbing around the detection engine.

pub mod anomaly;
pub mod server;
pub mod types;

pub use server::ApiServer;

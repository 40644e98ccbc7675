//! HTTP API layer.
//!
//! Maps each endpoint onto exactly one store operation and shapes the result
//! as JSON.

mod server;
pub mod tasks;

pub use server::{API_VERSION, ApiServer, SERVICE_NAME, ServerHandle, build_router, start_server};

//! Lumen Infrastructure Library
//!
//! Shared infrastructure used by the Lumen binaries:
//! - Tracing initialization
//! - HTTP middleware (request ID)

pub mod middleware;
pub mod telemetry;

pub use middleware::{get_request_id, request_id_middleware, RequestId};
pub use telemetry::{init_telemetry, LogFormat};

//! Scorpia Gateway - HTTP request/response boundary around one kernel

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{router, start_gateway, GatewayState, IngestRequest};

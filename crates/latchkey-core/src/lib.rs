//! Ambient helpers shared by Latchkey services: health endpoints, request-id
//! middleware, tracing setup, and timestamp serialization.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;

//! HTTP/JSON server for the Agora governance engine.
//!
//! Provides endpoints for:
//! - Proposal creation, activation and lookup
//! - Vote submission and vote queries
//! - Governance configuration management
//! - Liveness

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use handlers::RpcState;
pub use server::{router, RpcServer};

//! Agora node: opens storage, builds the governance engine, seeds
//! configuration, serves the RPC surface and shuts everything down cleanly.

pub mod config;
pub mod error;
pub mod node;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use node::AgoraNode;
pub use shutdown::ShutdownController;

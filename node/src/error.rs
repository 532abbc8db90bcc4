use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(#[from] agora_store_lmdb::LmdbError),

    #[error("governance error: {0}")]
    Governance(#[from] agora_governance::GovernanceError),

    #[error("RPC server error: {0}")]
    Rpc(#[from] agora_rpc::RpcError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

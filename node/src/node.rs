//! Node lifecycle: open storage, build the engine, serve, shut down.

use std::sync::Arc;
use std::time::Duration;

use agora_governance::{GovernanceEngine, NewGovernanceConfig};
use agora_rpc::RpcServer;
use agora_store_lmdb::LmdbEnvironment;
use agora_types::{Scope, SystemClock};
use tokio::task::JoinHandle;

use crate::config::NodeConfig;
use crate::shutdown::ShutdownController;
use crate::NodeError;

/// Timeout for waiting on background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AgoraNode {
    pub config: NodeConfig,
    env: LmdbEnvironment,
    engine: Arc<GovernanceEngine>,
    pub shutdown: Arc<ShutdownController>,
    task_handles: Vec<JoinHandle<()>>,
}

impl AgoraNode {
    /// Open the LMDB environment at `config.data_dir`, build the governance
    /// engine over it and install any missing bootstrap configurations.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())?;
        let engine = Arc::new(GovernanceEngine::new(
            Arc::new(env.governance_store()),
            Arc::new(SystemClock),
        ));
        seed_configs(&engine, &config.bootstrap_configs)?;

        Ok(Self {
            config,
            env,
            engine,
            shutdown: Arc::new(ShutdownController::new()),
            task_handles: Vec::new(),
        })
    }

    pub fn engine(&self) -> Arc<GovernanceEngine> {
        Arc::clone(&self.engine)
    }

    /// Spawn the node's services without blocking.
    pub fn spawn_services(&mut self) {
        if !self.config.enable_rpc {
            tracing::info!("RPC server disabled");
            return;
        }
        let server = RpcServer::new(
            self.config.rpc_host.clone(),
            self.config.rpc_port,
            self.engine(),
        );
        let mut shutdown_rx = self.shutdown.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::info!("RPC server shutting down");
                }
                result = server.start() => {
                    match result {
                        Ok(()) => tracing::info!("RPC server exited"),
                        Err(e) => tracing::error!(error = %e, "RPC server error"),
                    }
                }
            }
        });
        self.task_handles.push(handle);
    }

    /// Start all services, then block until a shutdown signal arrives.
    pub async fn start(&mut self) -> Result<(), NodeError> {
        tracing::info!(
            data_dir = %self.config.data_dir.display(),
            rpc = self.config.enable_rpc,
            rpc_addr = %format!("{}:{}", self.config.rpc_host, self.config.rpc_port),
            "Agora node starting"
        );
        self.spawn_services();
        tracing::info!("Agora node started");
        self.shutdown.wait_for_signal().await;
        Ok(())
    }

    /// Stop services, flush storage and wait for tasks to finish.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        tracing::info!("Agora node stopping");
        self.shutdown.shutdown();

        let handles: Vec<JoinHandle<()>> = self.task_handles.drain(..).collect();
        let wait_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all).await.is_err() {
            tracing::warn!(
                timeout = ?SHUTDOWN_TIMEOUT,
                "shutdown timeout, some tasks may still be running"
            );
        }

        self.env.sync()?;
        tracing::info!("LMDB flushed to disk");
        tracing::info!("Agora node stopped");
        Ok(())
    }
}

/// Create each bootstrap configuration whose scope has no active
/// configuration of its own. Existing configurations are never replaced.
fn seed_configs(
    engine: &GovernanceEngine,
    seeds: &[NewGovernanceConfig],
) -> Result<(), NodeError> {
    if seeds.is_empty() {
        return Ok(());
    }
    let existing = engine.list_governance_configs()?;
    let mut seeded: Vec<Scope> = existing
        .iter()
        .filter(|c| c.is_active)
        .map(|c| c.scope())
        .collect();

    for seed in seeds {
        let scope = Scope::from_org(seed.organization_id.as_ref());
        if !seed.is_active || seeded.contains(&scope) {
            tracing::debug!(%scope, "bootstrap config skipped");
            continue;
        }
        let config = engine.create_governance_config(seed.clone())?;
        tracing::info!(config = %config.id, %scope, "bootstrap config installed");
        seeded.push(scope);
    }
    Ok(())
}

//! RPC request/response types and axum handlers.
//!
//! Engine calls take per-proposal locks and hit storage synchronously, so
//! each one runs on the blocking pool.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use agora_governance::{
    GovernanceConfig, GovernanceEngine, GovernanceError, NewGovernanceConfig, NewProposal,
    Proposal, ScopeFilter, Vote, VoteChoice,
};
use agora_types::{ConfigId, OrganizationId, ProposalId, Scope, WalletAddress};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::RpcError;

/// Shared state handed to every handler.
pub struct RpcState {
    pub engine: Arc<GovernanceEngine>,
    pub started_at: Instant,
}

impl RpcState {
    pub fn new(engine: Arc<GovernanceEngine>) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }
}

type Shared = State<Arc<RpcState>>;

async fn run<T, F>(state: &RpcState, op: F) -> Result<T, RpcError>
where
    T: Send + 'static,
    F: FnOnce(&GovernanceEngine) -> Result<T, GovernanceError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || op(&engine))
        .await
        .map_err(|e| {
            error!(error = %e, "engine task failed");
            RpcError::Server(format!("engine task failed: {e}"))
        })?
        .map_err(RpcError::from)
}

fn parse<T>(raw: &str, what: &str) -> Result<T, RpcError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| RpcError::InvalidRequest(format!("{what}: {e}")))
}

fn parse_org(raw: Option<&str>) -> Result<Option<OrganizationId>, RpcError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| parse(s, "organization_id"))
        .transpose()
}

// ── Proposals ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub requester: WalletAddress,
    #[serde(flatten)]
    pub proposal: NewProposal,
}

#[derive(Debug, Deserialize)]
pub struct ActivateProposalRequest {
    pub requester: WalletAddress,
}

/// `?organization_id=` selects one organization; otherwise `?scope=global`
/// restricts to global proposals and `all` (the default) returns everything.
#[derive(Debug, Default, Deserialize)]
pub struct ListProposalsQuery {
    pub organization_id: Option<String>,
    pub scope: Option<String>,
}

impl ListProposalsQuery {
    pub fn filter(&self) -> Result<ScopeFilter, RpcError> {
        if let Some(org) = parse_org(self.organization_id.as_deref())? {
            return Ok(ScopeFilter::Organization(org));
        }
        match self.scope.as_deref() {
            None | Some("all") => Ok(ScopeFilter::All),
            Some("global") => Ok(ScopeFilter::Global),
            Some(other) => Err(RpcError::InvalidRequest(format!(
                "scope must be \"all\" or \"global\", got {other:?}"
            ))),
        }
    }
}

pub async fn create_proposal(
    State(state): Shared,
    Json(req): Json<CreateProposalRequest>,
) -> Result<(StatusCode, Json<Proposal>), RpcError> {
    let proposal = run(&state, move |engine| {
        engine.create_proposal(req.proposal, &req.requester)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

pub async fn activate_proposal(
    State(state): Shared,
    Path(id): Path<String>,
    Json(req): Json<ActivateProposalRequest>,
) -> Result<Json<Proposal>, RpcError> {
    let id: ProposalId = parse(&id, "proposal id")?;
    run(&state, move |engine| engine.activate_proposal(&id, &req.requester))
        .await
        .map(Json)
}

pub async fn list_proposals(
    State(state): Shared,
    Query(query): Query<ListProposalsQuery>,
) -> Result<Json<Vec<Proposal>>, RpcError> {
    let filter = query.filter()?;
    run(&state, move |engine| engine.list_proposals(&filter))
        .await
        .map(Json)
}

pub async fn get_proposal(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Proposal>, RpcError> {
    let id: ProposalId = parse(&id, "proposal id")?;
    run(&state, move |engine| engine.get_proposal(&id))
        .await
        .map(Json)
}

// ── Votes ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitVoteRequest {
    pub voter: WalletAddress,
    pub choice: VoteChoice,
}

pub async fn submit_vote(
    State(state): Shared,
    Path(id): Path<String>,
    Json(req): Json<SubmitVoteRequest>,
) -> Result<(StatusCode, Json<Vote>), RpcError> {
    let id: ProposalId = parse(&id, "proposal id")?;
    let vote = run(&state, move |engine| {
        engine.submit_vote(&id, &req.voter, req.choice)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

pub async fn get_votes(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Vec<Vote>>, RpcError> {
    let id: ProposalId = parse(&id, "proposal id")?;
    run(&state, move |engine| engine.get_votes_for_proposal(&id))
        .await
        .map(Json)
}

pub async fn get_voter_choice(
    State(state): Shared,
    Path((id, voter)): Path<(String, String)>,
) -> Result<Json<Option<Vote>>, RpcError> {
    let id: ProposalId = parse(&id, "proposal id")?;
    let voter: WalletAddress = parse(&voter, "voter")?;
    run(&state, move |engine| engine.get_voter_choice(&id, &voter))
        .await
        .map(Json)
}

// ── Governance configuration ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ConfigQuery {
    pub organization_id: Option<String>,
}

pub async fn create_config(
    State(state): Shared,
    Json(req): Json<NewGovernanceConfig>,
) -> Result<(StatusCode, Json<GovernanceConfig>), RpcError> {
    let config = run(&state, move |engine| engine.create_governance_config(req)).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

pub async fn list_configs(State(state): Shared) -> Result<Json<Vec<GovernanceConfig>>, RpcError> {
    run(&state, |engine| engine.list_governance_configs())
        .await
        .map(Json)
}

/// The configuration a new proposal in the given scope would copy.
pub async fn get_config(
    State(state): Shared,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<Option<GovernanceConfig>>, RpcError> {
    let scope = Scope::from_org(parse_org(query.organization_id.as_deref())?.as_ref());
    run(&state, move |engine| engine.get_governance_config(&scope))
        .await
        .map(Json)
}

pub async fn deactivate_config(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<GovernanceConfig>, RpcError> {
    let id: ConfigId = parse(&id, "config id")?;
    run(&state, move |engine| engine.deactivate_governance_config(&id))
        .await
        .map(Json)
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub uptime: String,
}

pub async fn health(State(state): Shared) -> Json<HealthResponse> {
    let uptime_secs = state.started_at.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok",
        uptime_secs,
        uptime: agora_utils::format_duration(uptime_secs),
    })
}

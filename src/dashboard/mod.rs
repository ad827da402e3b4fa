use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::config::DashboardConfig;
use crate::error::SlurmError;
use crate::jobs::{Job, JobState};
use crate::stats::counts::{self, PartitionSummary, Share, UserActivity};
use crate::stats::{CompletionBucket, Resources, Span};
use crate::Slurm;

const INDEX_HTML: &str = include_str!("index.html");
const DEFAULT_HISTORY_COUNT: usize = 7;
const DEFAULT_TOP_USERS: usize = 10;

#[derive(Clone)]
pub struct DashboardState {
    pub slurm: Arc<Slurm>,
    pub refresh_interval_ms: u64,
}

impl DashboardState {
    pub fn new(slurm: Slurm, config: &DashboardConfig) -> Self {
        Self {
            slurm: Arc::new(slurm),
            refresh_interval_ms: config.refresh_interval_ms,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Handler error carrying the HTTP status it maps to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<SlurmError> for ApiError {
    fn from(err: SlurmError) -> Self {
        let status = match &err {
            SlurmError::ToolUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SlurmError::InvalidArgument(_) | SlurmError::UnknownField { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
struct JobsResponse {
    jobs: Vec<Job>,
    state_counts: Vec<Share>,
    partitions: BTreeMap<String, PartitionSummary>,
}

#[derive(Serialize)]
struct JobDetailResponse {
    id: u64,
    state: JobState,
    info: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct PartitionResponse {
    partition: String,
    capacity: Resources,
    used: Resources,
    utilization: f64,
}

#[derive(Serialize)]
struct UsersResponse {
    top_users: Vec<Share>,
    activity: BTreeMap<String, UserActivity>,
}

#[derive(Deserialize)]
struct JobsParams {
    user: Option<String>,
}

#[derive(Deserialize)]
struct HistoryParams {
    span: Option<Span>,
    count: Option<usize>,
}

/// Build the dashboard routes. Exposed separately from
/// [`run_dashboard`] so the router can be driven without a socket.
pub fn router(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/jobs", get(list_jobs_handler))
        .route("/api/jobs/:id", get(job_detail_handler))
        .route("/api/partitions", get(partitions_handler))
        .route("/api/users", get(users_handler))
        .route("/api/fairshare", get(fairshare_handler))
        .route("/api/nodes", get(nodes_handler))
        .route("/api/history", get(history_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn run_dashboard(config: DashboardConfig, state: DashboardState, shutdown: CancellationToken) {
    let addr = config.listen_addr;
    let app = router(state);

    tracing::info!(addr = %addr, "Starting dashboard server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind dashboard server");
            return;
        }
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;
    match served {
        Ok(()) => tracing::info!("Dashboard server stopped"),
        Err(e) => tracing::error!(error = %e, "Dashboard server failed"),
    }
}

/// Run a blocking cluster query on the blocking pool.
async fn query<T, F>(state: &DashboardState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Slurm) -> crate::Result<T> + Send + 'static,
{
    let slurm = Arc::clone(&state.slurm);
    match tokio::task::spawn_blocking(move || f(&slurm)).await {
        Ok(result) => result.map(Json).map_err(|e| {
            tracing::warn!(error = %e, "Dashboard query failed");
            ApiError::from(e)
        }),
        Err(e) => {
            tracing::error!(error = %e, "Dashboard query task panicked");
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "query task failed".to_string(),
            })
        }
    }
}

async fn index_handler(State(state): State<DashboardState>) -> Html<String> {
    Html(INDEX_HTML.replace("{{REFRESH_MS}}", &state.refresh_interval_ms.to_string()))
}

async fn list_jobs_handler(
    State(state): State<DashboardState>,
    Query(params): Query<JobsParams>,
) -> ApiResult<JobsResponse> {
    query(&state, move |slurm| {
        let jobs = slurm.list_jobs(params.user.as_deref())?;
        Ok(JobsResponse {
            state_counts: counts::job_state_counts(&jobs),
            partitions: counts::partition_summaries(&jobs),
            jobs,
        })
    })
    .await
}

async fn job_detail_handler(
    State(state): State<DashboardState>,
    Path(id): Path<u64>,
) -> ApiResult<JobDetailResponse> {
    query(&state, move |slurm| {
        let state = slurm.job_state(id)?;
        let info = match slurm.job_info(id) {
            Ok(info) => info,
            Err(e) if e.is_unavailable() => {
                tracing::debug!(job_id = id, "scontrol unavailable, returning state only");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        Ok(JobDetailResponse { id, state, info })
    })
    .await
}

async fn partitions_handler(State(state): State<DashboardState>) -> ApiResult<Vec<PartitionResponse>> {
    query(&state, |slurm| {
        let capacity = slurm.partition_capacity()?;
        let usage = slurm.running_usage()?;
        Ok(capacity
            .into_iter()
            .map(|(partition, capacity)| {
                let used = usage.get(&partition).copied().unwrap_or_default();
                PartitionResponse {
                    utilization: crate::stats::utilization_percent(capacity, used),
                    partition,
                    capacity,
                    used,
                }
            })
            .collect())
    })
    .await
}

async fn users_handler(State(state): State<DashboardState>) -> ApiResult<UsersResponse> {
    query(&state, |slurm| {
        let jobs = slurm.list_jobs(None)?;
        Ok(UsersResponse {
            top_users: counts::top_users(&jobs, DEFAULT_TOP_USERS),
            activity: counts::user_activity(&jobs),
        })
    })
    .await
}

async fn fairshare_handler(State(state): State<DashboardState>) -> ApiResult<BTreeMap<String, f64>> {
    query(&state, |slurm| slurm.fairshare_scores()).await
}

async fn nodes_handler(State(state): State<DashboardState>) -> ApiResult<BTreeMap<String, u64>> {
    query(&state, |slurm| slurm.node_state_counts()).await
}

async fn history_handler(
    State(state): State<DashboardState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<CompletionBucket>> {
    let span = params.span.unwrap_or(Span::Day);
    let count = params.count.unwrap_or(DEFAULT_HISTORY_COUNT);
    query(&state, move |slurm| slurm.recent_completions(span, count)).await
}

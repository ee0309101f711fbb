//! HTTP and websocket routes (`spec.md` §6.1 boundary operations), grounded
//! on the router/handler shape in `atomic-api::server` and the websocket
//! upgrade handling in `atomic-api::websocket`.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_derive::Deserialize;
use tower_http::cors::CorsLayer;

use workflow_engine::{list_history_for_user, list_pending_for_user};
use workflow_model::{ActionKind, StageInstanceId, TransferId, UserId, WorkflowInstanceId};

use crate::error::ApiError;
use crate::state::AppState;

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/transfers/:transfer_id/workflow/start", post(start_workflow))
            .route(
                "/workflow-instances/:workflow_instance_id/stages/:stage_instance_id/action",
                post(process_action),
            )
            .route(
                "/workflow-instances/:workflow_instance_id/stages/:stage_instance_id/delegate",
                post(delegate),
            )
            .route(
                "/workflow-instances/:workflow_instance_id/cancel",
                post(cancel_workflow),
            )
            .route(
                "/workflow-instances/:workflow_instance_id/restart",
                post(restart_workflow),
            )
            .route("/users/:user_id/approvals/pending", get(pending_approvals))
            .route("/users/:user_id/approvals/history", get(approval_history))
            .route("/ws", get(ws_upgrade))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "workflow-api listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn start_workflow(
    State(state): State<AppState>,
    Path(transfer_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let instance = state
        .engine
        .start_workflow(TransferId(transfer_id))
        .await?;
    Ok(Json(instance))
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    user_id: u64,
    action: ActionKind,
    comment: Option<String>,
}

async fn process_action(
    State(state): State<AppState>,
    Path((workflow_instance_id, stage_instance_id)): Path<(u64, u64)>,
    Json(body): Json<ActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .engine
        .process_action(
            WorkflowInstanceId(workflow_instance_id),
            UserId(body.user_id),
            StageInstanceId(stage_instance_id),
            body.action,
            body.comment,
        )
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct DelegateRequest {
    from_user: u64,
    to_user: u64,
    comment: Option<String>,
}

async fn delegate(
    State(state): State<AppState>,
    Path((workflow_instance_id, stage_instance_id)): Path<(u64, u64)>,
    Json(body): Json<DelegateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .engine
        .delegate(
            WorkflowInstanceId(workflow_instance_id),
            StageInstanceId(stage_instance_id),
            UserId(body.from_user),
            UserId(body.to_user),
            body.comment,
        )
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn cancel_workflow(
    State(state): State<AppState>,
    Path(workflow_instance_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .engine
        .cancel_workflow(WorkflowInstanceId(workflow_instance_id))
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn restart_workflow(
    State(state): State<AppState>,
    Path(workflow_instance_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let instance = state
        .engine
        .restart_workflow(WorkflowInstanceId(workflow_instance_id))
        .await?;
    Ok(Json(instance))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn pending_approvals(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let page = list_pending_for_user(
        state.engine.instances.as_ref(),
        UserId(user_id),
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(state.engine.config.default_page_size),
    )
    .await;
    Json(page)
}

async fn approval_history(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let page = list_history_for_user(
        state.engine.instances.as_ref(),
        UserId(user_id),
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(state.engine.config.default_page_size),
    )
    .await;
    Json(page)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut receiver = state.broadcast.subscribe();
    while let Ok(envelope) = receiver.recv().await {
        let Ok(text) = serde_json::to_string(&envelope) else {
            continue;
        };
        if socket.send(Message::Text(text)).await.is_err() {
            break;
        }
    }
}


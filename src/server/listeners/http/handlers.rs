use axum::{
    extract::{connect_info::ConnectInfo, Path, State},
    response::IntoResponse,
    Json,
};
use hyper::StatusCode;
use log::warn;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::server::{
    coordinator::Coordinator,
    error::CoordinatorError,
    postdata::{
        AckResponse, AgentDetailResponse, AgentListResponse, AgentSummaryData, BeaconResponse,
        ErrorResponse, RegisterAgentData, RegisterAgentResponse, SendCommandData,
        SendCommandResponse, TaskResultData, TaskResultResponse,
    },
};

type ErrorReply = (StatusCode, Json<ErrorResponse>);

// The core never sees status codes; mapping happens here only.
fn error_reply(e: CoordinatorError) -> ErrorReply {
    let status = match e {
        CoordinatorError::NotFound(_) => StatusCode::NOT_FOUND,
        CoordinatorError::UnknownCommand(_) => StatusCode::NOT_FOUND,
        CoordinatorError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoordinatorError::Conflict(_) => StatusCode::CONFLICT,
        CoordinatorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
    };

    warn!("Request rejected: {e}");
    (
        status,
        Json(ErrorResponse {
            detail: e.to_string(),
        }),
    )
}

pub async fn handler_agent_list(
    State(coordinator): State<Arc<Coordinator>>,
) -> Json<AgentListResponse> {
    let agents = coordinator
        .list_agents()
        .await
        .iter()
        .map(|(agent, status)| AgentSummaryData::from_agent(agent, *status))
        .collect();

    Json(AgentListResponse { agents })
}

pub async fn handler_agent_detail(
    State(coordinator): State<Arc<Coordinator>>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentDetailResponse>, ErrorReply> {
    let detail = coordinator
        .agent_detail(&agent_id)
        .await
        .map_err(error_reply)?;

    Ok(Json(AgentDetailResponse::from_detail(
        &detail,
        coordinator.catalog().keys(),
    )))
}

pub async fn handler_register(
    State(coordinator): State<Arc<Coordinator>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<RegisterAgentData>,
) -> Result<Json<RegisterAgentResponse>, ErrorReply> {
    payload.validate().map_err(error_reply)?;

    let agent = coordinator
        .register_agent(
            payload.display_name(),
            payload.os_info.to_owned(),
            addr.to_string(),
        )
        .await;

    Ok(Json(RegisterAgentResponse { agent_id: agent.id }))
}

pub async fn handler_beacon(
    State(coordinator): State<Arc<Coordinator>>,
    Path(agent_id): Path<String>,
) -> Result<Json<BeaconResponse>, ErrorReply> {
    let deliveries = coordinator.beacon(&agent_id).await.map_err(error_reply)?;

    Ok(Json(BeaconResponse::from_deliveries(deliveries)))
}

pub async fn handler_send_command(
    State(coordinator): State<Arc<Coordinator>>,
    Path(agent_id): Path<String>,
    Json(payload): Json<SendCommandData>,
) -> Result<Json<SendCommandResponse>, ErrorReply> {
    payload.validate().map_err(error_reply)?;

    let task = coordinator
        .enqueue_command(&agent_id, &payload.cmd)
        .await
        .map_err(error_reply)?;

    Ok(Json(SendCommandResponse { task_id: task.id }))
}

pub async fn handler_task_result(
    State(coordinator): State<Arc<Coordinator>>,
    Json(payload): Json<TaskResultData>,
) -> Result<Json<AckResponse>, ErrorReply> {
    payload.validate().map_err(error_reply)?;

    coordinator
        .submit_result(
            &payload.task_id,
            &payload.agent_id,
            payload.output.to_owned(),
            payload.outcome.to_owned(),
        )
        .await
        .map_err(error_reply)?;

    Ok(Json(AckResponse::success()))
}

pub async fn handler_get_result(
    State(coordinator): State<Arc<Coordinator>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResultResponse>, ErrorReply> {
    let result = coordinator.get_result(&task_id).await.map_err(error_reply)?;

    Ok(Json(TaskResultResponse::from_result(&result)))
}

pub async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not found".to_string(),
        }),
    )
}

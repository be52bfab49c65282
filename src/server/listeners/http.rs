use axum::{
    routing::{get, post},
    Router,
};
use log::info;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::server::coordinator::Coordinator;

pub mod handlers;

use self::handlers::{
    handler_404,
    handler_agent_detail,
    handler_agent_list,
    handler_beacon,
    handler_get_result,
    handler_register,
    handler_send_command,
    handler_task_result,
};

pub fn init_router(coordinator: Arc<Coordinator>) -> Router {
    let route_home = "/";
    let route_agent_detail = "/agents/:agent_id";
    let route_register = "/agentSetup";
    let route_beacon = "/beacon/:agent_id";
    let route_send_command = "/send_command/:agent_id";
    let route_task_result = "/tasks/result";
    let route_get_result = "/results/:task_id";

    Router::new()
        .route(route_home, get(handler_agent_list))
        .route(route_agent_detail, get(handler_agent_detail))
        .route(route_register, post(handler_register))
        .route(route_beacon, post(handler_beacon))
        .route(route_send_command, post(handler_send_command))
        .route(route_task_result, post(handler_task_result))
        .route(route_get_result, get(handler_get_result))
        .fallback(handler_404)
        .layer((
            TraceLayer::new_for_http(),
            TimeoutLayer::new(Duration::from_secs(10)),
        ))
        .with_state(coordinator)
}

pub async fn run(
    host: String,
    port: u16,
    coordinator: Arc<Coordinator>,
) -> Result<(), std::io::Error> {
    let app = init_router(coordinator);

    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    info!("Start HTTP listener on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

use log::info;
use std::sync::Arc;

use crate::config::Config;
use crate::server::coordinator::Coordinator;
use crate::server::listeners::http;

pub async fn run(config: Config) -> Result<(), std::io::Error> {
    let coordinator = Arc::new(Coordinator::new());

    info!(
        "Command catalog loaded with {} entries.",
        coordinator.catalog().len()
    );

    http::run(config.host, config.port, coordinator).await
}

//! Server construction: adapter wiring, scheduler lifecycle, HTTP setup.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use chrono::Duration as ChronoDuration;
use mockable::DefaultClock;
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::assignment::ShiftAssignmentService;
use backend::domain::dispatch::NotificationDispatcher;
use backend::domain::ports::{LogOnlyPushTransport, PushTransport};
use backend::domain::reclaim::LockReclaimer;
use backend::domain::scheduler::{Scheduler, SchedulerConfig};
use backend::domain::targeting::TargetingEngine;
use backend::inbound::http::health::HealthState;
use backend::inbound::http::{self, HttpState};
use backend::outbound::persistence::{
    DbPool, DieselRequestStore, DieselWorkerDirectory, PoolConfig,
};
use backend::outbound::push::ExpoPushTransport;

fn build_transport(config: &AppConfig) -> std::io::Result<Arc<dyn PushTransport>> {
    match &config.push_endpoint {
        Some(endpoint) => {
            let transport =
                ExpoPushTransport::new(endpoint.clone(), config.expo_access_token.clone())
                    .map_err(std::io::Error::other)?;
            Ok(Arc::new(transport))
        }
        None => {
            warn!("push delivery disabled; notifications will only be logged");
            Ok(Arc::new(LogOnlyPushTransport))
        }
    }
}

/// Wire the adapters, start the scheduler, and run the HTTP server until
/// shutdown. The scheduler is stopped after the server drains.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;
    let store = Arc::new(DieselRequestStore::new(pool.clone()));
    let directory = Arc::new(DieselWorkerDirectory::new(pool));
    let transport = build_transport(&config)?;
    let clock = Arc::new(DefaultClock);

    let assignment = Arc::new(ShiftAssignmentService::new(
        Arc::clone(&store),
        clock.clone() as Arc<dyn mockable::Clock>,
    ));
    let scheduler = Scheduler::new(
        Arc::clone(&store),
        clock.clone() as Arc<dyn mockable::Clock>,
        LockReclaimer::new(
            Arc::clone(&store),
            clock.clone() as Arc<dyn mockable::Clock>,
            ChronoDuration::minutes(config.lock_ttl_minutes),
        ),
        TargetingEngine::new(directory),
        NotificationDispatcher::new(Arc::clone(&store), transport),
        SchedulerConfig {
            interval: config.scheduler_interval,
            batch_limit: config.scheduler_batch_limit,
        },
    );
    let scheduler_handle = scheduler.start();

    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(HttpState::new(assignment));
    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .configure(http::configure);
        #[cfg(debug_assertions)]
        let app = app
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "listening");
    let result = server.run().await;

    health_state.mark_draining();
    scheduler_handle.stop().await;
    result
}

//! HTTP trigger for the sync runs, plus an optional in-process schedule.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set SYNC_INTERVAL_MINUTES to also run both syncs on a timer.

use actix_web::{
    get,
    http::Method,
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder,
};
use player_sync::{HttpFetcher, SupabaseStore, SyncConfig, SyncContext, SyncError};
use serde::Serialize;
use std::time::Duration;

/// Shared sync context: config plus the fetcher and store clients.
type AppState = Data<SyncContext<HttpFetcher, SupabaseStore>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "player-sync",
    })
}

/// 200 with the run summary, or 500 with the error; both readable cross-origin.
fn sync_response<T: Serialize>(result: Result<T, SyncError>) -> HttpResponse {
    match result {
        Ok(report) => HttpResponse::Ok()
            .insert_header(("Access-Control-Allow-Origin", "*"))
            .json(report),
        Err(e) => {
            log::error!("Sync failed: {}", e);
            HttpResponse::InternalServerError()
                .insert_header(("Access-Control-Allow-Origin", "*"))
                .json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                })
        }
    }
}

/// Browser preflight.
async fn preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "GET, POST"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
        .finish()
}

/// Run a roster sync (Cross-Tables -> players).
async fn api_sync_players(state: AppState) -> HttpResponse {
    sync_response(state.sync_roster().await)
}

/// Run a standings sync (tourney.js divisions -> tournament totals).
async fn api_sync_standings(state: AppState) -> HttpResponse {
    sync_response(state.sync_standings().await)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);

    let to_io = |e: SyncError| std::io::Error::new(std::io::ErrorKind::Other, e.to_string());
    let config = SyncConfig::from_env().map_err(to_io)?;
    let store = SupabaseStore::new(&config.supabase_url, &config.supabase_key).map_err(to_io)?;
    let fetcher = HttpFetcher::new().map_err(to_io)?;
    let interval_minutes = config.sync_interval_minutes;
    let state: AppState = Data::new(SyncContext::new(config, fetcher, store));

    // Scheduled runs: roster first so new players exist before standings land on them
    if interval_minutes > 0 {
        let scheduled = state.clone();
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(Duration::from_secs(interval_minutes * 60));
            loop {
                interval.tick().await;
                log::info!("Scheduled sync starting...");
                match scheduled.sync_roster().await {
                    Ok(report) => log::info!("Scheduled roster sync completed: {}", report.counts),
                    Err(e) => log::error!("Scheduled roster sync failed: {}", e),
                }
                match scheduled.sync_standings().await {
                    Ok(report) => log::info!("Scheduled standings sync completed: {}", report.counts),
                    Err(e) => log::error!("Scheduled standings sync failed: {}", e),
                }
            }
        });
        log::info!("Scheduled sync every {} minute(s)", interval_minutes);
    }

    log::info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(
                web::resource("/api/sync/players")
                    .route(web::get().to(api_sync_players))
                    .route(web::post().to(api_sync_players))
                    .route(web::method(Method::OPTIONS).to(preflight)),
            )
            .service(
                web::resource("/api/sync/standings")
                    .route(web::get().to(api_sync_standings))
                    .route(web::post().to(api_sync_standings))
                    .route(web::method(Method::OPTIONS).to(preflight)),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

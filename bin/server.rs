// Puzzle Archive - Web Server
// Read-only JSON API over the puzzle store

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use puzzle_archive::{
    get_all_records, get_records_by_date, logging, normalize_date, search_records,
    setup_database, Config, Record,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock still holds a usable connection
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            error: Some(message.into()),
        }
    }
}

/// Stats response
#[derive(Serialize)]
struct StatsResponse {
    total_puzzles: usize,
    first_date: Option<String>,
    last_date: Option<String>,
    distinct_words: usize,
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

fn records_response(result: anyhow::Result<Vec<Record>>, what: &str) -> Response {
    match result {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::ok(records))).into_response(),
        Err(e) => {
            error!("Error getting {}: {:#}", what, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(Vec::<Record>::new(), e.to_string())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/puzzles - All puzzles, oldest first
async fn get_puzzles(State(state): State<AppState>) -> Response {
    let conn = state.conn();
    records_response(get_all_records(&conn), "puzzles")
}

/// GET /api/puzzles/:date - Puzzles for a YYYY-MM-DD or "Jul 31, 2025" date
async fn get_puzzle_by_date(State(state): State<AppState>, Path(date): Path<String>) -> Response {
    let key = normalize_date(&date).unwrap_or(date);
    let conn = state.conn();

    match get_records_by_date(&conn, &key) {
        Ok(records) if records.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(records, format!("no puzzle for {}", key))),
        )
            .into_response(),
        other => records_response(other, "puzzle by date"),
    }
}

/// GET /api/search?q= - Search category names and words
async fn search_puzzles(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let conn = state.conn();
    records_response(search_records(&conn, &params.q), "search results")
}

/// GET /api/stats - Archive statistics
async fn get_stats(State(state): State<AppState>) -> Response {
    let conn = state.conn();

    match get_all_records(&conn) {
        Ok(records) => {
            let mut words: Vec<String> = records
                .iter()
                .flat_map(|r| r.words().map(str::to_uppercase))
                .collect();
            words.sort();
            words.dedup();

            let stats = StatsResponse {
                total_puzzles: records.len(),
                first_date: records.first().map(Record::date_key),
                last_date: records.last().map(Record::date_key),
                distinct_words: words.len(),
            };
            (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
        }
        Err(e) => {
            error!("Error getting stats: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(
                    StatsResponse {
                        total_puzzles: 0,
                        first_date: None,
                        last_date: None,
                        distinct_words: 0,
                    },
                    e.to_string(),
                )),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");
    let config = Config::from_env();

    if !config.db_path.exists() {
        error!("Database not found at {}", config.db_path.display());
        error!("Run: puzzle-archive import <FILE> to import puzzles first");
        std::process::exit(1);
    }

    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;
    setup_database(&conn)?;
    info!(db = %config.db_path.display(), "database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/puzzles", get(get_puzzles))
        .route("/puzzles/:date", get(get_puzzle_by_date))
        .route("/search", get(search_puzzles))
        .route("/stats", get(get_stats))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Server running on http://{}/api/puzzles", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

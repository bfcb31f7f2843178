use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use hostel_api::config::{self, Environment};
use hostel_api::database::manager::DatabaseManager;
use hostel_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Hostel API in {:?} mode", config.environment);

    // Apply pending migrations; a missing database only degrades /health so
    // the server still comes up for local work
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::warn!("migrations not applied at startup: {}", e);
    }

    let app = app();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Hostel API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API behind the bearer-token middleware
        .merge(protected_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use hostel_api::handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn protected_routes() -> Router {
    use hostel_api::handlers::protected::{auth, dashboard, members, payments, properties, structure};

    Router::new()
        // Session and profile
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        // Properties and their subtree
        .route("/api/properties", get(properties::list).post(properties::create))
        .route(
            "/api/properties/:id",
            get(properties::get)
                .patch(properties::update)
                .delete(properties::delete),
        )
        .route("/api/properties/:id/details", get(properties::details))
        .route("/api/properties/:id/buildings", get(structure::list_buildings))
        .route("/api/buildings/:id/floors", get(structure::list_floors))
        .route("/api/floors/:id/rooms", get(structure::list_rooms))
        .route("/api/rooms/:id/beds", get(structure::list_beds))
        .route("/api/rooms/:id", delete(structure::delete_room))
        .route("/api/beds/:id", get(structure::get_bed))
        // Members and bed assignment
        .route("/api/members", get(members::list).post(members::create))
        .route(
            "/api/members/:id",
            get(members::get).patch(members::update).delete(members::delete),
        )
        .route("/api/members/:id/assign-bed", post(members::assign_bed))
        .route("/api/members/:id/unassign-bed", post(members::unassign_bed))
        // Payments
        .route("/api/payments", get(payments::list).post(payments::create))
        .route(
            "/api/payments/:id",
            get(payments::get).patch(payments::update).delete(payments::delete),
        )
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/summary", get(dashboard::summary))
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let config = config::config();
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Hostel API",
            "version": version,
            "description": "Property and hostel management backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login, /auth/refresh (public)",
                "session": "/api/auth/me, /api/auth/logout (protected)",
                "properties": "/api/properties[/:id][/details|/buildings] (protected)",
                "structure": "/api/buildings/:id/floors, /api/floors/:id/rooms, /api/rooms/:id/beds, /api/beds/:id (protected)",
                "members": "/api/members[/:id][/assign-bed|/unassign-bed] (protected)",
                "payments": "/api/payments[/:id] (protected)",
                "dashboard": "/api/dashboard/stats, /api/dashboard/summary (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

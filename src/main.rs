use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use storefront_api::auth::TokenIssuer;
use storefront_api::config;
use storefront_api::database::manager::DatabaseManager;
use storefront_api::database::users::PgUserStore;
use storefront_api::services::session::SessionService;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, secrets, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();
    tracing_subscriber::fmt::init();
    tracing::info!("Starting storefront API in {:?} mode", config.environment);

    // Missing signing secrets are fatal by design.
    if let Err(err) = TokenIssuer::from_config() {
        tracing::error!("FATAL ERROR: {}", err);
        std::process::exit(1);
    }

    // Migrations and admin bootstrap run in the background; the server still
    // comes up degraded when the database is unreachable.
    tokio::spawn(async {
        if let Err(err) = startup_tasks().await {
            tracing::error!("startup tasks failed: {:#}", err);
        }
    });

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("storefront API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(inventory_routes())
        .merge(payment_routes())
        .nest("/cart", cart_routes())
        .nest("/order", order_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use storefront_api::handlers::public::auth;

    Router::new()
        .route("/create-user", post(auth::create_user))
        .route("/login", post(auth::login))
        .route("/token", post(auth::token))
        .route("/logout", post(auth::logout))
        .route("/change-password", put(auth::change_password))
        .route("/update-email", put(auth::update_email))
        .route("/google-signup", post(auth::google_signup))
        .route("/google-login", post(auth::google_login))
        .route("/auth/google", post(auth::google_auth))
}

fn inventory_routes() -> Router {
    use storefront_api::handlers::protected::inventory;
    use storefront_api::handlers::public::{catalog, upload};
    use storefront_api::middleware;

    // Only product creation sits behind auth; the jwt layer runs first and
    // the role gate second.
    let admin = Router::new()
        .route("/admin-management", post(inventory::admin_management))
        .layer(axum::middleware::from_fn(middleware::require_admin))
        .layer(axum::middleware::from_fn(middleware::jwt_auth_middleware));

    Router::new()
        .route("/get-data", get(catalog::get_data))
        .route("/delete-product/:id", delete(catalog::delete_product))
        .route("/upload", post(upload::upload))
        .merge(admin)
}

fn cart_routes() -> Router {
    use storefront_api::handlers::public::cart;

    Router::new()
        .route("/addtocart", post(cart::add_to_cart))
        .route("/increase", post(cart::add_to_cart))
        .route("/decrease-cart", put(cart::decrease_cart))
        .route("/remove", delete(cart::remove_item))
        .route("/clear-cart", put(cart::clear_cart))
        .route("/:user_id", get(cart::get_cart))
        .route("/:user_id/quantity", get(cart::get_cart_quantities))
}

fn order_routes() -> Router {
    use storefront_api::handlers::public::order;

    Router::new()
        .route("/place-order", post(order::place_order))
        .route("/history/:user_id", get(order::order_history))
}

fn payment_routes() -> Router {
    use storefront_api::handlers::public::payment;

    Router::new()
        .route("/order-now", post(payment::order_now))
        .route("/verify", post(payment::verify))
}

async fn root() -> &'static str {
    "API is running..."
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(err) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "message": err.to_string(),
            })),
        ),
    }
}

async fn startup_tasks() -> anyhow::Result<()> {
    DatabaseManager::migrate().await?;
    bootstrap_admin().await?;
    Ok(())
}

/// Create the configured admin account on first start.
async fn bootstrap_admin() -> anyhow::Result<()> {
    let admin = &config::config().admin;
    let (Some(email), Some(password)) = (&admin.email, &admin.password) else {
        tracing::warn!("Admin credentials not set; skipping admin bootstrap");
        return Ok(());
    };

    let pool = DatabaseManager::pool().await?;
    let sessions = SessionService::new(PgUserStore::new(pool), TokenIssuer::from_config()?);
    sessions.bootstrap_admin(email, password).await?;
    Ok(())
}

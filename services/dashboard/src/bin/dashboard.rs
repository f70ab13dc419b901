//! services/dashboard/src/bin/dashboard.rs

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use dashboard_lib::{
    adapters::{FileCache, HttpCourseResource, HttpStudentResource},
    config::Config,
    error::ApiError,
    web::{router, ApiDoc, AppState},
};
use std::sync::Arc;
use student_records_core::{CourseCatalog, InMemoryCache, LocalCache, RecordStore};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Local Cache ---
    let cache: Arc<dyn LocalCache> = match FileCache::open(&config.cache_dir) {
        Ok(cache) => {
            info!("Using local cache at {}", config.cache_dir.display());
            Arc::new(cache)
        }
        Err(e) => {
            warn!(
                "Cache directory {} is unusable ({}); falling back to an in-memory cache",
                config.cache_dir.display(),
                e
            );
            Arc::new(InMemoryCache::new())
        }
    };

    // --- 3. Initialize Remote Resource Adapters ---
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let students = Arc::new(HttpStudentResource::new(
        http_client.clone(),
        config.students_api_url.clone(),
    ));
    let courses = Arc::new(HttpCourseResource::new(
        http_client,
        config.courses_api_url.clone(),
    ));

    // --- 4. Build the Store & Catalog, Then Do the Initial Load ---
    let store = Arc::new(RecordStore::new(students, cache.clone()));
    let catalog = Arc::new(CourseCatalog::new(courses, cache));

    if let Err(e) = store.hydrate() {
        warn!("Starting without cached students: {}", e);
    }
    if let Err(e) = catalog.hydrate() {
        warn!("Starting without cached courses: {}", e);
    }
    let (students_loaded, courses_loaded) = tokio::join!(store.load(), catalog.load());
    if let Err(e) = students_loaded {
        warn!("Initial student load failed: {}", e);
    }
    if let Err(e) = courses_loaded {
        warn!("Initial course load failed: {}", e);
    }

    let app_state = Arc::new(AppState::new(store, catalog));

    // --- 5. Create the Web Router ---
    let allowed_origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid ALLOWED_ORIGIN '{}': {}",
            config.allowed_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

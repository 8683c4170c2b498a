//! HTTP server: the public site plus a small JSON API.
//!
//! All routes read from one [`ContentStore`] created at startup. The first
//! request (or the warm-up task spawned by [`run_server`]) triggers the
//! catalog fetch; until it completes, HTML routes show a self-refreshing
//! loading page and API routes answer `503`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Catalog page (`q`, `category`, `page`) |
//! | `GET`  | `/places/more` | Next page of cards for infinite scroll |
//! | `GET`  | `/place/{placeId}` | Place detail page |
//! | `POST` | `/retry` | Retry a failed catalog load |
//! | `GET`  | `/sitemap.xml` | Sitemap, built from a fresh fetch |
//! | `GET`  | `/api/catalog` | Cached catalog as JSON |
//! | `GET`  | `/api/places` | Filtered, paginated listing |
//! | `GET`  | `/api/places/{placeId}` | One place as JSON |
//! | `POST` | `/api/reload` | Drop the cache and fetch again |
//! | `GET`  | `/health` | Health check |
//!
//! # Error Contract
//!
//! JSON routes report errors as:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "El lugar que buscas no existe o ha sido removido" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `unavailable` (503),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderName, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use pulgarpedia_core::filter::place_counts;
use pulgarpedia_core::related::recommendations;
use pulgarpedia_core::{
    Catalog, ContentError, ContentSource, ContentState, ContentStore, FilterEngine,
    FilteredPlaces, Filters, LoadStatus, Pagination, Place,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::HttpContentSource;
use crate::config::Config;
use crate::get::place_detail;
use crate::links::SiteUrls;
use crate::render::{listing_href, CategoryChip, IndexPage, PlaceCard, PlacePage, Renderer};
use crate::scroll::InfiniteScroll;
use crate::search::{check_category, search_page, SearchPage, UnknownCategory};
use crate::sitemap::generate_sitemap;

const X_HAS_MORE: HeaderName = HeaderName::from_static("x-has-more");
const X_NEXT_PAGE: HeaderName = HeaderName::from_static("x-next-page");
const SITEMAP_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=7200";
const LOADING_REFRESH_SECS: u64 = 2;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<ContentStore>,
    /// Used directly (bypassing the store) for per-request sitemap fetches.
    source: Arc<dyn ContentSource>,
    /// Single-slot memo shared by every request: repeated identical
    /// filters reuse the last result, any other filter replaces it.
    engine: Arc<Mutex<FilterEngine>>,
    renderer: Arc<Renderer>,
    urls: Arc<SiteUrls>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn ContentSource>) -> anyhow::Result<Self> {
        let store = ContentStore::new(Arc::clone(&source), config.content.integrity);
        Ok(Self {
            renderer: Arc::new(Renderer::new(&config.site.name)?),
            urls: Arc::new(SiteUrls::new(&config.site.base_url)?),
            config: Arc::new(config),
            store: Arc::new(store),
            source,
            engine: Arc::new(Mutex::new(FilterEngine::new())),
        })
    }

    fn filter(&self, catalog: &Arc<Catalog>, filters: &Filters) -> FilteredPlaces {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(catalog, filters)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/places/more", get(handle_more))
        .route("/place/{place_id}", get(handle_place))
        .route("/retry", post(handle_retry))
        .route("/sitemap.xml", get(handle_sitemap))
        .route("/api/catalog", get(handle_api_catalog))
        .route("/api/places", get(handle_api_places))
        .route("/api/places/{place_id}", get(handle_api_place))
        .route("/api/reload", post(handle_api_reload))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`.
///
/// The catalog fetch starts immediately in the background so the first
/// visitor is less likely to see the loading page.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let source: Arc<dyn ContentSource> = Arc::new(HttpContentSource::new(&config.content)?);
    let state = AppState::new(config.clone(), source)?;

    let store = Arc::clone(&state.store);
    tokio::spawn(async move { store.load().await });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, endpoint = %config.content.endpoint, "server started");
    println!("Pulgarpedia listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Content availability ============

enum Availability {
    Ready(Arc<Catalog>),
    Loading,
    Failed(ContentError),
}

impl From<ContentState> for Availability {
    fn from(state: ContentState) -> Self {
        match (state.status(), state.content(), state.error()) {
            (LoadStatus::Ready, Some(catalog), _) => Availability::Ready(Arc::clone(catalog)),
            (LoadStatus::Failed, _, Some(err)) => Availability::Failed(err.clone()),
            _ => Availability::Loading,
        }
    }
}

/// Run `f` against the store on a spawned task, so a client disconnect
/// does not abandon a fetch other requests are waiting on.
async fn detached<F, Fut>(state: &AppState, f: F)
where
    F: FnOnce(Arc<ContentStore>) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(f(Arc::clone(&state.store)));
    if let Err(e) = task.await {
        tracing::error!(error = %e, "catalog load task failed");
    }
}

/// Start the first load if nothing has happened yet, then report where
/// the store stands. A failed load is left alone until `/retry`.
async fn ensure_loaded(state: &AppState) -> Availability {
    if state.store.status() == LoadStatus::Idle {
        detached(state, |store| async move { store.load().await }).await;
    }
    state.store.state().into()
}

async fn ready_catalog(state: &AppState) -> Result<Arc<Catalog>, AppError> {
    match ensure_loaded(state).await {
        Availability::Ready(catalog) => Ok(catalog),
        Availability::Loading => Err(unavailable("El contenido se está cargando")),
        Availability::Failed(err) => Err(unavailable(err.user_message())),
    }
}

fn not_ready_page(state: &AppState, availability: Availability) -> Result<Response, AppError> {
    match availability {
        Availability::Failed(err) => {
            let html = state
                .renderer
                .error(&err.user_message())
                .map_err(internal)?;
            Ok((StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response())
        }
        _ => {
            let html = state
                .renderer
                .loading(LOADING_REFRESH_SECS)
                .map_err(internal)?;
            Ok(Html(html).into_response())
        }
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn unavailable(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "unavailable".to_string(),
        message: message.into(),
    }
}

fn internal(err: impl std::fmt::Display) -> AppError {
    tracing::error!(error = %err, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ Listing parameters ============

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    q: Option<String>,
    category: Option<String>,
    page: Option<usize>,
}

impl ListParams {
    fn filters(&self) -> Filters {
        Filters::new(
            self.q.clone().unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
        )
    }

    fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

// ============ GET / ============

async fn handle_index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let catalog = match ensure_loaded(&state).await {
        Availability::Ready(catalog) => catalog,
        other => return not_ready_page(&state, other),
    };

    let filters = params.filters();
    if let Err(UnknownCategory(id)) = check_category(&catalog, &filters) {
        tracing::debug!(category = %id, "unknown category, redirecting home");
        return Ok(Redirect::to("/").into_response());
    }

    let filtered = state.filter(&catalog, &filters);
    let page = index_page(&state, &filtered, &filters, params.page());
    let html = state.renderer.index(&page).map_err(internal)?;
    Ok(Html(html).into_response())
}

fn index_page(
    state: &AppState,
    filtered: &FilteredPlaces,
    filters: &Filters,
    page: usize,
) -> IndexPage {
    let catalog = filtered.catalog();
    let settings = &state.config.catalog;
    let site = &state.config.site;

    let pagination = Pagination::resume(settings.page_size, filtered.revision(), page);
    let total = filtered.len();
    let card = |place: &Place| PlaceCard::new(&state.urls, catalog, place);

    let cards = filtered
        .range(0, pagination.displayed_len(total))
        .into_iter()
        .map(card)
        .collect();

    let counts = place_counts(catalog);
    let categories = catalog
        .categories
        .iter()
        .map(|c| CategoryChip {
            id: c.id.clone(),
            name: c.name.clone(),
            icon: c.icon.clone(),
            count: counts.get(&c.id).copied().unwrap_or(0),
            selected: filters.category == c.id,
            href: listing_href(&Filters::new(filters.query.clone(), c.id.clone()), None),
        })
        .collect();

    let recommended: Vec<PlaceCard> = recommendations(
        catalog,
        filters.category_filter(),
        settings.recommendations,
        &mut rand::thread_rng(),
    )
    .into_iter()
    .map(card)
    .collect();

    let selected = filters.category_filter().and_then(|id| catalog.category(id));
    let (title, description) = match selected {
        Some(category) => (
            format!("{} | {}", category.name, site.name),
            category.description.clone(),
        ),
        None => (
            format!("{} | Enciclopedia turística de El Salvador", site.name),
            "Descubre playas, volcanes y pueblos de El Salvador".to_string(),
        ),
    };

    let has_more = pagination.has_more(total);
    IndexPage {
        title,
        description,
        query: filters.query.clone(),
        category: filters.category.clone(),
        categories,
        all_count: catalog.places.len(),
        cards,
        total,
        page: pagination.page(),
        has_more,
        next_href: has_more.then(|| listing_href(filters, Some(pagination.page() + 1))),
        has_active_filters: filters.has_active_filters(),
        recommendations: recommended,
    }
}

// ============ GET /places/more ============

async fn handle_more(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let catalog = ready_catalog(&state).await?;
    let filters = params.filters();
    if let Err(UnknownCategory(id)) = check_category(&catalog, &filters) {
        return Err(bad_request(format!("unknown category: {}", id)));
    }

    let filtered = state.filter(&catalog, &filters);
    let settings = &state.config.catalog;
    let mut scroll = InfiniteScroll::resume(
        settings.page_size,
        settings.scroll_delay(),
        filtered.revision(),
        params.page(),
    );

    let total = filtered.len();
    let revealed = scroll.load_more(total).await;
    let headers = [
        (X_HAS_MORE, scroll.has_more(total).to_string()),
        (X_NEXT_PAGE, scroll.pagination().page().to_string()),
    ];

    let Some(revealed) = revealed else {
        return Ok((StatusCode::NO_CONTENT, headers).into_response());
    };

    let cards: Vec<PlaceCard> = filtered
        .range(revealed.start, revealed.end)
        .into_iter()
        .map(|place| PlaceCard::new(&state.urls, &catalog, place))
        .collect();
    let html = state.renderer.cards(&cards).map_err(internal)?;
    Ok((headers, Html(html)).into_response())
}

// ============ GET /place/{placeId} ============

async fn handle_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Response, AppError> {
    match ensure_loaded(&state).await {
        Availability::Ready(catalog) => render_place(&state, &catalog, &place_id),
        other => not_ready_page(&state, other),
    }
}

fn render_place(state: &AppState, catalog: &Catalog, place_id: &str) -> Result<Response, AppError> {
    let detail = place_detail(
        catalog,
        place_id,
        state.config.catalog.related_limit,
        &mut rand::thread_rng(),
    );

    let detail = match detail {
        Ok(detail) => detail,
        Err(err) => {
            tracing::debug!(place_id, "place not found");
            let html = state
                .renderer
                .not_found(&err.user_message())
                .map_err(internal)?;
            return Ok((StatusCode::NOT_FOUND, Html(html)).into_response());
        }
    };

    let place = detail.place;
    let summary = if place.general_history_section.description.is_empty() {
        &place.header.subtitle
    } else {
        &place.general_history_section.description
    };

    let page = PlacePage {
        title: format!("{} | {}", place.header.title, state.config.site.name),
        description: summary.chars().take(160).collect(),
        place,
        category_label: detail.category_label,
        category_href: listing_href(&Filters::new("", place.category_id.clone()), None),
        related: detail
            .related
            .places
            .iter()
            .map(|p| PlaceCard::new(&state.urls, catalog, p))
            .collect(),
        has_more_related: detail.related.has_more,
    };

    let html = state.renderer.place(&page).map_err(internal)?;
    Ok(Html(html).into_response())
}

// ============ POST /retry ============

async fn handle_retry(State(state): State<AppState>) -> Redirect {
    detached(&state, |store| async move { store.retry().await }).await;
    Redirect::to("/")
}

// ============ GET /sitemap.xml ============

async fn handle_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let sitemap = generate_sitemap(
        &state.urls,
        state.source.as_ref(),
        state.config.content.integrity,
    )
    .await
    .map_err(internal)?;

    let mut response = ([(CONTENT_TYPE, "text/xml")], sitemap.xml).into_response();
    if sitemap.complete {
        response.headers_mut().insert(
            CACHE_CONTROL,
            axum::http::HeaderValue::from_static(SITEMAP_CACHE_CONTROL),
        );
    }
    Ok(response)
}

// ============ JSON API ============

async fn handle_api_catalog(State(state): State<AppState>) -> Result<Json<Arc<Catalog>>, AppError> {
    Ok(Json(ready_catalog(&state).await?))
}

async fn handle_api_places(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<SearchPage>, AppError> {
    let catalog = ready_catalog(&state).await?;
    let filters = params.filters();
    if let Err(UnknownCategory(id)) = check_category(&catalog, &filters) {
        return Err(bad_request(format!("unknown category: {}", id)));
    }

    let filtered = state.filter(&catalog, &filters);
    Ok(Json(search_page(
        &filtered,
        &filters,
        params.page(),
        state.config.catalog.page_size,
    )))
}

async fn handle_api_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<Place>, AppError> {
    let catalog = ready_catalog(&state).await?;
    catalog
        .require_place(&place_id)
        .map(|place| Json(place.clone()))
        .map_err(|e| not_found(e.user_message()))
}

#[derive(Serialize)]
struct ReloadResponse {
    status: LoadStatus,
    categories: usize,
    places: usize,
}

async fn handle_api_reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    detached(&state, |store| async move { store.reload().await }).await;

    match Availability::from(state.store.state()) {
        Availability::Ready(catalog) => Ok(Json(ReloadResponse {
            status: LoadStatus::Ready,
            categories: catalog.categories.len(),
            places: catalog.places.len(),
        })),
        Availability::Loading => Err(unavailable("El contenido se está cargando")),
        Availability::Failed(err) => Err(unavailable(err.user_message())),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    version: String,
    /// State of the catalog cache.
    content: LoadStatus,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        content: state.store.status(),
    })
}

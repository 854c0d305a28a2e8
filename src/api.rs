// REST surface over the filter engine
//
// Catalogs are shared read-only behind `Arc`; every request builds its own
// `FilterEngine`, so filter state is never shared between visitors.

use crate::catalog::{Catalog, Navigator};
use crate::db::CatalogSnapshot;
use crate::entities::{Broker, Listing, Provider, Testimonial};
use crate::error::CatalogError;
use crate::facets::FacetDescriptor;
use crate::filter::FilterEngine;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub providers: Arc<Catalog<Provider>>,
    pub brokers: Arc<Catalog<Broker>>,
    pub testimonials: Arc<Vec<Testimonial>>,
}

impl AppState {
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        AppState {
            providers: Arc::new(snapshot.providers),
            brokers: Arc::new(snapshot.brokers),
            testimonials: Arc::new(snapshot.testimonials),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
        }
    }

    pub fn list(data: T, total: usize) -> Self {
        Self {
            total: Some(total),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(message),
        }
    }
}

/// Error turned into an HTTP status + error envelope
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match err {
            CatalogError::UnknownFacet(_)
            | CatalogError::InvalidFacetValue { .. }
            | CatalogError::IndexOutOfRange { .. } => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::EmptySequence
            | CatalogError::DuplicateId(_)
            | CatalogError::InvalidEntity { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<CatalogError>() {
            Ok(catalog_err) => catalog_err.into(),
            Err(other) => ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.message, "request rejected");
        }
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}

/// Captures the affiliate URL the catalog dispatches, for a redirect
#[derive(Default)]
struct RedirectNavigator {
    target: Option<String>,
}

impl Navigator for RedirectNavigator {
    fn open(&mut self, url: &str) -> anyhow::Result<()> {
        self.target = Some(url.to_string());
        Ok(())
    }
}

// ============================================================================
// Generic catalog handlers
// ============================================================================

type Params = Vec<(String, String)>;

fn filtered<E: Listing + Clone>(
    catalog: &Arc<Catalog<E>>,
    params: &Params,
) -> Result<Json<ApiResponse<Vec<E>>>, ApiError> {
    let mut engine = FilterEngine::new(Arc::clone(catalog));
    engine.apply_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let visible: Vec<E> = engine.current_visible().into_iter().cloned().collect();
    let total = visible.len();
    Ok(Json(ApiResponse::list(visible, total)))
}

fn detail<E: Listing + Clone>(catalog: &Catalog<E>, id: &str) -> Result<Json<ApiResponse<E>>, ApiError> {
    catalog
        .get(id)
        .cloned()
        .map(|entity| Json(ApiResponse::ok(entity)))
        .ok_or_else(|| CatalogError::NotFound(id.to_string()).into())
}

fn affiliate_redirect<E: Listing>(catalog: &Catalog<E>, id: &str) -> Result<Redirect, ApiError> {
    let mut navigator = RedirectNavigator::default();
    catalog.dispatch_affiliate(id, &mut navigator)?;

    match navigator.target.filter(|url| !url.is_empty()) {
        Some(url) => Ok(Redirect::temporary(&url)),
        None => Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("no affiliate link for {}", id),
        }),
    }
}

fn facet_list<E: Listing>(catalog: &Arc<Catalog<E>>) -> Json<ApiResponse<Vec<FacetDescriptor>>> {
    let facets = FilterEngine::new(Arc::clone(catalog)).declared_facets();
    let total = facets.len();
    Json(ApiResponse::list(facets, total))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/providers?search=&signalType=&riskLevel=&priceRange=
async fn list_providers(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<ApiResponse<Vec<Provider>>>, ApiError> {
    filtered(&state.providers, &params)
}

/// GET /api/providers/:id
async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Provider>>, ApiError> {
    detail(&state.providers, &id)
}

/// GET /api/providers/:id/subscribe - redirect to the provider's affiliate page
async fn subscribe_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    affiliate_redirect(&state.providers, &id)
}

/// GET /api/brokers?search=&instrumentType=&minDeposit=&regulation=
async fn list_brokers(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<ApiResponse<Vec<Broker>>>, ApiError> {
    filtered(&state.brokers, &params)
}

/// GET /api/brokers/:id
async fn get_broker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Broker>>, ApiError> {
    detail(&state.brokers, &id)
}

/// GET /api/brokers/:id/open-account - redirect to the broker's affiliate page
async fn open_broker_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    affiliate_redirect(&state.brokers, &id)
}

/// GET /api/facets/providers
async fn provider_facets(State(state): State<AppState>) -> impl IntoResponse {
    facet_list(&state.providers)
}

/// GET /api/facets/brokers
async fn broker_facets(State(state): State<AppState>) -> impl IntoResponse {
    facet_list(&state.brokers)
}

/// GET /api/testimonials - the carousel sequence
async fn list_testimonials(State(state): State<AppState>) -> impl IntoResponse {
    let testimonials = state.testimonials.as_ref().clone();
    let total = testimonials.len();
    Json(ApiResponse::list(testimonials, total))
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/providers", get(list_providers))
        .route("/providers/:id", get(get_provider))
        .route("/providers/:id/subscribe", get(subscribe_provider))
        .route("/brokers", get(list_brokers))
        .route("/brokers/:id", get(get_broker))
        .route("/brokers/:id/open-account", get(open_broker_account))
        .route("/facets/providers", get(provider_facets))
        .route("/facets/brokers", get(broker_facets))
        .route("/testimonials", get(list_testimonials))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState {
            providers: Arc::new(Catalog::new(seed::default_providers().unwrap()).unwrap()),
            brokers: Arc::new(Catalog::new(seed::default_brokers().unwrap()).unwrap()),
            testimonials: Arc::new(seed::default_testimonials().unwrap()),
        };
        router(state)
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn names(body: &Value) -> Vec<&str> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_unfiltered_list_keeps_source_order() {
        let (status, body) = get("/api/providers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 6);
        assert_eq!(names(&body)[0], "Alpha Signals");
        assert_eq!(names(&body)[5], "Swing Profits");
    }

    #[tokio::test]
    async fn test_facets_combine_with_and() {
        let (status, body) = get("/api/providers?signalType=Forex&riskLevel=low").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["Alpha Signals", "GoldMaster Signals"]);
    }

    #[tokio::test]
    async fn test_search_and_sentinel() {
        let (_, body) = get("/api/providers?search=crypto&riskLevel=all").await;
        assert_eq!(names(&body), vec!["Alpha Signals", "CryptoWave Pro"]);
    }

    #[tokio::test]
    async fn test_broker_deposit_ceiling_and_regulation() {
        let (_, body) = get("/api/brokers?minDeposit=250").await;
        assert_eq!(names(&body), vec!["TradeMax Pro", "BlueFX Global", "CryptoEdge Exchange"]);

        let (_, body) = get("/api/brokers?regulation=FCA&minDeposit=500").await;
        assert_eq!(names(&body), vec!["TradeMax Pro", "PrimeMarkets"]);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let (status, body) = get("/api/brokers?instrumentType=NFTs&regulation=FCA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_bad_filters_are_rejected() {
        let (status, body) = get("/api/providers?color=red").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = get("/api/brokers?minDeposit=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/api/providers?riskLevel=extreme").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get("/api/providers?riskLevel=m%C3%A9dio").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["ForexProX Elite", "Swing Profits"]);
    }

    #[tokio::test]
    async fn test_detail_and_not_found() {
        let (status, body) = get("/api/brokers/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "PrimeMarkets");

        let (status, _) = get("/api/providers/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_affiliate_redirect() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/providers/4/subscribe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://goldmaster.com/subscribe"
        );

        let (status, _) = get("/api/brokers/42/open-account").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_facet_descriptors() {
        let (_, body) = get("/api/facets/brokers").await;
        let facets = body["data"].as_array().unwrap();
        let names: Vec<&str> = facets.iter().map(|f| f["name"].as_str().unwrap()).collect();

        assert_eq!(names, vec!["instrumentType", "minDeposit", "regulation"]);
        assert_eq!(facets[1]["numeric"], true);
    }

    #[tokio::test]
    async fn test_testimonials() {
        let (_, body) = get("/api/testimonials").await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["data"][0]["name"], "João Silva");
    }
}

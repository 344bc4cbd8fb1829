//! REST API for the order packing service.
//!
//! Thin adapter around `OrderPacker`: parses orders from JSON, serializes
//! shipment records and maps packing errors to HTTP responses.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::catalog::ContainerTypeVolume;
use crate::config::ApiConfig;
use crate::error::PackError;
use crate::model::{
    ContainerAssignment, ContainerSpec, ContainingProduct, LineItem, OrderRequest, ShipmentRecord,
    TotalVolume,
};
use crate::packer::OrderPacker;
use crate::types::Dimensions;

#[derive(Clone)]
struct ApiState {
    packer: Arc<OrderPacker>,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>order-packer API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({ url: "/docs/openapi.json", dom_id: "#swagger-ui" });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// The configured catalog with per-type capacities.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub volume_unit: String,
    pub containers: Vec<ContainerSpec>,
    pub volumes: Vec<ContainerTypeVolume>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    code: String,
    details: String,
    #[serde(rename = "productIds", skip_serializing_if = "Vec::is_empty")]
    product_ids: Vec<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, code: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: details.into(),
            product_ids: Vec::new(),
        }
    }
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorResponse::new("Invalid JSON data", "invalid_json", err.to_string()),
    )
}

fn pack_error_response(err: &PackError) -> Response {
    let (status, error) = match err {
        PackError::InvalidDimensions { .. } | PackError::InvalidQuantity { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "Invalid input data")
        }
        PackError::Infeasible { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "Order can't be packed"),
        PackError::UnknownContainerType(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Inconsistent container catalog")
        }
    };
    let mut body = ErrorResponse::new(error, err.code(), err.to_string());
    body.product_ids = err.offending_products().to_vec();
    error_response(status, body)
}

fn parse_order(payload: Result<Json<OrderRequest>, JsonRejection>) -> Result<OrderRequest, Response> {
    match payload {
        Ok(Json(order)) => Ok(order),
        Err(err) => Err(json_deserialize_error(err)),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_pack, handle_pack_stream, handle_catalog),
    components(
        schemas(
            OrderRequest,
            LineItem,
            Dimensions,
            ShipmentRecord,
            ContainerAssignment,
            ContainingProduct,
            TotalVolume,
            ContainerSpec,
            ContainerTypeVolume,
            CatalogResponse,
            ErrorResponse
        )
    ),
    tags((name = "packing", description = "Endpoints for order packing"))
)]
struct ApiDoc;

fn router(packer: OrderPacker) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState {
        packer: Arc::new(packer),
    };

    Router::new()
        .route("/pack", post(handle_pack))
        .route("/pack_stream", post(handle_pack_stream))
        .route("/catalog", get(handle_catalog))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, packer: OrderPacker) {
    let container_types = packer.catalog().len();
    let app = router(packer);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("❌ Could not bind API server to {}: {}", addr, err);
            return;
        }
    };

    info!(
        "🚀 Server running on http://{}:{} ({} container types)",
        config.display_host(),
        config.port(),
        container_types
    );
    if config.binds_to_all_interfaces() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API Endpoints: POST /pack, POST /pack_stream, GET /catalog");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        error!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for POST /pack endpoint.
///
/// Packs one order into catalog containers.
#[utoipa::path(
    post,
    path = "/pack",
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order packed", body = ShipmentRecord),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid order or a product too large for every container",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> impl IntoResponse {
    let order = match parse_order(payload) {
        Ok(order) => order,
        Err(response) => return response,
    };

    info!(
        "📥 New pack request {}: {} product(s)",
        order.id,
        order.products.len()
    );
    let packer = Arc::clone(&state.packer);
    let order_id = order.id.clone();
    let outcome = match tokio::task::spawn_blocking(move || packer.pack(&order)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("❌ Packing task for {} failed: {}", order_id, err);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Packing failed", "internal_error", err.to_string()),
            );
        }
    };

    match outcome {
        Ok(record) => {
            info!(
                "📦 Result {}: {} container(s), {} {}",
                record.order_id,
                record.container_count(),
                record.total_volume.value,
                record.total_volume.unit
            );
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(err) => {
            info!("🚫 Order {} rejected: {}", order_id, err);
            pack_error_response(&err)
        }
    }
}

/// Handler for POST /pack_stream endpoint (SSE).
///
/// Streams pack events as Server-Sent Events (text/event-stream).
#[utoipa::path(
    post,
    path = "/pack_stream",
    request_body = OrderRequest,
    responses(
        (
            status = 200,
            description = "Streams pack events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid JSON", body = ErrorResponse)
    ),
    tag = "packing"
)]
async fn handle_pack_stream(
    State(state): State<ApiState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> impl IntoResponse {
    let order = match parse_order(payload) {
        Ok(order) => order,
        Err(response) => return response,
    };

    let (tx, rx) = mpsc::channel::<String>(32);
    let packer = Arc::clone(&state.packer);

    tokio::task::spawn_blocking(move || {
        let _ = packer.pack_with_progress(&order, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver just drops the remaining events.
                let _ = tx.blocking_send(json);
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for GET /catalog endpoint.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Configured container catalog", body = CatalogResponse)),
    tag = "packing"
)]
async fn handle_catalog(State(state): State<ApiState>) -> impl IntoResponse {
    let catalog = state.packer.catalog();
    Json(CatalogResponse {
        volume_unit: state.packer.volume_unit().to_string(),
        containers: catalog.containers().to_vec(),
        volumes: catalog.all_volumes(),
    })
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

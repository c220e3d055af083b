use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use snicket_chain::TicketContract;
use snicket_client::{ClientError, MetadataSource, Ticketing};
use snicket_shared::checkin::CheckinCode;
use snicket_shared::constants::{APP_NAME, NATIVE_SYMBOL};
use snicket_shared::listing::{self, EventFilter, EventSort};
use snicket_shared::units::format_ether;
use snicket_shared::types::decimal;
use snicket_shared::{parse_address, Address, Event, EventStatus, Ticket, TokenId, U256};

use crate::config::ServerConfig;
use crate::error::ServerError;

const MISSING_CHECKIN_PARAMS: &str = "Missing tokenId or eventId";

pub struct AppState<C, M> {
    pub ticketing: Arc<Ticketing<C, M>>,
    pub config: Arc<ServerConfig>,
    pub chain_id: u64,
}

// Manual impl: a derive would require `C: Clone` and `M: Clone`.
impl<C, M> Clone for AppState<C, M> {
    fn clone(&self) -> Self {
        Self {
            ticketing: self.ticketing.clone(),
            config: self.config.clone(),
            chain_id: self.chain_id,
        }
    }
}

pub fn build_router<C, M>(state: AppState<C, M>) -> Router
where
    C: TicketContract + 'static,
    M: MetadataSource + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);
    let config = state.config.clone();

    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info::<C, M>))
        .route("/api/checkin", get(checkin::<C, M>))
        .route("/scan", get(scan::<C, M>))
        .route("/events", get(list_events::<C, M>))
        .route("/events/featured", get(featured_events::<C, M>))
        .route("/tickets/:owner", get(list_tickets::<C, M>))
        .with_state(state);

    with_limits(routes, &config)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Every request holds one of `max_concurrent_requests` shared permits and
/// answers 408 once `request_timeout` elapses. A single listing fans out
/// into many RPC calls, so this bounds the load put on the node.
fn with_limits(router: Router, config: &ServerConfig) -> Router {
    router
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(TimeoutLayer::new(config.request_timeout))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfoResponse {
    name: &'static str,
    version: &'static str,
    chain_id: u64,
    native_symbol: &'static str,
    contract_address: Address,
    scan_max: u64,
    read_only: bool,
    ipfs_gateway: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckinQuery {
    token_id: Option<String>,
    event_id: Option<String>,
}

#[derive(Deserialize)]
struct ScanQuery {
    code: Option<String>,
}

#[derive(Deserialize)]
struct EventsQuery {
    filter: Option<String>,
    sort: Option<String>,
}

/// An event decorated for display.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventView {
    #[serde(flatten)]
    event: Event,
    status: EventStatus,
    #[serde(with = "decimal")]
    available: U256,
    /// Price in whole native units, e.g. `"0.01"`.
    price: String,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            status: event.status(),
            available: event.available_tickets(),
            price: format_ether(event.price_wei),
            event,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketView {
    #[serde(flatten)]
    ticket: Ticket,
    /// Link encoded in the ticket's QR code.
    checkin_link: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info<C: TicketContract, M: MetadataSource>(
    State(state): State<AppState<C, M>>,
) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
        chain_id: state.chain_id,
        native_symbol: NATIVE_SYMBOL,
        contract_address: state.config.contract_address,
        scan_max: state.ticketing.scan_max(),
        read_only: state.ticketing.contract().signer().is_none(),
        ipfs_gateway: state.ticketing.gateway().prefix().to_string(),
    })
}

async fn checkin<C: TicketContract, M: MetadataSource>(
    State(state): State<AppState<C, M>>,
    Query(query): Query<CheckinQuery>,
) -> Result<Response, ServerError> {
    let parse = |v: Option<String>| v.and_then(|v| v.trim().parse::<TokenId>().ok());
    let (Some(token_id), Some(event_id)) = (parse(query.token_id), parse(query.event_id)) else {
        return Err(ServerError::BadRequest(MISSING_CHECKIN_PARAMS.into()));
    };

    verify(&state, CheckinCode::new(token_id, event_id)).await
}

async fn scan<C: TicketContract, M: MetadataSource>(
    State(state): State<AppState<C, M>>,
    Query(query): Query<ScanQuery>,
) -> Result<Response, ServerError> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("Missing code".into()))?;
    let code: CheckinCode = code
        .parse()
        .map_err(|e: snicket_shared::SharedError| ServerError::BadRequest(e.to_string()))?;

    verify(&state, code).await
}

/// Valid tickets answer 200, mismatches 400 with the owner still reported.
async fn verify<C: TicketContract, M: MetadataSource>(
    state: &AppState<C, M>,
    code: CheckinCode,
) -> Result<Response, ServerError> {
    let outcome = state
        .ticketing
        .verify_checkin(code.token_id, code.event_id)
        .await
        .map_err(|e| {
            warn!(token_id = %code.token_id, event_id = %code.event_id, error = %e, "Check-in failed");
            ServerError::CheckinFailed(failure_reason(e))
        })?;

    let status = if outcome.valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(outcome)).into_response())
}

fn failure_reason(e: ClientError) -> String {
    match e {
        ClientError::Chain(chain) => chain.reason(),
        other => other.to_string(),
    }
}

async fn list_events<C: TicketContract, M: MetadataSource>(
    State(state): State<AppState<C, M>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventView>>, ServerError> {
    let filter: EventFilter = match query.filter.as_deref() {
        Some(raw) => raw.parse().map_err(ServerError::BadRequest)?,
        None => EventFilter::default(),
    };
    let sort: EventSort = match query.sort.as_deref() {
        Some(raw) => raw.parse().map_err(ServerError::BadRequest)?,
        None => EventSort::default(),
    };

    let events = state.ticketing.active_events().await?;
    let arranged = listing::arrange(&events, filter, sort);
    Ok(Json(arranged.into_iter().map(EventView::from).collect()))
}

async fn featured_events<C: TicketContract, M: MetadataSource>(
    State(state): State<AppState<C, M>>,
) -> Result<Json<Vec<EventView>>, ServerError> {
    let events = state.ticketing.featured_events().await?;
    Ok(Json(events.into_iter().map(EventView::from).collect()))
}

async fn list_tickets<C: TicketContract, M: MetadataSource>(
    State(state): State<AppState<C, M>>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<TicketView>>, ServerError> {
    let owner = parse_address(&owner).map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let tickets = state.ticketing.list_tickets(owner).await?;
    let views = tickets
        .into_iter()
        .map(|ticket| TicketView {
            checkin_link: CheckinCode::new(ticket.token_id, ticket.event_id)
                .to_link(&state.config.public_url),
            ticket,
        })
        .collect();
    Ok(Json(views))
}

pub async fn serve<C, M>(state: AppState<C, M>, addr: SocketAddr) -> anyhow::Result<()>
where
    C: TicketContract + 'static,
    M: MetadataSource + 'static,
{
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

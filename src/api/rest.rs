use crate::api::error::{ApiError, ApiResult};
use crate::api::types::*;
use crate::delivery::DeliveryStatus;
use crate::identity::Mrn;
use crate::relay::{ChannelStatsReport, MessageRelay};
use crate::routing::RoutingDecision;
use crate::store::MessageFilter;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct RestApi {
    relay: Arc<MessageRelay>,
}

impl RestApi {
    pub fn new(relay: Arc<MessageRelay>) -> Self {
        Self { relay }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/v1/messages", get(list_messages))
            .route("/api/v1/messages/:id/status", get(get_status))
            .route("/api/v1/connections", get(list_connections))
            .route("/api/v1/routing/:mrn", get(get_routing))
            .route("/api/v1/channels/stats", get(get_channel_stats))
            .with_state(self.relay.clone())
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::up())
}

async fn get_status(
    State(relay): State<Arc<MessageRelay>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeliveryStatus>> {
    let message_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::NotFound(format!("Message not found: {id}")))?;

    Ok(Json(relay.status(&message_id)?))
}

async fn list_messages(
    State(relay): State<Arc<MessageRelay>>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let mut filter = MessageFilter::default();
    if let Some(sender) = query.sender_mrn.as_deref() {
        filter = filter.sender(parse_mrn("sender_mrn", sender)?);
    }
    if let Some(recipient) = query.recipient_mrn.as_deref() {
        filter = filter.recipient(parse_mrn("recipient_mrn", recipient)?);
    }

    let messages = relay.list_messages(&filter, query.limit);
    Ok(Json(MessagesResponse {
        count: messages.len(),
        messages,
    }))
}

async fn list_connections(State(relay): State<Arc<MessageRelay>>) -> Json<ConnectionsResponse> {
    let connections = relay.connections();
    Json(ConnectionsResponse {
        count: connections.len(),
        connections,
    })
}

async fn get_routing(
    State(relay): State<Arc<MessageRelay>>,
    Path(mrn): Path<String>,
) -> ApiResult<Json<RoutingDecision>> {
    Ok(Json(relay.routing(&mrn)?))
}

async fn get_channel_stats(State(relay): State<Arc<MessageRelay>>) -> Json<ChannelStatsReport> {
    Json(relay.channel_stats())
}

fn parse_mrn(param: &str, value: &str) -> ApiResult<Mrn> {
    Mrn::parse(value).map_err(|e| ApiError::InvalidRequest(format!("{param}: {e}")))
}

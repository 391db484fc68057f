use crate::identity::Mrn;
use crate::store::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP",
            service: "MMS",
            timestamp: Utc::now(),
        }
    }
}

/// Query string for message listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub sender_mrn: Option<String>,
    pub recipient_mrn: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub count: usize,
    pub messages: Vec<Arc<Message>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionsResponse {
    pub count: usize,
    pub connections: Vec<Mrn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

//! Connected-agents endpoint handler.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Response body of `GET /clients`.
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    /// Peer addresses in connection order.
    pub clients: Vec<String>,
    pub count: usize,
    pub capacity: usize,
}

/// Handler for `GET /clients`.
#[instrument(skip(state))]
pub async fn clients_handler(State(state): State<SharedState>) -> Json<ClientsResponse> {
    let roster = &state.collector.roster;
    let clients = roster.list();
    debug!("Serving {} clients for /clients", clients.len());

    Json(ClientsResponse {
        count: clients.len(),
        clients,
        capacity: roster.capacity(),
    })
}

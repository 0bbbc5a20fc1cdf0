//! Route comparison handlers
//!
//! `route.compare` always answers with a success envelope: workflow
//! failures travel as notices inside the outcome.

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::map_surface::MapSessions;
use crate::services::route_compare::RouteComparisonService;
use crate::types::{
    ErrorResponse, Request, RouteSearchRequest, SuccessResponse, SuggestRequest, SuggestResponse,
};

/// Handle route.compare messages
pub async fn handle_compare(
    client: Client,
    mut subscriber: Subscriber,
    service: Arc<RouteComparisonService>,
    sessions: Arc<MapSessions>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.compare message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<RouteSearchRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let map = sessions.get_or_create(request.payload.session_id.as_deref());

        // Searches run concurrently; a slow one must not hold up the next message
        let client = client.clone();
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let outcome = service.compare_routes(&map, &request.payload).await;
            let response = SuccessResponse::new(request.id, outcome);
            match serde_json::to_vec(&response) {
                Ok(bytes) => {
                    if let Err(e) = client.publish(reply, bytes.into()).await {
                        error!("Failed to publish route comparison: {}", e);
                    }
                }
                Err(e) => error!("Failed to serialize route comparison: {}", e),
            }
        });
    }

    Ok(())
}

/// Handle geocode.suggest messages
pub async fn handle_suggest(
    client: Client,
    mut subscriber: Subscriber,
    service: Arc<RouteComparisonService>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received geocode.suggest message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<SuggestRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match service.suggest_locations(&request.payload.query).await {
            Ok(items) => {
                let response = SuccessResponse::new(request.id, SuggestResponse { items });
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                error!("Error fetching autocomplete results: {}", e);
                let error = ErrorResponse::new(request.id, "INTERNAL_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

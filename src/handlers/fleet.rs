//! Fleet handlers for NATS messages

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::fleet::FleetRegistry;
use crate::types::{
    CreateVehicleRequest, EmptyPayload, ErrorResponse, Request, SuccessResponse,
    VehicleListResponse,
};

/// Handle fleet.list messages
pub async fn handle_list(
    client: Client,
    mut subscriber: Subscriber,
    fleet: Arc<FleetRegistry>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received fleet.list message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<EmptyPayload> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let items = fleet.list();
        let response = SuccessResponse::new(request.id, VehicleListResponse {
            total: items.len(),
            items,
        });
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}

/// Handle fleet.create messages
pub async fn handle_create(
    client: Client,
    mut subscriber: Subscriber,
    fleet: Arc<FleetRegistry>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received fleet.create message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<CreateVehicleRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match fleet.add(request.payload) {
            Ok(vehicle) => {
                let response = SuccessResponse::new(request.id, vehicle);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                warn!("Rejected vehicle: {}", e);
                let error = ErrorResponse::new(request.id, "VALIDATION_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

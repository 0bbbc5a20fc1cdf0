//! CO2 estimator handler

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::emissions::EmissionsEstimator;
use crate::types::{EmissionsRequest, ErrorResponse, Request, SuccessResponse};

/// Handle co2.estimate messages
pub async fn handle_estimate(
    client: Client,
    mut subscriber: Subscriber,
    estimator: Arc<EmissionsEstimator>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received co2.estimate message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<EmissionsRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        match estimator.estimate(&request.payload).await {
            Ok(outcome) => {
                let response = SuccessResponse::new(request.id, outcome);
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e) => {
                warn!("Rejected odometer input: {}", e);
                let error = ErrorResponse::new(request.id, "VALIDATION_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

//! Domain errors for the route comparison workflow and the CO2 estimator

use thiserror::Error;

use crate::types::{Notice, NoticeKind, RoutePolicy};

/// Failures inside the route comparison workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Please enter both start and stop locations.")]
    MissingLocations,

    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    #[error("Geocoding '{query}' failed: {message}")]
    Geocoding { query: String, message: String },

    #[error("No {policy} route found. Please try different locations.")]
    NoRoute { policy: RoutePolicy },

    #[error("Error calculating {policy} route: {message}")]
    Routing { policy: RoutePolicy, message: String },
}

impl WorkflowError {
    pub fn kind(&self) -> NoticeKind {
        match self {
            WorkflowError::MissingLocations => NoticeKind::Validation,
            WorkflowError::LocationNotFound { .. } | WorkflowError::Geocoding { .. } => {
                NoticeKind::Geocoding
            }
            WorkflowError::NoRoute { .. } | WorkflowError::Routing { .. } => NoticeKind::Routing,
        }
    }

    pub fn to_notice(&self) -> Notice {
        Notice::new(self.kind(), self.to_string())
    }
}

/// Odometer input rejected before any network call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("Both initial and final odometer readings are required")]
    MissingReading,

    #[error("Odometer reading '{0}' is not a number")]
    InvalidReading(String),

    #[error("Final odometer reading ({final_reading}) must be greater than the initial reading ({initial})")]
    NonIncreasing { initial: f64, final_reading: f64 },
}

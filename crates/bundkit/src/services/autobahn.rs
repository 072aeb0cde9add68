//! Autobahn GmbH traffic API

use std::time::Duration;

use clap::builder::PossibleValue;
use clap::{Args, Subcommand, ValueEnum};

use super::Operation;
use crate::error::ApiError;
use crate::types::ApiRequest;

/// Autobahn API base URL
pub const BASE_URL: &str = "https://verkehr.autobahn.de/o/autobahn";

const TIMEOUT: Duration = Duration::from_secs(15);

/// German highway traffic information
#[derive(Args, Debug, Clone)]
pub struct Autobahn {
    #[command(subcommand)]
    pub command: AutobahnCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AutobahnCommand {
    /// List all available highways
    Roads,
    /// List items for a road and service type
    Services {
        /// Road ID (e.g. A1, A23, B1)
        road_id: String,
        /// Service type
        #[arg(value_enum)]
        service: ServiceType,
    },
    /// Get details for a specific item
    Details {
        /// Service type
        #[arg(value_enum)]
        service: ServiceType,
        /// Item ID (base64-encoded)
        item_id: String,
    },
}

/// Per-road data sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Roadworks,
    Webcam,
    ParkingLorry,
    Warning,
    Closure,
    ElectricChargingStation,
}

impl ServiceType {
    const ALL: [Self; 6] = [
        ServiceType::Roadworks,
        ServiceType::Webcam,
        ServiceType::ParkingLorry,
        ServiceType::Warning,
        ServiceType::Closure,
        ServiceType::ElectricChargingStation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Roadworks => "roadworks",
            ServiceType::Webcam => "webcam",
            ServiceType::ParkingLorry => "parking_lorry",
            ServiceType::Warning => "warning",
            ServiceType::Closure => "closure",
            ServiceType::ElectricChargingStation => "electric_charging_station",
        }
    }
}

impl ValueEnum for ServiceType {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.as_str()))
    }
}

impl Operation for Autobahn {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        let request = ApiRequest::new(BASE_URL, TIMEOUT);
        match &self.command {
            // The road list lives at the collection root, trailing slash included
            AutobahnCommand::Roads => Ok(request.segment("")),
            AutobahnCommand::Services { road_id, service } => {
                let road_id = road_id.trim();
                if road_id.is_empty() {
                    return Err(ApiError::validation("Road ID must not be empty"));
                }
                Ok(request.segments([road_id, "services", service.as_str()]))
            }
            AutobahnCommand::Details { service, item_id } => {
                if item_id.is_empty() {
                    return Err(ApiError::validation("Item ID must not be empty"));
                }
                Ok(request.segments(["details", service.as_str(), item_id.as_str()]))
            }
        }
    }
}

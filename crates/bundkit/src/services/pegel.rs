//! Pegel-Online water level API
//!
//! The only upstream here that reports errors as JSON with a `msg` field,
//! so its requests use upstream error messages.

use std::time::Duration;

use clap::{Args, Subcommand};

use super::Operation;
use crate::error::ApiError;
use crate::types::ApiRequest;

/// Pegel-Online REST API base URL
pub const BASE_URL: &str = "https://www.pegelonline.wsv.de/webservices/rest-api/v2";

const TIMEOUT: Duration = Duration::from_secs(15);

/// German water levels
#[derive(Args, Debug, Clone)]
pub struct Pegel {
    #[command(subcommand)]
    pub command: PegelCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PegelCommand {
    /// List all stations
    Stations {
        /// Filter by water body (e.g. RHEIN)
        #[arg(long)]
        water: Option<String>,
        /// Fuzzy station name search
        #[arg(long)]
        fuzzy: Option<String>,
        /// Filter by timeseries (e.g. W, Q, WT)
        #[arg(long)]
        timeseries: Option<String>,
        /// Include current measurement
        #[arg(long)]
        current: bool,
    },
    /// Details for a specific station
    Station {
        /// Station UUID, name, or gauge number
        id: String,
        /// Include current measurement
        #[arg(long)]
        current: bool,
    },
    /// Historical measurement values
    Measurements {
        /// Station UUID, name, or gauge number
        id: String,
        /// Timeseries type (e.g. W, Q, WT)
        timeseries: String,
        /// Start time (ISO 8601 or period like P7D)
        #[arg(long)]
        start: Option<String>,
        /// End time (ISO 8601)
        #[arg(long)]
        end: Option<String>,
    },
    /// List all water bodies
    Waters,
}

fn base() -> ApiRequest {
    ApiRequest::new(BASE_URL, TIMEOUT)
        .upstream_error_messages()
        .param("prettyprint", Some("false"))
}

fn with_current(request: ApiRequest, current: bool) -> ApiRequest {
    if current {
        request
            .param("includeTimeseries", Some("true"))
            .param("includeCurrentMeasurement", Some("true"))
    } else {
        request
    }
}

fn require(value: &str, what: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::validation(format!("{} must not be empty", what)))
    } else {
        Ok(())
    }
}

impl Operation for Pegel {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        match &self.command {
            PegelCommand::Stations {
                water,
                fuzzy,
                timeseries,
                current,
            } => {
                let request = base()
                    .segment("stations.json")
                    .param("waters", water.clone())
                    .param("fuzzyId", fuzzy.clone())
                    .param("timeseries", timeseries.clone());
                Ok(with_current(request, *current))
            }
            PegelCommand::Station { id, current } => {
                require(id, "Station ID")?;
                let request = base().segments(["stations".to_string(), format!("{}.json", id)]);
                Ok(with_current(request, *current))
            }
            PegelCommand::Measurements {
                id,
                timeseries,
                start,
                end,
            } => {
                require(id, "Station ID")?;
                require(timeseries, "Timeseries")?;
                Ok(base()
                    .segments([
                        "stations",
                        id.as_str(),
                        timeseries.as_str(),
                        "measurements.json",
                    ])
                    .param("start", start.clone())
                    .param("end", end.clone()))
            }
            PegelCommand::Waters => Ok(base().segment("waters.json")),
        }
    }
}

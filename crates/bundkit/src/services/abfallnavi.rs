//! Abfallnavi waste collection API (regio iT)
//!
//! Every participating region runs its own host, so the base URL is derived
//! from the selected region.

use std::time::Duration;

use clap::builder::PossibleValue;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;

use super::{any_field_contains, filter_items, Operation};
use crate::error::ApiError;
use crate::types::ApiRequest;

const TIMEOUT: Duration = Duration::from_secs(15);

/// Waste collection schedules
#[derive(Args, Debug, Clone)]
pub struct Abfallnavi {
    /// Region identifier
    #[arg(short, long, value_enum, default_value_t = Region::Nuernberg, global = true)]
    pub region: Region,

    #[command(subcommand)]
    pub command: AbfallnaviCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AbfallnaviCommand {
    /// List locations in region
    Orte,
    /// List streets in a location
    Strassen {
        /// Location ID
        ort_id: u64,
        /// Filter street names (case-insensitive substring)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Get house numbers for a street
    Hausnummern {
        /// Street ID
        strassen_id: u64,
    },
    /// List waste types
    Fraktionen {
        /// House number ID
        #[arg(long)]
        hausnummern_id: Option<u64>,
        /// Street ID
        #[arg(long)]
        strassen_id: Option<u64>,
    },
    /// Get collection dates
    Termine {
        /// House number ID
        #[arg(long)]
        hausnummern_id: Option<u64>,
        /// Street ID
        #[arg(long)]
        strassen_id: Option<u64>,
        /// Waste type ID (repeatable)
        #[arg(long)]
        fraktion: Vec<u64>,
    },
}

/// Regions served by Abfallnavi
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Aachen,
    Zew2,
    AwBgl2,
    Bav,
    Din,
    Dorsten,
    Gt2,
    Hlv,
    Coe,
    Krhs,
    Pi,
    Krwaf,
    Lindlar,
    Stl,
    Nds,
    Nuernberg,
    Roe,
    Solingen,
    Wml2,
}

impl Region {
    const ALL: [Self; 19] = [
        Region::Aachen,
        Region::Zew2,
        Region::AwBgl2,
        Region::Bav,
        Region::Din,
        Region::Dorsten,
        Region::Gt2,
        Region::Hlv,
        Region::Coe,
        Region::Krhs,
        Region::Pi,
        Region::Krwaf,
        Region::Lindlar,
        Region::Stl,
        Region::Nds,
        Region::Nuernberg,
        Region::Roe,
        Region::Solingen,
        Region::Wml2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Aachen => "aachen",
            Region::Zew2 => "zew2",
            Region::AwBgl2 => "aw-bgl2",
            Region::Bav => "bav",
            Region::Din => "din",
            Region::Dorsten => "dorsten",
            Region::Gt2 => "gt2",
            Region::Hlv => "hlv",
            Region::Coe => "coe",
            Region::Krhs => "krhs",
            Region::Pi => "pi",
            Region::Krwaf => "krwaf",
            Region::Lindlar => "lindlar",
            Region::Stl => "stl",
            Region::Nds => "nds",
            Region::Nuernberg => "nuernberg",
            Region::Roe => "roe",
            Region::Solingen => "solingen",
            Region::Wml2 => "wml2",
        }
    }

    /// REST root for this region
    pub fn base_url(self) -> String {
        let region = self.as_str();
        format!(
            "https://{}-abfallapp.regioit.de/abfall-app-{}/rest",
            region, region
        )
    }
}

impl ValueEnum for Region {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.as_str()))
    }
}

impl Abfallnavi {
    fn base(&self) -> ApiRequest {
        ApiRequest::new(self.region.base_url(), TIMEOUT)
            .with_context(format!("region '{}'", self.region.as_str()))
    }
}

impl Operation for Abfallnavi {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        let request = self.base();
        match &self.command {
            AbfallnaviCommand::Orte => Ok(request.segment("orte")),
            AbfallnaviCommand::Strassen { ort_id, .. } => {
                Ok(request.segments(["orte".to_string(), ort_id.to_string(), "strassen".to_string()]))
            }
            AbfallnaviCommand::Hausnummern { strassen_id } => {
                Ok(request.segments(["strassen".to_string(), strassen_id.to_string()]))
            }
            AbfallnaviCommand::Fraktionen {
                hausnummern_id,
                strassen_id,
            } => Ok(match (hausnummern_id, strassen_id) {
                (Some(id), _) => request.segments([
                    "hausnummern".to_string(),
                    id.to_string(),
                    "fraktionen".to_string(),
                ]),
                (None, Some(id)) => request.segments([
                    "strassen".to_string(),
                    id.to_string(),
                    "fraktionen".to_string(),
                ]),
                (None, None) => request.segment("fraktionen"),
            }),
            AbfallnaviCommand::Termine {
                hausnummern_id,
                strassen_id,
                fraktion,
            } => {
                if fraktion.is_empty() {
                    return Err(ApiError::validation(
                        "At least one --fraktion ID is required",
                    ));
                }
                let (parent, id) = match (hausnummern_id, strassen_id) {
                    (Some(id), _) => ("hausnummern", id),
                    (None, Some(id)) => ("strassen", id),
                    (None, None) => {
                        return Err(ApiError::validation(
                            "Either --strassen-id or --hausnummern-id is required",
                        ))
                    }
                };
                Ok(request
                    .segments([parent.to_string(), id.to_string(), "termine".to_string()])
                    .repeated_param("fraktion", fraktion))
            }
        }
    }

    fn shape(&self, payload: Value) -> Result<Value, ApiError> {
        match &self.command {
            AbfallnaviCommand::Strassen {
                filter: Some(filter),
                ..
            } => {
                let needle = filter.to_lowercase();
                Ok(filter_items(payload, |street| {
                    any_field_contains(street, &["name"], &needle)
                }))
            }
            _ => Ok(payload),
        }
    }
}

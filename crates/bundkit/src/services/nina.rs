//! NINA civil-protection warnings (warnung.bund.de)

use std::time::Duration;

use clap::builder::PossibleValue;
use clap::{Args, Subcommand, ValueEnum};

use super::Operation;
use crate::error::ApiError;
use crate::types::ApiRequest;

/// NINA API base URL
pub const BASE_URL: &str = "https://warnung.bund.de/api31";

const TIMEOUT: Duration = Duration::from_secs(15);

/// Length of an Amtlicher Regionalschlüssel
const ARS_LEN: usize = 12;

/// German civil-protection warnings
#[derive(Args, Debug, Clone)]
pub struct Nina {
    #[command(subcommand)]
    pub command: NinaCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NinaCommand {
    /// Current warnings for a district
    Dashboard {
        /// 12-digit ARS code (e.g. 091620000000)
        ars: String,
    },
    /// Full details of a warning
    Details {
        /// Warning identifier
        id: String,
    },
    /// All current warnings from a source
    Mapdata {
        /// Warning source
        #[arg(value_enum)]
        source: Source,
    },
}

/// Warning sources publishing map data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Dwd,
    Mowas,
    Katwarn,
    Biwapp,
    Lhp,
    Police,
}

impl Source {
    const ALL: [Self; 6] = [
        Source::Dwd,
        Source::Mowas,
        Source::Katwarn,
        Source::Biwapp,
        Source::Lhp,
        Source::Police,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Dwd => "dwd",
            Source::Mowas => "mowas",
            Source::Katwarn => "katwarn",
            Source::Biwapp => "biwapp",
            Source::Lhp => "lhp",
            Source::Police => "police",
        }
    }
}

impl ValueEnum for Source {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.as_str()))
    }
}

impl Operation for Nina {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        let request = ApiRequest::new(BASE_URL, TIMEOUT);
        match &self.command {
            NinaCommand::Dashboard { ars } => {
                validate_ars(ars)?;
                Ok(request.segments(["dashboard".to_string(), format!("{}.json", ars)]))
            }
            NinaCommand::Details { id } => {
                if id.trim().is_empty() {
                    return Err(ApiError::validation("Warning identifier must not be empty"));
                }
                Ok(request.segments(["warnings".to_string(), format!("{}.json", id.trim())]))
            }
            NinaCommand::Mapdata { source } => {
                Ok(request.segments([source.as_str(), "mapData.json"]))
            }
        }
    }
}

fn validate_ars(ars: &str) -> Result<(), ApiError> {
    if ars.len() == ARS_LEN && ars.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Invalid ARS '{}': expected {} digits (e.g. 091620000000)",
            ars, ARS_LEN
        )))
    }
}

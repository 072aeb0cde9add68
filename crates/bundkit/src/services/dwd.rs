//! Deutscher Wetterdienst (warnwetter app API)
//!
//! Forecast payloads are keyed by station id and carry a week of hourly
//! series per station; warning payloads can be tens of megabytes once region
//! polygons are included. Both are cut down before output.

use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;

use super::Operation;
use crate::error::ApiError;
use crate::shape::{limit_keyed_maps, limit_list, strip_keys, strip_object, trim_forecast};
use crate::types::{ApiRequest, Limit};

/// Forecast API base URL
pub const FORECAST_BASE_URL: &str = "https://app-prod-ws.warnwetter.de/v30";

/// Static warning files base URL
pub const STATIC_BASE_URL: &str =
    "https://s3.eu-central-1.amazonaws.com/app-prod-static.warnwetter.de/v16";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Keys dropped from every warning
const WARNING_STRIP_KEYS: &[&str] = &["instructionHtml", "descriptionHtml"];

/// Geometry dropped from every warning region
const REGION_STRIP_KEYS: &[&str] = &["polygonGeometry", "polygon", "triangles"];

/// Members of a warnings payload that are never treated as region maps
const KEYED_MAP_SKIP: &[&str] = &["warnings", "time", "binnenSee"];

/// Image and HTML fields dropped from crowd reports
const CROWD_STRIP_KEYS: &[&str] = &[
    "imageUrl",
    "imageThumbUrl",
    "imageMediumUrl",
    "blurHash",
    "imageThumbWidth",
    "imageThumbHeight",
    "zusatzAttribute",
    "instructionHtml",
    "descriptionHtml",
];

/// DWD weather data and warnings
#[derive(Args, Debug, Clone)]
pub struct Dwd {
    /// Max items to return
    #[arg(long, default_value_t = Limit::default(), global = true)]
    pub limit: Limit,

    #[command(subcommand)]
    pub command: DwdCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DwdCommand {
    /// Weather forecast for stations
    Forecast {
        /// Station ID(s), comma-separated (e.g. 10865,10382)
        station_ids: String,
    },
    /// Current weather warnings
    Warnings {
        /// Warning type
        #[arg(value_enum)]
        kind: WarningType,
    },
    /// Crowd-sourced weather reports
    Crowd,
}

/// Published warning files
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WarningType {
    #[value(name = "nowcast")]
    Nowcast,
    #[value(name = "nowcast_en")]
    NowcastEn,
    #[value(name = "gemeinde")]
    Gemeinde,
    #[value(name = "gemeinde_en")]
    GemeindeEn,
    #[value(name = "coast")]
    Coast,
    #[value(name = "coast_en")]
    CoastEn,
    #[value(name = "sea")]
    Sea,
    #[value(name = "alpen")]
    Alpen,
    #[value(name = "lawine")]
    Lawine,
}

impl WarningType {
    /// File name under [`STATIC_BASE_URL`]
    pub fn file(self) -> &'static str {
        match self {
            WarningType::Nowcast => "warnings_nowcast.json",
            WarningType::NowcastEn => "warnings_nowcast_en.json",
            WarningType::Gemeinde => "gemeinde_warnings_v2.json",
            WarningType::GemeindeEn => "gemeinde_warnings_v2_en.json",
            WarningType::Coast => "warnings_coast.json",
            WarningType::CoastEn => "warnings_coast_en.json",
            WarningType::Sea => "sea_warning_text.json",
            WarningType::Alpen => "alpen_forecast_text_dwms.json",
            WarningType::Lawine => "warnings_lawine.json",
        }
    }
}

impl Operation for Dwd {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        match &self.command {
            DwdCommand::Forecast { station_ids } => {
                let ids = validate_station_ids(station_ids)?;
                Ok(ApiRequest::new(FORECAST_BASE_URL, TIMEOUT)
                    .segment("stationOverviewExtended")
                    .param("stationIds", Some(ids)))
            }
            DwdCommand::Warnings { kind } => {
                Ok(ApiRequest::new(STATIC_BASE_URL, TIMEOUT).segment(kind.file()))
            }
            DwdCommand::Crowd => Ok(ApiRequest::new(STATIC_BASE_URL, TIMEOUT)
                .segment("crowd_meldungen_overview_v2.json")),
        }
    }

    fn shape(&self, mut payload: Value) -> Result<Value, ApiError> {
        match &self.command {
            DwdCommand::Forecast { .. } => trim_forecast(&mut payload),
            DwdCommand::Warnings { .. } => {
                if let Value::Object(doc) = &mut payload {
                    shape_warnings(doc, self.limit);
                }
            }
            DwdCommand::Crowd => {
                if let Value::Object(doc) = &mut payload {
                    limit_list(doc, "meldungen", self.limit);
                    if let Some(Value::Array(reports)) = doc.get_mut("meldungen") {
                        strip_keys(reports, CROWD_STRIP_KEYS);
                    }
                }
            }
        }
        Ok(payload)
    }
}

/// Truncate the warning list, strip bulk from what is left, then cut any
/// region-keyed maps
fn shape_warnings(doc: &mut serde_json::Map<String, Value>, limit: Limit) {
    limit_list(doc, "warnings", limit);

    if let Some(Value::Array(warnings)) = doc.get_mut("warnings") {
        for warning in warnings.iter_mut() {
            let Value::Object(warning) = warning else {
                continue;
            };
            if let Some(Value::Array(regions)) = warning.get_mut("regions") {
                strip_keys(regions, REGION_STRIP_KEYS);
            }
            strip_object(warning, WARNING_STRIP_KEYS);
        }
    }

    limit_keyed_maps(doc, limit, KEYED_MAP_SKIP);
}

/// Comma-separated alphanumeric station ids, whitespace around commas removed
fn validate_station_ids(raw: &str) -> Result<String, ApiError> {
    let ids: Vec<&str> = raw.split(',').map(str::trim).collect();
    let valid = ids
        .iter()
        .all(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()));
    if !valid {
        return Err(ApiError::validation(format!(
            "Invalid station ID list '{}': expected comma-separated IDs like 10865,10382",
            raw
        )));
    }
    Ok(ids.join(","))
}

//! Upstream API clients
//!
//! Each module owns one upstream API: its base URL, allow-lists and the
//! closed set of operations it supports. [`Service`] dispatches to them
//! with an exhaustive match.

pub mod abfallnavi;
pub mod autobahn;
pub mod dwd;
pub mod hilfsmittel;
pub mod nina;
pub mod pegel;
pub mod travelwarning;

use clap::Subcommand;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::ApiRequest;

/// One invocable operation against an upstream API
pub trait Operation {
    /// Validate caller input and build the request.
    ///
    /// Must not touch the network; a validation error here means no request
    /// is ever sent.
    fn request(&self) -> Result<ApiRequest, ApiError>;

    /// Reduce the decoded payload to the output document
    fn shape(&self, payload: Value) -> Result<Value, ApiError> {
        Ok(payload)
    }
}

/// All supported upstream APIs
#[derive(Subcommand, Debug, Clone)]
pub enum Service {
    /// Deutscher Wetterdienst: forecasts, warnings, crowd reports
    Dwd(dwd::Dwd),
    /// NINA civil-protection warnings
    Nina(nina::Nina),
    /// Autobahn traffic: roadworks, closures, webcams, parking
    Autobahn(autobahn::Autobahn),
    /// Auswärtiges Amt travel warnings and representations
    Travelwarning(travelwarning::TravelWarning),
    /// Pegel-Online water levels
    Pegel(pegel::Pegel),
    /// Abfallnavi waste collection schedules
    Abfallnavi(abfallnavi::Abfallnavi),
    /// GKV Hilfsmittelverzeichnis (medical aids registry)
    Hilfsmittel(hilfsmittel::Hilfsmittel),
}

impl Service {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Service::Dwd(_) => "dwd",
            Service::Nina(_) => "nina",
            Service::Autobahn(_) => "autobahn",
            Service::Travelwarning(_) => "travelwarning",
            Service::Pegel(_) => "pegel",
            Service::Abfallnavi(_) => "abfallnavi",
            Service::Hilfsmittel(_) => "hilfsmittel",
        }
    }

    fn operation(&self) -> &dyn Operation {
        match self {
            Service::Dwd(op) => op,
            Service::Nina(op) => op,
            Service::Autobahn(op) => op,
            Service::Travelwarning(op) => op,
            Service::Pegel(op) => op,
            Service::Abfallnavi(op) => op,
            Service::Hilfsmittel(op) => op,
        }
    }
}

impl Operation for Service {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        self.operation().request()
    }

    fn shape(&self, payload: Value) -> Result<Value, ApiError> {
        self.operation().shape(payload)
    }
}

/// Keep the list elements matching `keep`; non-list payloads pass through
pub(crate) fn filter_items<F>(payload: Value, keep: F) -> Value
where
    F: FnMut(&Value) -> bool,
{
    match payload {
        Value::Array(mut items) => {
            items.retain(keep);
            Value::Array(items)
        }
        other => other,
    }
}

/// Case-insensitive substring match on string fields of `item`
pub(crate) fn any_field_contains(item: &Value, fields: &[&str], needle_lower: &str) -> bool {
    fields.iter().any(|field| {
        item.get(*field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(needle_lower))
    })
}

//! Auswärtiges Amt open data: travel warnings and diplomatic representations
//!
//! Every payload is either `{"response": {...}}` or the inner object itself.
//! The inner object lists ids in `contentList`; each id is also a key of the
//! same object holding that entry.

use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Operation;
use crate::convert::html_to_plain;
use crate::error::ApiError;
use crate::shape::limit_list;
use crate::types::{ApiRequest, Limit};

/// Travel warning open data base URL
pub const BASE_URL: &str = "https://www.auswaertiges-amt.de/opendata";

const TIMEOUT: Duration = Duration::from_secs(15);

/// Upstream spells some keys in two casings; the first is canonical
const KEY_ALIASES: &[(&str, &str)] = &[
    ("countryCode", "CountryCode"),
    ("countryName", "CountryName"),
];

/// Members of a country block that are not representations
const BLOCK_META_KEYS: &[&str] = &["contentList", "lastModified", "country"];

/// German travel warnings
#[derive(Args, Debug, Clone)]
pub struct TravelWarning {
    #[command(subcommand)]
    pub command: TravelWarningCommand,
}

/// Shared `--limit`/`--country` options
#[derive(Args, Debug, Clone, Default)]
pub struct ListOptions {
    /// Max items
    #[arg(long, default_value_t = Limit::default())]
    pub limit: Limit,
    /// Filter by country code (list) or country name (embassies)
    #[arg(long)]
    pub country: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TravelWarningCommand {
    /// All countries with warning status
    List(ListOptions),
    /// Full warning text for a country
    Detail {
        /// Content ID from list command
        content_id: String,
    },
    /// German representations abroad
    EmbassiesAbroad(ListOptions),
    /// Foreign representations in Germany
    EmbassiesInGermany(ListOptions),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WarningSummary {
    content_id: String,
    last_modified: Value,
    title: Value,
    country_code: Value,
    country_name: Value,
    warning: Value,
    partial_warning: Value,
    situation_warning: Value,
    situation_part_warning: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WarningDetail {
    content_id: String,
    title: Value,
    country_code: Value,
    country_name: Value,
    last_modified: Value,
    warning: Value,
    partial_warning: Value,
    content: String,
}

#[derive(Debug, Serialize)]
struct Representation {
    description: Value,
    leader: Value,
    country: Value,
    city: Value,
    address: Value,
    phone: Value,
    fax: Value,
    website: Value,
}

impl Operation for TravelWarning {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        let request = ApiRequest::new(BASE_URL, TIMEOUT);
        match &self.command {
            TravelWarningCommand::List(_) => Ok(request.segment("travelwarning")),
            TravelWarningCommand::Detail { content_id } => {
                let content_id = content_id.trim();
                if content_id.is_empty() {
                    return Err(ApiError::validation("Content ID must not be empty"));
                }
                Ok(request.segments(["travelwarning", content_id]))
            }
            TravelWarningCommand::EmbassiesAbroad(_) => {
                Ok(request.segment("representativesInCountry"))
            }
            TravelWarningCommand::EmbassiesInGermany(_) => {
                Ok(request.segment("representativesInGermany"))
            }
        }
    }

    fn shape(&self, payload: Value) -> Result<Value, ApiError> {
        let response = unwrap_response(payload);
        match &self.command {
            TravelWarningCommand::List(options) => list_warnings(response, options),
            TravelWarningCommand::Detail { content_id } => warning_detail(response, content_id.trim()),
            TravelWarningCommand::EmbassiesAbroad(options)
            | TravelWarningCommand::EmbassiesInGermany(options) => {
                representations(response, options)
            }
        }
    }
}

/// The object holding `contentList`, whether wrapped in `response` or not
fn unwrap_response(payload: Value) -> Map<String, Value> {
    match payload {
        Value::Object(mut obj) => match obj.remove("response") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                obj.insert("response".to_string(), other);
                obj
            }
            None => obj,
        },
        _ => Map::new(),
    }
}

/// Rewrite alternate key casings to the canonical one.
///
/// When both casings are present the capitalised one wins, matching how the
/// upstream fills them.
pub fn normalize_entry(entry: &mut Map<String, Value>) {
    for (canonical, alias) in KEY_ALIASES {
        if let Some(value) = entry.remove(*alias) {
            entry.insert(canonical.to_string(), value);
        }
    }
}

/// `contentList` ids as strings, whether upstream sent numbers or strings
fn content_ids(response: &Map<String, Value>) -> Vec<String> {
    response
        .get("contentList")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| match id {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn field(entry: &Map<String, Value>, key: &str) -> Value {
    entry.get(key).cloned().unwrap_or(Value::Null)
}

fn flag(entry: &Map<String, Value>, key: &str) -> Value {
    entry.get(key).cloned().unwrap_or(Value::Bool(false))
}

fn list_warnings(mut response: Map<String, Value>, options: &ListOptions) -> Result<Value, ApiError> {
    let wanted = options.country.as_deref().map(str::to_uppercase);
    let mut warnings = Vec::new();

    for id in content_ids(&response) {
        let Some(Value::Object(mut entry)) = response.remove(&id) else {
            continue;
        };
        normalize_entry(&mut entry);

        if let Some(wanted) = &wanted {
            let code = entry.get("countryCode").and_then(Value::as_str);
            if code.map(str::to_uppercase).as_deref() != Some(wanted.as_str()) {
                continue;
            }
        }

        warnings.push(serde_json::to_value(WarningSummary {
            last_modified: field(&entry, "lastModified"),
            title: field(&entry, "title"),
            country_code: field(&entry, "countryCode"),
            country_name: field(&entry, "countryName"),
            warning: flag(&entry, "warning"),
            partial_warning: flag(&entry, "partialWarning"),
            situation_warning: flag(&entry, "situationWarning"),
            situation_part_warning: flag(&entry, "situationPartWarning"),
            content_id: id,
        })?);
    }

    let mut doc = Map::new();
    doc.insert("warnings".to_string(), Value::Array(warnings));
    limit_list(&mut doc, "warnings", options.limit);
    Ok(Value::Object(doc))
}

fn warning_detail(mut response: Map<String, Value>, content_id: &str) -> Result<Value, ApiError> {
    let mut entry = match response.remove(content_id) {
        Some(Value::Object(entry)) if !entry.is_empty() => entry,
        _ => {
            return Err(ApiError::NoData(format!(
                "No data for contentId {}",
                content_id
            )))
        }
    };
    normalize_entry(&mut entry);

    let content = entry
        .get("content")
        .and_then(Value::as_str)
        .map(html_to_plain)
        .unwrap_or_default();

    Ok(serde_json::to_value(WarningDetail {
        content_id: content_id.to_string(),
        title: field(&entry, "title"),
        country_code: field(&entry, "countryCode"),
        country_name: field(&entry, "countryName"),
        last_modified: field(&entry, "lastModified"),
        warning: flag(&entry, "warning"),
        partial_warning: flag(&entry, "partialWarning"),
        content,
    })?)
}

fn representations(mut response: Map<String, Value>, options: &ListOptions) -> Result<Value, ApiError> {
    let mut results = Vec::new();

    for id in content_ids(&response) {
        let Some(Value::Object(block)) = response.remove(&id) else {
            continue;
        };
        let block_country = block
            .get("country")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));

        for (key, entry) in &block {
            let Value::Object(entry) = entry else {
                continue;
            };
            if BLOCK_META_KEYS.contains(&key.as_str()) {
                continue;
            }
            results.push(Representation {
                description: field(entry, "description"),
                leader: field(entry, "leader"),
                country: entry
                    .get("country")
                    .cloned()
                    .unwrap_or_else(|| block_country.clone()),
                city: field(entry, "city"),
                address: field(entry, "address"),
                phone: field(entry, "phone"),
                fax: field(entry, "fax"),
                website: field(entry, "website"),
            });
        }
    }

    if let Some(country) = options.country.as_deref() {
        let wanted = country.trim().to_uppercase();
        results.retain(|r| r.country.as_str().unwrap_or("").to_uppercase() == wanted);
    }

    let mut doc = Map::new();
    doc.insert("representations".to_string(), serde_json::to_value(results)?);
    limit_list(&mut doc, "representations", options.limit);
    Ok(Value::Object(doc))
}

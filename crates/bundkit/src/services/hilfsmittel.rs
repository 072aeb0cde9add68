//! GKV Hilfsmittelverzeichnis (registry of medical aids)

use std::time::Duration;

use clap::{Args, Subcommand};
use serde_json::Value;

use super::{any_field_contains, filter_items, Operation};
use crate::error::ApiError;
use crate::types::ApiRequest;

/// Registry API base URL
pub const BASE_URL: &str = "https://hilfsmittel-api.gkv-spitzenverband.de/api/verzeichnis";

const TIMEOUT: Duration = Duration::from_secs(30);

/// Tree node fields searched by `tree --filter`
const TREE_FILTER_FIELDS: &[&str] = &["displayValue", "xSteller"];

/// German registry of medical aids
#[derive(Args, Debug, Clone)]
pub struct Hilfsmittel {
    #[command(subcommand)]
    pub command: HilfsmittelCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HilfsmittelCommand {
    /// Browse product tree (levels 1-4)
    Tree {
        /// Tree depth level
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        level: u8,
        /// Filter nodes by name or xSteller (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Get product group details
    Produktgruppe {
        /// Product group UUID
        id: String,
    },
    /// Get subgroup details
    Untergruppe {
        /// Subgroup UUID
        id: String,
    },
    /// Get product type details
    Produktart {
        /// Product type UUID
        id: String,
    },
    /// Get product details
    Produkt {
        /// Product UUID (required, full list is 30MB+)
        #[arg(long)]
        id: Option<String>,
    },
    /// Get proof/evidence schema
    Nachweis {
        /// Nachweisschema UUID
        id: String,
    },
}

fn by_id(resource: &str, id: &str) -> Result<ApiRequest, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::validation(format!("{} ID must not be empty", resource)));
    }
    Ok(ApiRequest::new(BASE_URL, TIMEOUT).segments([resource, id]))
}

impl Operation for Hilfsmittel {
    fn request(&self) -> Result<ApiRequest, ApiError> {
        match &self.command {
            HilfsmittelCommand::Tree { level, .. } => Ok(ApiRequest::new(BASE_URL, TIMEOUT)
                .segments(["VerzeichnisTree".to_string(), level.to_string()])),
            HilfsmittelCommand::Produktgruppe { id } => by_id("Produktgruppe", id),
            HilfsmittelCommand::Untergruppe { id } => by_id("Untergruppe", id),
            HilfsmittelCommand::Produktart { id } => by_id("Produktart", id),
            HilfsmittelCommand::Nachweis { id } => by_id("Nachweisschema", id),
            HilfsmittelCommand::Produkt { id: Some(id) } => by_id("Produkt", id),
            // The unfiltered product list is tens of megabytes
            HilfsmittelCommand::Produkt { id: None } => Err(ApiError::validation(
                "Listing all products returns 30MB+. Provide --id or use 'tree' to browse.",
            )),
        }
    }

    fn shape(&self, payload: Value) -> Result<Value, ApiError> {
        match &self.command {
            HilfsmittelCommand::Tree {
                filter: Some(filter),
                ..
            } => {
                let needle = filter.to_lowercase();
                Ok(filter_items(payload, |node| {
                    any_field_contains(node, TREE_FILTER_FIELDS, &needle)
                }))
            }
            _ => Ok(payload),
        }
    }
}

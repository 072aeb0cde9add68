//! bundkit - bounded-size JSON clients for German public APIs
//!
//! This crate queries public German government and utility REST APIs
//! (weather, traffic, waste collection, water levels, civil-protection and
//! travel warnings, medical aids registry) and reduces their responses to a
//! size that fits a consumer with a limited context budget.
//!
//! ## Pipeline
//!
//! Each invocation runs one [`Service`] operation through the same steps:
//! 1. [`Operation::request`] validates input and builds an [`ApiRequest`]
//! 2. [`client::fetch`] sends one GET and decodes the body (gzip sniffing,
//!    text fallback for non-JSON)
//! 3. [`Operation::shape`] truncates and strips the payload using the
//!    strategies in [`shape`] and [`convert`]
//!
//! Any failure becomes an [`ApiError`], rendered as `{"error": ...}`.

pub mod client;
pub mod convert;
mod error;
pub mod services;
pub mod shape;
mod tool;
mod types;

pub use client::{decode_body, fetch, FetchOptions};
pub use convert::html_to_plain;
pub use error::ApiError;
pub use services::{Operation, Service};
pub use tool::{Tool, ToolBuilder};
pub use types::{ApiRequest, ErrorDetail, Limit, DEFAULT_LIMIT};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = concat!("bundkit/", env!("CARGO_PKG_VERSION"));

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# bundkit

Queries public German government and utility APIs. Every invocation prints
exactly one line of compact JSON to stdout and exits 0 on success, 1 on error.

## Services
- `dwd [--limit N] forecast <station_ids>` - station forecast, 24 hours / 5 days
- `dwd [--limit N] warnings <type>` - nowcast, nowcast_en, gemeinde, gemeinde_en,
  coast, coast_en, sea, alpen, lawine
- `dwd [--limit N] crowd` - crowd-sourced weather reports
- `nina dashboard <ars>` - warnings for a 12-digit regional key
- `nina details <id>` - one warning in full
- `nina mapdata <source>` - dwd, mowas, katwarn, biwapp, lhp, police
- `autobahn roads` - all highways
- `autobahn services <road_id> <service>` - roadworks, webcam, parking_lorry,
  warning, closure, electric_charging_station
- `autobahn details <service> <item_id>`
- `travelwarning list [--country CC] [--limit N]`
- `travelwarning detail <content_id>` - plain text, max 4000 characters
- `travelwarning embassies-abroad|embassies-in-germany [--country NAME] [--limit N]`
- `pegel stations [--water W] [--fuzzy Q] [--timeseries T] [--current]`
- `pegel station <id> [--current]`
- `pegel measurements <id> <timeseries> [--start S] [--end E]`
- `pegel waters`
- `abfallnavi [-r REGION] orte|strassen|hausnummern|fraktionen|termine ...`
- `hilfsmittel tree <1-4> [--filter S]`
- `hilfsmittel produktgruppe|untergruppe|produktart|nachweis <id>`
- `hilfsmittel produkt --id <id>`

## Truncation metadata
When a list is cut, the output carries `_total`, `_showing` and `_hint`.
When region-keyed maps are cut, it carries `_total_regions` and
`_showing_regions`. No metadata means nothing was removed.

## Non-JSON responses
Returned as `{"text": "<body>"}`.

## Examples

### Weather warnings, first 5
```
bundkit dwd --limit 5 warnings nowcast
```

### Travel warning for one country
```
bundkit travelwarning list --country FR
```

## Error Handling
- Invalid input is rejected before any request: `{"error": "..."}`
- Upstream HTTP errors: `{"error": "HTTP 404 for <url>"}`
- Network failures: `{"error": "Connection failed: <reason>"}`
"#;

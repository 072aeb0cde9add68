//! Integration tests for bundkit using wiremock

use std::io::Write;
use std::time::Duration;

use bundkit::services::abfallnavi::{Abfallnavi, AbfallnaviCommand, Region};
use bundkit::services::dwd::{Dwd, DwdCommand, WarningType};
use bundkit::services::nina::{Nina, NinaCommand};
use bundkit::services::pegel::{Pegel, PegelCommand};
use bundkit::services::travelwarning::{TravelWarning, TravelWarningCommand};
use bundkit::{ApiError, Limit, Service, Tool};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tool(server: &MockServer) -> Tool {
    Tool::builder().base_url(server.uri()).build()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn dwd_warnings(kind: WarningType, limit: usize) -> Service {
    Service::Dwd(Dwd {
        limit: Limit::new(limit).unwrap(),
        command: DwdCommand::Warnings { kind },
    })
}

fn nina_details(id: &str) -> Service {
    Service::Nina(Nina {
        command: NinaCommand::Details { id: id.to_string() },
    })
}

#[tokio::test]
async fn test_warnings_truncated_end_to_end() {
    let mock_server = MockServer::start().await;

    let warnings: Vec<Value> = (0..25)
        .map(|i| json!({ "id": i, "descriptionHtml": "<p>x</p>", "regions": [{ "polygon": [1, 2, 3] }] }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/warnings_nowcast.json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "time": 1700000000,
            "warnings": warnings
        })))
        .mount(&mock_server)
        .await;

    let out = tool(&mock_server)
        .execute(&dwd_warnings(WarningType::Nowcast, 10))
        .await
        .unwrap();

    assert_eq!(out["warnings"].as_array().unwrap().len(), 10);
    assert_eq!(out["_total"], 25);
    assert_eq!(out["_showing"], 10);
    assert!(out["warnings"][0].get("descriptionHtml").is_none());
    assert_eq!(out["warnings"][0]["regions"][0], json!({}));
}

#[tokio::test]
async fn test_gzip_body_without_content_encoding() {
    let mock_server = MockServer::start().await;

    let body = gzip(br#"{"time": 1, "warnings": [{"id": "a"}]}"#);

    Mock::given(method("GET"))
        .and(path("/warnings_coast.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let out = tool(&mock_server)
        .execute(&dwd_warnings(WarningType::Coast, 10))
        .await
        .unwrap();

    assert_eq!(out, json!({ "time": 1, "warnings": [{ "id": "a" }] }));
}

#[tokio::test]
async fn test_gzip_with_content_encoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/warnings_lawine.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip(br#"{"warnings": []}"#))
                .insert_header("content-type", "application/json")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&mock_server)
        .await;

    let out = tool(&mock_server)
        .execute(&dwd_warnings(WarningType::Lawine, 10))
        .await
        .unwrap();

    assert_eq!(out, json!({ "warnings": [] }));
}

#[tokio::test]
async fn test_non_json_body_becomes_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sea_warning_text.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Seewetterbericht: keine Warnungen")
                .insert_header("content-type", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let out = tool(&mock_server)
        .execute(&dwd_warnings(WarningType::Sea, 10))
        .await
        .unwrap();

    assert_eq!(out, json!({ "text": "Seewetterbericht: keine Warnungen" }));
}

#[tokio::test]
async fn test_404_status_and_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/warnings/missing.json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let err = tool(&mock_server)
        .execute(&nina_details("missing"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(
        err.to_document(),
        json!({ "error": format!("HTTP 404 for {}/warnings/missing.json", mock_server.uri()) })
    );
}

#[tokio::test]
async fn test_upstream_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations/NOWHERE.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": 404,
            "msg": "Station 'NOWHERE' could not be found"
        })))
        .mount(&mock_server)
        .await;

    let service = Service::Pegel(Pegel {
        command: PegelCommand::Station {
            id: "NOWHERE".to_string(),
            current: false,
        },
    });
    let err = tool(&mock_server).execute(&service).await.unwrap_err();

    assert_eq!(err.to_string(), "Station 'NOWHERE' could not be found");
}

#[tokio::test]
async fn test_upstream_error_plain_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/waters.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let service = Service::Pegel(Pegel {
        command: PegelCommand::Waters,
    });
    let err = tool(&mock_server).execute(&service).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
}

#[tokio::test]
async fn test_query_parameters_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stationOverviewExtended"))
        .and(query_param("stationIds", "10865,10382"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "10865": { "forecast1": { "temperature": (0..48).collect::<Vec<u32>>() }, "forecast2": {} }
        })))
        .mount(&mock_server)
        .await;

    let service = Service::Dwd(Dwd {
        limit: Limit::default(),
        command: DwdCommand::Forecast {
            station_ids: "10865,10382".to_string(),
        },
    });
    let out = tool(&mock_server).execute(&service).await.unwrap();

    assert!(out["10865"].get("forecast2").is_none());
    assert_eq!(
        out["10865"]["forecast1"]["temperature"].as_array().unwrap().len(),
        24
    );
}

#[tokio::test]
async fn test_repeated_query_parameter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hausnummern/77/termine"))
        .and(query_param("fraktion", "2"))
        .and(query_param("fraktion", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "datum": "2024-05-02", "bezirk": { "fraktionId": 2 } }
        ])))
        .mount(&mock_server)
        .await;

    let service = Service::Abfallnavi(Abfallnavi {
        region: Region::Solingen,
        command: AbfallnaviCommand::Termine {
            hausnummern_id: Some(77),
            strassen_id: None,
            fraktion: vec![2, 5],
        },
    });
    let out = tool(&mock_server).execute(&service).await.unwrap();

    assert_eq!(out[0]["datum"], "2024-05-02");
}

#[tokio::test]
async fn test_error_document_not_shaped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/travelwarning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Service temporarily unavailable"
        })))
        .mount(&mock_server)
        .await;

    let service = Service::Travelwarning(TravelWarning {
        command: TravelWarningCommand::List(Default::default()),
    });
    let out = tool(&mock_server).execute(&service).await.unwrap();

    assert_eq!(out, json!({ "error": "Service temporarily unavailable" }));
}

#[tokio::test]
async fn test_travelwarning_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/travelwarning/199124"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "199124": {
                    "title": "Island: Reise- und Sicherheitshinweise",
                    "CountryCode": "IS",
                    "CountryName": "Island",
                    "warning": false,
                    "content": "<h2>Aktuelles</h2>\n<p>Vulkanische Aktivität.</p>"
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let service = Service::Travelwarning(TravelWarning {
        command: TravelWarningCommand::Detail {
            content_id: "199124".to_string(),
        },
    });
    let out = tool(&mock_server).execute(&service).await.unwrap();

    assert_eq!(out["countryCode"], "IS");
    assert_eq!(out["countryName"], "Island");
    assert_eq!(out["content"], "Aktuelles\nVulkanische Aktivität.");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let tool = Tool::builder()
        .base_url("http://127.0.0.1:1")
        .timeout(Duration::from_secs(5))
        .build();

    let err = tool.execute(&nina_details("x")).await.unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, ApiError::Connect { .. } | ApiError::Timeout { .. }));
    assert!(err.to_document()["error"].is_string());
}

#[tokio::test]
async fn test_validation_sends_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = Service::Abfallnavi(Abfallnavi {
        region: Region::Nuernberg,
        command: AbfallnaviCommand::Termine {
            hausnummern_id: None,
            strassen_id: Some(1),
            fraktion: vec![],
        },
    });
    let err = tool(&mock_server).execute(&service).await.unwrap_err();

    assert!(err.is_validation());
    // expect(0) is verified when mock_server drops
}

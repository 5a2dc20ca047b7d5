mod common;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use pikud_haoref::AlertsConfig;
use pikud_haoref::alerts::{AlertFetcher, AlertType, parse_alert};
use pikud_haoref::error::{ParseError, UpstreamError};
use pikud_haoref::hfc::HfcClient;

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

async fn fetcher_for(body: Vec<u8>) -> AlertFetcher {
    let router = Router::new().route(
        "/alerts.json",
        get(move || {
            let body = body.clone();
            async move { body }
        }),
    );
    let base = common::serve(router).await;
    AlertFetcher::new(
        HfcClient::new_with_client(reqwest::Client::new()),
        AlertsConfig {
            url: format!("{base}/alerts.json"),
            ..AlertsConfig::default()
        },
    )
}

#[tokio::test]
async fn decodes_utf16le_empty_object_as_missiles() {
    let fetcher = fetcher_for(utf16le_with_bom("{}")).await;
    let alert = fetcher.get_active_alert().await.unwrap();
    assert_eq!(alert.alert_type, AlertType::Missiles);
    assert!(alert.cities.is_empty());
    assert_eq!(alert.instructions, None);
}

#[tokio::test]
async fn blank_body_is_no_alert() {
    let fetcher = fetcher_for(b" \r\n ".to_vec()).await;
    let alert = fetcher.get_active_alert().await.unwrap();
    assert_eq!(alert.alert_type, AlertType::None);
    assert!(!alert.is_active());
}

#[tokio::test]
async fn filters_drills_and_duplicates() {
    let body = r#"{"id":"133","cat":"1","title":"ירי רקטות וטילים","data":["תל אביב"," תל אביב ","בדיקה עיר",null,"חיפה"],"desc":"היכנסו למרחב המוגן"}"#;
    let fetcher = fetcher_for(body.as_bytes().to_vec()).await;
    let alert = fetcher.get_active_alert().await.unwrap();
    assert_eq!(alert.alert_type, AlertType::Missiles);
    assert_eq!(alert.cities, ["תל אביב", "חיפה"]);
    assert_eq!(alert.instructions.as_deref(), Some("היכנסו למרחב המוגן"));
}

#[tokio::test]
async fn malformed_json_keeps_the_body() {
    let fetcher = fetcher_for(b"{\"data\": [".to_vec()).await;
    let err = fetcher.get_active_alert().await.unwrap_err();
    match err {
        UpstreamError::Parse(ParseError::Json { body, .. }) => assert_eq!(body, "{\"data\": ["),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_failure_is_fetch_error() {
    let router = Router::new().route(
        "/alerts.json",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = common::serve(router).await;
    let fetcher = AlertFetcher::new(
        HfcClient::new_with_client(reqwest::Client::new()),
        AlertsConfig {
            url: format!("{base}/alerts.json"),
            ..AlertsConfig::default()
        },
    );
    assert!(matches!(
        fetcher.get_active_alert().await,
        Err(UpstreamError::Fetch(_))
    ));
}

#[tokio::test]
async fn sends_referer_and_xhr_headers() {
    let router = Router::new().route(
        "/alerts.json",
        get(|headers: HeaderMap| async move {
            let referer = headers.get("referer").and_then(|v| v.to_str().ok());
            let xhr = headers.get("x-requested-with").and_then(|v| v.to_str().ok());
            if referer == Some("https://www.oref.org.il/11226-he/pakar.aspx")
                && xhr == Some("XMLHttpRequest")
            {
                (StatusCode::OK, r#"{"cat":"6","data":["מטולה"]}"#)
            } else {
                (StatusCode::FORBIDDEN, "")
            }
        }),
    );
    let base = common::serve(router).await;
    let fetcher = AlertFetcher::new(
        HfcClient::new_with_client(reqwest::Client::new()),
        AlertsConfig {
            url: format!("{base}/alerts.json"),
            ..AlertsConfig::default()
        },
    );
    let alert = fetcher.get_active_alert().await.unwrap();
    assert_eq!(alert.alert_type, AlertType::HostileAircraftIntrusion);
    assert_eq!(alert.cities, ["מטולה"]);
}

#[test]
fn maps_every_category_code() {
    let expected = [
        (1, "missiles"),
        (2, "general"),
        (3, "earthQuake"),
        (4, "radiologicalEvent"),
        (5, "tsunami"),
        (6, "hostileAircraftIntrusion"),
        (7, "hazardousMaterials"),
        (13, "terroristInfiltration"),
        (101, "missilesDrill"),
        (102, "generalDrill"),
        (103, "earthQuakeDrill"),
        (104, "radiologicalEventDrill"),
        (105, "tsunamiDrill"),
        (106, "hostileAircraftIntrusionDrill"),
        (107, "hazardousMaterialsDrill"),
        (113, "terroristInfiltrationDrill"),
    ];
    for (code, name) in expected {
        let alert = parse_alert(&format!(r#"{{"cat":"{code}"}}"#)).unwrap();
        assert_eq!(alert.alert_type.as_str(), name, "code {code}");
    }

    for code in [0_i64, 8, 14, 100, 108, 999] {
        let alert = parse_alert(&format!(r#"{{"cat":"{code}"}}"#)).unwrap();
        assert_eq!(alert.alert_type, AlertType::Unknown, "code {code}");
    }

    let absent = parse_alert(r#"{"data":[]}"#).unwrap();
    assert_eq!(absent.alert_type, AlertType::Missiles);
}

#[test]
fn serializes_like_the_upstream_client() {
    let alert = parse_alert(r#"{"cat":"103","data":["אילת"]}"#).unwrap();
    let json = serde_json::to_value(&alert).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "earthQuakeDrill", "cities": ["אילת"]})
    );
}

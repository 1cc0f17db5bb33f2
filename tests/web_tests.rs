//! HTTP API tests, driven through the router without a listening socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mh_caller::web::server::{api_router, MAX_BODY_SIZE};
use tower::ServiceExt;

const MARKERS: &str = "mh01KK-001\tchr1\trs1:104\t100\tACGTACGTAC\n\
                       mh02KK-002\tchr2\trs2:203\trs3:206\t200\tGGCATTGCAAGG\n";

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = api_router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn call_request(body: &serde_json::Value) -> Request<Body> {
    Request::post("/api/call")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_defaults() {
    let (status, json) = send(Request::get("/api/defaults").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["min_read_count"], 100);
    assert_eq!(json["mark_minor"], true);
    assert_eq!(json["plain_haplotype"], false);
}

#[tokio::test]
async fn test_call_reports_every_group() {
    let reads = "mh01KK-001:10\t10 bases\tACGTACGTAC\t300\t200\n\
                 mh02KK-002:12\t12 bases\tGGCATTGCAAGG\t30\t20\n\
                 mh09XX-999:10\t10 bases\tACGTACGTAC\t150\t150\n";

    let (status, json) = send(call_request(&serde_json::json!({
        "markers": MARKERS,
        "reads": reads,
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"]["marker_count"], 2);
    assert_eq!(json["summary"]["analyzed_markers"], 3);
    assert_eq!(json["summary"]["alleles"], 1);
    assert_eq!(json["download_name"], serde_json::Value::Null);

    let kinds: Vec<&str> = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "allele",
            "separator",
            "no_valid_read",
            "separator",
            "no_reference",
            "separator"
        ]
    );

    let report = json["report_text"].as_str().unwrap();
    assert!(report.contains("mh02KK-002:0.0\t50\tNo valid read!"));
    assert!(report.contains("mh09XX-999\t300\tNo Ref. Info."));
}

#[tokio::test]
async fn test_call_minimum_read_floor() {
    let reads = "mh01KK-001:10\t10 bases\tACGTACGTAC\t300\t200\n\
                 mh01KK-001:10\t10 bases\tACGTGCGTAC\t4\t4\n";

    // A minimum of 1 is raised to 10, so the 8-read row is not a candidate
    let (status, json) = send(call_request(&serde_json::json!({
        "markers": MARKERS,
        "reads": reads,
        "config": {"min_read_count": 1, "noise_cut": 0.0},
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"]["alleles"], 1);
    assert_eq!(json["processing_info"]["configuration"]["min_read_count"], 10);
}

#[tokio::test]
async fn test_call_rejects_bad_filename() {
    let (status, json) = send(call_request(&serde_json::json!({
        "markers": MARKERS,
        "reads": "mh01KK-001:10\t10 bases\tACGTACGTAC\t300\t200\n",
        "reads_filename": "../S01_Seq.txt",
    })))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_filename");
}

#[tokio::test]
async fn test_call_rejects_malformed_json() {
    let request = Request::post("/api/call")
        .header("content-type", "application/json")
        .body(Body::from("{\"markers\": 5}"))
        .unwrap();
    let (status, _) = send(request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let body = format!(
        "{{\"markers\": \"{}\", \"reads\": \"\"}}",
        "A".repeat(MAX_BODY_SIZE + 1)
    );
    let request = Request::post("/api/call")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(Request::get("/api/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

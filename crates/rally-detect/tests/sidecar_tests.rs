//! Sidecar detector tests against a mock inference service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rally_detect::{init_detector, Detector, DetectorConfig, SidecarDetector};
use rally_media::Frame;

fn test_config(base_url: String) -> DetectorConfig {
    DetectorConfig {
        base_url,
        timeout: Duration::from_secs(2),
        ..DetectorConfig::default()
    }
}

fn test_frame(index: u32) -> Frame {
    Frame {
        index,
        width: 4,
        height: 4,
        data: vec![0u8; 4 * 4 * 3],
    }
}

async fn mount_healthy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "model": "yolov8n"
            })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_reports_model_from_health_payload() {
    let server = MockServer::start().await;
    mount_healthy(&server).await;

    let detector = SidecarDetector::connect(test_config(server.uri()))
        .await
        .unwrap();
    assert_eq!(detector.model_id(), Some("yolov8n"));
}

#[tokio::test]
async fn connect_fails_when_sidecar_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = SidecarDetector::connect(test_config(server.uri())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn init_detector_falls_back_to_null_backend() {
    // Nothing listening on this port.
    let detector = init_detector(test_config("http://127.0.0.1:1".to_string())).await;
    assert!(detector.model_id().is_none());

    let detections = detector.detect(&test_frame(0)).await.unwrap();
    assert!(detections.is_empty());
}

#[tokio::test]
async fn detect_parses_and_filters_sidecar_response() {
    let server = MockServer::start().await;
    mount_healthy(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/detect"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "detections": [
                    { "bbox": [10.0, 20.0, 30.0, 40.0], "confidence": 0.91, "class_id": 32 },
                    { "bbox": [0.0, 0.0, 5.0, 5.0], "confidence": 0.3, "class_id": 32 },
                    { "bbox": [1.0, 1.0, 2.0, 2.0], "confidence": 0.95, "class_id": 0 }
                ]
            })),
        )
        .mount(&server)
        .await;

    let detector = SidecarDetector::connect(test_config(server.uri()))
        .await
        .unwrap();
    let detections = detector.detect(&test_frame(5)).await.unwrap();

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 32);
    assert_eq!(detections[0].frame_index, 5);
    assert_eq!(detections[0].bbox.x1, 10.0);
    assert_eq!(detections[0].bbox.y2, 40.0);
}

#[tokio::test]
async fn detect_surfaces_sidecar_errors() {
    let server = MockServer::start().await;
    mount_healthy(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/detect"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let detector = SidecarDetector::connect(test_config(server.uri()))
        .await
        .unwrap();
    let result = detector.detect(&test_frame(0)).await;
    assert!(result.is_err());
}

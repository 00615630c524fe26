//! Store tests against an in-memory database.

use rally_db::{AnalysisStore, DbError, SqliteStore};
use rally_models::{
    AnalysisKind, AnalysisSummary, BoundingBox, Detection, FrameDetections, NewAnalysis,
    NewVideo, VideoMetadata, VideoStatus,
};

async fn store() -> SqliteStore {
    SqliteStore::open("sqlite::memory:").await.unwrap()
}

fn new_analysis(video: &str) -> NewAnalysis {
    NewAnalysis {
        video_filename: video.to_string(),
        analysis_type: AnalysisKind::BallDetection,
        summary: AnalysisSummary {
            total_frames: 10,
            frames_with_balls: 2,
            total_ball_detections: 3,
            average_detections_per_frame: 0.3,
            detection_rate: 0.2,
        },
        ball_detections: vec![
            FrameDetections::empty(0),
            FrameDetections {
                frame_index: 2,
                detections: vec![Detection {
                    bbox: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
                    confidence: 0.9,
                    class_id: 32,
                    frame_index: 2,
                }],
            },
        ],
        processing_time: 1.25,
        model_used: Some("yolov8n".to_string()),
        confidence_threshold: 0.5,
    }
}

#[tokio::test]
async fn put_then_get_roundtrip() {
    let store = store().await;

    let stored = store.put(new_analysis("rally.mp4")).await.unwrap();
    assert!(stored.id > 0);
    assert_eq!(stored.total_frames, 10);
    assert_eq!(stored.frames_with_balls, 2);
    assert_eq!(stored.model_used.as_deref(), Some("yolov8n"));
    assert!(stored.updated_at.is_none());

    let fetched = store
        .get("rally.mp4", AnalysisKind::BallDetection)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, stored);

    // Raw detections survive as JSON.
    let raw: Vec<FrameDetections> =
        serde_json::from_str(fetched.ball_detections.as_deref().unwrap()).unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[1].detections[0].confidence, 0.9);
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = store().await;
    let result = store
        .get("nothing.mp4", AnalysisKind::BallDetection)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn duplicate_put_is_a_distinct_conflict() {
    let store = store().await;
    store.put(new_analysis("rally.mp4")).await.unwrap();

    let err = store.put(new_analysis("rally.mp4")).await.unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));
    assert!(err.is_conflict());

    // Exactly one row survives.
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn same_video_different_kind_is_allowed() {
    let store = store().await;
    store.put(new_analysis("rally.mp4")).await.unwrap();

    let mut pose = new_analysis("rally.mp4");
    pose.analysis_type = AnalysisKind::PoseEstimation;
    store.put(pose).await.unwrap();

    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_permits_reanalysis() {
    let store = store().await;
    let first = store.put(new_analysis("rally.mp4")).await.unwrap();

    assert!(store
        .delete("rally.mp4", AnalysisKind::BallDetection)
        .await
        .unwrap());
    assert!(!store
        .delete("rally.mp4", AnalysisKind::BallDetection)
        .await
        .unwrap());

    let mut again = new_analysis("rally.mp4");
    again.processing_time = 9.0;
    let second = store.put(again).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.processing_time, 9.0);
}

#[tokio::test]
async fn video_crud() {
    let store = store().await;

    let record = store
        .create_video(&NewVideo {
            filename: "rally.mp4".to_string(),
            file_path: "/data/videos/raw/rally.mp4".to_string(),
            file_size: 1024,
            content_type: Some("video/mp4".to_string()),
            metadata: Some(VideoMetadata {
                duration: 10.0,
                fps: 30.0,
                width: 1920,
                height: 1080,
                frame_count: 300,
            }),
        })
        .await
        .unwrap();
    assert_eq!(record.status, VideoStatus::Uploaded);
    assert_eq!(record.frame_count, Some(300));

    // Filename is unique.
    let err = store
        .create_video(&NewVideo {
            filename: "rally.mp4".to_string(),
            file_path: "/elsewhere/rally.mp4".to_string(),
            file_size: 1,
            content_type: None,
            metadata: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let updated = store
        .update_video_status("rally.mp4", VideoStatus::Completed, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, VideoStatus::Completed);
    assert!(updated.updated_at.is_some());

    assert_eq!(store.list_videos().await.unwrap().len(), 1);
    assert!(store.delete_video("rally.mp4").await.unwrap());
    assert!(store.get_video("rally.mp4").await.unwrap().is_none());
}

#[tokio::test]
async fn open_creates_schema_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}/rally.db", dir.path().display());

    let store = SqliteStore::open(&url).await.unwrap();
    store.put(new_analysis("rally.mp4")).await.unwrap();

    // Reopening sees the same data; schema setup is idempotent.
    drop(store);
    let store = SqliteStore::open(&url).await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 1);
}

//! Integration tests for the HandBridge HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use handbridge::config::Config;
    use handbridge::core::{HandPose, SyntheticHand};
    use handbridge::server::{run, ServerConfig};
    use handbridge::source::FrameRecord;
    use std::net::SocketAddr;
    use std::time::Duration;

    async fn start() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
        let config = ServerConfig::new(0, Config::default());
        let started = run(config).await.expect("Failed to start server");

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;
        started
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_frames_endpoint_recognizes_pointer() {
        let (addr, shutdown_tx) = start().await;

        let frame = SyntheticHand::at(0.5, 0.6).pose(HandPose::Pointing);
        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/frames", addr))
            .json(&FrameRecord::from_frame(0.0, &frame))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["event"]["kind"], "MOUSE_MOVE");
        assert!(body["event"]["payload"]["x"].as_i64().is_some());
        assert_eq!(body["state"], "MOUSE_MOVING");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_malformed_frame_counts_as_no_hand() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/frames", addr))
            .json(&serde_json::json!({ "t": 0.1, "landmarks": [{ "x": 0.5, "y": 0.5, "z": 0.0 }] }))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["event"]["kind"], "NONE");
        assert_eq!(body["state"], "IDLE");

        let stats: serde_json::Value = client
            .get(format!("http://{}/stats", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(stats["frames_processed"], 1);
        assert_eq!(stats["hand_absent"], 1);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp_is_accepted() {
        let (addr, shutdown_tx) = start().await;

        let frame = SyntheticHand::at(0.5, 0.6).pose(HandPose::Pointing);
        let client = reqwest::Client::new();
        for t in [1e20, f64::MAX, 0.5] {
            let response = client
                .post(format!("http://{}/frames", addr))
                .json(&FrameRecord::from_frame(t, &frame))
                .send()
                .await
                .expect("Failed to send request");

            assert!(response.status().is_success(), "t = {t}: {}", response.status());
            let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
            assert_eq!(body["event"]["kind"], "MOUSE_MOVE");
        }

        let stats: serde_json::Value = client
            .get(format!("http://{}/stats", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(stats["frames_processed"], 3);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_unknown_route_returns_error_body() {
        let (addr, shutdown_tx) = start().await;

        let response = reqwest::Client::new()
            .get(format!("http://{}/ingest", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "NOT_FOUND");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (addr, shutdown_tx) = start().await;

        // Send OPTIONS request to check CORS
        let client = reqwest::Client::new();
        let response = client
            .request(reqwest::Method::OPTIONS, format!("http://{}/frames", addr))
            .header("Origin", "http://localhost")
            .header("Access-Control-Request-Method", "POST")
            .send()
            .await
            .expect("Failed to send request");

        // CORS preflight should succeed
        assert!(
            response.status().is_success() || response.status() == reqwest::StatusCode::NO_CONTENT,
            "CORS preflight failed: {}",
            response.status()
        );

        let _ = shutdown_tx.send(());
    }
}

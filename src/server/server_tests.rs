/*
 * Unit tests for the HTTP server
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Requests are sent straight
 * into the router, no socket is opened.
 *
 * Tests:
 * - test_server_index
 * - test_server_status
 * - test_server_status_invalid
 * - test_server_schedule
 * - test_server_schedule_form
 * - test_server_schedule_invalid
 * - test_server_schedule_with_offset
 * - test_server_unschedule
 * - test_server_update
 * - test_server_add_remove
 * - test_server_config
 * - test_server_config_after_add_remove
 * - test_server_whole_float_parameters
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod server_tests {
    use crate::elevator::ElevatorRegistry;
    use crate::server::{router, AppState};
    use crate::service::{start, DriveMode, RunningService};
    use crate::shared::ElevatorSpec;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestServer {
        app: Router,
        service: RunningService,
        _static_dir: TempDir,
    }

    fn setup_server() -> TestServer {
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(static_dir.path().join("index.html"), "<h1>Elevators</h1>").unwrap();

        let elevators = vec![
            ElevatorSpec { id: 0, lowest_floor: 0, highest_floor: 10 },
            ElevatorSpec { id: 1, lowest_floor: -2, highest_floor: 5 },
        ];
        let mut registry = ElevatorRegistry::new();
        registry.add_from_config(&elevators).unwrap();
        let service = start(registry, DriveMode::PerRequest).unwrap();

        let state = AppState {
            service: service.handle.clone(),
        };
        TestServer {
            app: router(state, &static_dir.path().to_string_lossy()),
            service,
            _static_dir: static_dir,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, String) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_server_index() {
        // Arrange
        let server = setup_server();

        // Act
        let (status, body) = get(&server.app, "/").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Elevators</h1>");

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_status() {
        // Arrange
        let server = setup_server();
        post_json(&server.app, "/schedule", json!({ "id": 1, "targetFloor": 3 })).await;

        // Act
        let (status, body) = get(&server.app, "/status?id=1").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "id": 1, "currentFloor": 0, "targetFloor": 3 })
        );

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_status_invalid() {
        // Purpose: Unknown, malformed, empty and missing ids all get the empty status body

        // Arrange
        let server = setup_server();
        let empty = json!({ "id": null, "lowestFloor": null, "highestFloor": null });

        for uri in ["/status?id=50", "/status?id=test", "/status?id=", "/status"] {
            // Act
            let (status, body) = get(&server.app, uri).await;

            // Assert
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), empty, "{}", uri);
        }

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_schedule() {
        // Arrange
        let server = setup_server();

        // Act
        let (status, body) =
            post_json(&server.app, "/schedule", json!({ "id": "0", "targetFloor": "4" })).await;
        let (_, floors) = get(&server.app, "/scheduledFloors?id=0").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Ok");
        assert_eq!(floors, "[4]");

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_schedule_form() {
        // Arrange
        let server = setup_server();
        let request = Request::post("/schedule")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("id=1&targetFloor=-2"))
            .unwrap();

        // Act
        let (status, _) = send(&server.app, request).await;
        let (_, floors) = get(&server.app, "/scheduledFloors?id=1").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(floors, "[-2]");

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_schedule_invalid() {
        // Arrange
        let server = setup_server();
        post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": 4 })).await;

        // Act
        let missing = post_json(&server.app, "/schedule", json!({ "id": 0 })).await;
        let malformed =
            post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": "up" })).await;
        let out_of_range =
            post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": 11 })).await;
        let duplicate =
            post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": 4 })).await;
        let unknown =
            post_json(&server.app, "/schedule", json!({ "id": 7, "targetFloor": 4 })).await;
        let floors = get(&server.app, "/scheduledFloors?id=7").await;

        // Assert
        assert_eq!(
            missing,
            (StatusCode::BAD_REQUEST, "Request parameters cannot be undefined".to_string())
        );
        assert_eq!(
            malformed,
            (StatusCode::BAD_REQUEST, "Request parameters must be valid integers".to_string())
        );
        assert_eq!(out_of_range.0, StatusCode::BAD_REQUEST);
        assert!(out_of_range.1.starts_with("Value: 11 is out of range"));
        assert_eq!(
            duplicate,
            (StatusCode::BAD_REQUEST, "Floor: 4 is already scheduled".to_string())
        );
        assert_eq!(
            unknown,
            (StatusCode::BAD_REQUEST, "Elevator with id: 7 does not exist".to_string())
        );
        assert_eq!(floors.0, StatusCode::BAD_REQUEST);

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_schedule_with_offset() {
        // Arrange
        let server = setup_server();
        for floor in [2, 3, 4] {
            post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": floor })).await;
        }

        // Act
        let (front, _) = post_json(
            &server.app,
            "/scheduleWithOffset",
            json!({ "id": 0, "targetFloor": 5, "offset": -5 }),
        )
        .await;
        let (back, _) = post_json(
            &server.app,
            "/scheduleWithOffset",
            json!({ "id": 0, "targetFloor": 6, "offset": 8 }),
        )
        .await;
        let missing_offset = post_json(
            &server.app,
            "/scheduleWithOffset",
            json!({ "id": 0, "targetFloor": 7 }),
        )
        .await;
        let (_, floors) = get(&server.app, "/scheduledFloors?id=0").await;

        // Assert
        assert_eq!(front, StatusCode::OK);
        assert_eq!(back, StatusCode::OK);
        assert_eq!(missing_offset.0, StatusCode::BAD_REQUEST);
        assert_eq!(floors, "[5,2,3,4,6]");

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_unschedule() {
        // Arrange
        let server = setup_server();
        post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": 3 })).await;

        // Act
        let removed = post_json(&server.app, "/unschedule", json!({ "id": 0, "targetFloor": 3 })).await;
        let again = post_json(&server.app, "/unschedule", json!({ "id": 0, "targetFloor": 3 })).await;

        // Assert
        assert_eq!(removed, (StatusCode::OK, "Ok".to_string()));
        assert_eq!(again.0, StatusCode::BAD_REQUEST);
        assert!(again.1.contains("is not currently scheduled"));

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_update() {
        // Purpose: Updates reconcile the position and process the arrival in per-request mode

        // Arrange
        let server = setup_server();
        post_json(&server.app, "/schedule", json!({ "id": 0, "targetFloor": 6 })).await;

        // Act
        let updated = post_json(&server.app, "/update", json!({ "id": 0, "currentFloor": 6 })).await;
        let out_of_range =
            post_json(&server.app, "/update", json!({ "id": 0, "currentFloor": 20 })).await;
        let missing = post_json(&server.app, "/update", json!({ "id": 0 })).await;
        let (_, body) = get(&server.app, "/status?id=0").await;

        // Assert
        assert_eq!(updated, (StatusCode::OK, "ok".to_string()));
        assert_eq!(out_of_range, (StatusCode::BAD_REQUEST, "Invalid request".to_string()));
        assert_eq!(missing, (StatusCode::BAD_REQUEST, "Invalid request".to_string()));
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "id": 0, "currentFloor": 6, "targetFloor": null })
        );

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_add_remove() {
        // Arrange
        let server = setup_server();

        // Act
        let added = post_json(
            &server.app,
            "/add",
            json!({ "id": 2, "lowestFloor": 1, "highestFloor": 9 }),
        )
        .await;
        let duplicate = post_json(
            &server.app,
            "/add",
            json!({ "id": 2, "lowestFloor": 0, "highestFloor": 9 }),
        )
        .await;
        let (_, body) = get(&server.app, "/status?id=2").await;
        let removed = post_json(&server.app, "/remove", json!({ "id": 2 })).await;
        let (status_after, _) = get(&server.app, "/status?id=2").await;

        // Assert
        assert_eq!(added, (StatusCode::OK, "Ok".to_string()));
        assert_eq!(duplicate.0, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "id": 2, "currentFloor": 1, "targetFloor": null })
        );
        assert_eq!(removed, (StatusCode::OK, "Ok".to_string()));
        assert_eq!(status_after, StatusCode::BAD_REQUEST);

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_config() {
        // Arrange
        let server = setup_server();

        // Act
        let (status, body) = get(&server.app, "/config").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "elevators": [
                { "id": 0, "lowestFloor": 0, "highestFloor": 10 },
                { "id": 1, "lowestFloor": -2, "highestFloor": 5 }
            ]})
        );

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_config_after_add_remove() {
        // Purpose: The elevator list reflects runtime additions and removals

        // Arrange
        let server = setup_server();
        post_json(
            &server.app,
            "/add",
            json!({ "id": 5, "lowestFloor": 0, "highestFloor": 6 }),
        )
        .await;
        post_json(&server.app, "/remove", json!({ "id": 0 })).await;

        // Act
        let (status, body) = get(&server.app, "/config").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "elevators": [
                { "id": 1, "lowestFloor": -2, "highestFloor": 5 },
                { "id": 5, "lowestFloor": 0, "highestFloor": 6 }
            ]})
        );

        // Cleanup
        server.service.shutdown();
    }

    #[tokio::test]
    async fn test_server_whole_float_parameters() {
        // Purpose: Whole JSON floats are accepted as integers, fractional ones are not

        // Arrange
        let server = setup_server();

        // Act
        let whole = post_json(&server.app, "/schedule", json!({ "id": 1, "targetFloor": 4.0 })).await;
        let fractional =
            post_json(&server.app, "/schedule", json!({ "id": 1, "targetFloor": 2.5 })).await;
        let (_, floors) = get(&server.app, "/scheduledFloors?id=1").await;

        // Assert
        assert_eq!(whole, (StatusCode::OK, "Ok".to_string()));
        assert_eq!(
            fractional,
            (StatusCode::BAD_REQUEST, "Request parameters must be valid integers".to_string())
        );
        assert_eq!(floors, "[4]");

        // Cleanup
        server.service.shutdown();
    }
}

//! HTTP server for the address API
//!
//! Provides /health and the /addresses CRUD and nearby endpoints.

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

/// Create the HTTP router
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/addresses",
            get(routes::addresses::list_addresses).post(routes::addresses::create_address),
        )
        // Static segment takes priority over the id capture below
        .route("/addresses/nearby", get(routes::addresses::get_nearby))
        .route(
            "/addresses/{id}",
            get(routes::addresses::get_address)
                .patch(routes::addresses::update_address)
                .delete(routes::addresses::delete_address),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from the configured origin list
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

/// Serve until Ctrl-C or SIGTERM, then let in-flight requests finish
pub async fn start_server(router: Router, port: u16) -> std::io::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use address_db::AddressStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let store = AddressStore::connect("sqlite::memory:", 1).await.unwrap();
        store.migrate().await.unwrap();
        create_router(AppState::new(store), cors_layer(&Config::default()))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create(router: &Router, label: &str, latitude: f64, longitude: f64) -> Value {
        let (status, json) = send(
            router,
            json_req(
                "POST",
                "/addresses",
                json!({ "label": label, "latitude": latitude, "longitude": longitude }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = test_router().await;
        let (status, json) = send(&router, get_req("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["addresses"], 0);
        assert!(json["uptime_secs"].as_i64().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_health_unavailable_when_database_closed() {
        let store = AddressStore::connect("sqlite::memory:", 1).await.unwrap();
        store.migrate().await.unwrap();
        let router = create_router(
            AppState::new(store.clone()),
            cors_layer(&Config::default()),
        );
        store.close().await;

        let (status, json) = send(&router, get_req("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json, json!({ "error": "Service unavailable" }));

        let (status, json) = send(&router, get_req("/addresses")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let router = test_router().await;
        let created = create(&router, "Home", 52.52, 13.405).await;

        assert_eq!(created["label"], "Home");
        assert_eq!(created["latitude"], 52.52);
        assert_eq!(created["longitude"], 13.405);
        assert_eq!(created["created_at"], created["updated_at"]);

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = send(&router, get_req(&format!("/addresses/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let router = test_router().await;

        let (status, json) = send(
            &router,
            json_req(
                "POST",
                "/addresses",
                json!({ "label": "", "latitude": 0.0, "longitude": 0.0 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("label"));

        let (status, _) = send(
            &router,
            json_req(
                "POST",
                "/addresses",
                json!({ "label": "x", "latitude": 95.0, "longitude": 0.0 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &router,
            json_req("POST", "/addresses", json!({ "label": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_get_missing_and_bad_id() {
        let router = test_router().await;

        let (status, json) = send(&router, get_req("/addresses/404")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Address with id 404 not found");

        let (status, _) = send(&router, get_req("/addresses/abc")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let router = test_router().await;
        for i in 0..5 {
            create(&router, &format!("a{i}"), 0.0, i as f64).await;
        }

        let (status, json) = send(&router, get_req("/addresses")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 5);

        let (_, json) = send(&router, get_req("/addresses?skip=1&limit=2")).await;
        let labels: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["a1", "a2"]);

        let (_, json) = send(&router, get_req("/addresses?skip=10")).await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_invalid_params() {
        let router = test_router().await;
        for uri in [
            "/addresses?limit=0",
            "/addresses?limit=1001",
            "/addresses?skip=-1",
            "/addresses?limit=ten",
        ] {
            let (status, _) = send(&router, get_req(uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_nearby_scenario() {
        let router = test_router().await;
        create(&router, "A", 0.0, 0.0).await;
        create(&router, "B", 0.0, 0.01).await;
        create(&router, "C", 10.0, 10.0).await;

        let (status, json) = send(
            &router,
            get_req("/addresses/nearby?latitude=0&longitude=0&distance_km=2"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let labels: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_nearby_invalid_params() {
        let router = test_router().await;
        for uri in [
            "/addresses/nearby?latitude=0&longitude=0",
            "/addresses/nearby?latitude=91&longitude=0&distance_km=1",
            "/addresses/nearby?latitude=0&longitude=-181&distance_km=1",
            "/addresses/nearby?latitude=0&longitude=0&distance_km=0",
            "/addresses/nearby?latitude=north&longitude=0&distance_km=1",
        ] {
            let (status, _) = send(&router, get_req(uri)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_patch_updates_named_fields() {
        let router = test_router().await;
        let created = create(&router, "old", 1.0, 2.0).await;
        let id = created["id"].as_i64().unwrap();

        let (status, json) = send(
            &router,
            json_req(
                "PATCH",
                &format!("/addresses/{id}"),
                json!({ "longitude": 3.5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["label"], "old");
        assert_eq!(json["latitude"], 1.0);
        assert_eq!(json["longitude"], 3.5);
        assert_eq!(json["created_at"], created["created_at"]);
        assert_ne!(json["updated_at"], created["updated_at"]);
    }

    #[tokio::test]
    async fn test_patch_errors() {
        let router = test_router().await;
        let created = create(&router, "x", 0.0, 0.0).await;
        let id = created["id"].as_i64().unwrap();
        let uri = format!("/addresses/{id}");

        let (status, json) = send(&router, json_req("PATCH", &uri, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No fields provided for update");

        let (status, _) = send(
            &router,
            json_req("PATCH", &uri, json!({ "latitude": -90.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &router,
            json_req("PATCH", "/addresses/9999", json!({ "label": "y" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let router = test_router().await;
        let created = create(&router, "gone", 0.0, 0.0).await;
        let uri = format!("/addresses/{}", created["id"]);

        let (status, json) = send(&router, delete_req(&uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(json, Value::Null);

        let (status, _) = send(&router, get_req(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, delete_req(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_restricted_origin() {
        let store = AddressStore::connect("sqlite::memory:", 1).await.unwrap();
        store.migrate().await.unwrap();
        let config = Config {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..Config::default()
        };
        let router = create_router(AppState::new(store), cors_layer(&config));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/addresses")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
    }
}

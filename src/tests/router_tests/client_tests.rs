// src/tests/router_tests/client_tests.rs

use crate::client::{ClientError, HttpNearbySource, NearbySource};
use crate::router::serve;
use crate::service::NearbyParams;
use crate::state::AppState;
use crate::tests::utils::*;
use astra::Server;
use std::time::Duration;

/// Serves `state` on an ephemeral port for the rest of the test process and
/// returns the base URL.
fn spawn_server(state: AppState) -> String {
    let server = Server::bind("127.0.0.1:0").max_workers(2);
    let addr = server.local_addr().expect("bound address");
    std::thread::spawn(move || {
        let _ = server.serve(move |req, _info| serve(req, &state));
    });
    format!("http://{addr}")
}

#[test]
fn http_source_decodes_features() {
    let (_dir, state) = init_test_state();
    seed(
        &state,
        &[listing("here", 6.2476, -75.5658, 1.0), listing("far", 6.30, -75.60, 1.0)],
    );
    let source = HttpNearbySource::new(&spawn_server(state), Duration::from_secs(5)).unwrap();

    let fc = source.fetch(&NearbyParams::circle(6.2476, -75.5658, 300.0)).unwrap();
    assert_eq!(fc.features.len(), 1);

    let feature = &fc.features[0];
    assert_eq!(feature.property("title").and_then(|v| v.as_str()), Some("Listing here"));
    assert_eq!(feature.property("distance_km").and_then(|v| v.as_f64()), Some(0.0));
    assert_eq!(
        fc.foreign_members.as_ref().and_then(|m| m.get("skipped_ungeocoded")),
        Some(&serde_json::json!(0))
    );
}

#[test]
fn http_source_surfaces_error_bodies() {
    let (_dir, state) = init_test_state();
    let source = HttpNearbySource::new(&spawn_server(state), Duration::from_secs(5)).unwrap();

    match source.fetch(&NearbyParams::default()) {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.starts_with("Missing location"), "{message}");
        }
        other => panic!("expected a 400 status error, got {other:?}"),
    }
}

#[test]
fn http_source_reports_unreachable_server() {
    // Bind then drop, so nothing listens on the port.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("ephemeral port");
    let source = HttpNearbySource::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

    let err = source.fetch(&NearbyParams::circle(1.0, 1.0, 300.0)).unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
}

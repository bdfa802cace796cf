//! End-to-end scenarios for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use url::Url;

use meshgate::lifecycle::StartupError;
use meshgate::net::ListenError;
use meshgate::{Gateway, GatewayConfig, PeerIdentity, Shutdown};

mod common;

use common::MockOverlay;

fn alice() -> PeerIdentity {
    PeerIdentity {
        login_name: "alice@example".into(),
        display_name: "Alice Example".into(),
        profile_pic_url: "https://pics.example/alice.png".into(),
    }
}

fn test_config(upstream: SocketAddr, overlay_api: SocketAddr) -> GatewayConfig {
    GatewayConfig {
        hostname: "gw-test".into(),
        port: 0,
        state_dir: std::env::temp_dir().join("meshgate-missing-certs"),
        auth_key: None,
        upstream: Url::parse(&format!("http://{}", upstream)).unwrap(),
        tls: false,
        funnel: false,
        auth_headers: true,
        redirect: false,
        redirect_port: 0,
        overlay_api: Url::parse(&format!("http://{}", overlay_api)).unwrap(),
        metrics_address: None,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_forwards_with_identity_headers_overwriting_client_values() {
    let (upstream, recorded) = common::start_recording_upstream().await;
    let overlay = Arc::new(MockOverlay {
        identity: Some(alice()),
        ..Default::default()
    });
    let overlay_api = common::start_mock_overlay(overlay).await;

    let shutdown = Shutdown::new();
    let running = Gateway::new(test_config(upstream, overlay_api))
        .start(&shutdown)
        .await
        .unwrap();

    let response = client()
        .get(format!(
            "http://127.0.0.1:{}/widgets?id=5",
            running.primary_addr().port()
        ))
        .header("mesh-user-login", "mallory@evil")
        .header("mesh-user-name", "Mallory")
        .send()
        .await
        .unwrap();

    // Upstream response comes back unmodified.
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-upstream").unwrap(), "reached");
    assert_eq!(response.text().await.unwrap(), "upstream response body");

    let seen = recorded.lock().unwrap().last().unwrap().clone();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.uri, "/widgets?id=5");
    assert_eq!(seen.headers.get("mesh-user-login").unwrap(), "alice@example");
    assert_eq!(seen.headers.get("mesh-user-name").unwrap(), "Alice Example");
    assert_eq!(
        seen.headers.get("mesh-user-profile-pic").unwrap(),
        "https://pics.example/alice.png"
    );
    assert!(seen.headers.contains_key("x-forwarded-for"));
    assert_eq!(seen.headers.get("x-forwarded-proto").unwrap(), "http");

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_forwards_unannotated_when_identity_unknown() {
    let (upstream, recorded) = common::start_recording_upstream().await;
    let overlay = Arc::new(MockOverlay::default());
    let overlay_api = common::start_mock_overlay(overlay).await;

    let shutdown = Shutdown::new();
    let running = Gateway::new(test_config(upstream, overlay_api))
        .start(&shutdown)
        .await
        .unwrap();

    let response = client()
        .get(format!(
            "http://127.0.0.1:{}/private",
            running.primary_addr().port()
        ))
        .header("mesh-user-login", "mallory@evil")
        .send()
        .await
        .unwrap();

    // The request is never dropped on resolution failure.
    assert_eq!(response.status(), 200);

    // Without a resolved identity the client-supplied value passes through.
    let seen = recorded.lock().unwrap().last().unwrap().clone();
    assert_eq!(seen.headers.get("mesh-user-login").unwrap(), "mallory@evil");

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_auth_headers_disabled_never_resolves() {
    let (upstream, recorded) = common::start_recording_upstream().await;
    let overlay = Arc::new(MockOverlay {
        identity: Some(alice()),
        ..Default::default()
    });
    let overlay_api = common::start_mock_overlay(overlay).await;

    let mut config = test_config(upstream, overlay_api);
    config.auth_headers = false;

    let shutdown = Shutdown::new();
    let running = Gateway::new(config).start(&shutdown).await.unwrap();

    let response = client()
        .get(format!(
            "http://127.0.0.1:{}/",
            running.primary_addr().port()
        ))
        .header("mesh-user-login", "mallory@evil")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let seen = recorded.lock().unwrap().last().unwrap().clone();
    assert_eq!(seen.headers.get("mesh-user-login").unwrap(), "mallory@evil");

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_redirect_listener_points_at_primary_https_endpoint() {
    let (upstream, _recorded) = common::start_recording_upstream().await;
    let overlay = Arc::new(MockOverlay {
        dns_name: "node1.example.ts.net.".into(),
        ..Default::default()
    });
    let overlay_api = common::start_mock_overlay(overlay).await;

    let mut config = test_config(upstream, overlay_api);
    config.redirect = true;

    let shutdown = Shutdown::new();
    let running = Gateway::new(config).start(&shutdown).await.unwrap();
    let redirect_addr = running.redirect_addr().expect("redirect listener running");

    for path in ["/", "/deep/path?q=1"] {
        let response = client()
            .post(format!("http://127.0.0.1:{}{}", redirect_addr.port(), path))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 302);
        assert_eq!(
            response.headers().get("location").unwrap(),
            &format!(
                "https://node1.example.ts.net:{}/",
                running.primary_addr().port()
            )
        );
    }

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_redirect_skipped_when_self_status_fails() {
    let (upstream, _recorded) = common::start_recording_upstream().await;
    // Point the gateway at a dead overlay API so self-status cannot resolve.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let mut config = test_config(upstream, dead_addr);
    config.auth_headers = false;
    config.redirect = true;

    let shutdown = Shutdown::new();
    let running = Gateway::new(config).start(&shutdown).await.unwrap();

    // Redirect never started, but the primary listener serves regardless.
    assert!(running.redirect_addr().is_none());
    let response = client()
        .get(format!(
            "http://127.0.0.1:{}/",
            running.primary_addr().port()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let (upstream, _recorded) = common::start_recording_upstream().await;
    let overlay_api = common::start_mock_overlay(Arc::new(MockOverlay::default())).await;

    let shutdown = Shutdown::new();
    let running = Gateway::new(test_config(upstream, overlay_api))
        .start(&shutdown)
        .await
        .unwrap();

    running.initiate_shutdown();
    running.initiate_shutdown();
    shutdown.trigger();
    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_upstream_connection_failure_maps_to_502() {
    // Reserve an address, then free it so the origin is unreachable.
    let ghost = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ghost_addr = ghost.local_addr().unwrap();
    drop(ghost);

    let overlay_api = common::start_mock_overlay(Arc::new(MockOverlay::default())).await;

    let shutdown = Shutdown::new();
    let running = Gateway::new(test_config(ghost_addr, overlay_api))
        .start(&shutdown)
        .await
        .unwrap();

    let response = client()
        .get(format!(
            "http://127.0.0.1:{}/",
            running.primary_addr().port()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);

    shutdown.trigger();
    running.wait().await;
}

#[tokio::test]
async fn test_funnel_asks_overlay_then_fails_without_tls_material() {
    let (upstream, _recorded) = common::start_recording_upstream().await;
    let overlay = Arc::new(MockOverlay::default());
    let overlay_api = common::start_mock_overlay(overlay.clone()).await;

    let mut config = test_config(upstream, overlay_api);
    config.funnel = true;

    let shutdown = Shutdown::new();
    let error = Gateway::new(config)
        .start(&shutdown)
        .await
        .err()
        .expect("startup must fail without certificate material");

    // The daemon saw the funnel request before certificate loading failed.
    assert_eq!(overlay.funnel_requests.lock().unwrap().as_slice(), &[0]);
    assert!(matches!(
        error,
        StartupError::Listen(ListenError::Tls { .. })
    ));
}

#[tokio::test]
async fn test_overlay_enrollment_failure_is_fatal_when_headers_enabled() {
    let (upstream, _recorded) = common::start_recording_upstream().await;
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let shutdown = Shutdown::new();
    let error = Gateway::new(test_config(upstream, dead_addr))
        .start(&shutdown)
        .await
        .err()
        .expect("enrollment failure must be fatal with auth headers on");

    assert!(matches!(error, StartupError::Overlay(_)));
}

#[test]
fn test_missing_upstream_exits_nonzero() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_meshgate"))
        .env_remove("MESHGATE_UPSTREAM")
        .output()
        .unwrap();

    assert!(!output.status.success());
}

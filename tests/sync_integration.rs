//! Integration tests for the change detector and the daemon HTTP protocol.
//!
//! A minimal scripted HTTP server stands in for the daemon: each test hands
//! it the exact sequence of responses to produce, and asserts on the number
//! of requests the client actually made. No external services, no real
//! daemons.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use intrig::config::ClientConfig;
use intrig::discovery::lifecycle::LifecycleController;
use intrig::discovery::registration::register;
use intrig::discovery::registry::RegistryStore;
use intrig::error::IntrigError;
use intrig::sync::client::DaemonApi;
use intrig::sync::trigger::{ChangeDetector, SyncOutcome};
use intrig_types::GenerateEvent;

/// One canned exchange: how the server answers the next real HTTP request.
enum Scripted {
    /// Full response sent in one write.
    Respond(String),
    /// Response sent piecewise with pauses, to exercise incremental reads.
    RespondChunked(Vec<String>),
    /// Send only these bytes, then stall until the client gives up.
    Stall(String),
}

/// Minimal scripted HTTP/1.1 server.
///
/// Accepts connections until the script is exhausted. Connections that close
/// without delivering a request (TCP liveness probes) do not consume a
/// scripted response. Every answered request bumps `hits`.
fn spawn_script(listener: TcpListener, script: Vec<Scripted>, hits: Arc<AtomicUsize>) {
    tokio::spawn(async move {
        for step in script {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                if read_request(&mut socket).await.is_none() {
                    // A probe: connected and went away without a request.
                    continue;
                }
                hits.fetch_add(1, Ordering::SeqCst);
                match &step {
                    Scripted::Respond(response) => {
                        let _ = socket.write_all(response.as_bytes()).await;
                    }
                    Scripted::RespondChunked(pieces) => {
                        for piece in pieces {
                            let _ = socket.write_all(piece.as_bytes()).await;
                            let _ = socket.flush().await;
                            tokio::time::sleep(Duration::from_millis(30)).await;
                        }
                    }
                    Scripted::Stall(head) => {
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.flush().await;
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                }
                let _ = socket.shutdown().await;
                break;
            }
        }
    });
}

/// Read one HTTP request (headers plus content-length body).
/// `None` when the peer closes before sending a complete request.
async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    let header_end = loop {
        match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while buf.len() < header_end + 4 + content_length {
        match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
        }
    }

    Some(String::from_utf8_lossy(&buf).to_string())
}

fn response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

fn sse_head() -> String {
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n".to_string()
}

fn test_config() -> ClientConfig {
    ClientConfig {
        retry_delay_ms: 10,
        poll_interval_ms: 25,
        startup_timeout_ms: 1_000,
        ..ClientConfig::default()
    }
}

async fn scripted_server(script: Vec<Scripted>) -> (String, u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    spawn_script(listener, script, hits.clone());
    (format!("http://127.0.0.1:{}", port), port, hits)
}

fn sample_hashes() -> HashMap<String, String> {
    HashMap::from([
        ("petstore".to_string(), "abc123".to_string()),
        ("billing".to_string(), "def456".to_string()),
    ])
}

// ============================================================================
// Verify endpoint
// ============================================================================

#[tokio::test]
async fn test_verify_retries_transient_errors_then_succeeds() {
    let (url, _port, hits) = scripted_server(vec![
        Scripted::Respond(response("503 Service Unavailable", "")),
        Scripted::Respond(response("503 Service Unavailable", "")),
        Scripted::Respond(response("200 OK", "")),
    ])
    .await;

    let api = DaemonApi::new(&test_config()).unwrap();
    let valid = api.verify(&url, &sample_hashes()).await.unwrap();

    assert!(valid);
    // Two retries under a budget of two, nothing else issued.
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_verify_gives_up_after_retry_budget() {
    let (url, _port, hits) = scripted_server(vec![
        Scripted::Respond(response("503 Service Unavailable", "")),
        Scripted::Respond(response("503 Service Unavailable", "")),
        Scripted::Respond(response("503 Service Unavailable", "")),
    ])
    .await;

    let api = DaemonApi::new(&test_config()).unwrap();
    let valid = api.verify(&url, &sample_hashes()).await.unwrap();

    assert!(!valid);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_verify_client_error_is_invalid_without_retry() {
    let (url, _port, hits) =
        scripted_server(vec![Scripted::Respond(response("409 Conflict", ""))]).await;

    let api = DaemonApi::new(&test_config()).unwrap();
    let valid = api.verify(&url, &sample_hashes()).await.unwrap();

    assert!(!valid);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_verify_transport_failure_is_invalid_not_an_error() {
    // Bind a port, then free it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = DaemonApi::new(&test_config()).unwrap();
    let valid = api
        .verify(&format!("http://127.0.0.1:{}", port), &sample_hashes())
        .await
        .unwrap();

    assert!(!valid);
}

// ============================================================================
// Generate endpoint
// ============================================================================

#[tokio::test]
async fn test_generate_streams_progress_until_done() {
    let (url, _port, hits) = scripted_server(vec![Scripted::RespondChunked(vec![
        sse_head() + "data: {\"type\":\"status\",\"step\":\"scan\",\"sourceId\":\"petstore\"}\n",
        // A frame split mid-JSON across two network writes
        "data: {\"typ".to_string(),
        "e\":\"status\",\"step\":\"render\"}\n".to_string(),
        "data: {\"type\":\"done\"}\n".to_string(),
    ])])
    .await;

    let api = DaemonApi::new(&test_config()).unwrap();
    let mut events = Vec::new();
    api.generate(&url, |event| events.push(event.clone()))
        .await
        .unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        GenerateEvent::Status {
            step: "scan".to_string(),
            source_id: Some("petstore".to_string()),
        }
    );
    assert_eq!(
        events[1],
        GenerateEvent::Status {
            step: "render".to_string(),
            source_id: None,
        }
    );
    assert_eq!(events[2], GenerateEvent::Done);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_generate_stream_ending_without_done_is_success() {
    let (url, _port, _hits) = scripted_server(vec![Scripted::Respond(
        sse_head() + "data: {\"type\":\"status\",\"step\":\"scan\"}\n",
    )])
    .await;

    let api = DaemonApi::new(&test_config()).unwrap();
    let mut events = Vec::new();
    let result = api.generate(&url, |event| events.push(event.clone())).await;

    assert!(result.is_ok());
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_generate_404_is_resource_not_found() {
    let (url, _port, _hits) =
        scripted_server(vec![Scripted::Respond(response("404 Not Found", ""))]).await;

    let api = DaemonApi::new(&test_config()).unwrap();
    let err = api.generate(&url, |_| {}).await.unwrap_err();
    assert!(matches!(err, IntrigError::ResourceNotFound(_)));
}

#[tokio::test]
async fn test_generate_times_out_and_surfaces_it() {
    let (url, _port, _hits) = scripted_server(vec![Scripted::Stall(sse_head())]).await;

    let config = ClientConfig {
        stream_timeout_secs: 1,
        ..test_config()
    };
    let api = DaemonApi::new(&config).unwrap();

    let started = std::time::Instant::now();
    let err = api.generate(&url, |_| {}).await.unwrap_err();

    assert!(matches!(err, IntrigError::RequestTimeout(_)));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(10));
}

// ============================================================================
// Change detector end to end
// ============================================================================

/// Project directory with an intrig marker, registered against `port`.
fn intrig_project(store: &RegistryStore, port: u16, cached_hashes: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{"name": "petstore"}"#).unwrap();
    std::fs::write(dir.path().join("intrig.json"), r#"{"sources": []}"#).unwrap();
    if let Some(hashes) = cached_hashes {
        std::fs::create_dir_all(dir.path().join(".intrig")).unwrap();
        std::fs::write(dir.path().join(".intrig/hashes.json"), hashes).unwrap();
    }
    register(store, dir.path(), port, "next").unwrap();
    dir
}

fn detector(store: RegistryStore, config: &ClientConfig) -> ChangeDetector {
    let controller = LifecycleController::new(store, config);
    let api = DaemonApi::new(config).unwrap();
    ChangeDetector::new(controller, api)
}

#[tokio::test]
async fn test_sync_skips_directories_without_markers() {
    let registry = TempDir::new().unwrap();
    let store = RegistryStore::with_dir(registry.path());
    let plain_dir = TempDir::new().unwrap();

    let config = test_config();
    let outcome = detector(store, &config)
        .sync(plain_dir.path(), false, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped);
}

#[tokio::test]
async fn test_sync_is_up_to_date_when_daemon_confirms_hashes() {
    let registry = TempDir::new().unwrap();
    let store = RegistryStore::with_dir(registry.path());

    let (_url, port, hits) =
        scripted_server(vec![Scripted::Respond(response("200 OK", ""))]).await;
    let project = intrig_project(&store, port, Some(r#"{"petstore": "abc123"}"#));

    let config = test_config();
    let outcome = detector(store, &config)
        .sync(project.path(), false, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::UpToDate);
    // One verify round-trip, no generate.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sync_regenerates_unconditionally_without_hash_cache() {
    let registry = TempDir::new().unwrap();
    let store = RegistryStore::with_dir(registry.path());

    let (_url, port, hits) = scripted_server(vec![Scripted::Respond(
        sse_head() + "data: {\"type\":\"status\",\"step\":\"scan\"}\ndata: {\"type\":\"done\"}\n",
    )])
    .await;
    let project = intrig_project(&store, port, None);

    // A stale downstream cache that must be dropped after regeneration.
    let build_cache = project.path().join("node_modules/.cache/intrig");
    std::fs::create_dir_all(&build_cache).unwrap();
    std::fs::write(build_cache.join("chunk.js"), "stale").unwrap();

    let config = test_config();
    let mut steps = Vec::new();
    let outcome = detector(store, &config)
        .sync(project.path(), false, |event| {
            if let GenerateEvent::Status { step, .. } = event {
                steps.push(step.clone());
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Regenerated);
    assert_eq!(steps, vec!["scan"]);
    // The generate call went out without a verify first.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!build_cache.exists());
}

#[tokio::test]
async fn test_sync_regenerates_when_hashes_do_not_match() {
    let registry = TempDir::new().unwrap();
    let store = RegistryStore::with_dir(registry.path());

    let (_url, port, hits) = scripted_server(vec![
        Scripted::Respond(response("409 Conflict", "")),
        Scripted::Respond(sse_head() + "data: {\"type\":\"done\"}\n"),
    ])
    .await;
    let project = intrig_project(&store, port, Some(r#"{"petstore": "outdated"}"#));

    let config = test_config();
    let outcome = detector(store, &config)
        .sync(project.path(), false, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Regenerated);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sync_force_skips_the_verify_round_trip() {
    let registry = TempDir::new().unwrap();
    let store = RegistryStore::with_dir(registry.path());

    let (_url, port, hits) = scripted_server(vec![Scripted::Respond(
        sse_head() + "data: {\"type\":\"done\"}\n",
    )])
    .await;
    let project = intrig_project(&store, port, Some(r#"{"petstore": "abc123"}"#));

    let config = test_config();
    let outcome = detector(store, &config)
        .sync(project.path(), true, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Regenerated);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

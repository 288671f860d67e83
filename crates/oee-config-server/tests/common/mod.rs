// crates/oee-config-server/tests/common/mod.rs
// =============================================================================
// Module: Server Test Helpers
// Description: Shared fixtures for HTTP route tests.
// Purpose: Spawn the server on an ephemeral port against a temp directory.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use oee_config_server::AccessAuditEvent;
use oee_config_server::AccessAuditSink;
use oee_config_server::ConfigServer;
use oee_config_store::ServiceConfig;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Events recorded so far.
    events: Mutex<Vec<AccessAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a snapshot of recorded events.
    pub fn events(&self) -> Vec<AccessAuditEvent> {
        self.events.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }
}

impl AccessAuditSink for RecordingAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Running server bound to a temp directory.
pub struct TestServer {
    /// Base URL of the bound listener.
    pub base_url: String,
    /// Temp directory holding the documents.
    pub dir: TempDir,
    /// Recorded access events.
    pub audit: Arc<RecordingAuditSink>,
    /// Serving task.
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Returns the absolute URL for `route`.
    pub fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    /// Returns the environment document path.
    pub fn env_path(&self) -> PathBuf {
        self.dir.path().join(".env")
    }

    /// Returns the OEE configuration document path.
    pub fn oee_config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("oeeConfig.json")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a server with default limits.
pub async fn spawn_server() -> Result<TestServer, String> {
    spawn_server_with(|_| {}).await
}

/// Spawns a server after applying `adjust` to the configuration.
pub async fn spawn_server_with(
    adjust: impl FnOnce(&mut ServiceConfig),
) -> Result<TestServer, String> {
    let dir = tempfile::tempdir().map_err(|err| format!("temp dir: {err}"))?;
    std::fs::create_dir(dir.path().join("config")).map_err(|err| format!("mkdir: {err}"))?;

    let mut config = ServiceConfig::default();
    config.storage.env_path = dir.path().join(".env").to_string_lossy().into_owned();
    config.storage.oee_config_path =
        dir.path().join("config").join("oeeConfig.json").to_string_lossy().into_owned();
    adjust(&mut config);

    let audit = Arc::new(RecordingAuditSink::default());
    let sink: Arc<dyn AccessAuditSink> = audit.clone();
    let server = ConfigServer::with_audit(config, sink).map_err(|err| err.to_string())?;
    let listener =
        TcpListener::bind("127.0.0.1:0").await.map_err(|err| format!("bind: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("local addr: {err}"))?;
    let handle = tokio::spawn(async move {
        let _ = server.serve_listener(listener).await;
    });
    Ok(TestServer {
        base_url: format!("http://{addr}"),
        dir,
        audit,
        handle,
    })
}

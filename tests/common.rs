#![allow(dead_code)]

use std::sync::Arc;

use jansetu::app::Portal;
use jansetu::config::{ApiConfig, ConfigV1, LoggingConfig, StorageBackend, StorageConfig};
use jansetu::models::{RoleName, User};
use jansetu::navigation::RecordingNavigator;
use jansetu::storage::{FileStorage, FileStorageConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const AADHAAR: &str = "123456789012";
pub const ACCESS_TOKEN: &str = "eyJ.citizen.token";

/// A portal wired to `base_url`, persisting its session in a throwaway directory.
pub struct TestPortal {
    pub portal: Portal,
    pub navigator: Arc<RecordingNavigator>,
    /// Second handle on the session file, for inspecting what was persisted.
    pub storage: FileStorage,
    pub dir: TempDir,
}

pub fn config(base_url: &str, dir: &TempDir) -> ConfigV1 {
    ConfigV1 {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_in_ms: Some(5_000),
        },
        storage: StorageConfig {
            backend: StorageBackend::File(session_file(dir)),
        },
        logging: LoggingConfig::default(),
    }
}

pub fn session_file(dir: &TempDir) -> FileStorageConfig {
    FileStorageConfig {
        path: dir.path().join("session.json"),
    }
}

pub async fn portal(base_url: &str) -> TestPortal {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    portal_in(base_url, dir).await
}

/// Boots a portal over an existing directory, as a fresh process would.
pub async fn portal_in(base_url: &str, dir: TempDir) -> TestPortal {
    let navigator = Arc::new(RecordingNavigator::new());
    let portal = Portal::bootstrap(config(base_url, &dir), navigator.clone())
        .await
        .expect("failed to bootstrap portal");
    let storage = FileStorage::new(&session_file(&dir));
    TestPortal {
        portal,
        navigator,
        storage,
        dir,
    }
}

pub fn user_json(id: i64, aadhar: &str, role: &str) -> Value {
    json!({
        "id": id,
        "aadhar": aadhar,
        "phone": "9876543210",
        "role": {"id": 1, "name": role, "created_at": "2024-01-01T00:00:00"},
        "created_at": "2024-01-01T00:00:00"
    })
}

pub fn citizen() -> User {
    User::new(42, AADHAAR, RoleName::Citizen)
}

/// A backend that accepts connections and never answers, for keeping a request
/// in flight as long as a test needs.
pub async fn hanging_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

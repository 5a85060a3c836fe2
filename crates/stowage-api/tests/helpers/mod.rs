//! Test helpers: build the router around a temporary upload directory.
//!
//! Run from workspace root: `cargo test -p stowage-api`.
#![allow(dead_code)]

pub mod storage;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stowage_api::setup::{self, routes};
use stowage_api::AppState;
use stowage_core::Config;
use stowage_storage::Storage;
use tempfile::TempDir;

pub const UPLOAD_PATH: &str = "/api/upload";

/// Test application: server plus the temporary directory it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Root of the temporary directory; the upload dir lives below it.
    pub fn temp_root(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Names of completed uploads (hidden partial files excluded).
    pub fn stored_files(&self) -> Vec<String> {
        stored_files(&self.upload_dir)
    }
}

/// Setup test app with an isolated upload directory that does not exist yet.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {})
}

/// Setup test app, letting the caller adjust the configuration first.
pub fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = Config::with_upload_dir(temp_dir.path().join("uploads"));
    customize(&mut config);
    let upload_dir = config.upload_dir.clone();

    let (_state, router) = setup::initialize_app(config).expect("Failed to initialize app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

/// Setup test app around a custom storage backend.
pub fn setup_test_app_with_storage(
    make_storage: impl FnOnce(PathBuf) -> Arc<dyn Storage>,
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().join("uploads");
    let config = Config::with_upload_dir(&upload_dir);
    let storage = make_storage(upload_dir.clone());

    let state = Arc::new(AppState::new(config.clone(), storage));
    let router = routes::setup_routes(&config, state);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with a single `file` field.
pub fn file_form(filename: &str, data: impl Into<Vec<u8>>, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data.into())
            .file_name(filename)
            .mime_type(mime_type),
    )
}

pub fn stored_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|entry| {
            entry
                .expect("Failed to read dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

pub fn assert_cors_headers(response: &TestResponse) {
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert_eq!(
        response.header("access-control-allow-methods"),
        "POST, OPTIONS, GET"
    );
    assert_eq!(
        response.header("access-control-allow-headers"),
        "Content-Type"
    );
}

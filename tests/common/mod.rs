#![allow(dead_code, unused_macros)]

use splab::config::AppConfig;
use splab::models::{Bug, BugStatus, Category, NewBug, NewFix, Severity, SuccessfulFixed};
use splab::store;
use splab::uploads::UploadStore;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const JWT_KEY: &str = "test-signing-key";

pub struct TestState {
    pub pool: SqlitePool,
    pub uploads: UploadStore,
    pub config: AppConfig,
    pub media_dir: TempDir,
}

pub async fn state() -> TestState {
    let pool = store::connect_in_memory().await.expect("open in-memory SQLite");
    store::migrate(&pool).await.expect("run schema");
    let media_dir = TempDir::new().expect("create media dir");
    let config = AppConfig {
        jwt_key: Some(JWT_KEY.to_string()),
        staff_password_hash: Some(bcrypt::hash("letmein", 4).expect("hash password")),
        media_root: media_dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    TestState {
        uploads: UploadStore::new(media_dir.path()),
        pool,
        config,
        media_dir,
    }
}

/// Builds the full application around a [`TestState`].
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.pool.clone()))
                .app_data(actix_web::web::Data::new($state.uploads.clone()))
                .app_data(actix_web::web::Data::new($state.config.clone()))
                .configure(splab::handlers::config),
        )
        .await
    };
}

pub fn staff_header() -> (&'static str, String) {
    let token = splab::auth::create_token("admin", JWT_KEY).expect("sign token");
    ("Authorization", format!("Bearer {}", token))
}

pub fn new_bug(title: &str, category: Category) -> NewBug {
    NewBug {
        title: title.to_string(),
        description: format!("{} description", title),
        severity: Severity::Medium,
        category,
        status: BugStatus::Open,
        full_name: "Rita Reporter".to_string(),
        email: "rita@example.com".to_string(),
        phone: "555-0101".to_string(),
        logs: String::new(),
        tools_used: String::new(),
        media_files: Vec::new(),
        code_files: Vec::new(),
        websites: Vec::new(),
    }
}

pub async fn seed_bug(state: &TestState, title: &str, category: Category) -> Bug {
    store::create_bug(&state.pool, &state.uploads, &new_bug(title, category))
        .await
        .expect("seed bug")
        .bug
}

pub async fn seed_fix(state: &TestState, bug: &Bug, fixer: &str) -> SuccessfulFixed {
    let new = NewFix {
        bug_id: bug.id,
        description: "patched".to_string(),
        status: BugStatus::Resolved,
        full_name: fixer.to_string(),
        email: format!("{}@example.com", fixer.to_lowercase()),
        phone: "555-0202".to_string(),
        evidence_media: None,
        evidence_code: None,
    };
    store::create_fix(&state.pool, &state.uploads, &new)
        .await
        .expect("seed fix")
}

/// Hand-rolled `multipart/form-data` body for driving the upload endpoints.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "splab-test-boundary-7MA4YWxkTrZu0gW".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `Content-Type` header value and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

pub fn count_files(dir: &std::path::Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() { count_files(&path) } else { 1 }
        })
        .sum()
}

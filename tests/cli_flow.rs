use anyhow::{Context, Result, ensure};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::json;
use std::{
    env, fs,
    net::TcpListener,
    path::{Path, PathBuf},
    process::Output,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::process::Command;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TempStore(PathBuf);

impl TempStore {
    fn new() -> Self {
        Self(env::temp_dir().join(format!("pagegate-it-{}", Uuid::new_v4())))
    }

    fn file(&self) -> PathBuf {
        self.0.join("origin.json")
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn grant(page_route: &str, exp: i64) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({ "page_route": page_route, "exp": exp });
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header}.{payload}.c2ln")
}

async fn pagegate(api_url: &str, store: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_pagegate"))
        .env_remove("PAGEGATE_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .arg("--api-url")
        .arg(api_url)
        .arg("--store")
        .arg(store)
        .args(args)
        .output()
        .await
        .context("Failed to run pagegate binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[tokio::test]
async fn request_verify_check_round_trip() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    let store = TempStore::new();
    let token = grant("/admin/users", now_unix_seconds() + 3600);

    Mock::given(method("POST"))
        .and(path("/access-requests"))
        .and(body_json(json!({ "email": "a@b.com", "page_route": "/admin/users" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/access-verify"))
        .and(body_json(json!({
            "email": "a@b.com",
            "code": "7421",
            "page_route": "/admin/users"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": token })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let check = ["check", "--page", "/admin/users"];

    let output = pagegate(&uri, &store.file(), &check).await?;
    ensure!(output.status.success(), "check failed: {output:?}");
    assert_eq!(stdout(&output), "request-access");

    let output = pagegate(
        &uri,
        &store.file(),
        &["request", "--email", "a@b.com", "--page", "/admin/users"],
    )
    .await?;
    ensure!(output.status.success(), "request failed: {output:?}");
    assert!(stdout(&output).contains("pagegate verify --email 'a@b.com' --page '/admin/users'"));

    let output = pagegate(
        &uri,
        &store.file(),
        &[
            "verify",
            "--email",
            "a@b.com",
            "--page",
            "/admin/users",
            "--code",
            "7421",
        ],
    )
    .await?;
    ensure!(output.status.success(), "verify failed: {output:?}");
    assert!(stdout(&output).contains("Access granted: /admin/users"));

    let output = pagegate(&uri, &store.file(), &check).await?;
    assert_eq!(stdout(&output), "allow");

    let output = pagegate(&uri, &store.file(), &["check", "--page", "/admin/church"]).await?;
    assert_eq!(stdout(&output), "request-access");

    // The mismatched check dropped the grant.
    let output = pagegate(&uri, &store.file(), &check).await?;
    assert_eq!(stdout(&output), "request-access");

    Ok(())
}

#[tokio::test]
async fn wrong_code_reports_backend_detail() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    let store = TempStore::new();

    Mock::given(method("POST"))
        .and(path("/access-verify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Invalid code" })))
        .mount(&server)
        .await;

    let output = pagegate(
        &server.uri(),
        &store.file(),
        &[
            "verify",
            "--email",
            "a@b.com",
            "--page",
            "/admin/users",
            "--code",
            "0000",
        ],
    )
    .await?;

    ensure!(!output.status.success(), "verify unexpectedly succeeded");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid code"));
    assert!(!store.file().exists());
    Ok(())
}

#[tokio::test]
async fn pending_copy_prints_only_the_code() -> Result<()> {
    if !can_bind_localhost() {
        return Ok(());
    }
    let server = MockServer::start().await;
    let store = TempStore::new();

    Mock::given(method("GET"))
        .and(path("/access-requests/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "email": "a@b.com", "page_route": "/admin/users", "code": "7421" },
            { "id": 2, "email": "c@d.com", "page_route": "/finance", "code": "0193" }
        ])))
        .mount(&server)
        .await;

    let output = pagegate(&server.uri(), &store.file(), &["pending", "--copy", "2"]).await?;
    ensure!(output.status.success(), "pending failed: {output:?}");
    assert_eq!(stdout(&output), "0193");

    let output = pagegate(&server.uri(), &store.file(), &["pending"]).await?;
    let listing = stdout(&output);
    assert!(listing.contains("a@b.com"));
    assert!(listing.contains("/finance"));
    assert!(listing.contains("7421"));
    Ok(())
}

#[tokio::test]
async fn expired_grant_is_removed_by_check() -> Result<()> {
    let store = TempStore::new();
    fs::create_dir_all(&store.0)?;
    let expired = grant("/admin/users", now_unix_seconds() - 2 * 3600);
    fs::write(
        store.file(),
        json!({ "temp_access_token": expired }).to_string(),
    )?;

    let output = pagegate("http://127.0.0.1:9", &store.file(), &["check", "--page", "/admin/users"])
        .await?;
    assert_eq!(stdout(&output), "request-access");

    let remaining: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.file())?)?;
    assert!(remaining.get("temp_access_token").is_none());
    Ok(())
}

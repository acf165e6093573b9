//! Release metadata and self-update tests

use relayctl_core::RuntimeConfig;
use relayctl_update::{ReleaseAsset, ReleaseChecker, SelfUpdater};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime_config(api_url: &str) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.github.api_url = api_url.to_string();
    config.network.user_agent = "relayctl-test/1.0".to_string();
    config
}

fn latest_release_body(tag: &str) -> serde_json::Value {
    serde_json::json!({
        "tag_name": tag,
        "name": format!("relayctl {}", tag),
        "prerelease": false,
        "published_at": "2026-02-01T00:00:00Z",
        "assets": [
            {
                "name": "relayctl-linux-amd64",
                "browser_download_url": "https://dl.example/relayctl-linux-amd64",
                "size": 1024
            }
        ]
    })
}

#[tokio::test]
async fn test_latest_release_sends_github_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/relayctl/relayctl/releases/latest"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .and(header("user-agent", "relayctl-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(latest_release_body("v0.9.0")))
        .expect(1)
        .mount(&server)
        .await;

    let checker = ReleaseChecker::new(&runtime_config(&server.uri())).unwrap();
    let release = checker.get_latest().await.unwrap();

    assert_eq!(release.tag_name, "v0.9.0");
    assert_eq!(release.assets.len(), 1);
}

#[tokio::test]
async fn test_check_update_compares_semver() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/relayctl/relayctl/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(latest_release_body("v0.9.0")))
        .mount(&server)
        .await;

    let checker = ReleaseChecker::new(&runtime_config(&server.uri())).unwrap();

    let newer = checker.check_update("0.4.0").await.unwrap();
    assert_eq!(newer.map(|r| r.tag_name), Some("v0.9.0".to_string()));

    assert!(checker.check_update("v0.9.0").await.unwrap().is_none());
    assert!(checker.check_update("1.0.0").await.unwrap().is_none());
}

#[tokio::test]
async fn test_release_api_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let checker = ReleaseChecker::new(&runtime_config(&server.uri())).unwrap();
    let err = checker.get_latest().await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_self_update_replaces_target_binary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relayctl-linux-amd64"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new relayctl".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("relayctl");
    fs::write(&target, b"old relayctl").unwrap();

    let updater = SelfUpdater::new("relayctl-test/1.0", &target)
        .unwrap()
        .with_binary_path(&target);
    let asset = ReleaseAsset {
        name: "relayctl-linux-amd64".to_string(),
        browser_download_url: format!("{}/relayctl-linux-amd64", server.uri()),
        size: 12,
    };

    let installed = updater.apply(&asset).await.unwrap();
    assert_eq!(installed, target);
    assert_eq!(fs::read(&target).unwrap(), b"new relayctl");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[tokio::test]
async fn test_self_update_failed_download_keeps_old_binary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("relayctl");
    fs::write(&target, b"old relayctl").unwrap();

    let updater = SelfUpdater::new("relayctl-test/1.0", &target)
        .unwrap()
        .with_binary_path(&target);
    let asset = ReleaseAsset {
        name: "relayctl-linux-amd64".to_string(),
        browser_download_url: format!("{}/relayctl-linux-amd64", server.uri()),
        size: 12,
    };

    assert!(updater.apply(&asset).await.is_err());
    assert_eq!(fs::read(&target).unwrap(), b"old relayctl");
}

//! Wiremock helpers for release asset endpoints

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve `content` at `asset_path`, expecting exactly `hits` requests
pub async fn mock_asset(server: &MockServer, asset_path: &str, content: &[u8], hits: u64) {
    Mock::given(method("GET"))
        .and(path(asset_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(hits)
        .mount(server)
        .await;
}

/// Answer `asset_path` with the given status
pub async fn mock_asset_status(server: &MockServer, asset_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(asset_path.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Fail the test if any request reaches the server
pub async fn forbid_requests(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

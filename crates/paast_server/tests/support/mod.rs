//! Shared integration-test server bootstrap helpers.

use axum::extract::connect_info::MockConnectInfo;
use axum_test::TestServer;
use paast_server::{create_app, AppState, Config, PasteStore};
use std::net::SocketAddr;
use std::path::Path;
use tempfile::TempDir;

pub(crate) const TEST_MAX_PASTE_SIZE: usize = 1024;

pub(crate) fn client(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([192, 0, 2, last_octet], 40_000 + u16::from(last_octet)))
}

pub(crate) fn test_config_for_dir(data_dir: &Path, cooldown_secs: u64) -> Config {
    Config {
        data_dir: data_dir.to_str().expect("data dir").to_string(),
        id_salt: "integration-salt".to_string(),
        port: 0,
        max_paste_size: TEST_MAX_PASTE_SIZE,
        paste_cooldown_secs: cooldown_secs,
        trust_proxy_headers: false,
    }
}

pub(crate) fn test_state_for_config(config: Config) -> AppState {
    let store = PasteStore::open(&config).expect("open store");
    AppState::new(config, store)
}

pub(crate) fn test_server_for_peer(state: AppState, peer: SocketAddr) -> TestServer {
    let app = create_app(state).layer(MockConnectInfo(peer));
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server(cooldown_secs: u64) -> (TestServer, AppState, TempDir) {
    setup_test_server_with(cooldown_secs, false)
}

pub(crate) fn setup_test_server_with(
    cooldown_secs: u64,
    trust_proxy_headers: bool,
) -> (TestServer, AppState, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = test_config_for_dir(temp_dir.path(), cooldown_secs);
    config.trust_proxy_headers = trust_proxy_headers;
    let state = test_state_for_config(config);
    let server = test_server_for_peer(state.clone(), client(1));
    (server, state, temp_dir)
}

/// Identifier from a `<scheme>://<host>/<identifier>\n` response body.
pub(crate) fn identifier_from_url(body: &str) -> String {
    body.trim_end()
        .rsplit('/')
        .next()
        .expect("identifier segment")
        .to_string()
}

//! Skip-or-run helper for tests that must bind localhost sockets.
//!
//! Some sandboxes forbid binding even loopback listeners, which breaks
//! every wiremock-based test. These helpers detect that situation and skip
//! the test with a diagnostic instead of failing the suite, while
//! `TALLYGATE_REQUIRE_SOCKET_TESTS=1` turns the skip into a hard failure
//! for environments where sockets are known to work.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var("TALLYGATE_REQUIRE_SOCKET_TESTS")
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let location = Location::caller();
    let message = format!(
        "[socket-bound-test] cannot bind localhost socket at {}:{}; wiremock-based test cannot run in this environment",
        location.file(),
        location.line()
    );
    if socket_tests_required() {
        panic!("{message}. Set TALLYGATE_REQUIRE_SOCKET_TESTS=0 to allow local skip behavior.");
    }

    eprintln!(
        "{message}. Skipping test. Set TALLYGATE_REQUIRE_SOCKET_TESTS=1 to fail-fast instead."
    );
    true
}

pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}

/// Like [`start_mock_server_or_skip`], but the server is not taken from
/// wiremock's shared pool. Pooled servers keep their listener alive after
/// the handle drops; use this variant when a test needs the address to
/// actually stop listening on drop.
pub async fn start_unpooled_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::builder().start().await)
    }
}

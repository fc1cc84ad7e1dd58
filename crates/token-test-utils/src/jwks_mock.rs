//! Mock JWKS endpoint
//!
//! Wraps a wiremock server that serves a key set at
//! `/.well-known/jwks.json`. Expectations (`expect(n)`) are checked when the
//! mock is dropped, so a test fails if the endpoint was hit more or fewer
//! times than declared.

use common::jwks::Jwks;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock serves the key set on.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// A running JWKS endpoint.
pub struct JwksMock {
    server: MockServer,
}

impl JwksMock {
    /// Start an empty server. Mount responses with the `serve_*` methods.
    pub async fn empty() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Start a server that serves `jwks` any number of times.
    pub async fn start(jwks: Jwks) -> Self {
        let mock = Self::empty().await;
        mock.serve(&jwks, None, None).await;
        mock
    }

    /// Full URL of the key set endpoint.
    pub fn uri(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Serve `jwks`, optionally asserting the number of hits and adding a
    /// response delay.
    pub async fn serve(&self, jwks: &Jwks, expected_hits: Option<u64>, delay: Option<Duration>) {
        let mut response = ResponseTemplate::new(200).set_body_json(jwks);
        if let Some(delay) = delay {
            response = response.set_delay(delay);
        }

        let mut mock = Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(response);
        if let Some(hits) = expected_hits {
            mock = mock.expect(hits);
        }
        mock.mount(&self.server).await;
    }

    /// Serve `jwks` for the next `times` requests only.
    ///
    /// Mounted mocks are matched in order, so a later mount takes over once
    /// this one is used up.
    pub async fn serve_times(&self, jwks: &Jwks, times: u64) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer with an HTTP error status.
    pub async fn fail_with_status(&self, status: u16, expected_hits: Option<u64>) {
        let mut mock = Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status));
        if let Some(hits) = expected_hits {
            mock = mock.expect(hits);
        }
        mock.mount(&self.server).await;
    }

    /// Answer 200 with a body that is not a key set.
    pub async fn serve_garbage(&self) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&self.server)
            .await;
    }

    /// Remove every mounted response.
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// Number of requests the server has received.
    pub async fn hits(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

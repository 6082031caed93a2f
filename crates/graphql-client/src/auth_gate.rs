// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Request/response interceptor attaching bearer tokens and reacting to rejected credentials.
//!
//! [`AuthGate`] wraps another [`HttpTransport`] and is itself one, so every request sent through
//! the client (GraphQL or not) passes through [`AuthGate::send`].

use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderValue, StatusCode, header};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::envelope::{ResponseEnvelope, combine_messages};
use crate::session::{TokenSource, usable_token};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

const GRAPHQL_MARKER: &str = "/graphql";
const AUTH_FAILURE_MARKERS: [&str; 2] = ["unauthorized", "authentication"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Third-party upload endpoint. Passed through untouched, responses are not inspected.
    Upload,
    /// Login, registration and similar. Never carries a token, never tears the session down.
    Public,
    Protected,
}

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub upload_markers: Vec<String>,
    pub public_endpoints: Vec<String>,
    pub graphql_marker: String,
    pub auth_failure_code: String,
}

impl AuthPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            upload_markers: config.upload_markers.clone(),
            public_endpoints: config.public_endpoints.clone(),
            graphql_marker: GRAPHQL_MARKER.to_string(),
            auth_failure_code: config.auth_failure_code.clone(),
        }
    }

    /// First match wins: upload markers, then public endpoints.
    pub fn classify(&self, url: &str) -> RequestClass {
        if contains_any(url, &self.upload_markers) {
            RequestClass::Upload
        } else if contains_any(url, &self.public_endpoints) {
            RequestClass::Public
        } else {
            RequestClass::Protected
        }
    }

    pub fn is_graphql(&self, url: &str) -> bool {
        url.contains(&self.graphql_marker)
    }

    /// Whether a 401 GraphQL body reports an authentication failure (as opposed to, say, a
    /// resolver-level permission check that happens to use the same status).
    pub fn is_authentication_failure(&self, body: &[u8]) -> bool {
        let Ok(envelope) = serde_json::from_slice::<ResponseEnvelope>(body) else {
            return false;
        };

        envelope.reported_errors().is_some_and(|errors| {
            errors.iter().any(|error| {
                let message = error.message.to_lowercase();
                AUTH_FAILURE_MARKERS
                    .iter()
                    .any(|marker| message.contains(marker))
                    || error.code() == Some(self.auth_failure_code.as_str())
            })
        })
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::new(""))
    }
}

fn contains_any(url: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && url.contains(marker.as_str()))
}

pub struct AuthGate<T> {
    inner: T,
    policy: AuthPolicy,
    tokens: Arc<dyn TokenSource>,
}

impl<T: HttpTransport> AuthGate<T> {
    pub fn new(inner: T, policy: AuthPolicy, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            inner,
            policy,
            tokens,
        }
    }

    fn authorize(&self, request: &mut HttpRequest) -> Result<(), TransportError> {
        let Some(token) = usable_token(self.tokens.as_ref()) else {
            debug!(url = %request.url, "No token available, sending request anonymously");
            return Ok(());
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError::InvalidRequest(format!("unusable bearer token: {e}")))?;
        value.set_sensitive(true);
        request.headers.insert(header::AUTHORIZATION, value);

        Ok(())
    }

    fn inspect(&self, class: RequestClass, url: &str, response: &HttpResponse) {
        let status = response.status;
        let is_graphql = self.policy.is_graphql(url);

        if status == StatusCode::UNAUTHORIZED {
            if class == RequestClass::Public {
                debug!(%url, "Public endpoint rejected the request");
                return;
            }

            let rejected_session =
                !is_graphql || self.policy.is_authentication_failure(&response.body);

            if rejected_session {
                warn!(%url, "Authentication rejected, tearing down session");
                self.tokens.on_unauthorized();
            } else {
                debug!(%url, "401 without an authentication error in the body");
            }
        } else if status.is_server_error() {
            error!(%url, %status, "Server error");
        } else if is_graphql && status.is_success() {
            if let Ok(envelope) = serde_json::from_slice::<ResponseEnvelope>(&response.body) {
                if let Some(errors) = envelope.reported_errors() {
                    warn!(%url, errors = %combine_messages(errors), "GraphQL errors in response");
                }
            }
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for AuthGate<T> {
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let class = self.policy.classify(&request.url);

        match class {
            RequestClass::Upload => return self.inner.send(request).await,
            RequestClass::Public => {}
            RequestClass::Protected => self.authorize(&mut request)?,
        }

        let url = request.url.clone();
        let outcome = self.inner.send(request).await;

        match &outcome {
            Ok(response) => self.inspect(class, &url, response),
            Err(e) => error!(%url, "Request failed: {e}"),
        }

        outcome
    }
}

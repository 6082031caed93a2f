// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Test doubles for the transport and the session.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;

use crate::session::TokenSource;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Replays canned outcomes in order and records every request it receives.
#[derive(Default)]
pub struct RecordingTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, status: StatusCode, body: impl Into<Bytes>) -> Self {
        self.push(Ok(HttpResponse::new(status, body)))
    }

    pub fn with_json(self, status: StatusCode, body: Value) -> Self {
        self.with_response(status, body.to_string())
    }

    pub fn with_error(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    fn push(self, outcome: Result<HttpResponse, TransportError>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no canned response left".to_string())))
    }
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A fixed token that counts teardown requests instead of performing them.
pub struct CountingSession {
    token: Option<String>,
    teardowns: AtomicUsize,
}

impl CountingSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            teardowns: AtomicUsize::new(0),
        }
    }

    pub fn with_token(token: &str) -> Self {
        Self::new(Some(token.to_string()))
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }
}

impl TokenSource for CountingSession {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn on_unauthorized(&self) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

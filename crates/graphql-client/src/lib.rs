// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL client core for the MRP backend.
//!
//! A [`GraphQLClient`] turns one operation into one HTTP POST to `<base>/graphql`, sends it through
//! an [`AuthGate`] that attaches the session's bearer token, and normalizes the reply into either
//! the `data` payload or a single [`ClientError`].
//!
//! ```ignore
//! let config = ClientConfig::from_env(&SystemEnvironment)?;
//! let session = Arc::new(InMemorySession::with_token(token));
//! let client = GraphQLClient::new(&config, session)?;
//!
//! let data: Value = client.query_raw("query { materials { id name } }", None, None).await?;
//! ```

pub mod auth_gate;
pub mod client;
pub mod config;
pub mod env_const;
pub mod envelope;
pub mod error;
pub mod normalizer;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use auth_gate::{AuthGate, AuthPolicy, RequestClass};
pub use client::GraphQLClient;
pub use config::{ClientConfig, ConfigError};
pub use envelope::{OperationEnvelope, OperationError, ResponseEnvelope, resolve_endpoint};
pub use error::ClientError;
pub use session::{InMemorySession, NoSession, TokenSource};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::auth_gate::{AuthGate, AuthPolicy};
use crate::config::ClientConfig;
use crate::envelope::OperationEnvelope;
use crate::error::ClientError;
use crate::normalizer::normalize;
use crate::session::TokenSource;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// Sends GraphQL operations to a single endpoint.
///
/// `query` and `mutate` build identical requests; the split only documents intent at the call
/// site. Calls are independent of each other: no retries, caching or deduplication. Dropping a
/// returned future abandons the request.
#[derive(Clone)]
pub struct GraphQLClient {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
}

impl GraphQLClient {
    /// A client talking to `config`'s endpoint over HTTP, with requests passing through an
    /// [`AuthGate`] backed by `tokens`.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.request_timeout)
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        let gate = AuthGate::new(transport, AuthPolicy::from_config(config), tokens);

        Ok(Self::with_transport(config.graphql_endpoint(), Arc::new(gate)))
    }

    pub fn with_transport(endpoint: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<T, ClientError> {
        self.execute(document, variables, operation_name).await
    }

    pub async fn mutate<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<T, ClientError> {
        self.execute(document, variables, operation_name).await
    }

    pub async fn query_raw(
        &self,
        document: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.execute_raw(document, variables, operation_name).await
    }

    pub async fn mutate_raw(
        &self,
        document: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.execute_raw(document, variables, operation_name).await
    }

    /// Executes the operation and deserializes `data` into `T`.
    ///
    /// Deserialization is the only check made against `T`: fields that `T` ignores are not
    /// validated, and a mismatch surfaces as [`ClientError::Decode`].
    async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<T, ClientError> {
        let data = self
            .execute_raw(document, variables, operation_name)
            .await?;
        serde_json::from_value(data).map_err(ClientError::Decode)
    }

    #[instrument(
        name = "graphql_client::execute",
        skip_all,
        fields(operation = operation_name.unwrap_or("anonymous"))
    )]
    async fn execute_raw(
        &self,
        document: &str,
        variables: Option<Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Result<Value, ClientError> {
        if document.trim().is_empty() {
            return Err(ClientError::EmptyDocument);
        }

        let envelope =
            OperationEnvelope::new(document, variables, operation_name.map(str::to_string));
        let body = serde_json::to_vec(&envelope).map_err(ClientError::Encode)?;

        debug!(endpoint = %self.endpoint, "Sending GraphQL operation");

        let outcome = self
            .transport
            .send(HttpRequest::post_json(self.endpoint.clone(), body))
            .await;

        normalize(outcome)
    }
}

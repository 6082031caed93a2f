// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;
use thiserror::Error;

use crate::envelope::{OperationError, combine_messages};
use crate::transport::TransportError;

/// The single error surfaced to callers of [`crate::GraphQLClient`].
///
/// Every variant renders a non-empty message suitable for direct display. Use
/// [`ClientError::status`] to branch on the failure class instead of on message text.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unable to reach the server. Check your network connection.")]
    Connectivity { reason: String },

    #[error("Unauthorized: your session is missing or has expired. Please log in again.")]
    Unauthorized,

    #[error("Forbidden: you do not have permission to perform this operation.")]
    Forbidden,

    #[error("Server error (HTTP {status}). Please try again later.")]
    Server { status: u16 },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The server reported errors. Any `data` delivered alongside them is kept in `partial_data`.
    #[error("{}", combine_messages(.errors))]
    GraphQL {
        errors: Vec<OperationError>,
        partial_data: Option<Value>,
    },

    #[error("No data returned from server")]
    EmptyPayload,

    #[error("Malformed GraphQL response: {0}")]
    MalformedResponse(String),

    #[error("Could not decode response data: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Could not encode GraphQL request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("GraphQL document must not be empty")]
    EmptyDocument,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not initialize HTTP client: {0}")]
    Setup(String),
}

impl ClientError {
    /// HTTP status associated with the failure. Connectivity failures report `0`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Connectivity { .. } => Some(0),
            ClientError::Unauthorized => Some(401),
            ClientError::Forbidden => Some(403),
            ClientError::Server { status } | ClientError::Http { status, .. } => Some(*status),
            ClientError::GraphQL { .. } | ClientError::EmptyPayload => Some(200),
            ClientError::MalformedResponse(_)
            | ClientError::Decode(_)
            | ClientError::Encode(_)
            | ClientError::EmptyDocument
            | ClientError::InvalidRequest(_)
            | ClientError::Setup(_) => None,
        }
    }

    /// Errors reported by the server, if this is an application-level failure.
    pub fn graphql_errors(&self) -> &[OperationError] {
        match self {
            ClientError::GraphQL { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidRequest(message) => ClientError::InvalidRequest(message),
            other => ClientError::Connectivity {
                reason: other.to_string(),
            },
        }
    }
}

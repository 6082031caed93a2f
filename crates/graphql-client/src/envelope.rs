// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL-over-HTTP wire shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const GRAPHQL_PATH: &str = "/graphql";

/// Resolves the GraphQL endpoint from a configured API base URL.
///
/// Trailing slashes of the base are ignored, so `http://host/api` and `http://host/api/` both
/// resolve to `http://host/api/graphql`.
pub fn resolve_endpoint(base: &str) -> String {
    format!("{}{GRAPHQL_PATH}", base.trim_end_matches('/'))
}

/// Request body for a single GraphQL operation.
///
/// Absent members are omitted from the serialized body rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationEnvelope {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl OperationEnvelope {
    pub fn new(
        query: impl Into<String>,
        variables: Option<Map<String, Value>>,
        operation_name: Option<String>,
    ) -> Self {
        Self {
            query: query.into(),
            variables: variables.filter(|variables| !variables.is_empty()),
            operation_name: operation_name.filter(|name| !name.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<OperationError>>,
}

impl ResponseEnvelope {
    /// The `errors` array, if present and non-empty.
    pub fn reported_errors(&self) -> Option<&[OperationError]> {
        self.errors
            .as_deref()
            .filter(|errors| !errors.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u64,
    pub column: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl OperationError {
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.code.as_deref())
            .filter(|code| !code.is_empty())
    }

    /// Renders the error as `[CODE] message (at a.0.b)`, leaving out the parts the server did not
    /// send.
    pub fn display_message(&self) -> String {
        let mut rendered = String::new();

        if let Some(code) = self.code() {
            rendered.push_str(&format!("[{code}] "));
        }

        if self.message.trim().is_empty() {
            rendered.push_str("Unknown GraphQL error");
        } else {
            rendered.push_str(&self.message);
        }

        if let Some(path) = self.path.as_ref().filter(|path| !path.is_empty()) {
            let joined = path
                .iter()
                .map(|segment| segment.to_string())
                .collect::<Vec<_>>()
                .join(".");
            rendered.push_str(&format!(" (at {joined})"));
        }

        rendered
    }
}

/// Combines several errors into one message, separated by `"; "`.
pub fn combine_messages(errors: &[OperationError]) -> String {
    errors
        .iter()
        .map(OperationError::display_message)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        for base in ["http://localhost:8080/api", "http://localhost:8080/api/"] {
            assert_eq!(resolve_endpoint(base), "http://localhost:8080/api/graphql");
        }
        assert_eq!(resolve_endpoint("http://localhost:8080"), "http://localhost:8080/graphql");
    }

    #[test]
    fn absent_members_are_not_serialized() {
        let envelope = OperationEnvelope::new("query { ping }", None, None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "query": "query { ping }" })
        );

        // Empty variables and a blank operation name count as absent
        let envelope = OperationEnvelope::new("query { ping }", Some(Map::new()), Some("".into()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "query": "query { ping }" })
        );
    }

    #[test]
    fn present_members_are_serialized() {
        let variables = json!({ "id": 7 }).as_object().cloned();
        let envelope = OperationEnvelope::new(
            "query Material($id: ID!) { material(id: $id) { name } }",
            variables,
            Some("Material".to_string()),
        );

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "query": "query Material($id: ID!) { material(id: $id) { name } }",
                "variables": { "id": 7 },
                "operationName": "Material",
            })
        );
    }

    #[test]
    fn response_with_null_data() {
        let envelope: ResponseEnvelope =
            serde_json::from_value(json!({ "data": null, "errors": [] })).unwrap();
        assert_eq!(envelope.data, None);
        assert!(envelope.reported_errors().is_none());
    }

    #[test]
    fn error_rendering() {
        let errors: Vec<OperationError> = serde_json::from_value(json!([
            { "message": "Not found", "extensions": { "code": "NOT_FOUND" } },
            { "message": "Bad quantity", "path": ["createOrder", "lines", 2, "quantity"] },
            {
                "message": "Denied",
                "path": ["deleteProduct"],
                "extensions": { "code": "FORBIDDEN", "classification": "DataFetchingException" }
            },
            { "message": "plain" },
        ]))
        .unwrap();

        assert_eq!(errors[0].display_message(), "[NOT_FOUND] Not found");
        assert_eq!(
            errors[1].display_message(),
            "Bad quantity (at createOrder.lines.2.quantity)"
        );
        assert_eq!(errors[2].display_message(), "[FORBIDDEN] Denied (at deleteProduct)");
        assert_eq!(
            errors[2].extensions.as_ref().unwrap().rest.get("classification"),
            Some(&json!("DataFetchingException"))
        );

        assert_eq!(
            combine_messages(&errors),
            "[NOT_FOUND] Not found; Bad quantity (at createOrder.lines.2.quantity); \
             [FORBIDDEN] Denied (at deleteProduct); plain"
        );
    }

    #[test]
    fn blank_message_is_never_rendered_empty() {
        let error: OperationError = serde_json::from_value(json!({ "message": "" })).unwrap();
        assert_eq!(error.display_message(), "Unknown GraphQL error");
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Turns a transport outcome into either the unwrapped `data` payload or a classified error.
//!
//! Precedence:
//! 1. A transport failure or non-2xx status is classified by status alone.
//! 2. A non-empty `errors` array fails the operation, even when `data` is also present.
//! 3. Missing or null `data` is reported as an empty payload.
//! 4. Otherwise `data` is returned as is. No validation against the caller's expected shape
//!    happens here.

use http::StatusCode;
use serde_json::Value;

use crate::envelope::{ResponseEnvelope, combine_messages};
use crate::error::ClientError;
use crate::transport::{HttpResponse, TransportError};

pub fn normalize(outcome: Result<HttpResponse, TransportError>) -> Result<Value, ClientError> {
    let response = outcome?;

    if !response.status.is_success() {
        return Err(classify_status(response.status, &response.body));
    }

    let envelope: ResponseEnvelope = serde_json::from_slice(&response.body)
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

    if envelope.reported_errors().is_some() {
        return Err(ClientError::GraphQL {
            errors: envelope.errors.unwrap_or_default(),
            partial_data: envelope.data,
        });
    }

    match envelope.data {
        Some(Value::Null) | None => Err(ClientError::EmptyPayload),
        Some(data) => Ok(data),
    }
}

fn classify_status(status: StatusCode, body: &[u8]) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden,
        status if status.is_server_error() => ClientError::Server {
            status: status.as_u16(),
        },
        status => ClientError::Http {
            status: status.as_u16(),
            message: status_message(status, body),
        },
    }
}

/// GraphQL errors carried by the body take precedence over the status reason.
fn status_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ResponseEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.reported_errors().map(combine_messages))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn respond(status: StatusCode, body: Value) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(status, body.to_string()))
    }

    #[test]
    fn success_returns_data() {
        let data = normalize(respond(StatusCode::OK, json!({ "data": { "ping": true } }))).unwrap();
        assert_eq!(data, json!({ "ping": true }));
    }

    #[test]
    fn empty_errors_array_is_not_a_failure() {
        let data = normalize(respond(
            StatusCode::OK,
            json!({ "data": { "ping": true }, "errors": [] }),
        ))
        .unwrap();
        assert_eq!(data, json!({ "ping": true }));
    }

    #[test]
    fn errors_win_over_partial_data() {
        let error = normalize(respond(
            StatusCode::OK,
            json!({
                "data": { "products": [{ "id": 1 }] },
                "errors": [{ "message": "Price unavailable", "path": ["products", 0, "price"] }]
            }),
        ))
        .unwrap_err();

        assert_eq!(error.to_string(), "Price unavailable (at products.0.price)");
        assert_eq!(error.status(), Some(200));
        match error {
            ClientError::GraphQL { partial_data, .. } => {
                assert_eq!(partial_data, Some(json!({ "products": [{ "id": 1 }] })));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn application_error_message() {
        let error = normalize(respond(
            StatusCode::OK,
            json!({ "errors": [{ "message": "Not found", "extensions": { "code": "NOT_FOUND" } }] }),
        ))
        .unwrap_err();

        assert_eq!(error.to_string(), "[NOT_FOUND] Not found");
        assert_eq!(error.graphql_errors().len(), 1);
    }

    #[test]
    fn missing_or_null_data() {
        for body in [json!({}), json!({ "data": null })] {
            let error = normalize(respond(StatusCode::OK, body)).unwrap_err();
            assert!(matches!(error, ClientError::EmptyPayload));
            assert_eq!(error.to_string(), "No data returned from server");
        }
    }

    #[test]
    fn malformed_success_body() {
        let error = normalize(Ok(HttpResponse::new(StatusCode::OK, "<html></html>"))).unwrap_err();
        assert!(matches!(error, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn connectivity_ignores_everything_else() {
        for transport_error in [
            TransportError::Connect("connection refused".to_string()),
            TransportError::Timeout,
            TransportError::Other("body closed".to_string()),
        ] {
            let error = normalize(Err(transport_error)).unwrap_err();
            assert_eq!(error.status(), Some(0));
            assert_eq!(
                error.to_string(),
                "Unable to reach the server. Check your network connection."
            );
        }
    }

    #[test]
    fn status_classes() {
        let graphql_body = json!({ "errors": [{ "message": "Unauthorized" }] });

        let error = normalize(respond(StatusCode::UNAUTHORIZED, graphql_body.clone())).unwrap_err();
        assert!(matches!(error, ClientError::Unauthorized));

        let error = normalize(respond(StatusCode::FORBIDDEN, graphql_body.clone())).unwrap_err();
        assert!(matches!(error, ClientError::Forbidden));

        for status in [StatusCode::INTERNAL_SERVER_ERROR, StatusCode::BAD_GATEWAY] {
            let error = normalize(respond(status, graphql_body.clone())).unwrap_err();
            assert_eq!(
                error.to_string(),
                format!("Server error (HTTP {}). Please try again later.", status.as_u16())
            );
        }
    }

    #[test]
    fn generic_http_status() {
        let error = normalize(Ok(HttpResponse::new(StatusCode::NOT_FOUND, ""))).unwrap_err();
        assert_eq!(error.to_string(), "HTTP 404: Not Found");
        assert_eq!(error.status(), Some(404));

        // GraphQL errors in the body replace the status reason
        let error = normalize(respond(
            StatusCode::BAD_REQUEST,
            json!({ "errors": [{ "message": "Unknown field `nme`", "extensions": { "code": "GRAPHQL_VALIDATION_FAILED" } }] }),
        ))
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "HTTP 400: [GRAPHQL_VALIDATION_FAILED] Unknown field `nme`"
        );
        assert_eq!(error.status(), Some(400));
    }
}

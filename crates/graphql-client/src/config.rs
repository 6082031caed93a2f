// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use mrp_env::{EnvError, Environment, get_parsed};
use thiserror::Error;

use crate::env_const::{
    MRP_API_URL, MRP_AUTH_FAILURE_CODE, MRP_PUBLIC_ENDPOINTS, MRP_REQUEST_TIMEOUT_SECS,
    MRP_UPLOAD_MARKERS,
};
use crate::envelope::resolve_endpoint;

pub const DEFAULT_PUBLIC_ENDPOINTS: [&str; 4] =
    ["/auth/login", "/auth/register", "login", "register"];
pub const DEFAULT_UPLOAD_MARKERS: [&str; 1] = ["api.imgbb.com"];
pub const DEFAULT_AUTH_FAILURE_CODE: &str = "UNAUTHENTICATED";

/// Read-only inputs of the transport and the auth gate.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, with or without a trailing slash.
    pub api_base_url: String,
    /// Substrings identifying endpoints that never carry a token.
    pub public_endpoints: Vec<String>,
    /// Substrings identifying third-party upload endpoints, which bypass the auth gate entirely.
    pub upload_markers: Vec<String>,
    /// `extensions.code` the server uses for authentication failures.
    pub auth_failure_code: String,
    /// Overall request timeout. `None` leaves it to the HTTP stack.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            public_endpoints: to_strings(&DEFAULT_PUBLIC_ENDPOINTS),
            upload_markers: to_strings(&DEFAULT_UPLOAD_MARKERS),
            auth_failure_code: DEFAULT_AUTH_FAILURE_CODE.to_string(),
            request_timeout: None,
        }
    }

    pub fn from_env(env: &dyn Environment) -> Result<Self, ConfigError> {
        let api_base_url = env.get_required(MRP_API_URL)?;
        url::Url::parse(&api_base_url).map_err(|source| ConfigError::InvalidUrl {
            url: api_base_url.clone(),
            source,
        })?;

        let request_timeout = match get_parsed::<u64>(env, MRP_REQUEST_TIMEOUT_SECS)? {
            Some(0) => return Err(ConfigError::ZeroTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            api_base_url,
            public_endpoints: env.get_list(
                MRP_PUBLIC_ENDPOINTS,
                to_strings(&DEFAULT_PUBLIC_ENDPOINTS),
            ),
            upload_markers: env.get_list(MRP_UPLOAD_MARKERS, to_strings(&DEFAULT_UPLOAD_MARKERS)),
            auth_failure_code: env
                .get_non_blank(MRP_AUTH_FAILURE_CODE)
                .unwrap_or_else(|| DEFAULT_AUTH_FAILURE_CODE.to_string()),
            request_timeout,
        })
    }

    pub fn graphql_endpoint(&self) -> String {
        resolve_endpoint(&self.api_base_url)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Invalid API URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("MRP_REQUEST_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,
}

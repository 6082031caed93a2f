// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Map, Value};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use mrp_env::{MapEnvironment, SystemEnvironment};
use mrp_graphql_client::env_const::{MRP_API_URL, MRP_AUTH_TOKEN};
use mrp_graphql_client::{ClientConfig, GraphQLClient, InMemorySession, NoSession, TokenSource};

const MRP_LOG: &str = "MRP_LOG";

/// Send a single GraphQL operation to the MRP backend and print the returned `data`.
///
/// Usage:
///
/// ```bash
/// mrp-gql --endpoint http://localhost:8080/api 'query { materials { id name } }'
/// mrp-gql --mutation --file create_order.graphql --variables '{"customerId": 4}'
/// ```
#[derive(Parser, Debug)]
#[command(name = "mrp-gql", version)]
struct Cli {
    /// Base API URL; `/graphql` is appended. Defaults to `MRP_API_URL`.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Bearer token. Defaults to `MRP_AUTH_TOKEN`; the request is sent anonymously without one.
    #[arg(short, long, env = MRP_AUTH_TOKEN, hide_env_values = true)]
    token: Option<String>,

    /// Operation variables as a JSON object.
    #[arg(long)]
    variables: Option<String>,

    #[arg(long)]
    operation_name: Option<String>,

    /// Send the document as a mutation.
    #[arg(long)]
    mutation: bool,

    /// Read the document from a file instead of the command line.
    #[arg(short, long, conflicts_with = "document")]
    file: Option<PathBuf>,

    /// The GraphQL document.
    #[arg(required_unless_present = "file")]
    document: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing();

    let document = match (&cli.document, &cli.file) {
        (Some(document), _) => document.clone(),
        (None, Some(file)) => tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Could not read {}", file.display()))?,
        (None, None) => bail!("No GraphQL document given"),
    };
    let variables = cli.variables.as_deref().map(parse_variables).transpose()?;

    let client = create_client(&cli)?;
    let operation_name = cli.operation_name.as_deref();

    let data = if cli.mutation {
        client.mutate_raw(&document, variables, operation_name).await
    } else {
        client.query_raw(&document, variables, operation_name).await
    }?;

    println!("{}", serde_json::to_string_pretty(&data)?);

    Ok(())
}

fn create_client(cli: &Cli) -> Result<GraphQLClient> {
    let mut env = MapEnvironment::new_with_fallback(Arc::new(SystemEnvironment));
    if let Some(endpoint) = &cli.endpoint {
        env.set(MRP_API_URL, endpoint);
    }
    let config = ClientConfig::from_env(&env)?;

    let session: Arc<dyn TokenSource> = match &cli.token {
        Some(token) => Arc::new(InMemorySession::with_token(token.as_str())),
        None => Arc::new(NoSession),
    };

    tracing::info!(endpoint = %config.graphql_endpoint(), "Using GraphQL endpoint");

    Ok(GraphQLClient::new(&config, session)?)
}

fn parse_variables(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("Variables are not valid JSON")? {
        Value::Object(variables) => Ok(variables),
        other => bail!("Variables must be a JSON object, got `{other}`"),
    }
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var(MRP_LOG)
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use serde_json::json;

    use super::*;

    #[test]
    fn cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn document_or_file() {
        let cli = Cli::try_parse_from(["mrp-gql", "--mutation", "mutation { x }"]).unwrap();
        assert!(cli.mutation);
        assert_eq!(cli.document.as_deref(), Some("mutation { x }"));

        let cli = Cli::try_parse_from(["mrp-gql", "--file", "op.graphql"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("op.graphql")));

        assert!(Cli::try_parse_from(["mrp-gql", "--file", "op.graphql", "query { x }"]).is_err());
    }

    #[test]
    fn variables_must_be_an_object() {
        assert_eq!(
            Value::Object(parse_variables(r#"{"id": 3}"#).unwrap()),
            json!({ "id": 3 })
        );
        assert!(parse_variables("[1, 2]").is_err());
        assert!(parse_variables("{").is_err());
    }
}

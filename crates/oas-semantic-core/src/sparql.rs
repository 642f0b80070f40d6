//! SPARQL count oracle for ontology URI verification.
//!
//! Scoring batches every externally-verifiable field URI of a model into a
//! single count query: how many of the candidate URIs appear as the subject
//! of at least one triple. The HTTP client treats a non-success status as
//! zero matches; transport errors surface to the caller, which fails open.

use std::error::Error;

use async_trait::async_trait;
use serde::Deserialize;

/// Oracle answering "how many of these URIs are known to the ontology?".
#[async_trait]
pub trait SparqlClient: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the query cannot be sent or the response cannot
    /// be read. Callers are expected to treat failures as zero matches.
    async fn count_known(&self, uris: &[String]) -> Result<u64, Box<dyn Error + Send + Sync>>;
}

/// Build the batched count query over all candidate URIs.
///
/// `COUNT(DISTINCT ...)` keeps the result bounded by the candidate count
/// even when a URI has many triples.
pub(crate) fn count_query(uris: &[String]) -> String {
    let values = uris
        .iter()
        .map(|uri| format!("<{uri}>"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "SELECT (COUNT(DISTINCT ?fieldUri) AS ?count) \
         WHERE {{ ?fieldUri ?predicate ?object . VALUES ?fieldUri {{ {values} }} }}"
    )
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<CountBinding>,
}

#[derive(Debug, Deserialize)]
struct CountBinding {
    count: SparqlValue,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

/// SPARQL client speaking the `?format=json&query=...` GET protocol.
#[derive(Debug, Clone)]
pub struct HttpSparqlClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSparqlClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SparqlClient for HttpSparqlClient {
    async fn count_known(&self, uris: &[String]) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let query = count_query(uris);
        tracing::debug!(endpoint = %self.endpoint, candidates = uris.len(), "SPARQL count query");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("query", query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "SPARQL endpoint returned non-success; treating as zero matches"
            );
            return Ok(0);
        }

        let body: SparqlResponse = response.json().await?;
        let binding = body
            .results
            .bindings
            .first()
            .ok_or("SPARQL response carried no count binding")?;
        Ok(binding.count.value.parse::<u64>()?)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

//! Minimal GraphQL client for the Balancer subgraph.

use {
    anyhow::{Context, Result},
    reqwest::{Client, IntoUrl},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::{Map, Value},
    thiserror::Error,
    url::Url,
};

#[derive(Clone, Debug)]
pub struct SubgraphClient {
    client: Client,
    subgraph_url: Url,
}

impl SubgraphClient {
    pub fn new(subgraph_url: impl IntoUrl, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            subgraph_url: subgraph_url.into_url().context("invalid subgraph URL")?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.subgraph_url
    }

    /// POSTs `query` with `variables` and returns the `data` of the response.
    pub async fn query<T>(&self, query: &str, variables: Option<Map<String, Value>>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        tracing::trace!(url = %self.subgraph_url, ?variables, "subgraph query");
        let response = self
            .client
            .post(self.subgraph_url.clone())
            .json(&Request { query, variables })
            .send()
            .await
            .context("subgraph request failed")?
            .error_for_status()?
            .json::<Response<T>>()
            .await
            .context("invalid subgraph response body")?;
        Ok(response.into_data()?)
    }
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    variables: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Response<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    /// Errors invalidate the whole response, even if partial data came with
    /// them.
    #[error("subgraph query failed: {}", .0.join("; "))]
    Graphql(Vec<String>),
    #[error("subgraph response has no data")]
    NoData,
}

impl<T> Response<T> {
    fn into_data(self) -> Result<T, ResponseError> {
        let errors = self.errors.unwrap_or_default();
        if !errors.is_empty() {
            return Err(ResponseError::Graphql(
                errors.into_iter().map(|error| error.message).collect(),
            ));
        }
        self.data.ok_or(ResponseError::NoData)
    }
}

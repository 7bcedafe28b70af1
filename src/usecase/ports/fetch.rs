use std::future::Future;

use async_trait::async_trait;

use crate::domain::entities::table::{FetchParams, FetchResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("invalid request parameters: {0}")]
    InvalidParams(String),
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Wraps an untyped failure, keeping the whole context chain.
    pub fn backend(err: anyhow::Error) -> Self {
        FetchError::Backend(format!("{err:#}"))
    }

    pub fn other(message: impl Into<String>) -> Self {
        FetchError::Other(message.into())
    }
}

/// The endpoint behind a remote table.
#[async_trait]
pub trait RowSource<T>: Send + Sync {
    async fn fetch(&self, params: &FetchParams) -> Result<FetchResult<T>, FetchError>;
}

/// Lets a plain async closure act as a [`RowSource`].
#[allow(dead_code)]
pub struct FnSource<F> {
    fetch_fn: F,
}

#[allow(dead_code)]
impl<F> FnSource<F> {
    pub fn new(fetch_fn: F) -> Self {
        Self { fetch_fn }
    }
}

#[async_trait]
impl<T, F, Fut> RowSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(FetchParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResult<T>, FetchError>> + Send,
{
    async fn fetch(&self, params: &FetchParams) -> Result<FetchResult<T>, FetchError> {
        (self.fetch_fn)(params.clone()).await
    }
}

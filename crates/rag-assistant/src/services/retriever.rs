use async_trait::async_trait;

use crate::models::Snippet;
use crate::utils::error::Result;

/// A source of ranked snippets for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &str;

    async fn retrieve(&self, query: &str) -> Result<Vec<Snippet>>;
}

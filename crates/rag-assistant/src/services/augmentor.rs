use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::Snippet;
use crate::services::query_router::QueryRouter;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct AugmentedQuery {
    /// User message sent to the model.
    pub text: String,
    /// Snippets that made it into `text`, in injection order.
    pub snippets: Vec<Snippet>,
}

impl AugmentedQuery {
    pub fn is_augmented(&self) -> bool {
        !self.snippets.is_empty()
    }
}

pub struct RetrievalAugmentor {
    router: Arc<dyn QueryRouter>,
    context_header: String,
    /// 0 disables the budget
    max_context_chars: usize,
}

impl RetrievalAugmentor {
    pub fn new(router: Arc<dyn QueryRouter>, context_header: String, max_context_chars: usize) -> Self {
        Self {
            router,
            context_header,
            max_context_chars,
        }
    }

    /// Routes the query, runs the selected retrievers in order and injects their snippets.
    /// A failing retriever fails the whole call.
    pub async fn augment(&self, query: &str) -> Result<AugmentedQuery> {
        let retrievers = self.router.route(query).await?;

        if retrievers.is_empty() {
            debug!("No retriever selected, sending query unmodified");
            return Ok(AugmentedQuery {
                text: query.to_string(),
                snippets: Vec::new(),
            });
        }

        let mut snippets = Vec::new();
        for retriever in &retrievers {
            let found = retriever.retrieve(query).await?;
            debug!("Retriever '{}' returned {} snippets", retriever.name(), found.len());
            snippets.extend(found);
        }

        let snippets = self.within_budget(snippets);

        info!(
            "Augmenting query with {} snippets from {} retrievers",
            snippets.len(),
            retrievers.len()
        );

        Ok(AugmentedQuery {
            text: inject(query, &self.context_header, &snippets),
            snippets,
        })
    }

    /// Keeps whole snippets while the injected block (header, snippets and
    /// separators) fits in the budget. The first snippet is always kept, cut down if needed.
    fn within_budget(&self, snippets: Vec<Snippet>) -> Vec<Snippet> {
        if self.max_context_chars == 0 {
            return snippets;
        }

        let total = snippets.len();
        let mut used = self.context_header.chars().count() + 1;
        let mut kept: Vec<Snippet> = Vec::with_capacity(total);

        for mut snippet in snippets {
            let separator = if kept.is_empty() { 0 } else { 2 };
            let cost = separator + snippet.render().chars().count();

            if used + cost <= self.max_context_chars {
                used += cost;
                kept.push(snippet);
                continue;
            }

            if kept.is_empty() {
                snippet.truncate_rendered(self.max_context_chars.saturating_sub(used));
                warn!(
                    "First snippet from '{}' exceeds the {} char context budget, truncated",
                    snippet.source, self.max_context_chars
                );
                kept.push(snippet);
            }
            break;
        }

        if kept.len() < total {
            debug!(
                "Context truncated at {} of {} snippets (max {} chars)",
                kept.len(),
                total,
                self.max_context_chars
            );
        }

        kept
    }
}

/// `{query}\n\n{header}\n{snippet}\n\n{snippet}...`; the query alone when nothing was found.
pub fn inject(query: &str, header: &str, snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return query.to_string();
    }

    let contents = snippets
        .iter()
        .map(Snippet::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n\n{}\n{}", query, header, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::query_router::{AlwaysAllRouter, NoRetrievalRouter};
    use crate::services::retriever::Retriever;
    use crate::services::test_support::{FailingRetriever, StaticRetriever};
    use crate::utils::error::AssistantError;

    const HEADER: &str = "Answer using the following information:";

    fn augmentor(retrievers: Vec<Arc<dyn Retriever>>, budget: usize) -> RetrievalAugmentor {
        RetrievalAugmentor::new(Arc::new(AlwaysAllRouter::new(retrievers)), HEADER.to_string(), budget)
    }

    #[tokio::test]
    async fn test_empty_route_passes_query_through() {
        let augmentor = RetrievalAugmentor::new(Arc::new(NoRetrievalRouter), HEADER.to_string(), 0);
        let augmented = augmentor.augment("2+2?").await.unwrap();
        assert_eq!(augmented.text, "2+2?");
        assert!(!augmented.is_augmented());
    }

    #[tokio::test]
    async fn test_concatenates_in_retriever_then_rank_order() {
        let augmentor = augmentor(
            vec![
                Arc::new(StaticRetriever::new("document", &["d1", "d2"])),
                Arc::new(StaticRetriever::new("web", &["w1"])),
            ],
            0,
        );

        let augmented = augmentor.augment("question").await.unwrap();
        assert_eq!(
            augmented.text,
            "question\n\nAnswer using the following information:\nd1\n\nd2\n\nw1"
        );
        let sources: Vec<&str> = augmented.snippets.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(sources, vec!["document", "document", "web"]);
    }

    #[tokio::test]
    async fn test_retrievers_with_no_hits_leave_query_unmodified() {
        let augmentor = augmentor(vec![Arc::new(StaticRetriever::new("document", &[]))], 0);
        let augmented = augmentor.augment("question").await.unwrap();
        assert_eq!(augmented.text, "question");
    }

    #[tokio::test]
    async fn test_budget_counts_header_and_separators() {
        // header + "\n" = 40, "aaaa" = 44, "\n\nbbbb" = 50, "\n\ncccc" = 56
        let augmentor = augmentor(
            vec![Arc::new(StaticRetriever::new("document", &["aaaa", "bbbb", "cccc"]))],
            50,
        );
        let augmented = augmentor.augment("q").await.unwrap();
        assert_eq!(augmented.snippets.len(), 2);
        assert!(!augmented.text.contains("cccc"));

        let context = augmented.text.strip_prefix("q\n\n").unwrap();
        assert_eq!(context.chars().count(), 50);
    }

    #[tokio::test]
    async fn test_oversized_first_snippet_is_truncated_not_dropped() {
        let long = "x".repeat(100);
        let augmentor = augmentor(
            vec![Arc::new(StaticRetriever::new("document", &[long.as_str(), "tail"]))],
            45,
        );
        let augmented = augmentor.augment("q").await.unwrap();

        assert_eq!(augmented.snippets.len(), 1);
        assert_eq!(augmented.snippets[0].content, "xxxxx");
        assert_eq!(augmented.text, "q\n\nAnswer using the following information:\nxxxxx");
    }

    #[tokio::test]
    async fn test_retriever_failure_propagates() {
        let augmentor = augmentor(
            vec![
                Arc::new(StaticRetriever::new("document", &["d1"])),
                Arc::new(FailingRetriever),
            ],
            0,
        );
        let err = augmentor.augment("q").await.unwrap_err();
        assert!(matches!(err, AssistantError::UpstreamUnavailable(_)));
    }
}

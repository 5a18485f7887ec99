use serde::Serialize;

/// One ranked retrieval hit, from the local index or the web.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    /// Name of the retriever that produced it.
    pub source: String,
    pub content: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: f32,
}

impl Snippet {
    pub fn new(source: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            title: None,
            url: None,
            score,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Cuts the content so that `render()` fits in `max_chars`, when possible.
    pub fn truncate_rendered(&mut self, max_chars: usize) {
        let content = self.content.trim();
        let overhead = self.render().chars().count() - content.chars().count();
        self.content = content.chars().take(max_chars.saturating_sub(overhead)).collect();
    }

    /// Text injected into the prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(title);
            out.push('\n');
        }
        out.push_str(self.content.trim());
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            out.push_str("\nSource: ");
            out.push_str(url);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_local_snippet_is_content_only() {
        let snippet = Snippet::new("local", "  chunk text \n", 0.9);
        assert_eq!(snippet.render(), "chunk text");
    }

    #[test]
    fn test_render_web_snippet() {
        let snippet = Snippet::new("web", "body", 0.5)
            .with_title("Title")
            .with_url("https://example.com");
        assert_eq!(snippet.render(), "Title\nbody\nSource: https://example.com");
    }

    #[test]
    fn test_truncate_rendered_keeps_title_and_url() {
        let mut snippet = Snippet::new("web", "  body text  ", 0.5)
            .with_title("Title")
            .with_url("https://example.com");
        snippet.truncate_rendered(37);
        assert_eq!(snippet.render(), "Title\nbod\nSource: https://example.com");
        assert_eq!(snippet.render().chars().count(), 37);
    }
}

//! Interface to diagram renderers.
//!
//! Rendering is not part of this crate. Renderers receive
//! [`DiagramRecord::source`](crate::DiagramRecord::source), which holds the
//! fenced content with comment leaders removed and no marker lines.

/// Result of rendering one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Rendered image bytes.
    Image {
        data: Vec<u8>,
        /// MIME type, e.g. `image/svg+xml`.
        media_type: String,
    },
    /// The renderer rejected the source.
    Error { message: String },
}

impl RenderOutcome {
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Turns diagram source into an image.
///
/// Implementations must be callable from several threads at once.
pub trait DiagramRenderer: Send + Sync {
    /// Diagram keywords this renderer understands (`mermaid`, ...).
    fn languages(&self) -> &[&str];

    fn render(&self, source: &str) -> RenderOutcome;

    /// Render a record if its language is supported.
    fn render_record(&self, record: &crate::DiagramRecord) -> Option<RenderOutcome> {
        self.languages()
            .iter()
            .any(|lang| lang.eq_ignore_ascii_case(&record.language))
            .then(|| self.render(&record.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SourceDocument, build_index};

    /// Echoes the source back as an "image".
    struct EchoRenderer;

    impl DiagramRenderer for EchoRenderer {
        fn languages(&self) -> &[&str] {
            &["mermaid"]
        }

        fn render(&self, source: &str) -> RenderOutcome {
            if source.trim_start().starts_with("graph") {
                RenderOutcome::Image {
                    data: source.as_bytes().to_vec(),
                    media_type: "text/plain".to_owned(),
                }
            } else {
                RenderOutcome::Error {
                    message: format!("unsupported diagram: {source}"),
                }
            }
        }
    }

    #[test]
    fn test_renderer_receives_stripped_source() {
        let text = "/**\n * ```mermaid\n * graph TD\n *   A --> B\n * ```\n */\nfunction f() {}\n";
        let records = build_index(&SourceDocument::new(text, "javascript"));
        let outcome = EchoRenderer.render_record(&records[0]);

        assert_eq!(
            outcome,
            Some(RenderOutcome::Image {
                data: b"graph TD\n  A --> B".to_vec(),
                media_type: "text/plain".to_owned(),
            })
        );
    }

    #[test]
    fn test_unsupported_language_is_not_rendered() {
        let text = "def f():\n    \"\"\"\n    ```plantuml\n    A -> B\n    ```\n    \"\"\"\n";
        let records = crate::DiagramIndexer::new()
            .with_keywords(["plantuml"])
            .index(&SourceDocument::new(text, "python"))
            .records;

        assert_eq!(records.len(), 1);
        assert_eq!(EchoRenderer.render_record(&records[0]), None);
    }

    #[test]
    fn test_render_error() {
        let outcome = EchoRenderer.render("sequenceDiagram");
        assert!(!outcome.is_image());
    }
}

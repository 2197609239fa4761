//! Source documents handed to the index builder.

/// Bytes sampled when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// One source file's text, its language identifier, and an optional URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDocument<'a> {
    /// Full document text.
    pub text: &'a str,
    /// Language identifier (`python`, `rust`, ...) or file extension.
    pub language_id: &'a str,
    /// Document location used to build diagram ids.
    pub uri: Option<&'a str>,
}

impl<'a> SourceDocument<'a> {
    /// Create a document without a URI.
    #[must_use]
    pub fn new(text: &'a str, language_id: &'a str) -> Self {
        Self {
            text,
            language_id,
            uri: None,
        }
    }

    /// Attach a URI.
    #[must_use]
    pub fn with_uri(mut self, uri: &'a str) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Whether the text looks like binary content (NUL byte near the start).
    #[must_use]
    pub fn looks_binary(&self) -> bool {
        let bytes = self.text.as_bytes();
        bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
    }
}

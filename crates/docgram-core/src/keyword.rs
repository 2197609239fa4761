//! Diagram keyword matching for fence info strings.

/// Keyword recognised when none is configured.
pub const DEFAULT_KEYWORD: &str = "mermaid";

/// Set of info-string keywords that mark a fence as a diagram.
///
/// Matching is exact on the first info-string token and ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramKeywords {
    keywords: Vec<String>,
}

impl DiagramKeywords {
    /// Create a keyword set. Empty entries are ignored and duplicates collapse.
    ///
    /// Falls back to the default set when no usable keyword is given.
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        if normalized.is_empty() {
            return Self::default();
        }
        Self {
            keywords: normalized,
        }
    }

    /// Check whether an info-string token names a diagram language.
    #[must_use]
    pub fn matches(&self, info: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(info))
    }

    /// Keywords in configuration order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for DiagramKeywords {
    fn default() -> Self {
        Self {
            keywords: vec![DEFAULT_KEYWORD.to_owned()],
        }
    }
}

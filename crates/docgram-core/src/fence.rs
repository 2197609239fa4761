//! Fenced diagram block extraction.
//!
//! Scans the text of one documentation comment line by line for fenced code
//! blocks and yields the ones whose info string names a diagram keyword.
//!
//! Fences follow the `CommonMark` shape: three or more backticks or tildes
//! open a block, and the block ends at the first line holding a run of the
//! same character that is at least as long, with nothing after it and no
//! deeper indentation than the opening line.

use crate::keyword::DiagramKeywords;
use crate::span::Leader;

/// A diagram fence found inside a documentation comment.
///
/// Offsets are relative to the comment text handed to [`extract_fences`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Offset of the first body byte (start of the line after the opening marker).
    pub local_start: usize,
    /// Offset one past the last body byte (line terminator before the closing
    /// marker excluded).
    pub local_end: usize,
    /// Raw body text, exactly `text[local_start..local_end]`.
    pub body: String,
    /// First token of the info string, lower-cased.
    pub info_string: String,
}

/// Counts of fences that did not produce a [`DiagramBlock`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceStats {
    /// Opening markers with no closing marker before the end of the comment.
    pub unterminated: usize,
    /// Closed fences tagged with something other than a diagram keyword.
    pub skipped: usize,
    /// Diagram fences whose body is empty or whitespace-only.
    pub empty: usize,
}

/// Iterator over the diagram fences of one comment.
///
/// Created by [`extract_fences`]. Counts of discarded fences are available
/// from [`stats`](Self::stats) once iteration has progressed.
pub struct Fences<'a> {
    text: &'a str,
    leader: Leader,
    keywords: &'a DiagramKeywords,
    pos: usize,
    stats: FenceStats,
}

/// Scan comment text for diagram fences.
///
/// The iterator is lazy and restartable: calling this again on the same
/// input yields the same blocks.
///
/// # Example
///
/// ```
/// use docgram_core::{DiagramKeywords, Leader, extract_fences};
///
/// let keywords = DiagramKeywords::default();
/// let text = "Summary.\n\n```mermaid\ngraph TD\n  A --> B\n```\n";
/// let blocks: Vec<_> = extract_fences(text, Leader::None, &keywords).collect();
///
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].body, "graph TD\n  A --> B");
/// ```
#[must_use]
pub fn extract_fences<'a>(
    text: &'a str,
    leader: Leader,
    keywords: &'a DiagramKeywords,
) -> Fences<'a> {
    Fences {
        text,
        leader,
        keywords,
        pos: 0,
        stats: FenceStats::default(),
    }
}

impl Fences<'_> {
    /// Counts of fences discarded so far.
    #[must_use]
    pub fn stats(&self) -> FenceStats {
        self.stats
    }

    /// Find the closing marker for `open`, scanning from `from`.
    ///
    /// Returns the offset of the closing line and the offset just past it.
    fn find_closing(&self, open: &OpeningFence, from: usize) -> Option<(usize, usize)> {
        let mut cursor = from;
        while cursor < self.text.len() {
            let line = line_at(self.text, cursor);
            if is_closing_fence(self.leader.strip(line.content), open) {
                return Some((line.start, line.next));
            }
            cursor = line.next;
        }
        None
    }
}

impl Iterator for Fences<'_> {
    type Item = DiagramBlock;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let line = line_at(self.text, self.pos);
            let Some(open) = detect_opening_fence(self.leader.strip(line.content)) else {
                self.pos = line.next;
                continue;
            };

            let body_start = line.next;
            let Some((close_start, close_next)) = self.find_closing(&open, body_start) else {
                // Resume right after the opening marker so later fences are still found
                self.stats.unterminated += 1;
                self.pos = body_start;
                continue;
            };
            self.pos = close_next;

            if !self.keywords.matches(&open.info) {
                self.stats.skipped += 1;
                continue;
            }

            let body_end = body_end(self.text, body_start, close_start);
            let body = &self.text[body_start..body_end];
            if body.trim().is_empty() {
                self.stats.empty += 1;
                continue;
            }

            return Some(DiagramBlock {
                local_start: body_start,
                local_end: body_end,
                body: body.to_owned(),
                info_string: open.info,
            });
        }
        None
    }
}

/// One line of the scanned text.
struct Line<'a> {
    /// Offset of the first byte of the line.
    start: usize,
    /// Line content without `\n` or `\r\n`.
    content: &'a str,
    /// Offset of the next line (or end of text).
    next: usize,
}

fn line_at(text: &str, start: usize) -> Line<'_> {
    let rest = &text[start..];
    let (raw, next) = match rest.find('\n') {
        Some(idx) => (&rest[..idx], start + idx + 1),
        None => (rest, text.len()),
    };
    Line {
        start,
        content: raw.strip_suffix('\r').unwrap_or(raw),
        next,
    }
}

/// End of the body: the closing line's start minus the preceding terminator.
fn body_end(text: &str, body_start: usize, close_start: usize) -> usize {
    let before = &text[body_start..close_start];
    let trimmed = before
        .strip_suffix('\n')
        .map_or(before, |s| s.strip_suffix('\r').unwrap_or(s));
    body_start + trimmed.len()
}

/// Parsed opening fence marker.
#[derive(Debug, PartialEq, Eq)]
struct OpeningFence {
    /// Fence character (backtick or tilde).
    fence_char: char,
    /// Length of the fence run (minimum length for closing).
    len: usize,
    /// Indentation columns before the run.
    indent: usize,
    /// First info-string token, lower-cased.
    info: String,
}

/// Indentation width in columns, tabs advancing to the next multiple of 4.
fn indent_width(line: &str) -> (usize, &str) {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => return (width, &line[idx..]),
        }
    }
    (width, "")
}

/// Detect if a line opens a code fence.
fn detect_opening_fence(line: &str) -> Option<OpeningFence> {
    let (indent, trimmed) = indent_width(line);
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let len = trimmed.chars().take_while(|&c| c == first).count();
    if len < 3 {
        return None;
    }

    let info = trimmed[len..].trim();
    // Backtick fences cannot carry backticks in their info string
    if first == '`' && info.contains('`') {
        return None;
    }

    Some(OpeningFence {
        fence_char: first,
        len,
        indent,
        info: info
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    })
}

/// Check if a line is a valid closing fence for `open`.
///
/// The closing fence must:
/// - Use the same character as opening
/// - Be at least as long as opening
/// - Contain only fence characters (optionally followed by whitespace)
/// - Be indented no deeper than the opening fence
fn is_closing_fence(line: &str, open: &OpeningFence) -> bool {
    let (indent, trimmed) = indent_width(line);
    if indent > open.indent || !trimmed.starts_with(open.fence_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == open.fence_char).count();
    if count < open.len {
        return false;
    }

    trimmed[count..].chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn mermaid() -> DiagramKeywords {
        DiagramKeywords::default()
    }

    fn bodies(text: &str, leader: Leader) -> Vec<String> {
        let keywords = mermaid();
        extract_fences(text, leader, &keywords)
            .map(|b| b.body)
            .collect()
    }

    #[test]
    fn test_single_fence() {
        let keywords = mermaid();
        let text = "\n    Summary.\n\n    ```mermaid\n    graph TD\n        A --> B\n    ```\n    ";
        let blocks: Vec<_> = extract_fences(text, Leader::None, &keywords).collect();

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.body, "    graph TD\n        A --> B");
        assert_eq!(block.info_string, "mermaid");
        assert_eq!(&text[block.local_start..block.local_end], block.body);
    }

    #[test]
    fn test_two_fences_in_order() {
        let text = "```mermaid\ngraph LR\n  A --> B\n```\ntext\n```mermaid\nsequenceDiagram\n  A->>B: hi\n```\n";
        assert_eq!(
            bodies(text, Leader::None),
            vec![
                "graph LR\n  A --> B".to_owned(),
                "sequenceDiagram\n  A->>B: hi".to_owned()
            ]
        );
    }

    #[test]
    fn test_other_language_skipped_then_diagram_found() {
        let keywords = mermaid();
        let text = "```python\nprint('hi')\n```\n```mermaid\ngraph TD\n  X --> Y\n```";
        let mut fences = extract_fences(text, Leader::None, &keywords);
        let blocks: Vec<_> = fences.by_ref().collect();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "graph TD\n  X --> Y");
        assert_eq!(fences.stats().skipped, 1);
    }

    #[test]
    fn test_fence_like_line_inside_other_block() {
        // ```mermaid carries an info string, so it cannot close the python block;
        // the bare ``` after it does, and the last ``` opens a fence that never closes
        let keywords = mermaid();
        let text = "```python\ndoc = '''\n```mermaid\ngraph TD\n```\n'''\n```\n";
        let mut fences = extract_fences(text, Leader::None, &keywords);
        let blocks: Vec<_> = fences.by_ref().collect();

        assert!(blocks.is_empty());
        assert_eq!(fences.stats().skipped, 1);
    }

    #[test]
    fn test_longer_fence_contains_shorter() {
        let text = "````mermaid\ngraph TD\n```\nA --> B\n````\n";
        assert_eq!(
            bodies(text, Leader::None),
            vec!["graph TD\n```\nA --> B".to_owned()]
        );
    }

    #[test]
    fn test_unterminated_fence_discarded() {
        let keywords = mermaid();
        let text = "Intro\n```mermaid\ngraph TD\n  A --> B\n";
        let mut fences = extract_fences(text, Leader::None, &keywords);

        assert_eq!(fences.next(), None);
        assert_eq!(fences.stats().unterminated, 1);
    }

    #[test]
    fn test_unterminated_fence_does_not_hide_later_fences() {
        let text = "```mermaid\ngraph TD\n~~~mermaid\ngraph LR\n  A --> B\n~~~\n";
        assert_eq!(
            bodies(text, Leader::None),
            vec!["graph LR\n  A --> B".to_owned()]
        );
    }

    #[test]
    fn test_tilde_and_backtick_do_not_close_each_other() {
        let text = "~~~mermaid\ngraph TD\n```\nA --> B\n~~~\n";
        assert_eq!(
            bodies(text, Leader::None),
            vec!["graph TD\n```\nA --> B".to_owned()]
        );
    }

    #[test]
    fn test_deeper_indented_closer_does_not_close() {
        let text = "  ```mermaid\n  graph TD\n      ```\n  ```\n";
        assert_eq!(
            bodies(text, Leader::None),
            vec!["  graph TD\n      ```".to_owned()]
        );
    }

    #[test]
    fn test_closer_with_trailing_text_does_not_close() {
        let text = "```mermaid\ngraph TD\n``` not a closer\n```\n";
        assert_eq!(
            bodies(text, Leader::None),
            vec!["graph TD\n``` not a closer".to_owned()]
        );
    }

    #[test]
    fn test_info_string_case_and_attributes() {
        let keywords = mermaid();
        let text = "```  Mermaid title=\"flow\"\ngraph TD\n```\n";
        let blocks: Vec<_> = extract_fences(text, Leader::None, &keywords).collect();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].info_string, "mermaid");
    }

    #[test]
    fn test_backtick_in_info_string_is_not_fence() {
        let text = "```mermaid``` inline\n```mermaid\ngraph TD\n```\n";
        assert_eq!(bodies(text, Leader::None), vec!["graph TD".to_owned()]);
    }

    #[test]
    fn test_empty_and_blank_bodies_dropped() {
        let keywords = mermaid();
        let text = "```mermaid\n```\n```mermaid\n   \n\n```\n";
        let mut fences = extract_fences(text, Leader::None, &keywords);

        assert_eq!(fences.next(), None);
        assert_eq!(fences.stats().empty, 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let keywords = mermaid();
        let text = "```mermaid\r\ngraph TD\r\n  A --> B\r\n```\r\n";
        let blocks: Vec<_> = extract_fences(text, Leader::None, &keywords).collect();

        assert_eq!(blocks[0].body, "graph TD\r\n  A --> B");
        assert_eq!(&text[blocks[0].local_start..blocks[0].local_end], blocks[0].body);
    }

    #[test]
    fn test_star_leader() {
        let text = "*\n * Parser states:\n *\n * ```mermaid\n * stateDiagram-v2\n *   [*] --> Idle\n * ```\n ";
        assert_eq!(
            bodies(text, Leader::Star),
            vec![" * stateDiagram-v2\n *   [*] --> Idle".to_owned()]
        );
    }

    #[test]
    fn test_prefix_leader() {
        let text = "/// Flow:\n///\n/// ```mermaid\n/// graph TD\n///   A --> B\n/// ```";
        assert_eq!(
            bodies(text, Leader::Prefix("///")),
            vec!["/// graph TD\n///   A --> B".to_owned()]
        );
    }

    #[test]
    fn test_closing_fence_on_last_line_without_newline() {
        let text = "```mermaid\ngraph TD\n```";
        assert_eq!(bodies(text, Leader::None), vec!["graph TD".to_owned()]);
    }

    #[test]
    fn test_restartable() {
        let text = "```mermaid\ngraph TD\n```\n```mermaid\ngraph LR\n```\n";
        assert_eq!(bodies(text, Leader::None), bodies(text, Leader::None));
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = DiagramKeywords::new(["plantuml", "mermaid"]);
        let text = "```plantuml\n@startuml\nA -> B\n@enduml\n```\n```dot\ndigraph {}\n```\n";
        let blocks: Vec<_> = extract_fences(text, Leader::None, &keywords).collect();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].info_string, "plantuml");
    }

    #[test]
    fn test_detect_opening_fence() {
        assert_eq!(detect_opening_fence("``inline``"), None);
        assert_eq!(detect_opening_fence("plain text"), None);
        assert_eq!(
            detect_opening_fence("\t~~~~ Mermaid"),
            Some(OpeningFence {
                fence_char: '~',
                len: 4,
                indent: 4,
                info: "mermaid".to_owned(),
            })
        );
    }
}

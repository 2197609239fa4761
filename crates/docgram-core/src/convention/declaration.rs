//! Single-line declaration heuristics.
//!
//! Conventions look at the line that follows a doc comment and decide which
//! symbol (if any) it declares. These are heuristics over one line of text,
//! not a grammar.

use std::sync::LazyLock;

use regex::Regex;

use crate::span::SymbolKind;

/// Symbol declared on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub kind: SymbolKind,
    pub name: String,
}

impl Declaration {
    fn new(kind: SymbolKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
        }
    }
}

/// Rust `impl` blocks, attributed to the implementing type.
static IMPL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:unsafe\s+)?impl\b(?:\s*<[^{]*?>)?\s+(?:[\w:]+(?:<[^{]*?>)?\s+for\s+)?(?:[\w]+::)*([A-Za-z_]\w*)",
    )
    .unwrap()
});

/// Keyword-introduced declarations, with any number of leading modifiers.
static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:(?:pub(?:\([^)]*\))?|export|default|public|private|protected|internal|static|abstract|final|sealed|open|override|async|unsafe|const|inline|virtual|data|inner|partial|readonly|declare|suspend|tailrec|operator|infix|fileprivate|mutating|case|extern(?:\s+"[^"]*")?)\s+)*(function\*?|fn|func|fun|def|class|struct|mod|interface|trait|enum|union|module|object|record|protocol|extension|namespace|type)\s+(?:\([^)]*\)\s*)?([A-Za-z_$][\w$]*)"#,
    )
    .unwrap()
});

/// `const name = (...) =>`, `let name = async function`, and friends.
static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
    )
    .unwrap()
});

/// Typed method and function signatures: `public int parse(String s) {`.
static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[\w$<>\[\],.*&:?]+\s+)*?([A-Za-z_$][\w$]*)\s*(?:<[^>()]*>)?\s*\(")
        .unwrap()
});

/// Words that look like calls in [`METHOD_RE`] but start statements.
const CONTROL_WORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "switch", "catch", "return", "new", "do", "sizeof",
    "typeof", "await", "throw", "delete", "match", "loop", "yield", "using", "lock", "with",
    "assert", "print", "println", "super", "this", "self",
];

/// Line-comment languages: (pattern, kind). The symbol name is capture 1.
static LINE_RUN_RES: LazyLock<Vec<(Regex, SymbolKind)>> = LazyLock::new(|| {
    [
        // Ruby, Elixir
        (r"^\s*def(?:p|macro)?\s+(?:self\.)?([\w?!]+=?)", SymbolKind::Function),
        (r"^\s*(?:class|module|defmodule)\s+([A-Z][\w:.]*)", SymbolKind::Class),
        // Lua
        (r"^\s*(?:local\s+)?function\s+([\w.:]+)", SymbolKind::Function),
        // Perl
        (r"^\s*sub\s+(\w+)", SymbolKind::Function),
        (r"^\s*package\s+([\w:]+)", SymbolKind::Class),
        // R
        (r"^\s*([\w.]+)\s*(?:<-|=)\s*function\b", SymbolKind::Function),
        // SQL
        (
            r"(?i)^\s*create\s+(?:or\s+replace\s+)?(?:function|procedure)\s+([\w.]+)",
            SymbolKind::Function,
        ),
        (
            r"(?i)^\s*create\s+(?:or\s+replace\s+)?(?:table|view)\s+([\w.]+)",
            SymbolKind::Class,
        ),
        // Haskell
        (r"^(?:data|newtype|class)\s+([A-Z][\w']*)", SymbolKind::Class),
        (r"^([a-z_][\w']*)\s*::", SymbolKind::Function),
        // Shell
        (r"^\s*function\s+([\w-]+)", SymbolKind::Function),
        (r"^\s*([\w-]+)\s*\(\)", SymbolKind::Function),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), kind))
    .collect()
});

fn keyword_kind(keyword: &str) -> SymbolKind {
    match keyword {
        "function" | "function*" | "fn" | "func" | "fun" | "def" => SymbolKind::Function,
        _ => SymbolKind::Class,
    }
}

/// Parse a declaration in a brace-delimited language.
pub(crate) fn parse_c_style(line: &str) -> Option<Declaration> {
    if let Some(caps) = IMPL_RE.captures(line) {
        return Some(Declaration::new(SymbolKind::Class, &caps[1]));
    }
    if let Some(caps) = KEYWORD_RE.captures(line) {
        return Some(Declaration::new(keyword_kind(&caps[1]), &caps[2]));
    }
    if let Some(caps) = ARROW_RE.captures(line) {
        return Some(Declaration::new(SymbolKind::Function, &caps[1]));
    }
    parse_method(line)
}

fn parse_method(line: &str) -> Option<Declaration> {
    let first_word = line
        .trim_start()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    if CONTROL_WORDS.contains(&first_word) {
        return None;
    }

    let caps = METHOD_RE.captures(line)?;
    let name = caps.get(1)?;
    if CONTROL_WORDS.contains(&name.as_str()) {
        return None;
    }
    // Calls and prototypes end in `;` before any body opens
    let signature = line[name.end()..].split('{').next().unwrap_or_default();
    if signature.contains(';') {
        return None;
    }
    Some(Declaration::new(SymbolKind::Function, name.as_str()))
}

/// Parse a declaration in a line-comment language.
pub(crate) fn parse_line_run(line: &str) -> Option<Declaration> {
    LINE_RUN_RES.iter().find_map(|(re, kind)| {
        re.captures(line)
            .map(|caps| Declaration::new(*kind, &caps[1]))
    })
}

/// Lines between a doc comment and its declaration that do not break the
/// attachment: attributes, annotations, decorators and templates.
pub(crate) fn is_decoration(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("#[")
        || (trimmed.starts_with('@') && !trimmed.starts_with("@interface"))
        || trimmed.starts_with("template")
        || (trimmed.starts_with('[') && trimmed.trim_end().ends_with(']'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn c(line: &str) -> Option<(SymbolKind, String)> {
        parse_c_style(line).map(|d| (d.kind, d.name))
    }

    fn func(name: &str) -> Option<(SymbolKind, String)> {
        Some((SymbolKind::Function, name.to_owned()))
    }

    fn class(name: &str) -> Option<(SymbolKind, String)> {
        Some((SymbolKind::Class, name.to_owned()))
    }

    #[test]
    fn test_rust_declarations() {
        assert_eq!(c("pub fn parse(input: &str) -> Result<()> {"), func("parse"));
        assert_eq!(c("    pub(crate) async fn run(&self) {"), func("run"));
        assert_eq!(c("pub const fn new() -> Self {"), func("new"));
        assert_eq!(c("pub struct Parser<'a> {"), class("Parser"));
        assert_eq!(c("enum State {"), class("State"));
        assert_eq!(c("pub trait Render {"), class("Render"));
        assert_eq!(c("impl Parser {"), class("Parser"));
        assert_eq!(c("impl<'a> Iterator for Spans<'a> {"), class("Spans"));
        assert_eq!(c("impl fmt::Display for crate::Error {"), class("Error"));
        assert_eq!(c("mod tests {"), class("tests"));
        assert_eq!(c("pub(crate) mod convention;"), class("convention"));
        assert_eq!(c("let modulo = n % 2;"), None);
    }

    #[test]
    fn test_js_declarations() {
        assert_eq!(c("export default class App extends Component {"), class("App"));
        assert_eq!(c("export async function load(url) {"), func("load"));
        assert_eq!(c("function* walk(tree) {"), func("walk"));
        assert_eq!(c("const render = (node) => {"), func("render"));
        assert_eq!(c("export const handler = async (event: Event): Promise<void> => {"), func("handler"));
        assert_eq!(c("let double = x => x * 2;"), func("double"));
        assert_eq!(c("  render() {"), func("render"));
        assert_eq!(c("const config = {"), None);
    }

    #[test]
    fn test_jvm_and_c_declarations() {
        assert_eq!(c("public final class Lexer {"), class("Lexer"));
        assert_eq!(c("data class Point(val x: Int)"), class("Point"));
        assert_eq!(c("public static void main(String[] args) {"), func("main"));
        assert_eq!(c("    private List<Token> tokenize(String input) {"), func("tokenize"));
        assert_eq!(c("static int parse_header(const char *buf, size_t len)"), func("parse_header"));
        assert_eq!(c("func (p *Parser) Parse(src []byte) error {"), func("Parse"));
        assert_eq!(c("type Parser struct {"), class("Parser"));
    }

    #[test]
    fn test_statements_are_not_declarations() {
        assert_eq!(c("if (ready) {"), None);
        assert_eq!(c("} else if (x) {"), None);
        assert_eq!(c("return compute(x);"), None);
        assert_eq!(c("foo(bar);"), None);
        assert_eq!(c("int size() { return n; }"), func("size"));
        assert_eq!(c("x = foo(bar)"), None);
        assert_eq!(c("new Widget(opts)"), None);
        assert_eq!(c("use std::io;"), None);
    }

    #[test]
    fn test_line_run_declarations() {
        let lr = |line: &str| parse_line_run(line).map(|d| (d.kind, d.name));
        assert_eq!(lr("def render(io)"), func("render"));
        assert_eq!(lr("  def self.build"), func("build"));
        assert_eq!(lr("class Pipeline < Base"), class("Pipeline"));
        assert_eq!(lr("defmodule MyApp.Graph do"), class("MyApp.Graph"));
        assert_eq!(lr("local function step(state)"), func("step"));
        assert_eq!(lr("sub handler {"), func("handler"));
        assert_eq!(lr("plot_graph <- function(g) {"), func("plot_graph"));
        assert_eq!(lr("CREATE OR REPLACE FUNCTION audit_log()"), func("audit_log"));
        assert_eq!(lr("create table orders ("), class("orders"));
        assert_eq!(lr("render :: Graph -> String"), func("render"));
        assert_eq!(lr("deploy() {"), func("deploy"));
        assert_eq!(lr("key: value"), None);
    }

    #[test]
    fn test_is_decoration() {
        assert!(is_decoration("#[derive(Debug)]"));
        assert!(is_decoration("    @Override"));
        assert!(is_decoration("[Serializable]"));
        assert!(is_decoration("template <typename T>"));
        assert!(!is_decoration("@interface Marker {"));
        assert!(!is_decoration("fn main() {"));
    }
}

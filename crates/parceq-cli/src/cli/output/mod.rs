//! Rendering and JSON serialization for CLI output.

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use parceq::{Expression, ParseError, ParsedQuery, Term, TermId, Token};
use parceq_config::OutputFormat;
use serde::Serialize;

/// JSON output for a single token.
#[derive(Serialize)]
struct JsonToken<'a> {
    /// Token kind name, e.g. `WORD`.
    kind: &'static str,
    /// Unescaped token text.
    text: &'a str,
    /// Code point offset in the query.
    offset: usize,
    /// Lexeme length in code points.
    length: usize,
}

impl<'a> From<&'a Token> for JsonToken<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            kind: token.kind().name(),
            text: token.text(),
            offset: token.offset(),
            length: token.length(),
        }
    }
}

/// JSON output for a term.
#[derive(Serialize)]
struct JsonTerm<'a> {
    /// Allocator-issued id.
    id: TermId,
    /// Term text.
    value: &'a str,
    /// Field the term is restricted to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

impl<'a> From<&'a Term> for JsonTerm<'a> {
    fn from(term: &'a Term) -> Self {
        Self {
            id: term.id(),
            value: term.value(),
            field: term.field(),
        }
    }
}

/// JSON output for an expression node.
#[derive(Serialize)]
#[serde(untagged)]
enum JsonExpression<'a> {
    /// A run of terms.
    Terms {
        /// Terms in reading order.
        terms: Vec<JsonTerm<'a>>,
    },
    /// An operator over child expressions.
    Compound {
        /// Operator name, e.g. `AND`.
        operator: &'static str,
        /// Operands in order.
        children: Vec<Self>,
    },
}

impl<'a> From<&'a Expression> for JsonExpression<'a> {
    fn from(expr: &'a Expression) -> Self {
        match expr.as_terms() {
            Some(terms) => Self::Terms {
                terms: terms.iter().map(JsonTerm::from).collect(),
            },
            None => Self::Compound {
                operator: expr.operator().name(),
                children: expr.children().iter().map(Self::from).collect(),
            },
        }
    }
}

/// JSON output for `parceq parse`.
#[derive(Serialize)]
struct JsonParseOutput<'a> {
    /// The query text as given.
    query: &'a str,
    /// Number of term ids issued while parsing and shingling.
    terms_allocated: TermId,
    /// The normalized expression.
    expression: JsonExpression<'a>,
}

/// Renders tokens as a table.
pub fn token_table(tokens: &[Token]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Kind", "Text", "Offset", "Length"]);
    for token in tokens {
        table.add_row(vec![
            Cell::new(token.kind().name()),
            Cell::new(format!("{:?}", token.text())),
            Cell::new(token.offset()),
            Cell::new(token.length()),
        ]);
    }
    table
}

/// Renders tokens as a JSON array.
pub fn tokens_json(tokens: &[Token]) -> serde_json::Result<String> {
    let tokens: Vec<JsonToken<'_>> = tokens.iter().map(JsonToken::from).collect();
    serde_json::to_string_pretty(&tokens)
}

/// Renders a parsed query in the requested format.
pub fn render_query(
    text: &str,
    query: &ParsedQuery,
    format: OutputFormat,
) -> serde_json::Result<String> {
    let expression = query.expression();
    match format {
        OutputFormat::Tree => Ok(format!("{expression:#}").trim_end().to_string()),
        OutputFormat::Compact => Ok(expression.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonParseOutput {
            query: text,
            terms_allocated: query.allocator().allocated(),
            expression: JsonExpression::from(expression),
        }),
    }
}

/// Formats a parse error with a caret under the offending position and a hint.
///
/// Only the line of the query that holds the error offset is shown.
pub fn format_parse_error(text: &str, err: &ParseError) -> String {
    let (line, column) = line_at(text, err.offset());
    let caret = " ".repeat(column);
    format!(
        "error: {err}\n  {line}\n  {caret}^\nhint: {}",
        err.suggestion()
    )
}

/// Returns the line of `text` holding the code point at `offset`, and the offset's column
/// within that line.
fn line_at(text: &str, offset: usize) -> (&str, usize) {
    let mut line_start = 0;
    let mut column = 0;
    for (byte, ch) in text.char_indices().take(offset) {
        if ch == '\n' {
            line_start = byte + 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    let line = text[line_start..].lines().next().unwrap_or_default();
    (line, column)
}

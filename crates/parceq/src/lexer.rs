//! Query lexer (tokenizer).
//!
//! Converts query text into tokens for the parser. The same [`Lexer`] drives both entry points:
//! [`tokenize`] for strings and [`token_stream`] for byte streams, which yields tokens lazily
//! and ends with a single [`TokenKind::Eof`] token.
//!
//! # Lexical rules
//!
//! - Spaces (U+0020) outside quotes separate tokens; other whitespace is word content.
//! - `(`, `)`, `-` and `+` at the start of a token are operators.
//! - `"` at the start of a token opens a quoted phrase, closed by the next unescaped `"` or
//!   end of input.
//! - Anything else starts a word, which runs until a space, `(`, `)` or end of input.
//! - `AND`/`&&` and `OR`/`||` as whole unquoted words are infix operators.
//!
//! A backslash makes the following space, parenthesis or quote literal (and `-`/`+` at the
//! start of a token). Before any other character it is kept as-is. Inside quotes only `\"`
//! is an escape.

use std::{convert::Infallible, fmt, io::Read, iter::Fuse};

use crate::{error::ReadError, reader::Utf8Chars};

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A search word, quoted or not.
    Word,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `AND` or `&&`
    InfixAnd,
    /// `OR` or `||`
    InfixOr,
    /// `+` prefix: the following word is required.
    PrefixAnd,
    /// `-` prefix: the following word is excluded.
    PrefixAndNot,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns how tightly this token binds to the expression on its left.
    ///
    /// OR binds tighter than AND.
    pub fn binding_power(self) -> u8 {
        match self {
            Self::Word => 80,
            Self::PrefixAnd | Self::PrefixAndNot => 50,
            Self::InfixOr => 20,
            Self::InfixAnd => 10,
            Self::LeftParen | Self::RightParen | Self::Eof => 0,
        }
    }

    /// Returns the upper-case name of this kind, e.g. `PREFIX_ANDNOT`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Word => "WORD",
            Self::LeftParen => "LPAREN",
            Self::RightParen => "RPAREN",
            Self::InfixAnd => "INFIX_AND",
            Self::InfixOr => "INFIX_OR",
            Self::PrefixAnd => "PREFIX_AND",
            Self::PrefixAndNot => "PREFIX_ANDNOT",
            Self::Eof => "EOF",
        }
    }

    /// Classifies a finished unquoted word.
    fn classify(word: &str) -> Self {
        match word {
            "AND" | "&&" => Self::InfixAnd,
            "OR" | "||" => Self::InfixOr,
            _ => Self::Word,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Token kind.
    kind: TokenKind,
    /// Unescaped text (word content, or the operator as written).
    text: String,
    /// Offset of the first code point of the lexeme.
    offset: usize,
    /// Length of the lexeme in code points, including quotes and escapes.
    length: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
            length,
        }
    }

    /// Returns the token kind.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the token text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the code point offset of the lexeme in the input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the lexeme length in code points.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the binding power of this token's kind.
    pub fn binding_power(&self) -> u8 {
        self.kind.binding_power()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})@{}", self.kind, self.text, self.offset)
    }
}

/// Streaming lexer over a fallible sequence of code points.
///
/// Yields tokens followed by one [`TokenKind::Eof`] token. A source error is yielded once and
/// ends the sequence.
pub struct Lexer<I> {
    /// Code point source.
    chars: Fuse<I>,
    /// One code point of lookahead, filled by [`Lexer::peek`].
    peeked: Option<char>,
    /// Number of code points consumed so far.
    position: usize,
    /// Set once EOF or an error has been yielded.
    finished: bool,
}

/// Lexer over a UTF-8 byte stream.
pub type TokenStream<R> = Lexer<Utf8Chars<R>>;

impl<I, E> Lexer<I>
where
    I: Iterator<Item = Result<char, E>>,
{
    /// Creates a lexer over a code point source.
    pub fn new(chars: I) -> Self {
        Self {
            chars: chars.fuse(),
            peeked: None,
            position: 0,
            finished: false,
        }
    }

    /// Returns the next code point without consuming it.
    fn peek(&mut self) -> Result<Option<char>, E> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next().transpose()?;
        }
        Ok(self.peeked)
    }

    /// Consumes the code point returned by the last [`Lexer::peek`].
    fn bump(&mut self) {
        if self.peeked.take().is_some() {
            self.position += 1;
        }
    }

    /// Reads the next token, returning [`TokenKind::Eof`] at end of input.
    fn next_token(&mut self) -> Result<Token, E> {
        loop {
            let start = self.position;
            let Some(ch) = self.peek()? else {
                return Ok(Token::new(TokenKind::Eof, "", start, 0));
            };

            let kind = match ch {
                ' ' => {
                    self.bump();
                    continue;
                }
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '-' => TokenKind::PrefixAndNot,
                '+' => TokenKind::PrefixAnd,
                '"' => {
                    self.bump();
                    match self.read_quoted(start)? {
                        Some(token) => return Ok(token),
                        // Empty phrase
                        None => continue,
                    }
                }
                '\\' => {
                    self.bump();
                    let mut word = String::new();
                    match self.peek()? {
                        Some(c @ (' ' | '(' | ')' | '"' | '-' | '+')) => {
                            self.bump();
                            word.push(c);
                        }
                        _ => self.read_escape_tail(&mut word)?,
                    }
                    return self.read_word(word, start);
                }
                _ => return self.read_word(String::new(), start),
            };

            self.bump();
            return Ok(Token::new(kind, ch, start, 1));
        }
    }

    /// Handles a backslash followed by a character with no special escape meaning.
    ///
    /// `\\` keeps both backslashes and consumes the escape; before anything else (or end of
    /// input) the backslash is kept and the next character is read normally.
    fn read_escape_tail(&mut self, word: &mut String) -> Result<(), E> {
        if self.peek()? == Some('\\') {
            self.bump();
            word.push_str("\\\\");
        } else {
            word.push('\\');
        }
        Ok(())
    }

    /// Reads the rest of an unquoted word.
    fn read_word(&mut self, mut word: String, start: usize) -> Result<Token, E> {
        while let Some(ch) = self.peek()? {
            match ch {
                ' ' | '(' | ')' => break,
                '\\' => {
                    self.bump();
                    match self.peek()? {
                        Some(c @ (' ' | '(' | ')' | '"')) => {
                            self.bump();
                            word.push(c);
                        }
                        _ => self.read_escape_tail(&mut word)?,
                    }
                }
                _ => {
                    self.bump();
                    word.push(ch);
                }
            }
        }

        let kind = TokenKind::classify(&word);
        Ok(Token::new(kind, word, start, self.position - start))
    }

    /// Reads a quoted phrase whose opening quote has been consumed.
    ///
    /// Returns `None` for an empty phrase. A phrase left open at end of input is closed
    /// implicitly.
    fn read_quoted(&mut self, start: usize) -> Result<Option<Token>, E> {
        let mut content = String::new();

        while let Some(ch) = self.peek()? {
            self.bump();
            match ch {
                '"' => break,
                '\\' => {
                    if self.peek()? == Some('"') {
                        self.bump();
                        content.push('"');
                    } else {
                        self.read_escape_tail(&mut content)?;
                    }
                }
                _ => content.push(ch),
            }
        }

        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(Token::new(
            TokenKind::Word,
            content,
            start,
            self.position - start,
        )))
    }
}

impl<I, E> Iterator for Lexer<I>
where
    I: Iterator<Item = Result<char, E>>,
{
    type Item = Result<Token, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(token) => {
                log::trace!("token {token}");
                self.finished = token.kind == TokenKind::Eof;
            }
            Err(_) => self.finished = true,
        }
        Some(result)
    }
}

/// Tokenizes a query string.
///
/// The trailing EOF token is not included, so empty and space-only input yield no tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let tokens: Vec<Token> = Lexer::new(input.chars().map(Ok::<char, Infallible>))
        .map(|token| match token {
            Ok(token) => token,
            Err(never) => match never {},
        })
        .filter(|token| token.kind != TokenKind::Eof)
        .collect();
    log::debug!(
        "tokenized {} code points into {} tokens",
        input.chars().count(),
        tokens.len()
    );
    tokens
}

/// Creates a lazy token stream over a reader.
///
/// The stream yields `Ok` tokens ending with one [`TokenKind::Eof`] token. A read failure is
/// yielded as an error and ends the stream.
pub fn token_stream<R: Read>(reader: R) -> TokenStream<R> {
    Lexer::new(Utf8Chars::new(reader))
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use TokenKind::{LeftParen, PrefixAnd, PrefixAndNot, RightParen};

    fn word(text: &str) -> (TokenKind, String) {
        (TokenKind::Word, text.to_string())
    }

    fn op(kind: TokenKind) -> (TokenKind, String) {
        let text = match kind {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::PrefixAnd => "+",
            TokenKind::PrefixAndNot => "-",
            _ => unreachable!("op() is for single-character tokens"),
        };
        (kind, text.to_string())
    }

    fn kinds_and_text(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .into_iter()
            .map(|t| (t.kind(), t.text().to_string()))
            .collect()
    }

    /// Asserts the token sequence and that the stream form agrees with it.
    fn assert_tokens(input: &str, expected: &[(TokenKind, String)]) {
        assert_eq!(kinds_and_text(input), expected, "tokenize({input:?})");

        let streamed: Vec<Token> = token_stream(input.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        let (last, rest) = streamed.split_last().unwrap();
        assert_eq!(last.kind(), TokenKind::Eof);
        assert_eq!(rest, tokenize(input).as_slice(), "token_stream({input:?})");
    }

    #[test]
    fn empty_and_space_only_have_no_tokens() {
        assert_tokens("", &[]);
        assert_tokens(" ", &[]);
        assert_tokens("  ", &[]);
    }

    #[test]
    fn single_word() {
        assert_tokens("foo", &[word("foo")]);
    }

    #[test]
    fn only_space_separates() {
        assert_tokens("\n", &[word("\n")]);
        assert_tokens(" \n ", &[word("\n")]);
        assert_tokens("\n a", &[word("\n"), word("a")]);
        assert_tokens("\n abc ", &[word("\n"), word("abc")]);
        assert_tokens("a\tb", &[word("a\tb")]);
    }

    #[test]
    fn escaping_regular_characters_has_no_effect() {
        assert_tokens("\\abc", &[word("\\abc")]);
        assert_tokens("\\\\abc", &[word("\\\\abc")]);
        assert_tokens("a\\bc", &[word("a\\bc")]);
        assert_tokens("ab\\\\c", &[word("ab\\\\c")]);
        assert_tokens("ab\\\\\\c", &[word("ab\\\\\\c")]);
        assert_tokens("abc\\", &[word("abc\\")]);
        assert_tokens("abc\\\\", &[word("abc\\\\")]);
        assert_tokens("\\", &[word("\\")]);
    }

    #[test]
    fn parentheses() {
        assert_tokens("(", &[op(LeftParen)]);
        assert_tokens(")", &[op(RightParen)]);
        assert_tokens("a(", &[word("a"), op(LeftParen)]);
        assert_tokens("a))", &[word("a"), op(RightParen), op(RightParen)]);
        assert_tokens(
            "a)(b",
            &[word("a"), op(RightParen), op(LeftParen), word("b")],
        );
        assert_tokens(
            "a ( ) b",
            &[word("a"), op(LeftParen), op(RightParen), word("b")],
        );
        assert_tokens(
            "a ( b) c",
            &[
                word("a"),
                op(LeftParen),
                word("b"),
                op(RightParen),
                word("c"),
            ],
        );
    }

    #[test]
    fn prefix_operators() {
        assert_tokens("+", &[op(PrefixAnd)]);
        assert_tokens("-", &[op(PrefixAndNot)]);
        assert_tokens("+-", &[op(PrefixAnd), op(PrefixAndNot)]);
        assert_tokens("-foo", &[op(PrefixAndNot), word("foo")]);
        assert_tokens("+abc", &[op(PrefixAnd), word("abc")]);
        assert_tokens("+foo-bar", &[op(PrefixAnd), word("foo-bar")]);
        assert_tokens(
            "+foo -bar",
            &[op(PrefixAnd), word("foo"), op(PrefixAndNot), word("bar")],
        );
        assert_tokens(
            "+foo -+bar",
            &[
                op(PrefixAnd),
                word("foo"),
                op(PrefixAndNot),
                op(PrefixAnd),
                word("bar"),
            ],
        );
    }

    #[test]
    fn infix_operators() {
        assert_tokens("AND", &[(TokenKind::InfixAnd, "AND".into())]);
        assert_tokens("&&", &[(TokenKind::InfixAnd, "&&".into())]);
        assert_tokens("OR", &[(TokenKind::InfixOr, "OR".into())]);
        assert_tokens("||", &[(TokenKind::InfixOr, "||".into())]);
        assert_tokens("&&&", &[word("&&&")]);
        assert_tokens("or", &[word("or")]);
        assert_tokens("\"AND\"", &[word("AND")]);
    }

    #[test]
    fn quoted_phrases() {
        assert_tokens("\"foo\"", &[word("foo")]);
        assert_tokens("\"foo bar\"", &[word("foo bar")]);
        assert_tokens("\"foo bar\"\"baz\"", &[word("foo bar"), word("baz")]);
        assert_tokens("\"foo bar \" \"baz\"", &[word("foo bar "), word("baz")]);
        assert_tokens(
            "-\"foo bar\"+baz",
            &[
                op(PrefixAndNot),
                word("foo bar"),
                op(PrefixAnd),
                word("baz"),
            ],
        );
        assert_tokens("\"(a) -b\"", &[word("(a) -b")]);
    }

    #[test]
    fn quoting_is_lenient() {
        assert_tokens("\"foo", &[word("foo")]);
        assert_tokens("foo \"", &[word("foo")]);
        assert_tokens("\"\"", &[]);
        assert_tokens("a \"\" b", &[word("a"), word("b")]);
    }

    #[test]
    fn quote_inside_word_is_literal() {
        assert_tokens("foo\"bar", &[word("foo\"bar")]);
    }

    #[test]
    fn escapes_quotes() {
        assert_tokens("\\\"foo bar", &[word("\"foo"), word("bar")]);
        assert_tokens("\"foo\\\" bar", &[word("foo\" bar")]);
        assert_tokens("foo \"bar\\baz", &[word("foo"), word("bar\\baz")]);
        assert_tokens("foo \"bar\\\\baz", &[word("foo"), word("bar\\\\baz")]);
        assert_tokens("\"foo\\", &[word("foo\\")]);
    }

    #[test]
    fn double_backslash_consumes_the_escape() {
        assert_tokens("\"a\\\\\"b c\"", &[word("a\\\\"), word("b"), word("c\"")]);
        assert_tokens("a\\\\ b", &[word("a\\\\"), word("b")]);
        assert_tokens("\\\\ b", &[word("\\\\"), word("b")]);
    }

    #[test]
    fn escapes_operators() {
        assert_tokens("\\-foo", &[word("-foo")]);
        assert_tokens("\\-+foo", &[word("-+foo")]);
        assert_tokens("foo \\(bar", &[word("foo"), word("(bar")]);
        assert_tokens("foo\\)", &[word("foo)")]);
        assert_tokens("a\\-b", &[word("a\\-b")]);
    }

    #[test]
    fn escapes_space() {
        assert_tokens("foo\\ bar", &[word("foo bar")]);
        assert_tokens("\\ foo", &[word(" foo")]);
    }

    #[test]
    fn handles_utf8() {
        assert_tokens("føø bær", &[word("føø"), word("bær")]);
    }

    #[test]
    fn offsets_and_lengths_count_code_points() {
        let tokens = tokenize("føø -\"b r\" \\(x");
        let spans: Vec<(usize, usize)> = tokens.iter().map(|t| (t.offset(), t.length())).collect();
        assert_eq!(spans, vec![(0, 3), (4, 1), (5, 5), (11, 3)]);
    }

    #[test]
    fn stream_ends_with_single_eof() {
        let tokens: Vec<Token> = token_stream("foo ".as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::new(TokenKind::Eof, "", 4, 0));
    }

    #[test]
    fn binding_powers() {
        assert_eq!(TokenKind::Word.binding_power(), 80);
        assert_eq!(TokenKind::PrefixAnd.binding_power(), 50);
        assert_eq!(TokenKind::PrefixAndNot.binding_power(), 50);
        assert_eq!(TokenKind::InfixOr.binding_power(), 20);
        assert_eq!(TokenKind::InfixAnd.binding_power(), 10);
        assert_eq!(TokenKind::LeftParen.binding_power(), 0);
        assert_eq!(TokenKind::Eof.binding_power(), 0);
    }

    /// Reader that yields some bytes and then fails.
    struct FailingReader {
        /// Bytes served before the failure.
        data: &'static [u8],
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("connection reset"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_failure_ends_the_stream() {
        let results: Vec<Result<Token, ReadError>> =
            token_stream(FailingReader { data: b"foo bar" }).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().text(), "foo");
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.io_error().to_string(), "connection reset");
    }

    #[test]
    fn stream_is_lazy() {
        let mut stream = token_stream(FailingReader { data: b"foo bar" });
        let first = stream.next().unwrap().unwrap();
        assert_eq!(first.text(), "foo");
    }

    #[test]
    fn display_uses_kind_names() {
        let tokens = tokenize("-\"a b\"");
        assert_eq!(tokens[0].to_string(), "PREFIX_ANDNOT(\"-\")@0");
        assert_eq!(tokens[1].to_string(), "WORD(\"a b\")@1");
    }
}

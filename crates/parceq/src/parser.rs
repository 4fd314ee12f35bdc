//! Query parser.
//!
//! A Pratt (top-down operator precedence) parser over the lexer's tokens. Each token kind has
//! a binding power; an expression keeps absorbing following tokens while they bind tighter
//! than the operator that started it.
//!
//! # Binding powers (highest to lowest)
//!
//! 1. Words (80): adjacent words join into one term run
//! 2. Prefix `+` / `-` (50)
//! 3. Infix `OR` / `||` (20)
//! 4. Infix `AND` / `&&` (10)
//!
//! OR binds tighter than AND, so `a OR b AND c` is `(a OR b) AND c`.
//!
//! # Prefix operators
//!
//! `+x rest` and `-x rest` take an argument (the next word, or a nested prefix operator) and
//! the rest of the query at prefix binding power. The result is `x AND wrap(rest)`, or
//! `NOT(x) AND wrap(rest)`, where everything parsed before the operator is folded into `rest`.
//!
//! Parentheses are tokenized but grouping is not implemented: `(` is rejected with
//! [`ParseError::UnsupportedConstruct`], and a stray `)` is skipped.

use crate::{
    error::{Construct, ParseError},
    expression::{Expression, Operator},
    lexer::{Token, TokenKind},
    term::TermAllocator,
};

/// Pratt parser over a token sequence.
struct Parser<'a> {
    /// Token sequence, always ending with an EOF token.
    tokens: Vec<Token>,
    /// Index of the current token.
    position: usize,
    /// Allocator for the terms of this parse.
    allocator: &'a mut TermAllocator,
}

impl<'a> Parser<'a> {
    /// Creates a parser, appending an EOF token if the sequence lacks one.
    fn new(tokens: impl IntoIterator<Item = Token>, allocator: &'a mut TermAllocator) -> Self {
        let mut tokens: Vec<Token> = tokens.into_iter().collect();
        if tokens.last().is_none_or(|t| t.kind() != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.offset() + t.length());
            tokens.push(Token::new(TokenKind::Eof, "", end, 0));
        }
        Self {
            tokens,
            position: 0,
            allocator,
        }
    }

    /// Parses the whole token sequence.
    fn parse(mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_expression(0)?;

        loop {
            let token = self.peek();
            match token.kind() {
                TokenKind::RightParen => {
                    log::debug!("skipping unmatched ')' at offset {}", token.offset());
                    self.advance();
                    let rest = self.parse_expression(0)?;
                    expr = expr.extend(rest);
                }
                TokenKind::LeftParen => return Err(self.unsupported_grouping()),
                _ => break,
            }
        }

        Ok(expr.wrap())
    }

    /// Parses an expression whose tokens bind tighter than `min_bp`.
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expression, ParseError> {
        let token = self.next_token();
        let mut left = self.null_denotation(&token)?;

        while self.peek().binding_power() > min_bp {
            let token = self.next_token();
            left = self.left_denotation(left, &token)?;
        }

        Ok(left)
    }

    /// Handles a token at the start of an expression.
    fn null_denotation(&mut self, token: &Token) -> Result<Expression, ParseError> {
        match token.kind() {
            TokenKind::Word => Ok(self.term(token)),
            TokenKind::PrefixAnd | TokenKind::PrefixAndNot => self.prefix_chain(token),
            TokenKind::LeftParen => Err(ParseError::UnsupportedConstruct {
                construct: Construct::Grouping,
                offset: token.offset(),
            }),
            TokenKind::RightParen | TokenKind::InfixAnd | TokenKind::InfixOr | TokenKind::Eof => {
                Ok(Expression::noop())
            }
        }
    }

    /// Handles a token following the already-parsed expression `left`.
    fn left_denotation(&mut self, left: Expression, token: &Token) -> Result<Expression, ParseError> {
        match token.kind() {
            TokenKind::Word => {
                let term = self.allocator.create_root_term(token.text());
                Ok(left.append_term(term))
            }
            TokenKind::InfixAnd => {
                let right = self.parse_expression(token.binding_power())?;
                Ok(if right.is_noop() { left } else { left.and(right) })
            }
            TokenKind::InfixOr => {
                let right = self.parse_expression(token.binding_power())?;
                Ok(if right.is_noop() { left } else { left.or(right) })
            }
            TokenKind::PrefixAnd | TokenKind::PrefixAndNot => {
                let arg = self.parse_prefix_arg()?;
                let rest = left.extend(self.parse_expression(token.binding_power())?);
                Ok(Self::apply_prefix(token.kind(), arg, rest))
            }
            // Zero binding power: never reached from the parse loop.
            TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Eof => Ok(left),
        }
    }

    /// Parses a run of prefix operators that starts an expression.
    ///
    /// Each operator takes its argument and the rest of the query, so `-a +b rest` is
    /// `NOT(a) AND wrap(b AND wrap(rest))`. AND flattening turns that into the single
    /// conjunction `AND(NOT(a), b, ...)`, which is built here directly: the arguments are
    /// collected in a loop and `rest` is parsed once, after the last operator of the run.
    fn prefix_chain(&mut self, first: &Token) -> Result<Expression, ParseError> {
        let mut args = Vec::new();
        let mut operator = first.clone();
        loop {
            if let Some(arg) = self.parse_prefix_arg()? {
                args.push(Self::signed(operator.kind(), arg));
            }
            if !is_prefix(self.peek().kind()) {
                break;
            }
            operator = self.next_token();
        }

        let rest = self.parse_expression(operator.binding_power())?;
        if args.is_empty() {
            return Ok(rest);
        }
        Ok(Expression::compound(Operator::And, args).and(rest.wrap()))
    }

    /// Parses the argument of a prefix operator.
    ///
    /// Nested prefix operators collapse: `+` passes its argument through and `-` negates it,
    /// so pairs of `-` cancel. Returns `None` when no word follows.
    fn parse_prefix_arg(&mut self) -> Result<Option<Expression>, ParseError> {
        let mut negated = false;
        loop {
            let token = self.next_token();
            match token.kind() {
                TokenKind::Word => {
                    let arg = self.term(&token);
                    return Ok(Some(if negated { arg.not() } else { arg }));
                }
                TokenKind::PrefixAnd => {}
                TokenKind::PrefixAndNot => negated = !negated,
                TokenKind::LeftParen => {
                    return Err(ParseError::UnsupportedConstruct {
                        construct: Construct::Grouping,
                        offset: token.offset(),
                    });
                }
                TokenKind::RightParen
                | TokenKind::InfixAnd
                | TokenKind::InfixOr
                | TokenKind::Eof => return Ok(None),
            }
        }
    }

    /// Applies a prefix operator's sign to its argument.
    fn signed(kind: TokenKind, arg: Expression) -> Expression {
        if kind == TokenKind::PrefixAndNot {
            arg.not()
        } else {
            arg
        }
    }

    /// Combines a prefix operator's argument with the rest of the query.
    fn apply_prefix(kind: TokenKind, arg: Option<Expression>, rest: Expression) -> Expression {
        match arg {
            Some(arg) => Self::signed(kind, arg).and(rest.wrap()),
            None => rest,
        }
    }

    /// Allocates a term for a word token.
    fn term(&mut self, token: &Token) -> Expression {
        Expression::term(self.allocator.create_root_term(token.text()))
    }

    /// Builds the error for a `(` at the current position.
    fn unsupported_grouping(&self) -> ParseError {
        ParseError::UnsupportedConstruct {
            construct: Construct::Grouping,
            offset: self.peek().offset(),
        }
    }

    /// Returns the current token.
    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    /// Returns the current token and advances, stopping at EOF.
    fn next_token(&mut self) -> Token {
        let token = self.peek().clone();
        self.advance();
        token
    }

    /// Advances to the next token, never past the trailing EOF.
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Returns true for `+` and `-`.
fn is_prefix(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::PrefixAnd | TokenKind::PrefixAndNot)
}

/// Parses a token sequence into a normalized expression, allocating terms from `allocator`.
///
/// A trailing EOF token is optional. The top-level result is wrapped with
/// [`Expression::wrap`], so a bare term run comes back boosted. An empty sequence yields the
/// no-op expression. The only error is [`ParseError::UnsupportedConstruct`] for `(`.
pub fn parse(
    tokens: impl IntoIterator<Item = Token>,
    allocator: &mut TermAllocator,
) -> Result<Expression, ParseError> {
    let expr = Parser::new(tokens, allocator).parse()?;
    log::debug!("parsed expression {expr}");
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::tokenize, term::Term};

    fn word(text: &str) -> Token {
        Token::new(TokenKind::Word, text, 0, text.chars().count())
    }

    fn op(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 0, text.len())
    }

    fn plus() -> Token {
        op(TokenKind::PrefixAnd, "+")
    }

    fn minus() -> Token {
        op(TokenKind::PrefixAndNot, "-")
    }

    fn parse_tokens(tokens: Vec<Token>) -> Expression {
        parse(tokens, &mut TermAllocator::new()).unwrap()
    }

    fn parse_str(input: &str) -> Result<Expression, ParseError> {
        parse(tokenize(input), &mut TermAllocator::new())
    }

    fn terms(terms: &[(u32, &str)]) -> Expression {
        Expression::terms(terms.iter().map(|(id, v)| Term::new(*id, *v)).collect())
    }

    fn term(id: u32, value: &str) -> Expression {
        terms(&[(id, value)])
    }

    /// Builds a compound without flattening, so tests state the exact expected shape.
    fn node(operator: Operator, children: Vec<Expression>) -> Expression {
        Expression::compound(operator, children)
    }

    fn and(children: Vec<Expression>) -> Expression {
        node(Operator::And, children)
    }

    fn or(children: Vec<Expression>) -> Expression {
        node(Operator::Or, children)
    }

    fn not(child: Expression) -> Expression {
        node(Operator::Not, vec![child])
    }

    fn boost(children: Vec<Expression>) -> Expression {
        node(Operator::Boost, children)
    }

    #[test]
    fn empty_input_is_noop() {
        assert!(parse_tokens(vec![]).is_noop());
        assert!(parse_str("").unwrap().is_noop());
        assert!(parse_str("   ").unwrap().is_noop());
    }

    #[test]
    fn single_term_is_boosted() {
        assert_eq!(
            parse_tokens(vec![word("foo")]),
            boost(vec![term(0, "foo")])
        );
    }

    #[test]
    fn adjacent_terms_form_one_run() {
        assert_eq!(
            parse_tokens(vec![word("foo"), word("bar")]),
            boost(vec![terms(&[(0, "foo"), (1, "bar")])])
        );
    }

    #[test]
    fn explicit_eof_is_accepted() {
        let eof = Token::new(TokenKind::Eof, "", 3, 0);
        assert_eq!(
            parse_tokens(vec![word("foo"), eof]),
            boost(vec![term(0, "foo")])
        );
    }

    #[test]
    fn prefix_and() {
        assert_eq!(
            parse_tokens(vec![word("foo"), word("bar"), plus(), word("baz")]),
            and(vec![
                term(2, "baz"),
                boost(vec![terms(&[(0, "foo"), (1, "bar")])])
            ])
        );
    }

    #[test]
    fn prefix_andnot() {
        assert_eq!(
            parse_tokens(vec![word("foo"), minus(), word("bar"), word("baz")]),
            and(vec![
                not(term(1, "bar")),
                boost(vec![term(0, "foo"), term(2, "baz")])
            ])
        );
    }

    #[test]
    fn prefix_andnot_initially() {
        assert_eq!(
            parse_tokens(vec![minus(), word("foo"), word("bar"), word("baz")]),
            and(vec![
                not(term(0, "foo")),
                boost(vec![terms(&[(1, "bar"), (2, "baz")])])
            ])
        );
    }

    #[test]
    fn multiple_prefix_operators() {
        assert_eq!(
            parse_tokens(vec![minus(), word("foo"), word("bar"), plus(), word("baz")]),
            and(vec![
                term(2, "baz"),
                not(term(0, "foo")),
                boost(vec![term(1, "bar")])
            ])
        );
    }

    #[test]
    fn successive_prefix_operators_collapse() {
        assert_eq!(
            parse_tokens(vec![word("foo"), plus(), minus(), word("bar")]),
            and(vec![not(term(1, "bar")), boost(vec![term(0, "foo")])])
        );
        assert_eq!(
            parse_tokens(vec![word("foo"), minus(), plus(), word("bar"), word("baz")]),
            and(vec![
                not(term(1, "bar")),
                boost(vec![term(0, "foo"), term(2, "baz")])
            ])
        );
    }

    #[test]
    fn negations_cancel_in_pairs() {
        assert_eq!(
            parse_tokens(vec![plus(), minus(), plus(), minus(), minus(), word("bar")]),
            and(vec![not(term(0, "bar"))])
        );
        assert_eq!(
            parse_tokens(vec![minus(), minus(), word("bar")]),
            and(vec![term(0, "bar")])
        );
    }

    #[test]
    fn long_operator_run_is_one_argument() {
        let input = format!("{}foo", "-".repeat(200_001));
        assert_eq!(parse_str(&input).unwrap(), and(vec![not(term(0, "foo"))]));

        let input = format!("{}foo bar", "+-".repeat(100_000));
        assert_eq!(
            parse_str(&input).unwrap(),
            and(vec![term(0, "foo"), boost(vec![term(1, "bar")])])
        );
    }

    #[test]
    fn long_prefix_chain_is_one_conjunction() {
        let input = "-x ".repeat(200_000);
        let expr = parse_str(&input).unwrap();
        assert_eq!(expr.operator(), Operator::And);
        assert_eq!(expr.children().len(), 200_000);
        assert!(expr.children().iter().all(|c| c.operator() == Operator::Not));

        let input = format!("{}tail", "+a -b ".repeat(100_000));
        let expr = parse_str(&input).unwrap();
        assert_eq!(expr.children().len(), 200_001);
        assert_eq!(expr.children()[0], term(0, "a"));
        assert_eq!(expr.children()[1], not(term(1, "b")));
        assert_eq!(expr.children()[200_000], boost(vec![term(200_000, "tail")]));
    }

    #[test]
    fn prefix_chain_matches_nested_form() {
        // `-a +b -c d` is `NOT(a) AND wrap(b AND wrap(NOT(c) AND wrap(d)))`.
        let inner = not(term(2, "c")).and(term(3, "d").wrap());
        let middle = term(1, "b").and(inner.wrap());
        let nested = not(term(0, "a")).and(middle.wrap());
        assert_eq!(parse_str("-a +b -c d").unwrap(), nested);
        assert_eq!(
            parse_str("-a + -c d").unwrap(),
            and(vec![
                not(term(0, "a")),
                not(term(1, "c")),
                boost(vec![term(2, "d")])
            ])
        );
    }

    #[test]
    fn long_word_run_stays_one_run() {
        let input = "w ".repeat(200_000);
        let expr = parse_str(&input).unwrap();
        assert_eq!(expr.operator(), Operator::Boost);
        let run = expr.children()[0].as_terms().unwrap();
        assert_eq!(run.len(), 200_000);
        assert_eq!(run[199_999].id(), 199_999);
    }

    #[test]
    fn dangling_prefix_operator_is_ignored() {
        assert_eq!(
            parse_tokens(vec![word("foo"), plus()]),
            boost(vec![term(0, "foo")])
        );
        assert!(parse_tokens(vec![minus()]).is_noop());
    }

    #[test]
    fn infix_and_does_not_boost_arguments() {
        assert_eq!(
            parse_tokens(vec![
                word("foo"),
                op(TokenKind::InfixAnd, "&&"),
                word("bar"),
                word("baz")
            ]),
            and(vec![term(0, "foo"), terms(&[(1, "bar"), (2, "baz")])])
        );
    }

    #[test]
    fn infix_or_is_distinct_from_adjacency() {
        assert_eq!(
            parse_tokens(vec![
                word("foo"),
                op(TokenKind::InfixOr, "||"),
                word("bar"),
                word("baz")
            ]),
            or(vec![term(0, "foo"), terms(&[(1, "bar"), (2, "baz")])])
        );
    }

    #[test]
    fn infix_or_binds_tighter_than_and() {
        assert_eq!(
            parse_tokens(vec![
                word("foo"),
                op(TokenKind::InfixOr, "||"),
                word("bar"),
                op(TokenKind::InfixAnd, "&&"),
                word("baz"),
                op(TokenKind::InfixOr, "||"),
                word("qux"),
            ]),
            and(vec![
                or(vec![term(0, "foo"), term(1, "bar")]),
                or(vec![term(2, "baz"), term(3, "qux")])
            ])
        );
        assert_eq!(
            parse_str("foo OR bar AND baz").unwrap(),
            and(vec![or(vec![term(0, "foo"), term(1, "bar")]), term(2, "baz")])
        );
    }

    #[test]
    fn chained_infix_operators_flatten() {
        assert_eq!(
            parse_str("a OR b OR c").unwrap(),
            or(vec![term(0, "a"), term(1, "b"), term(2, "c")])
        );
        assert_eq!(
            parse_str("a AND b AND c").unwrap(),
            and(vec![term(0, "a"), term(1, "b"), term(2, "c")])
        );
    }

    #[test]
    fn dangling_infix_operators_are_lenient() {
        assert_eq!(parse_str("foo AND").unwrap(), boost(vec![term(0, "foo")]));
        assert_eq!(parse_str("foo OR").unwrap(), boost(vec![term(0, "foo")]));
        assert_eq!(
            parse_str("AND foo").unwrap(),
            boost(vec![term(0, "foo")])
        );
    }

    #[test]
    fn prefix_binds_tighter_than_or() {
        assert_eq!(
            parse_str("a OR b +c").unwrap(),
            or(vec![
                term(0, "a"),
                and(vec![term(2, "c"), boost(vec![term(1, "b")])])
            ])
        );
    }

    #[test]
    fn prefix_after_and_extends_it() {
        // The conjunction built by `-a b` absorbs the new required term.
        assert_eq!(
            parse_str("-a b +c").unwrap(),
            and(vec![
                term(2, "c"),
                not(term(0, "a")),
                boost(vec![term(1, "b")])
            ])
        );
    }

    #[test]
    fn from_query_text() {
        assert_eq!(
            parse_str("foo bar +baz").unwrap(),
            and(vec![
                term(2, "baz"),
                boost(vec![terms(&[(0, "foo"), (1, "bar")])])
            ])
        );
        assert_eq!(
            parse_str("-\"foo bar\" baz").unwrap(),
            and(vec![not(term(0, "foo bar")), boost(vec![term(1, "baz")])])
        );
    }

    #[test]
    fn left_paren_is_unsupported() {
        for (input, offset) in [("(foo)", 0), ("foo (bar)", 4), ("+(foo)", 1), ("a OR (b)", 5)] {
            assert_eq!(
                parse_str(input),
                Err(ParseError::UnsupportedConstruct {
                    construct: Construct::Grouping,
                    offset,
                }),
                "{input}"
            );
        }
    }

    #[test]
    fn stray_right_paren_is_skipped() {
        assert_eq!(parse_str(") foo").unwrap(), boost(vec![term(0, "foo")]));
        assert_eq!(parse_str("foo )").unwrap(), boost(vec![term(0, "foo")]));
        assert_eq!(
            parse_str("foo ) bar").unwrap(),
            boost(vec![term(0, "foo"), term(1, "bar")])
        );
    }

    #[test]
    fn escaped_paren_is_a_word() {
        assert_eq!(
            parse_str("\\(foo\\)").unwrap(),
            boost(vec![term(0, "(foo)")])
        );
    }

    #[test]
    fn ids_follow_token_order() {
        let mut allocator = TermAllocator::new();
        parse(tokenize("-a b +c d OR e"), &mut allocator).unwrap();
        assert_eq!(allocator.allocated(), 5);
    }
}

//! Term shingling.
//!
//! A shingle is an n-gram of consecutive terms joined into a single new term. Shingling a run
//! lets a retrieval engine reward documents where query words appear next to each other.

use std::iter;

use crate::{
    expression::{Expression, Operator},
    term::{Term, TermAllocator},
};

/// Expands a term run into an OR of the run and its shingles up to `max_order`.
///
/// For `[a, b, c, d]` and `max_order = 3` the result is
/// `OR([a b c d], [a_b b_c c_d], [a_b_c b_c_d])`, where each shingle is a freshly allocated
/// term whose value joins the window with `separator`. All order-2 terms are allocated before
/// any order-3 term. Orders with no complete window are omitted; when none remain (a
/// one-term run, or `max_order < 2`) the run is returned unchanged.
pub fn shingle(
    terms: &[Term],
    max_order: usize,
    separator: &str,
    allocator: &mut TermAllocator,
) -> Expression {
    let original = Expression::terms(terms.to_vec());
    let orders: Vec<Expression> = (2..=max_order)
        .map(|order| shingle_order(terms, order, separator, allocator))
        .take_while(|run| !run.is_noop())
        .collect();

    if orders.is_empty() {
        return original;
    }
    log::trace!(
        "shingled {} terms into {} extra orders",
        terms.len(),
        orders.len()
    );
    Expression::compound(Operator::Or, iter::once(original).chain(orders))
}

/// Builds the run of all order-`order` shingles, or the no-op expression if the run is
/// shorter than `order`.
fn shingle_order(
    terms: &[Term],
    order: usize,
    separator: &str,
    allocator: &mut TermAllocator,
) -> Expression {
    let shingles = terms
        .windows(order)
        .map(|window| {
            let value = window
                .iter()
                .map(Term::value)
                .collect::<Vec<_>>()
                .join(separator);
            allocator.create_derived_term(value, window)
        })
        .collect();
    Expression::terms(shingles)
}

//! Boolean expression trees over terms.
//!
//! Expressions are persistent: every combinator takes its operands by value and returns a new
//! tree, sharing unchanged subtrees through [`Arc`]. The smart constructors normalize as they
//! build, so structurally equivalent inputs always produce identical trees:
//!
//! - no-op children are dropped from every compound
//! - same-operator nesting is flattened (`AND(AND(a, b), c)` becomes `AND(a, b, c)`)
//! - `NOT(NOT(x))` collapses to `x`
//!
//! A node that is not shared with any other tree is grown in place, so building a run of `n`
//! terms or an `n`-ary compound one operand at a time stays linear.

use std::{fmt, sync::Arc};

use crate::term::Term;

/// Operator of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Matches nothing and contributes nothing; the identity of every combinator.
    Noop,
    /// Conjunction: all children must match.
    And,
    /// Disjunction: at least one child must match.
    Or,
    /// Negation of the single child.
    Not,
    /// Groups children that should be scored as a unit.
    Boost,
    /// A run of bare terms (see [`Expression::as_terms`]).
    Terms,
}

impl Operator {
    /// Returns the upper-case operator name used in diagnostic output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Boost => "BOOST",
            Self::Terms => "TERMS",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A normalized boolean expression.
///
/// The node representation is private: trees are only built through [`Expression::noop`],
/// [`Expression::terms`], [`Expression::compound`] and the combinators, and inspected through
/// [`Expression::operator`], [`Expression::as_terms`] and [`Expression::children`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(Node);

/// Node of an [`Expression`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Node {
    /// An ordered, non-empty run of bare terms.
    Terms(Arc<Vec<Term>>),
    /// An operator applied to ordered children, none of which is a no-op.
    Compound(Operator, Arc<Vec<Expression>>),
}

impl Default for Expression {
    fn default() -> Self {
        Self::noop()
    }
}

impl Expression {
    /// Returns the no-op expression.
    pub fn noop() -> Self {
        Self(Node::Compound(Operator::Noop, Arc::new(Vec::new())))
    }

    /// Creates a single-term run.
    pub fn term(term: Term) -> Self {
        Self(Node::Terms(Arc::new(vec![term])))
    }

    /// Creates a term run. An empty run yields the no-op expression.
    pub fn terms(terms: Vec<Term>) -> Self {
        if terms.is_empty() {
            Self::noop()
        } else {
            Self(Node::Terms(Arc::new(terms)))
        }
    }

    /// Creates a compound, dropping no-op children.
    ///
    /// A compound left without children collapses to the no-op expression, as does any
    /// compound built with [`Operator::Noop`]. Passing [`Operator::Terms`] splices the
    /// children's terms into one run. Children are kept as given: same-operator children are
    /// not flattened and a single child is not unwrapped.
    pub fn compound(operator: Operator, children: impl IntoIterator<Item = Self>) -> Self {
        let children: Vec<Self> = children.into_iter().filter(|c| !c.is_noop()).collect();
        if children.is_empty() || operator == Operator::Noop {
            return Self::noop();
        }
        if operator == Operator::Terms {
            return children
                .into_iter()
                .fold(Self::noop(), |run, child| match child.0 {
                    Node::Terms(terms) => terms.iter().cloned().fold(run, Self::append_term),
                    compound => run.or(Self(compound)),
                });
        }
        Self(Node::Compound(operator, Arc::new(children)))
    }

    /// Returns the operator of this node; [`Operator::Terms`] for term runs.
    pub fn operator(&self) -> Operator {
        match &self.0 {
            Node::Terms(_) => Operator::Terms,
            Node::Compound(operator, _) => *operator,
        }
    }

    /// Returns true for the no-op expression.
    pub fn is_noop(&self) -> bool {
        self.operator() == Operator::Noop
    }

    /// Returns true for a bare term run.
    pub fn is_terms(&self) -> bool {
        matches!(self.0, Node::Terms(_))
    }

    /// Returns the terms of a bare term run.
    pub fn as_terms(&self) -> Option<&[Term]> {
        match &self.0 {
            Node::Terms(terms) => Some(terms),
            Node::Compound(..) => None,
        }
    }

    /// Returns the children of a compound; empty for term runs.
    pub fn children(&self) -> &[Self] {
        match &self.0 {
            Node::Terms(_) => &[],
            Node::Compound(_, children) => children,
        }
    }

    /// Appends a term.
    ///
    /// A term run grows by one term and a no-op becomes a single-term run. Any other compound
    /// is disjoined with the new term.
    pub fn append_term(self, term: Term) -> Self {
        match self.0 {
            Node::Terms(mut terms) => {
                Arc::make_mut(&mut terms).push(term);
                Self(Node::Terms(terms))
            }
            compound => {
                let compound = Self(compound);
                if compound.is_noop() {
                    Self::term(term)
                } else {
                    compound.or(Self::term(term))
                }
            }
        }
    }

    /// Conjunction of `self` and `other`, flattening nested ANDs on either side.
    pub fn and(self, other: Self) -> Self {
        Self::combine(Operator::And, self, other)
    }

    /// Disjunction of `self` and `other`, flattening nested ORs on either side.
    pub fn or(self, other: Self) -> Self {
        Self::combine(Operator::Or, self, other)
    }

    /// Negation. Negating a single-child NOT unwraps it; negating a no-op is a no-op.
    pub fn not(self) -> Self {
        match self.0 {
            Node::Compound(Operator::Not, children) if children.len() == 1 => {
                children[0].clone()
            }
            other => {
                let other = Self(other);
                if other.is_noop() {
                    other
                } else {
                    Self(Node::Compound(Operator::Not, Arc::new(vec![other])))
                }
            }
        }
    }

    /// Boosts a bare term run so later flattening keeps it as a distinct group.
    ///
    /// Compounds are returned unchanged.
    pub fn wrap(self) -> Self {
        if self.is_terms() {
            Self(Node::Compound(Operator::Boost, Arc::new(vec![self])))
        } else {
            self
        }
    }

    /// Continues `self` with `other` according to the receiver's own operator.
    ///
    /// OR receivers disjoin, AND receivers conjoin and a no-op is replaced by `other`. Any
    /// other receiver is grouped with a following term run under BOOST, and disjoined with
    /// anything else.
    pub fn extend(self, other: Self) -> Self {
        if other.is_noop() {
            return self;
        }
        match self.operator() {
            Operator::Or => self.or(other),
            Operator::And => self.and(other),
            Operator::Noop => other,
            Operator::Not | Operator::Boost | Operator::Terms => {
                if other.is_terms() {
                    Self(Node::Compound(Operator::Boost, Arc::new(vec![self, other])))
                } else {
                    self.or(other)
                }
            }
        }
    }

    /// Replaces every term run with the result of `f`, keeping compound structure.
    ///
    /// Runs are visited depth first, left to right, so an `f` that allocates terms assigns
    /// ids in reading order.
    pub fn flat_map_terms<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[Term]) -> Self,
    {
        self.flat_map_terms_with(&mut f)
    }

    /// Recursive worker for [`Expression::flat_map_terms`].
    fn flat_map_terms_with<F>(&self, f: &mut F) -> Self
    where
        F: FnMut(&[Term]) -> Self,
    {
        match &self.0 {
            Node::Terms(terms) => f(terms.as_slice()),
            Node::Compound(operator, children) => {
                let mapped: Vec<Self> = children
                    .iter()
                    .map(|child| child.flat_map_terms_with(f))
                    .collect();
                Self::compound(*operator, mapped)
            }
        }
    }

    /// Shared implementation of [`Expression::and`] and [`Expression::or`].
    ///
    /// An operand that already carries `operator` and is not shared is extended in place.
    fn combine(operator: Operator, left: Self, right: Self) -> Self {
        match (left.0, right.0) {
            (Node::Compound(op, mut children), right) if op == operator => {
                let flattened = Arc::make_mut(&mut children);
                match right {
                    Node::Compound(op, right_children) if op == operator => {
                        flattened.extend(right_children.iter().cloned());
                    }
                    other => {
                        let other = Self(other);
                        if !other.is_noop() {
                            flattened.push(other);
                        }
                    }
                }
                Self(Node::Compound(operator, children))
            }
            (left, Node::Compound(op, mut children)) if op == operator => {
                let left = Self(left);
                if !left.is_noop() {
                    Arc::make_mut(&mut children).insert(0, left);
                }
                Self(Node::Compound(operator, children))
            }
            (left, right) => Self::compound(operator, [Self(left), Self(right)]),
        }
    }

    /// Writes the indented tree form used by the alternate `{:#}` format.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match &self.0 {
            Node::Terms(terms) => {
                writeln!(f, "{prefix}Terms")?;
                for term in terms.iter() {
                    writeln!(f, "{prefix}  {term}")?;
                }
                Ok(())
            }
            Node::Compound(operator, children) => {
                writeln!(f, "{prefix}{operator}")?;
                for child in children.iter() {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// `{}` renders a compact one-line form such as `AND(NOT([bar#1]), BOOST([foo#0 baz#2]))`;
/// `{:#}` renders an indented tree. Both are for diagnostics only.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return self.fmt_tree(f, 0);
        }
        match &self.0 {
            Node::Terms(terms) => {
                f.write_str("[")?;
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{term}")?;
                }
                f.write_str("]")
            }
            Node::Compound(operator, children) => {
                write!(f, "{operator}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

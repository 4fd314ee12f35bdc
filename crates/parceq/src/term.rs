//! Terms and the allocator that issues them.

use std::fmt;

/// Identifier of a term, unique within one [`TermAllocator`].
pub type TermId = u32;

/// An atomic unit of match, typically one word of the query.
///
/// Terms are immutable. Two terms are equal when their id, value and field all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// Allocator-assigned identifier.
    id: TermId,
    /// The text to match.
    value: String,
    /// Optional field restriction.
    field: Option<String>,
}

impl Term {
    /// Creates a term. Query parsing goes through [`TermAllocator`] instead, which keeps ids
    /// unique.
    pub fn new(id: TermId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            field: None,
        }
    }

    /// Returns a copy of this term restricted to `field`.
    ///
    /// The query grammar has no field syntax; this exists for consumers that qualify terms
    /// after parsing.
    pub fn with_field(&self, field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..self.clone()
        }
    }

    /// Returns the term id.
    pub fn id(&self) -> TermId {
        self.id
    }

    /// Returns the term text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the field restriction, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "{field}:")?;
        }
        write!(f, "{}#{}", self.value, self.id)
    }
}

/// Issues terms with sequential ids.
///
/// One allocator covers a whole parse plus any shingling applied to the result, so that every
/// term in the final expression has a distinct id.
#[derive(Debug, Default)]
pub struct TermAllocator {
    /// Id of the next term to issue.
    counter: TermId,
}

impl TermAllocator {
    /// Creates an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a term for a word taken directly from the query text.
    pub fn create_root_term(&mut self, value: impl Into<String>) -> Term {
        let id = self.next_id();
        Term::new(id, value)
    }

    /// Allocates a term built from other terms, such as a shingle.
    ///
    /// The source terms are not recorded on the new term; the parameter documents the
    /// derivation at the call site.
    pub fn create_derived_term(&mut self, value: impl Into<String>, sources: &[Term]) -> Term {
        let id = self.next_id();
        log::trace!("derived term #{id} from {} source terms", sources.len());
        Term::new(id, value)
    }

    /// Returns how many terms have been allocated so far.
    pub fn allocated(&self) -> TermId {
        self.counter
    }

    /// Claims the next id.
    fn next_id(&mut self) -> TermId {
        let id = self.counter;
        self.counter += 1;
        id
    }
}

// ============================================================
// Layer 3: Template Domain Type
// ============================================================
// A template is the canonical, variable-masked form of a log
// line: its normalized tokens joined by single spaces.
//
// Identity is structural. Two templates are the same template
// iff their canonical strings are equal, so the newtype derives
// Eq/Hash straight from the inner str.
//
// The text lives in an Rc<str>: cloning a template shares the
// allocation, so the dictionary's map and ID table hold one copy.
//
// Example (vectorizer policy):
//   raw:      "- 2006-03-02 node123 FetchError 42"
//   template: "2006-03-02 node123 FetchError <*>"
//
// Reference: Rust Book §5 (Structs), §10 (Derive Macros)

use std::{borrow::Borrow, fmt, rc::Rc};

/// Placeholder substituted for variable tokens by the vectorizer policy
pub const WILDCARD: &str = "<*>";

/// Template ID written for a line whose template could not be resolved
pub const UNRESOLVED_TEMPLATE_ID: i64 = -1;

// ─── TemplateId ───────────────────────────────────────────────────────────────
/// Stable integer identity of a template.
/// Assigned in first-seen order starting at 0; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(usize);

impl TemplateId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Position of this ID in dense per-template tables
    pub fn index(self) -> usize {
        self.0
    }

    /// Signed form used in vector records, where -1 means unresolved
    pub fn as_signed(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Template ─────────────────────────────────────────────────────────────────
/// A canonical template string. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Template(Rc<str>);

impl Template {
    /// Build a template from already-normalized tokens.
    /// Tokens are joined with single spaces in their original order.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical = String::new();
        for (i, tok) in tokens.into_iter().enumerate() {
            if i > 0 {
                canonical.push(' ');
            }
            canonical.push_str(tok.as_ref());
        }
        Self(canonical.into())
    }

    /// Wrap a string that is already in canonical form
    pub fn from_canonical(canonical: impl Into<String>) -> Self {
        let canonical: String = canonical.into();
        Self(Rc::from(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ordered tokens of this template.
    /// The empty template has no tokens.
    pub fn tokens(&self) -> Vec<&str> {
        if self.0.is_empty() {
            Vec::new()
        } else {
            self.0.split(' ').collect()
        }
    }
}

/// Lets the dictionary be queried with a plain &str.
/// Rc<str> and str hash identically, so lookups stay consistent.
impl Borrow<str> for Template {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

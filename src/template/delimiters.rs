//! Locating embedded expressions inside string leaves

use std::ops::Range;

use serde::Deserialize;

/// Open/close marker pair around an embedded expression
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// A delimited expression found in a leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'s> {
    /// The literal span including both markers
    pub span: &'s str,
    /// Byte range of `span` within the leaf
    pub range: Range<usize>,
    /// Expression source with surrounding whitespace trimmed
    pub expression: &'s str,
}

impl Placeholder<'_> {
    /// Whether the placeholder is the entire leaf, by exact string equality
    pub fn is_whole(&self, leaf: &str) -> bool {
        self.range.start == 0 && self.range.end == leaf.len()
    }
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Find the delimited expression in `leaf`
    ///
    /// The match is maximal: it runs from the first open marker to the last
    /// close marker after it, so braces belonging to object literals inside
    /// the expression do not end it early. The body between the markers must
    /// be non-empty.
    pub fn find<'s>(&self, leaf: &'s str) -> Option<Placeholder<'s>> {
        let start = leaf.find(&self.open)?;
        let body_start = start + self.open.len();
        let body_end = body_start + leaf[body_start..].rfind(&self.close)?;
        if body_end == body_start {
            return None;
        }
        let end = body_end + self.close.len();
        Some(Placeholder {
            span: &leaf[start..end],
            range: start..end,
            expression: leaf[body_start..body_end].trim(),
        })
    }
}

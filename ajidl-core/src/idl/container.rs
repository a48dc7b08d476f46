//! Discovery records for anonymous structures and dictionaries.

use indexmap::IndexMap;
use serde::Serialize;

use crate::signature::{self, DICT_CLOSE, DICT_OPEN, STRUCT_CLOSE, STRUCT_OPEN};

/// A distinct anonymous structure or dictionary found in an interface, keyed by its canonical
/// signature (`(..)` for a structure, `{..}` for a dictionary entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    signature: String,
    name: Option<String>,
}

impl Container {
    /// An unnamed container.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            name: None,
        }
    }

    /// A container named after `member`, see [`Container::set_name`].
    pub fn named(signature: impl Into<String>, member: &str) -> Self {
        let mut container = Self::new(signature);
        container.set_name(member);

        container
    }

    /// The canonical signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The name, once assigned.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Names the container after `member`, suffixed with the clean form of the signature
    /// unless the member name already contains it.
    ///
    /// A `(ii)` container first seen on `origin` is called `origin_ii`. Characters that cannot
    /// appear in a type name become underscores, so `my-point` gives `my_point_ii`.
    pub fn set_name(&mut self, member: &str) {
        let suffix = signature::clean_name(&self.signature);
        let mut name = identifier(member);
        if !name.contains(&suffix) {
            name.push_str(&suffix);
        }
        self.name = Some(name);
    }

    pub(crate) fn set_placeholder(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Adds every structure nested in this container (itself included) to `into`.
    pub fn extract_structures(&self, into: &mut IndexMap<String, Container>) {
        extract(&self.signature, STRUCT_OPEN, STRUCT_CLOSE, into);
    }

    /// Adds every dictionary entry nested in this container (itself included) to `into`.
    pub fn extract_dictionaries(&self, into: &mut IndexMap<String, Container>) {
        extract(&self.signature, DICT_OPEN, DICT_CLOSE, into);
    }
}

// Member names come from documents and may hold anything.
fn identifier(member: &str) -> String {
    let mut name: String = member
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    name
}

/// Adds every `open`..`close` delimited substring of `signature` missing from `into` as a new
/// unnamed container.
///
/// Containers are recorded in the order their closing delimiter appears, so nested containers
/// come before the ones enclosing them. Existing entries are left untouched.
pub fn extract(signature: &str, open: char, close: char, into: &mut IndexMap<String, Container>) {
    let mut stack = Vec::new();
    for (i, c) in signature.char_indices() {
        if c == open {
            stack.push(i);
        } else if c == close {
            let Some(start) = stack.pop() else {
                continue;
            };
            let found = &signature[start..=i];
            if !into.contains_key(found) {
                into.insert(found.to_string(), Container::new(found));
            }
        }
    }
}

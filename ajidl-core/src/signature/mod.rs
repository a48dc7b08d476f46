//! Type signatures and the pure functions that classify and decompose them.
//!
//! A signature is a string over a compact positional grammar: single letters for basic types,
//! `a` prefixes for arrays, `(...)` for structures, `a{kv}` for dictionaries and `[Name]` for a
//! reference to a declared type. The functions in this module operate on plain `&str` and
//! assume well-formed input; [`Signature`] is the validated owned form.

mod parse;

use core::{fmt, ops::Deref, str::FromStr};

use serde::Serialize;

use crate::{Error, Result};

/// Array marker.
pub const ARRAY: char = 'a';
/// Variant type.
pub const VARIANT: char = 'v';
/// Opening delimiter of a structure.
pub const STRUCT_OPEN: char = '(';
/// Closing delimiter of a structure.
pub const STRUCT_CLOSE: char = ')';
/// Opening delimiter of a dictionary entry.
pub const DICT_OPEN: char = '{';
/// Closing delimiter of a dictionary entry.
pub const DICT_CLOSE: char = '}';
/// Opening delimiter of a named-type reference.
pub const NAMED_OPEN: char = '[';
/// Closing delimiter of a named-type reference.
pub const NAMED_CLOSE: char = ']';

/// The basic type letters: boolean, double, signature, int32, int16, object path, uint16,
/// string, uint64, uint32, int64 and byte.
pub const BASIC_TYPES: &str = "bdginoqstuxy";

/// Maximum length of a signature.
pub const MAX_LENGTH: usize = 255;
/// Maximum nesting of arrays, structures or dictionaries.
pub const MAX_DEPTH: usize = 32;

/// Number of leading array markers.
pub fn indirection_level(signature: &str) -> usize {
    signature.len() - base_signature(signature).len()
}

/// The signature with its leading array markers stripped, i.e. `i`, `ai` and `aai` all give `i`.
pub fn base_signature(signature: &str) -> &str {
    signature.trim_start_matches(ARRAY)
}

/// Whether the signature is exactly one basic type.
///
/// Variants, arrays, structures, dictionaries and named references are not basic.
pub fn is_basic(signature: &str) -> bool {
    signature.len() == 1 && BASIC_TYPES.contains(signature)
}

/// Whether the signature is an array. A dictionary is an array too.
pub fn is_array(signature: &str) -> bool {
    signature.starts_with(ARRAY)
}

/// Whether the base signature is a structure.
pub fn is_structure(signature: &str) -> bool {
    base_signature(signature).starts_with(STRUCT_OPEN)
}

/// Whether the signature is a dictionary (or an array of them).
pub fn is_dictionary(signature: &str) -> bool {
    is_array(signature) && base_signature(signature).starts_with(DICT_OPEN)
}

/// Whether the signature is an array of dictionaries.
pub fn is_dictionary_array(signature: &str) -> bool {
    is_dictionary(signature) && indirection_level(signature) > 1
}

/// Whether the base signature is a named-type reference.
pub fn references_named_type(signature: &str) -> bool {
    base_signature(signature).starts_with(NAMED_OPEN)
}

/// The name a `[Name]` base signature refers to.
pub fn named_reference(signature: &str) -> Option<&str> {
    base_signature(signature)
        .strip_prefix(NAMED_OPEN)?
        .strip_suffix(NAMED_CLOSE)
}

/// The longest run of consecutive array markers anywhere in the signature.
pub fn max_array_dimension(signature: &str) -> usize {
    let mut max = 0;
    let mut run = 0;
    let mut in_name = false;
    for c in signature.chars() {
        match c {
            NAMED_OPEN => in_name = true,
            NAMED_CLOSE => in_name = false,
            ARRAY if !in_name => {
                run += 1;
                max = max.max(run);
                continue;
            }
            _ => (),
        }
        run = 0;
    }

    max
}

/// Maximum nesting depth of structures.
///
/// `"bud"` gives 0, `"(bud)(did)"` gives 1 and `"(i((bud(did))i))"` gives 4.
pub fn max_structure_depth(signature: &str) -> usize {
    max_container_depth(signature, STRUCT_OPEN, STRUCT_CLOSE)
}

/// Maximum nesting depth of dictionaries.
///
/// `"a{bud}a{did}"` gives 1 and `"a{ia{a{buda{did}}i}}"` gives 4.
pub fn max_dictionary_depth(signature: &str) -> usize {
    max_container_depth(signature, DICT_OPEN, DICT_CLOSE)
}

// Delimiters other than `open`/`close` are transparent to the scan.
fn max_container_depth(signature: &str, open: char, close: char) -> usize {
    let mut max = 0;
    let mut depth = 0usize;
    for c in signature.chars() {
        if c == open {
            depth += 1;
            max = max.max(depth);
        } else if c == close {
            depth = depth.saturating_sub(1);
        }
    }

    max
}

/// Splits a structure (`(...)`) or dictionary entry (`{...}`) signature into the signatures of
/// its immediate children.
///
/// `"(ia{sv}(ii))"` gives `["i", "a{sv}", "(ii)"]` and `"{s(ii)}"` gives `["s", "(ii)"]`.
pub fn split_signature(container: &str) -> Vec<&str> {
    let interior = match container.len() {
        0..=1 => "",
        len => &container[1..len - 1],
    };

    complete_types(interior)
}

/// Splits a sequence of complete types, e.g. the concatenated argument signatures of a method.
pub fn complete_types(signature: &str) -> Vec<&str> {
    let mut types = Vec::new();
    let mut start = 0;
    while start < signature.len() {
        let end = end_of_type(signature, start);
        types.push(&signature[start..end]);
        start = end;
    }

    types
}

// Index one past the complete type starting at `index`.
fn end_of_type(signature: &str, index: usize) -> usize {
    let bytes = signature.as_bytes();
    match bytes[index] as char {
        STRUCT_OPEN => container_end(bytes, index, STRUCT_OPEN, STRUCT_CLOSE),
        DICT_OPEN => container_end(bytes, index, DICT_OPEN, DICT_CLOSE),
        NAMED_OPEN => bytes[index..]
            .iter()
            .position(|&c| c as char == NAMED_CLOSE)
            .map_or(bytes.len(), |pos| index + pos + 1),
        ARRAY if index + 1 < bytes.len() => end_of_type(signature, index + 1),
        _ => index + 1,
    }
}

fn container_end(bytes: &[u8], index: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    for (i, &c) in bytes.iter().enumerate().skip(index) {
        let c = c as char;
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
    }

    bytes.len()
}

/// Whether `name` can be referred to as `[name]`: ASCII letters, digits and underscores, not
/// starting with a digit.
pub fn is_type_name(name: &str) -> bool {
    let mut input = name.as_bytes();

    parse::type_name(&mut input).is_ok() && input.is_empty()
}

/// Makes an identifier-friendly suffix out of a signature, e.g. `(ia{sv})` becomes `_ia_sv`.
pub fn clean_name(signature: &str) -> String {
    signature
        .chars()
        .filter_map(|c| match c {
            STRUCT_OPEN | DICT_OPEN | NAMED_OPEN => Some('_'),
            STRUCT_CLOSE | DICT_CLOSE | NAMED_CLOSE => None,
            c => Some(c),
        })
        .collect()
}

/// A validated type signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Parses and validates a signature.
    pub fn new(signature: impl Into<String>) -> Result<Self> {
        let signature = signature.into();
        parse::validate(&signature)?;

        Ok(Self(signature))
    }

    /// Parses and validates the base of a signature: one complete type, or a dictionary entry
    /// (`{sv}`) as left over by [`base_signature`] on a dictionary.
    pub fn new_base(signature: impl Into<String>) -> Result<Self> {
        let signature = signature.into();
        parse::validate_base(&signature)?;

        Ok(Self(signature))
    }

    /// A signature built out of already validated pieces.
    pub(crate) fn from_parts(signature: String) -> Self {
        Self(signature)
    }

    /// The signature text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is exactly one complete type.
    pub fn is_single_type(&self) -> bool {
        !self.0.is_empty() && end_of_type(&self.0, 0) == self.0.len()
    }

    /// See [`indirection_level`].
    pub fn indirection_level(&self) -> usize {
        indirection_level(&self.0)
    }

    /// See [`base_signature`].
    pub fn base(&self) -> &str {
        base_signature(&self.0)
    }

    /// See [`is_basic`].
    pub fn is_basic(&self) -> bool {
        is_basic(&self.0)
    }

    /// See [`is_array`].
    pub fn is_array(&self) -> bool {
        is_array(&self.0)
    }

    /// See [`is_structure`].
    pub fn is_structure(&self) -> bool {
        is_structure(&self.0)
    }

    /// See [`is_dictionary`].
    pub fn is_dictionary(&self) -> bool {
        is_dictionary(&self.0)
    }

    /// See [`is_dictionary_array`].
    pub fn is_dictionary_array(&self) -> bool {
        is_dictionary_array(&self.0)
    }

    /// See [`references_named_type`].
    pub fn references_named_type(&self) -> bool {
        references_named_type(&self.0)
    }

    /// See [`named_reference`].
    pub fn named_reference(&self) -> Option<&str> {
        named_reference(&self.0)
    }

    /// See [`max_array_dimension`].
    pub fn max_array_dimension(&self) -> usize {
        max_array_dimension(&self.0)
    }

    /// See [`max_structure_depth`].
    pub fn max_structure_depth(&self) -> usize {
        max_structure_depth(&self.0)
    }

    /// See [`max_dictionary_depth`].
    pub fn max_dictionary_depth(&self) -> usize {
        max_dictionary_depth(&self.0)
    }

    /// See [`split_signature`].
    pub fn split(&self) -> Vec<&str> {
        split_signature(&self.0)
    }
}

impl Deref for Signature {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Signature {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl PartialEq<str> for Signature {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Signature {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

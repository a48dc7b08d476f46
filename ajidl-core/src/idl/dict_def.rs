//! Declared dictionary definitions.

use core::fmt;

use serde::Serialize;

use super::TypedMember;
use crate::Signature;

/// A declared dictionary: a basic key type and a value of any type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictDef {
    name: String,
    key: TypedMember,
    value: TypedMember,
}

impl DictDef {
    /// Creates a new dictionary.
    ///
    /// The key is checked to be a basic type when the dictionary is declared in an interface.
    pub fn new(name: impl Into<String>, key: Signature, value: Signature) -> Self {
        Self {
            name: name.into(),
            key: TypedMember::new("key", key),
            value: TypedMember::new("value", value),
        }
    }

    /// Returns the name of the dictionary.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the key member.
    pub fn key(&self) -> &TypedMember {
        &self.key
    }

    /// Returns the value member.
    pub fn value(&self) -> &TypedMember {
        &self.value
    }

    /// The key and the value, in that order.
    pub fn fields(&self) -> [&TypedMember; 2] {
        [&self.key, &self.value]
    }
}

impl fmt::Display for DictDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dict {} {{{}: {}}}",
            self.name,
            self.key.signature(),
            self.value.signature()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_creation() {
        let dict = DictDef::new(
            "Settings",
            Signature::new("s").unwrap(),
            Signature::new("v").unwrap(),
        );
        assert_eq!(dict.name(), "Settings");
        assert_eq!(dict.key().name(), "key");
        assert_eq!(dict.value().signature(), "v");
        assert_eq!(dict.fields().len(), 2);
        assert_eq!(dict.to_string(), "dict Settings {s: v}");
    }
}

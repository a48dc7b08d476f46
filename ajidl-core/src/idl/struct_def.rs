//! Declared structure definitions.

use core::fmt;

use serde::Serialize;

use super::{Field, MemberKind};
use crate::{Error, Result};

/// A declared structure: a name and an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDef {
    /// The name of the structure, unique within its interface.
    name: String,
    /// The fields, in declaration order.
    fields: Vec<Field>,
}

impl StructDef {
    /// Creates a new structure without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a new structure with the given fields.
    pub fn with_fields(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Appends a field, rejecting duplicate field names.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(Error::DuplicateMember {
                scope: self.name.clone(),
                kind: MemberKind::Field,
                name: field.name().to_string(),
            });
        }
        self.fields.push(field);

        Ok(())
    }

    /// Returns the name of the structure.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl fmt::Display for StructDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {} (", self.name)?;
        let mut first = true;
        for field in &self.fields {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{field}")?;
        }
        write!(f, ")")
    }
}

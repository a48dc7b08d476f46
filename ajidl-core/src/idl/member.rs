//! Typed members: arguments and structure fields.

use core::fmt;

use serde::Serialize;

use super::{declared, NamedType, NamedTypes};
use crate::{signature, Result, Signature};

/// A named, typed component: an argument, a property value or a structure field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedMember {
    /// The name of the member.
    name: String,
    /// The type of the member.
    signature: Signature,
}

/// Type alias for structure fields, which are plain typed members.
pub type Field = TypedMember;

impl TypedMember {
    /// Creates a new member with the given name and signature.
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }

    /// Returns the name of the member.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the signature as declared, or as rewritten by resolution.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn set_signature(&mut self, signature: Signature) {
        self.signature = signature;
    }

    /// The signature without its leading array markers.
    pub fn base_signature(&self) -> &str {
        self.signature.base()
    }

    /// Whether the base signature is a `[Name]` reference.
    pub fn references_named_type(&self) -> bool {
        self.signature.references_named_type()
    }

    /// Whether this member is a single basic type.
    pub fn is_basic(&self) -> bool {
        !self.references_named_type() && self.signature.is_basic()
    }

    /// The declared type this member's base signature refers to, if any.
    pub fn named_type<'t, T>(&self, types: &'t T) -> Option<NamedType<'t>>
    where
        T: NamedTypes + ?Sized,
    {
        types.named_type(self.signature.named_reference()?)
    }

    /// The signature with every named reference replaced by the structure of the referenced
    /// type, recursively.
    pub fn flattened_signature<T>(&self, types: &T) -> Result<Signature>
    where
        T: NamedTypes + ?Sized,
    {
        declared::flatten(types, &self.name, &self.signature).map(Signature::from_parts)
    }

    /// Structural queries on this member, answered on its flattened signature.
    pub fn view<'t, T>(&'t self, types: &'t T) -> Result<TypeView<'t>>
    where
        T: NamedTypes + ?Sized,
    {
        Ok(TypeView {
            member: self,
            flattened: self.flattened_signature(types)?,
            named: self.named_type(types),
        })
    }
}

impl fmt::Display for TypedMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.signature)
    }
}

/// A [`TypedMember`] together with its flattened signature.
///
/// Named references are already expanded, so an argument of type `a[Point]` where `Point` is
/// `(ii)` reports itself as an array of structures.
#[derive(Debug, Clone)]
pub struct TypeView<'a> {
    member: &'a TypedMember,
    flattened: Signature,
    named: Option<NamedType<'a>>,
}

impl<'a> TypeView<'a> {
    /// The member being viewed.
    pub fn member(&self) -> &'a TypedMember {
        self.member
    }

    /// The declared type the member refers to, if any.
    pub fn named_type(&self) -> Option<NamedType<'a>> {
        self.named
    }

    /// The member's own base signature, which may be a `[Name]` reference.
    pub fn base_signature(&self) -> &'a str {
        self.member.base_signature()
    }

    /// The flattened signature.
    pub fn flattened_signature(&self) -> &Signature {
        &self.flattened
    }

    /// The base of the flattened signature.
    pub fn flattened_base_signature(&self) -> &str {
        self.flattened.base()
    }

    /// Whether the member is an array. A dictionary is an array too.
    pub fn is_array(&self) -> bool {
        self.flattened.is_array()
    }

    /// Whether the member is a structure or an array of them.
    pub fn is_structure(&self) -> bool {
        self.flattened.is_structure()
    }

    /// Whether the member is a dictionary or an array of them.
    pub fn is_dictionary(&self) -> bool {
        self.flattened.is_dictionary()
    }

    /// Whether the member is an array of dictionaries.
    pub fn is_dictionary_array(&self) -> bool {
        self.flattened.is_dictionary_array()
    }

    /// Number of array dimensions, 0 if not an array.
    pub fn indirection_level(&self) -> usize {
        self.flattened.indirection_level()
    }

    /// See [`signature::max_array_dimension`].
    pub fn max_array_dimension(&self) -> usize {
        signature::max_array_dimension(&self.flattened)
    }

    /// See [`signature::max_structure_depth`].
    pub fn max_structure_depth(&self) -> usize {
        signature::max_structure_depth(&self.flattened)
    }

    /// See [`signature::max_dictionary_depth`].
    pub fn max_dictionary_depth(&self) -> usize {
        signature::max_dictionary_depth(&self.flattened)
    }
}

/// The kinds of things that must have unique names within their scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A method of an interface.
    Method,
    /// A signal of an interface.
    Signal,
    /// A property of an interface.
    Property,
    /// An argument of a method or signal.
    Argument,
    /// A field of a declared structure.
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberKind::Method => "method",
            MemberKind::Signal => "signal",
            MemberKind::Property => "property",
            MemberKind::Argument => "argument",
            MemberKind::Field => "field",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{DeclaredTypes, DictDef, StructDef};

    fn sig(s: &str) -> Signature {
        Signature::new(s).unwrap()
    }

    fn types() -> DeclaredTypes {
        let mut types = DeclaredTypes::new("org.example.Shapes");
        types
            .declare_struct(StructDef::with_fields(
                "Point",
                vec![Field::new("x", sig("i")), Field::new("y", sig("i"))],
            ))
            .unwrap();
        types
            .declare_dict(DictDef::new("Labels", sig("s"), sig("a[Point]")))
            .unwrap();
        types
    }

    #[test]
    fn member_creation() {
        let member = TypedMember::new("myArg", sig("(bid)"));
        assert_eq!(member.name(), "myArg");
        assert_eq!(member.signature(), "(bid)");
        assert_eq!(member.to_string(), "myArg: (bid)");
        assert!(!member.is_basic());
        assert!(TypedMember::new("flag", sig("b")).is_basic());
    }

    #[test]
    fn flattening() {
        let types = types();

        let point = TypedMember::new("where", sig("aa[Point]"));
        assert_eq!(point.flattened_signature(&types).unwrap(), "aa(ii)");
        assert!(matches!(point.named_type(&types), Some(NamedType::Struct(s)) if s.name() == "Point"));

        // A dictionary reference already includes the dictionary's own array marker.
        let labels = TypedMember::new("labels", sig("a[Labels]"));
        assert_eq!(labels.flattened_signature(&types).unwrap(), "aa{sa(ii)}");

        let plain = TypedMember::new("count", sig("u"));
        assert_eq!(plain.flattened_signature(&types).unwrap(), "u");
        assert!(plain.named_type(&types).is_none());
    }

    #[test]
    fn view_queries() {
        let types = types();

        let member = TypedMember::new("labels", sig("a[Labels]"));
        let view = member.view(&types).unwrap();
        assert_eq!(view.base_signature(), "[Labels]");
        assert_eq!(view.flattened_base_signature(), "{sa(ii)}");
        assert!(view.is_array());
        assert!(view.is_dictionary());
        assert!(view.is_dictionary_array());
        assert!(!view.is_structure());
        assert_eq!(view.indirection_level(), 2);
        assert_eq!(view.max_array_dimension(), 2);
        assert_eq!(view.max_structure_depth(), 1);
        assert_eq!(view.max_dictionary_depth(), 1);
        assert!(matches!(view.named_type(), Some(NamedType::Dict(d)) if d.name() == "Labels"));
    }

    #[test]
    fn unknown_reference() {
        let types = types();
        let member = TypedMember::new("shape", sig("[Circle]"));
        match member.view(&types) {
            Err(crate::Error::UnknownNamedType { member, name, .. }) => {
                assert_eq!(member, "shape");
                assert_eq!(name, "Circle");
            }
            other => panic!("Expected unknown type error, got {other:?}"),
        }
    }
}

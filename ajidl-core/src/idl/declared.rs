//! The per-interface table of declared types and named-reference expansion.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::{DictDef, StructDef, TypedMember};
use crate::{
    signature::{self, NAMED_CLOSE, NAMED_OPEN},
    Error, Result,
};

/// A declared type: a structure or a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NamedType<'a> {
    /// A declared structure.
    Struct(&'a StructDef),
    /// A declared dictionary.
    Dict(&'a DictDef),
}

impl<'a> NamedType<'a> {
    /// Returns the name of the type.
    pub fn name(&self) -> &'a str {
        match self {
            NamedType::Struct(s) => s.name(),
            NamedType::Dict(d) => d.name(),
        }
    }

    /// The members of the type: the fields of a structure, or the key and value of a dictionary.
    pub fn fields(&self) -> Vec<&'a TypedMember> {
        match self {
            NamedType::Struct(s) => s.fields().iter().collect(),
            NamedType::Dict(d) => d.fields().to_vec(),
        }
    }

    /// The structural signature of the type, with nested references expanded.
    pub fn flattened_signature<T>(&self, types: &T) -> Result<crate::Signature>
    where
        T: NamedTypes + ?Sized,
    {
        let mut stack = Vec::new();
        flatten_type(types, *self, &mut stack).map(crate::Signature::from_parts)
    }
}

/// Lookup of declared types by name.
pub trait NamedTypes {
    /// The name of the interface the types are declared in.
    fn interface_name(&self) -> &str;

    /// The declared type called `name`.
    fn named_type(&self, name: &str) -> Option<NamedType<'_>>;
}

/// The structures and dictionaries declared in an interface.
///
/// Structures and dictionaries share one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredTypes {
    #[serde(skip)]
    interface: String,
    structs: IndexMap<String, StructDef>,
    dicts: IndexMap<String, DictDef>,
    #[serde(skip)]
    names: IndexSet<String>,
}

impl DeclaredTypes {
    /// An empty table for the interface called `interface`.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            structs: IndexMap::new(),
            dicts: IndexMap::new(),
            names: IndexSet::new(),
        }
    }

    /// Declares a structure.
    pub fn declare_struct(&mut self, s: StructDef) -> Result<()> {
        self.claim(s.name())?;
        self.structs.insert(s.name().to_string(), s);

        Ok(())
    }

    /// Declares a dictionary. Its key must be a basic type.
    pub fn declare_dict(&mut self, d: DictDef) -> Result<()> {
        if !d.key().is_basic() {
            return Err(Error::InconsistentKeyType {
                interface: self.interface.clone(),
                dict: d.name().to_string(),
                key: d.key().signature().to_string(),
            });
        }
        self.claim(d.name())?;
        self.dicts.insert(d.name().to_string(), d);

        Ok(())
    }

    fn claim(&mut self, name: &str) -> Result<()> {
        if !signature::is_type_name(name) {
            return Err(Error::InvalidTypeName {
                interface: self.interface.clone(),
                name: name.to_string(),
            });
        }
        if !self.names.insert(name.to_string()) {
            return Err(Error::DuplicateDeclaredName {
                interface: self.interface.clone(),
                name: name.to_string(),
                signature: None,
            });
        }

        Ok(())
    }

    /// The declared structures.
    pub fn structs(&self) -> &IndexMap<String, StructDef> {
        &self.structs
    }

    /// The declared dictionaries.
    pub fn dicts(&self) -> &IndexMap<String, DictDef> {
        &self.dicts
    }

    /// Every declared name, structures and dictionaries alike.
    pub fn names(&self) -> &IndexSet<String> {
        &self.names
    }

    /// All declared types, shortest flattened signature first, so that every type comes after
    /// the types it contains. Equally long types keep their declaration order, structures
    /// before dictionaries.
    pub fn declarations(&self) -> Result<Vec<NamedType<'_>>> {
        let mut declarations = self
            .structs
            .values()
            .map(NamedType::Struct)
            .chain(self.dicts.values().map(NamedType::Dict))
            .map(|ty| Ok((ty.flattened_signature(self)?.len(), ty)))
            .collect::<Result<Vec<_>>>()?;
        declarations.sort_by_key(|(len, _)| *len);

        Ok(declarations.into_iter().map(|(_, ty)| ty).collect())
    }

    /// Reorders both maps by flattened signature length, keeping declaration order among
    /// equally long types.
    pub(crate) fn sort(&mut self) -> Result<()> {
        let lengths = self
            .declarations()?
            .into_iter()
            .enumerate()
            .map(|(i, ty)| (ty.name().to_string(), i))
            .collect::<HashMap<_, _>>();
        self.structs
            .sort_by(|a, _, b, _| lengths.get(a).cmp(&lengths.get(b)));
        self.dicts
            .sort_by(|a, _, b, _| lengths.get(a).cmp(&lengths.get(b)));

        Ok(())
    }
}

impl NamedTypes for DeclaredTypes {
    fn interface_name(&self) -> &str {
        &self.interface
    }

    fn named_type(&self, name: &str) -> Option<NamedType<'_>> {
        self.structs
            .get(name)
            .map(NamedType::Struct)
            .or_else(|| self.dicts.get(name).map(NamedType::Dict))
    }
}

/// Expands every `[Name]` in `signature`. `member` names the owner of the signature in errors.
pub(crate) fn flatten<T>(types: &T, member: &str, signature: &str) -> Result<String>
where
    T: NamedTypes + ?Sized,
{
    let mut stack = Vec::new();
    flatten_signature(types, member, signature, &mut stack)
}

fn flatten_signature<'t, T>(
    types: &'t T,
    member: &str,
    signature: &str,
    stack: &mut Vec<&'t str>,
) -> Result<String>
where
    T: NamedTypes + ?Sized,
{
    let mut flattened = String::with_capacity(signature.len());
    let mut rest = signature;
    while let Some(start) = rest.find(NAMED_OPEN) {
        flattened.push_str(&rest[..start]);
        let end = rest[start..]
            .find(NAMED_CLOSE)
            .map_or(rest.len(), |end| start + end);
        let name = &rest[start + 1..end];
        let ty = types
            .named_type(name)
            .ok_or_else(|| Error::UnknownNamedType {
                interface: types.interface_name().to_string(),
                member: member.to_string(),
                name: name.to_string(),
            })?;
        flattened.push_str(&flatten_type(types, ty, stack)?);
        rest = rest.get(end + 1..).unwrap_or_default();
    }
    flattened.push_str(rest);

    Ok(flattened)
}

fn flatten_type<'t, T>(types: &'t T, ty: NamedType<'t>, stack: &mut Vec<&'t str>) -> Result<String>
where
    T: NamedTypes + ?Sized,
{
    if stack.contains(&ty.name()) {
        return Err(Error::RecursiveNamedType {
            interface: types.interface_name().to_string(),
            name: ty.name().to_string(),
        });
    }
    stack.push(ty.name());

    let mut flattened = String::new();
    if let NamedType::Dict(_) = ty {
        flattened.push(signature::ARRAY);
    }
    let (open, close) = match ty {
        NamedType::Struct(_) => (signature::STRUCT_OPEN, signature::STRUCT_CLOSE),
        NamedType::Dict(_) => (signature::DICT_OPEN, signature::DICT_CLOSE),
    };
    flattened.push(open);
    for field in ty.fields() {
        flattened.push_str(&flatten_signature(
            types,
            field.name(),
            field.signature(),
            stack,
        )?);
    }
    flattened.push(close);
    stack.pop();

    Ok(flattened)
}

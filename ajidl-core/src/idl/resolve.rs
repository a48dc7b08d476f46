//! Resolution of anonymous structures and dictionaries into declared types.
//!
//! Resolution runs in two phases. Discovery walks every member of the interface and records
//! each distinct anonymous structure and dictionary as a [`Container`], named after the first
//! member that used it. Materialization names the remaining containers, turns every container
//! into a declared type and rewrites member signatures to refer to those types by name.
//!
//! Both phases work on resolver-local state. The interface is only updated once everything
//! succeeded.

use indexmap::IndexMap;

use super::{Container, DeclaredTypes, DictDef, Field, Interface, StructDef};
use crate::{
    signature::{self, DICT_OPEN, NAMED_CLOSE, NAMED_OPEN, STRUCT_OPEN},
    Error, Result, Signature,
};

/// The outcome of resolving an interface.
#[derive(Debug)]
pub(super) struct Resolution {
    /// The declared types, explicit ones and materialized ones, in declaration order.
    pub(super) types: DeclaredTypes,
    /// The new signature of every member, in [`Interface::members`] order.
    pub(super) signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Struct,
    Dict,
}

#[derive(Debug)]
pub(super) struct Resolver<'i> {
    iface: &'i Interface,
    structures: IndexMap<String, Container>,
    dictionaries: IndexMap<String, Container>,
}

impl<'i> Resolver<'i> {
    pub(super) fn new(iface: &'i Interface) -> Self {
        Self {
            iface,
            structures: IndexMap::new(),
            dictionaries: IndexMap::new(),
        }
    }

    pub(super) fn run(mut self) -> Result<Resolution> {
        self.discover()?;
        debug!(
            "interface {}: discovered {} structures and {} dictionaries",
            self.iface.full_name(),
            self.structures.len(),
            self.dictionaries.len(),
        );
        self.name_placeholders();

        self.materialize()
    }

    fn discover(&mut self) -> Result<()> {
        let iface = self.iface;
        for member in iface.members() {
            // Catches references to undeclared or self-containing types.
            member.flattened_signature(iface)?;
            if member.references_named_type() {
                continue;
            }

            let signature = member.signature();
            let kind = if signature.is_structure() {
                Kind::Struct
            } else if signature.is_dictionary() {
                Kind::Dict
            } else {
                continue;
            };
            self.name_and_extract(kind, signature.base(), member.name());
        }

        Ok(())
    }

    fn name_and_extract(&mut self, kind: Kind, base: &str, member: &str) {
        let containers = self.containers_mut(kind);
        if let Some(container) = containers.get_mut(base) {
            if container.name().is_none() {
                container.set_name(member);
                trace!("named container {} after {}", base, member);
            }
            return;
        }

        let container = Container::named(base, member);
        trace!("new container {} named after {}", base, member);
        containers.insert(base.to_string(), container.clone());
        container.extract_structures(&mut self.structures);
        container.extract_dictionaries(&mut self.dictionaries);
    }

    fn containers_mut(&mut self, kind: Kind) -> &mut IndexMap<String, Container> {
        match kind {
            Kind::Struct => &mut self.structures,
            Kind::Dict => &mut self.dictionaries,
        }
    }

    fn containers(&self, kind: Kind) -> &IndexMap<String, Container> {
        match kind {
            Kind::Struct => &self.structures,
            Kind::Dict => &self.dictionaries,
        }
    }

    // Unnamed containers get `<Iface>Unnamed<k>` (structures, first) or `<Iface>UnnamedDict<k>`,
    // in signature order, with one counter for both kinds.
    fn name_placeholders(&mut self) {
        let prefix = self.iface.name().to_string();
        let mut count = 0;
        for (kind, infix) in [(Kind::Struct, "Unnamed"), (Kind::Dict, "UnnamedDict")] {
            let mut unnamed: Vec<_> = self
                .containers_mut(kind)
                .values_mut()
                .filter(|c| c.name().is_none())
                .collect();
            unnamed.sort_by(|a, b| a.signature().cmp(b.signature()));
            for container in unnamed {
                let name = format!("{prefix}{infix}{count}");
                trace!("container {} has no name, using {}", container.signature(), name);
                container.set_placeholder(name);
                count += 1;
            }
        }
    }

    fn materialize(self) -> Result<Resolution> {
        let mut types = self.iface.declared_types().clone();

        for container in self.dictionaries.values() {
            let name = self.declared_name(Kind::Dict, container.signature())?;
            let [key, value] = signature::split_signature(container.signature())[..] else {
                return Err(malformed(container.signature(), "dictionary entry is not a pair"));
            };
            let key = self.resolve_contained(key)?;
            let value = self.resolve_contained(value)?;
            debug!("declaring dict {} {{{}: {}}}", name, key, value);
            types
                .declare_dict(DictDef::new(name, key, value))
                .map_err(|e| clashing(e, container))?;
        }

        for container in self.structures.values() {
            let name = self.declared_name(Kind::Struct, container.signature())?;
            let fields = signature::split_signature(container.signature())
                .into_iter()
                .enumerate()
                .map(|(i, field)| Ok(Field::new(format!("member{i}"), self.resolve_contained(field)?)))
                .collect::<Result<Vec<_>>>()?;
            debug!("declaring struct {} from {}", name, container.signature());
            types
                .declare_struct(StructDef::with_fields(name, fields))
                .map_err(|e| clashing(e, container))?;
        }

        let signatures = self
            .iface
            .members()
            .map(|member| self.resolve_contained(member.signature()))
            .collect::<Result<Vec<_>>>()?;
        types.sort()?;

        Ok(Resolution { types, signatures })
    }

    /// Replaces an anonymous structure or dictionary base signature with a reference to the
    /// type declared for it, keeping the array markers that are not part of the type.
    ///
    /// `aa(ii)` becomes `aa[Point]` while `aa{sv}` becomes `a[Settings]`, since the dictionary
    /// carries its own array marker.
    fn resolve_contained(&self, signature: &str) -> Result<Signature> {
        let mut level = signature::indirection_level(signature);
        let base = signature::base_signature(signature);
        let kind = if base.starts_with(STRUCT_OPEN) {
            Kind::Struct
        } else if base.starts_with(DICT_OPEN) {
            level = level.saturating_sub(1);
            Kind::Dict
        } else {
            return Ok(Signature::from_parts(signature.to_string()));
        };
        let name = self.declared_name(kind, base)?;

        Ok(Signature::from_parts(format!(
            "{}{NAMED_OPEN}{name}{NAMED_CLOSE}",
            &signature[..level]
        )))
    }

    fn declared_name(&self, kind: Kind, base: &str) -> Result<&str> {
        self.containers(kind)
            .get(base)
            .and_then(Container::name)
            .ok_or_else(|| malformed(base, "container was not discovered"))
    }
}

// Records which container a duplicate name was materialized for.
fn clashing(error: Error, container: &Container) -> Error {
    match error {
        Error::DuplicateDeclaredName {
            interface, name, ..
        } => Error::DuplicateDeclaredName {
            interface,
            name,
            signature: Some(container.signature().to_string()),
        },
        e => e,
    }
}

fn malformed(signature: &str, reason: &'static str) -> Error {
    Error::MalformedSignature {
        signature: signature.to_string(),
        offset: 0,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{Access, Arg, Direction, Method, NamedType, NamedTypes, Property, Signal};

    fn sig(s: &str) -> Signature {
        Signature::new(s).unwrap()
    }

    fn method(name: &str, args: &[(&str, &str)]) -> Method {
        Method::new(
            name,
            args.iter()
                .map(|(name, s)| Arg::new(*name, sig(s), Direction::In))
                .collect(),
        )
    }

    fn resolve(iface: &Interface) -> Resolution {
        Resolver::new(iface).run().unwrap()
    }

    #[test_log::test]
    fn discovery_names_after_first_member() {
        let mut iface = Interface::new("org.example.Points").unwrap();
        iface
            .add_method(method("Move", &[("delta", "(ii)")]))
            .unwrap();
        iface
            .add_method(method("Trace", &[("path", "a(ii)"), ("labels", "a{s(ii)}")]))
            .unwrap();

        let mut resolver = Resolver::new(&iface);
        resolver.discover().unwrap();
        assert_eq!(resolver.structures.len(), 1);
        assert_eq!(resolver.structures["(ii)"].name(), Some("delta_ii"));
        assert_eq!(resolver.dictionaries.len(), 1);
        assert_eq!(resolver.dictionaries["{s(ii)}"].name(), Some("labels_s_ii"));
    }

    #[test_log::test]
    fn nested_containers_get_placeholders() {
        let mut iface = Interface::new("org.example.Nest").unwrap();
        iface
            .add_method(method("Put", &[("item", "(s(ii)a{sv}(yy))")]))
            .unwrap();

        let resolution = resolve(&iface);
        let structs: Vec<_> = resolution.types.structs().keys().map(String::as_str).collect();
        // Sorted by flattened length, ties in discovery order.
        assert_eq!(structs, ["NestUnnamed0", "NestUnnamed1", "item_s_iia_sv_yy"]);
        let dicts: Vec<_> = resolution.types.dicts().keys().map(String::as_str).collect();
        assert_eq!(dicts, ["NestUnnamedDict2"]);

        let item = &resolution.types.structs()["item_s_iia_sv_yy"];
        let fields: Vec<_> = item.fields().iter().map(ToString::to_string).collect();
        assert_eq!(
            fields,
            [
                "member0: s",
                "member1: [NestUnnamed0]",
                "member2: [NestUnnamedDict2]",
                "member3: [NestUnnamed1]",
            ]
        );
        assert_eq!(resolution.signatures, [sig("[item_s_iia_sv_yy]")]);
    }

    #[test_log::test]
    fn contained_indirection() {
        let mut iface = Interface::new("org.example.Arrays").unwrap();
        iface
            .add_method(method(
                "Set",
                &[("grid", "aa(ii)"), ("maps", "aa{sv}"), ("table", "a{sa{sv}}")],
            ))
            .unwrap();

        let resolution = resolve(&iface);
        assert_eq!(
            resolution.signatures,
            [sig("aa[grid_ii]"), sig("a[maps_sv]"), sig("[table_sa_sv]")]
        );
        let table = &resolution.types.dicts()["table_sa_sv"];
        assert_eq!(table.key().signature(), "s");
        assert_eq!(table.value().signature(), "[maps_sv]");

        match resolution.types.named_type("maps_sv") {
            Some(NamedType::Dict(d)) => {
                assert_eq!(d.key().signature(), "s");
                assert_eq!(d.value().signature(), "v");
            }
            other => panic!("Expected a dict, got {other:?}"),
        }
    }

    #[test_log::test]
    fn all_member_kinds_take_part() {
        let mut iface = Interface::new("org.example.Kinds").unwrap();
        iface
            .add_signal(Signal::new(
                "Changed",
                vec![Arg::new("state", sig("(bs)"), Direction::Out)],
            ))
            .unwrap();
        iface
            .add_property(Property::new("Limits", sig("(uu)"), Access::Read))
            .unwrap();
        iface
            .add_property(Property::new("State", sig("(bs)"), Access::ReadWrite))
            .unwrap();

        let resolution = resolve(&iface);
        let structs: Vec<_> = resolution.types.structs().keys().map(String::as_str).collect();
        assert_eq!(structs, ["state_bs", "Limits_uu"]);
        assert_eq!(
            resolution.signatures,
            [sig("[state_bs]"), sig("[Limits_uu]"), sig("[state_bs]")]
        );
    }

    #[test_log::test]
    fn placeholder_collision() {
        let mut iface = Interface::new("org.example.Clash").unwrap();
        iface
            .declare_struct(StructDef::with_fields(
                "ClashUnnamed0",
                vec![Field::new("x", sig("i"))],
            ))
            .unwrap();
        iface
            .add_method(method("Put", &[("item", "((ii)s)")]))
            .unwrap();

        match Resolver::new(&iface).run() {
            Err(Error::DuplicateDeclaredName {
                interface,
                name,
                signature,
            }) => {
                assert_eq!(interface, "org.example.Clash");
                assert_eq!(name, "ClashUnnamed0");
                assert_eq!(signature.as_deref(), Some("(ii)"));
            }
            other => panic!("Expected duplicate name error, got {other:?}"),
        }
    }

    #[test_log::test]
    fn dict_collision() {
        let mut iface = Interface::new("org.example.Clash").unwrap();
        iface
            .declare_dict(DictDef::new("options_sv", sig("s"), sig("s")))
            .unwrap();
        iface
            .add_method(method("Set", &[("options", "a{sv}")]))
            .unwrap();

        match Resolver::new(&iface).run() {
            Err(e @ Error::DuplicateDeclaredName { .. }) => {
                assert_eq!(
                    e.to_string(),
                    "Duplicate declared type name 'options_sv' in interface \
                     'org.example.Clash', materialized for '{sv}'"
                );
            }
            other => panic!("Expected duplicate name error, got {other:?}"),
        }
    }

    #[test_log::test]
    fn member_names_become_identifiers() {
        let mut iface = Interface::new("org.example.Names").unwrap();
        iface
            .add_method(method("Move", &[("my-point", "(ii)"), ("2nd", "a{sv}")]))
            .unwrap();

        let resolution = resolve(&iface);
        assert_eq!(resolution.signatures, [sig("[my_point_ii]"), sig("[_2nd_sv]")]);
        for signature in &resolution.signatures {
            Signature::new(signature.as_str()).unwrap();
        }
    }

    #[test_log::test]
    fn unknown_reference() {
        let mut iface = Interface::new("org.example.Refs").unwrap();
        iface
            .add_method(method("Draw", &[("shape", "(i[Circle])")]))
            .unwrap();

        match Resolver::new(&iface).run() {
            Err(Error::UnknownNamedType { member, name, .. }) => {
                assert_eq!(member, "shape");
                assert_eq!(name, "Circle");
            }
            other => panic!("Expected unknown type error, got {other:?}"),
        }
    }
}

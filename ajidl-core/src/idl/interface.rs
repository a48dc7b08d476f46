//! Interface definitions.

use core::fmt;

use heck::ToLowerCamelCase;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::{
    resolve::{Resolution, Resolver},
    Arg, DeclaredTypes, DictDef, Direction, MemberKind, Method, NamedType, NamedTypes, Property,
    Signal, StructDef, TypeView, TypedMember,
};
use crate::{Error, Result, Signature};

/// A bus interface: methods, signals and properties, plus the structures and dictionaries their
/// types are built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    /// The full dotted name, e.g. `org.example.Points`.
    #[serde(rename = "name")]
    full_name: String,
    is_secure: bool,
    methods: Vec<Method>,
    signals: Vec<Signal>,
    properties: Vec<Property>,
    #[serde(flatten)]
    types: DeclaredTypes,
}

impl Interface {
    /// Creates an empty interface.
    ///
    /// The name must have at least two dot-separated elements, each made of ASCII letters,
    /// digits and underscores and not starting with a digit.
    pub fn new(full_name: impl Into<String>) -> Result<Self> {
        let full_name = full_name.into();
        if !is_valid_name(&full_name) {
            return Err(Error::InvalidName(full_name));
        }

        Ok(Self {
            types: DeclaredTypes::new(full_name.clone()),
            full_name,
            is_secure: false,
            methods: Vec::new(),
            signals: Vec::new(),
            properties: Vec::new(),
        })
    }

    /// The full dotted name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The last element of the full name: `Points` for `org.example.Points`.
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }

    /// Everything before the last element: `org.example` for `org.example.Points`.
    pub fn path(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or("", |(path, _)| path)
    }

    /// The full name usable as an identifier: `org_example_Points`.
    pub fn coded_name(&self) -> String {
        self.full_name.replace('.', "_")
    }

    /// The full name in lower camel case: `orgExamplePoints`.
    pub fn camel_case_name(&self) -> String {
        self.full_name.to_lower_camel_case()
    }

    /// Marks every member of the interface as requiring a secure session.
    pub fn set_secure(&mut self, is_secure: bool) {
        self.is_secure = is_secure;
    }

    /// Whether the interface requires a secure session.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    /// Adds a method. Its name must be unique among the methods, and its argument names among
    /// its arguments.
    pub fn add_method(&mut self, method: Method) -> Result<()> {
        self.check_unique(
            MemberKind::Method,
            method.name(),
            self.methods.iter().map(Method::name),
        )?;
        self.check_args(method.name(), method.args())?;
        self.methods.push(method);

        Ok(())
    }

    /// Adds a signal. Its name must be unique among the signals, and its argument names among
    /// its arguments.
    pub fn add_signal(&mut self, signal: Signal) -> Result<()> {
        self.check_unique(
            MemberKind::Signal,
            signal.name(),
            self.signals.iter().map(Signal::name),
        )?;
        self.check_args(signal.name(), signal.args())?;
        self.signals.push(signal);

        Ok(())
    }

    /// Adds a property. Its name must be unique among the properties.
    pub fn add_property(&mut self, property: Property) -> Result<()> {
        self.check_unique(
            MemberKind::Property,
            property.name(),
            self.properties.iter().map(Property::name),
        )?;
        self.properties.push(property);

        Ok(())
    }

    fn check_unique<'n>(
        &self,
        kind: MemberKind,
        name: &str,
        mut existing: impl Iterator<Item = &'n str>,
    ) -> Result<()> {
        if existing.any(|n| n == name) {
            return Err(Error::DuplicateMember {
                scope: self.full_name.clone(),
                kind,
                name: name.to_string(),
            });
        }

        Ok(())
    }

    fn check_args(&self, member: &str, args: &[Arg]) -> Result<()> {
        let mut names = IndexSet::new();
        for arg in args {
            if !names.insert(arg.name()) {
                return Err(Error::DuplicateMember {
                    scope: format!("{}.{member}", self.full_name),
                    kind: MemberKind::Argument,
                    name: arg.name().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Returns the methods.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the signals.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Returns the properties.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the method with the given name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Returns the signal with the given name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name() == name)
    }

    /// Returns the property with the given name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Whether the interface has at least one readable property.
    pub fn has_read_properties(&self) -> bool {
        self.properties.iter().any(Property::is_readable)
    }

    /// Whether the interface has at least one writable property.
    pub fn has_write_properties(&self) -> bool {
        self.properties.iter().any(Property::is_writable)
    }

    /// The concatenated signature of the `direction` arguments of the method or signal called
    /// `member`, as marshalled on the wire. Methods are looked up first.
    pub fn arg_signature(&self, member: &str, direction: Direction) -> Option<Signature> {
        if let Some(method) = self.method(member) {
            return Some(method.signature(direction));
        }
        let signal = self.signal(member)?;

        Some(match direction {
            Direction::Out => signal.signature(),
            Direction::In => Signature::default(),
        })
    }

    /// Every typed member: method arguments, then signal arguments, then property values, each
    /// in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &TypedMember> {
        let method_args = self.methods.iter().flat_map(|m| m.args().iter().map(Arg::member));
        let signal_args = self.signals.iter().flat_map(|s| s.args().iter().map(Arg::member));
        let values = self.properties.iter().map(Property::value);

        method_args.chain(signal_args).chain(values)
    }

    fn members_mut(&mut self) -> impl Iterator<Item = &mut TypedMember> {
        let method_args = self
            .methods
            .iter_mut()
            .flat_map(|m| m.args_mut().iter_mut().map(Arg::member_mut));
        let signal_args = self
            .signals
            .iter_mut()
            .flat_map(|s| s.args_mut().iter_mut().map(Arg::member_mut));
        let values = self.properties.iter_mut().map(Property::value_mut);

        method_args.chain(signal_args).chain(values)
    }

    /// Declares a structure explicitly.
    pub fn declare_struct(&mut self, s: StructDef) -> Result<()> {
        self.types.declare_struct(s)
    }

    /// Declares a dictionary explicitly. Its key must be a basic type.
    pub fn declare_dict(&mut self, d: DictDef) -> Result<()> {
        self.types.declare_dict(d)
    }

    /// All declared types of the interface.
    pub fn declared_types(&self) -> &DeclaredTypes {
        &self.types
    }

    /// The declared structures, shortest flattened signature first once resolved.
    pub fn declared_structs(&self) -> &IndexMap<String, StructDef> {
        self.types.structs()
    }

    /// The declared dictionaries, shortest flattened signature first once resolved.
    pub fn declared_dicts(&self) -> &IndexMap<String, DictDef> {
        self.types.dicts()
    }

    /// The names of all declared types.
    pub fn declared_names(&self) -> &IndexSet<String> {
        self.types.names()
    }

    /// See [`DeclaredTypes::declarations`].
    pub fn declarations(&self) -> Result<Vec<NamedType<'_>>> {
        self.types.declarations()
    }

    /// Turns every anonymous structure and dictionary used by a member into a declared type
    /// and rewrites member signatures to refer to them.
    ///
    /// On error the interface is left as it was.
    pub fn resolve(&mut self) -> Result<()> {
        let Resolution { types, signatures } = Resolver::new(self).run()?;
        for (member, signature) in self.members_mut().zip(signatures) {
            member.set_signature(signature);
        }
        self.types = types;

        Ok(())
    }

    /// The flattened signature of `member`, looked up in this interface's declared types.
    pub fn flattened_signature(&self, member: &TypedMember) -> Result<Signature> {
        member.flattened_signature(self)
    }

    /// Structural queries on `member`, looked up in this interface's declared types.
    pub fn view<'a>(&'a self, member: &'a TypedMember) -> Result<TypeView<'a>> {
        member.view(self)
    }
}

impl NamedTypes for Interface {
    fn interface_name(&self) -> &str {
        &self.full_name
    }

    fn named_type(&self, name: &str) -> Option<NamedType<'_>> {
        self.types.named_type(name)
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interface {}", self.full_name)?;
        for s in self.types.structs().values() {
            write!(f, "\n\n{s}")?;
        }
        for d in self.types.dicts().values() {
            write!(f, "\n\n{d}")?;
        }
        for method in &self.methods {
            write!(f, "\n\n{method}")?;
        }
        for signal in &self.signals {
            write!(f, "\n\n{signal}")?;
        }
        for property in &self.properties {
            write!(f, "\n\n{property}")?;
        }

        Ok(())
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut elements = 0;
    for element in name.split('.') {
        let mut chars = element.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return false;
        }
        elements += 1;
    }

    elements >= 2 && name.len() <= 255
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{Access, Field};

    fn sig(s: &str) -> Signature {
        Signature::new(s).unwrap()
    }

    fn method(name: &str, args: &[(&str, &str, Direction)]) -> Method {
        Method::new(
            name,
            args.iter()
                .map(|(name, s, direction)| Arg::new(*name, sig(s), *direction))
                .collect(),
        )
    }

    #[test]
    fn names() {
        let iface = Interface::new("org.example.Points").unwrap();
        assert_eq!(iface.full_name(), "org.example.Points");
        assert_eq!(iface.name(), "Points");
        assert_eq!(iface.path(), "org.example");
        assert_eq!(iface.coded_name(), "org_example_Points");
        assert_eq!(iface.camel_case_name(), "orgExamplePoints");

        for invalid in ["Points", "org..Points", "org.9lives", ".org.example", "org.ex-ample", ""] {
            match Interface::new(invalid) {
                Err(Error::InvalidName(name)) => assert_eq!(name, invalid),
                other => panic!("`{invalid}` should be rejected, got {other:?}"),
            }
        }
        Interface::new("a_.b9").unwrap();
    }

    #[test]
    fn duplicate_members() {
        let mut iface = Interface::new("org.example.Dup").unwrap();
        iface.add_method(method("Get", &[])).unwrap();
        // Different kinds live in different scopes.
        iface.add_signal(Signal::new("Get", vec![])).unwrap();

        match iface.add_method(method("Get", &[])) {
            Err(Error::DuplicateMember { scope, kind, name }) => {
                assert_eq!(scope, "org.example.Dup");
                assert_eq!(kind, MemberKind::Method);
                assert_eq!(name, "Get");
            }
            other => panic!("Expected duplicate method, got {other:?}"),
        }

        let twice = method("Set", &[("v", "i", Direction::In), ("v", "s", Direction::Out)]);
        match iface.add_method(twice) {
            Err(Error::DuplicateMember { scope, kind, name }) => {
                assert_eq!(scope, "org.example.Dup.Set");
                assert_eq!(kind, MemberKind::Argument);
                assert_eq!(name, "v");
            }
            other => panic!("Expected duplicate argument, got {other:?}"),
        }
        assert_eq!(iface.methods().len(), 1);

        let prop = Property::new("Level", sig("u"), Access::Read);
        iface.add_property(prop.clone()).unwrap();
        assert!(iface.add_property(prop).is_err());
    }

    #[test]
    fn property_and_array_share_struct() {
        let mut iface = Interface::new("org.example.Points").unwrap();
        iface
            .add_property(Property::new("Origin", sig("(ii)"), Access::Read))
            .unwrap();
        iface
            .add_method(method("Trace", &[("path", "a(ii)", Direction::In)]))
            .unwrap();
        iface.resolve().unwrap();

        assert_eq!(iface.declared_structs().len(), 1);
        assert!(iface.declared_dicts().is_empty());
        // Method arguments are discovered before properties.
        let point = &iface.declared_structs()["path_ii"];
        let fields: Vec<_> = point.fields().iter().map(ToString::to_string).collect();
        assert_eq!(fields, ["member0: i", "member1: i"]);

        assert_eq!(iface.property("Origin").unwrap().value().signature(), "[path_ii]");
        assert_eq!(iface.method("Trace").unwrap().args()[0].signature(), "a[path_ii]");
    }

    #[test]
    fn shared_identity_across_methods() {
        let mut iface = Interface::new("org.example.Shared").unwrap();
        iface
            .add_method(method("First", &[("settings", "a{sv}", Direction::In)]))
            .unwrap();
        iface
            .add_method(method("Second", &[("options", "a{sv}", Direction::Out)]))
            .unwrap();
        iface.resolve().unwrap();

        let first = iface.method("First").unwrap().args()[0].signature();
        let second = iface.method("Second").unwrap().args()[0].signature();
        assert_eq!(first, second);
        assert_eq!(first, "[settings_sv]");
        assert_eq!(iface.declared_dicts().len(), 1);
    }

    #[test]
    fn placeholder_names() {
        let mut iface = Interface::new("org.example.Deep").unwrap();
        iface
            .add_method(method("Put", &[("entry", "(a{s(yy)}(bb))", Direction::In)]))
            .unwrap();
        iface.resolve().unwrap();

        let mut names: Vec<_> = iface.declared_names().iter().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            ["DeepUnnamed0", "DeepUnnamed1", "DeepUnnamedDict2", "entry_a_s_yy_bb"]
        );
        assert_eq!(
            iface.declared_names().len(),
            iface.declared_structs().len() + iface.declared_dicts().len()
        );
    }

    #[test]
    fn failed_resolution_leaves_interface_untouched() {
        let mut iface = Interface::new("org.example.Clash").unwrap();
        iface
            .declare_dict(DictDef::new("item_ii", sig("s"), sig("s")))
            .unwrap();
        iface
            .add_method(method("Put", &[("item", "(ii)", Direction::In)]))
            .unwrap();
        let before = iface.clone();

        match iface.resolve() {
            Err(Error::DuplicateDeclaredName { name, .. }) => assert_eq!(name, "item_ii"),
            other => panic!("Expected duplicate name error, got {other:?}"),
        }
        assert_eq!(iface, before);
    }

    #[test]
    fn flattening_round_trip() {
        let literals = [
            ("a", "(i(ss)a{ya{sv}})"),
            ("b", "aa(ii)"),
            ("c", "aa{s(ii)}"),
            ("d", "a{sa{sv}}"),
            ("e", "(ia(ii))"),
            ("f", "(d[Point])"),
        ];
        let mut iface = Interface::new("org.example.Round").unwrap();
        iface
            .declare_struct(StructDef::with_fields(
                "Point",
                vec![Field::new("x", sig("i")), Field::new("y", sig("i"))],
            ))
            .unwrap();
        let args = literals
            .iter()
            .map(|(name, s)| (*name, *s, Direction::In))
            .collect::<Vec<_>>();
        iface.add_method(method("Everything", &args)).unwrap();
        iface.resolve().unwrap();

        let method = iface.method("Everything").unwrap();
        for ((_, literal), arg) in literals.iter().zip(method.args()) {
            assert!(arg.references_named_type(), "{arg}");
            let flattened = iface.flattened_signature(arg).unwrap();
            assert!(!flattened.contains('['), "{arg}");
            let expected = literal.replace("[Point]", "(ii)");
            assert_eq!(flattened, expected.as_str());
        }

        // Dependencies come first.
        let declarations = iface.declarations().unwrap();
        let point = declarations.iter().position(|t| t.name() == "Point").unwrap();
        let f = declarations.iter().position(|t| t.name() == "f_d_Point").unwrap();
        assert!(point < f);
    }

    #[test]
    fn view_through_interface() {
        let mut iface = Interface::new("org.example.View").unwrap();
        iface
            .add_method(method("Get", &[("table", "aa{sa(ii)}", Direction::Out)]))
            .unwrap();
        iface.resolve().unwrap();

        let arg = &iface.method("Get").unwrap().args()[0];
        let view = iface.view(arg).unwrap();
        assert_eq!(view.base_signature(), "[table_sa_ii]");
        assert!(view.is_dictionary_array());
        assert_eq!(view.indirection_level(), 2);
        assert_eq!(view.max_array_dimension(), 2);
        assert_eq!(view.max_structure_depth(), 1);
        assert_eq!(view.max_dictionary_depth(), 1);
        assert!(matches!(view.named_type(), Some(NamedType::Dict(_))));
    }

    #[test]
    fn arg_signatures() {
        let mut iface = Interface::new("org.example.Sigs").unwrap();
        iface
            .add_method(method(
                "Call",
                &[
                    ("a", "i", Direction::In),
                    ("b", "s", Direction::Out),
                    ("c", "ay", Direction::In),
                ],
            ))
            .unwrap();
        iface
            .add_signal(Signal::new(
                "Fired",
                vec![Arg::new("when", sig("t"), Direction::Out)],
            ))
            .unwrap();
        iface
            .add_property(Property::new("Mode", sig("y"), Access::Write))
            .unwrap();

        assert_eq!(iface.arg_signature("Call", Direction::In).unwrap(), "iay");
        assert_eq!(iface.arg_signature("Call", Direction::Out).unwrap(), "s");
        assert_eq!(iface.arg_signature("Fired", Direction::Out).unwrap(), "t");
        assert!(iface.arg_signature("Missing", Direction::In).is_none());
        assert!(!iface.has_read_properties());
        assert!(iface.has_write_properties());
    }

    #[test]
    fn display() {
        let mut iface = Interface::new("org.example.Points").unwrap();
        iface
            .add_method(method(
                "Nearest",
                &[("to", "(ii)", Direction::In), ("found", "b", Direction::Out)],
            ))
            .unwrap();
        iface.resolve().unwrap();

        assert_eq!(
            iface.to_string(),
            "interface org.example.Points\n\n\
             struct to_ii (member0: i, member1: i)\n\n\
             method Nearest(to: [to_ii]) -> (found: b)"
        );
    }
}

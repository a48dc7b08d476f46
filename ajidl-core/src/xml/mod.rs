//! Reader for introspection XML documents.
//!
//! A document is a tree of `<node>` elements holding `<interface>` elements. Every interface is
//! read into an [`Interface`] and resolved before it is added to the [`Document`].

use indexmap::IndexMap;
use roxmltree::Node;
use serde::Serialize;

use crate::{
    idl::{Access, Arg, DictDef, Direction, Field, Method, Property, Signal, StructDef},
    signature, Error, Interface, Result, Signature,
};

/// Interfaces every bus object implements; they are never generated.
const BUILT_IN_INTERFACES: [&str; 4] = [
    "org.freedesktop.DBus.Peer",
    "org.freedesktop.DBus.Introspectable",
    "org.freedesktop.DBus.Properties",
    "org.freedesktop.DBus.ObjectManager",
];

const IS_SECURE: &str = "org.alljoyn.Bus.Item.IsSecure";
const NO_REPLY: &str = "org.freedesktop.DBus.Method.NoReply";
const VARIANT_TYPES: &str = "org.alljoyn.Bus.Arg.VariantTypes";

/// Options controlling how a document is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Give unnamed method and signal arguments a generated name instead of rejecting them.
    ///
    /// The name is `<member><Method|Signal>Arg<n>_<clean signature>`, e.g. `GetMethodArg0_s`.
    pub lax_naming: bool,
    /// The object path of the root node. If the root `<node>` has a `name` too, both must
    /// agree.
    pub object_path: Option<String>,
}

/// A parsed and resolved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    object_path: String,
    interfaces: IndexMap<String, Interface>,
}

impl Document {
    /// The object path of the root node.
    pub fn object_path(&self) -> &str {
        &self.object_path
    }

    /// The interfaces, by full name, in document order.
    pub fn interfaces(&self) -> &IndexMap<String, Interface> {
        &self.interfaces
    }

    /// The interface with the given full name.
    pub fn interface(&self, full_name: &str) -> Option<&Interface> {
        self.interfaces.get(full_name)
    }

    /// Consumes the document, returning its interfaces.
    pub fn into_interfaces(self) -> IndexMap<String, Interface> {
        self.interfaces
    }
}

/// Parses an introspection XML document and resolves every interface in it.
pub fn parse_document(text: &str, options: &ReaderOptions) -> Result<Document> {
    let doc = roxmltree::Document::parse(text)?;
    let reader = Reader { doc: &doc, options };
    let root = doc.root_element();
    if root.tag_name().name() != "node" {
        return Err(reader.invalid(root, "Root element must be a 'node'"));
    }

    let object_path = match (root.attribute("name"), options.object_path.as_deref()) {
        (Some(xml), Some(given)) if xml != given => {
            return Err(reader.invalid(
                root,
                format!("Object path '{given}' does not match the document's '{xml}'"),
            ));
        }
        (_, Some(path)) | (Some(path), None) => path.to_string(),
        (None, None) => {
            return Err(reader.invalid(
                root,
                "Object path specified neither in the document nor in the options",
            ))
        }
    };

    let mut interfaces = IndexMap::new();
    reader.read_node(root, &mut interfaces)?;

    Ok(Document {
        object_path,
        interfaces,
    })
}

struct Reader<'d, 'input> {
    doc: &'d roxmltree::Document<'input>,
    options: &'d ReaderOptions,
}

impl<'d, 'input> Reader<'d, 'input> {
    fn read_node(
        &self,
        node: Node<'d, 'input>,
        interfaces: &mut IndexMap<String, Interface>,
    ) -> Result<()> {
        let mut children = 0;
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "interface" => {
                    children += 1;
                    let name = self.required(child, "name")?;
                    if BUILT_IN_INTERFACES.contains(&name) {
                        warn!("Ignoring built-in interface {}", name);
                        continue;
                    }

                    let iface = self.read_interface(child, name)?;
                    match interfaces.get(name) {
                        Some(existing) if *existing != iface => {
                            return Err(self.invalid(
                                child,
                                format!("Interface '{name}' is defined twice, differently"),
                            ));
                        }
                        Some(_) => (),
                        None => {
                            interfaces.insert(name.to_string(), iface);
                        }
                    }
                }
                "node" => {
                    children += 1;
                    self.read_node(child, interfaces)?;
                }
                other => self.ignore(child, other),
            }
        }

        if children == 0 {
            return Err(self.invalid(node, "Child interfaces and/or nodes expected"));
        }

        Ok(())
    }

    fn read_interface(&self, node: Node<'d, 'input>, name: &str) -> Result<Interface> {
        let mut iface = Interface::new(name).map_err(|e| self.located(node, e))?;
        let annotations = self.annotations(node)?;
        iface.set_secure(annotations.is_secure.unwrap_or(false));

        let mut members = 0;
        for child in node.children().filter(Node::is_element) {
            let added = match child.tag_name().name() {
                "method" => {
                    members += 1;
                    self.read_method(child)
                        .and_then(|method| iface.add_method(method))
                }
                "signal" => {
                    members += 1;
                    self.read_signal(child)
                        .and_then(|signal| iface.add_signal(signal))
                }
                "property" => {
                    members += 1;
                    self.read_property(child)
                        .and_then(|property| iface.add_property(property))
                }
                "struct" => self.read_struct(child).and_then(|s| iface.declare_struct(s)),
                "dict" => self.read_dict(child).and_then(|d| iface.declare_dict(d)),
                "annotation" => Ok(()),
                other => {
                    self.ignore(child, other);
                    Ok(())
                }
            };
            added.map_err(|e| self.located(child, e))?;
        }

        if members == 0 {
            return Err(self.invalid(
                node,
                format!("Incompletely specified interface '{name}'"),
            ));
        }

        iface.resolve()?;
        debug!(
            "Resolved interface {} with {} declared types",
            iface.full_name(),
            iface.declared_names().len()
        );

        Ok(iface)
    }

    fn read_method(&self, node: Node<'d, 'input>) -> Result<Method> {
        let name = self.required(node, "name")?;
        let args = self.read_args(node, name, "Method", Direction::In)?;
        let annotations = self.annotations(node)?;
        let mut method = Method::new(name, args);
        method.set_no_reply(annotations.no_reply.unwrap_or(false));
        method.set_secure(annotations.is_secure.unwrap_or(false));

        Ok(method)
    }

    fn read_signal(&self, node: Node<'d, 'input>) -> Result<Signal> {
        let name = self.required(node, "name")?;
        let args = self.read_args(node, name, "Signal", Direction::Out)?;
        if let Some(arg) = args.iter().find(|arg| arg.direction() != Direction::Out) {
            return Err(self.invalid(
                node,
                format!("Signal argument '{}' must have a direction of 'out'", arg.name()),
            ));
        }
        let annotations = self.annotations(node)?;
        let mut signal = Signal::new(name, args);
        signal.set_secure(annotations.is_secure.unwrap_or(false));

        Ok(signal)
    }

    fn read_args(
        &self,
        node: Node<'d, 'input>,
        member: &str,
        member_kind: &str,
        default_direction: Direction,
    ) -> Result<Vec<Arg>> {
        let mut args = Vec::new();
        for (i, child) in node
            .children()
            .filter(|n| n.has_tag_name("arg"))
            .enumerate()
        {
            let signature = self.member_type(child)?;
            let name = match child.attribute("name") {
                Some(name) if !name.is_empty() => name.to_string(),
                _ if self.options.lax_naming => format!(
                    "{member}{member_kind}Arg{i}_{}",
                    signature::clean_name(&signature)
                ),
                _ => {
                    return Err(self.invalid(
                        child,
                        format!("Argument {i} of '{member}' has no name"),
                    ))
                }
            };
            let direction = match child.attribute("direction") {
                Some(direction) => direction.parse::<Direction>().map_err(|_| {
                    self.invalid(child, format!("Invalid argument direction '{direction}'"))
                })?,
                None => default_direction,
            };

            let mut arg = Arg::new(name, signature, direction);
            if let Some(variant_type) = self.annotations(child)?.variant_type {
                arg = arg.with_variant_type(variant_type);
            }
            args.push(arg);
        }

        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "arg" | "annotation" => (),
                other => self.ignore(child, other),
            }
        }

        Ok(args)
    }

    fn read_property(&self, node: Node<'d, 'input>) -> Result<Property> {
        let name = self.required(node, "name")?;
        let signature = self.member_type(node)?;
        let access = self.required(node, "access")?;
        let access: Access = access.parse().map_err(|_| {
            self.invalid(node, format!("Invalid property access '{access}'"))
        })?;
        let annotations = self.annotations(node)?;
        let mut property = Property::new(name, signature, access);
        property.set_secure(annotations.is_secure.unwrap_or(false));

        Ok(property)
    }

    fn read_struct(&self, node: Node<'d, 'input>) -> Result<StructDef> {
        let mut s = StructDef::new(self.required(node, "name")?);
        for child in node.children().filter(Node::is_element) {
            if !child.has_tag_name("field") {
                self.ignore(child, child.tag_name().name());
                continue;
            }
            let field = Field::new(self.required(child, "name")?, self.member_type(child)?);
            s.add_field(field).map_err(|e| self.located(child, e))?;
        }

        Ok(s)
    }

    fn read_dict(&self, node: Node<'d, 'input>) -> Result<DictDef> {
        let name = self.required(node, "name")?;
        let mut key = None;
        let mut value = None;
        for child in node.children().filter(Node::is_element) {
            let slot = match child.tag_name().name() {
                "key" => &mut key,
                "value" => &mut value,
                other => {
                    self.ignore(child, other);
                    continue;
                }
            };
            if slot.is_some() {
                return Err(self.invalid(
                    child,
                    format!("Duplicate {} definition in dict '{name}'", child.tag_name().name()),
                ));
            }
            *slot = Some(self.member_type(child)?);
        }

        match (key, value) {
            (Some(key), Some(value)) => Ok(DictDef::new(name, key, value)),
            (None, _) => Err(self.invalid(node, format!("Dict '{name}' has no key definition"))),
            (_, None) => Err(self.invalid(node, format!("Dict '{name}' has no value definition"))),
        }
    }

    // The `type` attribute of an argument, property, field, key or value: exactly one type.
    fn member_type(&self, node: Node<'d, 'input>) -> Result<Signature> {
        let text = self.required(node, "type")?;
        let signature = Signature::new(text).map_err(|e| self.located(node, e))?;
        if !signature.is_single_type() {
            return Err(self.invalid(node, format!("Type '{text}' is not a single complete type")));
        }

        Ok(signature)
    }

    fn annotations(&self, node: Node<'d, 'input>) -> Result<Annotations> {
        let mut annotations = Annotations::default();
        for child in node.children().filter(|n| n.has_tag_name("annotation")) {
            let name = self.required(child, "name")?;
            let value = child.attribute("value").ok_or_else(|| {
                self.invalid(
                    child,
                    format!("Annotation '{name}' is required to have a 'value'"),
                )
            })?;
            match name {
                IS_SECURE => annotations.is_secure = Some(self.boolean(child, name, value)?),
                NO_REPLY => annotations.no_reply = Some(self.boolean(child, name, value)?),
                VARIANT_TYPES => {
                    let signature =
                        Signature::new(value).map_err(|e| self.located(child, e))?;
                    annotations.variant_type = Some(signature);
                }
                _ => {
                    let (row, col) = self.position(child);
                    warn!("Ignoring annotation {} (line {}, column {})", name, row, col);
                }
            }
        }

        Ok(annotations)
    }

    fn boolean(&self, node: Node<'d, 'input>, name: &str, value: &str) -> Result<bool> {
        match value {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.invalid(
                node,
                format!("Unexpected value '{value}' for {name}, expected 'true' or 'false'"),
            )),
        }
    }

    fn required(&self, node: Node<'d, 'input>, attribute: &str) -> Result<&'d str> {
        node.attribute(attribute).ok_or_else(|| {
            self.invalid(
                node,
                format!(
                    "Element '{}' is missing the '{attribute}' attribute",
                    node.tag_name().name()
                ),
            )
        })
    }

    fn ignore(&self, node: Node<'d, 'input>, tag: &str) {
        let (row, col) = self.position(node);
        warn!("Ignoring element {} (line {}, column {})", tag, row, col);
    }

    fn position(&self, node: Node<'d, 'input>) -> (u32, u32) {
        let pos = self.doc.text_pos_at(node.range().start);

        (pos.row, pos.col)
    }

    fn invalid(&self, node: Node<'d, 'input>, message: impl Into<String>) -> Error {
        let (line, column) = self.position(node);

        Error::InvalidXml {
            message: message.into(),
            line,
            column,
        }
    }

    // Attaches the position of `node` to a model error. Errors that already carry one pass
    // through.
    fn located(&self, node: Node<'d, 'input>, error: Error) -> Error {
        match error {
            e @ (Error::InvalidXml { .. } | Error::Xml(_)) => e,
            e => self.invalid(node, e.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct Annotations {
    is_secure: Option<bool>,
    no_reply: Option<bool>,
    variant_type: Option<Signature>,
}

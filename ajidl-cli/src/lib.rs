//! Rendering of resolved interfaces for the `ajidl` tool.

use std::fmt::Write;

use ajidl_core::{idl::NamedType, xml::Document, Interface};
use anyhow::{Context, Result};
use heck::ToSnakeCase;

/// Renders a whole document as a textual listing.
pub fn render_document(doc: &Document) -> Result<String> {
    let mut output = String::new();
    writeln!(&mut output, "object {}", doc.object_path())?;

    for iface in doc.interfaces().values() {
        let listing = render_interface(iface)
            .with_context(|| format!("Failed to render interface: {}", iface.full_name()))?;
        write!(&mut output, "\n{listing}")?;
    }

    Ok(output)
}

/// Renders one interface as a textual listing.
///
/// Declared types come first, dependencies before dependents, each followed by its flattened
/// signature.
pub fn render_interface(iface: &Interface) -> Result<String> {
    let mut output = String::new();
    write!(&mut output, "interface {}", iface.full_name())?;
    if iface.is_secure() {
        write!(&mut output, " (secure)")?;
    }
    writeln!(&mut output)?;

    for ty in iface.declarations()? {
        let flattened = ty.flattened_signature(iface)?;
        match ty {
            NamedType::Struct(s) => writeln!(&mut output, "\n{s}")?,
            NamedType::Dict(d) => writeln!(&mut output, "\n{d}")?,
        }
        writeln!(&mut output, "  # {flattened}")?;
    }

    for method in iface.methods() {
        write!(&mut output, "\n{method}")?;
        if method.no_reply() {
            write!(&mut output, " (no reply)")?;
        }
        writeln!(&mut output)?;
    }
    for signal in iface.signals() {
        writeln!(&mut output, "\n{signal}")?;
    }
    for property in iface.properties() {
        writeln!(&mut output, "\n{property}")?;
    }

    Ok(output)
}

/// Renders a document as pretty-printed JSON.
pub fn render_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// File name for an interface's output: `org.example.FooBar` gives `foo_bar`.
pub fn interface_to_filename(full_name: &str) -> String {
    full_name
        .split('.')
        .next_back()
        .unwrap_or(full_name)
        .to_snake_case()
}

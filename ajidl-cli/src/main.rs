use ajidl_cli::{interface_to_filename, render_document, render_interface, render_json};
use ajidl_core::xml::{self, ReaderOptions};
use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs,
    io::{self, Write},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let content = fs::read_to_string(&args.xml_file)
        .with_context(|| format!("Failed to read file: {}", args.xml_file.display()))?;
    let options = ReaderOptions {
        lax_naming: args.lax_naming,
        object_path: args.object_path,
    };
    let doc = xml::parse_document(&content, &options)
        .with_context(|| format!("Failed to parse interfaces from: {}", args.xml_file.display()))?;
    info!(
        "Resolved {} interfaces from {}",
        doc.interfaces().len(),
        args.xml_file.display()
    );

    if let Some(output_path) = args.output {
        // Single output file.
        let output = if args.json {
            render_json(&doc)?
        } else {
            render_document(&doc)?
        };
        fs::write(&output_path, output)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

        println!("Resolved model written to {}", output_path.display());
    } else if args.multiple_files {
        let extension = if args.json { "json" } else { "txt" };
        for iface in doc.interfaces().values() {
            let output = if args.json {
                render_json(iface)?
            } else {
                render_interface(iface)?
            };
            let output_path = format!(
                "{}.{extension}",
                interface_to_filename(iface.full_name())
            );
            fs::write(&output_path, output)
                .with_context(|| format!("Failed to write output file: {}", output_path))?;

            println!(
                "Resolved `{}` written to {}",
                iface.full_name(),
                output_path
            );
        }
    } else {
        let output = if args.json {
            render_json(&doc)?
        } else {
            render_document(&doc)?
        };
        io::stdout().write_all(output.as_bytes())?;
    }

    Ok(())
}

use clap::Parser;
use std::path::PathBuf;

/// Resolve the anonymous structures and dictionaries of a bus introspection XML file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input introspection XML file.
    #[arg(value_name = "XML_FILE")]
    pub xml_file: PathBuf,

    /// Object path of the root node. Must match the root node's name if it has one.
    #[arg(short = 'b', long)]
    pub object_path: Option<String>,

    /// Generate names for unnamed method and signal arguments instead of rejecting them.
    #[arg(short, long)]
    pub lax_naming: bool,

    /// Output file path (defaults to stdout if not specified).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one file per interface into the current directory (ignored if --output is
    /// specified).
    #[arg(short = 'm', long)]
    pub multiple_files: bool,

    /// Emit the resolved model as JSON.
    #[arg(long)]
    pub json: bool,

    /// Log what the resolver does.
    #[arg(short, long)]
    pub verbose: bool,
}

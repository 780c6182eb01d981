//! Debug script to see the wire schema derived for an interface.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use wirework_compiler::ir::ServiceInterfaceDescriptor;
use wirework_compiler::schema::RenderOptions;
use wirework_compiler::{BuildConfig, CompilerError, ParsedModuleSet, SchemaRegistry};

/// Derive and print the RPC wire schema of one service interface.
#[derive(Parser, Debug)]
#[command(name = "derive_schema")]
#[command(about = "Derive the wire schema of a service interface")]
struct Args {
    /// Parsed-source model (JSON)
    #[arg(value_name = "MODEL")]
    model: PathBuf,

    /// Service interface description (JSON)
    #[arg(value_name = "INTERFACE")]
    interface: PathBuf,

    /// Build configuration (JSON); defaults apply when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(model: &Path, interface: &Path, config: Option<&Path>) -> Result<String, CompilerError> {
    let source = ParsedModuleSet::load(model)?;
    let iface = ServiceInterfaceDescriptor::load(interface)?;
    let config = match config {
        Some(path) => BuildConfig::load(path)?,
        None => BuildConfig::default(),
    };

    let mut registry = SchemaRegistry::new();
    let schema = registry.derive(&source, &iface)?;
    let options = RenderOptions::new(config.output_package, config.schema_extension);

    println!("// {}", options.output_path(&schema.name));
    Ok(registry.render(&schema, &options))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _ = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .try_init();

    match run(&args.model, &args.interface, args.config.as_deref()) {
        Ok(document) => {
            print!("{}", document);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}

//! Templar CLI
//!
//! Usage:
//!   templar [OPTIONS] <MANIFEST>
//!
//! Options:
//!   -c, --config <FILE>    Compiler configuration (TOML format)
//!   -o, --out-dir <DIR>    Write one file per component instead of stdout
//!   -e, --emit <KIND>      What to emit: source, compiled, descriptor
//!   -v, --verbose          Raise log verbosity (repeatable)
//!   -h, --help             Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use templar::{compile_manifest, CompiledComponent, CompilerConfig, Manifest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Resource unit with typed accessors
    Source,
    /// Compiled view as JSON
    Compiled,
    /// Build-time descriptor as JSON
    Descriptor,
}

impl Emit {
    fn extension(self) -> &'static str {
        match self {
            Emit::Source => "java",
            Emit::Compiled => "template.json",
            Emit::Descriptor => "descriptor.json",
        }
    }
}

#[derive(Parser)]
#[command(name = "templar")]
#[command(about = "Compile component templates into accessors and runtime views")]
struct Cli {
    /// Component manifest (TOML format)
    manifest: PathBuf,

    /// Compiler configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for output files (prints to stdout if not provided)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// What to emit for each component
    #[arg(short, long, value_enum, default_value_t = Emit::Source)]
    emit: Emit,

    /// Raise log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = match &cli.config {
        Some(path) => match CompilerConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => CompilerConfig::default(),
    };

    let manifest = match Manifest::from_file(&cli.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error loading manifest '{}': {}", cli.manifest.display(), e);
            std::process::exit(1);
        }
    };

    let compiled = match compile_manifest(&manifest, &config) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for component in &compiled {
        let output = match render(component, cli.emit) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("Error serializing {}: {}", component.descriptor.type_name, e);
                std::process::exit(1);
            }
        };

        match &cli.out_dir {
            Some(dir) => {
                if let Err(e) = write_output(dir, component, cli.emit, &output) {
                    eprintln!("Error writing to '{}': {}", dir.display(), e);
                    std::process::exit(1);
                }
            }
            None => println!("{}", output),
        }
    }
}

fn render(component: &CompiledComponent, emit: Emit) -> serde_json::Result<String> {
    match emit {
        Emit::Source => Ok(component.source.clone()),
        Emit::Compiled => component.compiled.to_json(),
        Emit::Descriptor => serde_json::to_string_pretty(&component.descriptor),
    }
}

fn write_output(
    dir: &Path,
    component: &CompiledComponent,
    emit: Emit,
    output: &str,
) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let name = format!("{}Template.{}", component.descriptor.type_name, emit.extension());
    fs::write(dir.join(name), output)
}

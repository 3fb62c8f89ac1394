//! Stubgen Code Generator
//!
//! Generates synchronous gRPC client wrappers from a `protoc` descriptor set
//! or a JSON descriptor model.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::{Level, info};

use stubgen_gen::diagnostics::TracingSink;
use stubgen_gen::errors::GeneratorError;
use stubgen_gen::frontend::load_units;
use stubgen_gen::options::{DEFAULT_PROTO_ROOT, GeneratorOptions};
use stubgen_gen::output::{GeneratedArtifact, generate_all, write_artifacts};

/// Stubgen code generator - turns gRPC service descriptors into blocking Rust clients
#[derive(Parser, Debug)]
#[command(name = "stubgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Descriptor set from `protoc --descriptor_set_out`, or a `.json` model
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for generated code
    #[arg(short, long, default_value = "src/gen")]
    output: PathBuf,

    /// Source file to generate for (repeatable; default: every file)
    #[arg(short, long = "file")]
    files: Vec<String>,

    /// Rust path of the module tree holding the tonic-build output
    #[arg(long, default_value = DEFAULT_PROTO_ROOT)]
    proto_root: String,

    /// Compiler version to record in file headers (e.g. v3.21.12)
    #[arg(long)]
    compiler_version: Option<String>,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Summary of the generation run.
struct GenerationSummary {
    artifacts: Vec<(String, usize, usize)>,
    units_without_services: usize,
}

impl GenerationSummary {
    fn new(artifacts: &[GeneratedArtifact], units: usize) -> Self {
        Self {
            artifacts: artifacts
                .iter()
                .map(|a| (a.file_name.clone(), a.methods_generated, a.methods_skipped))
                .collect(),
            units_without_services: units - artifacts.len(),
        }
    }

    fn print(&self, dry_run: bool) {
        println!("\n=== Generation Summary ===\n");

        for (file, generated, skipped) in &self.artifacts {
            let skipped_note = if *skipped > 0 {
                format!(", {} streaming skipped", skipped).yellow().to_string()
            } else {
                String::new()
            };
            println!("  {} {} wrappers{}", file.bold(), generated, skipped_note);
        }

        let generated: usize = self.artifacts.iter().map(|a| a.1).sum();
        let skipped: usize = self.artifacts.iter().map(|a| a.2).sum();
        let verb = if dry_run { "generated (dry run)" } else { "written" };
        println!(
            "\nTotal: {} {}, {} wrappers, {} streaming methods skipped, {} files without services",
            self.artifacts.len().to_string().green(),
            verb,
            generated,
            skipped,
            self.units_without_services
        );
    }
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = GeneratorOptions::default()
        .with_proto_root(cli.proto_root)?
        .with_compiler_version(cli.compiler_version);

    info!("Loading descriptors from {}", cli.input.display());
    let units = load_units(&cli.input, &cli.files)?;
    let artifacts = generate_all(&units, &options, &TracingSink)?;

    if cli.dry_run {
        for artifact in &artifacts {
            println!("// ===== {} =====", artifact.file_name);
            println!("{}", artifact.content);
        }
    } else {
        let written = write_artifacts(&artifacts, &cli.output)?;
        for path in &written {
            info!("Wrote {}", path.display());
        }
    }

    GenerationSummary::new(&artifacts, units.len()).print(cli.dry_run);
    Ok(())
}

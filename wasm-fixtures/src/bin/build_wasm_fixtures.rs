use std::{path::PathBuf, process};

use clap::Parser;
use wasm_fixtures::{run_batch, Manifest, ProcessInvoker};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    /// Directory holding the fixture sources; outputs are written relative to it
    #[arg(long = "dir", default_value = ".")]
    dir: PathBuf,
    /// YAML manifest replacing the built-in fixture list and compiler settings
    #[arg(short, long = "manifest")]
    manifest_path: Option<PathBuf>,
    /// Compiler program, overriding the manifest
    #[arg(long = "compiler", env = "ASC_BIN")]
    compiler: Option<PathBuf>,
    /// Print the invocations without running them
    #[arg(long = "list")]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init()?;
    let cli = Cli::parse();
    let mut manifest = match &cli.manifest_path {
        Some(path) => Manifest::from_yaml(path)?,
        None => Manifest::default(),
    };
    if let Some(compiler) = cli.compiler {
        manifest.compiler.program = compiler;
    }

    if cli.list {
        for fixture in &manifest.fixtures {
            println!("{}", manifest.compiler.command_line(fixture));
        }
        return Ok(());
    }

    let report = match run_batch(&manifest, &cli.dir, &mut ProcessInvoker) {
        Ok(report) => report,
        Err(err) => {
            log::error!("{err}");
            process::exit(err.exit_code());
        }
    };
    if !report.is_success() {
        process::exit(report.exit_code());
    }
    println!("Compiled {} fixtures in {}", report.completed.len(), cli.dir.display());
    Ok(())
}

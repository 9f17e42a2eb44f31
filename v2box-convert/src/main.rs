use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use v2box_convert::error::GeoError;
use v2box_convert::geo::{compile_geoip, compile_geosite};
use v2box_convert::registry::Registry;

mod cli;

use cli::{Cli, Command, GeoCommand, GeoipArgs, GeositeArgs, MigrateArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Migrate(args) => match args.resource {
            Some(GeoCommand::Geoip(args)) => run_geoip(args),
            Some(GeoCommand::Geosite(args)) => run_geosite(args),
            None => run_migrate(args),
        },
        Command::Version => run_version(),
    }
}

fn run_migrate(args: MigrateArgs) -> Result<()> {
    let Some(input) = &args.input else {
        bail!("missing configuration path; pass a file or `-` for stdin");
    };
    let content = if input.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        fs::read(input).with_context(|| format!("failed to read {}", input.display()))?
    };

    let registry = Registry::with_defaults();
    let report = registry
        .migrate(args.schema.as_str(), &content)
        .with_context(|| format!("failed to migrate {}", input.display()))?;
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }

    let mut rendered = report
        .options
        .to_json_pretty()
        .context("failed to serialize canonical options")?;
    rendered.push('\n');
    match &args.output {
        Some(path) => {
            if let Err(err) = fs::write(path, &rendered) {
                // Never leave a truncated document behind.
                let _ = fs::remove_file(path);
                return Err(err).with_context(|| format!("failed to write {}", path.display()));
            }
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn run_geoip(args: GeoipArgs) -> Result<()> {
    let content = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let summary = compile_to_file(&args.output, |output| compile_geoip(&content, output))
        .with_context(|| format!("failed to compile {}", args.input.display()))?;
    println!(
        "geoip: {} categories, {} networks -> {}",
        summary.categories,
        summary.networks,
        args.output.display()
    );
    Ok(())
}

fn run_geosite(args: GeositeArgs) -> Result<()> {
    let content = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let summary = compile_to_file(&args.output, |output| compile_geosite(&content, output))
        .with_context(|| format!("failed to compile {}", args.input.display()))?;
    println!(
        "geosite: {} categories, {} entries -> {}",
        summary.categories,
        summary.entries,
        args.output.display()
    );
    Ok(())
}

/// Run one compiler against a freshly created output file, deleting the file
/// again if compilation or writing fails.
fn compile_to_file<T>(
    path: &Path,
    compile: impl FnOnce(&mut fs::File) -> Result<T, GeoError>,
) -> Result<T> {
    let mut file =
        fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let result = compile(&mut file);
    drop(file);
    match result {
        Ok(summary) => Ok(summary),
        Err(err) => {
            let _ = fs::remove_file(path);
            Err(err.into())
        }
    }
}

fn run_version() -> Result<()> {
    let registry = Registry::with_defaults();
    for (name, version) in registry.schemas() {
        println!("{name}: {version}");
    }
    Ok(())
}

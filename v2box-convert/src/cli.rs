use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "v2box-convert")]
#[command(about = "Migrate v2ray and xray configurations and geo resources into sing-box format")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Migrate a configuration document, or a geo resource via a subcommand.
    Migrate(MigrateArgs),
    /// Show the supported source schemas and their versions.
    Version,
}

#[derive(Parser, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub resource: Option<GeoCommand>,
    /// Source configuration file, or `-` for stdin.
    pub input: Option<PathBuf>,
    /// Source schema (`auto` tries each supported schema in order).
    #[arg(long, value_enum, default_value_t = SchemaName::Auto)]
    pub schema: SchemaName,
    /// Output file path (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
pub enum GeoCommand {
    /// Compile a geoip country database into the runtime binary format.
    Geoip(GeoipArgs),
    /// Compile a geosite domain-list database into the runtime binary format.
    Geosite(GeositeArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum SchemaName {
    Auto,
    V2ray,
    Xray,
}

impl SchemaName {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaName::Auto => "auto",
            SchemaName::V2ray => "v2ray",
            SchemaName::Xray => "xray",
        }
    }
}

#[derive(Parser, Debug)]
pub struct GeoipArgs {
    /// Input geoip resource path.
    #[arg(short, long, default_value = "geoip.dat")]
    pub input: PathBuf,
    /// Output database path.
    #[arg(short, long, default_value = "geoip.db")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct GeositeArgs {
    /// Input geosite resource path.
    #[arg(short, long, default_value = "geosite.dat")]
    pub input: PathBuf,
    /// Output database path.
    #[arg(short, long, default_value = "geosite.db")]
    pub output: PathBuf,
}

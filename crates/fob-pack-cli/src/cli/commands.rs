use clap::{Args, Subcommand};
use fob_pack::MinifyLevel;
use std::path::PathBuf;

/// Available fob-pack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pack the scripts of a built site
    ///
    /// Scans every .html file under SITE_DIR, removes its scripts and
    /// references (or inlines) one shared bundle per distinct script list.
    Pack(PackArgs),
}

/// Arguments for the pack command
#[derive(Args, Debug, Clone, Default)]
pub struct PackArgs {
    /// Directory holding the generated site
    #[arg(value_name = "SITE_DIR")]
    pub site_dir: PathBuf,

    /// Where to write the packed site [default: SITE_DIR, in place]
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory local script paths resolve against [default: src]
    #[arg(long, value_name = "DIR")]
    pub content_root: Option<PathBuf>,

    /// Config file [default: fob-pack.toml or fob-pack.json]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Inline each bundle into its pages instead of writing .min.js files
    #[arg(long)]
    pub inline: bool,

    /// URL prefix of bundle references [default: /]
    #[arg(long, value_name = "PATH")]
    pub site_root: Option<String>,

    /// Bundle directory relative to the site root [default: assets/javascript/]
    #[arg(long, value_name = "PATH")]
    pub output_path: Option<String>,

    /// Keep scripts as written
    #[arg(long)]
    pub no_uglify: bool,

    /// Minification level: none, whitespace, syntax, identifiers
    #[arg(long, value_name = "LEVEL")]
    pub minify_level: Option<MinifyLevel>,

    /// Remote fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

//! Fob pack CLI - script consolidation for generated sites.
//!
//! Parses arguments, sets up logging and dispatches to the command.

use clap::Parser;
use fob_pack_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Pack(pack_args) => commands::pack_execute(pack_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}

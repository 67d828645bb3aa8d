//! Miette report conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Pack(e) => pack_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a fob-pack error to a miette Report with a hint where one helps.
pub fn pack_error_to_miette(err: fob_pack::Error) -> Report {
    match err {
        fob_pack::Error::RemoteFetch { url, source } => miette::miette!(
            "Failed to fetch remote script {}: {}\n\nHint: Check the URL and your network, or add data-packer=\"exclude\" to the <script> to leave it in place",
            url,
            source
        ),
        fob_pack::Error::ReadScript { path, source } => miette::miette!(
            "Failed to read script {}: {}\n\nHint: Check file permissions under the content root",
            path.display(),
            source
        ),
        fob_pack::Error::InvalidOutputPath(msg) => miette::miette!(
            "Invalid output path: {}\n\nHint: Bundle and page paths must stay inside the output directory",
            msg
        ),
        other => miette::miette!("{}", other),
    }
}

//! `fob-pack pack` implementation.

use crate::cli::PackArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::ui;
use fob_pack::{FileCollection, HttpFetcher, PackOptions, PackReport, Packer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a pack run wrote.
#[derive(Debug)]
pub struct PackOutcome {
    pub report: PackReport,
    pub options: PackOptions,
    pub out_dir: PathBuf,
    /// Total size of the bundle files written.
    pub bundle_bytes: u64,
}

/// Execute the pack command.
///
/// 1. Load options (CLI > Env > File > Defaults)
/// 2. Load the site directory
/// 3. Pack
/// 4. Write the site to `--out-dir` (or back in place)
/// 5. Display the summary
pub async fn execute(args: PackArgs) -> Result<()> {
    let start_time = Instant::now();
    let cwd = std::env::current_dir()?;

    ui::info(&format!("Packing {}", args.site_dir.display()));
    let outcome = pack_site(&args, &cwd).await?;

    if outcome.report.missing_local > 0 {
        ui::warning(&format!(
            "{} local scripts were not found under {} and were left in place",
            outcome.report.missing_local,
            outcome.options.content_root.display()
        ));
    }
    if outcome.report.minify_fallbacks > 0 {
        ui::warning(&format!(
            "{} scripts could not be minified and were bundled as written",
            outcome.report.minify_fallbacks
        ));
    }

    ui::print_pack_summary(&outcome.report, &outcome.options, outcome.bundle_bytes);
    ui::success(&format!(
        "Packed into {} in {}",
        outcome.out_dir.display(),
        ui::format_duration(start_time.elapsed())
    ));

    Ok(())
}

/// Load, pack and write a site. Relative paths resolve against `cwd`.
///
/// # Errors
///
/// Configuration errors, a missing site directory, and any failure of the
/// pack run or of writing the output.
pub async fn pack_site(args: &PackArgs, cwd: &Path) -> Result<PackOutcome> {
    let options = config::load_options(args, cwd)?;

    let site_dir = cwd.join(&args.site_dir);
    if !site_dir.is_dir() {
        return Err(CliError::FileNotFound(site_dir));
    }
    let out_dir = args
        .out_dir
        .as_ref()
        .map_or_else(|| site_dir.clone(), |dir| cwd.join(dir));

    let mut files = FileCollection::from_dir(&site_dir)?;
    tracing::debug!("loaded {} files from {}", files.len(), site_dir.display());

    let mut packer = Packer::new(options);
    if let Some(secs) = args.timeout {
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(secs))
            .map_err(|e| CliError::InvalidArgument(format!("--timeout: {e}")))?;
        packer = packer.with_fetcher(Arc::new(fetcher));
    }

    let report = packer.run(&mut files).await?;
    files.write_to(&out_dir)?;

    let options = packer.options().clone();
    let output_dir = options.output_dir().into_owned();
    let bundle_bytes = files
        .iter()
        .filter(|(path, _)| path.starts_with(&output_dir) && path.ends_with(".min.js"))
        .map(|(_, contents)| contents.len() as u64)
        .sum();

    Ok(PackOutcome {
        report,
        options,
        out_dir,
        bundle_bytes,
    })
}

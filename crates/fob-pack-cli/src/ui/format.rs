//! Formatting utilities for sizes, durations and the pack summary.

use console::{Term, style};
use fob_pack::{PackOptions, PackReport};
use std::time::Duration;

/// Format file size in human-readable format.
///
/// ```
/// use fob_pack_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use fob_pack_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Rows of the pack summary, label then value.
pub(crate) fn summary_rows(
    report: &PackReport,
    options: &PackOptions,
) -> Vec<(&'static str, String)> {
    let output = if options.inline {
        "inline".to_string()
    } else {
        format!("{} files in {}", report.artifacts, options.output_dir())
    };

    vec![
        ("Documents scanned", report.documents_scanned.to_string()),
        ("Documents bundled", report.documents_bundled.to_string()),
        ("Unique scripts", report.unique_scripts.to_string()),
        ("Remote fetches", report.remote_fetches.to_string()),
        ("Bundles", report.bundles.to_string()),
        ("Output", output),
        ("Missing local scripts", report.missing_local.to_string()),
        ("Minifier fallbacks", report.minify_fallbacks.to_string()),
    ]
}

/// Print the summary of a pack run to stderr.
///
/// `bundle_bytes` is the total size of the bundle files written, if any.
pub fn print_pack_summary(report: &PackReport, options: &PackOptions, bundle_bytes: u64) {
    let width = Term::stderr().size().1 as usize;

    eprintln!("\n{}", style("Pack Summary").bold().underlined());
    eprintln!("{}", "─".repeat(width.clamp(20, 60)));

    for (label, value) in summary_rows(report, options) {
        let warn = matches!(label, "Missing local scripts" | "Minifier fallbacks") && value != "0";
        let value = if warn {
            style(value).yellow().to_string()
        } else {
            style(value).cyan().to_string()
        };
        eprintln!("  {:<24}{}", label, value);
    }

    if bundle_bytes > 0 {
        let size = style(format_size(bundle_bytes)).cyan();
        eprintln!("  {:<24}{}", "Bundle size", size);
    }
    eprintln!();
}

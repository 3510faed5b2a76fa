//! Small display helpers shared by the panels.

use chaosdeck_types::{OutputLimits, OutputMeta};

pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Header text for the configured output caps. Uncapped output reads
/// distinctly from any numeric limit.
pub fn output_limit_text(limits: &OutputLimits) -> String {
    if limits.is_unlimited() {
        "Output: unlimited".to_string()
    } else {
        format!(
            "Output limit: {} lines / {} chars",
            limits.max_lines, limits.max_chars
        )
    }
}

/// Truncation badge text. Reads the original totals, never the delivered
/// count.
pub fn truncation_text(meta: &OutputMeta) -> String {
    format!(
        "output truncated (total {} lines / {} chars)",
        meta.total_lines, meta.total_chars
    )
}

pub fn elapsed_text(seconds: f64) -> String {
    format!("{seconds:.2}s")
}

//! Export format identifiers.
//!
//! Callers may name a format by a friendly alias (`yolov5`); the service only
//! understands its own identifiers (`yolov5pytorch`). Anything not in the
//! alias table is assumed to already be an identifier.

/// Friendly alias → service identifier.
const FORMAT_ALIASES: &[(&str, &str)] = &[
    ("yolov5", "yolov5pytorch"),
    ("yolov6", "mt-yolov6"),
    ("yolov7", "yolov7pytorch"),
];

/// Map a single alias to its canonical identifier.
pub fn canonical_format(alias: &str) -> &str {
    FORMAT_ALIASES
        .iter()
        .find(|(friendly, _)| *friendly == alias)
        .map(|(_, identifier)| *identifier)
        .unwrap_or(alias)
}

/// Pick the requested format, or the fallback when none was requested, and
/// canonicalize it. Returns `None` when neither is available.
pub fn resolve_format_identifier(requested: Option<&str>, fallback: Option<&str>) -> Option<String> {
    requested
        .or(fallback)
        .map(|format| canonical_format(format).to_string())
}

/// All known aliases and their identifiers, for help output.
pub fn aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    FORMAT_ALIASES.iter().copied()
}

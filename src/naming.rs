use glob::{MatchOptions, Pattern, PatternError};

/// Suffix shared by every archive this tool writes and reads.
pub const ARCHIVE_SUFFIX: &str = ".tag.gz";

/// Shell-glob options for archive names: a leading `.` must be matched literally,
/// so hidden files are never picked up by `*`.
pub const ARCHIVE_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// The `*.tag.gz` pattern for file names inside an input directory.
pub fn archive_pattern() -> Result<Pattern, PatternError> {
    Pattern::new(&format!("*{}", ARCHIVE_SUFFIX))
}

/// Returns true when `image_ref` carries exactly `tag`, i.e. ends in `:<tag>`.
pub fn has_tag(image_ref: &str, tag: &str) -> bool {
    image_ref.ends_with(&format!(":{}", tag))
}

/// Keeps the references carrying `tag`, preserving their order.
pub fn filter_by_tag<'a>(images: &'a [String], tag: &str) -> Vec<&'a str> {
    images
        .iter()
        .map(String::as_str)
        .filter(|image| has_tag(image, tag))
        .collect()
}

/// Converts an image reference to its archive file name
/// `/` becomes `-` and `:` becomes `_`, e.g. `myrepo/app:1.0.2v` → `myrepo-app_1.0.2v.tag.gz`
pub fn archive_file_name(image_ref: &str) -> String {
    let safe_name = image_ref.replace('/', "-").replace(':', "_");
    format!("{}{}", safe_name, ARCHIVE_SUFFIX)
}

/// True for names a `*.tag.gz` glob would match; hidden files are excluded.
pub fn is_archive_file_name(name: &str) -> bool {
    archive_pattern()
        .map(|pattern| pattern.matches_with(name, ARCHIVE_MATCH_OPTIONS))
        .unwrap_or(false)
}

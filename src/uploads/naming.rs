/// Stem used when sanitization leaves nothing of the client's name.
const FALLBACK_STEM: &str = "screenshot";

/// Reduce a client-supplied file name to a safe, flat ASCII name.
///
/// Path separators become spaces, whitespace runs collapse into `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped and leading/trailing
/// `.` and `_` are stripped. Stem and extension are cleaned separately so
/// the extension survives a stem that is entirely non-ASCII.
pub fn sanitize_filename(original: &str) -> String {
    let flattened = original.replace(['/', '\\'], " ");
    let (stem, extension) = match flattened.rsplit_once('.') {
        Some((stem, extension)) => (clean(stem), clean(extension)),
        None => (clean(&flattened), String::new()),
    };
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem.as_str() };

    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

fn clean(part: &str) -> String {
    let joined = part.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// `<unix-timestamp>_<name>`
pub fn stored_file_name(timestamp: i64, sanitized_name: &str) -> String {
    format!("{timestamp}_{sanitized_name}")
}

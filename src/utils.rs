//! Small helpers for logging and path safety.

/// Render a response body for a log line, cutting it at `max` bytes.
///
/// Non-UTF-8 bytes are replaced, so binary bodies still produce a readable
/// (if noisy) preview.
///
/// ```ignore
/// assert_eq!(truncate_for_log(b"short", 100), "short");
/// assert_eq!(truncate_for_log(&[b'a'; 500], 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(body: &[u8], max: usize) -> String {
    if body.len() <= max {
        String::from_utf8_lossy(body).into_owned()
    } else {
        format!(
            "{}…(+{} bytes)",
            String::from_utf8_lossy(&body[..max]),
            body.len() - max
        )
    }
}

/// Whether a manifest-supplied name can be used as a single path component.
///
/// Names come from the remote document and are joined under the archive
/// root, so anything that could climb out of its directory is refused.
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

//! Filesystem-safe path segments

/// Characters that are illegal in a path segment on at least one platform
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn a display name into a single filesystem-safe path segment
///
/// Illegal characters and control characters are dropped, surrounding
/// whitespace is trimmed, and each inner run of whitespace becomes one `_`.
/// The function is total and idempotent; an empty result is possible and
/// must be handled by the caller.
pub fn sanitize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !(c.is_control() && !c.is_whitespace()))
        .collect();

    let mut result = String::with_capacity(kept.len());
    let mut pending_gap = false;
    for c in kept.trim().chars() {
        if c.is_whitespace() {
            pending_gap = true;
        } else {
            if pending_gap {
                result.push('_');
                pending_gap = false;
            }
            result.push(c);
        }
    }
    result
}

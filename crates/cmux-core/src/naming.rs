//! Job names: derived from URLs, safe to use as file names, unique per channel.

use std::collections::HashSet;

/// Name used when the URL path yields nothing usable.
const DEFAULT_JOB_NAME: &str = "index.html";

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Names a job after the last non-empty path segment of `url`, sanitized with
/// [`sanitize`]. Falls back to `index.html` for bare hosts and unparsable URLs.
pub fn job_name_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .map(|segment| sanitize(&segment))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_JOB_NAME.to_string())
}

/// Makes `name` usable as a single path component: separators, NUL and control
/// characters become `_` (runs collapsed), surrounding dots/spaces/underscores
/// are trimmed, `.` and `..` become empty, and the result is cut to 255 bytes.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_' || c == ' ');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

/// Returns `base` if unused, else the first free `base-1`, `base-2`, ...
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Strip the markdown code fence a model may wrap around JSON output.
///
/// Removes a leading ```` ``` ```` marker with an optional, case-insensitive
/// `json` tag and a trailing ```` ``` ````, then trims whitespace. Text without
/// fences comes back trimmed and otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

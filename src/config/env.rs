//! Environment placeholder expansion for configured paths.
//!
//! # Responsibilities
//! - Expand `%NAME%` (Windows style) and `${NAME}` placeholders
//! - Resolve names against the process environment
//!
//! # Design Decisions
//! - Unresolved names expand to the empty string, never an error
//! - Text that is not a well-formed placeholder is copied through untouched
//! - Names follow `[_A-Za-z][_A-Za-z0-9-]*`

/// Expand placeholders against the current process environment.
pub fn expand_env(input: &str) -> String {
    expand_env_with(input, |name| std::env::var(name).ok())
}

/// Expand placeholders using `lookup` to resolve variable names.
pub fn expand_env_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let placeholder = if tail.starts_with('%') {
            tail[1..].find('%').map(|end| (&tail[1..1 + end], end + 2))
        } else if tail.starts_with("${") {
            tail[2..].find('}').map(|end| (&tail[2..2 + end], end + 3))
        } else {
            None
        };

        match placeholder {
            Some((name, consumed)) if is_valid_name(name) => {
                out.push_str(&lookup(name).unwrap_or_default());
                rest = &tail[consumed..];
            }
            _ => {
                // Not a placeholder: keep the sigil and rescan from the next char.
                out.push(tail.as_bytes()[0] as char);
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '-' || c.is_ascii_alphanumeric())
}

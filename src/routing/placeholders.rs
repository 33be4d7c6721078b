//! Argument template expansion.
//!
//! Two passes, always in this order:
//! 1. `$N` → capture group `N` (indices past the last group stay literal)
//! 2. `{URL}` → the raw URL
//!
//! Text inserted by the first pass is not rescanned for `$N`.

/// Token replaced by the raw URL.
pub const URL_TOKEN: &str = "{URL}";

/// Expand `template` with capture groups and the URL.
pub fn expand_placeholders(template: &str, captures: &[String], url: &str) -> String {
    if template.is_empty() {
        return String::new();
    }
    substitute_captures(template, captures).replace(URL_TOKEN, url)
}

/// Template used for the global fallback program.
///
/// The fallback must always receive the URL: an empty template becomes
/// `{URL}` and a template without the token gets ` {URL}` appended.
pub fn fallback_template(template: &str) -> String {
    if template.trim().is_empty() {
        URL_TOKEN.to_string()
    } else if template.contains(URL_TOKEN) {
        template.to_string()
    } else {
        format!("{template} {URL_TOKEN}")
    }
}

fn substitute_captures(template: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits_len = after
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after.len());

        match longest_group_ref(&after[..digits_len], captures.len()) {
            Some((index, len)) => {
                out.push_str(&captures[index]);
                rest = &after[len..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Longest prefix of `digits` naming an existing group: `$12` means group 12
/// when it exists, otherwise group 1 followed by a literal `2`.
fn longest_group_ref(digits: &str, group_count: usize) -> Option<(usize, usize)> {
    (1..=digits.len()).rev().find_map(|len| {
        let candidate = &digits[..len];
        if len > 1 && candidate.starts_with('0') {
            return None;
        }
        candidate
            .parse::<usize>()
            .ok()
            .filter(|index| *index < group_count)
            .map(|index| (index, len))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_group_and_url_substitution() {
        assert_eq!(
            expand_placeholders("$1-$0", &groups(&["123", "123"]), "https://x/abc123"),
            "123-123"
        );
        assert_eq!(
            expand_placeholders("open {URL} now", &[], "https://a.b"),
            "open https://a.b now"
        );
        assert_eq!(
            expand_placeholders("--id=$1 {URL} {URL}", &groups(&["j/42", "42"]), "u"),
            "--id=42 u u"
        );
    }

    #[test]
    fn test_unknown_group_left_untouched() {
        assert_eq!(
            expand_placeholders("$0 $2 $ $x", &groups(&["a", "b"]), ""),
            "a $2 $ $x"
        );
    }

    #[test]
    fn test_multi_digit_references() {
        let two = groups(&["a", "b"]);
        assert_eq!(expand_placeholders("$10", &two, ""), "b0");
        assert_eq!(expand_placeholders("$01", &two, ""), "a1");

        let eleven: Vec<String> = (0..11).map(|i| format!("g{i}")).collect();
        assert_eq!(expand_placeholders("$10", &eleven, ""), "g10");
    }

    #[test]
    fn test_inserted_text_is_not_rescanned() {
        assert_eq!(
            expand_placeholders("$1", &groups(&["x$0", "$0"]), ""),
            "$0"
        );
    }

    #[test]
    fn test_empty_template_stays_empty() {
        assert_eq!(expand_placeholders("", &groups(&["a"]), "https://x"), "");
    }

    #[test]
    fn test_fallback_template() {
        assert_eq!(fallback_template("--foo"), "--foo {URL}");
        assert_eq!(fallback_template(""), "{URL}");
        assert_eq!(fallback_template("-new-tab {URL}"), "-new-tab {URL}");
        assert_eq!(
            expand_placeholders(&fallback_template("--foo"), &[], "https://x"),
            "--foo https://x"
        );
        assert_eq!(expand_placeholders("--foo", &[], "https://x"), "--foo");
    }
}

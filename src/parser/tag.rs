//! Struct tag lookup.
//!
//! Tags are sequences of `key:"value"` pairs separated by spaces. A value may
//! also be backquoted (`key:`value``), which only occurs inside interpreted
//! string tags.

/// Look up `key` in a struct tag, returning its value
pub fn lookup(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }

        let key_end = rest
            .find(|c: char| c == ':' || c == '"' || c == '`' || c.is_whitespace())
            .unwrap_or(rest.len());
        if key_end == 0 || !rest[key_end..].starts_with(':') {
            return None;
        }
        let name = &rest[..key_end];

        let after_colon = &rest[key_end + 1..];
        let quote = after_colon.chars().next()?;
        if quote != '"' && quote != '`' {
            return None;
        }
        let body = &after_colon[1..];

        let mut close = None;
        let mut escaped = false;
        for (i, c) in body.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            if c == '\\' && quote == '"' {
                escaped = true;
                continue;
            }
            if c == quote {
                close = Some(i);
                break;
            }
        }
        let close = close?;

        if name == key {
            return Some(body[..close].replace("\\\"", "\"").replace("\\\\", "\\"));
        }
        rest = &body[close + 1..];
    }
}

/// Serialization name from the `json` key: the part before the first comma.
/// `json:",omitempty"` names nothing.
pub fn json_name(tag: &str) -> Option<String> {
    let value = lookup(tag, "json")?;
    let name = value.split(',').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_json() {
        assert_eq!(lookup(r#"json:"id""#, "json").as_deref(), Some("id"));
    }

    #[test]
    fn test_lookup_among_several_keys() {
        let tag = r#"db:"user_id" json:"user,omitempty" xml:"u""#;
        assert_eq!(lookup(tag, "json").as_deref(), Some("user,omitempty"));
        assert_eq!(lookup(tag, "xml").as_deref(), Some("u"));
        assert_eq!(lookup(tag, "yaml"), None);
    }

    #[test]
    fn test_backquoted_value() {
        assert_eq!(lookup("json:`name`", "json").as_deref(), Some("name"));
    }

    #[test]
    fn test_key_must_match_exactly() {
        assert_eq!(lookup(r#"myjson:"x""#, "json"), None);
    }

    #[test]
    fn test_malformed_tag() {
        assert_eq!(lookup("json", "json"), None);
        assert_eq!(lookup(r#"json:"unterminated"#, "json"), None);
        assert_eq!(lookup("json:bare", "json"), None);
    }

    #[test]
    fn test_json_name_strips_options() {
        assert_eq!(json_name(r#"json:"id,omitempty""#).as_deref(), Some("id"));
        assert_eq!(json_name(r#"json:",omitempty""#), None);
        assert_eq!(json_name(r#"json:"-""#).as_deref(), Some("-"));
    }
}

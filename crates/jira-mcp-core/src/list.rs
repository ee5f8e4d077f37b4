/// Split a comma-separated list, tolerating a `[a, b]` wrapper and dropping blank items.
pub fn parse_list_string(value: &str) -> Vec<String> {
    let raw = value.trim();
    if raw.is_empty() || raw == "[]" {
        return Vec::new();
    }
    let inner = if raw.starts_with('[') && raw.ends_with(']') {
        raw[1..raw.len() - 1].trim()
    } else {
        raw
    };
    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_list_string;

    #[test]
    fn splits_and_trims() {
        assert_eq!(
            parse_list_string(" windows, winc ,runtimeclass"),
            vec!["windows", "winc", "runtimeclass"]
        );
    }

    #[test]
    fn drops_blank_items() {
        assert_eq!(parse_list_string("A-1,,A-2, "), vec!["A-1", "A-2"]);
        assert!(parse_list_string("  ").is_empty());
        assert!(parse_list_string("[]").is_empty());
    }

    #[test]
    fn accepts_bracketed_lists() {
        assert_eq!(parse_list_string("[\"a\", b]"), vec!["a", "b"]);
    }
}

//! Comment and blank line filtering shared by every source dialect.

/// Prefixes that mark a whole line as a comment.
const COMMENT_PREFIXES: [&str; 4] = ["//", ";", "#", "!"];

/// Check whether a trimmed line is a comment.
pub fn is_comment(line: &str) -> bool {
    COMMENT_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Iterate over the trimmed, non-blank, non-comment lines of a text.
pub fn filter_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_comment(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_lines() {
        let text = "// header\n\n  10.*.*.*  \n; note\n# hash\n! adblock\r\n*.bank.com\r\n";
        let lines: Vec<&str> = filter_lines(text).collect();
        assert_eq!(lines, vec!["10.*.*.*", "*.bank.com"]);
    }

    #[test]
    fn test_is_comment() {
        assert!(is_comment("// x"));
        assert!(is_comment(";x"));
        assert!(is_comment("# x"));
        assert!(!is_comment("example.com"));
        assert!(!is_comment("*.example.com"));
    }
}

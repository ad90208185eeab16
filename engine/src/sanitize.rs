//! File name sanitization.

/// Characters Windows forbids in file names; also rejected on other
/// platforms so output names stay portable.
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows reserves regardless of extension.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Map an arbitrary base name to a filesystem-safe one.
///
/// Invalid and control characters become underscores, trailing dots and
/// spaces are dropped, and reserved device names are prefixed. A name that
/// sanitizes to nothing becomes a single underscore.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || INVALID_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    while sanitized.ends_with('.') || sanitized.ends_with(' ') {
        sanitized.pop();
    }

    let stem = sanitized.split('.').next().unwrap_or("");
    if RESERVED_NAMES.iter().any(|r| stem.eq_ignore_ascii_case(r)) {
        sanitized.insert(0, '_');
    }

    if sanitized.is_empty() {
        sanitized.push('_');
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_file_name("report.txt"), "report.txt");
        assert_eq!(sanitize_file_name("photo 2023.jpg"), "photo 2023.jpg");
    }

    #[test]
    fn test_invalid_characters_replaced() {
        assert_eq!(sanitize_file_name("a<b>c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_file_name("time: 12:30"), "time_ 12_30");
        assert_eq!(sanitize_file_name("path/to\\file"), "path_to_file");
        assert_eq!(sanitize_file_name("why?.doc"), "why_.doc");
    }

    #[test]
    fn test_control_characters_replaced() {
        assert_eq!(sanitize_file_name("a\tb\nc"), "a_b_c");
    }

    #[test]
    fn test_trailing_dots_and_spaces_trimmed() {
        assert_eq!(sanitize_file_name("notes..."), "notes");
        assert_eq!(sanitize_file_name("notes. . "), "notes");
    }

    #[test]
    fn test_reserved_names_prefixed() {
        assert_eq!(sanitize_file_name("CON"), "_CON");
        assert_eq!(sanitize_file_name("con.txt"), "_con.txt");
        assert_eq!(sanitize_file_name("lpt1.log"), "_lpt1.log");
        // only the stem counts
        assert_eq!(sanitize_file_name("console.txt"), "console.txt");
    }

    #[test]
    fn test_degenerate_names() {
        assert_eq!(sanitize_file_name(""), "_");
        assert_eq!(sanitize_file_name("..."), "_");
        assert_eq!(sanitize_file_name("???"), "___");
    }
}

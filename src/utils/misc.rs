use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref KEY_NAME_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref WRAPPING_QUOTES_RE: Regex = Regex::new(r#"^["']+|["']+$"#).unwrap();
}

const MAX_KEY_NAME_LEN: usize = 64;

/// Generate a random UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Extract file extension from filename
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Section, field and theme key names: identifier-like, bounded length.
pub fn is_valid_key_name(name: &str) -> bool {
    name.len() <= MAX_KEY_NAME_LEN && KEY_NAME_RE.is_match(name)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Strip runs of `"` or `'` from both ends.
pub fn strip_wrapping_quotes(text: &str) -> String {
    WRAPPING_QUOTES_RE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(get_file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_key_names() {
        assert!(is_valid_key_name("hero"));
        assert!(is_valid_key_name("service1Title"));
        assert!(is_valid_key_name("stats_label"));
        assert!(!is_valid_key_name(""));
        assert!(!is_valid_key_name("1hero"));
        assert!(!is_valid_key_name("../etc"));
        assert!(!is_valid_key_name("hero title"));
        assert!(!is_valid_key_name(&"a".repeat(65)));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"Hello there\""), "Hello there");
        assert_eq!(strip_wrapping_quotes("'''Hi'"), "Hi");
        assert_eq!(strip_wrapping_quotes("She said \"go\" today"), "She said \"go\" today");
        assert_eq!(strip_wrapping_quotes("\"\""), "");
    }
}

use regex::Regex;
use std::sync::OnceLock;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn password_charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z\d@$!%*?&]{8,}$").unwrap())
}

pub fn sanitize_input(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

pub fn validate_email(email: &str) -> bool {
    email_re().is_match(email)
}

/// At least 8 characters from the allowed set, with one lowercase letter,
/// one uppercase letter and one digit.
pub fn validate_password(password: &str) -> bool {
    password_charset_re().is_match(password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

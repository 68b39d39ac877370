use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;

const MAX_LOGIN_ID_CHARS: usize = 100;
const MAX_PASSWORD_CHARS: usize = 100;

/// Whitespace and URI-reserved delimiters are not allowed in a pun.
fn pun_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s:?#\[\]!$@&'()*+,;=/]{1,15}$").expect("Invalid regex pattern defined in code")
    })
}

fn validate_length<'a>(
    field: &str,
    value: &'a str,
    max_chars: usize,
) -> Result<&'a str, ApiError> {
    let chars = value.chars().count();
    if chars == 0 {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    if chars > max_chars {
        return Err(ApiError::validation(format!(
            "{field} must be {max_chars} characters or less"
        )));
    }
    Ok(value)
}

pub fn validate_login_id(login_id: &str) -> Result<&str, ApiError> {
    validate_length("loginId", login_id, MAX_LOGIN_ID_CHARS)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    validate_length("password", password, MAX_PASSWORD_CHARS)
}

pub fn validate_pun(pun: &str) -> Result<&str, ApiError> {
    if !pun_regex().is_match(pun) {
        return Err(ApiError::validation(
            "pun must be 1 to 15 characters with no whitespace or URI delimiters",
        ));
    }
    Ok(pun)
}

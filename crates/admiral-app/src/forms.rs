//! Form fields and client-side validation
//!
//! Validation failures never reach the network; they land on the field as
//! an inline error and block submission. The global toast stack is not
//! involved here.

use std::sync::OnceLock;

use regex::Regex;

/// Inclusive port range accepted for the preferred session port.
pub const PORT_MIN: u16 = 1024;
pub const PORT_MAX: u16 = 65535;

/// A single-line text input with an optional inline validation error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextField {
    pub value: String,
    pub error: Option<String>,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        self.value.pop();
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Run a validator, recording its error inline. Returns the parsed
    /// value on success.
    pub fn validate<T>(
        &mut self,
        check: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        match check(&self.value) {
            Ok(parsed) => {
                self.error = None;
                Some(parsed)
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Validators
// ─────────────────────────────────────────────────────────────────

pub fn require(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err("This field is required".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn validate_email(value: &str) -> Result<String, String> {
    let value = require(value)?;
    if email_regex().is_match(&value) {
        Ok(value)
    } else {
        Err("Not a valid email address".to_string())
    }
}

fn hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?(:\d+)?$")
            .expect("hostname pattern is valid")
    })
}

pub fn validate_hostname(value: &str) -> Result<String, String> {
    let value = require(value)?;
    if hostname_regex().is_match(&value) {
        Ok(value)
    } else {
        Err("Not a valid hostname".to_string())
    }
}

pub fn validate_registry_url(value: &str) -> Result<String, String> {
    let value = require(value)?;
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err("URL must start with http:// or https://".to_string())
    }
}

/// Preferred session port, bounded to the registered/dynamic range.
pub fn validate_port(value: &str) -> Result<u16, String> {
    let value = require(value)?;
    let port: u32 = value
        .parse()
        .map_err(|_| "Port must be a number".to_string())?;
    if port < u32::from(PORT_MIN) || port > u32::from(PORT_MAX) {
        return Err(format!("Port must be between {PORT_MIN} and {PORT_MAX}"));
    }
    Ok(port as u16)
}

pub fn validate_rate_limit(value: &str) -> Result<u32, String> {
    let value = require(value)?;
    value
        .parse()
        .map_err(|_| "Rate limit must be a non-negative number".to_string())
}

/// CPU counts are positive numbers; fractional shares are allowed.
pub fn validate_cpu_count(value: &str) -> Result<f64, String> {
    let value = require(value)?;
    let count: f64 = value
        .parse()
        .map_err(|_| "CPU must be a number".to_string())?;
    if count <= 0.0 || !count.is_finite() {
        return Err("CPU must be a positive number".to_string());
    }
    Ok(count)
}

/// Memory sizes accept `g`/`m`/`k` suffixes or plain bytes.
pub fn parse_mem_field(value: &str) -> Result<u64, String> {
    let value = require(value)?;
    admiral_core::format::parse_mem_size(&value)
        .ok_or_else(|| "Not a valid memory size (try 512m or 2g)".to_string())
}

/// Passwords need at least 8 characters with a letter and a digit.
pub fn validate_password(value: &str) -> Result<String, String> {
    if value.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err("Password needs at least one letter and one digit".to_string());
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("").is_err());
        assert!(require("   ").is_err());
        assert_eq!(require(" x ").unwrap(), "x");
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("admin@cluster.example").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@c.d").is_err());
    }

    #[test]
    fn test_port_range_bounds() {
        assert!(validate_port("1023").is_err());
        assert_eq!(validate_port("1024").unwrap(), 1024);
        assert_eq!(validate_port("65535").unwrap(), 65535);
        // 65536 and the once-infamous 66535 are both out of range
        assert!(validate_port("65536").is_err());
        assert!(validate_port("66535").is_err());
        assert!(validate_port("ssh").is_err());
    }

    #[test]
    fn test_rate_limit_parse() {
        assert_eq!(validate_rate_limit("5000").unwrap(), 5000);
        assert!(validate_rate_limit("-1").is_err());
        assert!(validate_rate_limit("abc").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("alllettersonly").is_err());
        assert!(validate_password("123456789").is_err());
        assert!(validate_password("passw0rd!").is_ok());
    }

    #[test]
    fn test_hostname_validation() {
        assert!(validate_hostname("cr.example.io").is_ok());
        assert!(validate_hostname("cr.example.io:5000").is_ok());
        assert!(validate_hostname("-bad-").is_err());
        assert!(validate_hostname("").is_err());
    }

    #[test]
    fn test_registry_url() {
        assert!(validate_registry_url("https://cr.example.io").is_ok());
        assert!(validate_registry_url("ftp://cr.example.io").is_err());
    }

    #[test]
    fn test_cpu_count() {
        assert_eq!(validate_cpu_count("4").unwrap(), 4.0);
        assert_eq!(validate_cpu_count("0.5").unwrap(), 0.5);
        assert!(validate_cpu_count("0").is_err());
        assert!(validate_cpu_count("-2").is_err());
        assert!(validate_cpu_count("many").is_err());
    }

    #[test]
    fn test_mem_field() {
        assert_eq!(parse_mem_field("2g").unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(parse_mem_field("").is_err());
        assert!(parse_mem_field("big").is_err());
    }

    #[test]
    fn test_field_validate_records_inline_error() {
        let mut field = TextField::new("66535");
        assert!(field.validate(validate_port).is_none());
        assert!(!field.is_valid());
        field.backspace();
        assert!(field.is_valid()); // editing clears the error
    }
}

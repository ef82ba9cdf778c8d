use crate::constants::{MAX_BLOCK_MINUTES, MAX_DOMAIN_LEN, MAX_FOCUS_DOMAINS, MAX_PIN_LEN};
use crate::domain::extract_domain;
use crate::error::AppError;
use chrono::NaiveDate;

/// Validate a block duration in minutes.
pub fn validate_duration_minutes(duration_minutes: i64) -> Result<i64, AppError> {
    if duration_minutes <= 0 {
        return Err(AppError::invalid("durationMinutes", "must be positive"));
    }
    if duration_minutes > MAX_BLOCK_MINUTES {
        return Err(AppError::invalid(
            "durationMinutes",
            format!("cannot exceed {MAX_BLOCK_MINUTES} minutes"),
        ));
    }
    Ok(duration_minutes)
}

/// Validate a domain typed or sent by the UI and return its canonical key.
///
/// Accepts bare hosts (`youtube.com`) as well as full URLs.
pub fn validate_domain(domain: &str) -> Result<String, AppError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid("domain", "cannot be empty"));
    }
    let key = extract_domain(trimmed)
        .ok_or_else(|| AppError::invalid("domain", format!("'{trimmed}' has no host")))?;
    if key.len() > MAX_DOMAIN_LEN {
        return Err(AppError::invalid(
            "domain",
            format!("cannot exceed {MAX_DOMAIN_LEN} characters"),
        ));
    }
    Ok(key)
}

/// Validate the domain list of a focus session. Duplicates are collapsed.
pub fn validate_domains(domains: &[String]) -> Result<Vec<String>, AppError> {
    if domains.is_empty() {
        return Err(AppError::invalid("domains", "at least one domain required"));
    }
    if domains.len() > MAX_FOCUS_DOMAINS {
        return Err(AppError::invalid(
            "domains",
            format!("cannot exceed {MAX_FOCUS_DOMAINS} entries"),
        ));
    }

    let mut keys: Vec<String> = Vec::with_capacity(domains.len());
    for domain in domains {
        let key = validate_domain(domain)?;
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    Ok(keys)
}

/// Validate a PIN entered on the dashboard gate. The PIN is returned as entered.
pub fn validate_pin(pin: &str) -> Result<&str, AppError> {
    if pin.trim().is_empty() {
        return Err(AppError::invalid("pin", "cannot be empty"));
    }
    if pin.len() > MAX_PIN_LEN {
        return Err(AppError::invalid(
            "pin",
            format!("cannot exceed {MAX_PIN_LEN} characters"),
        ));
    }
    Ok(pin)
}

/// Validate a report date (`YYYY-MM-DD`).
pub fn validate_date(date: &str) -> Result<&str, AppError> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::invalid("date", "must be in YYYY-MM-DD format"))?;
    // chrono accepts unpadded fields, the ledger keys are always padded
    if date.len() != 10 {
        return Err(AppError::invalid("date", "must be in YYYY-MM-DD format"));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_duration_minutes_valid() {
        assert_eq!(validate_duration_minutes(25).unwrap(), 25);
        assert!(validate_duration_minutes(MAX_BLOCK_MINUTES).is_ok());
    }

    #[test]
    fn test_validate_duration_minutes_zero_or_negative() {
        assert!(validate_duration_minutes(0).is_err());
        assert!(validate_duration_minutes(-5).is_err());
    }

    #[test]
    fn test_validate_duration_minutes_too_large() {
        assert!(validate_duration_minutes(MAX_BLOCK_MINUTES + 1).is_err());
    }

    #[test]
    fn test_validate_domain_normalizes() {
        assert_eq!(validate_domain("  YouTube.com ").unwrap(), "youtube.com");
        assert_eq!(validate_domain("https://www.reddit.com/r/rust").unwrap(), "reddit.com");
    }

    #[test]
    fn test_validate_domain_invalid() {
        assert!(validate_domain("").is_err());
        assert!(validate_domain("   ").is_err());
        assert!(validate_domain("about:blank").is_err());
        assert!(validate_domain(&"a".repeat(MAX_DOMAIN_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_domains_dedups() {
        let domains = vec!["a.com".to_string(), "www.a.com".to_string(), "b.com".to_string()];
        assert_eq!(validate_domains(&domains).unwrap(), vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_validate_domains_empty() {
        assert!(validate_domains(&[]).is_err());
    }

    #[test]
    fn test_validate_domains_rejects_bad_entry() {
        let domains = vec!["a.com".to_string(), " ".to_string()];
        assert!(validate_domains(&domains).is_err());
    }

    #[test]
    fn test_validate_pin() {
        assert_eq!(validate_pin(" 1234 ").unwrap(), " 1234 ");
        assert!(validate_pin("").is_err());
        assert!(validate_pin(&"9".repeat(MAX_PIN_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-09-21").is_ok());
        assert!(validate_date("2025-9-21").is_err());
        assert!(validate_date("2025-13-01").is_err());
        assert!(validate_date("yesterday").is_err());
    }
}

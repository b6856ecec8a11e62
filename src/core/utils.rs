use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use uuid::Uuid;

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}

/// Opaque, time-ordered identifier such as `DEPT-0192f3c4-...`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7())
}

/// Trims and drops empty strings.
pub fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_prefixed_and_ordered() {
        let first = generate_id("DEPT");
        let second = generate_id("DEPT");
        assert!(first.starts_with("DEPT-"));
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("admin@genesis.com"));
        assert!(is_valid_email("a.b@c.d.e"));
        assert!(!is_valid_email("admin@genesis"));
        assert!(!is_valid_email("admin genesis@x.com"));
        assert!(!is_valid_email("@genesis.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("admin@.com"));
    }

    #[test]
    fn test_clean_opt() {
        assert_eq!(clean_opt(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(clean_opt(Some("   ".to_string())), None);
        assert_eq!(clean_opt(None), None);
    }
}

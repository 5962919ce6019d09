//! Password policy

/// Check a plaintext password against the service policy.
///
/// Returns `None` when the password is acceptable, or a human-readable
/// message describing the first unmet requirement. Length is checked
/// here too, so callers that only want the policy verdict get a complete
/// answer, but the enrollment flow additionally short-circuits on length
/// with its own message code.
pub fn check(password: &str) -> Option<&'static str> {
    if password.len() < 8 {
        return Some("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one digit");
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some("Password must contain at least one special character");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compliant_passwords() {
        assert_eq!(check("Str0ng!Pass"), None);
        assert_eq!(check("aB3$efgh"), None);
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(check("aB3$efg").is_some());
    }

    #[test]
    fn names_the_first_missing_requirement() {
        assert_eq!(
            check("alllower3$"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            check("ALLUPPER3$"),
            Some("Password must contain at least one lowercase letter")
        );
        assert_eq!(
            check("NoDigits!!"),
            Some("Password must contain at least one digit")
        );
        assert_eq!(
            check("NoSymbol123"),
            Some("Password must contain at least one special character")
        );
    }
}

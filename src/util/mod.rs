/// Emails are matched case-insensitively by the backend's share lookup;
/// lower-case before submission so "Anna@Example.com" and "anna@example.com"
/// hit the same account row.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn remaining_label(unchecked: i64, total: i64) -> String {
    if total == 0 {
        "Empty".to_string()
    } else if unchecked == 0 {
        "All done".to_string()
    } else {
        format!("{} of {} remaining", unchecked, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Anna@Example.COM "), "anna@example.com");
        assert_eq!(normalize_email("plain@host"), "plain@host");
    }

    #[test]
    fn test_remaining_label() {
        assert_eq!(remaining_label(0, 0), "Empty");
        assert_eq!(remaining_label(0, 4), "All done");
        assert_eq!(remaining_label(3, 7), "3 of 7 remaining");
    }
}

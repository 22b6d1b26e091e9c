use std::sync::LazyLock;

use regex::Regex;

/// `local@domain.tld`: one `@`, a dot in the domain, no whitespace anywhere.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email shape pattern compiles")
});

/// Loose shape check run before any network access.
pub fn is_plausible_email(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

/// The domain part of a plausible address, or `None` when the shape check fails.
pub(crate) fn domain_of(email: &str) -> Option<&str> {
    if !is_plausible_email(email) {
        return None;
    }
    email.rsplit_once('@').map(|(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic_shapes() {
        for email in ["user@example.com", "a.b+tag@mail.example.co.uk", "x@y.z", "üser@bücher.example"] {
            assert!(is_plausible_email(email), "{email}");
        }
    }

    #[test]
    fn rejects_malformed() {
        for email in [
            "not-an-email",
            "user@localhost",
            "@example.com",
            "user@",
            "user@@example.com",
            "us er@example.com",
            "user@exa mple.com",
            "user@example.",
            "user@.com",
            "",
        ] {
            assert!(!is_plausible_email(email), "{email}");
        }
    }

    #[test]
    fn domain_is_after_the_at() {
        assert_eq!(domain_of("user@example.com"), Some("example.com"));
        assert_eq!(domain_of("user@example"), None);
    }

    proptest! {
        #[test]
        fn no_at_never_plausible(s in "[^@]{0,40}") {
            prop_assert!(!is_plausible_email(&s));
        }

        #[test]
        fn dotless_domain_never_plausible(local in "[a-z0-9]{1,10}", domain in "[a-z0-9-]{1,20}") {
            let email = format!("{local}@{domain}");
            prop_assert!(!is_plausible_email(&email));
        }
    }
}

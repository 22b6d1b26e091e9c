//! Turns raw command-line tokens and file lines into email candidates.

/// Trims every item and drops the blank ones, keeping the input order.
///
/// No syntax check happens here; malformed candidates are kept and rejected
/// later by the classifier so they still show up in the report.
pub fn load_emails<I, S>(raw_items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_items
        .into_iter()
        .filter_map(|item| {
            let candidate = item.as_ref().trim();
            (!candidate.is_empty()).then(|| candidate.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_and_drops_blank_lines() {
        let raw = ["  alice@example.com\n", "", "   \t", "bob@example.org", "not-an-email\r\n"];
        let out = load_emails(raw);
        assert_eq!(out, vec!["alice@example.com", "bob@example.org", "not-an-email"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let out = load_emails(Vec::<String>::new());
        assert!(out.is_empty());
    }

    proptest! {
        #[test]
        fn output_is_trimmed_and_never_blank(items in prop::collection::vec("[ \\ta-z@.]{0,12}", 0..16)) {
            let out = load_emails(&items);
            for candidate in &out {
                prop_assert!(!candidate.is_empty());
                prop_assert_eq!(candidate.trim(), candidate.as_str());
            }
            let expected = items.iter().filter(|s| !s.trim().is_empty()).count();
            prop_assert_eq!(out.len(), expected);
        }
    }
}

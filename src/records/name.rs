//! Combined name splitting.

/// Split a combined name on its last whitespace boundary.
///
/// The last token is taken as the surname and everything before it as the
/// given name, so multi-word surnames are split wrongly. A single token is
/// all given name.
pub fn split_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.rsplit_once(char::is_whitespace) {
        Some((first, last)) => (first.trim_end().to_string(), last.to_string()),
        None => (full.to_string(), String::new()),
    }
}

/// Split `first` into `first` and `last` when `last` is blank.
pub(crate) fn split_combined(first: &mut String, last: &mut String) {
    if last.trim().is_empty() && first.trim().contains(char::is_whitespace) {
        let (given, surname) = split_name(first);
        *first = given;
        *last = surname;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Samsudin Ansari"), ("Samsudin".into(), "Ansari".into()));
        assert_eq!(split_name("Sita Devi  Sharma "), ("Sita Devi".into(), "Sharma".into()));
        assert_eq!(split_name("Samsudin"), ("Samsudin".into(), String::new()));
        assert_eq!(split_name("समसुद्दीन अंसारी"), ("समसुद्दीन".into(), "अंसारी".into()));
    }

    #[test]
    fn test_split_combined_only_when_last_blank() {
        let (mut first, mut last) = ("Ram Lal".to_string(), String::new());
        split_combined(&mut first, &mut last);
        assert_eq!((first.as_str(), last.as_str()), ("Ram", "Lal"));

        let (mut first, mut last) = ("Ram Lal".to_string(), "Verma".to_string());
        split_combined(&mut first, &mut last);
        assert_eq!((first.as_str(), last.as_str()), ("Ram Lal", "Verma"));
    }
}

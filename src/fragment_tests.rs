// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `fragment.rs`

#[cfg(test)]
mod tests {
    use crate::aggregator::AddressBook;
    use crate::constants::FRAGMENT_DELIMITER;
    use crate::fragment::*;

    const HOSTS_PREFIX: &str = "127.0.0.1\tlocalhost\n::1\tlocalhost ip6-localhost\n";

    #[test]
    fn test_render_exact_format() {
        let book = AddressBook::from([
            ("10.0.0.1", &["a.example.com", "b.example.com"][..]),
            ("10.0.0.2", &["c.example.com"][..]),
        ]);

        assert_eq!(
            render(&book),
            "\n\n##BEGIN K8S HOSTS##\n\
             10.0.0.1\t a.example.com b.example.com\n\
             10.0.0.2\t c.example.com\n"
        );
    }

    #[test]
    fn test_render_empty_book_is_just_delimiter() {
        assert_eq!(render(&AddressBook::new()), FRAGMENT_DELIMITER);
    }

    #[test]
    fn test_render_ip_without_hosts() {
        let book = AddressBook::from([("10.0.0.9", &[] as &[&str])]);

        assert_eq!(render(&book), format!("{FRAGMENT_DELIMITER}10.0.0.9\t\n"));
    }

    #[test]
    fn test_strip_without_delimiter_returns_content_unchanged() {
        assert_eq!(
            strip_managed(HOSTS_PREFIX.as_bytes()).unwrap(),
            HOSTS_PREFIX.as_bytes()
        );
    }

    #[test]
    fn test_strip_empty_content() {
        assert_eq!(strip_managed(b"").unwrap(), b"");
    }

    #[test]
    fn test_strip_after_render_returns_prefix() {
        let book = AddressBook::from([
            ("10.0.0.1", &["a.example.com"][..]),
            ("10.0.0.2", &[] as &[&str]),
        ]);
        let content = format!("{HOSTS_PREFIX}{}", render(&book));

        assert_eq!(
            strip_managed(content.as_bytes()).unwrap(),
            HOSTS_PREFIX.as_bytes()
        );
    }

    #[test]
    fn test_strip_splits_on_first_delimiter() {
        let content = format!("{HOSTS_PREFIX}{FRAGMENT_DELIMITER}junk{FRAGMENT_DELIMITER}more");

        assert_eq!(
            strip_managed(content.as_bytes()).unwrap(),
            HOSTS_PREFIX.as_bytes()
        );
    }

    #[test]
    fn test_strip_file_that_is_only_fragment() {
        let content = render(&AddressBook::from([("10.0.0.1", &["a.com"][..])]));

        assert_eq!(strip_managed(content.as_bytes()).unwrap(), b"");
    }

    #[test]
    fn test_partial_delimiter_is_not_a_match() {
        let content = format!("{HOSTS_PREFIX}##BEGIN K8S HOSTS##\n10.0.0.1\t a.com\n");

        assert_eq!(strip_managed(content.as_bytes()).unwrap(), content.as_bytes());
        assert_eq!(extract_managed(content.as_bytes()), None);
    }

    #[test]
    fn test_extract_managed_returns_fragment() {
        let fragment = render(&AddressBook::from([("10.0.0.1", &["a.com"][..])]));
        let content = format!("{HOSTS_PREFIX}{fragment}");

        assert_eq!(
            extract_managed(content.as_bytes()),
            Some(fragment.as_bytes())
        );
    }

    #[test]
    fn test_extract_managed_absent() {
        assert_eq!(extract_managed(HOSTS_PREFIX.as_bytes()), None);
    }

    #[test]
    fn test_strip_keeps_non_utf8_prefix_bytes() {
        let prefix: &[u8] = b"# caf\xe9 server\n127.0.0.1\tlocalhost\n";
        let book = AddressBook::from([("10.0.0.1", &["a.com"][..])]);
        let mut content = prefix.to_vec();
        content.extend_from_slice(render(&book).as_bytes());

        assert_eq!(strip_managed(&content).unwrap(), prefix);
        assert_eq!(
            extract_managed(&content),
            Some(format!("{FRAGMENT_DELIMITER}10.0.0.1\t a.com\n").as_bytes())
        );
    }

    #[test]
    fn test_content_shorter_than_delimiter() {
        assert_eq!(strip_managed(b"\n").unwrap(), b"\n");
        assert_eq!(extract_managed(b"\n"), None);
    }
}

//! Path normalization and validation
//!
//! Pure functions, no I/O. Invalid input short-circuits with a parameter
//! error in the facade before any network call.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters never accepted in a directory name
const FORBIDDEN: &[char] = &['?', '*', ':', '|', '\\', '<', '>', '"'];

/// Percent-encode everything except unreserved characters and `/`, which
/// stays literal so the encoded path keeps its shape in the resource URL.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Normalize a remote path: a single leading slash, duplicate slashes
/// collapsed, and a trailing slash when the path names a directory.
pub fn normalize(path: &str, is_directory: bool) -> String {
    let mut normalized = String::with_capacity(path.len() + 2);
    normalized.push('/');
    normalized.push_str(path);

    if is_directory && !normalized.ends_with('/') {
        normalized.push('/');
    }

    // Collapse runs of slashes to one.
    let mut collapsed = String::with_capacity(normalized.len());
    let mut prev_slash = false;
    for ch in normalized.chars() {
        if ch == '/' {
            if !prev_slash {
                collapsed.push(ch);
            }
            prev_slash = true;
        } else {
            collapsed.push(ch);
            prev_slash = false;
        }
    }

    collapsed
}

/// Whether a directory name is acceptable to the service.
pub fn is_valid(path: &str) -> bool {
    !path.contains(FORBIDDEN)
}

/// Percent-encode a normalized path for use in a resource URL, keeping `/`.
pub fn url_encode(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_leading_slash() {
        assert_eq!(normalize("a/b", false), "/a/b");
        assert_eq!(normalize("/a/b", false), "/a/b");
    }

    #[test]
    fn directory_gets_trailing_slash() {
        assert_eq!(normalize("a//b/", true), "/a/b/");
        assert_eq!(normalize("a/b", true), "/a/b/");
    }

    #[test]
    fn collapses_duplicate_slashes() {
        assert_eq!(normalize("//a///b//c", false), "/a/b/c");
    }

    #[test]
    fn root_directory() {
        assert_eq!(normalize("", true), "/");
        assert_eq!(normalize("/", true), "/");
    }

    #[test]
    fn rejects_forbidden_characters() {
        assert!(is_valid("photos/2024"));
        for bad in ["a?b", "a*b", "a:b", "a|b", "a\\b", "a<b", "a>b", "a\"b"] {
            assert!(!is_valid(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn encoding_preserves_slashes() {
        assert_eq!(url_encode("/a/b c/d.txt"), "/a/b%20c/d.txt");
        assert_eq!(url_encode("/中文/file"), "/%E4%B8%AD%E6%96%87/file");
    }
}

//! Forwarding target construction.

/// Join a route origin with the inbound path and query.
///
/// Exactly one trailing `/` is removed from the origin, so `http://a.com/`
/// and `http://a.com` produce the same target. The path always starts with
/// `/`; an empty path is treated as `/`.
pub fn forwarding_target(origin: &str, path_and_query: &str) -> String {
    let origin = origin.strip_suffix('/').unwrap_or(origin);
    let path = if path_and_query.is_empty() {
        "/"
    } else {
        path_and_query
    };

    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_appended() {
        assert_eq!(
            forwarding_target("http://127.0.0.1:9000", "/posts/1"),
            "http://127.0.0.1:9000/posts/1"
        );
    }

    #[test]
    fn test_single_trailing_slash_is_equivalent() {
        assert_eq!(
            forwarding_target("http://a.com/", "/x/y"),
            forwarding_target("http://a.com", "/x/y")
        );
        assert_eq!(forwarding_target("http://a.com/", "/"), "http://a.com/");
    }

    #[test]
    fn test_only_one_slash_stripped() {
        assert_eq!(forwarding_target("http://a.com//", "/x"), "http://a.com//x");
    }

    #[test]
    fn test_query_preserved() {
        assert_eq!(
            forwarding_target("http://a.com/api/", "/search?q=rust&page=2"),
            "http://a.com/api/search?q=rust&page=2"
        );
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(forwarding_target("http://a.com", ""), "http://a.com/");
    }
}

//! Host and cookie-domain matching

/// Whether a cookie scoped to `domain` may be used on `host`.
///
/// True when the two are equal, or when `domain` is a parent of `host`
/// (`app.example.com` accepts `example.com`, `notexample.com` does not).
pub fn is_allowed_domain(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }

    match host.strip_suffix(domain) {
        Some(rest) => rest.ends_with('.'),
        None => false,
    }
}

/// Strip a trailing `:port` from a `Host` header value.
///
/// Bracketed IPv6 literals keep their brackets.
pub fn host_without_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(is_allowed_domain("example.com", "example.com"));
    }

    #[test]
    fn test_parent_domain() {
        assert!(is_allowed_domain("a.example.com", "example.com"));
        assert!(is_allowed_domain("x.y.example.com", "example.com"));
        assert!(is_allowed_domain("x.y.example.com", "y.example.com"));
    }

    #[test]
    fn test_no_substring_match() {
        assert!(!is_allowed_domain("notexample.com", "example.com"));
        assert!(!is_allowed_domain("notevil.com", "evil.com"));
    }

    #[test]
    fn test_child_does_not_cover_parent() {
        assert!(!is_allowed_domain("example.com", "a.example.com"));
        assert!(!is_allowed_domain("example.com", "other.com"));
    }

    #[test]
    fn test_host_without_port() {
        assert_eq!(host_without_port("example.com:8080"), "example.com");
        assert_eq!(host_without_port("example.com"), "example.com");
        assert_eq!(host_without_port("[::1]:443"), "[::1]");
        assert_eq!(host_without_port("example.com:"), "example.com:");
    }
}

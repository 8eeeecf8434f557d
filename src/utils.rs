use url::Url;

/// Normalize a URL typed by the user by trimming it and adding a missing scheme
///
/// `localhost` and `127.0.0.1` get `http://`, any other host-like input gets
/// `https://`. Input that already parses as an absolute URL is returned
/// trimmed but otherwise unchanged.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(parsed) = Url::parse(trimmed) {
        // "example.com:8080" parses with "example.com" as the scheme
        if parsed.has_host() || !looks_like_host(trimmed) {
            return trimmed.to_string();
        }
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}

/// `host[:port][/...]` without a scheme
fn looks_like_host(input: &str) -> bool {
    let host_port = input.split(['/', '?', '#']).next().unwrap_or_default();
    match host_port.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_with_protocol() {
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("  http://example.com/a?b=1 "), "http://example.com/a?b=1");
        assert_eq!(normalize_url("file:///tmp/page.html"), "file:///tmp/page.html");
        assert_eq!(normalize_url("data:text/html,<p>x</p>"), "data:text/html,<p>x</p>");
    }

    #[test]
    fn test_normalize_url_domain() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("www.example.com/post/1"), "https://www.example.com/post/1");
        assert_eq!(normalize_url("example.com:8443/x"), "https://example.com:8443/x");
    }

    #[test]
    fn test_normalize_url_localhost() {
        assert_eq!(normalize_url("localhost:3000"), "http://localhost:3000");
        assert_eq!(normalize_url("127.0.0.1:8080/page"), "http://127.0.0.1:8080/page");
        assert_eq!(normalize_url("localhost"), "http://localhost");
    }

    #[test]
    fn test_normalize_url_empty() {
        assert_eq!(normalize_url("   "), "");
    }
}

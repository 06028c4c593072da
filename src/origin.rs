//! Scheme+host comparison used to decide whether a session icon survives a navigation.
//!
//! This is deliberately weaker than a full web origin: ports are not compared, so
//! `https://a.example` and `https://a.example:8443` count as the same site for icon
//! purposes, while `http://a.example` and `https://a.example` do not. A url that does
//! not parse has neither scheme nor host.

use url::Url;

fn scheme_and_host(s: &str) -> (Option<String>, Option<String>) {
    match Url::parse(s) {
        Ok(url) => (Some(url.scheme().to_string()), url.host_str().map(|h| h.to_string())),
        Err(_) => (None, None),
    }
}

/// Returns true when both urls share scheme and host.
pub fn same_scheme_and_host(previous: &str, next: &str) -> bool {
    scheme_and_host(previous) == scheme_and_host(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_change_keeps_origin() {
        assert!(same_scheme_and_host("https://a.example/x", "https://a.example/y"));
        assert!(same_scheme_and_host("https://a.example/x", "https://a.example/x?q=1#frag"));
    }

    #[test]
    fn host_change_breaks_origin() {
        assert!(!same_scheme_and_host("https://a.example/x", "https://b.example/x"));
        assert!(!same_scheme_and_host("https://a.example", "https://sub.a.example"));
    }

    #[test]
    fn scheme_change_breaks_origin() {
        assert!(!same_scheme_and_host("http://a.example/", "https://a.example/"));
    }

    #[test]
    fn port_is_ignored() {
        assert!(same_scheme_and_host("https://a.example/", "https://a.example:8443/"));
    }

    #[test]
    fn host_case_is_normalized() {
        assert!(same_scheme_and_host("https://A.Example/", "https://a.example/"));
    }

    #[test]
    fn unparsable_urls_have_no_scheme_or_host() {
        assert!(same_scheme_and_host("not a url", "not a url"));
        assert!(same_scheme_and_host("not a url", "also not a url"));
        assert!(same_scheme_and_host("", "not a url"));
        assert!(!same_scheme_and_host("", "https://a.example"));
        assert!(!same_scheme_and_host("https://a.example", "not a url"));
    }

    #[test]
    fn hostless_urls_compare_by_scheme() {
        assert!(same_scheme_and_host("about:blank", "about:config"));
        assert!(!same_scheme_and_host("about:blank", "data:text/plain,hi"));
    }
}

//! Set-Cookie rewriting.
//!
//! Cookies set by any origin are re-scoped to the proxy host: the browser
//! only ever talks to the proxy, so origin-specific scoping would make it
//! drop or withhold them.

/// Attributes replaced or removed by [`rewrite_set_cookie`].
const SCOPED_ATTRIBUTES: &[&str] = &["domain", "secure", "samesite", "path"];

/// Rewrite a `Set-Cookie` value for delivery through the proxy.
///
/// The `name=value` pair and unrelated attributes (Expires, Max-Age,
/// HttpOnly, ...) are kept in order. `Domain` and `Secure` are removed;
/// `Path=/` and `SameSite=Lax` replace whatever the origin sent.
pub fn rewrite_set_cookie(value: &str) -> String {
    let mut parts = value.split(';');
    let pair = parts.next().unwrap_or_default().trim();

    let mut rewritten = vec![pair];
    for attribute in parts.map(str::trim).filter(|a| !a.is_empty()) {
        let name = attribute.split('=').next().unwrap_or_default().trim();
        if SCOPED_ATTRIBUTES
            .iter()
            .any(|scoped| scoped.eq_ignore_ascii_case(name))
        {
            continue;
        }
        rewritten.push(attribute);
    }
    rewritten.push("Path=/");
    rewritten.push("SameSite=Lax");

    rewritten.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoping_attributes_rewritten() {
        let out = rewrite_set_cookie("id=1; Domain=example.com; Secure; SameSite=Strict; Path=/a");
        assert!(!out.contains("Domain="));
        assert!(!out.contains("Secure"));
        assert!(out.contains("SameSite=Lax"));
        assert!(out.contains("Path=/"));
        assert!(!out.contains("Path=/a"));
        assert!(out.starts_with("id=1"));
    }

    #[test]
    fn test_other_attributes_preserved() {
        let out = rewrite_set_cookie(
            "session=x=y; Expires=Wed, 21 Oct 2026 07:28:00 GMT; HttpOnly; max-age=60",
        );
        assert_eq!(
            out,
            "session=x=y; Expires=Wed, 21 Oct 2026 07:28:00 GMT; HttpOnly; max-age=60; Path=/; SameSite=Lax"
        );
    }

    #[test]
    fn test_case_insensitive_attribute_names() {
        let out = rewrite_set_cookie("a=b; DOMAIN=.x.test; secure; samesite=None; path=/deep");
        assert_eq!(out, "a=b; Path=/; SameSite=Lax");
    }

    #[test]
    fn test_bare_cookie_still_scoped() {
        assert_eq!(rewrite_set_cookie("a=b"), "a=b; Path=/; SameSite=Lax");
    }
}

//! Stylesheet reference rewriting.
//!
//! `url(...)` arguments end at the first `)`, so an argument containing a
//! literal parenthesis is cut short and may be rewritten incorrectly. This
//! mirrors the long-standing matching rule and is a known limitation.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::rewrite::RewriteContext;

static CSS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)url\(([^)]*)\)").expect("valid CSS url regex"));

static CSS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)@import\s+(?:"([^"]*)"|'([^']*)')"#).expect("valid CSS import regex")
});

fn unquote(argument: &str) -> &str {
    let argument = argument.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = argument
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    argument
}

fn skipped(reference: &str) -> bool {
    reference.is_empty()
        || reference.starts_with('#')
        || reference
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Proxy URL for a stylesheet reference, or `None` if it must stay as is.
fn proxied(reference: &str, ctx: &RewriteContext) -> Option<String> {
    if skipped(reference) {
        return None;
    }
    ctx.proxy_url(reference)
}

/// Rewrite every `url(...)` and string-form `@import` in a stylesheet.
pub fn rewrite_css<'a>(css: &'a str, ctx: &RewriteContext) -> Cow<'a, str> {
    let with_urls = CSS_URL_RE.replace_all(css, |caps: &Captures| {
        let whole = &caps[0];
        match proxied(unquote(&caps[1]), ctx) {
            Some(url) => format!("url(\"{url}\")"),
            None => whole.to_string(),
        }
    });

    if !CSS_IMPORT_RE.is_match(&with_urls) {
        return with_urls;
    }
    let with_imports = CSS_IMPORT_RE.replace_all(&with_urls, |caps: &Captures| {
        let reference = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        match proxied(reference.trim(), ctx) {
            Some(url) => format!("@import \"{url}\""),
            None => caps[0].to_string(),
        }
    });
    Cow::Owned(with_imports.into_owned())
}

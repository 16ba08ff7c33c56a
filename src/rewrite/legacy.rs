//! Server-side link rewriting (legacy mode).
//!
//! Superseded by bootstrap injection. Rewrites the URL attributes of static
//! markup and every quoted string that looks like a URL inside inline
//! scripts and JavaScript responses. Dynamically built URLs are missed, and
//! the literal matching produces false positives (any quoted string starting
//! with `/` is treated as a path).

use std::borrow::Cow;
use std::cell::RefCell;

use lol_html::errors::RewritingError;
use lol_html::html_content::{ContentType, Element};
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::rewrite::RewriteContext;

/// Elements and the attribute holding their URL.
const URL_ATTRIBUTES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("link[href]", "href"),
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("iframe[src]", "src"),
    ("source[src]", "src"),
    ("form[action]", "action"),
];

static DOUBLE_QUOTED_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(https?://[^"]+|/[^"]+)""#).expect("valid double-quoted URL regex")
});

static SINGLE_QUOTED_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'(https?://[^']+|/[^']+)'").expect("valid single-quoted URL regex")
});

fn rewrite_attribute(
    el: &mut Element<'_, '_>,
    attribute: &str,
    ctx: &RewriteContext,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(value) = el.get_attribute(attribute) else {
        return Ok(());
    };
    if let Some(proxied) = ctx.proxy_url(&value.replace('\\', "/")) {
        el.set_attribute(attribute, &proxied)?;
    }
    Ok(())
}

fn replace_literals<'a>(re: &Regex, source: &'a str, quote: char, ctx: &RewriteContext) -> Cow<'a, str> {
    re.replace_all(source, |caps: &Captures| match ctx.proxy_url(&caps[1]) {
        Some(proxied) => format!("{quote}{proxied}{quote}"),
        None => caps[0].to_string(),
    })
}

/// Rewrite quoted URL-looking literals in script source.
pub fn rewrite_script<'a>(source: &'a str, ctx: &RewriteContext) -> Cow<'a, str> {
    match replace_literals(&DOUBLE_QUOTED_URL_RE, source, '"', ctx) {
        Cow::Borrowed(source) => replace_literals(&SINGLE_QUOTED_URL_RE, source, '\'', ctx),
        Cow::Owned(rewritten) => Cow::Owned(
            replace_literals(&SINGLE_QUOTED_URL_RE, &rewritten, '\'', ctx).into_owned(),
        ),
    }
}

/// Rewrite URL attributes and inline scripts of an HTML document.
pub fn rewrite_document(document: &str, ctx: &RewriteContext) -> Result<String, RewritingError> {
    let script_text = RefCell::new(String::new());

    let mut handlers: Vec<_> = URL_ATTRIBUTES
        .iter()
        .map(|&(selector, attribute)| {
            element!(selector, move |el| rewrite_attribute(el, attribute, ctx))
        })
        .collect();

    // Script text arrives in chunks; hold it until the text node is complete.
    handlers.push(text!("script", |chunk| {
        script_text.borrow_mut().push_str(chunk.as_str());
        if chunk.last_in_text_node() {
            let source = std::mem::take(&mut *script_text.borrow_mut());
            chunk.replace(&rewrite_script(&source, ctx), ContentType::Html);
        } else {
            chunk.remove();
        }
        Ok(())
    }));

    let rewritten = rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    );
    rewritten
}

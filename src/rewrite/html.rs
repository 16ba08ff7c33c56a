//! Bootstrap snippet injection.
//!
//! The snippet publishes the proxy prefix, the page URL and the page origin
//! as globals, then loads the companion client script which takes care of
//! rewriting navigation and network calls at runtime.
//!
//! Placement:
//! - first child of the first `<head>`
//! - otherwise a synthesized `<head>` right after the opening `<html>` tag
//! - otherwise in front of the whole document

use std::cell::Cell;

use lol_html::errors::RewritingError;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};

use crate::codec::PROXY_PREFIX;
use crate::rewrite::RewriteContext;

/// Emit `value` as a JavaScript string literal safe to embed in `<script>`.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned())
        .to_string()
        .replace("</", "<\\/")
}

/// Build the bootstrap snippet for a page.
pub fn bootstrap_snippet(client_script: &str, ctx: &RewriteContext) -> String {
    format!(
        concat!(
            r#"<script data-proxy="true">"#,
            "window.__PROXY_PREFIX__={prefix};",
            "window.__PROXY_BASE__={base};",
            "window.__PROXY_ORIGIN__={origin};",
            "</script>",
            r#"<script data-proxy="true" src="{script}"></script>"#,
        ),
        prefix = js_string(PROXY_PREFIX),
        base = js_string(ctx.base().as_str()),
        origin = js_string(&ctx.origin()),
        script = client_script.replace('"', "&quot;"),
    )
}

/// Which landmark elements a document actually contains.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Landmarks {
    head: bool,
    html: bool,
}

fn find_landmarks(document: &str) -> Result<Landmarks, RewritingError> {
    let head = Cell::new(false);
    let html = Cell::new(false);
    rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("head", |_el| {
                    head.set(true);
                    Ok(())
                }),
                element!("html", |_el| {
                    html.set(true);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(Landmarks {
        head: head.get(),
        html: html.get(),
    })
}

/// Prepend `content` to the first element matching `selector`.
fn prepend_first(document: &str, selector: &str, content: &str) -> Result<String, RewritingError> {
    let done = Cell::new(false);
    let rewritten = rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                if !done.replace(true) {
                    el.prepend(content, ContentType::Html);
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    rewritten
}

/// Insert `snippet` into an HTML document.
///
/// Tag names are matched by the tokenizer, so `<HEAD>` counts as a head
/// while `<header>` or a `<head>` inside a comment or script does not.
pub fn inject(document: &str, snippet: &str) -> Result<String, RewritingError> {
    let landmarks = find_landmarks(document)?;
    if landmarks.head {
        prepend_first(document, "head", snippet)
    } else if landmarks.html {
        prepend_first(document, "html", &format!("<head>{snippet}</head>"))
    } else {
        Ok(format!("{snippet}{document}"))
    }
}

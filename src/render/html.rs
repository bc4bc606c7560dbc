//! Built-in HTML renderer.
//!
//! Templates:
//! - `default`: full document with head, header, generated navigation, body slots, footer
//! - `bare`: body slots only
//!
//! Fragments may contain `{{ key }}` placeholders, replaced by the message for
//! `key` in the rendering language (HTML-escaped).

use std::borrow::Cow;
use std::fmt::Write;

use crate::render::{
    Fragments, NavContext, RenderError, Renderer, BODY_PREFIX, FOOTER, HEAD, HEADER, NAV_PREFIX,
    ORGANIZATION, STYLESHEETS, TITLE,
};
use crate::site::catalog::MessageResolver;
use crate::site::menu::NavEntry;

const MAIN_NAV: &str = "main";

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn document(
        &self,
        fragments: &Fragments,
        nav: &NavContext<'_>,
        messages: &dyn MessageResolver,
    ) -> Result<String, RenderError> {
        let title = messages.message(fragments.get(TITLE).unwrap_or_default());
        let organization = fragments.get(ORGANIZATION).unwrap_or_default();

        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html>\n");
        let _ = writeln!(out, "<html lang=\"{}\">", escape(nav.language));
        out.push_str("<head>\n<meta charset=\"utf-8\">\n");
        if organization.is_empty() {
            let _ = writeln!(out, "<title>{}</title>", escape(&title));
        } else {
            let _ = writeln!(out, "<title>{} | {}</title>", escape(&title), escape(organization));
        }
        for href in fragments.get(STYLESHEETS).unwrap_or_default().lines() {
            let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", escape(href));
        }
        if let Some(head) = fragments.get(HEAD).filter(|h| !h.is_empty()) {
            out.push_str(head);
            out.push('\n');
        }
        out.push_str("</head>\n<body>\n");

        let header = interpolate(HEADER, fragments.get(HEADER).unwrap_or_default(), messages)?;
        let _ = writeln!(out, "<header>{}</header>", header);

        let overrides: Vec<(&str, &str)> = fragments.slots(NAV_PREFIX).collect();
        match overrides.iter().find(|(slot, _)| *slot == MAIN_NAV) {
            Some((_, html)) => {
                let html = interpolate("nav.main", html, messages)?;
                let _ = writeln!(out, "<nav data-slot=\"main\">{}</nav>", html);
            }
            None => {
                let _ = writeln!(out, "<nav data-slot=\"main\">{}</nav>", menu(nav.root, nav.current));
            }
        }
        for (slot, html) in overrides.iter().filter(|(slot, _)| *slot != MAIN_NAV) {
            let html = interpolate(&format!("{}{}", NAV_PREFIX, slot), html, messages)?;
            let _ = writeln!(out, "<nav data-slot=\"{}\">{}</nav>", escape(slot), html);
        }

        out.push_str("<main>\n");
        self.body(&mut out, fragments, messages)?;
        out.push_str("</main>\n");

        let footer = interpolate(FOOTER, fragments.get(FOOTER).unwrap_or_default(), messages)?;
        let _ = writeln!(out, "<footer>{}</footer>", footer);
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn body(
        &self,
        out: &mut String,
        fragments: &Fragments,
        messages: &dyn MessageResolver,
    ) -> Result<(), RenderError> {
        for (slot, html) in fragments.slots(BODY_PREFIX) {
            let html = interpolate(&format!("{}{}", BODY_PREFIX, slot), html, messages)?;
            let _ = writeln!(out, "<section data-slot=\"{}\">{}</section>", escape(slot), html);
        }
        Ok(())
    }
}

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        template: &str,
        fragments: &Fragments,
        nav: &NavContext<'_>,
        messages: &dyn MessageResolver,
    ) -> Result<String, RenderError> {
        match template {
            "default" => self.document(fragments, nav, messages),
            "bare" => {
                if fragments.slots(BODY_PREFIX).next().is_none() {
                    return Err(RenderError::MissingFragment {
                        template: template.to_string(),
                        fragment: "body".to_string(),
                    });
                }
                let mut out = String::new();
                self.body(&mut out, fragments, messages)?;
                Ok(out)
            }
            other => Err(RenderError::UnknownTemplate(other.to_string())),
        }
    }
}

/// Render the navigation tree as nested lists, marking the current page.
fn menu(root: &NavEntry, current: &str) -> String {
    let mut out = String::new();
    menu_level(&mut out, root, current);
    out
}

fn menu_level(out: &mut String, entry: &NavEntry, current: &str) {
    if entry.children.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for child in entry.sorted_children() {
        if child.name == current {
            out.push_str("<li class=\"active\">");
        } else {
            out.push_str("<li>");
        }
        let _ = write!(out, "<a href=\"{}\">", escape(&child.href));
        if let Some(icon) = &child.icon {
            let _ = write!(out, "<i class=\"icon {}\"></i>", escape(icon));
        }
        let _ = write!(out, "{}</a>", escape(&child.label));
        menu_level(out, child, current);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

/// Replace `{{ key }}` placeholders with escaped messages.
fn interpolate(fragment: &str, src: &str, messages: &dyn MessageResolver) -> Result<String, RenderError> {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    let mut consumed = 0;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or_else(|| RenderError::UnterminatedPlaceholder {
            fragment: fragment.to_string(),
            offset: consumed + open,
        })?;
        let key = after[..close].trim();
        out.push_str(&escape(&messages.message(key)));
        let advance = open + 2 + close + 2;
        consumed += advance;
        rest = &rest[advance..];
    }
    out.push_str(rest);
    Ok(out)
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

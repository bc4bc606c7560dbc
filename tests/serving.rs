//! End-to-end serving tests.

use std::sync::Arc;

use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_TYPE, HOST};
use reqwest::StatusCode;
use sitehost::config::parse_config;
use sitehost::render::{Fragments, HtmlRenderer, NavContext, RenderError, Renderer};
use sitehost::site::{MessageResolver, Page, TranslationResource};

mod common;

const SITE: &str = r#"
[welcome]
message = "Welcome to sitehost"

[[tenants]]
name = "t"
domains = ["t.test"]
default_language = "en"
languages = ["en", "fr"]

[tenants.meta]
organization = "T Corp"

[[pages]]
tenant = "t"
name = "home"
path = "/"
title = "Home"
[pages.content.body]
main = "<h1>{{ greeting }}</h1>"

[[translations]]
tenant = "t"
name = "greetings"
[[translations.entries]]
language = "en"
messages = { greeting = "Hello" }
[[translations.entries]]
language = "fr"
messages = { greeting = "Bonjour" }

[[tenants]]
name = "broad"
domains = ["*.example.com"]
default_language = "en"

[[pages]]
tenant = "broad"
name = "home"
path = "/"
[pages.content.body]
main = "broad tenant"

[[tenants]]
name = "narrow"
domains = ["*.b.example.com"]
default_language = "en"

[[pages]]
tenant = "narrow"
name = "home"
path = "/"
[pages.content.body]
main = "narrow tenant"
"#;

#[tokio::test]
async fn test_negotiated_language_is_served() {
    let server = common::start_server(SITE).await;
    let client = common::client();

    for (url, accept) in [
        (server.url("/?lang=fr"), None),
        (server.url("/fr/"), None),
        (server.url("/"), Some("fr-FR, en;q=0.5")),
    ] {
        let mut req = client.get(url).header(HOST, "t.test:8080");
        if let Some(accept) = accept {
            req = req.header(ACCEPT_LANGUAGE, accept);
        }
        let res = req.send().await.expect("server unreachable");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_LANGUAGE], "fr");
        assert!(res.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        assert!(res.headers().contains_key("x-request-id"));
        let body = res.text().await.unwrap();
        assert!(body.contains("Bonjour"), "body was: {}", body);
    }

    let res = client.get(server.url("/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.headers()[CONTENT_LANGUAGE], "en");
    assert!(res.text().await.unwrap().contains("<h1>Hello</h1>"));
}

#[tokio::test]
async fn test_longest_wildcard_selects_tenant() {
    let server = common::start_server(SITE).await;
    let client = common::client();

    let body = |host: &'static str| {
        let req = client.get(server.url("/")).header(HOST, host);
        async move { req.send().await.unwrap().text().await.unwrap() }
    };
    assert!(body("a.b.example.com").await.contains("narrow tenant"));
    assert!(body("c.example.com").await.contains("broad tenant"));
}

#[tokio::test]
async fn test_unknown_host_gets_welcome() {
    let server = common::start_server(SITE).await;
    let res = common::client()
        .get(server.url("/anything"))
        .header(HOST, "nobody.test")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert_eq!(res.text().await.unwrap(), "Welcome to sitehost");
}

#[tokio::test]
async fn test_not_found_and_methods() {
    let server = common::start_server(SITE).await;
    let client = common::client();

    let res = client.get(server.url("/missing")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Unsupported language prefix is just an unknown path.
    let res = client.get(server.url("/de/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.post(server.url("/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = client.head(server.url("/fr/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_LANGUAGE], "fr");
}

#[tokio::test]
async fn test_later_translation_resource_wins() {
    let server = common::start_server(SITE).await;
    let handler = server.sites.get("t").unwrap();
    handler.set_translation(TranslationResource::new("first").with_message("fr", "key", "A"));
    handler.set_translation(TranslationResource::new("second").with_message("fr", "key", "B"));
    handler.set_page(Page::new("k", "/k").with_body("main", "[{{ key }}]"));

    let res = common::client()
        .get(server.url("/fr/k"))
        .header(HOST, "t.test")
        .send()
        .await
        .unwrap();
    assert!(res.text().await.unwrap().contains("[B]"));
}

#[tokio::test]
async fn test_deleted_page_is_not_found() {
    let server = common::start_server(SITE).await;
    let client = common::client();
    let handler = server.sites.get("narrow").unwrap();
    let held = handler.table();

    handler.delete_page("home");
    let res = client.get(server.url("/")).header(HOST, "x.b.example.com").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(held.get("/", "en").is_some());
}

/// Fails every French render.
struct NoFrench(HtmlRenderer);

impl Renderer for NoFrench {
    fn render(
        &self,
        template: &str,
        fragments: &Fragments,
        nav: &NavContext<'_>,
        messages: &dyn MessageResolver,
    ) -> Result<String, RenderError> {
        if messages.language() == "fr" {
            return Err(RenderError::UnknownTemplate(template.to_string()));
        }
        self.0.render(template, fragments, nav, messages)
    }
}

#[tokio::test]
async fn test_failed_language_is_not_found_without_fallback() {
    let server = common::start_server_with(SITE, Arc::new(NoFrench(HtmlRenderer::new()))).await;
    let client = common::client();

    let res = client.get(server.url("/fr/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.get(server.url("/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.sites.get("t").unwrap().table().omitted(), 1);
}

#[tokio::test]
async fn test_config_update_is_applied() {
    let server = common::start_server(SITE).await;
    let client = common::client();

    let mut updated = parse_config(SITE).unwrap();
    updated.pages.retain(|p| p.tenant != "t");
    updated
        .pages
        .push(toml::from_str("tenant = \"t\"\nname = \"news\"\npath = \"/news\"\n").unwrap());
    server.updates.send(updated).unwrap();

    let ok = common::eventually(|| {
        let req = client.get(server.url("/news")).header(HOST, "t.test");
        async move { req.send().await.map(|r| r.status() == StatusCode::OK).unwrap_or(false) }
    })
    .await;
    assert!(ok, "new page never appeared");

    let res = client.get(server.url("/")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_percent_encoded_path_reaches_page() {
    let server = common::start_server(SITE).await;
    let client = common::client();
    server
        .sites
        .get("t")
        .unwrap()
        .set_page(Page::new("uber", "/über").with_body("main", "umlaut page"));

    for (path, language) in [("/%C3%BCber", "en"), ("/fr/%C3%BCber", "fr")] {
        let res = client.get(server.url(path)).header(HOST, "t.test").send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "path {}", path);
        assert_eq!(res.headers()[CONTENT_LANGUAGE], language);
        assert!(res.text().await.unwrap().contains("umlaut page"));
    }

    let res = client.get(server.url("/%FF%FE")).header(HOST, "t.test").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_welcome_message_follows_config_update() {
    let server = common::start_server(SITE).await;
    let client = common::client();

    let mut updated = parse_config(SITE).unwrap();
    updated.welcome.message = "Nothing here yet".to_string();
    server.updates.send(updated).unwrap();

    let ok = common::eventually(|| {
        let req = client.get(server.url("/")).header(HOST, "nobody.test");
        async move {
            match req.send().await {
                Ok(res) => res.text().await.map(|t| t == "Nothing here yet").unwrap_or(false),
                Err(_) => false,
            }
        }
    })
    .await;
    assert!(ok, "welcome message never changed");
}

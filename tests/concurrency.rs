//! Concurrent reads while tenant configuration churns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::HOST;
use reqwest::StatusCode;
use sitehost::site::{Page, TranslationResource};

mod common;

const SITE: &str = r#"
[[tenants]]
name = "busy"
domains = ["busy.test"]
default_language = "en"
languages = ["fr", "de"]

[[pages]]
tenant = "busy"
name = "home"
path = "/"
[pages.content.body]
main = "{{ greeting }}"
"#;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_never_see_a_missing_table() {
    let server = common::start_server(SITE).await;
    let handler = server.sites.get("busy").unwrap();
    let stop = Arc::new(AtomicBool::new(false));

    // Writer: churn pages and translations on a plain thread.
    let writer = {
        let handler = handler.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut i = 0u32;
            while !stop.load(Ordering::SeqCst) {
                handler.set_page(Page::new(format!("p{}", i % 10), format!("/p/{}", i % 10)));
                handler.set_translation(
                    TranslationResource::new("churn").with_message("fr", "greeting", format!("Salut {}", i)),
                );
                if i % 3 == 0 {
                    handler.delete_page(&format!("p{}", (i + 5) % 10));
                }
                i += 1;
            }
            i
        })
    };

    let concurrency = 10;
    let requests_per_task = 30;
    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = server.url("/fr/");
        tasks.push(tokio::spawn(async move {
            let (mut ok, mut localized) = (0, 0);
            for _ in 0..requests_per_task {
                let res = client.get(&url).header(HOST, "busy.test").send().await.unwrap();
                if res.status() == StatusCode::OK {
                    ok += 1;
                    if res.text().await.unwrap().contains("Salut") {
                        localized += 1;
                    }
                }
            }
            (ok, localized)
        }));
    }

    let (mut total_ok, mut total_localized) = (0, 0);
    for task in tasks {
        let (ok, localized) = task.await.unwrap();
        total_ok += ok;
        total_localized += localized;
    }
    stop.store(true, Ordering::SeqCst);
    let rebuild_rounds = writer.join().unwrap();

    println!(
        "{} requests in {:?} during {} churn rounds",
        concurrency * requests_per_task,
        start.elapsed(),
        rebuild_rounds
    );
    // The home page is never deleted, so no request may miss it.
    assert_eq!(total_ok, concurrency * requests_per_task);
    // Early requests may predate the first "Salut".
    assert!(total_localized > 0);
    assert!(handler.serve("/", "fr").is_some());
}

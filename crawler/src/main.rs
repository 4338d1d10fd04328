use anyhow::{Context, Result};
use clap::Parser;
use lazy_static::lazy_static;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::{fmt, EnvFilter};

lazy_static! {
    static ref SEL_A: Selector = Selector::parse("a[href]").expect("valid selector");
    static ref SEL_TITLE: Selector = Selector::parse(r#"h1[property="dcterms:title"]"#).expect("valid selector");
}

const NO_TITLE: &str = "No Title";

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Download Project Gutenberg books into a directory of doc_NNNNN.json corpus files")]
struct Cli {
    /// Listing page to collect book links from
    #[arg(long, default_value = "https://www.gutenberg.org/browse/scores/top")]
    start_url: String,
    /// Output directory; files already in it are removed first
    #[arg(long, default_value = "./data/documents")]
    output: PathBuf,
    /// Maximum number of documents to save
    #[arg(long, default_value_t = 40_000)]
    max_docs: usize,
    /// Maximum number of book pages taken from the listing
    #[arg(long, default_value_t = 100)]
    max_books: usize,
    /// Pause after each book, in milliseconds
    #[arg(long, default_value_t = 1_000)]
    delay_ms: u64,
    /// Request timeout seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// User-Agent string sent with every request
    #[arg(long, default_value = "ir-crawler/0.1")]
    user_agent: String,
}

/// On-disk corpus document, read back by `ir_core::corpus::load_corpus`.
#[derive(Serialize)]
struct OutDoc<'a> {
    url: &'a str,
    title: &'a str,
    content: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let start = Url::parse(&args.start_url).with_context(|| format!("invalid start url {}", args.start_url))?;

    let removed = prepare_output_dir(&args.output)?;
    if removed > 0 {
        tracing::info!(removed, dir = %args.output.display(), "cleared output directory");
    }

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let listing = fetch_text(&client, &start).await.with_context(|| format!("fetching {start}"))?;
    let books = book_links(&listing, &start, args.max_books);
    tracing::info!(
        books = books.len(),
        max_docs = args.max_docs,
        output = %args.output.display(),
        "listing parsed"
    );

    let mut saved = 0usize;
    for book in books {
        if saved >= args.max_docs {
            break;
        }
        match fetch_book(&client, &book).await {
            Ok(Some((text_url, title, content))) => {
                let doc = OutDoc { url: text_url.as_str(), title: &title, content: &content };
                let path = write_document(&args.output, saved, &doc)?;
                tracing::debug!(path = %path.display(), %title, "document saved");
                saved += 1;
                if saved % 100 == 0 {
                    tracing::info!(saved, "progress");
                }
            }
            Ok(None) => tracing::debug!(%book, "no plain text link"),
            Err(e) => tracing::warn!(%book, error = %e, "fetch failed"),
        }
        sleep(Duration::from_millis(args.delay_ms)).await;
    }

    tracing::info!(saved, output = %args.output.display(), "done");
    Ok(())
}

async fn fetch_text(client: &Client, url: &Url) -> Result<String> {
    let resp = client.get(url.clone()).send().await?.error_for_status()?;
    Ok(resp.text().await?)
}

/// Text url, title and text of one book, or `None` when its page offers no
/// plain-text rendition.
async fn fetch_book(client: &Client, book: &Url) -> Result<Option<(Url, String, String)>> {
    let page = fetch_text(client, book).await?;
    let Some((text_url, title)) = parse_book_page(&page, book) else {
        return Ok(None);
    };
    let content = fetch_text(client, &text_url).await.with_context(|| format!("downloading {text_url}"))?;
    Ok(Some((text_url, title, content)))
}

/// Book pages linked from a listing, first occurrence order, at most `limit`.
fn book_links(html: &str, base: &Url, limit: usize) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut books = Vec::new();
    for a in doc.select(&SEL_A) {
        if books.len() >= limit {
            break;
        }
        let Some(href) = a.value().attr("href") else { continue };
        if !is_book_path(href) {
            continue;
        }
        if let Ok(u) = base.join(href) {
            if seen.insert(u.to_string()) {
                books.push(u);
            }
        }
    }
    books
}

/// `/ebooks/<digits>` exactly.
fn is_book_path(href: &str) -> bool {
    href.strip_prefix("/ebooks/")
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_book_page(html: &str, page: &Url) -> Option<(Url, String)> {
    let doc = Html::parse_document(html);
    let text_url = text_link(&doc, page)?;
    Some((text_url, book_title(&doc)))
}

/// First link to a `.txt` rendition that is either the UTF-8 "noimages"
/// file or not a zip archive.
fn text_link(doc: &Html, page: &Url) -> Option<Url> {
    doc.select(&SEL_A)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| is_text_href(href))
        .and_then(|href| page.join(href).ok())
}

fn is_text_href(href: &str) -> bool {
    href.contains(".txt") && ((href.contains("utf-8") && href.contains("noimages")) || !href.contains("zip"))
}

fn book_title(doc: &Html) -> String {
    doc.select(&SEL_TITLE)
        .next()
        .map(|h1| h1.text().map(str::trim).collect::<String>())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Create `dir` if needed and delete the files already in it. Returns how
/// many were removed.
fn prepare_output_dir(dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn write_document(dir: &Path, n: usize, doc: &OutDoc<'_>) -> Result<PathBuf> {
    let path = dir.join(format!("doc_{n:05}.json"));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, doc)?;
    out.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LISTING: &str = r#"<html><body>
        <h2>Top 100 EBooks yesterday</h2>
        <ol>
          <li><a href="/ebooks/84">Frankenstein (1234)</a></li>
          <li><a href="/ebooks/1342">Pride and Prejudice (987)</a></li>
          <li><a href="/ebooks/84">Frankenstein (1234)</a></li>
          <li><a href="/ebooks/search/?sort_order=downloads">more</a></li>
          <li><a href="/ebooks/84.txt.utf-8">text</a></li>
          <li><a href="/ebooks/">all</a></li>
          <li><a href="https://example.org/ebooks/5">elsewhere</a></li>
          <li><a>no href</a></li>
          <li><a href="/ebooks/2701">Moby Dick (700)</a></li>
        </ol>
    </body></html>"#;

    const BOOK_PAGE: &str = r#"<html><body>
        <h1 itemprop="name" property="dcterms:title">  Frankenstein; Or, The Modern Prometheus </h1>
        <table class="files">
          <tr><td><a href="/ebooks/84.epub.noimages">EPUB</a></td></tr>
          <tr><td><a href="/cache/epub/84/pg84.txt.zip">zipped text</a></td></tr>
          <tr><td><a href="/ebooks/84.txt.utf-8">Plain Text UTF-8</a></td></tr>
          <tr><td><a href="/files/84/84-0.txt">older text</a></td></tr>
        </table>
    </body></html>"#;

    fn gutenberg(path: &str) -> Url {
        Url::parse("https://www.gutenberg.org").unwrap().join(path).unwrap()
    }

    #[test]
    fn listing_yields_unique_book_pages_in_order() {
        let base = gutenberg("/browse/scores/top");
        let books = book_links(LISTING, &base, 100);
        assert_eq!(books, vec![gutenberg("/ebooks/84"), gutenberg("/ebooks/1342"), gutenberg("/ebooks/2701")]);
    }

    #[test]
    fn listing_respects_book_limit() {
        let base = gutenberg("/browse/scores/top");
        assert_eq!(book_links(LISTING, &base, 1), vec![gutenberg("/ebooks/84")]);
        assert!(book_links(LISTING, &base, 0).is_empty());
    }

    #[test]
    fn book_path_shape() {
        assert!(is_book_path("/ebooks/1"));
        assert!(!is_book_path("/ebooks/"));
        assert!(!is_book_path("/ebooks/12a"));
        assert!(!is_book_path("ebooks/12"));
    }

    #[test]
    fn book_page_picks_first_plain_text_link_and_title() {
        let page = gutenberg("/ebooks/84");
        let (text_url, title) = parse_book_page(BOOK_PAGE, &page).unwrap();
        assert_eq!(text_url, gutenberg("/ebooks/84.txt.utf-8"));
        assert_eq!(title, "Frankenstein; Or, The Modern Prometheus");
    }

    #[test]
    fn noimages_text_wins_even_when_zipped_name() {
        assert!(is_text_href("/ebooks/84.txt.utf-8.noimages.zip"));
        assert!(!is_text_href("/cache/epub/84/pg84.txt.zip"));
        assert!(!is_text_href("/ebooks/84.epub.noimages"));
    }

    #[test]
    fn book_page_without_text_or_title() {
        let page = gutenberg("/ebooks/1");
        assert!(parse_book_page(r#"<a href="/ebooks/1.epub">epub</a>"#, &page).is_none());
        let (url, title) = parse_book_page(r#"<a href="https://mirror.example/1.txt">txt</a>"#, &page).unwrap();
        assert_eq!(url.as_str(), "https://mirror.example/1.txt");
        assert_eq!(title, NO_TITLE);
    }

    #[test]
    fn written_documents_load_as_a_corpus() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("doc_00007.json"), r#"{"content":"stale"}"#).unwrap();
        assert_eq!(prepare_output_dir(dir.path()).unwrap(), 1);

        let first = OutDoc { url: "https://www.gutenberg.org/ebooks/84.txt.utf-8", title: "Frankenstein", content: "It was on a dreary night." };
        let second = OutDoc { url: "https://www.gutenberg.org/ebooks/1342.txt.utf-8", title: "Pride and Prejudice", content: "It is a truth universally acknowledged." };
        let path = write_document(dir.path(), 0, &first).unwrap();
        assert_eq!(path.file_name().unwrap(), "doc_00000.json");
        write_document(dir.path(), 1, &second).unwrap();

        let docs = ir_core::corpus::load_corpus(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title.as_deref(), Some("Frankenstein"));
        assert_eq!(docs[0].url.as_deref(), Some(first.url));
        assert_eq!(docs[1].content, second.content);
    }

    #[test]
    fn prepare_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("data").join("documents");
        assert_eq!(prepare_output_dir(&out).unwrap(), 0);
        assert!(out.is_dir());
    }
}

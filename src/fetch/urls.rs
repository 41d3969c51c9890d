// src/fetch/urls.rs

use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Parse the directory URL, making sure relative joins stay inside it.
pub fn parse_base(base_url: &str) -> Result<Url> {
    let mut s = base_url.trim().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Url::parse(&s).with_context(|| format!("parsing base URL {}", base_url))
}

pub fn file_url(base: &Url, file_id: &str) -> Result<Url> {
    base.join(file_id)
        .with_context(|| format!("joining {} onto {}", file_id, base))
}

/// File names linked from a directory listing that start with `prefix`,
/// sorted and deduplicated.
pub fn extract_file_links(html: &str, prefix: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("selector should parse");

    let mut names: Vec<String> = document
        .select(&selector)
        .filter_map(|elem| elem.value().attr("href"))
        .filter_map(|href| href.trim_end_matches('/').rsplit('/').next())
        .filter(|name| name.starts_with(prefix))
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Scrape the listing at `base` for published files starting with `prefix`.
pub async fn list_remote_files(client: &Client, base: &Url, prefix: &str) -> Result<Vec<String>> {
    let html = client
        .get(base.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", base))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", base))?;

    Ok(extract_file_links(&html, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_adds_trailing_slash() {
        let base = parse_base("https://download.bls.gov/pub/time.series/la").unwrap();
        let url = file_url(&base, "la.area").unwrap();
        assert_eq!(url.as_str(), "https://download.bls.gov/pub/time.series/la/la.area");
    }

    #[test]
    fn test_extract_file_links() {
        let html = r#"<html><body><pre>
            <a href="/pub/time.series/">[To Parent Directory]</a><br>
            <a href="/pub/time.series/la/la.area">la.area</a><br>
            <a href="/pub/time.series/la/la.data.0.CurrentU10-14">la.data.0.CurrentU10-14</a><br>
            <a href="/pub/time.series/la/la.data.0.CurrentU90-94">la.data.0.CurrentU90-94</a><br>
            <a href="la.data.0.CurrentU10-14">dup</a>
            <a href="/pub/time.series/la/la.data.1.AllStatesU">la.data.1.AllStatesU</a><br>
        </pre></body></html>"#;

        assert_eq!(
            extract_file_links(html, "la.data.0.CurrentU"),
            vec!["la.data.0.CurrentU10-14", "la.data.0.CurrentU90-94"]
        );
    }
}

//! Web search tool
//!
//! DuckDuckGo HTML search, no API key required. Results are reduced to
//! title/snippet/URL triples the model can cite from.

use std::time::Duration;

use reqwest::Client;

use crate::core::config::SearchConfig;
use crate::core::Result;

/// Tool name the model uses to request a search
pub const NAME: &str = "web_search";

/// DuckDuckGo HTML search client
pub struct WebSearch {
    client: Client,
    max_results: usize,
}

impl WebSearch {
    pub fn from_config(config: &SearchConfig) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; edp-assistant/0.3)")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_results: config.max_results,
        }
    }

    /// Run a query and render the top results as citation-ready text
    pub async fn search(&self, query: &str) -> Result<String> {
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );

        let html = self.client.get(&url).send().await?.text().await?;
        let results = extract_results(&html, self.max_results);

        if results.is_empty() {
            Ok(format!("No results found for: {}", query))
        } else {
            Ok(results.join("\n\n"))
        }
    }
}

/// Extract result triples from the DuckDuckGo HTML page
fn extract_results(html: &str, max_results: usize) -> Vec<String> {
    let mut results = Vec::new();

    for chunk in html.split("class=\"result__body\"").skip(1) {
        if results.len() >= max_results {
            break;
        }

        let title = field(chunk, "class=\"result__a\"");
        let snippet = field(chunk, "class=\"result__snippet\"");
        let url = field(chunk, "class=\"result__url\"");

        if let Some(title) = title {
            results.push(format!(
                "{}\n{}\nURL: {}",
                html_decode(&title),
                html_decode(snippet.as_deref().unwrap_or("")),
                url.as_deref().unwrap_or("").trim()
            ));
        }
    }

    results
}

/// Pull the text of the first element carrying the given class attribute
fn field(chunk: &str, marker: &str) -> Option<String> {
    let text = chunk
        .split(marker)
        .nth(1)?
        .split('>')
        .nth(1)?
        .split('<')
        .next()?
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Basic HTML entity decoding
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <div class="result__body">
            <a class="result__a" href="https://example.com/one">First &amp; Best</a>
            <a class="result__snippet" href="#">All about the first result</a>
            <span class="result__url" href="#"> example.com/one </span>
        </div>
        <div class="result__body">
            <a class="result__a" href="https://example.com/two">Second</a>
            <a class="result__snippet" href="#">Another snippet</a>
            <span class="result__url" href="#"> example.com/two </span>
        </div>
    "##;

    #[test]
    fn test_extract_results() {
        let results = extract_results(PAGE, 3);
        assert_eq!(results.len(), 2);
        assert!(results[0].contains("First & Best"));
        assert!(results[0].contains("URL: example.com/one"));
    }

    #[test]
    fn test_max_results_cap() {
        let results = extract_results(PAGE, 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_no_results() {
        assert!(extract_results("<html></html>", 3).is_empty());
    }

    #[test]
    fn test_html_decode() {
        assert_eq!(html_decode("a &amp; b &lt;c&gt;"), "a & b <c>");
    }
}

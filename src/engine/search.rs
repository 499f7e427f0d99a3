// Seraph Server — Web Lookup
// Trigger-keyword detection plus a DuckDuckGo HTML lookup (no API key).
// Results come back as a short French-formatted block the orchestrator
// splices into the system prompt; the caller decides what a failure turns
// into, so composition never aborts on a dead network.

use log::info;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::atoms::constants::LOOKUP_TRIGGERS;
use crate::atoms::error::ServerResult;

const RESULT_LIMIT: usize = 5;
const SNIPPET_CHARS: usize = 150;
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// True when the message mentions anything from the trigger list
/// (case-insensitive substring match).
pub fn needs_lookup(message: &str) -> bool {
    let lowered = message.to_lowercase();
    LOOKUP_TRIGGERS.iter().any(|kw| lowered.contains(kw))
}

#[derive(Clone)]
pub struct LookupClient {
    client: Client,
    endpoint: String,
}

impl LookupClient {
    pub fn new(endpoint: &str) -> Self {
        LookupClient {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Run the query and format the top results, one line each.
    pub async fn run(&self, query: &str) -> ServerResult<String> {
        info!("[search] lookup: '{}'", query);
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();

        let resp = self
            .client
            .get(format!("{}?{}", self.endpoint, encoded))
            .send()
            .await?;
        let html = resp.text().await?;

        Ok(format_results(&parse_results(&html)))
    }
}

/// (title, snippet) pairs from the DuckDuckGo HTML result page.
fn parse_results(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let result_sel = Selector::parse(".result").unwrap();
    let title_sel = Selector::parse(".result__a").unwrap();
    let snippet_sel = Selector::parse(".result__snippet").unwrap();

    let mut results = Vec::new();
    for element in document.select(&result_sel).take(RESULT_LIMIT) {
        let title = element
            .select(&title_sel)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();
        if !title.is_empty() {
            results.push((title, snippet));
        }
    }
    results
}

fn format_results(results: &[(String, String)]) -> String {
    if results.is_empty() {
        return "Aucun resultat.".to_string();
    }
    results
        .iter()
        .map(|(title, snippet)| {
            let clipped: String = snippet.chars().take(SNIPPET_CHARS).collect();
            format!("- {}: {}", title, clipped)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ──────────────────────────────────────────────────────────────────

//! # Water-Rights Search Hints
//!
//! Query templates for finding a jurisdiction's groundwater rules, and a
//! keyword weight table for ranking candidate source URLs. Weights are
//! spaced so that one heavier keyword outranks any combination of lighter
//! ones.

use serde::Serialize;

/// Search queries; `{jurisdiction}` is replaced with the jurisdiction name.
pub const WATER_RIGHTS_QUESTION_TEMPLATES: &[&str] = &[
    "{jurisdiction} rules",
    "{jurisdiction} management plan",
    "{jurisdiction} well permits",
    "{jurisdiction} well permit requirements",
    "requirements to drill a water well in {jurisdiction}",
];

/// URL keyword weights, heaviest first. Matched against the lowercased URL.
pub const BEST_WATER_RIGHTS_ORDINANCE_WEBSITE_URL_KEYWORDS: &[(&str, u64)] = &[
    ("pdf", 92160),
    ("water", 46080),
    ("rights", 23040),
    ("zoning", 11520),
    ("ordinance", 5760),
    ("renewable%20energy", 1440),
    ("renewable+energy", 1440),
    ("renewable energy", 1440),
    ("planning", 720),
    ("plan", 360),
    ("government", 180),
    ("code", 60),
    ("area", 60),
    ("land%20development", 15),
    ("land+development", 15),
    ("land development", 15),
    ("land", 3),
    ("environment", 3),
    ("energy", 3),
    ("renewable", 3),
    ("municipal", 1),
    ("department", 1),
];

/// Fill every template with `jurisdiction_name`.
pub fn render_questions(jurisdiction_name: &str) -> Vec<String> {
    WATER_RIGHTS_QUESTION_TEMPLATES
        .iter()
        .map(|t| t.replace("{jurisdiction}", jurisdiction_name))
        .collect()
}

/// Sum of the weights of every keyword contained in the lowercased URL.
pub fn score_url(url: &str) -> u64 {
    let url = url.to_lowercase();
    BEST_WATER_RIGHTS_ORDINANCE_WEBSITE_URL_KEYWORDS
        .iter()
        .filter(|(keyword, _)| url.contains(keyword))
        .map(|(_, weight)| weight)
        .sum()
}

/// A candidate URL with its keyword score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedUrl {
    pub url: String,
    pub score: u64,
}

/// Score `urls` and order them best first. Ties keep their input order.
pub fn rank_urls<I, S>(urls: I) -> Vec<RankedUrl>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ranked: Vec<RankedUrl> = urls
        .into_iter()
        .map(|u| {
            let url: String = u.into();
            let score = score_url(&url);
            RankedUrl { url, score }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

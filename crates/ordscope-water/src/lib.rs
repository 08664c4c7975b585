//! # ordscope-water: Water-Rights Bundle
//!
//! Domain pieces for groundwater conservation district rules: a pass-through
//! heuristic, a collector that gathers relevant chunks through the windowed
//! classifier (directly or as a scan callback), a merge-only extractor,
//! search query templates, and URL ranking.

pub mod collector;
pub mod processing;
pub mod search;

pub use collector::{CollectorCallback, WaterRightsHeuristic, WaterRightsTextCollector};
pub use processing::{collect_relevant_text, WaterRightsTextExtractor, CHECK_IF_LEGAL_DOC};
pub use search::{
    rank_urls, render_questions, score_url, RankedUrl,
    BEST_WATER_RIGHTS_ORDINANCE_WEBSITE_URL_KEYWORDS, WATER_RIGHTS_QUESTION_TEMPLATES,
};

//! # Verification Graph Compiler
//!
//! Builds the per-jurisdiction decision graphs walked by the executor.
//!
//! ## Content graph
//!
//! ```text
//! init -> has_name -> is_<tier> ...
//! ```
//!
//! Each tier above the jurisdiction's own tier asks whether the document is
//! about that broader tier: YES means the wrong granularity and goes straight
//! to `final`, NO moves to the next tier. The jurisdiction's own tier asks
//! whether the document is about it: YES goes to the unconditional
//! `has_<tier>_name` check, NO goes to `final`. Tiers missing from the
//! lineage (a city recorded without its county, a gore) emit no node.
//!
//! ## URL graph
//!
//! A straight line: `init -> [mentions_county] -> [mentions_city] -> final`,
//! one boolean verdict field per tier.
//!
//! ## Phrasing
//!
//! States read "Colorado state" and never "the state of ...", counties read
//! as bare proper nouns ("Jefferson County"), and subdivisions read as a
//! clause with its article ("the city of Golden", or "Buels Gore").

use ordscope_core::{GraphError, Jurisdiction, Tier};

use crate::graph::{GraphBuilder, VerificationGraph, VerificationMode, INIT, TERMINAL};

/// Verdict field of a content graph.
pub const CORRECT_JURISDICTION: &str = "correct_jurisdiction";

const YES_NO: &str = "Please start your response with either 'Yes' or 'No' and briefly \
    explain your answer.";

// ---------------------------------------------------------------------------
// Content graph
// ---------------------------------------------------------------------------

/// Compile the graph that verifies a document's text pertains to
/// `jurisdiction`.
///
/// # Errors
///
/// [`GraphError::Jurisdiction`] if the tier fields do not fit the type.
pub fn compile_content_graph(jurisdiction: &Jurisdiction) -> Result<VerificationGraph, GraphError> {
    jurisdiction.validate()?;

    let tiers = jurisdiction.tiers();
    let own = jurisdiction.jurisdiction_type().tier();

    let mut builder = GraphBuilder::new(VerificationMode::Content)
        .unconditional(INIT, content_context(jurisdiction), "has_name")
        .unconditional("has_name", has_name_prompt(jurisdiction), is_node(tiers[0]));

    for (i, &tier) in tiers.iter().enumerate() {
        let next = tiers
            .get(i + 1)
            .map(|&t| is_node(t))
            .unwrap_or_else(|| TERMINAL.to_string());

        if tier < own {
            builder = builder.branch(
                is_node(tier),
                broader_tier_prompt(jurisdiction, tier),
                TERMINAL,
                next,
            );
        } else {
            builder = builder
                .branch(
                    is_node(tier),
                    own_tier_prompt(jurisdiction, tier),
                    has_name_node(tier),
                    TERMINAL,
                )
                .unconditional(
                    has_name_node(tier),
                    name_check_prompt(jurisdiction, tier),
                    TERMINAL,
                );
            break;
        }
    }

    let graph = builder
        .terminal(content_final_prompt(jurisdiction), [CORRECT_JURISDICTION])
        .finish()?;
    tracing::debug!(
        jurisdiction = %jurisdiction,
        nodes = graph.len(),
        "compiled content verification graph"
    );
    Ok(graph)
}

fn is_node(tier: Tier) -> String {
    format!("is_{}", tier.as_str())
}

fn has_name_node(tier: Tier) -> String {
    format!("has_{}_name", tier.as_str())
}

fn content_context(j: &Jurisdiction) -> String {
    format!(
        "You are a legal scholar checking whether a document contains the \
         ordinances of one specific jurisdiction. I will ask you a series of \
         questions about the text you were given, one at a time. The target \
         jurisdiction is {}.",
        j.full_name()
    )
}

fn has_name_prompt(j: &Jurisdiction) -> String {
    format!(
        "Does the text mention any jurisdiction names? Look for {}, and list \
         every such name you find. {YES_NO}",
        j.names_to_extract()
    )
}

/// Prompt for a tier strictly above the jurisdiction's own tier. YES is a
/// mismatch.
fn broader_tier_prompt(j: &Jurisdiction, tier: Tier) -> String {
    match tier {
        Tier::State => format!(
            "Does the text contain regulations that apply to all of {} as a \
             whole, rather than to a single county or local government within \
             it? {YES_NO}",
            j.state_phrase()
        ),
        _ => format!(
            "Does the text contain regulations that apply to all of {} as a \
             whole, rather than to a single municipality or other area within \
             it? {YES_NO}",
            county_phrase(j)
        ),
    }
}

/// Prompt for the jurisdiction's own tier. YES continues to the name check.
fn own_tier_prompt(j: &Jurisdiction, tier: Tier) -> String {
    match tier {
        Tier::State => format!(
            "Does the text contain state-level regulations, such as statutes or \
             administrative rules adopted for {}? {YES_NO}",
            j.state_phrase()
        ),
        Tier::County => format!(
            "Does the text contain {}-level regulations, such as an ordinance \
             adopted by {}? {YES_NO}",
            j.jurisdiction_type(),
            county_phrase(j)
        ),
        Tier::Subdivision => format!(
            "Does the text contain local regulations adopted specifically by {}? \
             {YES_NO}",
            subdivision_clause(j)
        ),
    }
}

fn name_check_prompt(j: &Jurisdiction, tier: Tier) -> String {
    let target = match tier {
        Tier::State => j.state_phrase(),
        Tier::County => county_phrase(j),
        Tier::Subdivision => subdivision_clause(j),
    };
    format!(
        "Does the text explicitly name {target}, either in a heading, a title, \
         or the body of the regulations? {YES_NO}"
    )
}

fn content_final_prompt(j: &Jurisdiction) -> String {
    format!(
        "Based on the conversation so far, decide whether the text contains \
         legal regulations that apply to {name}. Respond with a JSON object \
         (not markdown) with exactly two keys. The first key is 'explanation', \
         a string summarizing your reasoning. The second key is \
         '{CORRECT_JURISDICTION}', a boolean that is true only if the \
         regulations apply to {name} and not to a broader or narrower \
         jurisdiction.",
        name = j.full_name()
    )
}

// ---------------------------------------------------------------------------
// URL graph
// ---------------------------------------------------------------------------

/// Compile the graph that verifies a source URL points at `jurisdiction`.
///
/// # Errors
///
/// [`GraphError::Jurisdiction`] if the tier fields do not fit the type.
pub fn compile_url_graph(jurisdiction: &Jurisdiction) -> Result<VerificationGraph, GraphError> {
    jurisdiction.validate()?;

    let mut steps: Vec<(&str, String)> = Vec::new();
    let mut fields = vec!["correct_state".to_string()];
    let mut checks = vec![format!(
        "'correct_state': true if the URL is for a page about {}",
        jurisdiction.state_phrase()
    )];

    if jurisdiction.county_name().is_some() {
        let county = county_phrase(jurisdiction);
        steps.push((
            "mentions_county",
            format!(
                "Does the URL mention {county} or an abbreviation of it? {YES_NO}"
            ),
        ));
        fields.push("correct_county".to_string());
        checks.push(format!(
            "'correct_county': true if the URL is for a page about {county}"
        ));
    }

    if jurisdiction.subdivision_name().is_some() {
        let clause = subdivision_clause(jurisdiction);
        let field = format!("correct_{}", jurisdiction.jurisdiction_type().slug());
        steps.push((
            "mentions_city",
            format!("Does the URL mention {clause} or an abbreviation of it? {YES_NO}"),
        ));
        checks.push(format!(
            "'{field}': true if the URL is for a page about {clause}"
        ));
        fields.push(field);
    }

    let first = steps.first().map(|(id, _)| *id).unwrap_or(TERMINAL);
    let mut builder = GraphBuilder::new(VerificationMode::Url).unconditional(
        INIT,
        url_context(jurisdiction),
        first,
    );
    for (i, (id, prompt)) in steps.iter().enumerate() {
        let next = steps.get(i + 1).map(|(id, _)| *id).unwrap_or(TERMINAL);
        builder = builder.unconditional(*id, prompt.clone(), next);
    }

    let final_prompt = format!(
        "Based on the conversation so far, respond with a JSON object (not \
         markdown) with the following boolean keys. {}. Also include an \
         'explanation' key with a short string summarizing your reasoning.",
        checks.join("; ")
    );

    let graph = builder.terminal(final_prompt, fields).finish()?;
    tracing::debug!(
        jurisdiction = %jurisdiction,
        nodes = graph.len(),
        "compiled URL verification graph"
    );
    Ok(graph)
}

fn url_context(j: &Jurisdiction) -> String {
    format!(
        "You are checking whether a URL points to legal documents for a \
         specific jurisdiction. I will ask you questions about the URL you \
         were given. Start by considering whether the URL mentions {} or an \
         abbreviation of it.",
        j.state_phrase()
    )
}

// Tier phrase fallbacks are only reached for lineages that lack the tier,
// which the compilers never ask about.
fn county_phrase(j: &Jurisdiction) -> String {
    j.full_county_phrase().unwrap_or_default()
}

fn subdivision_clause(j: &Jurisdiction) -> String {
    j.subdivision_clause().unwrap_or_default()
}

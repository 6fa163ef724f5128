//! Reduction of a raw Gemini response into exactly one caption outcome.
//!
//! Gemini may answer with generated text, with nothing, with a partially
//! populated envelope, or with a safety/policy block at either the candidate
//! or the prompt level. [`normalize`] probes those shapes in a fixed order and
//! never fails; [`clean_caption`] removes filler the model adds even when told
//! not to.

use crate::ai::gemini::types::{
    BlockReason, FinishReason, GenerateContentResponse, PromptFeedback,
};
use serde_json::Value;
use tracing::{debug, warn};

pub const SAFETY_REFUSAL: &str = "content blocked by safety settings";
pub const PROMPT_SAFETY_REFUSAL: &str = "content blocked by safety settings (prompt/image)";
pub const UNEXTRACTABLE_PLACEHOLDER: &str =
    "Could not generate the caption or the model response was empty.";

/// Leading filler the model prepends. Lowercase; matched case-insensitively.
const LEADING_FILLER: &[&str] = &[
    "claro, aqui está uma legenda:",
    "claro, aqui está:",
    "aqui está sua legenda:",
    "aqui está:",
    "legenda:",
    "opção 1:",
    "opção 2:",
    "opção 3:",
    "sure, here is a caption:",
    "sure, here is:",
    "here is your caption:",
    "here is:",
    "caption:",
    "option 1:",
    "option 2:",
    "option 3:",
];

/// Trailing filler sentences the model appends. Lowercase.
const TRAILING_FILLER: &[&str] = &[
    "escolha a opção que melhor se adapta ao seu estilo e à mensagem que você deseja transmitir.",
    "choose the option that best fits your style and the message you want to convey.",
];

/// Result of interpreting one model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Caption(String),
    Refused(String),
    /// No usable text and no recognizable refusal.
    Unextractable,
}

impl Outcome {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Caption(_) => "caption",
            Outcome::Refused(_) => "refused",
            Outcome::Unextractable => "unextractable",
        }
    }

    /// The string handed back to the caller. Refusals and unextractable
    /// responses are reported inline, not as errors.
    pub fn into_legenda(self) -> String {
        match self {
            Outcome::Caption(text) | Outcome::Refused(text) => text,
            Outcome::Unextractable => UNEXTRACTABLE_PLACEHOLDER.to_string(),
        }
    }
}

/// Interpret a typed response. `None` stands for an absent response.
pub fn normalize(response: Option<&GenerateContentResponse>) -> Outcome {
    let Some(response) = response else {
        warn!("Model returned no response");
        return Outcome::Unextractable;
    };

    if let Some(text) = candidate_text(response).or_else(|| aggregate_text(response)) {
        return Outcome::Caption(clean_caption(&text));
    }

    if let Some(refusal) = refusal(response) {
        return refusal;
    }

    warn!(
        "Model response had no extractable text and no block reason: {:?}",
        response
    );
    Outcome::Unextractable
}

/// Interpret a raw response body as returned by the caption service.
///
/// Fields of an unexpected shape read as absent, so a misshapen field never
/// hides a usable caption or block reason elsewhere in the body. Only a body
/// that is not a JSON object at all is unextractable outright.
pub fn normalize_value(body: &Value) -> Outcome {
    if body.is_null() {
        return normalize(None);
    }

    match serde_json::from_value::<GenerateContentResponse>(body.clone()) {
        Ok(response) => normalize(Some(&response)),
        Err(e) => {
            warn!("Unexpected model response shape ({}): {}", e, body);
            Outcome::Unextractable
        }
    }
}

/// Joined text of the first candidate's parts, if any part carried some.
fn candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let parts = response
        .candidates
        .as_deref()?
        .first()?
        .content
        .as_ref()?
        .parts
        .as_deref()
        .filter(|parts| !parts.is_empty())?;

    let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    non_empty_trimmed(&text)
}

fn aggregate_text(response: &GenerateContentResponse) -> Option<String> {
    response.text.as_deref().and_then(non_empty_trimmed)
}

fn non_empty_trimmed(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn refusal(response: &GenerateContentResponse) -> Option<Outcome> {
    let first = response.candidates.as_deref().and_then(<[_]>::first);

    if let Some(candidate) = first.filter(|c| c.finish_reason == Some(FinishReason::Safety)) {
        warn!(
            "Generation blocked by safety settings; ratings: {:?}",
            candidate.safety_ratings
        );
        return Some(Outcome::Refused(SAFETY_REFUSAL.to_string()));
    }

    let feedback = response.prompt_feedback.as_ref()?;
    if feedback.block_reason == Some(BlockReason::Safety) {
        warn!(
            "Prompt blocked by safety settings; ratings: {:?}",
            feedback.safety_ratings
        );
        return Some(Outcome::Refused(PROMPT_SAFETY_REFUSAL.to_string()));
    }

    blocked_refusal(feedback)
}

/// `blocked: <message or reason>` for any prompt-level block reason.
fn blocked_refusal(feedback: &PromptFeedback) -> Option<Outcome> {
    let reason = feedback.block_reason?;
    let detail = feedback
        .block_reason_message
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(reason.as_str());
    debug!("Prompt blocked with reason {}", reason);
    Some(Outcome::Refused(format!("blocked: {}", detail)))
}

/// Strip filler phrasing from generated caption text.
///
/// Idempotent: cleaning an already clean caption returns it unchanged.
pub fn clean_caption(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let mut rest = text.trim();

    while let Some(stripped) = LEADING_FILLER
        .iter()
        .find_map(|phrase| strip_prefix_ignore_case(rest, phrase))
    {
        rest = stripped.trim_start_matches([':', ' ']).trim();
    }

    while let Some(stripped) = TRAILING_FILLER
        .iter()
        .find_map(|phrase| strip_suffix_ignore_case(rest, phrase))
    {
        rest = stripped.trim();
    }

    rest.to_string()
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Remainder of `text` after a case-insensitive `prefix`. Works on chars so
/// the returned slice always starts on a char boundary of `text`.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut text_chars = text.char_indices();
    for p in prefix.chars() {
        let (_, c) = text_chars.next()?;
        if !chars_eq_ignore_case(c, p) {
            return None;
        }
    }
    let offset = text_chars.next().map_or(text.len(), |(i, _)| i);
    Some(&text[offset..])
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let mut text_chars = text.char_indices().rev();
    let mut start = text.len();
    for s in suffix.chars().rev() {
        let (i, c) = text_chars.next()?;
        if !chars_eq_ignore_case(c, s) {
            return None;
        }
        start = i;
    }
    Some(&text[..start])
}

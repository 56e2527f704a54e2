//! Mood and tense table decoding.
//!
//! Within a voice section each mood lives in an element whose id is
//! `{prefix}_{suffix}` (`active_ind`, `prono_sub`, ...). A mood holds
//! `div.tense` blocks, each with an `h4` heading and one table.

use std::collections::BTreeMap;

use crate::dom::MarkupNode;
use crate::error::Result;
use crate::participle::extract_participle;
use crate::person::{compose_imperative, compose_standard};
use crate::types::{Mood, RawTense, RawVoice, Tense, Voice, PARTICIPLE_SECTION_SUFFIX};

/// Rows of a tense block: every `tr` holding at least one `td`.
pub fn table_rows<N: MarkupNode>(tense_block: N) -> Vec<N> {
    tense_block
        .descendants_by_tag("tr")
        .into_iter()
        .filter(|row| !row.children_by_tag("td").is_empty())
        .collect()
}

/// Heading text of a tense block, trimmed.
pub fn tense_heading<N: MarkupNode>(tense_block: N) -> Option<String> {
    tense_block
        .find_tag("h4")
        .map(|h4| h4.text_content().trim().to_string())
}

/// Decode every tense of one mood section.
///
/// Unrecognized or missing headings drop that tense with a warning.
pub fn decode_mood<N: MarkupNode>(
    section: N,
    mood: Mood,
    context: &str,
) -> Result<BTreeMap<Tense, RawTense>> {
    let mut tenses = BTreeMap::new();

    for block in section.descendants_by_class("div", "tense") {
        let Some(label) = tense_heading(block) else {
            tracing::warn!(context, mood = %mood, "Tense block without heading, skipping");
            continue;
        };
        let Some(tense) = Tense::from_label(&label) else {
            tracing::warn!(context, mood = %mood, label = %label, "Unrecognized tense label, skipping");
            continue;
        };

        let rows = table_rows(block);
        let tense_context = format!("{context} {mood} {tense}");
        let forms = match mood {
            Mood::Imperative => compose_imperative(&rows, &tense_context)?,
            _ => compose_standard(&rows, &tense_context)?,
        };

        if tenses.insert(tense, forms).is_some() {
            tracing::warn!(context, mood = %mood, tense = %tense, "Duplicate tense block, keeping last");
        }
    }

    Ok(tenses)
}

/// Decode a whole voice section: its four moods and its participle block.
///
/// Missing mood sections are logged and skipped.
pub fn decode_voice<N: MarkupNode>(section: N, voice: Voice, verb: &str) -> Result<RawVoice> {
    let prefix = voice.section_prefix();
    let context = format!("{verb} {voice}");
    let mut raw = RawVoice::default();

    for mood in Mood::ALL {
        let id = format!("{prefix}_{}", mood.section_suffix());
        let Some(mood_section) = section.find_by_id(&id) else {
            tracing::info!(verb, voice = %voice, mood = %mood, "Mood section not found, skipping");
            continue;
        };
        let tenses = decode_mood(mood_section, mood, &context)?;
        raw.moods.insert(mood, tenses);
    }

    let participle_id = format!("{prefix}_{PARTICIPLE_SECTION_SUFFIX}");
    match section.find_by_id(&participle_id) {
        Some(participle_section) => {
            raw.participle = extract_participle(participle_section, &context);
        }
        None => tracing::info!(verb, voice = %voice, "Participle section not found, skipping"),
    }

    Ok(raw)
}

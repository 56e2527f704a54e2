//! Voice section lookup and auxiliary resolution.
//!
//! A page marks its voice sections with `voix_active_avoir`,
//! `voix_active_être` and `voix_pron`. Some pages only carry a generic
//! `voix_active` block; the auxiliary is then read from the first row of
//! its indicative passé composé table.

use std::collections::BTreeMap;

use crate::dom::MarkupNode;
use crate::types::Voice;

/// Markers of the active voice conjugated with *avoir*.
pub const ACTIVE_AVOIR_MARKERS: &[&str] = &["voix_active_avoir"];

/// Markers of the active voice conjugated with *être*.
pub const ACTIVE_ETRE_MARKERS: &[&str] = &["voix_active_être", "voix_active_etre"];

/// Markers of an active voice whose auxiliary is not stated.
pub const ACTIVE_GENERIC_MARKERS: &[&str] = &["voix_active"];

/// Markers of the pronominal voice.
pub const PRONOMINAL_MARKERS: &[&str] = &["voix_pron", "voix_prono"];

/// Conjugated forms of *avoir* in the indicative present.
const AVOIR_FORMS: [&str; 6] = ["ai", "as", "a", "avons", "avez", "ont"];

/// Conjugated forms of *être* in the indicative present.
const ETRE_FORMS: [&str; 6] = ["suis", "es", "est", "sommes", "êtes", "sont"];

/// Outcome of the auxiliary heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryResult {
    Avoir,
    Etre,
    Unresolved,
}

impl AuxiliaryResult {
    /// The voice this auxiliary selects, if any.
    #[must_use]
    pub fn voice(&self) -> Option<Voice> {
        match self {
            Self::Avoir => Some(Voice::ActiveAvoir),
            Self::Etre => Some(Voice::ActiveEtre),
            Self::Unresolved => None,
        }
    }
}

/// Classify the text of an auxiliary cell.
///
/// # Examples
/// ```
/// use conjugaison_parser::voice::{classify_auxiliary, AuxiliaryResult};
///
/// assert_eq!(classify_auxiliary(" ai "), AuxiliaryResult::Avoir);
/// assert_eq!(classify_auxiliary("Est"), AuxiliaryResult::Etre);
/// assert_eq!(classify_auxiliary("fus"), AuxiliaryResult::Unresolved);
/// ```
#[must_use]
pub fn classify_auxiliary(cell_text: &str) -> AuxiliaryResult {
    let text = cell_text.trim().to_lowercase();
    if AVOIR_FORMS.contains(&text.as_str()) {
        AuxiliaryResult::Avoir
    } else if ETRE_FORMS.contains(&text.as_str()) {
        AuxiliaryResult::Etre
    } else {
        AuxiliaryResult::Unresolved
    }
}

/// Infer the auxiliary of a generic active voice section.
///
/// Reads the auxiliary cell of the first row of the indicative
/// "Passé composé" table. A missing table or cell is `Unresolved`.
pub fn guess_auxiliary<N: MarkupNode>(voix_active: N) -> AuxiliaryResult {
    let passe_compose = voix_active
        .select_path("div#active_ind div.tense")
        .into_iter()
        .find(|tense| {
            tense
                .find_tag("h4")
                .is_some_and(|h4| h4.text_content().trim() == "Passé composé")
        });

    let Some(tense) = passe_compose else {
        tracing::debug!("No indicative passé composé table in active voice");
        return AuxiliaryResult::Unresolved;
    };

    let auxiliary = tense
        .find_tag("table")
        .and_then(|table| table.find_descendant("td", "conj_auxil"))
        .map(|cell| cell.text_content());

    match auxiliary {
        Some(text) => classify_auxiliary(&text),
        None => {
            tracing::debug!("Passé composé table has no auxiliary cell");
            AuxiliaryResult::Unresolved
        }
    }
}

/// Find the first `div` carrying one of `markers` as a class token or as its id.
fn find_marked_section<N: MarkupNode>(root: N, markers: &[&str]) -> Option<N> {
    root.element_descendants().into_iter().find(|node| {
        node.tag() == "div"
            && markers
                .iter()
                .any(|marker| node.has_class(marker) || node.attr("id") == Some(*marker))
    })
}

/// Locate the voice sections of a conjugation page.
///
/// Returns at most one element per voice. A generic active section is
/// assigned to avoir or être through [`guess_auxiliary`], and only when
/// neither explicit marker is present; when the auxiliary cannot be
/// resolved the active voice is left out entirely.
pub fn locate_voices<N: MarkupNode>(root: N, verb: &str) -> BTreeMap<Voice, N> {
    let mut sections = BTreeMap::new();

    let avoir = find_marked_section(root, ACTIVE_AVOIR_MARKERS);
    let etre = find_marked_section(root, ACTIVE_ETRE_MARKERS);

    if avoir.is_none() && etre.is_none() {
        if let Some(generic) = find_marked_section(root, ACTIVE_GENERIC_MARKERS) {
            match guess_auxiliary(generic).voice() {
                Some(voice) => {
                    tracing::debug!(verb, voice = %voice, "Resolved auxiliary of active voice");
                    sections.insert(voice, generic);
                }
                None => tracing::warn!(
                    verb,
                    "Unable to determine the auxiliary verb, the active voice will not be parsed"
                ),
            }
        }
    }

    if let Some(section) = avoir {
        sections.insert(Voice::ActiveAvoir, section);
    }
    if let Some(section) = etre {
        sections.insert(Voice::ActiveEtre, section);
    }
    if let Some(section) = find_marked_section(root, PRONOMINAL_MARKERS) {
        sections.insert(Voice::Pronominal, section);
    }

    sections
}

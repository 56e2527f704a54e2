//! Participle extraction and expansion.
//!
//! The participle block (`active_part`, `prono_part`) holds a "Présent"
//! tense with one form and a "Passé" tense whose rows are labelled
//! (`conj_part_label`): four gendered rows and a compound row.

use crate::dom::MarkupNode;
use crate::person::{find_cell, normalize_apostrophes, MAIN_CELL};
use crate::tense::{table_rows, tense_heading};
use crate::types::{GenderedForms, ParticipleRecord, PastParticiple, RawParticiple, RawPastParticiple};

/// Class of the label cell in past participle rows.
pub const PARTICIPLE_LABEL_CELL: &str = "conj_part_label";

/// Which past participle a labelled row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PastSlot {
    SingulierM,
    SingulierF,
    PlurielM,
    PlurielF,
    Compose,
}

impl PastSlot {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("compos") {
            return Some(Self::Compose);
        }
        let feminine = label.contains("fém") || label.contains("fem");
        let masculine = label.contains("masc");
        match (label.contains("singulier"), label.contains("pluriel")) {
            (true, false) if masculine => Some(Self::SingulierM),
            (true, false) if feminine => Some(Self::SingulierF),
            (false, true) if masculine => Some(Self::PlurielM),
            (false, true) if feminine => Some(Self::PlurielF),
            _ => None,
        }
    }
}

/// Collapse runs of whitespace to single spaces, trim, and straighten
/// apostrophes.
fn clean_form(text: &str) -> String {
    normalize_apostrophes(&text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Read the participle block of a voice section.
pub fn extract_participle<N: MarkupNode>(section: N, context: &str) -> RawParticiple {
    let mut raw = RawParticiple::default();

    for block in section.descendants_by_class("div", "tense") {
        let Some(label) = tense_heading(block) else {
            continue;
        };
        match label.to_lowercase().as_str() {
            "présent" => {
                raw.present = block
                    .find_descendant("td", MAIN_CELL)
                    .and_then(|cell| cell.first_text().map(clean_form))
                    .filter(|form| !form.is_empty());
            }
            "passé" => raw.past = extract_past(block, context),
            _ => tracing::warn!(context, label = %label, "Unrecognized participle label, skipping"),
        }
    }

    raw
}

fn extract_past<N: MarkupNode>(block: N, context: &str) -> RawPastParticiple {
    let mut singulier_m = None;
    let mut singulier_f = None;
    let mut pluriel_m = None;
    let mut pluriel_f = None;
    let mut compose = None;

    for row in table_rows(block) {
        let label = find_cell(row, PARTICIPLE_LABEL_CELL)
            .map(|cell| cell.text_content())
            .unwrap_or_default();
        let Some(slot) = PastSlot::from_label(&label) else {
            tracing::warn!(context, label = label.trim(), "Unrecognized past participle row, skipping");
            continue;
        };
        let Some(value) = find_cell(row, MAIN_CELL)
            .map(|cell| clean_form(&cell.text_content()))
            .filter(|value| !value.is_empty())
        else {
            tracing::warn!(context, label = label.trim(), "Past participle row without form, skipping");
            continue;
        };

        let target = match slot {
            PastSlot::SingulierM => &mut singulier_m,
            PastSlot::SingulierF => &mut singulier_f,
            PastSlot::PlurielM => &mut pluriel_m,
            PastSlot::PlurielF => &mut pluriel_f,
            PastSlot::Compose => &mut compose,
        };
        *target = Some(value);
    }

    let gendered = match (singulier_m, singulier_f, pluriel_m, pluriel_f) {
        (Some(singulier_m), Some(singulier_f), Some(pluriel_m), Some(pluriel_f)) => {
            Some(GenderedForms {
                singulier_m,
                singulier_f,
                pluriel_m,
                pluriel_f,
            })
        }
        (None, None, None, None) => None,
        _ => {
            tracing::warn!(context, "Incomplete gendered past participle, ignoring it");
            None
        }
    };

    RawPastParticiple { gendered, compose }
}

/// Expand a raw participle block into the canonical schema.
///
/// Simple forms come from the four gendered rows, or, for an invariable
/// participle, from the last word of the compound form broadcast to all
/// four slots. Compound forms are split on commas when the page lists the
/// four gendered variants (`étant allé, allée, allés, allées`); otherwise
/// the compound text is broadcast unchanged.
///
/// # Examples
/// ```
/// use conjugaison_parser::participle::transform_participle;
/// use conjugaison_parser::types::{RawParticiple, RawPastParticiple};
///
/// let raw = RawParticiple {
///     present: Some("allant".to_string()),
///     past: RawPastParticiple {
///         gendered: None,
///         compose: Some("étant allé, allée, allés, allées".to_string()),
///     },
/// };
/// let record = transform_participle(&raw);
/// assert_eq!(record.passe.compound_sm.as_deref(), Some("étant allé"));
/// assert_eq!(record.passe.compound_pf.as_deref(), Some("étant allées"));
/// ```
#[must_use]
pub fn transform_participle(raw: &RawParticiple) -> ParticipleRecord {
    let mut passe = PastParticiple::default();

    if let Some(gendered) = &raw.past.gendered {
        passe.sm = Some(gendered.singulier_m.clone());
        passe.sf = Some(gendered.singulier_f.clone());
        passe.pm = Some(gendered.pluriel_m.clone());
        passe.pf = Some(gendered.pluriel_f.clone());
    } else if let Some(compose) = &raw.past.compose {
        let invariable = compose
            .split_whitespace()
            .last()
            .unwrap_or(compose.as_str())
            .to_string();
        passe.sm = Some(invariable.clone());
        passe.sf = Some(invariable.clone());
        passe.pm = Some(invariable.clone());
        passe.pf = Some(invariable);
    }

    if let Some(compose) = &raw.past.compose {
        let [sm, sf, pm, pf] = expand_compound(compose);
        passe.compound_sm = Some(sm);
        passe.compound_sf = Some(sf);
        passe.compound_pm = Some(pm);
        passe.compound_pf = Some(pf);
    }

    ParticipleRecord {
        present: raw.present.clone(),
        passe,
    }
}

/// Split a compound participle into its four gendered forms.
fn expand_compound(compose: &str) -> [String; 4] {
    let broadcast = || -> [String; 4] { std::array::from_fn(|_| compose.to_string()) };

    if !compose.contains(',') {
        return broadcast();
    }

    let parts: Vec<&str> = compose.split(',').map(str::trim).collect();
    if parts.len() < 4 {
        return broadcast();
    }

    let mut words: Vec<&str> = parts[0].split_whitespace().collect();
    words.pop();
    let auxiliary = words.join(" ");
    let with_auxiliary = |part: &str| {
        if auxiliary.is_empty() {
            part.to_string()
        } else {
            format!("{auxiliary} {part}")
        }
    };

    [
        parts[0].to_string(),
        with_auxiliary(parts[1]),
        with_auxiliary(parts[2]),
        with_auxiliary(parts[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn raw_compose(compose: &str) -> RawParticiple {
        RawParticiple {
            present: None,
            past: RawPastParticiple {
                gendered: None,
                compose: Some(compose.to_string()),
            },
        }
    }

    #[test]
    fn test_invariable_participle_broadcast() {
        let record = transform_participle(&raw_compose("ayant plu"));
        let passe = record.passe;
        assert_eq!(passe.sm.as_deref(), Some("plu"));
        assert_eq!(passe.pf.as_deref(), Some("plu"));
        assert_eq!(passe.compound_sm.as_deref(), Some("ayant plu"));
        assert_eq!(passe.compound_pf.as_deref(), Some("ayant plu"));
    }

    #[test]
    fn test_compound_split_four_parts() {
        let mut raw = raw_compose("étant allé, allée, allés, allées");
        raw.past.gendered = Some(GenderedForms {
            singulier_m: "allé".to_string(),
            singulier_f: "allée".to_string(),
            pluriel_m: "allés".to_string(),
            pluriel_f: "allées".to_string(),
        });
        let passe = transform_participle(&raw).passe;

        assert_eq!(passe.sm.as_deref(), Some("allé"));
        assert_eq!(passe.sf.as_deref(), Some("allée"));
        assert_eq!(passe.compound_sm.as_deref(), Some("étant allé"));
        assert_eq!(passe.compound_sf.as_deref(), Some("étant allée"));
        assert_eq!(passe.compound_pm.as_deref(), Some("étant allés"));
        assert_eq!(passe.compound_pf.as_deref(), Some("étant allées"));
    }

    #[test]
    fn test_compound_fewer_parts_broadcasts_raw_text() {
        let passe = transform_participle(&raw_compose("ayant été, étée")).passe;
        assert_eq!(passe.compound_sm.as_deref(), Some("ayant été, étée"));
        assert_eq!(passe.compound_pf.as_deref(), Some("ayant été, étée"));
    }

    #[test]
    fn test_no_past_participle() {
        let raw = RawParticiple {
            present: Some("parlant".to_string()),
            past: RawPastParticiple::default(),
        };
        let record = transform_participle(&raw);
        assert_eq!(record.present.as_deref(), Some("parlant"));
        assert_eq!(record.passe, PastParticiple::default());
    }

    #[test]
    fn test_extract_participle_block() {
        let xml = r#"<div id="active_part">
            <div class="tense"><h4>Présent</h4><table><tr><td class="conj_verb">parlant</td></tr></table></div>
            <div class="tense"><h4>Passé</h4><table>
                <tr><td class="conj_part_label">Singulier masculin</td><td class="conj_verb">parlé</td></tr>
                <tr><td class="conj_part_label">Singulier féminin</td><td class="conj_verb">parlée</td></tr>
                <tr><td class="conj_part_label">Pluriel masculin</td><td class="conj_verb">parlés</td></tr>
                <tr><td class="conj_part_label">Pluriel féminin</td><td class="conj_verb">parlées</td></tr>
                <tr><td class="conj_part_label">Composé</td><td class="conj_verb">ayant   parlé</td></tr>
            </table></div>
        </div>"#;
        let doc = Html::parse_fragment(xml);
        let raw = extract_participle(doc.root_element(), "parler");

        assert_eq!(raw.present.as_deref(), Some("parlant"));
        assert_eq!(
            raw.past.gendered,
            Some(GenderedForms {
                singulier_m: "parlé".to_string(),
                singulier_f: "parlée".to_string(),
                pluriel_m: "parlés".to_string(),
                pluriel_f: "parlées".to_string(),
            })
        );
        assert_eq!(raw.past.compose.as_deref(), Some("ayant parlé"));
    }

    #[test]
    fn test_incomplete_gendered_rows_are_ignored() {
        let xml = r#"<div id="active_part">
            <div class="tense"><h4>Passé</h4><table>
                <tr><td class="conj_part_label">Singulier masculin</td><td class="conj_verb">plu</td></tr>
                <tr><td class="conj_part_label">Composé</td><td class="conj_verb">ayant plu</td></tr>
            </table></div>
        </div>"#;
        let doc = Html::parse_fragment(xml);
        let raw = extract_participle(doc.root_element(), "pleuvoir");
        assert!(raw.past.gendered.is_none());
        assert_eq!(raw.past.compose.as_deref(), Some("ayant plu"));
    }
}

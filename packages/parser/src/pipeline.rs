//! The conjugation pipeline: one page in, one or two records out.

use crate::dom::MarkupNode;
use crate::error::Result;
use crate::normalize::{h_aspire, normalize_voice};
use crate::page::{entry_root, ParsedPage};
use crate::reform::{has_reform_variant, reformed_infinitive, synthesize_reform_variant};
use crate::tense::decode_voice;
use crate::types::{ParsedVerb, VerbRecord};
use crate::voice::locate_voices;

/// Parse the conjugation tree of one verb.
///
/// `page` is the document root. Tables are read below the element whose
/// id is `entry_id`, while the "h aspiré" marker is searched in the text
/// of the whole page. `nature` is the grammatical annotation returned by
/// the dictionary search; it is logged but not interpreted.
///
/// # Returns
///
/// * `Ok(Some(_))` - the normalized record, plus its reform variant when
///   the infinitive contains î or û
/// * `Ok(None)` - the page holds no usable voice section
/// * `Err(_)` - no element carries `entry_id`, or a table row is missing
///   a cell it must carry
pub fn parse_conjugation_page<N: MarkupNode>(
    page: N,
    entry_id: &str,
    verb: &str,
    nature: &str,
) -> Result<Option<ParsedVerb>> {
    tracing::debug!(verb, entry_id, nature, "Parsing conjugation page");

    let root = entry_root(page, entry_id)?;
    let sections = locate_voices(root, verb);
    if sections.is_empty() {
        tracing::warn!(verb, "No conjugation data found");
        return Ok(None);
    }

    let rectification = has_reform_variant(verb);
    let mut record = VerbRecord {
        h_aspire: h_aspire(verb, page),
        rectification_1990: rectification,
        rectification_1990_variante: reformed_infinitive(verb),
        ..VerbRecord::default()
    };

    for (voice, section) in sections {
        let raw = decode_voice(section, voice, verb)?;
        record.set_voice(voice, normalize_voice(raw));
    }

    let reform_variant = synthesize_reform_variant(verb, &record);
    tracing::debug!(verb, voices = record.voices().count(), reform = rectification, "Parsed conjugation page");

    Ok(Some(ParsedVerb {
        infinitive: verb.to_string(),
        record,
        reform_variant,
    }))
}

/// Parse a raw HTML conjugation page.
///
/// Builds the HTML5 tree of the page and runs [`parse_conjugation_page`]
/// on its root.
///
/// # Examples
/// ```
/// use conjugaison_parser::conjugate_html;
///
/// let html = r#"<html><body><div id="A9A0001"><p>aucune table</p></div></body></html>"#;
/// assert!(conjugate_html(html, "abaisser", "A9A0001", "v. tr.").unwrap().is_none());
/// ```
pub fn conjugate_html(
    html: &str,
    verb: &str,
    entry_id: &str,
    nature: &str,
) -> Result<Option<ParsedVerb>> {
    let page = ParsedPage::parse(html);
    parse_conjugation_page(page.root(), entry_id, verb, nature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConjugationError;
    use crate::types::{Mood, Person, Tense};

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>connaître</title><meta charset="utf-8"></head><body>
<div id="A9C0001">
  <div class="voix_active_avoir">
    <div id="active_ind">
      <div class="tense"><h4>Présent</h4><table>
        <tr><td class="conj_pp">il</td><td class="conj_verb">connaît</td><td class="conj_verb_rectif">connait</td></tr>
      </table></div>
    </div>
  </div>
</div>
</body></html>"#;

    #[test]
    fn test_reform_flags() {
        let parsed = conjugate_html(PAGE, "connaître", "A9C0001", "v. tr.").unwrap().unwrap();

        assert!(parsed.record.rectification_1990);
        assert_eq!(parsed.record.rectification_1990_variante.as_deref(), Some("connaitre"));
        let present = &parsed.record.voix_active_avoir.as_ref().unwrap().indicatif[&Tense::Present];
        assert_eq!(present[&Person::ThirdSingularFeminine], "connaît;connait");

        let variant = parsed.reform_variant.unwrap();
        assert_eq!(variant.infinitive, "connaitre");
        assert_eq!(variant.record.rectification_1990_variante.as_deref(), Some("connaître"));
        let present = &variant.record.voix_active_avoir.as_ref().unwrap().indicatif[&Tense::Present];
        assert_eq!(present[&Person::ThirdSingularMasculine], "connait;connaît");
        assert!(variant.record.voix_active_avoir.as_ref().unwrap().mood(Mood::Subjunctive).is_empty());
    }

    #[test]
    fn test_missing_entry_root() {
        let err = conjugate_html(PAGE, "connaître", "A9Z9999", "v. tr.").unwrap_err();
        assert!(matches!(err, ConjugationError::EntryNotFound { .. }));
    }

    #[test]
    fn test_missing_main_cell_is_hard_failure() {
        let html = r#"<div id="A1"><div class="voix_active_avoir"><div id="active_ind">
            <div class="tense"><h4>Présent</h4><table><tr><td class="conj_pp">je</td></tr></table></div>
        </div></div></div>"#;
        let err = conjugate_html(html, "parler", "A1", "v. intr.").unwrap_err();
        assert!(matches!(err, ConjugationError::MissingCell { cell: "conj_verb", .. }));
    }

    #[test]
    fn test_h_aspire_marker_outside_entry() {
        let html = r#"<html><body>
<header><h1>hacher</h1><p class=prononciation>(h aspiré)</header>
<div id="A9H0001"><div class="voix_active_avoir"><div id="active_ind">
  <div class="tense"><h4>Présent</h4><table>
    <tr><td class="conj_pp">je</td><td class="conj_verb">hache</td></tr>
  </table></div>
</div></div></div>
</body></html>"#;
        let parsed = conjugate_html(html, "hacher", "A9H0001", "v. tr.").unwrap().unwrap();
        assert!(parsed.record.h_aspire);

        let elsewhere = html.replace("(h aspiré)", "");
        let parsed = conjugate_html(&elsewhere, "hacher", "A9H0001", "v. tr.").unwrap().unwrap();
        assert!(!parsed.record.h_aspire);
    }
}

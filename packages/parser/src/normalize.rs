//! Key and schema normalization.
//!
//! Rewrites internal person keys (`je`, ..., `ils`) to the canonical
//! person keys (`1s`, ..., `3pm`), turns comma-delimited spelling variants
//! into semicolon-delimited ones, and adds the feminine third persons.

use crate::dom::MarkupNode;
use crate::participle::transform_participle;
use crate::types::{MoodForms, Person, RawTense, RawVoice, TenseForms, VoiceRecord};

/// Text marking an aspirated h on the page.
pub const H_ASPIRE_MARKER: &str = "h aspiré";

/// Normalize the person forms of one tense.
///
/// Accepts canonical keys, so normalizing an already normalized tense
/// returns it unchanged. `3sf` and `3pf` always mirror `3sm` and `3pm`.
///
/// # Examples
/// ```
/// use conjugaison_parser::normalize::normalize_tense;
/// use conjugaison_parser::types::Person;
///
/// let forms = normalize_tense([(Person::ThirdSingularMasculine, "paie,paye".to_string())]);
/// assert_eq!(forms[&Person::ThirdSingularFeminine], "paie;paye");
/// ```
#[must_use]
pub fn normalize_tense<I>(forms: I) -> TenseForms
where
    I: IntoIterator<Item = (Person, String)>,
{
    let mut result: TenseForms = forms
        .into_iter()
        .map(|(person, form)| (person, form.replace(',', ";")))
        .collect();

    if let Some(form) = result.get(&Person::ThirdSingularMasculine).cloned() {
        result.insert(Person::ThirdSingularFeminine, form);
    }
    if let Some(form) = result.get(&Person::ThirdPluralMasculine).cloned() {
        result.insert(Person::ThirdPluralFeminine, form);
    }

    result
}

/// Normalize a tense as composed from the page.
#[must_use]
pub fn normalize_raw_tense(raw: RawTense) -> TenseForms {
    normalize_tense(
        raw.into_iter()
            .map(|(pronoun, form)| (pronoun.person(), form)),
    )
}

/// Normalize every tense of an already keyed mood.
#[must_use]
pub fn normalize_mood(mood: MoodForms) -> MoodForms {
    mood.into_iter()
        .map(|(tense, forms)| (tense, normalize_tense(forms)))
        .collect()
}

/// Normalize one voice: finite moods through [`normalize_raw_tense`],
/// participles through [`transform_participle`].
#[must_use]
pub fn normalize_voice(raw: RawVoice) -> VoiceRecord {
    let mut record = VoiceRecord {
        participe: transform_participle(&raw.participle),
        ..VoiceRecord::default()
    };

    for (mood, tenses) in raw.moods {
        *record.mood_mut(mood) = tenses
            .into_iter()
            .map(|(tense, forms)| (tense, normalize_raw_tense(forms)))
            .collect();
    }

    record
}

/// Re-apply normalization to an already normalized voice.
#[must_use]
pub fn renormalize_voice(mut record: VoiceRecord) -> VoiceRecord {
    for mood in crate::types::Mood::ALL {
        let forms = std::mem::take(record.mood_mut(mood));
        *record.mood_mut(mood) = normalize_mood(forms);
    }
    record
}

/// Whether the verb starts with an aspirated h.
///
/// The page is only consulted for infinitives starting with `h`.
pub fn h_aspire<N: MarkupNode>(infinitive: &str, page: N) -> bool {
    infinitive.starts_with(['h', 'H']) && page.text_content().contains(H_ASPIRE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Mood, Pronoun, Tense};
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn parler_present() -> RawTense {
        [
            (Pronoun::Je, "parle"),
            (Pronoun::Tu, "parles"),
            (Pronoun::Il, "parle"),
            (Pronoun::Nous, "parlons"),
            (Pronoun::Vous, "parlez"),
            (Pronoun::Ils, "parlent"),
        ]
        .into_iter()
        .map(|(p, f)| (p, f.to_string()))
        .collect()
    }

    #[test]
    fn test_normalize_raw_tense_keys_and_gender() {
        let forms = normalize_raw_tense(parler_present());
        let keys: Vec<&str> = forms.keys().map(Person::as_str).collect();
        assert_eq!(keys, vec!["1s", "2s", "3sm", "3sf", "1p", "2p", "3pm", "3pf"]);
        assert_eq!(forms[&Person::ThirdSingularFeminine], "parle");
        assert_eq!(forms[&Person::ThirdPluralFeminine], "parlent");
    }

    #[test]
    fn test_normalize_tense_is_idempotent() {
        let mut raw = parler_present();
        raw.insert(Pronoun::Nous, "payons,paiions".to_string());
        let once = normalize_raw_tense(raw);
        let twice = normalize_tense(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_feminine_without_masculine() {
        let forms = normalize_tense([(Person::SecondSingular, "parle".to_string())]);
        assert_eq!(forms.len(), 1);
        assert!(!forms.contains_key(&Person::ThirdSingularFeminine));
    }

    #[test]
    fn test_renormalize_voice_is_noop() {
        let mut raw = RawVoice::default();
        raw.moods
            .entry(Mood::Indicative)
            .or_default()
            .insert(Tense::Present, parler_present());
        let record = normalize_voice(raw);
        assert_eq!(renormalize_voice(record.clone()), record);
    }

    #[test]
    fn test_h_aspire() {
        let doc = Html::parse_fragment("<div><p>hacher (h aspiré)</p></div>");
        assert!(h_aspire("hacher", doc.root_element()));
        assert!(!h_aspire("habiter", Html::parse_fragment("<div>habiter</div>").root_element()));
        assert!(!h_aspire("aimer", doc.root_element()));
    }
}

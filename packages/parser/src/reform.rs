//! 1990 orthographic reform variants.
//!
//! Infinitives with î or û get a second record under the simplified
//! spelling (î→i, û→u). Its variant lists are reversed so the reformed
//! spelling comes first.

use crate::types::{ReformVariant, VerbRecord};

/// Whether the infinitive has a reformed spelling.
#[must_use]
pub fn has_reform_variant(infinitive: &str) -> bool {
    infinitive.contains(['î', 'û'])
}

/// The reformed spelling of an infinitive, if it has one.
///
/// # Examples
/// ```
/// use conjugaison_parser::reform::reformed_infinitive;
///
/// assert_eq!(reformed_infinitive("connaître").as_deref(), Some("connaitre"));
/// assert_eq!(reformed_infinitive("parler"), None);
/// ```
#[must_use]
pub fn reformed_infinitive(infinitive: &str) -> Option<String> {
    has_reform_variant(infinitive).then(|| {
        infinitive
            .chars()
            .map(|c| match c {
                'î' => 'i',
                'û' => 'u',
                other => other,
            })
            .collect()
    })
}

/// Reverse a semicolon-delimited variant list.
#[must_use]
pub fn reverse_variants(form: &str) -> String {
    if !form.contains(';') {
        return form.to_string();
    }
    form.split(';').rev().collect::<Vec<_>>().join(";")
}

/// Build the reform-variant record for a normalized verb record.
///
/// Returns `None` when the infinitive contains neither î nor û.
#[must_use]
pub fn synthesize_reform_variant(infinitive: &str, record: &VerbRecord) -> Option<ReformVariant> {
    let reformed = reformed_infinitive(infinitive)?;

    let mut variant = record.clone();
    variant.rectification_1990 = true;
    variant.rectification_1990_variante = Some(infinitive.to_string());
    for voice in variant.voices_mut() {
        for form in voice.person_forms_mut() {
            *form = reverse_variants(form);
        }
    }

    tracing::info!(reformed = %reformed, original = infinitive, "Created reformed spelling entry");
    Some(ReformVariant {
        infinitive: reformed,
        record: variant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Mood, Person, Tense, Voice, VoiceRecord};
    use pretty_assertions::assert_eq;

    fn record_with(form: &str) -> VerbRecord {
        let mut voice = VoiceRecord::default();
        voice
            .mood_mut(Mood::Indicative)
            .entry(Tense::Present)
            .or_default()
            .insert(Person::ThirdSingularMasculine, form.to_string());
        let mut record = VerbRecord {
            rectification_1990: true,
            rectification_1990_variante: Some("connaitre".to_string()),
            ..VerbRecord::default()
        };
        record.set_voice(Voice::ActiveAvoir, voice);
        record
    }

    fn form_of(record: &VerbRecord) -> &str {
        &record.voix_active_avoir.as_ref().unwrap().indicatif[&Tense::Present]
            [&Person::ThirdSingularMasculine]
    }

    #[test]
    fn test_reformed_infinitive_is_fixed_point() {
        for infinitive in ["connaître", "goûter", "île", "aîtrûû"] {
            let reformed = reformed_infinitive(infinitive).unwrap();
            assert!(!has_reform_variant(&reformed));
            assert_eq!(reformed_infinitive(&reformed), None);
        }
    }

    #[test]
    fn test_variant_order_is_reversed() {
        let record = record_with("connaît;connait");
        let variant = synthesize_reform_variant("connaître", &record).unwrap();

        assert_eq!(variant.infinitive, "connaitre");
        assert_eq!(variant.record.rectification_1990_variante.as_deref(), Some("connaître"));
        assert!(variant.record.rectification_1990);
        assert_eq!(form_of(&variant.record), "connait;connaît");
        assert_eq!(form_of(&record), "connaît;connait");
    }

    #[test]
    fn test_single_forms_unchanged() {
        let record = record_with("connaissons");
        let variant = synthesize_reform_variant("connaître", &record).unwrap();
        assert_eq!(form_of(&variant.record), "connaissons");
    }

    #[test]
    fn test_no_variant_without_circumflex() {
        assert!(synthesize_reform_variant("parler", &VerbRecord::default()).is_none());
    }
}

//! Flat relational rows for tabular exports.

use serde::Serialize;

use crate::types::{Mood, VerbRecord};

/// One finite person form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConjugationRow {
    pub verb: String,
    pub voice: &'static str,
    pub mood: &'static str,
    pub tense: &'static str,
    pub person: &'static str,
    pub conjugation: String,
}

/// One participle form. `form` is `present` or `passe_<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipleRow {
    pub verb: String,
    pub voice: &'static str,
    pub form: String,
    pub participle: String,
}

/// Decompose a record into person-form rows, in voice, mood, tense and
/// person order.
#[must_use]
pub fn conjugation_rows(infinitive: &str, record: &VerbRecord) -> Vec<ConjugationRow> {
    let mut rows = Vec::new();
    for (voice, voice_record) in record.voices() {
        for mood in Mood::ALL {
            for (tense, forms) in voice_record.mood(mood) {
                for (person, form) in forms {
                    rows.push(ConjugationRow {
                        verb: infinitive.to_string(),
                        voice: voice.relational_label(),
                        mood: mood.as_str(),
                        tense: tense.as_str(),
                        person: person.as_str(),
                        conjugation: form.clone(),
                    });
                }
            }
        }
    }
    rows
}

/// Decompose a record into participle rows.
#[must_use]
pub fn participle_rows(infinitive: &str, record: &VerbRecord) -> Vec<ParticipleRow> {
    let mut rows = Vec::new();
    for (voice, voice_record) in record.voices() {
        let participle = &voice_record.participe;
        let row = |form: String, value: &str| ParticipleRow {
            verb: infinitive.to_string(),
            voice: voice.relational_label(),
            form,
            participle: value.to_string(),
        };

        if let Some(present) = &participle.present {
            rows.push(row("present".to_string(), present));
        }
        for (key, value) in participle.passe.forms() {
            rows.push(row(format!("passe_{key}"), value));
        }
    }
    rows
}

//! Core data types for conjugation records.
//!
//! Internal types (`Pronoun`, [`RawTense`], [`RawVoice`]) describe what was
//! read from the markup. External types ([`Person`], [`VoiceRecord`],
//! [`VerbRecord`]) describe the canonical, serializable schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Grammatical voice of a conjugation section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Voice {
    /// Active voice conjugated with *avoir*.
    #[serde(rename = "voix_active_avoir")]
    ActiveAvoir,

    /// Active voice conjugated with *être*.
    #[serde(rename = "voix_active_etre")]
    ActiveEtre,

    /// Pronominal (reflexive) voice.
    #[serde(rename = "voix_prono")]
    Pronominal,
}

impl Voice {
    /// All voices in output order.
    pub const ALL: [Voice; 3] = [Voice::ActiveAvoir, Voice::ActiveEtre, Voice::Pronominal];

    /// Key used in the JSON export.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveAvoir => "voix_active_avoir",
            Self::ActiveEtre => "voix_active_etre",
            Self::Pronominal => "voix_prono",
        }
    }

    /// Label used in relational exports.
    #[must_use]
    pub fn relational_label(&self) -> &'static str {
        match self {
            Self::ActiveAvoir => "ACTIVE_AVOIR",
            Self::ActiveEtre => "ACTIVE_ETRE",
            Self::Pronominal => "PRONOMINAL",
        }
    }

    /// Prefix of the mood section ids inside this voice (`active_ind`, `prono_ind`, ...).
    #[must_use]
    pub fn section_prefix(&self) -> &'static str {
        match self {
            Self::ActiveAvoir | Self::ActiveEtre => "active",
            Self::Pronominal => "prono",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammatical mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "indicatif")]
    Indicative,
    #[serde(rename = "subjonctif")]
    Subjunctive,
    #[serde(rename = "conditionnel")]
    Conditional,
    #[serde(rename = "imperatif")]
    Imperative,
}

impl Mood {
    /// All finite moods in page order.
    pub const ALL: [Mood; 4] = [
        Mood::Indicative,
        Mood::Subjunctive,
        Mood::Conditional,
        Mood::Imperative,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indicative => "indicatif",
            Self::Subjunctive => "subjonctif",
            Self::Conditional => "conditionnel",
            Self::Imperative => "imperatif",
        }
    }

    /// Suffix of the mood section id (`active_ind`, `prono_imp`, ...).
    #[must_use]
    pub fn section_suffix(&self) -> &'static str {
        match self {
            Self::Indicative => "ind",
            Self::Subjunctive => "sub",
            Self::Conditional => "cond",
            Self::Imperative => "imp",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suffix of the participle block id inside a voice (`active_part`).
pub const PARTICIPLE_SECTION_SUFFIX: &str = "part";

/// Canonical tense key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tense {
    Present,
    Passe,
    Imparfait,
    PasseCompose,
    PlusQueParfait,
    FuturSimple,
    FuturAnterieur,
    PasseSimple,
    PasseAnterieur,
}

impl Tense {
    /// Tense heading labels as printed on the page, with their canonical key.
    pub const LABELS: [(&'static str, Tense); 9] = [
        ("présent", Tense::Present),
        ("passé", Tense::Passe),
        ("imparfait", Tense::Imparfait),
        ("passé composé", Tense::PasseCompose),
        ("plus-que-parfait", Tense::PlusQueParfait),
        ("futur simple", Tense::FuturSimple),
        ("futur antérieur", Tense::FuturAnterieur),
        ("passé simple", Tense::PasseSimple),
        ("passé antérieur", Tense::PasseAnterieur),
    ];

    /// Look up a heading label; case and surrounding whitespace are ignored.
    ///
    /// # Examples
    /// ```
    /// use conjugaison_parser::types::Tense;
    ///
    /// assert_eq!(Tense::from_label(" Passé composé "), Some(Tense::PasseCompose));
    /// assert_eq!(Tense::from_label("Surcomposé"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, tense)| *tense)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Passe => "passe",
            Self::Imparfait => "imparfait",
            Self::PasseCompose => "passe_compose",
            Self::PlusQueParfait => "plus_que_parfait",
            Self::FuturSimple => "futur_simple",
            Self::FuturAnterieur => "futur_anterieur",
            Self::PasseSimple => "passe_simple",
            Self::PasseAnterieur => "passe_anterieur",
        }
    }
}

impl fmt::Display for Tense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal person key, as read from the pronoun column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pronoun {
    Je,
    Tu,
    Il,
    Nous,
    Vous,
    Ils,
}

impl Pronoun {
    /// Imperative rows are bound to these persons by position.
    pub const IMPERATIVE: [Pronoun; 3] = [Pronoun::Tu, Pronoun::Nous, Pronoun::Vous];

    /// Map a pronoun cell to a person.
    ///
    /// Uses substring containment so that elided and subjunctive forms
    /// (`j’`, `que tu`, `qu’elles`) resolve too. Order matters: `ils`/`elles`
    /// must be tested before `il`/`elle`.
    ///
    /// # Examples
    /// ```
    /// use conjugaison_parser::types::Pronoun;
    ///
    /// assert_eq!(Pronoun::from_label("j’"), Some(Pronoun::Je));
    /// assert_eq!(Pronoun::from_label("qu’elles"), Some(Pronoun::Ils));
    /// assert_eq!(Pronoun::from_label("on"), Some(Pronoun::Il));
    /// assert_eq!(Pronoun::from_label("—"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains('j') {
            Some(Self::Je)
        } else if label.contains('t') {
            Some(Self::Tu)
        } else if label.contains("ils") || label.contains("elles") {
            Some(Self::Ils)
        } else if label.contains("il") || label.contains("elle") || label.contains("on") {
            Some(Self::Il)
        } else if label.contains("nous") {
            Some(Self::Nous)
        } else if label.contains("vous") {
            Some(Self::Vous)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Je => "je",
            Self::Tu => "tu",
            Self::Il => "il",
            Self::Nous => "nous",
            Self::Vous => "vous",
            Self::Ils => "ils",
        }
    }

    /// Canonical external key for this person (third persons map to masculine).
    #[must_use]
    pub fn person(&self) -> Person {
        match self {
            Self::Je => Person::FirstSingular,
            Self::Tu => Person::SecondSingular,
            Self::Il => Person::ThirdSingularMasculine,
            Self::Nous => Person::FirstPlural,
            Self::Vous => Person::SecondPlural,
            Self::Ils => Person::ThirdPluralMasculine,
        }
    }
}

impl fmt::Display for Pronoun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical external person key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Person {
    #[serde(rename = "1s")]
    FirstSingular,
    #[serde(rename = "2s")]
    SecondSingular,
    #[serde(rename = "3sm")]
    ThirdSingularMasculine,
    #[serde(rename = "3sf")]
    ThirdSingularFeminine,
    #[serde(rename = "1p")]
    FirstPlural,
    #[serde(rename = "2p")]
    SecondPlural,
    #[serde(rename = "3pm")]
    ThirdPluralMasculine,
    #[serde(rename = "3pf")]
    ThirdPluralFeminine,
}

impl Person {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstSingular => "1s",
            Self::SecondSingular => "2s",
            Self::ThirdSingularMasculine => "3sm",
            Self::ThirdSingularFeminine => "3sf",
            Self::FirstPlural => "1p",
            Self::SecondPlural => "2p",
            Self::ThirdPluralMasculine => "3pm",
            Self::ThirdPluralFeminine => "3pf",
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Person forms of one tense as composed from the page. A missing key
/// means the page has no form for that person.
pub type RawTense = BTreeMap<Pronoun, String>;

/// Person forms of one tense in the canonical schema.
pub type TenseForms = BTreeMap<Person, String>;

/// All tenses of one mood in the canonical schema.
pub type MoodForms = BTreeMap<Tense, TenseForms>;

/// Four explicit past participle forms, as labelled on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderedForms {
    pub singulier_m: String,
    pub singulier_f: String,
    pub pluriel_m: String,
    pub pluriel_f: String,
}

/// Past participle group as read from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPastParticiple {
    /// The four gendered forms, when the page lists all of them.
    pub gendered: Option<GenderedForms>,
    /// Compound form (auxiliary participle + past participle), e.g. `ayant parlé`.
    pub compose: Option<String>,
}

/// Participle block as read from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParticiple {
    pub present: Option<String>,
    pub past: RawPastParticiple,
}

/// One voice section as read from the page, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawVoice {
    pub moods: BTreeMap<Mood, BTreeMap<Tense, RawTense>>,
    pub participle: RawParticiple,
}

/// Normalized past participle forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastParticiple {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_sm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_sf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_pm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_pf: Option<String>,
}

impl PastParticiple {
    /// Non-empty forms with their relational form key (`sm`, ..., `compound_pf`).
    pub fn forms(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("sm", &self.sm),
            ("sf", &self.sf),
            ("pm", &self.pm),
            ("pf", &self.pf),
            ("compound_sm", &self.compound_sm),
            ("compound_sf", &self.compound_sf),
            ("compound_pm", &self.compound_pm),
            ("compound_pf", &self.compound_pf),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }
}

/// Normalized participle block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipleRecord {
    pub present: Option<String>,
    #[serde(default)]
    pub passe: PastParticiple,
}

/// One normalized voice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRecord {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indicatif: MoodForms,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subjonctif: MoodForms,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditionnel: MoodForms,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub imperatif: MoodForms,
    #[serde(default)]
    pub participe: ParticipleRecord,
}

impl VoiceRecord {
    #[must_use]
    pub fn mood(&self, mood: Mood) -> &MoodForms {
        match mood {
            Mood::Indicative => &self.indicatif,
            Mood::Subjunctive => &self.subjonctif,
            Mood::Conditional => &self.conditionnel,
            Mood::Imperative => &self.imperatif,
        }
    }

    pub fn mood_mut(&mut self, mood: Mood) -> &mut MoodForms {
        match mood {
            Mood::Indicative => &mut self.indicatif,
            Mood::Subjunctive => &mut self.subjonctif,
            Mood::Conditional => &mut self.conditionnel,
            Mood::Imperative => &mut self.imperatif,
        }
    }

    /// Every person form of every tense, for in-place rewriting.
    pub fn person_forms_mut(&mut self) -> impl Iterator<Item = &mut String> {
        [
            &mut self.indicatif,
            &mut self.subjonctif,
            &mut self.conditionnel,
            &mut self.imperatif,
        ]
        .into_iter()
        .flat_map(|mood| mood.values_mut())
        .flat_map(|tense| tense.values_mut())
    }
}

/// Canonical record for one infinitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbRecord {
    pub h_aspire: bool,
    pub rectification_1990: bool,
    pub rectification_1990_variante: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voix_active_avoir: Option<VoiceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voix_active_etre: Option<VoiceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voix_prono: Option<VoiceRecord>,
}

impl VerbRecord {
    #[must_use]
    pub fn voice(&self, voice: Voice) -> Option<&VoiceRecord> {
        match voice {
            Voice::ActiveAvoir => self.voix_active_avoir.as_ref(),
            Voice::ActiveEtre => self.voix_active_etre.as_ref(),
            Voice::Pronominal => self.voix_prono.as_ref(),
        }
    }

    pub fn set_voice(&mut self, voice: Voice, record: VoiceRecord) {
        let slot = match voice {
            Voice::ActiveAvoir => &mut self.voix_active_avoir,
            Voice::ActiveEtre => &mut self.voix_active_etre,
            Voice::Pronominal => &mut self.voix_prono,
        };
        *slot = Some(record);
    }

    /// Present voices in output order.
    pub fn voices(&self) -> impl Iterator<Item = (Voice, &VoiceRecord)> {
        Voice::ALL
            .into_iter()
            .filter_map(move |voice| self.voice(voice).map(|record| (voice, record)))
    }

    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut VoiceRecord> {
        [
            &mut self.voix_active_avoir,
            &mut self.voix_active_etre,
            &mut self.voix_prono,
        ]
        .into_iter()
        .flatten()
    }
}

/// The duplicate record produced for 1990-reform spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReformVariant {
    /// Infinitive with î/û simplified.
    pub infinitive: String,
    pub record: VerbRecord,
}

/// Everything one conjugation page yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerb {
    pub infinitive: String,
    pub record: VerbRecord,
    pub reform_variant: Option<ReformVariant>,
}

impl ParsedVerb {
    /// Flatten into `(infinitive, record)` entries, original first.
    #[must_use]
    pub fn into_entries(self) -> Vec<(String, VerbRecord)> {
        let mut entries = vec![(self.infinitive, self.record)];
        if let Some(variant) = self.reform_variant {
            entries.push((variant.infinitive, variant.record));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronoun_precedence() {
        assert_eq!(Pronoun::from_label("je"), Some(Pronoun::Je));
        assert_eq!(Pronoun::from_label("que j’"), Some(Pronoun::Je));
        assert_eq!(Pronoun::from_label("tu"), Some(Pronoun::Tu));
        assert_eq!(Pronoun::from_label("que tu"), Some(Pronoun::Tu));
        assert_eq!(Pronoun::from_label("il"), Some(Pronoun::Il));
        assert_eq!(Pronoun::from_label("elle"), Some(Pronoun::Il));
        assert_eq!(Pronoun::from_label("qu’il"), Some(Pronoun::Il));
        assert_eq!(Pronoun::from_label("ils"), Some(Pronoun::Ils));
        assert_eq!(Pronoun::from_label("Elles"), Some(Pronoun::Ils));
        assert_eq!(Pronoun::from_label("nous"), Some(Pronoun::Nous));
        assert_eq!(Pronoun::from_label("que vous"), Some(Pronoun::Vous));
        assert_eq!(Pronoun::from_label(""), None);
    }

    #[test]
    fn test_tense_labels_cover_all_tenses() {
        for (label, tense) in Tense::LABELS {
            assert_eq!(Tense::from_label(label), Some(tense));
        }
        assert_eq!(Tense::from_label("PRÉSENT"), Some(Tense::Present));
        assert_eq!(Tense::from_label("Futur"), None);
    }

    #[test]
    fn test_person_keys_serialize() {
        let json = serde_json::to_string(&Person::ThirdPluralFeminine).unwrap();
        assert_eq!(json, "\"3pf\"");
        let json = serde_json::to_string(&Tense::PlusQueParfait).unwrap();
        assert_eq!(json, "\"plus_que_parfait\"");
    }

    #[test]
    fn test_verb_record_omits_missing_voices() {
        let mut record = VerbRecord::default();
        record.set_voice(Voice::ActiveAvoir, VoiceRecord::default());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("voix_active_avoir").is_some());
        assert!(json.get("voix_active_etre").is_none());
        assert!(json.get("voix_prono").is_none());
        assert_eq!(json["rectification_1990_variante"], serde_json::Value::Null);
        assert_eq!(json["voix_active_avoir"]["participe"]["present"], serde_json::Value::Null);
    }

    #[test]
    fn test_parsed_verb_entries_order() {
        let parsed = ParsedVerb {
            infinitive: "connaître".to_string(),
            record: VerbRecord::default(),
            reform_variant: Some(ReformVariant {
                infinitive: "connaitre".to_string(),
                record: VerbRecord::default(),
            }),
        };
        let keys: Vec<String> = parsed.into_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["connaître", "connaitre"]);
    }
}

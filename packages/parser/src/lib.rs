//! Conjugaison parser - Extract French verb conjugations from dictionary markup.
//!
//! This crate walks the conjugation page of one verb and turns it into a
//! canonical record: person forms for every finite mood and tense,
//! participles, auxiliary selection, reflexive forms and the 1990 reform
//! spelling variants.
//!
//! # Example
//!
//! ```
//! use conjugaison_parser::types::{Person, Tense};
//!
//! let html = r#"<div id="A9P0001"><div class="voix_active_avoir"><div id="active_ind">
//!   <div class="tense"><h4>Présent</h4><table>
//!     <tr><td class="conj_pp">il</td><td class="conj_verb">parle</td></tr>
//!   </table></div>
//! </div></div></div>"#;
//!
//! let parsed = conjugaison_parser::conjugate_html(html, "parler", "A9P0001", "v. intr.")
//!     .unwrap()
//!     .unwrap();
//! let active = parsed.record.voix_active_avoir.unwrap();
//! assert_eq!(active.indicatif[&Tense::Present][&Person::ThirdSingularFeminine], "parle");
//! ```
//!
//! # Architecture
//!
//! - [`dom`]: Markup capability trait used by every other module
//! - [`page`]: HTML5 page loading and entry lookup
//! - [`voice`]: Voice section lookup and auxiliary resolution
//! - [`tense`]: Mood and tense table decoding
//! - [`person`]: Person form composition (standard and imperative)
//! - [`participle`]: Participle extraction and expansion
//! - [`normalize`]: Key and schema normalization
//! - [`reform`]: 1990 reform variants
//! - [`rows`]: Relational decomposition
//! - [`pipeline`]: The end-to-end entry points

pub mod dom;
pub mod error;
pub mod normalize;
pub mod page;
pub mod participle;
pub mod person;
pub mod pipeline;
pub mod reform;
pub mod rows;
pub mod tense;
pub mod types;
pub mod voice;

pub use dom::MarkupNode;
pub use error::{ConjugationError, Result};
pub use page::ParsedPage;
pub use pipeline::{conjugate_html, parse_conjugation_page};
pub use rows::{conjugation_rows, participle_rows, ConjugationRow, ParticipleRow};
pub use types::{Mood, ParsedVerb, Person, Tense, VerbRecord, Voice, VoiceRecord};

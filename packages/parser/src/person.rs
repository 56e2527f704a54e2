//! Composition of person forms from conjugation table rows.
//!
//! A row holds up to five cells: the subject pronoun (`conj_pp`), the
//! reflexive pronoun (`conj_refl-pron`), the auxiliary (`conj_auxil`), the
//! main form (`conj_verb`) and the 1990 reform spelling (`conj_verb_rectif`).
//! They are composed as `[reflexive ][auxiliary ]main[,alternate]`.

use crate::dom::MarkupNode;
use crate::error::{ConjugationError, Result};
use crate::types::{Pronoun, RawTense};

pub const PRONOUN_CELL: &str = "conj_pp";
pub const REFLEXIVE_CELL: &str = "conj_refl-pron";
pub const AUXILIARY_CELL: &str = "conj_auxil";
pub const MAIN_CELL: &str = "conj_verb";
pub const RECTIFIED_CELL: &str = "conj_verb_rectif";

/// Find the `td` of a row with the given class.
pub fn find_cell<N: MarkupNode>(row: N, class: &str) -> Option<N> {
    row.children_by_tag("td")
        .into_iter()
        .find(|cell| cell.has_class(class))
}

/// Replace typographic apostrophes with straight ones.
#[must_use]
pub fn normalize_apostrophes(text: &str) -> String {
    text.replace('’', "'")
}

/// Extract a verb form from a cell's first text node.
///
/// Only the first comma-separated segment is kept (masculine or primary
/// spelling) and all whitespace is removed, since spaces inside a form
/// are liaison artifacts.
///
/// # Examples
/// ```
/// use conjugaison_parser::person::extract_form;
///
/// assert_eq!(extract_form(" allé, allée"), "allé");
/// assert_eq!(extract_form("par lons"), "parlons");
/// ```
#[must_use]
pub fn extract_form(first_text: &str) -> String {
    first_text
        .split(',')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Reflexive pronoun prefix: apostrophes straightened, followed by a space
/// unless the pronoun is elided (`m'`).
#[must_use]
pub fn reflexive_prefix(text: &str) -> String {
    let pronoun = normalize_apostrophes(text.trim());
    if pronoun.is_empty() || pronoun.ends_with('\'') {
        pronoun
    } else {
        format!("{pronoun} ")
    }
}

/// Auxiliary prefix: the auxiliary followed by a space, or nothing.
#[must_use]
pub fn auxiliary_prefix(text: &str) -> String {
    let auxiliary = normalize_apostrophes(text.trim());
    if auxiliary.is_empty() {
        auxiliary
    } else {
        format!("{auxiliary} ")
    }
}

/// Read the main form of a row; the `conj_verb` cell is mandatory.
fn main_form<N: MarkupNode>(row: N, context: &str) -> Result<String> {
    let cell = find_cell(row, MAIN_CELL).ok_or_else(|| ConjugationError::MissingCell {
        cell: MAIN_CELL,
        context: context.to_string(),
    })?;
    Ok(cell
        .first_text()
        .map(|text| extract_form(&normalize_apostrophes(text)))
        .unwrap_or_default())
}

/// Compose one tense table of the indicative, subjunctive or conditional.
///
/// Rows are identified by their pronoun cell. Rows whose pronoun is not
/// recognized are skipped; a row without a pronoun or main-form cell is a
/// markup shape violation.
pub fn compose_standard<N: MarkupNode>(rows: &[N], context: &str) -> Result<RawTense> {
    let mut forms = RawTense::new();

    for (index, row) in rows.iter().enumerate() {
        let row_context = format!("{context}, row {}", index + 1);

        let pronoun_cell =
            find_cell(*row, PRONOUN_CELL).ok_or_else(|| ConjugationError::MissingCell {
                cell: PRONOUN_CELL,
                context: row_context.clone(),
            })?;
        let pronoun_text = pronoun_cell.text_content();
        let Some(pronoun) = Pronoun::from_label(&pronoun_text) else {
            tracing::warn!(
                context = %row_context,
                pronoun = pronoun_text.trim(),
                "Unrecognized pronoun, row skipped"
            );
            continue;
        };

        let main = main_form(*row, &row_context)?;
        if main.is_empty() {
            tracing::debug!(context = %row_context, "Empty main form, row skipped");
            continue;
        }

        let mut prefix = find_cell(*row, REFLEXIVE_CELL)
            .map(|cell| reflexive_prefix(&cell.text_content()))
            .unwrap_or_default();
        if let Some(cell) = find_cell(*row, AUXILIARY_CELL) {
            prefix.push_str(&auxiliary_prefix(&cell.text_content()));
        }

        let mut value = format!("{prefix}{main}");
        let alternate = find_cell(*row, RECTIFIED_CELL)
            .and_then(|cell| cell.first_text().map(|text| extract_form(&normalize_apostrophes(text))))
            .filter(|form| !form.is_empty());
        if let Some(alternate) = alternate {
            value.push(',');
            value.push_str(&prefix);
            value.push_str(&alternate);
        }

        if forms.contains_key(&pronoun) {
            tracing::warn!(
                context = %row_context,
                pronoun = %pronoun,
                "Duplicate pronoun in tense table, row skipped"
            );
            continue;
        }
        forms.insert(pronoun, value);
    }

    Ok(forms)
}

/// Compose one imperative tense table.
///
/// Rows are bound to `tu`, `nous`, `vous` by position; their labels are
/// never consulted. When a row has a reflexive cell but no auxiliary cell,
/// the reflexive cell holds the fused auxiliary and pronoun (`sois-toi`).
/// A reflexive cell placed after the main form (`lave` `-toi`) is appended
/// to it instead.
pub fn compose_imperative<N: MarkupNode>(rows: &[N], context: &str) -> Result<RawTense> {
    if rows.len() > Pronoun::IMPERATIVE.len() {
        tracing::warn!(
            context,
            rows = rows.len(),
            "Imperative table has more than three rows, extra rows ignored"
        );
    }

    let mut forms = RawTense::new();

    for (index, (row, pronoun)) in rows.iter().zip(Pronoun::IMPERATIVE).enumerate() {
        let row_context = format!("{context}, row {}", index + 1);

        let main = main_form(*row, &row_context)?;
        if main.is_empty() {
            tracing::debug!(context = %row_context, "Empty main form, row skipped");
            continue;
        }

        let reflexive = find_cell(*row, REFLEXIVE_CELL);
        let auxiliary = find_cell(*row, AUXILIARY_CELL);

        let value = match (reflexive, auxiliary) {
            (Some(fused), None) if follows_main_form(*row, fused) => {
                format!("{main}{}", normalize_apostrophes(fused.text_content().trim()))
            }
            (Some(fused), None) => format!("{}{main}", auxiliary_prefix(&fused.text_content())),
            (_, Some(auxiliary)) => format!("{}{main}", auxiliary_prefix(&auxiliary.text_content())),
            (None, None) => main,
        };

        forms.insert(pronoun, value);
    }

    Ok(forms)
}

/// Check whether `cell` comes after the main-form cell in `row`.
fn follows_main_form<N: MarkupNode>(row: N, cell: N) -> bool {
    let cells = row.children_by_tag("td");
    let position = |target: &N| cells.iter().position(|c| c == target);
    match (position(&cell), find_cell(row, MAIN_CELL).and_then(|m| position(&m))) {
        (Some(cell_index), Some(main_index)) => cell_index > main_index,
        _ => false,
    }
}

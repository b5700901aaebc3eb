use crate::error::Error;
use serde_json::Number;

/// Parses a numeric form field. Blank text clears the field.
pub fn parse_optional_number(field: &str, text: &str) -> Result<Option<Number>, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = text.parse::<u64>() {
        return Ok(Some(value.into()));
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Some(value.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Some)
        .ok_or_else(|| Error::validation(field, format!("'{text}' is not a number")))
}

/// Parses a non-negative integer form field. Blank text clears the field.
pub fn parse_optional_count(field: &str, text: &str) -> Result<Option<u64>, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| Error::validation(field, format!("'{text}' is not a non-negative integer")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairField {
    First,
    Second,
}

pub(crate) type Pair = (Option<Number>, Option<Number>);

/// Edits one member of an optional two-field numeric group.
///
/// Clearing a member while its sibling is unset collapses the group to
/// `None`. Setting a member on an absent group fills the sibling from
/// `defaults`; a present group only has the edited member replaced.
pub(crate) fn merge_pair(
    current: Option<Pair>,
    field: PairField,
    value: Option<Number>,
    defaults: Pair,
) -> Option<Pair> {
    let was_present = current.is_some();
    let (mut first, mut second) = current.unwrap_or((None, None));
    let setting = value.is_some();
    match field {
        PairField::First => {
            first = value;
            if setting && !was_present {
                second = defaults.1;
            }
        }
        PairField::Second => {
            second = value;
            if setting && !was_present {
                first = defaults.0;
            }
        }
    }
    if first.is_none() && second.is_none() {
        None
    } else {
        Some((first, second))
    }
}

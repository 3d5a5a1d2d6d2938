//! Operator selection resolution
//!
//! Resolves free-form operator input into a validated set of record indices.
//! Accepted input (case-insensitive):
//! - `all` selects every record
//! - a comma separated list of 1-based numbers (`2`) and closed ranges (`1-3`)
//!
//! Any malformed term or out-of-range number rejects the whole input.

use std::collections::BTreeSet;
use thiserror::Error;

/// Validation failure for operator selection input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No sessions selected")]
    Empty,

    #[error("'{0}' is not a session number or range")]
    MalformedTerm(String),

    #[error("Range {start}-{end} runs backwards")]
    ReversedRange { start: usize, end: usize },

    #[error("Session number {number} is out of range (valid: 1-{count})")]
    OutOfRange { number: usize, count: usize },
}

/// Validated zero-based indices into the current session list.
///
/// Iteration is always ascending; selecting the same index twice collapses
/// to a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    indices: BTreeSet<usize>,
}

impl SelectionSet {
    /// Select every index in `0..count`
    pub fn all(count: usize) -> Self {
        Self {
            indices: (0..count).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Selected indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Selected indices in ascending order
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

/// Resolve operator input against a list of `count` records.
///
/// # Examples
/// ```
/// use lmreap_core::resolve_selection;
///
/// assert_eq!(resolve_selection("1-3", 5).unwrap().to_vec(), vec![0, 1, 2]);
/// assert_eq!(resolve_selection("ALL", 2).unwrap().to_vec(), vec![0, 1]);
/// assert!(resolve_selection("5", 3).is_err());
/// ```
pub fn resolve_selection(input: &str, count: usize) -> Result<SelectionSet, SelectionError> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("all") {
        return Ok(SelectionSet::all(count));
    }
    if input.is_empty() {
        return Err(SelectionError::Empty);
    }

    let mut ranges = Vec::new();
    for term in input.split(',').map(str::trim) {
        match term.split_once('-') {
            Some((start, end)) => {
                let start = parse_number(start, term)?;
                let end = parse_number(end, term)?;
                if start > end {
                    return Err(SelectionError::ReversedRange { start, end });
                }
                ranges.push((start, end));
            }
            None => {
                let number = parse_number(term, term)?;
                ranges.push((number, number));
            }
        }
    }

    // Validate only after every term resolved so nothing is partially applied
    for &(start, end) in &ranges {
        if start == 0 {
            return Err(SelectionError::OutOfRange { number: 0, count });
        }
        if end > count {
            return Err(SelectionError::OutOfRange { number: end, count });
        }
    }

    Ok(SelectionSet {
        indices: ranges
            .into_iter()
            .flat_map(|(start, end)| (start - 1)..end)
            .collect(),
    })
}

fn parse_number(value: &str, term: &str) -> Result<usize, SelectionError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectionError::MalformedTerm(term.to_string()));
    }
    value
        .parse::<usize>()
        .map_err(|_| SelectionError::MalformedTerm(term.to_string()))
}

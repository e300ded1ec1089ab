//! Track selection.
//!
//! Resolves the operator's free-text answer (or the "all mono tracks"
//! shortcut) into a validated [`Selection`]: distinct audio track ids in
//! ascending order. Ids that do not name an audio track are dropped rather
//! than reported, so sloppy input such as `"1, 3, 99"` still works.

mod prompt;

pub use prompt::{FixedAnswer, SelectionPrompt};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid id pattern"));

/// Errors from track selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Nothing left after filtering.
    #[error("no tracks selected")]
    EmptySelection,
}

/// Ordered set of distinct audio track ids chosen for transformation.
///
/// Only constructed through [`resolve`], so it is never empty and always
/// sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection(Vec<u32>);

impl Selection {
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        f.write_str(&ids.join(","))
    }
}

/// Extracts every integer from free-text input.
///
/// Any run of digits counts, so separators are irrelevant. Values that do not
/// fit a track id are ignored.
pub fn parse_ids(raw: &str) -> Vec<u32> {
    ID_PATTERN
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .collect()
}

/// Resolves selection intent into a [`Selection`].
///
/// - `auto_select_all_mono`: the mono ids, ignoring `raw_input`.
/// - blank `raw_input`: defaults to the mono ids.
/// - otherwise: the ids found in `raw_input`.
///
/// The candidates are deduplicated, sorted and restricted to `all_audio_ids`.
pub fn resolve(
    all_audio_ids: &[u32],
    mono_audio_ids: &[u32],
    raw_input: &str,
    auto_select_all_mono: bool,
) -> Result<Selection, SelectionError> {
    let candidates = if auto_select_all_mono || raw_input.trim().is_empty() {
        mono_audio_ids.to_vec()
    } else {
        parse_ids(raw_input)
    };

    let allowed: BTreeSet<u32> = all_audio_ids.iter().copied().collect();
    let ids: Vec<u32> = candidates
        .into_iter()
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .filter(|id| allowed.contains(id))
        .collect();

    if ids.is_empty() {
        return Err(SelectionError::EmptySelection);
    }

    Ok(Selection(ids))
}

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Paragraph;

/// Reviewer's choice for one CHANGED paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Before,
    After,
}

impl Choice {
    pub fn toggled(self) -> Self {
        match self {
            Choice::Before => Choice::After,
            Choice::After => Choice::Before,
        }
    }
}

/// Per-paragraph choices for the currently loaded result.
///
/// Keys are paragraph indices. A new result replaces the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionStore {
    choices: BTreeMap<usize, Choice>,
    changed: BTreeSet<usize>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds every CHANGED paragraph with [`Choice::Before`]; the reviewer has
    /// to opt in to each edit.
    pub fn seeded(paragraphs: &[Paragraph]) -> Self {
        let changed: BTreeSet<usize> = paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_changed())
            .map(|(index, _)| index)
            .collect();
        let choices = changed.iter().map(|index| (*index, Choice::Before)).collect();
        Self { choices, changed }
    }

    /// Overwrites the choice for `index`. Callers only offer toggles for
    /// CHANGED paragraphs, so no check happens here.
    pub fn set(&mut self, index: usize, choice: Choice) {
        self.choices.insert(index, choice);
    }

    /// Sets every CHANGED paragraph to `choice`.
    pub fn set_all(&mut self, choice: Choice) {
        for index in &self.changed {
            self.choices.insert(*index, choice);
        }
    }

    pub fn get(&self, index: usize) -> Option<Choice> {
        self.choices.get(&index).copied()
    }

    pub fn is_changed_index(&self, index: usize) -> bool {
        self.changed.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    pub fn accepted_count(&self) -> usize {
        self.choices.values().filter(|c| **c == Choice::After).count()
    }

    pub fn all_selections_made(&self) -> bool {
        self.choices.len() == self.changed.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Choice)> + '_ {
        self.choices.iter().map(|(index, choice)| (*index, *choice))
    }

    pub fn clear(&mut self) {
        self.choices.clear();
        self.changed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParagraphStatus;

    fn sample() -> Vec<Paragraph> {
        vec![
            Paragraph::new("a", "a", ParagraphStatus::Unchanged),
            Paragraph::new("b", "b2", ParagraphStatus::Changed),
            Paragraph::new("c", "c", ParagraphStatus::Skipped),
            Paragraph::new("d", "d2", ParagraphStatus::Changed),
            Paragraph::new("e", "e", ParagraphStatus::Errored),
        ]
    }

    #[test]
    fn seeding_defaults_changed_paragraphs_to_before() {
        let store = SelectionStore::seeded(&sample());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1), Some(Choice::Before));
        assert_eq!(store.get(3), Some(Choice::Before));
        assert_eq!(store.get(0), None);
        assert!(store.all_selections_made());
        assert_eq!(store.accepted_count(), 0);
    }

    #[test]
    fn all_selections_made_requires_one_entry_per_changed_paragraph() {
        let mut store = SelectionStore::seeded(&sample());
        store.choices.remove(&3);
        assert!(!store.all_selections_made());
        store.set(3, Choice::After);
        assert!(store.all_selections_made());
    }

    #[test]
    fn set_is_last_write_wins() {
        let mut store = SelectionStore::seeded(&sample());
        store.set(1, Choice::After);
        store.set(1, Choice::Before);
        store.set(1, Choice::After);
        assert_eq!(store.get(1), Some(Choice::After));
        assert_eq!(store.accepted_count(), 1);
    }

    #[test]
    fn set_all_touches_only_changed_indices() {
        let mut store = SelectionStore::seeded(&sample());
        store.set_all(Choice::After);
        assert_eq!(
            store.iter().collect::<Vec<_>>(),
            vec![(1, Choice::After), (3, Choice::After)]
        );
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = SelectionStore::seeded(&sample());
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.changed_count(), 0);
    }

    #[test]
    fn toggled_flips_choice() {
        assert_eq!(Choice::Before.toggled(), Choice::After);
        assert_eq!(Choice::After.toggled(), Choice::Before);
    }
}

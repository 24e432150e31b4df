use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::itinerary::Itinerary;

/// Slot id to chosen option id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selections(BTreeMap<String, String>);

impl Selections {
    /// Every changeable slot mapped to its default option.
    pub fn defaults_for(itinerary: &Itinerary) -> Self {
        itinerary
            .changeable_slots()
            .filter_map(|slot| {
                slot.default_activity_id()
                    .map(|default| (slot.id.clone(), default.to_string()))
            })
            .collect()
    }

    pub fn get(&self, slot_id: &str) -> Option<&str> {
        self.0.get(slot_id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(slot, option)| (slot.as_str(), option.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with one entry replaced; used to preview a staged choice.
    pub fn with(&self, slot_id: &str, option_id: &str) -> Self {
        let mut next = self.clone();
        next.0.insert(slot_id.to_string(), option_id.to_string());
        next
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for Selections {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Selections(
            iter.into_iter()
                .map(|(slot, option)| (slot.into(), option.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOutcome {
    /// Fresh defaults for a new itinerary identity.
    Seeded,
    /// Same identity as before; user choices kept.
    Kept,
    /// Empty itinerary; nothing to seed from.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    Applied,
    NotSeeded,
    StaleItinerary,
    UnknownSlot,
    UnknownOption,
}

impl SelectionOutcome {
    pub fn applied(self) -> bool {
        self == SelectionOutcome::Applied
    }
}

#[derive(Debug, Clone, Default)]
enum StoreState {
    #[default]
    Uninitialized,
    Seeded {
        identity: String,
        selections: Selections,
    },
}

/// The only mutable state behind an itinerary view.
///
/// Starts `Uninitialized`, becomes `Seeded` on the first load of a non-empty
/// itinerary, and only reseeds when the itinerary identity changes. All
/// writes go through [`SelectionStore::confirm_selection`].
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    state: StoreState,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self.state, StoreState::Seeded { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            StoreState::Seeded { identity, .. } => Some(identity),
            StoreState::Uninitialized => None,
        }
    }

    pub fn selections(&self) -> Option<&Selections> {
        match &self.state {
            StoreState::Seeded { selections, .. } => Some(selections),
            StoreState::Uninitialized => None,
        }
    }

    pub fn seed(&mut self, itinerary: &Itinerary) -> SeedOutcome {
        if itinerary.is_empty() {
            return SeedOutcome::Skipped;
        }

        if let StoreState::Seeded {
            identity,
            selections,
        } = &mut self.state
        {
            if identity.as_str() == itinerary.identity() {
                // Slots that appeared since the last load get their default;
                // existing entries are never touched.
                for slot in itinerary.changeable_slots() {
                    if let Some(default) = slot.default_activity_id() {
                        selections
                            .0
                            .entry(slot.id.clone())
                            .or_insert_with(|| default.to_string());
                    }
                }
                return SeedOutcome::Kept;
            }
        }

        let selections = Selections::defaults_for(itinerary);
        info!(
            "Seeded selections for {} with {} changeable slots",
            itinerary.identity(),
            selections.len()
        );
        self.state = StoreState::Seeded {
            identity: itinerary.identity().to_string(),
            selections,
        };
        SeedOutcome::Seeded
    }

    /// Replaces the choice for one slot. Anything that does not resolve
    /// against `itinerary` leaves the store untouched.
    pub fn confirm_selection(
        &mut self,
        itinerary: &Itinerary,
        slot_id: &str,
        option_id: &str,
    ) -> SelectionOutcome {
        let (identity, selections) = match &mut self.state {
            StoreState::Seeded {
                identity,
                selections,
            } => (identity, selections),
            StoreState::Uninitialized => return SelectionOutcome::NotSeeded,
        };

        if identity.as_str() != itinerary.identity() {
            return SelectionOutcome::StaleItinerary;
        }

        let slot = match itinerary.slot(slot_id) {
            Some((_, slot)) if slot.changeable() => slot,
            _ => {
                debug!("Ignoring selection for unknown slot {}", slot_id);
                return SelectionOutcome::UnknownSlot;
            }
        };

        if slot.option(option_id).is_none() {
            debug!("Ignoring unknown option {} for slot {}", option_id, slot_id);
            return SelectionOutcome::UnknownOption;
        }

        selections
            .0
            .insert(slot_id.to_string(), option_id.to_string());
        SelectionOutcome::Applied
    }

    /// Back to `Uninitialized`, e.g. when the view switches destination.
    pub fn reset(&mut self) {
        self.state = StoreState::Uninitialized;
    }
}

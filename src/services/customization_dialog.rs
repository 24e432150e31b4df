use serde::Serialize;

use crate::models::itinerary::{ActivityOption, Itinerary};
use crate::services::pricing_service::PricingService;
use crate::services::selection_store::{SelectionOutcome, SelectionStore};

/// Alternatives for one slot with a staged choice kept apart from the
/// committed selection. Nothing reaches the store until `confirm`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizationDialog {
    slot_id: String,
    day: u32,
    committed_id: Option<String>,
    staged_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogOptionView {
    #[serde(flatten)]
    pub option: ActivityOption,
    pub committed: bool,
    pub staged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogView {
    pub slot_id: String,
    pub day: u32,
    pub options: Vec<DialogOptionView>,
    pub staged_option_id: Option<String>,
    /// What the total would become if the staged option were confirmed.
    pub preview_total: Option<i64>,
    /// No options to show; render the empty state.
    pub fallback: bool,
}

impl CustomizationDialog {
    /// `None` when the slot does not exist. A slot without options still opens,
    /// with nothing staged.
    pub fn open(itinerary: &Itinerary, slot_id: &str, store: &SelectionStore) -> Option<Self> {
        let (day, slot) = itinerary.slot(slot_id)?;

        let committed_id = store
            .selections()
            .and_then(|selections| selections.get(slot_id))
            .filter(|id| slot.option(id).is_some())
            .map(String::from);

        let staged_id = committed_id
            .clone()
            .or_else(|| slot.default_activity_id().map(String::from))
            .or_else(|| slot.options().first().map(|option| option.id.clone()));

        Some(Self {
            slot_id: slot.id.clone(),
            day: day.day,
            committed_id,
            staged_id,
        })
    }

    pub fn slot_id(&self) -> &str {
        &self.slot_id
    }

    pub fn staged_id(&self) -> Option<&str> {
        self.staged_id.as_deref()
    }

    /// Stages an option of this slot. Returns false and leaves the staged
    /// choice alone for anything else.
    pub fn stage(&mut self, itinerary: &Itinerary, option_id: &str) -> bool {
        let offered = itinerary
            .slot(&self.slot_id)
            .is_some_and(|(_, slot)| slot.option(option_id).is_some());
        if offered {
            self.staged_id = Some(option_id.to_string());
        }
        offered
    }

    /// Commits the staged option and consumes the dialog. `None` when nothing
    /// was staged.
    pub fn confirm(
        self,
        itinerary: &Itinerary,
        store: &mut SelectionStore,
    ) -> Option<SelectionOutcome> {
        let staged = self.staged_id?;
        Some(store.confirm_selection(itinerary, &self.slot_id, &staged))
    }

    /// Closes without committing.
    pub fn cancel(self) {}

    pub fn view(&self, itinerary: &Itinerary, store: &SelectionStore) -> DialogView {
        let options: Vec<DialogOptionView> = itinerary
            .slot(&self.slot_id)
            .map(|(_, slot)| slot.options())
            .unwrap_or_default()
            .iter()
            .map(|option| DialogOptionView {
                committed: self.committed_id.as_deref() == Some(option.id.as_str()),
                staged: self.staged_id.as_deref() == Some(option.id.as_str()),
                option: option.clone(),
            })
            .collect();

        let preview_total = match (&self.staged_id, store.selections()) {
            (Some(staged), Some(selections)) => Some(PricingService::total_price(
                itinerary.base_price,
                itinerary,
                &selections.with(&self.slot_id, staged),
            )),
            _ => None,
        };

        DialogView {
            slot_id: self.slot_id.clone(),
            day: self.day,
            fallback: options.is_empty(),
            staged_option_id: self.staged_id.clone(),
            preview_total,
            options,
        }
    }
}

use dashmap::DashMap;
use log::{info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::models::itinerary::{Itinerary, RawItineraryPayload};
use crate::services::catalog::{CatalogSource, LoadError};
use crate::services::customization_dialog::{CustomizationDialog, DialogView};
use crate::services::pricing_service::{PriceBreakdown, PricingService};
use crate::services::selection_store::{
    SeedOutcome, SelectionOutcome, SelectionStore, Selections,
};

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ViewError {
    #[error("Itinerary view {0} was not found")]
    NotFound(Uuid),
    #[error("Itinerary is not loaded yet")]
    NotReady,
    #[error("Slot {0} does not exist in this itinerary")]
    UnknownSlot(String),
    #[error("No customization dialog is open")]
    NoDialog,
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Failed(LoadError),
    /// The catalog answered but had no days to show.
    Empty,
    Ready(Itinerary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    Failed,
    Empty,
    Ready,
}

/// One itinerary view instance: its load state, its own selection store and
/// at most one open customization dialog. Views never share a store.
#[derive(Debug)]
pub struct ItineraryView {
    id: Uuid,
    destination_id: String,
    load: LoadState,
    store: SelectionStore,
    dialog: Option<CustomizationDialog>,
    generation: u64,
    last_accessed: Instant,
}

#[derive(Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub view_id: Uuid,
    pub destination_id: &'a str,
    pub status: LoadStatus,
    pub error: Option<String>,
    pub itinerary: Option<&'a Itinerary>,
    pub selections: Option<&'a Selections>,
    pub total_price: Option<i64>,
    pub breakdown: Option<PriceBreakdown>,
    pub dialog: Option<DialogView>,
}

impl ItineraryView {
    pub fn new(destination_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            destination_id: destination_id.into(),
            load: LoadState::Loading,
            store: SelectionStore::new(),
            dialog: None,
            generation: 0,
            last_accessed: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_accessed.elapsed() > ttl
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn destination_id(&self) -> &str {
        &self.destination_id
    }

    pub fn status(&self) -> LoadStatus {
        match self.load {
            LoadState::Loading => LoadStatus::Loading,
            LoadState::Failed(_) => LoadStatus::Failed,
            LoadState::Empty => LoadStatus::Empty,
            LoadState::Ready(_) => LoadStatus::Ready,
        }
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        match &self.load {
            LoadState::Ready(itinerary) => Some(itinerary),
            _ => None,
        }
    }

    pub fn selections(&self) -> Option<&Selections> {
        self.store.selections()
    }

    /// Marks a fetch as in flight and returns its ticket. Only the result
    /// carrying the latest ticket is applied.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.load = LoadState::Loading;
        self.generation
    }

    /// Applies a fetch result. Seeds the store only from a complete, non-empty
    /// itinerary; returns `None` for superseded or failed loads.
    pub fn finish_load(
        &mut self,
        ticket: u64,
        result: Result<RawItineraryPayload, LoadError>,
    ) -> Option<SeedOutcome> {
        if ticket != self.generation {
            info!("Discarding superseded load for view {}", self.id);
            return None;
        }

        let itinerary = match result {
            Ok(payload) => payload.normalize(&self.destination_id),
            Err(err) => {
                warn!("Loading {} for view {} failed: {}", self.destination_id, self.id, err);
                self.load = LoadState::Failed(err);
                return None;
            }
        };

        if itinerary.is_empty() {
            self.load = LoadState::Empty;
            self.dialog = None;
            return Some(SeedOutcome::Skipped);
        }

        let outcome = self.store.seed(&itinerary);
        if let Some(dialog) = &self.dialog {
            if itinerary.slot(dialog.slot_id()).is_none() {
                self.dialog = None;
            }
        }
        self.load = LoadState::Ready(itinerary);
        Some(outcome)
    }

    /// Points the view at another destination. The old store, any open
    /// dialog and any load still in flight are discarded; the caller is
    /// expected to load next.
    pub fn switch_destination(&mut self, destination_id: impl Into<String>) {
        self.generation += 1;
        self.destination_id = destination_id.into();
        self.store.reset();
        self.dialog = None;
        self.load = LoadState::Loading;
    }

    pub fn confirm_selection(
        &mut self,
        slot_id: &str,
        option_id: &str,
    ) -> Result<SelectionOutcome, ViewError> {
        let itinerary = match &self.load {
            LoadState::Ready(itinerary) if self.store.is_seeded() => itinerary,
            _ => return Err(ViewError::NotReady),
        };
        Ok(self.store.confirm_selection(itinerary, slot_id, option_id))
    }

    pub fn total_price(&self) -> Option<i64> {
        let itinerary = self.itinerary()?;
        let selections = self.store.selections()?;
        Some(PricingService::total_price(
            itinerary.base_price,
            itinerary,
            selections,
        ))
    }

    /// Opens the dialog for `slot_id`, replacing any dialog already open.
    pub fn open_dialog(&mut self, slot_id: &str) -> Result<(), ViewError> {
        let itinerary = self.itinerary().ok_or(ViewError::NotReady)?;
        let dialog = CustomizationDialog::open(itinerary, slot_id, &self.store)
            .ok_or_else(|| ViewError::UnknownSlot(slot_id.to_string()))?;
        self.dialog = Some(dialog);
        Ok(())
    }

    pub fn stage_option(&mut self, option_id: &str) -> Result<bool, ViewError> {
        let itinerary = match &self.load {
            LoadState::Ready(itinerary) => itinerary,
            _ => return Err(ViewError::NotReady),
        };
        let dialog = self.dialog.as_mut().ok_or(ViewError::NoDialog)?;
        Ok(dialog.stage(itinerary, option_id))
    }

    /// Commits the staged option and closes the dialog.
    pub fn confirm_dialog(&mut self) -> Result<Option<SelectionOutcome>, ViewError> {
        let itinerary = match &self.load {
            LoadState::Ready(itinerary) => itinerary,
            _ => return Err(ViewError::NotReady),
        };
        let dialog = self.dialog.take().ok_or(ViewError::NoDialog)?;
        Ok(dialog.confirm(itinerary, &mut self.store))
    }

    /// Closes the dialog without committing. False when none was open.
    pub fn cancel_dialog(&mut self) -> bool {
        match self.dialog.take() {
            Some(dialog) => {
                dialog.cancel();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        let itinerary = self.itinerary();
        let selections = itinerary.and(self.store.selections());
        let breakdown = match (itinerary, selections) {
            (Some(itinerary), Some(selections)) => Some(PricingService::breakdown(
                itinerary.base_price,
                itinerary,
                selections,
            )),
            _ => None,
        };
        let dialog = match (itinerary, &self.dialog) {
            (Some(itinerary), Some(dialog)) => Some(dialog.view(itinerary, &self.store)),
            _ => None,
        };

        ViewSnapshot {
            view_id: self.id,
            destination_id: &self.destination_id,
            status: self.status(),
            error: match &self.load {
                LoadState::Failed(err) => Some(err.to_string()),
                _ => None,
            },
            itinerary,
            selections,
            total_price: breakdown.as_ref().map(|b| b.total),
            breakdown,
            dialog,
        }
    }
}

pub const DEFAULT_VIEW_TTL: Duration = Duration::from_secs(30 * 60);

/// Every live itinerary view, keyed by view id. A view untouched for longer
/// than the TTL is treated as abandoned and evicted.
pub struct ViewRegistry {
    views: DashMap<Uuid, ItineraryView>,
    ttl: Duration,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_VIEW_TTL)
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            views: DashMap::new(),
            ttl,
        }
    }

    pub fn create(&self, destination_id: &str) -> Uuid {
        self.evict_expired();
        let view = ItineraryView::new(destination_id);
        let id = view.id();
        self.views.insert(id, view);
        id
    }

    pub fn remove(&self, view_id: Uuid) -> bool {
        self.views.remove(&view_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Drops every expired view and returns how many went.
    pub fn evict_expired(&self) -> usize {
        let before = self.views.len();
        self.views.retain(|_, view| !view.is_expired(self.ttl));
        let evicted = before.saturating_sub(self.views.len());
        if evicted > 0 {
            info!("Evicted {} idle itinerary views", evicted);
        }
        evicted
    }

    /// Every access refreshes the view's TTL.
    pub fn with_view<R>(
        &self,
        view_id: Uuid,
        f: impl FnOnce(&ItineraryView) -> R,
    ) -> Result<R, ViewError> {
        self.with_view_mut(view_id, |view| f(view))
    }

    pub fn with_view_mut<R>(
        &self,
        view_id: Uuid,
        f: impl FnOnce(&mut ItineraryView) -> R,
    ) -> Result<R, ViewError> {
        let mut view = self
            .views
            .get_mut(&view_id)
            .ok_or(ViewError::NotFound(view_id))?;

        if view.is_expired(self.ttl) {
            // The shard lock must be released before removing
            drop(view);
            self.views
                .remove_if(&view_id, |_, view| view.is_expired(self.ttl));
            info!("Itinerary view {} expired", view_id);
            return Err(ViewError::NotFound(view_id));
        }

        view.last_accessed = Instant::now();
        Ok(f(&mut view))
    }

    /// Fetches the view's destination and applies the result. The map entry
    /// is not held while the request is in flight.
    pub async fn load(
        &self,
        catalog: &dyn CatalogSource,
        view_id: Uuid,
    ) -> Result<Option<SeedOutcome>, ViewError> {
        let (ticket, destination_id) = self.with_view_mut(view_id, |view| {
            (view.begin_load(), view.destination_id().to_string())
        })?;

        let result = catalog.fetch_itinerary(&destination_id).await;

        self.with_view_mut(view_id, |view| view.finish_load(ticket, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fare::RawFare;
    use async_trait::async_trait;
    use serde_json::json;

    fn payload(id: &str, with_days: bool) -> RawItineraryPayload {
        let days = if with_days {
            json!([{
                "day": 1,
                "title": "Arrival",
                "inner_items": [
                    {
                        "id": "inner1",
                        "customizable": true,
                        "customize_items": [
                            { "id": "o1", "price": 0 },
                            { "id": "o2", "price": 50 }
                        ]
                    },
                    { "id": "inner2", "title": "Dinner" }
                ]
            }])
        } else {
            json!([])
        };
        serde_json::from_value(json!({
            "destination": { "id": id, "price": 880 },
            "days": days
        }))
        .unwrap()
    }

    struct StaticCatalog;

    #[async_trait]
    impl CatalogSource for StaticCatalog {
        async fn fetch_itinerary(&self, id: &str) -> Result<RawItineraryPayload, LoadError> {
            match id {
                "missing" => Err(LoadError::NotFound(id.to_string())),
                "empty" => Ok(payload(id, false)),
                _ => Ok(payload(id, true)),
            }
        }

        async fn fetch_fares(&self, _id: &str) -> Result<Vec<RawFare>, LoadError> {
            Ok(vec![])
        }
    }

    #[test]
    fn confirm_before_load_is_refused() {
        let mut view = ItineraryView::new("bali");
        assert_eq!(view.status(), LoadStatus::Loading);
        assert_eq!(
            view.confirm_selection("day1-inner1", "day1-inner1-o2"),
            Err(ViewError::NotReady)
        );
        assert_eq!(view.total_price(), None);
    }

    #[test]
    fn superseded_results_are_dropped() {
        let mut view = ItineraryView::new("bali");
        let stale = view.begin_load();
        let current = view.begin_load();

        assert_eq!(view.finish_load(stale, Ok(payload("bali", true))), None);
        assert_eq!(view.status(), LoadStatus::Loading);
        assert_eq!(
            view.finish_load(current, Ok(payload("bali", true))),
            Some(SeedOutcome::Seeded)
        );
        assert_eq!(view.total_price(), Some(880));
    }

    #[test]
    fn failure_and_empty_are_distinct_states() {
        let mut view = ItineraryView::new("bali");
        let ticket = view.begin_load();
        view.finish_load(ticket, Err(LoadError::Status(503)));
        assert_eq!(view.status(), LoadStatus::Failed);
        assert!(view.snapshot().error.unwrap().contains("503"));
        assert!(!view.store.is_seeded());

        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(payload("bali", false)));
        assert_eq!(view.status(), LoadStatus::Empty);
        assert!(!view.store.is_seeded());
    }

    #[test]
    fn refetch_keeps_choices_and_cancel_keeps_total() {
        let mut view = ItineraryView::new("bali");
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(payload("bali", true)));

        view.open_dialog("day1-inner1").unwrap();
        assert!(view.stage_option("day1-inner1-o2").unwrap());
        assert_eq!(view.total_price(), Some(880));
        assert!(view.cancel_dialog());
        assert_eq!(view.total_price(), Some(880));

        view.open_dialog("day1-inner1").unwrap();
        view.stage_option("day1-inner1-o2").unwrap();
        assert_eq!(
            view.confirm_dialog().unwrap(),
            Some(SelectionOutcome::Applied)
        );
        assert_eq!(view.total_price(), Some(930));

        let ticket = view.begin_load();
        assert_eq!(
            view.finish_load(ticket, Ok(payload("bali", true))),
            Some(SeedOutcome::Kept)
        );
        assert_eq!(view.total_price(), Some(930));
    }

    #[test]
    fn switching_destination_discards_choices() {
        let mut view = ItineraryView::new("bali");
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(payload("bali", true)));
        view.confirm_selection("day1-inner1", "day1-inner1-o2").unwrap();
        view.open_dialog("day1-inner2").unwrap();

        view.switch_destination("fiji");
        assert!(view.snapshot().dialog.is_none());
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(payload("fiji", true)));

        assert_eq!(view.destination_id(), "fiji");
        assert_eq!(view.total_price(), Some(880));
    }

    #[test]
    fn dialog_requires_known_slot() {
        let mut view = ItineraryView::new("bali");
        assert_eq!(view.open_dialog("day1-inner1"), Err(ViewError::NotReady));

        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(payload("bali", true)));
        assert_eq!(
            view.open_dialog("day4-inner1"),
            Err(ViewError::UnknownSlot("day4-inner1".to_string()))
        );
        assert_eq!(view.stage_option("x"), Err(ViewError::NoDialog));
        assert!(!view.cancel_dialog());
    }

    #[actix_rt::test]
    async fn registry_loads_without_holding_entries() {
        let registry = ViewRegistry::new();
        let ok = registry.create("bali");
        let missing = registry.create("missing");
        let empty = registry.create("empty");

        assert_eq!(
            registry.load(&StaticCatalog, ok).await,
            Ok(Some(SeedOutcome::Seeded))
        );
        assert_eq!(registry.load(&StaticCatalog, missing).await, Ok(None));
        assert_eq!(
            registry.load(&StaticCatalog, empty).await,
            Ok(Some(SeedOutcome::Skipped))
        );

        assert_eq!(registry.with_view(ok, |v| v.status()), Ok(LoadStatus::Ready));
        assert_eq!(
            registry.with_view(missing, |v| v.status()),
            Ok(LoadStatus::Failed)
        );
        assert_eq!(registry.with_view(empty, |v| v.status()), Ok(LoadStatus::Empty));

        assert!(registry.remove(ok));
        assert_eq!(
            registry.load(&StaticCatalog, ok).await,
            Err(ViewError::NotFound(ok))
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn switching_destination_invalidates_loads_in_flight() {
        let mut view = ItineraryView::new("bali");
        let in_flight = view.begin_load();
        view.switch_destination("fiji");

        assert_eq!(view.finish_load(in_flight, Ok(payload("bali", true))), None);
        assert_eq!(view.status(), LoadStatus::Loading);
        assert!(view.selections().is_none());

        let ticket = view.begin_load();
        assert_eq!(
            view.finish_load(ticket, Ok(payload("fiji", true))),
            Some(SeedOutcome::Seeded)
        );
        assert_eq!(view.itinerary().unwrap().destination_id, "fiji");
    }

    #[test]
    fn idle_views_are_evicted() {
        let registry = ViewRegistry::with_ttl(Duration::from_millis(200));
        let idle = registry.create("bali");
        let busy = registry.create("fiji");

        std::thread::sleep(Duration::from_millis(120));
        assert!(registry.with_view(busy, |v| v.status()).is_ok());
        std::thread::sleep(Duration::from_millis(120));

        assert_eq!(registry.evict_expired(), 1);
        assert_eq!(
            registry.with_view(idle, |v| v.status()),
            Err(ViewError::NotFound(idle))
        );
        assert!(registry.with_view(busy, |v| v.status()).is_ok());

        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(
            registry.with_view_mut(busy, |v| v.cancel_dialog()),
            Err(ViewError::NotFound(busy))
        );
        assert!(registry.is_empty());

        registry.create("bali");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn creating_a_view_sweeps_expired_ones() {
        let registry = ViewRegistry::with_ttl(Duration::from_millis(20));
        registry.create("bali");
        registry.create("fiji");
        std::thread::sleep(Duration::from_millis(40));

        let fresh = registry.create("bali");
        assert_eq!(registry.len(), 1);
        assert!(registry.with_view(fresh, |v| v.id() == fresh).unwrap());
    }
}

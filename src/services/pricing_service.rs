use serde::Serialize;

use crate::models::itinerary::Itinerary;
use crate::services::selection_store::Selections;

pub struct PricingService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAdjustment {
    pub slot_id: String,
    pub option_id: String,
    pub title: String,
    pub price_change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub base_price: i64,
    pub adjustments: Vec<PriceAdjustment>,
    pub total: i64,
}

impl PricingService {
    /// Base price plus the delta of the selected option in every changeable slot.
    ///
    /// Fixed slots never contribute. A slot with no selection, or whose
    /// selection names an option the slot no longer offers, contributes zero.
    pub fn total_price(base_price: i64, itinerary: &Itinerary, selections: &Selections) -> i64 {
        Self::breakdown(base_price, itinerary, selections).total
    }

    /// Same computation as [`PricingService::total_price`], itemised per slot.
    pub fn breakdown(
        base_price: i64,
        itinerary: &Itinerary,
        selections: &Selections,
    ) -> PriceBreakdown {
        let adjustments: Vec<PriceAdjustment> = itinerary
            .changeable_slots()
            .filter_map(|slot| {
                let option_id = selections.get(&slot.id)?;
                let option = slot.option(option_id)?;
                Some(PriceAdjustment {
                    slot_id: slot.id.clone(),
                    option_id: option.id.clone(),
                    title: option.title.clone(),
                    price_change: option.price_change,
                })
            })
            .collect();

        // Catalog prices are untrusted; clamp instead of overflowing
        let total = adjustments
            .iter()
            .fold(base_price, |total, adjustment| {
                total.saturating_add(adjustment.price_change)
            });

        PriceBreakdown {
            base_price,
            adjustments,
            total,
        }
    }

    /// Whole currency units to the provider's minor units (cents).
    pub fn to_minor_units(total: i64) -> Option<i64> {
        total.checked_mul(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::SlotContent;
    use crate::services::selection_store::fixtures::sample;
    use crate::services::selection_store::SelectionStore;

    #[test]
    fn example_scenario_tracks_confirmations() {
        let itinerary = sample("bali");
        let mut store = SelectionStore::new();
        store.seed(&itinerary);

        let total = |store: &SelectionStore| {
            PricingService::total_price(880, &itinerary, store.selections().unwrap())
        };

        assert_eq!(total(&store), 880);
        store.confirm_selection(&itinerary, "day1-inner1", "o2");
        assert_eq!(total(&store), 930);
        store.confirm_selection(&itinerary, "day1-inner1", "o1");
        assert_eq!(total(&store), 880);
    }

    #[test]
    fn repeated_calls_agree() {
        let itinerary = sample("bali");
        let selections: Selections =
            [("day1-inner1", "o2"), ("day1-inner2", "o4")].into_iter().collect();

        let first = PricingService::total_price(880, &itinerary, &selections);
        for _ in 0..5 {
            assert_eq!(
                PricingService::total_price(880, &itinerary, &selections),
                first
            );
        }
        assert_eq!(first, 1050);
    }

    #[test]
    fn unknown_and_stale_entries_contribute_nothing() {
        let itinerary = sample("bali");
        let selections: Selections = [
            ("day1-inner1", "o2"),
            ("day7-inner3", "o9"),
            ("day1-inner2", "removed"),
            ("day2-inner1", "o4"),
        ]
        .into_iter()
        .collect();

        let breakdown = PricingService::breakdown(880, &itinerary, &selections);
        assert_eq!(breakdown.total, 930);
        assert_eq!(breakdown.adjustments.len(), 1);
        assert_eq!(breakdown.adjustments[0].slot_id, "day1-inner1");
    }

    #[test]
    fn empty_selections_price_at_base() {
        let itinerary = sample("bali");
        assert_eq!(
            PricingService::total_price(880, &itinerary, &Selections::default()),
            880
        );
    }

    #[test]
    fn oversized_price_changes_saturate() {
        let mut itinerary = sample("bali");
        if let SlotContent::Changeable { options, .. } = &mut itinerary.days[0].slots[0].content {
            options[1].price_change = i64::MAX;
        }
        let selections: Selections = [("day1-inner1", "o2"), ("day1-inner2", "o4")]
            .into_iter()
            .collect();

        let breakdown = PricingService::breakdown(880, &itinerary, &selections);
        assert_eq!(breakdown.total, i64::MAX);
        assert_eq!(PricingService::to_minor_units(breakdown.total), None);

        let selections: Selections = [("day1-inner1", "o1")].into_iter().collect();
        assert_eq!(
            PricingService::total_price(i64::MIN, &itinerary, &selections),
            i64::MIN
        );
    }

    #[test]
    fn converts_to_minor_units() {
        assert_eq!(PricingService::to_minor_units(930), Some(93_000));
        assert_eq!(PricingService::to_minor_units(i64::MAX), None);
    }
}

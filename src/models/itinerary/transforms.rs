use chrono::NaiveTime;
use log::warn;
use std::collections::HashSet;

use super::{
    normalized::{ActivityOption, ActivitySlot, Energy, Itinerary, ItineraryDay, SlotContent},
    raw::{RawCustomizeItem, RawDay, RawInnerItem, RawItineraryPayload},
};

impl RawItineraryPayload {
    /// Maps the catalog payload onto the canonical itinerary model.
    ///
    /// Pure: the same payload always yields the same slot and option ids, so
    /// selections keyed by those ids survive a refetch. Day and item order is
    /// the server's order. `fallback_id` is used when the destination record
    /// carries no id of its own.
    pub fn normalize(&self, fallback_id: &str) -> Itinerary {
        let destination = &self.destination;
        let destination_id = destination
            .id
            .clone()
            .unwrap_or_else(|| fallback_id.to_string());

        let base_price = destination
            .base_price
            .or(destination.price)
            .or(destination.starting_price)
            .unwrap_or(0);

        let mut seen_days = HashSet::new();
        let mut slot_ids = HashSet::new();
        let days = self
            .days
            .iter()
            .map(|day| {
                if !seen_days.insert(day.day) {
                    warn!(
                        "Destination {} lists day {} more than once",
                        destination_id, day.day
                    );
                }
                normalize_day(day, &mut slot_ids)
            })
            .collect();

        Itinerary {
            name: destination.name.clone().unwrap_or_default(),
            destination_id,
            base_price,
            days,
        }
    }
}

fn normalize_day(day: &RawDay, slot_ids: &mut HashSet<String>) -> ItineraryDay {
    let slots = day
        .inner_items
        .iter()
        .enumerate()
        .map(|(position, item)| normalize_slot(day.day, position + 1, item, slot_ids))
        .collect();

    ItineraryDay {
        day: day.day,
        title: day.title.clone().unwrap_or_default(),
        summary: fragments(&day.description),
        slots,
    }
}

fn normalize_slot(
    day: u32,
    position: usize,
    item: &RawInnerItem,
    slot_ids: &mut HashSet<String>,
) -> ActivitySlot {
    let id = unique_id(
        match &item.id {
            Some(inner_id) => format!("day{}-{}", day, inner_id),
            None => format!("day{}-inner{}", day, position),
        },
        slot_ids,
    );

    let content = if item.customizable && !item.customize_items.is_empty() {
        let mut option_ids = HashSet::new();
        let options: Vec<ActivityOption> = item
            .customize_items
            .iter()
            .enumerate()
            .map(|(index, customize)| {
                normalize_option(&id, index + 1, customize, &mut option_ids)
            })
            .collect();
        // First customize item in API order is the default
        let default_activity_id = options[0].id.clone();
        SlotContent::Changeable {
            options,
            default_activity_id,
        }
    } else {
        if item.customizable {
            warn!("Slot {} is customizable but has no options, showing it as fixed", id);
        }
        fixed_content(item)
    };

    ActivitySlot {
        time: item.time.as_deref().and_then(parse_time),
        id,
        content,
    }
}

fn normalize_option(
    slot_id: &str,
    position: usize,
    item: &RawCustomizeItem,
    option_ids: &mut HashSet<String>,
) -> ActivityOption {
    let id = unique_id(
        match &item.id {
            Some(item_id) => format!("{}-{}", slot_id, item_id),
            None => format!("{}-opt{}", slot_id, position),
        },
        option_ids,
    );

    let price_change = item.price.unwrap_or(0);
    if price_change < 0 {
        warn!("Option {} lowers the price by {}", id, -price_change);
    }

    ActivityOption {
        title: item.title.clone().unwrap_or_default(),
        tagline: item.tagline.clone().filter(|t| !t.trim().is_empty()),
        description: fragments(&item.description),
        energy: item
            .energy
            .as_deref()
            .and_then(Energy::parse)
            .unwrap_or_default(),
        image: item.image.clone().filter(|i| !i.trim().is_empty()),
        price_change,
        id,
    }
}

/// Later duplicates get `-2`, `-3`, ... in payload order, so the same payload
/// always yields the same ids.
fn unique_id(candidate: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(candidate.clone()) {
        return candidate;
    }
    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", candidate, suffix);
        if taken.insert(id.clone()) {
            warn!("Id {} is used more than once, renaming to {}", candidate, id);
            return id;
        }
        suffix += 1;
    }
}

fn fixed_content(item: &RawInnerItem) -> SlotContent {
    SlotContent::Fixed {
        title: item.title.clone().unwrap_or_default(),
        description: fragments(&item.description),
        image: item.image.clone().filter(|i| !i.trim().is_empty()),
    }
}

fn fragments(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|text| text.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

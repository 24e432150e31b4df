use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Energy {
    Low,
    #[default]
    Moderate,
    High,
}

impl Energy {
    /// Lenient parse of the catalog's free-text energy level.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "relaxed" | "easy" => Some(Energy::Low),
            "moderate" | "medium" => Some(Energy::Moderate),
            "high" | "active" | "intense" => Some(Energy::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityOption {
    pub id: String,
    pub title: String,
    pub tagline: Option<String>,
    pub description: Vec<String>,
    pub energy: Energy,
    pub image: Option<String>,
    /// Signed delta added to the base price while this option is selected.
    pub price_change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotContent {
    Fixed {
        title: String,
        description: Vec<String>,
        image: Option<String>,
    },
    // Only ever built with at least one option, and the default is one of them.
    Changeable {
        options: Vec<ActivityOption>,
        default_activity_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySlot {
    pub id: String,
    pub time: Option<NaiveTime>,
    #[serde(flatten)]
    pub content: SlotContent,
}

impl ActivitySlot {
    pub fn changeable(&self) -> bool {
        matches!(self.content, SlotContent::Changeable { .. })
    }

    /// Empty for fixed slots.
    pub fn options(&self) -> &[ActivityOption] {
        match &self.content {
            SlotContent::Changeable { options, .. } => options,
            SlotContent::Fixed { .. } => &[],
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&ActivityOption> {
        self.options().iter().find(|option| option.id == option_id)
    }

    pub fn default_activity_id(&self) -> Option<&str> {
        match &self.content {
            SlotContent::Changeable {
                default_activity_id,
                ..
            } => Some(default_activity_id),
            SlotContent::Fixed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    pub summary: Vec<String>,
    pub slots: Vec<ActivitySlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub destination_id: String,
    pub name: String,
    pub base_price: i64,
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    /// Selections are keyed to this; a different identity means a fresh seed.
    pub fn identity(&self) -> &str {
        &self.destination_id
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &ActivitySlot> {
        self.days.iter().flat_map(|day| day.slots.iter())
    }

    pub fn changeable_slots(&self) -> impl Iterator<Item = &ActivitySlot> {
        self.slots().filter(|slot| slot.changeable())
    }

    /// Finds a slot together with the day that owns it.
    pub fn slot(&self, slot_id: &str) -> Option<(&ItineraryDay, &ActivitySlot)> {
        self.days.iter().find_map(|day| {
            day.slots
                .iter()
                .find(|slot| slot.id == slot_id)
                .map(|slot| (day, slot))
        })
    }
}

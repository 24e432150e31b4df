use log::warn;
use serde::{Deserialize, Serialize};

use super::itinerary::raw::{deserialize_optional_id, deserialize_optional_price};

/// A tour/fare record as the booking listing sends it. Field naming varies
/// between records, so every known spelling gets its own slot here and
/// `into_fare` resolves the fallback chains once.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawFare {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default, alias = "tourId", deserialize_with = "deserialize_optional_id")]
    pub tour_id: Option<String>,
    #[serde(default, alias = "title")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub adult_price: Option<i64>,
    #[serde(default, rename = "adultPrice", deserialize_with = "deserialize_optional_price")]
    pub adult_price_camel: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price_adult: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub child_price: Option<i64>,
    #[serde(default, rename = "childPrice", deserialize_with = "deserialize_optional_price")]
    pub child_price_camel: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price_child: Option<i64>,

    #[serde(default)]
    pub bed_configuration: Option<String>,
    #[serde(default, rename = "bedConfiguration")]
    pub bed_configuration_camel: Option<String>,
    #[serde(default)]
    pub bed_type: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,

    #[serde(default, alias = "departureFlight")]
    pub departure_flight: Option<String>,
    #[serde(default, alias = "returnFlight")]
    pub return_flight: Option<String>,
}

/// Canonical fare passed through to checkout untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fare {
    pub id: String,
    pub tour_id: Option<String>,
    pub name: String,
    pub adult_price: i64,
    pub child_price: i64,
    pub bed_configuration: Option<String>,
    pub departure_flight: Option<String>,
    pub return_flight: Option<String>,
}

impl RawFare {
    /// `None` when no spelling of the adult price is present.
    pub fn into_fare(self, position: usize) -> Option<Fare> {
        let adult_price = self
            .adult_price
            .or(self.adult_price_camel)
            .or(self.price_adult)
            .or(self.price)?;
        let child_price = self
            .child_price
            .or(self.child_price_camel)
            .or(self.price_child)
            .unwrap_or(adult_price);
        let bed_configuration = [
            self.bed_configuration,
            self.bed_configuration_camel,
            self.bed_type,
            self.room_type,
        ]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty());

        Some(Fare {
            id: self.id.unwrap_or_else(|| format!("fare{}", position)),
            tour_id: self.tour_id,
            name: self.name.unwrap_or_default(),
            adult_price,
            child_price,
            bed_configuration,
            departure_flight: self.departure_flight,
            return_flight: self.return_flight,
        })
    }
}

pub fn canonicalize_fares(raw: Vec<RawFare>) -> Vec<Fare> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, fare)| {
            let label = fare.id.clone().unwrap_or_else(|| format!("#{}", index + 1));
            let canonical = fare.into_fare(index + 1);
            if canonical.is_none() {
                warn!("Dropping fare {} without an adult price", label);
            }
            canonical
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Vec<RawFare> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn resolves_aliased_price_fields() {
        let fares = canonicalize_fares(parse(json!([
            { "id": "f1", "adultPrice": 1200, "childPrice": "900", "bedConfiguration": "Twin" },
            { "id": "f2", "price": 999, "room_type": "Double" },
            { "id": "f3", "adult_price": 1500, "price": 10, "price_child": 700 }
        ])));

        assert_eq!(fares.len(), 3);
        assert_eq!(fares[0].adult_price, 1200);
        assert_eq!(fares[0].child_price, 900);
        assert_eq!(fares[0].bed_configuration.as_deref(), Some("Twin"));

        assert_eq!(fares[1].adult_price, 999);
        assert_eq!(fares[1].child_price, 999);
        assert_eq!(fares[1].bed_configuration.as_deref(), Some("Double"));

        assert_eq!(fares[2].adult_price, 1500);
        assert_eq!(fares[2].child_price, 700);
    }

    #[test]
    fn drops_fares_without_any_price() {
        let fares = canonicalize_fares(parse(json!([
            { "id": "nope", "bed_type": "King" },
            { "tourId": 44, "price_adult": 300, "departureFlight": "QF1 08:00" }
        ])));

        assert_eq!(fares.len(), 1);
        assert_eq!(fares[0].id, "fare2");
        assert_eq!(fares[0].tour_id.as_deref(), Some("44"));
        assert_eq!(fares[0].departure_flight.as_deref(), Some("QF1 08:00"));
    }
}

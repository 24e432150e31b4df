use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, OneOrMany, PickFirst};
use serde_with::formats::PreferMany;

// Shapes exactly as the catalog API sends them. Nothing outside `transforms`
// should read these.

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct RawItineraryPayload {
    pub destination: RawDestination,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub days: Vec<RawDay>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawDestination {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price: Option<i64>,
    #[serde(
        default,
        alias = "basePrice",
        deserialize_with = "deserialize_optional_price"
    )]
    pub base_price: Option<i64>,
    #[serde(
        default,
        alias = "startingPrice",
        deserialize_with = "deserialize_optional_price"
    )]
    pub starting_price: Option<i64>,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct RawDay {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(alias = "day_number", alias = "dayNumber")]
    pub day: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_, PreferMany>>")]
    #[serde(default)]
    pub description: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "innerItems", alias = "items")]
    pub inner_items: Vec<RawInnerItem>,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct RawInnerItem {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_, PreferMany>>")]
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default, alias = "imageUrl", alias = "image_url")]
    pub image: Option<String>,
    #[serde(default, alias = "isCustomizable", alias = "is_customizable")]
    pub customizable: bool,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "customizeItems")]
    pub customize_items: Vec<RawCustomizeItem>,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct RawCustomizeItem {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_, PreferMany>>")]
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default, alias = "imageUrl", alias = "image_url")]
    pub image: Option<String>,
    #[serde(
        default,
        alias = "priceChange",
        alias = "price_change",
        deserialize_with = "deserialize_optional_price"
    )]
    pub price: Option<i64>,
    #[serde(default, alias = "energy_level", alias = "energyLevel")]
    pub energy: Option<String>,
}

// Ids show up as strings, integers, or Mongo-style {"$oid": ...} objects
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Object(map)) => match map.get("$oid") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    })
}

// Prices are whole currency units; "1,299", 1299 and 1299.4 all read as 1299
pub(crate) fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().and_then(whole_units)
            }
        }
        Some(serde_json::Value::String(s)) => parse_price_str(&s),
        _ => None,
    })
}

fn parse_price_str(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<i64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().and_then(whole_units))
}

// Anything a float cast would clamp to i64::MIN/MAX is treated as missing
fn whole_units(value: f64) -> Option<i64> {
    let rounded = value.round();
    if rounded.is_finite() && rounded.abs() < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

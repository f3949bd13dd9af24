use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::error::ValidationError;

/// One device report exactly as posted. Nothing here is trusted yet.
///
/// Numbers are taken as their JSON text; any other non-string value reads as
/// missing, so a bad field fails its own item and not the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocationItem {
    #[serde(rename = "lm_device_id", default, deserialize_with = "lenient_text")]
    pub device_id: Option<String>,
    #[serde(rename = "lm_latitude", default, deserialize_with = "lenient_text")]
    pub latitude: Option<String>,
    #[serde(rename = "lm_longitude", default, deserialize_with = "lenient_text")]
    pub longitude: Option<String>,
    #[serde(rename = "lm_device_alias", default, deserialize_with = "lenient_text")]
    pub alias: Option<String>,
    #[serde(rename = "lm_datetime", default, deserialize_with = "lenient_text")]
    pub datetime: Option<String>,
}

impl RawLocationItem {
    /// Reads one entry of the `locations` array.
    pub fn from_entry(entry: &Value) -> Result<Self, ValidationError> {
        match entry {
            Value::Null => Err(ValidationError::NullItem),
            Value::Object(_) => {
                Self::deserialize(entry).map_err(|_| ValidationError::MalformedItem)
            }
            _ => Err(ValidationError::MalformedItem),
        }
    }

    pub fn alias_or_empty(&self) -> String {
        self.alias.as_deref().unwrap_or_default().trim().to_string()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Entries stay untyped until each one is read on its own.
#[derive(Debug, Default, Deserialize)]
pub struct LocationBatch {
    #[serde(default)]
    pub locations: Option<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn numeric_fields_keep_their_json_text() {
        let entry = json!({"lm_latitude": -2.16144861, "lm_longitude": 95, "lm_device_id": 7});
        let item = RawLocationItem::from_entry(&entry).unwrap();
        assert_eq!(item.latitude.as_deref(), Some("-2.16144861"));
        assert_eq!(item.longitude.as_deref(), Some("95"));
        assert_eq!(item.device_id.as_deref(), Some("7"));
    }

    #[test]
    fn other_field_types_read_as_missing() {
        let entry = json!({
            "lm_latitude": {"deg": 1},
            "lm_longitude": [1, 2],
            "lm_device_alias": true,
            "lm_datetime": null
        });
        let item = RawLocationItem::from_entry(&entry).unwrap();
        assert_eq!(item.latitude, None);
        assert_eq!(item.longitude, None);
        assert_eq!(item.alias, None);
        assert_eq!(item.datetime, None);
    }

    #[test]
    fn null_and_non_object_entries_are_rejected() {
        assert_eq!(
            RawLocationItem::from_entry(&Value::Null).unwrap_err(),
            ValidationError::NullItem
        );
        for entry in [json!(5), json!("text"), json!([1, 2]), json!(false)] {
            assert_eq!(
                RawLocationItem::from_entry(&entry).unwrap_err(),
                ValidationError::MalformedItem
            );
        }
    }

    #[test]
    fn batch_keeps_entries_untyped() {
        let batch: LocationBatch =
            serde_json::from_str(r#"{"locations":[{"lm_latitude":95}, 3, null]}"#).unwrap();
        assert_eq!(batch.locations.unwrap().len(), 3);
    }
}

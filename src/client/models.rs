//! Data types exchanged with the CMDB

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Direction of a CI relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    All,
    DirectedFrom,
    DirectedTo,
    Bidirectional,
    Omnidirectional,
}

impl RelationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationDirection::All => "all",
            RelationDirection::DirectedFrom => "directed_from",
            RelationDirection::DirectedTo => "directed_to",
            RelationDirection::Bidirectional => "bidirectional",
            RelationDirection::Omnidirectional => "omnidirectional",
        }
    }
}

impl fmt::Display for RelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column an attribute stores its value in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValueType {
    #[serde(rename = "value_text")]
    Text,
    #[serde(rename = "value_date")]
    Date,
    #[serde(rename = "value_default")]
    Default,
    #[serde(rename = "value_ci")]
    Ci,
}

impl AttributeValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeValueType::Text => "value_text",
            AttributeValueType::Date => "value_date",
            AttributeValueType::Default => "value_default",
            AttributeValueType::Ci => "value_ci",
        }
    }
}

impl fmt::Display for AttributeValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CI returned by the create endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedCi {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: u64,

    #[serde(deserialize_with = "id_from_string_or_number")]
    pub ci_type_id: u64,

    #[serde(default)]
    pub icon: String,

    #[serde(deserialize_with = "id_from_string_or_number")]
    pub history_id: u64,

    #[serde(default)]
    pub valid_from: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

/// Read an id the CMDB may send either as `17` or as `"17"`
pub(crate) fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_id(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relation_direction_wire_names() {
        assert_eq!(
            serde_json::to_value(RelationDirection::DirectedFrom).unwrap(),
            json!("directed_from")
        );
        assert_eq!(RelationDirection::Omnidirectional.to_string(), "omnidirectional");
        let parsed: RelationDirection = serde_json::from_value(json!("bidirectional")).unwrap();
        assert_eq!(parsed, RelationDirection::Bidirectional);
    }

    #[test]
    fn test_attribute_value_type_wire_names() {
        assert_eq!(
            serde_json::to_value(AttributeValueType::Default).unwrap(),
            json!("value_default")
        );
        assert_eq!(AttributeValueType::Ci.as_str(), "value_ci");
    }

    #[test]
    fn test_created_ci_accepts_string_ids() {
        let ci: CreatedCi = serde_json::from_value(json!({
            "id": "617827",
            "ci_type_id": 476,
            "icon": "",
            "history_id": "59529024",
            "valid_from": "2020-01-13 15:14:05",
            "created_at": "2020-01-13 15:14:05",
            "updated_at": "2020-01-13 15:14:05"
        }))
        .unwrap();

        assert_eq!(ci.id, 617827);
        assert_eq!(ci.ci_type_id, 476);
        assert_eq!(ci.history_id, 59529024);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&json!("42")), Some(42));
        assert_eq!(parse_id(&json!(42)), Some(42));
        assert_eq!(parse_id(&json!("x")), None);
        assert_eq!(parse_id(&Value::Null), None);
    }
}

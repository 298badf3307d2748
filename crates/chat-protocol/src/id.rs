//! Large integer IDs cross the wire as decimal strings so JS clients never
//! lose precision on a 64-bit value. `serde(with = "id_string")` on an `i64`
//! field buys that without a dedicated newtype at every call site.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<i64>().map_err(D::Error::custom)
}

/// Same contract, but an empty string or `"0"` maps to `0` rather than
/// erroring -- used for the optional `conversationId` on `SEND_MSG` and
/// `HISTORY_REQ`, where "absent" means "use the world conversation".
pub mod optional_or_zero {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<i64>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "crate::id")]
        id: i64,
    }

    #[test]
    fn round_trips_through_a_decimal_string() {
        let w = Wrapper { id: 9_007_199_254_740_993 };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"id":"9007199254740993"}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 9_007_199_254_740_993);
    }

    #[derive(Serialize, Deserialize)]
    struct OptWrapper {
        #[serde(with = "crate::id::optional_or_zero")]
        conversation_id: i64,
    }

    #[test]
    fn empty_string_maps_to_zero() {
        let w: OptWrapper = serde_json::from_str(r#"{"conversation_id":""}"#).unwrap();
        assert_eq!(w.conversation_id, 0);
    }
}

//! Tri-state field updates for partial patches.

use serde::{Deserialize, Deserializer};

/// Update instruction for an optional field.
///
/// In JSON, an absent key means `Keep`, an explicit `null` means `Clear`
/// and any other value means `Set`. Patch structs mark these fields
/// `#[serde(default)]` so absence falls back to `Keep`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Value being set, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Applies the update to an optional field in place.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => *target = None,
            FieldUpdate::Set(value) => *target = Some(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        location: FieldUpdate<String>,
    }

    #[test]
    fn test_absent_key_keeps() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.location, FieldUpdate::Keep);
    }

    #[test]
    fn test_null_clears() {
        let probe: Probe = serde_json::from_str(r#"{"location": null}"#).unwrap();
        assert_eq!(probe.location, FieldUpdate::Clear);
    }

    #[test]
    fn test_value_sets() {
        let probe: Probe = serde_json::from_str(r#"{"location": "Room 101"}"#).unwrap();
        assert_eq!(probe.location, FieldUpdate::Set("Room 101".to_string()));
    }

    #[test]
    fn test_apply_to() {
        let mut field = Some("old".to_string());
        FieldUpdate::Keep.apply_to(&mut field);
        assert_eq!(field.as_deref(), Some("old"));

        FieldUpdate::Set("new".to_string()).apply_to(&mut field);
        assert_eq!(field.as_deref(), Some("new"));

        FieldUpdate::Clear.apply_to(&mut field);
        assert!(field.is_none());
    }
}

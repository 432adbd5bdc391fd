//! Canonical currency record, independent of any feed format.

use serde::{Deserialize, Serialize};

/// A single exchange rate as known to the service.
///
/// `value` is the rate for `nominal` units of the currency. Records read back
/// from the store are always per-unit (`nominal == 1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Source-assigned identifier (e.g. `R01235`); natural key for storage.
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NumCode")]
    pub num_code: i32,
    #[serde(rename = "CharCode")]
    pub char_code: String,
    #[serde(rename = "Nominal")]
    pub nominal: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

impl Currency {
    /// Creates a per-unit record, the shape the store hands back.
    pub fn per_unit(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            num_code: 0,
            char_code: String::new(),
            nominal: 1,
            name: name.into(),
            value,
        }
    }

    /// Rate for a single unit of the currency.
    ///
    /// A nominal below 1 is treated as 1.
    pub fn per_unit_value(&self) -> f64 {
        self.value / f64::from(self.nominal.max(1))
    }

    /// Returns the same record expressed per single unit.
    pub fn normalized(&self) -> Self {
        Self {
            nominal: 1,
            value: self.per_unit_value(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yen() -> Currency {
        Currency {
            id: "R01820".into(),
            num_code: 392,
            char_code: "JPY".into(),
            nominal: 100,
            name: "Японских иен".into(),
            value: 61.5,
        }
    }

    #[test]
    fn test_per_unit_value_divides_by_nominal() {
        assert!((yen().per_unit_value() - 0.615).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_keeps_identity_fields() {
        let normalized = yen().normalized();
        assert_eq!(normalized.nominal, 1);
        assert_eq!(normalized.id, "R01820");
        assert_eq!(normalized.char_code, "JPY");
        assert!((normalized.value - 0.615).abs() < 1e-12);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_string(&Currency::per_unit("USD", "", 90.5)).unwrap();
        assert_eq!(
            json,
            r#"{"ID":"USD","NumCode":0,"CharCode":"","Nominal":1,"Name":"","Value":90.5}"#
        );
    }

    #[test]
    fn test_structural_equality() {
        let mut other = yen();
        assert_eq!(yen(), other);
        other.value = 61.51;
        assert_ne!(yen(), other);
    }
}

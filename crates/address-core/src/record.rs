// # Address Records
//
// Domain types for postal address records keyed by an individual's name.
//
// The name is the identity key. It is lower-cased before any store
// interaction so lookups are case-insensitive.

use serde::{Deserialize, Serialize};

/// Lower-case a name into its identity key
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
}

/// A stored address record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Normalized name
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl AddressRecord {
    /// Build a stored record from an insert request and its new identifier
    pub fn from_new(id: impl Into<String>, new: NewAddress) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            street: new.street,
            city: new.city,
            state: new.state,
            country: new.country,
        }
    }

    /// Whether this record lies in the given state and country (exact match)
    pub fn is_located_in(&self, state: &str, country: &str) -> bool {
        self.state == state && self.country == country
    }
}

/// Fields of a record to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl NewAddress {
    /// Create a new address, normalizing the name
    pub fn new(
        name: &str,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: normalize_name(name),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }
}

/// Partial update of an address record
///
/// Only non-empty input fields are carried. An empty string means
/// "leave unchanged", so a patch built from all-empty input changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressPatch {
    /// Build a patch from raw field values, dropping empty ones
    pub fn from_fields(street: &str, city: &str, state: &str, country: &str) -> Self {
        fn present(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            street: present(street),
            city: present(city),
            state: present(state),
            country: present(country),
        }
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.city.is_none() && self.state.is_none() && self.country.is_none()
    }

    /// Present fields as `(field name, value)` pairs
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Overwrite the present fields of `record`
    pub fn apply(&self, record: &mut AddressRecord) {
        if let Some(street) = &self.street {
            record.street = street.clone();
        }
        if let Some(city) = &self.city {
            record.city = city.clone();
        }
        if let Some(state) = &self.state {
            record.state = state.clone();
        }
        if let Some(country) = &self.country {
            record.country = country.clone();
        }
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Cache key for a property address.
///
/// Each comma-separated component is trimmed, internal whitespace runs are
/// collapsed to a single space and the result is lowercased, so addresses that
/// only differ in case or spacing share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AddressKey(String);

impl AddressKey {
    pub fn normalize(input: &str) -> Self {
        let normalized = input
            .split(',')
            .map(|component| {
                component
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase()
            })
            .filter(|component| !component.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AddressKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AddressKey {
    fn from(value: String) -> Self {
        Self::normalize(&value)
    }
}

impl From<AddressKey> for String {
    fn from(value: AddressKey) -> Self {
        value.0
    }
}

/// Validated property address as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAddress {
    street: String,
    city: String,
    state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip: Option<String>,
}

impl PropertyAddress {
    pub fn new(street: &str, city: &str, state: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            street: required("street", street)?,
            city: required("city", city)?,
            state: required("state", state)?,
            zip: None,
        })
    }

    /// Attaches a zip code; blank input leaves the address without one.
    pub fn with_zip(mut self, zip: &str) -> Self {
        let trimmed = zip.trim();
        self.zip = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn zip(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    /// `"<city>, <state>"` as used by split-address upstream contracts.
    pub fn locality(&self) -> String {
        match &self.zip {
            Some(zip) => format!("{}, {} {}", self.city, self.state, zip),
            None => format!("{}, {}", self.city, self.state),
        }
    }

    /// Single-line form echoed back to the caller.
    pub fn display(&self) -> String {
        format!("{}, {}", self.street, self.locality())
    }

    pub fn key(&self) -> AddressKey {
        AddressKey::normalize(&self.display())
    }
}

impl Display for PropertyAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAddressField { field });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_ignores_case_and_whitespace() {
        assert_eq!(
            AddressKey::normalize("1 Main St, Springfield, IL"),
            AddressKey::normalize("1 main st, springfield, il")
        );
        assert_eq!(
            AddressKey::normalize("  1   Main St ,Springfield,   IL  "),
            AddressKey::normalize("1 main st, springfield, il")
        );
    }

    #[test]
    fn normalization_is_deterministic() {
        let key = AddressKey::normalize("10 Elm Rd, Austin, TX");
        assert_eq!(key.as_str(), "10 elm rd, austin, tx");
        assert_eq!(key, AddressKey::normalize(key.as_str()));
    }

    #[test]
    fn address_display_trims_fields() {
        let address = PropertyAddress::new(" 1 Main St ", "Springfield", " IL").expect("valid");
        assert_eq!(address.display(), "1 Main St, Springfield, IL");
        assert_eq!(address.key().as_str(), "1 main st, springfield, il");
    }

    #[test]
    fn zip_is_part_of_display_and_key() {
        let address = PropertyAddress::new("1 Main St", "Springfield", "IL")
            .expect("valid")
            .with_zip(" 62701 ");
        assert_eq!(address.display(), "1 Main St, Springfield, IL 62701");
        assert_eq!(address.locality(), "Springfield, IL 62701");
        assert_ne!(
            address.key(),
            PropertyAddress::new("1 Main St", "Springfield", "IL")
                .expect("valid")
                .key()
        );
    }

    #[test]
    fn blank_zip_is_ignored() {
        let address = PropertyAddress::new("1 Main St", "Springfield", "IL")
            .expect("valid")
            .with_zip("   ");
        assert_eq!(address.zip(), None);
    }

    #[test]
    fn rejects_empty_street() {
        let err = PropertyAddress::new("  ", "Springfield", "IL").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyAddressField { field: "street" });
    }
}

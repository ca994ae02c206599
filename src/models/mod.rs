use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Broad category of a listing or enquiry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Residential,
    Commercial,
}

/// Kind of property being listed or asked for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Apartment,
    IndependentHouse,
    Villa,
    Plot,
    Office,
    Shop,
    Warehouse,
}

/// Who posted the listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Owner,
    Broker,
    Company,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "RESIDENTIAL",
            Self::Commercial => "COMMERCIAL",
        }
    }
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "APARTMENT",
            Self::IndependentHouse => "INDEPENDENT_HOUSE",
            Self::Villa => "VILLA",
            Self::Plot => "PLOT",
            Self::Office => "OFFICE",
            Self::Shop => "SHOP",
            Self::Warehouse => "WAREHOUSE",
        }
    }
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Broker => "BROKER",
            Self::Company => "COMPANY",
        }
    }
}

// Parsing accepts the wire spelling in any case, with `-` or ` ` in place of `_`.
fn normalize_variant(s: &str) -> String {
    s.trim().to_uppercase().replace(['-', ' '], "_")
}

impl FromStr for Category {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_variant(s).as_str() {
            "RESIDENTIAL" => Ok(Self::Residential),
            "COMMERCIAL" => Ok(Self::Commercial),
            _ => Err(FilterError::UnknownVariant {
                dimension: "category",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for PropertyType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_variant(s).as_str() {
            "APARTMENT" => Ok(Self::Apartment),
            "INDEPENDENT_HOUSE" => Ok(Self::IndependentHouse),
            "VILLA" => Ok(Self::Villa),
            "PLOT" => Ok(Self::Plot),
            "OFFICE" => Ok(Self::Office),
            "SHOP" => Ok(Self::Shop),
            "WAREHOUSE" => Ok(Self::Warehouse),
            _ => Err(FilterError::UnknownVariant {
                dimension: "type",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Source {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_variant(s).as_str() {
            "OWNER" => Ok(Self::Owner),
            "BROKER" => Ok(Self::Broker),
            "COMPANY" => Ok(Self::Company),
            _ => Err(FilterError::UnknownVariant {
                dimension: "source",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location information for a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Core property listing, as returned by the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub location: Location,
    pub price: i64,
    #[serde(default)]
    pub bhk: Option<u8>,
    #[serde(default)]
    pub area_sqft: Option<u32>,
    pub category: Category,
    pub property_type: PropertyType,
    pub source: Source,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Budget attached to an enquiry. Either bound may be missing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budget {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// One of the locations an enquirer is willing to consider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferredLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A buyer or tenant requirement posted to the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub preferred_locations: Vec<PreferredLocation>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub enquiry_type: Option<PropertyType>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub bhk: Option<u8>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enum_variants_loosely() {
        assert_eq!("residential".parse::<Category>().unwrap(), Category::Residential);
        assert_eq!(
            "independent house".parse::<PropertyType>().unwrap(),
            PropertyType::IndependentHouse
        );
        assert_eq!("Broker".parse::<Source>().unwrap(), Source::Broker);
        assert!("castle".parse::<PropertyType>().is_err());
    }

    #[test]
    fn deserializes_enquiry_with_missing_optionals() {
        let json = r#"{
            "id": "enq-1",
            "description": "Looking for a 2 BHK",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let enquiry: Enquiry = serde_json::from_str(json).unwrap();

        assert_eq!(enquiry.id, "enq-1");
        assert!(enquiry.category.is_none());
        assert_eq!(enquiry.budget, Budget::default());
        assert!(enquiry.preferred_locations.is_empty());
    }

    #[test]
    fn deserializes_property_from_camel_case() {
        let json = r#"{
            "id": "p-1",
            "title": "Sunny flat",
            "location": { "city": "Pune", "locality": "Baner" },
            "price": 7500000,
            "bhk": 2,
            "category": "RESIDENTIAL",
            "propertyType": "APARTMENT",
            "source": "BROKER",
            "featured": true,
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let property: Property = serde_json::from_str(json).unwrap();

        assert_eq!(property.location.locality.as_deref(), Some("Baner"));
        assert_eq!(property.property_type, PropertyType::Apartment);
        assert!(property.featured);
        assert!(property.images.is_empty());
    }
}

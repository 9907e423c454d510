//! Decoration Entity
//!
//! A bookable decoration service listing. Prices are major currency units.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime_optional;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(
        rename = "created_at",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono_datetime_as_bson_datetime_optional"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Decoration {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            description: String::new(),
            price,
            image: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Listing filter for `GET /decorations`
#[derive(Debug, Clone, Default)]
pub struct DecorationFilter {
    /// Exact category, case-insensitive
    pub category: Option<String>,
    /// Substring of the name, case-insensitive
    pub search: Option<String>,
}

impl DecorationFilter {
    pub fn matches(&self, decoration: &Decoration) -> bool {
        if let Some(category) = &self.category {
            if !decoration.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !decoration.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_is_stored_as_double() {
        let decoration = Decoration::new("Wedding Stage", "wedding", Decimal::new(4995, 1));
        let doc = bson::to_document(&decoration).unwrap();
        assert_eq!(doc.get_f64("price").unwrap(), 499.5);
        assert!(doc.get_datetime("created_at").is_ok());
    }

    #[test]
    fn test_integer_price_deserializes() {
        let doc = bson::doc! { "name": "Birthday Balloons", "category": "birthday", "price": 120 };
        let decoration: Decoration = bson::from_document(doc).unwrap();
        assert_eq!(decoration.price, Decimal::new(120, 0));
        assert_eq!(decoration.description, "");
    }

    #[test]
    fn test_filter_matching() {
        let decoration = Decoration::new("Rustic Wedding Arch", "Wedding", Decimal::new(300, 0));

        let by_category = DecorationFilter { category: Some("wedding".into()), search: None };
        assert!(by_category.matches(&decoration));

        let by_search = DecorationFilter { category: None, search: Some("ARCH".into()) };
        assert!(by_search.matches(&decoration));

        let miss = DecorationFilter { category: Some("birthday".into()), search: None };
        assert!(!miss.matches(&decoration));
    }
}

//! Status and category enums for hub entities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order lifecycle status.
///
/// Matches the hub API's `status` field on orders. Only `Pending` orders
/// can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order is still cancellable.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Listing category.
///
/// The server stores the short code and renders a human label separately
/// (`category_display`); [`Category::display_name`] mirrors that label for
/// local use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Textbook,
    Equipment,
    Decor,
    Appliance,
    #[default]
    Other,
}

impl Category {
    /// All known categories, in display order.
    pub const ALL: [Self; 5] = [
        Self::Textbook,
        Self::Equipment,
        Self::Decor,
        Self::Appliance,
        Self::Other,
    ];

    /// The short code used on the wire and in query filters.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Textbook => "textbook",
            Self::Equipment => "equipment",
            Self::Decor => "decor",
            Self::Appliance => "appliance",
            Self::Other => "other",
        }
    }

    /// Human-readable label, matching the server's `category_display`.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Textbook => "Textbook",
            Self::Equipment => "Lab Equipment",
            Self::Decor => "Room Decor",
            Self::Appliance => "Mini-Fridge/Appliance",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown category code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid category: {0}")]
pub struct ParseCategoryError(String);

impl std::str::FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "textbook" => Ok(Self::Textbook),
            "equipment" => Ok(Self::Equipment),
            "decor" => Ok(Self::Decor),
            "appliance" => Ok(Self::Appliance),
            "other" => Ok(Self::Other),
            _ => Err(ParseCategoryError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde() {
        let status: OrderStatus = serde_json::from_str("\"pending\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Pending);
        assert!(status.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
    }

    #[test]
    fn test_category_codes_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.code().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_category_serde_matches_code() {
        let json = serde_json::to_string(&Category::Appliance).expect("serialize");
        assert_eq!(json, "\"appliance\"");
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassengerCategory {
    #[serde(rename = "VIP")]
    Vip,
    Business,
    Leisure,
    #[serde(rename = "Frequent Flyer")]
    FrequentFlyer,
    Regular,
}

impl PassengerCategory {
    /// Unrecognised categories fall back to Regular.
    pub fn from_db(value: &str) -> Self {
        match value {
            "VIP" => PassengerCategory::Vip,
            "Business" => PassengerCategory::Business,
            "Leisure" => PassengerCategory::Leisure,
            "Frequent Flyer" => PassengerCategory::FrequentFlyer,
            _ => PassengerCategory::Regular,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PassengerRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: String,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: PassengerCategory,
    pub archived: bool,
}

impl From<PassengerRow> for Passenger {
    fn from(row: PassengerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email.filter(|e| !e.trim().is_empty()),
            phone: row.phone.filter(|p| !p.trim().is_empty()),
            category: PassengerCategory::from_db(&row.category),
            archived: row.archived,
        }
    }
}

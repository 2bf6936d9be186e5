use std::str::FromStr;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Menu a meal is listed under. The set is closed; the store enforces it with a CHECK constraint too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Category {
    #[display("breakfast")]
    Breakfast,
    #[display("lunch")]
    Lunch,
    #[display("dinner")]
    Dinner,
    #[display("additional")]
    Additional,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Additional => "additional",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "additional" => Ok(Self::Additional),
            _ => Err(format!(
                "Invalid meal type: {s}, expected one of breakfast, lunch, dinner, additional"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Meal {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub price: f64,
}

/// A validated meal ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewMeal {
    pub name: String,
    pub category: Category,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostMealRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostAdditionalMealRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostMealResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteMealResponse {
    pub deleted: u64,
}

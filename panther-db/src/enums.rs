use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(DbEnum, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    // Listed, can be purchased, tagged and saved
    Active,
    // The listing has been purchased. There is no way back.
    Sold,
}

impl Default for ListingStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl ListingStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

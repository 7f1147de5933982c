use crate::DbConn;
use panther_db::{
    error::PantherDbError,
    listings::*,
    saved::SavedListings,
    tags::Tags,
    users::{UserFinder, UserId, UserInfo},
};
use rocket::request::FromParam;
use serde::Serialize;
use std::convert::Infallible;

pub struct ListingGuard(String);

impl<'a> FromParam<'a> for ListingGuard {
    type Error = Infallible;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Ok(ListingGuard(param.to_string()))
    }
}

/// Public contact card of a seller
#[derive(Debug, Serialize)]
pub struct SellerCard {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&UserInfo> for SellerCard {
    fn from(info: &UserInfo) -> Self {
        Self {
            id: info.get_id().to_string(),
            name: info.get_name().to_string(),
            email: info.get_email().to_string(),
            phone: info.get_phone().to_string(),
        }
    }
}

/// Everything the detail view of a listing shows
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: ListingInfo,
    pub tags: Vec<String>,
    pub seller: SellerCard,
    // Both flags are false for anonymous viewers
    pub is_seller: bool,
    pub is_saved: bool,
}

impl ListingGuard {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }

    pub async fn to_id(&self, db: &DbConn) -> Result<ListingId, PantherDbError> {
        let listing_id_inner = self.0.clone();
        db.exec(move |c| ListingId::find(c, &listing_id_inner))
            .await
    }

    pub async fn to_detail(
        &self,
        db: &DbConn,
        viewer: Option<UserId>,
    ) -> Result<ListingDetail, PantherDbError> {
        let listing = self.to_id(db).await?;
        db.exec(move |c| {
            let info = listing.get_info(c)?;
            let seller = UserFinder::new(c, None)
                .id(info.get_seller_id())
                .first_info()?;
            let tags = Tags::of_listing(c, &listing)?
                .iter()
                .map(|t| t.get_name().to_string())
                .collect();
            let (is_seller, is_saved) = match viewer {
                Some(ref v) => (info.is_owned_by(v), SavedListings::is_saved(c, v, &listing)?),
                None => (false, false),
            };
            Ok(ListingDetail {
                seller: SellerCard::from(&seller),
                listing: info,
                tags,
                is_seller,
                is_saved,
            })
        })
        .await
    }
}

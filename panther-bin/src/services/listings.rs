use crate::{infras::guards::*, success, ApiResult, DbConn, Failure, IntoFailure};
use panther_db::{
    error::PantherDbError,
    listings::{IncompleteListing, ListingId},
    saved::SavedListings,
    tags::Tags,
    users::UserId,
};
use rocket::serde::json::Json;
use serde::Deserialize;

/// Prices arrive either as JSON numbers or as numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Number(f64),
    Text(String),
}

impl PriceField {
    pub fn parse(&self) -> Result<f64, PantherDbError> {
        match self {
            PriceField::Number(p) => Ok(*p),
            PriceField::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PantherDbError::InvalidField("price")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListing {
    student_id: String,
    title: String,
    description: String,
    price: PriceField,
    address: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    student_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRef {
    student_id: String,
    listing_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListing {
    student_id: String,
    listing_id: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[post("/", data = "<info>")]
pub async fn create_listing(info: Json<CreateListing>, conn: DbConn) -> ApiResult<String> {
    let info = info.into_inner();
    let price = info.price.parse().into_failure()?;
    let seller = UserGuard::new(&info.student_id)
        .to_id_param(&conn)
        .await
        .into_failure()?;

    let mut listing = IncompleteListing::new(info.title, info.description, price, info.address)
        .images(info.images);
    if let Some(category) = info.category {
        listing = listing.category(category);
    }
    let id = conn
        .exec(move |c| listing.create(c, &seller.id))
        .await
        .into_failure()?;
    log::info!("listing {} created", id.get_id());
    success(id.get_id().to_string(), "listing created")
}

#[delete("/<listing_id>", data = "<info>")]
pub async fn delete_listing(
    listing_id: ListingGuard,
    info: Json<StudentRef>,
    conn: DbConn,
) -> ApiResult<bool> {
    let seller = UserGuard::new(&info.student_id)
        .to_id_param(&conn)
        .await
        .into_failure()?;
    let listing = listing_id.to_id(&conn).await.into_failure()?;

    let id = listing.get_id().to_string();
    conn.exec(move |c| listing.delete_owned(c, &seller.id))
        .await
        .into_failure()?;
    log::info!("listing {} deleted", id);
    success(true, "listing deleted")
}

#[post("/tag", data = "<info>")]
pub async fn tag_listing(info: Json<TagListing>, conn: DbConn) -> ApiResult<bool> {
    let info = info.into_inner();
    let seller = UserGuard::new(&info.student_id)
        .to_id_param(&conn)
        .await
        .into_failure()?;
    let listing = ListingGuard::new(&info.listing_id)
        .to_id(&conn)
        .await
        .into_failure()?;

    let tags = info.tags;
    conn.exec(move |c| Tags::replace_for(c, &listing, &seller.id, tags.as_slice()))
        .await
        .into_failure()?;
    success(true, "tags updated")
}

// Saving an already saved listing unsaves it
#[post("/save", data = "<info>")]
pub async fn save(info: Json<ListingRef>, conn: DbConn) -> ApiResult<bool> {
    let (student, listing) = resolve(info.into_inner(), &conn).await?;
    let saved = conn
        .exec(move |c| SavedListings::toggle(c, &student, &listing))
        .await
        .into_failure()?;
    success(saved, if saved { "saved" } else { "unsaved" })
}

#[post("/unsave", data = "<info>")]
pub async fn unsave(info: Json<ListingRef>, conn: DbConn) -> ApiResult<bool> {
    let (student, listing) = resolve(info.into_inner(), &conn).await?;
    conn.exec(move |c| SavedListings::unsave(c, &student, &listing))
        .await
        .into_failure()?;
    success(true, "unsaved")
}

async fn resolve(info: ListingRef, conn: &DbConn) -> Result<(UserId, ListingId), Failure> {
    let student = UserGuard::new(&info.student_id)
        .to_id_param(conn)
        .await
        .into_failure()?;
    let listing = ListingGuard::new(&info.listing_id)
        .to_id(conn)
        .await
        .into_failure()?;
    Ok((student.id, listing))
}

use crate::{infras::guards::*, success, ApiResult, DbConn, IntoFailure};
use panther_db::{
    listings::{ListingInfo, Listings},
    saved::SavedListings,
    Order,
};

// The home feed only shows what can still be bought
#[get("/?<category>")]
pub async fn home(category: Option<String>, conn: DbConn) -> ApiResult<Vec<ListingInfo>> {
    let listings = conn
        .exec(move |c| Listings::list_active(c, category.as_deref()))
        .await
        .into_failure()?;
    success(listings, "")
}

#[get("/<listing_id>?<viewer>")]
pub async fn detail(
    listing_id: ListingGuard,
    viewer: Option<UserGuard>,
    conn: DbConn,
) -> ApiResult<ListingDetail> {
    // An unknown viewer sees the listing anonymously
    let viewer = match viewer {
        Some(v) => v.to_id_param(&conn).await.ok().map(|v| v.id),
        None => None,
    };
    let detail = listing_id.to_detail(&conn, viewer).await.into_failure()?;
    success(detail, "")
}

#[get("/saved/<student_id>")]
pub async fn saved(student_id: UserGuard, conn: DbConn) -> ApiResult<Vec<ListingInfo>> {
    let student = student_id.to_id_param(&conn).await.into_failure()?;
    let listings = conn
        .exec(move |c| SavedListings::list(c, &student.id))
        .await
        .into_failure()?;
    success(listings, "")
}

#[get("/sort/<direction>")]
pub async fn sort(direction: &str, conn: DbConn) -> ApiResult<Vec<ListingInfo>> {
    let order = Order::from_direction(direction);
    let listings = conn
        .exec(move |c| Listings::sort_by_price(c, order))
        .await
        .into_failure()?;
    success(listings, "")
}

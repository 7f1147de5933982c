use crate::{infras::guards::*, success, ApiResult, DbConn, IntoFailure};
use panther_db::{
    listings::{ListingFinder, ListingInfo},
    saved::SavedListings,
    Order,
};
use serde::Serialize;

/// Everything the "my listings" page shows about the current student
#[derive(Debug, Serialize)]
pub struct MyListings {
    selling: Vec<ListingInfo>,
    saved: Vec<ListingInfo>,
    bought: Vec<ListingInfo>,
}

#[get("/me/listings")]
pub async fn my_listings(user: UserIdGuard<Cookie>, conn: DbConn) -> ApiResult<MyListings> {
    let mine = conn
        .exec(move |c| {
            let uid = user.id;
            let selling = ListingFinder::new(c, None)
                .seller(uid.get_id())
                .order_by_time(Order::Desc)
                .search_info()?;
            let bought = ListingFinder::new(c, None)
                .buyer(uid.get_id())
                .order_by_time(Order::Desc)
                .search_info()?;
            Ok(MyListings {
                selling,
                saved: SavedListings::list(c, &uid)?,
                bought,
            })
        })
        .await
        .into_failure()?;
    success(mine, "")
}

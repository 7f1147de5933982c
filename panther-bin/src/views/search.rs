use crate::{success, ApiResult, DbConn, IntoFailure};
use panther_db::listings::{ListingInfo, Listings};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SearchResult {
    listings: Vec<ListingInfo>,
    count: usize,
}

impl From<Vec<ListingInfo>> for SearchResult {
    fn from(listings: Vec<ListingInfo>) -> Self {
        Self {
            count: listings.len(),
            listings,
        }
    }
}

#[get("/keyword/<keyword>")]
pub async fn keyword(keyword: String, conn: DbConn) -> ApiResult<SearchResult> {
    let listings = conn
        .exec(move |c| Listings::search_by_keyword(c, &keyword))
        .await
        .into_failure()?;
    let result = SearchResult::from(listings);
    let msg = format!("{} listing(s) found", result.count);
    success(result, msg)
}

#[get("/category/<category>")]
pub async fn category(category: String, conn: DbConn) -> ApiResult<SearchResult> {
    let listings = conn
        .exec(move |c| Listings::search_by_category(c, &category))
        .await
        .into_failure()?;
    let result = SearchResult::from(listings);
    let msg = format!("{} listing(s) found", result.count);
    success(result, msg)
}

use crate::{
    enums::ListingStatus,
    error::{PantherDbError, PantherDbResult as Result},
    saved::SavedListings,
    schema::listings,
    tags::TagMappingFinder,
    users::{Roles, UserFinder, UserId},
    Order,
};
use chrono::naive::NaiveDateTime;
use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 100;
const MAX_CATEGORY_LEN: usize = 50;

/// A pseudo struct used to manage table `listings`. Also the catalog entry points.
pub struct Listings;

impl Listings {
    /// Every listing regardless of status, optionally limited to one category, newest first.
    pub fn list_all(conn: &mut SqliteConnection, category: Option<&str>) -> Result<Vec<ListingInfo>> {
        let mut finder = ListingFinder::new(conn, None);
        if let Some(c) = category {
            finder = finder.category(c);
        }
        finder.order_by_time(Order::Desc).search_info()
    }

    // The home feed
    pub fn list_active(
        conn: &mut SqliteConnection,
        category: Option<&str>,
    ) -> Result<Vec<ListingInfo>> {
        let mut finder = ListingFinder::new(conn, None).status(ListingStatus::Active);
        if let Some(c) = category {
            finder = finder.category(c);
        }
        finder.order_by_time(Order::Desc).search_info()
    }

    // Case-insensitive substring match on title or description
    pub fn search_by_keyword(conn: &mut SqliteConnection, keyword: &str) -> Result<Vec<ListingInfo>> {
        ListingFinder::new(conn, None)
            .keyword(keyword)
            .order_by_time(Order::Desc)
            .search_info()
    }

    pub fn search_by_category(
        conn: &mut SqliteConnection,
        category: &str,
    ) -> Result<Vec<ListingInfo>> {
        ListingFinder::new(conn, None)
            .category(category)
            .order_by_time(Order::Desc)
            .search_info()
    }

    pub fn sort_by_price(conn: &mut SqliteConnection, order: Order) -> Result<Vec<ListingInfo>> {
        ListingFinder::new(conn, None)
            .order_by_price(order)
            .search_info()
    }
}

/// A listing that has not been checked or stored yet
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IncompleteListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: String,
    pub category: Option<String>,
    pub images: Vec<String>,
}

impl IncompleteListing {
    pub fn new<T: ToString>(title: T, description: T, price: f64, address: T) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            price,
            address: address.to_string(),
            category: None,
            images: Vec::new(),
        }
    }

    pub fn category(mut self, category: impl ToString) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn images<T: ToString>(mut self, images: impl IntoIterator<Item = T>) -> Self {
        self.images = images.into_iter().map(|x| x.to_string()).collect();
        self
    }

    fn verify(self, seller: &UserId) -> Result<ListingInfo> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(PantherDbError::InvalidField("title"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(PantherDbError::InvalidField("description"));
        }
        // NaN fails the comparison as well
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(PantherDbError::InvalidField("price"));
        }
        let address = self.address.trim();
        if address.chars().count() > MAX_ADDRESS_LEN {
            return Err(PantherDbError::InvalidField("address"));
        }
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if matches!(&category, Some(c) if c.chars().count() > MAX_CATEGORY_LEN) {
            return Err(PantherDbError::InvalidField("category"));
        }
        let images: Vec<String> = self
            .images
            .iter()
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect();

        Ok(ListingInfo {
            id: Uuid::new_v4().to_string(),
            seller_id: seller.get_id().to_string(),
            buyer_id: None,
            title: title.to_string(),
            description: description.to_string(),
            price: self.price,
            address: address.to_string(),
            category,
            images: serde_json::to_string(&images)?,
            listing_status: ListingStatus::Active,
            time_posted: chrono::offset::Utc::now().naive_utc(),
        })
    }

    pub fn create(self, conn: &mut SqliteConnection, seller: &UserId) -> Result<ListingId> {
        let listing = self.verify(seller)?;
        conn.immediate_transaction::<_, PantherDbError, _>(|c| {
            // Also checks that the seller exists
            let seller = UserFinder::new(c, None).id(seller.get_id()).first()?;
            // Students registered before roles existed get them now
            Roles::provision(c, &seller)?;
            diesel::insert_into(listings::table)
                .values(&listing)
                .execute(c)?;
            Ok(())
        })?;
        Ok(listing.to_id())
    }
}

// The ID referencing a single listing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ListingId {
    id: String,
}

impl ListingId {
    pub fn find(conn: &mut SqliteConnection, id_provided: &str) -> Result<Self> {
        ListingFinder::new(conn, None).id(id_provided).first()
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_info(&self, conn: &mut SqliteConnection) -> Result<ListingInfo> {
        ListingFinder::new(conn, None).id(&self.id).first_info()
    }

    /// Delete the listing together with its tag mappings and the favorites pointing at it.
    pub fn delete_owned(&self, conn: &mut SqliteConnection, seller: &UserId) -> Result<()> {
        conn.immediate_transaction::<_, PantherDbError, _>(|c| {
            let info = self.get_info(c)?;
            if info.get_seller_id() != seller.get_id() {
                return Err(PantherDbError::NotOwner);
            }
            TagMappingFinder::new(c, None).delete_by_listing(self)?;
            SavedListings::delete_by_listing(c, self)?;
            diesel::delete(listings::table.filter(listings::id.eq(&self.id))).execute(c)?;
            Ok(())
        })
    }
}

type BoxedQuery<'a> = listings::BoxedQuery<'a, Sqlite>;

/// A search query helper (builder)
pub struct ListingFinder<'a> {
    conn: &'a mut SqliteConnection,
    query: BoxedQuery<'a>,
}

impl<'a> ListingFinder<'a> {
    pub fn list(conn: &'a mut SqliteConnection) -> Result<Vec<ListingId>> {
        Self::new(conn, None).search()
    }

    pub fn list_info(conn: &'a mut SqliteConnection) -> Result<Vec<ListingInfo>> {
        Self::new(conn, None).search_info()
    }

    pub fn new(conn: &'a mut SqliteConnection, query: Option<BoxedQuery<'a>>) -> Self {
        use crate::schema::listings::dsl::*;
        if let Some(q) = query {
            Self { conn, query: q }
        } else {
            Self {
                conn,
                query: listings.into_boxed(),
            }
        }
    }

    pub fn search(self) -> Result<Vec<ListingId>> {
        use crate::schema::listings::dsl::*;
        Ok(self
            .query
            .select(id)
            .load::<String>(self.conn)?
            .into_iter()
            .map(|x| ListingId { id: x })
            .collect())
    }

    pub fn search_info(self) -> Result<Vec<ListingInfo>> {
        Ok(self.query.load::<ListingInfo>(self.conn)?)
    }

    pub fn first(self) -> Result<ListingId> {
        use crate::schema::listings::dsl::*;
        self.query
            .select(id)
            .first::<String>(self.conn)
            .optional()?
            .map(|x| ListingId { id: x })
            .ok_or(PantherDbError::ListingNotFound)
    }

    pub fn first_info(self) -> Result<ListingInfo> {
        self.query
            .first::<ListingInfo>(self.conn)
            .optional()?
            .ok_or(PantherDbError::ListingNotFound)
    }

    pub fn count(self) -> Result<i64> {
        Ok(self.query.count().get_result(self.conn)?)
    }

    pub fn id(mut self, id_provided: &'a str) -> Self {
        use crate::schema::listings::dsl::*;
        self.query = self.query.filter(id.eq(id_provided));
        self
    }

    pub fn seller(mut self, seller: &'a str) -> Self {
        use crate::schema::listings::dsl::*;
        self.query = self.query.filter(seller_id.eq(seller));
        self
    }

    pub fn buyer(mut self, buyer: &'a str) -> Self {
        use crate::schema::listings::dsl::*;
        self.query = self.query.filter(buyer_id.eq(buyer));
        self
    }

    pub fn category(mut self, category_provided: &'a str) -> Self {
        use crate::schema::listings::dsl::*;
        self.query = self.query.filter(category.eq(category_provided));
        self
    }

    pub fn status(mut self, status: ListingStatus) -> Self {
        use crate::schema::listings::dsl::*;
        self.query = self.query.filter(listing_status.eq(status));
        self
    }

    // SQLite LIKE is case-insensitive for ASCII
    pub fn keyword(mut self, keyword: &str) -> Self {
        use crate::schema::listings::dsl::*;
        let pattern = format!("%{}%", escape_like(keyword));
        self.query = self.query.filter(
            title
                .like(pattern.clone())
                .escape('\\')
                .or(description.like(pattern).escape('\\')),
        );
        self
    }

    pub fn order_by_price(mut self, order: Order) -> Self {
        use crate::schema::listings::dsl::*;
        match order {
            Order::Asc => self.query = self.query.order(price.asc()),
            Order::Desc => self.query = self.query.order(price.desc()),
        }
        self
    }

    pub fn order_by_time(mut self, order: Order) -> Self {
        use crate::schema::listings::dsl::*;
        match order {
            Order::Asc => self.query = self.query.order(time_posted.asc()),
            Order::Desc => self.query = self.query.order(time_posted.desc()),
        }
        self
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// Images are kept as a JSON array in a text column
fn serialize_images<S: Serializer>(images: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let list: Vec<String> = serde_json::from_str(images).map_err(serde::ser::Error::custom)?;
    list.serialize(serializer)
}

/// A single listing, corresponding to a row in the table `listings`
#[derive(Debug, Serialize, Queryable, Identifiable, Insertable, AsChangeset, Clone)]
#[diesel(table_name = listings, treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct ListingInfo {
    id: String,
    seller_id: String,
    buyer_id: Option<String>,
    title: String,
    description: String,
    price: f64,
    address: String,
    category: Option<String>,
    #[serde(serialize_with = "serialize_images")]
    images: String,
    #[serde(rename = "status")]
    listing_status: ListingStatus,
    time_posted: NaiveDateTime,
}

impl ListingInfo {
    pub fn to_id(&self) -> ListingId {
        ListingId {
            id: self.id.clone(),
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_seller_id(&self) -> &str {
        &self.seller_id
    }

    pub fn get_buyer_id(&self) -> Option<&str> {
        self.buyer_id.as_deref()
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_price(&self) -> f64 {
        self.price
    }

    pub fn get_address(&self) -> &str {
        &self.address
    }

    pub fn get_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn get_images(&self) -> Result<Vec<String>> {
        Ok(serde_json::from_str(&self.images)?)
    }

    pub fn get_listing_status(&self) -> ListingStatus {
        self.listing_status
    }

    pub fn get_time_posted(&self) -> &NaiveDateTime {
        &self.time_posted
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.seller_id == user.get_id()
    }
}

#[cfg(test)]
mod tests;

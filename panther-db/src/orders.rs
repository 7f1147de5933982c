use crate::{
    enums::ListingStatus,
    error::{PantherDbError, PantherDbResult as Result},
    listings::ListingId,
    messages::Messages,
    saved::SavedListings,
    schema::{listings, orders},
    users::{UserFinder, UserId},
    Order,
};
use chrono::naive::NaiveDateTime;
use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// A psuedo struct for managing orders. Orders are append-only.
pub struct Orders;

impl Orders {
    /// Buy an active listing.
    ///
    /// Within one immediate transaction this records the order with a snapshot of the price,
    /// marks the listing sold, drops every favorite of it, and notifies the seller through the inbox.
    /// Concurrent buyers are serialized by SQLite and only the first one finds the listing active.
    pub fn purchase(
        conn: &mut SqliteConnection,
        listing_p: &ListingId,
        buyer_p: &UserId,
        payment: Option<&str>,
    ) -> Result<OrderId> {
        conn.immediate_transaction::<_, PantherDbError, _>(|c| {
            let buyer_info = UserFinder::new(c, None).id(buyer_p.get_id()).first_info()?;
            let listing_info = listing_p.get_info(c)?;
            if listing_info.is_owned_by(buyer_p) {
                return Err(PantherDbError::SelfPurchase);
            }
            if !listing_info.get_listing_status().is_active() {
                return Err(PantherDbError::ListingNotActive);
            }

            // The status check is repeated by the update itself
            let updated = diesel::update(
                listings::table
                    .filter(listings::id.eq(listing_p.get_id()))
                    .filter(listings::listing_status.eq(ListingStatus::Active)),
            )
            .set((
                listings::listing_status.eq(ListingStatus::Sold),
                listings::buyer_id.eq(Some(buyer_p.get_id())),
            ))
            .execute(c)?;
            if updated != 1 {
                return Err(PantherDbError::ListingNotActive);
            }

            let order = OrderInfo {
                id: Uuid::new_v4().to_string(),
                buyer: buyer_p.get_id().to_string(),
                seller: listing_info.get_seller_id().to_string(),
                listing: listing_p.get_id().to_string(),
                title: listing_info.get_title().to_string(),
                price: listing_info.get_price(),
                payment_method: payment
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(ToString::to_string)
                    .or_else(|| buyer_info.get_payment_method().map(ToString::to_string)),
                time_placed: chrono::offset::Utc::now().naive_utc(),
            };
            diesel::insert_into(orders::table)
                .values(&order)
                .execute(c)?;

            SavedListings::delete_by_listing(c, listing_p)?;

            Messages::send(
                c,
                buyer_p.get_id(),
                listing_info.get_seller_id(),
                &format!(
                    "{} bought your product {}",
                    buyer_info.get_name(),
                    listing_info.get_title()
                ),
            )?;

            Ok(order.to_id())
        })
    }

    /// Orders in which the student is either the buyer or the seller, newest first
    pub fn of_student(conn: &mut SqliteConnection, student: &UserId) -> Result<Vec<OrderInfo>> {
        OrderFinder::new(conn, None)
            .participant(student.get_id())
            .order_by_time(Order::Desc)
            .search_info()
    }
}

// The ID referencing a single order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderId {
    id: String,
}

impl OrderId {
    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_info(&self, conn: &mut SqliteConnection) -> Result<OrderInfo> {
        OrderFinder::new(conn, None).id(&self.id).first_info()
    }
}

/// A single order, corresponding to a row in the table `orders`
#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Insertable, Clone)]
#[diesel(table_name = orders)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    id: String,
    buyer: String,
    seller: String,
    listing: String,
    title: String,
    price: f64,
    payment_method: Option<String>,
    time_placed: NaiveDateTime,
}

impl OrderInfo {
    pub fn to_id(&self) -> OrderId {
        OrderId {
            id: self.id.clone(),
        }
    }

    /// Get a reference to the order info's id.
    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Get a reference to the order info's buyer.
    pub fn get_buyer(&self) -> &str {
        &self.buyer
    }

    /// Get a reference to the order info's seller.
    pub fn get_seller(&self) -> &str {
        &self.seller
    }

    /// Get a reference to the order info's listing.
    pub fn get_listing(&self) -> &str {
        &self.listing
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }

    /// Price at the time of purchase.
    pub fn get_price(&self) -> f64 {
        self.price
    }

    pub fn get_payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    /// Get a reference to the order info's time placed.
    pub fn get_time_placed(&self) -> &NaiveDateTime {
        &self.time_placed
    }
}

type BoxedQuery<'a> = orders::BoxedQuery<'a, Sqlite>;

/// A search query helper (builder)
pub struct OrderFinder<'a> {
    conn: &'a mut SqliteConnection,
    query: BoxedQuery<'a>,
}

impl<'a> OrderFinder<'a> {
    pub fn list_info(conn: &'a mut SqliteConnection) -> Result<Vec<OrderInfo>> {
        Self::new(conn, None).search_info()
    }

    pub fn new(conn: &'a mut SqliteConnection, query: Option<BoxedQuery<'a>>) -> Self {
        use crate::schema::orders::dsl::*;
        if let Some(q) = query {
            Self { conn, query: q }
        } else {
            Self {
                conn,
                query: orders.into_boxed(),
            }
        }
    }

    pub fn search_info(self) -> Result<Vec<OrderInfo>> {
        Ok(self.query.load::<OrderInfo>(self.conn)?)
    }

    pub fn first_info(self) -> Result<OrderInfo> {
        Ok(self.query.first::<OrderInfo>(self.conn)?)
    }

    pub fn count(self) -> Result<i64> {
        Ok(self.query.count().get_result(self.conn)?)
    }

    pub fn id(mut self, id_provided: &'a str) -> Self {
        use crate::schema::orders::dsl::*;
        self.query = self.query.filter(id.eq(id_provided));
        self
    }

    pub fn seller(mut self, seller_id: &'a str) -> Self {
        use crate::schema::orders::dsl::*;
        self.query = self.query.filter(seller.eq(seller_id));
        self
    }

    pub fn buyer(mut self, buyer_id: &'a str) -> Self {
        use crate::schema::orders::dsl::*;
        self.query = self.query.filter(buyer.eq(buyer_id));
        self
    }

    pub fn participant(mut self, student_id: &'a str) -> Self {
        use crate::schema::orders::dsl::*;
        self.query = self
            .query
            .filter(buyer.eq(student_id).or(seller.eq(student_id)));
        self
    }

    pub fn listing(mut self, listing_id: &'a str) -> Self {
        use crate::schema::orders::dsl::*;
        self.query = self.query.filter(listing.eq(listing_id));
        self
    }

    pub fn order_by_time(mut self, order: Order) -> Self {
        use crate::schema::orders::dsl::*;
        match order {
            Order::Asc => self.query = self.query.order(time_placed.asc()),
            Order::Desc => self.query = self.query.order(time_placed.desc()),
        }
        self
    }
}

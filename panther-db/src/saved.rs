use crate::{
    enums::ListingStatus,
    error::{PantherDbError, PantherDbResult as Result},
    listings::{ListingId, ListingInfo},
    schema::{listings, saved_listings},
    users::{UserFinder, UserId},
};
use diesel::prelude::*;

// A pseudo struct for managing favorites, i.e. the table `saved_listings`
pub struct SavedListings;

impl SavedListings {
    /// Save the listing, or unsave it if it has been saved already.
    /// Returns whether the listing is saved afterwards.
    pub fn toggle(conn: &mut SqliteConnection, student: &UserId, listing: &ListingId) -> Result<bool> {
        conn.immediate_transaction::<_, PantherDbError, _>(|c| {
            let student = UserFinder::new(c, None).id(student.get_id()).first()?;
            let info = listing.get_info(c)?;
            if info.is_owned_by(&student) {
                return Err(PantherDbError::SelfFavorite);
            }

            if Self::is_saved(c, &student, listing)? {
                Self::unsave(c, &student, listing)?;
                Ok(false)
            } else {
                if !info.get_listing_status().is_active() {
                    return Err(PantherDbError::ListingNotActive);
                }
                diesel::insert_into(saved_listings::table)
                    .values((
                        saved_listings::student_id.eq(student.get_id()),
                        saved_listings::listing_id.eq(listing.get_id()),
                    ))
                    .execute(c)?;
                Ok(true)
            }
        })
    }

    // Removing something that was never saved is fine
    pub fn unsave(conn: &mut SqliteConnection, student: &UserId, listing: &ListingId) -> Result<()> {
        use crate::schema::saved_listings::dsl::*;
        diesel::delete(
            saved_listings.filter(
                student_id
                    .eq(student.get_id())
                    .and(listing_id.eq(listing.get_id())),
            ),
        )
        .execute(conn)?;
        Ok(())
    }

    pub fn is_saved(conn: &mut SqliteConnection, student: &UserId, listing: &ListingId) -> Result<bool> {
        use crate::schema::saved_listings::dsl::*;
        Ok(saved_listings
            .filter(
                student_id
                    .eq(student.get_id())
                    .and(listing_id.eq(listing.get_id())),
            )
            .count()
            .get_result::<i64>(conn)?
            > 0)
    }

    /// Saved listings that are still active, newest first.
    /// Rows pointing at sold listings may linger until the purchase cleans them up, they are hidden here.
    pub fn list(conn: &mut SqliteConnection, student: &UserId) -> Result<Vec<ListingInfo>> {
        Ok(saved_listings::table
            .inner_join(listings::table)
            .filter(saved_listings::student_id.eq(student.get_id()))
            .filter(listings::listing_status.eq(ListingStatus::Active))
            .order(listings::time_posted.desc())
            .select(listings::all_columns)
            .load::<ListingInfo>(conn)?)
    }

    pub fn count_for_listing(conn: &mut SqliteConnection, listing: &ListingId) -> Result<i64> {
        use crate::schema::saved_listings::dsl::*;
        Ok(saved_listings
            .filter(listing_id.eq(listing.get_id()))
            .count()
            .get_result(conn)?)
    }

    pub fn delete_by_listing(conn: &mut SqliteConnection, listing: &ListingId) -> Result<usize> {
        use crate::schema::saved_listings::dsl::*;
        Ok(diesel::delete(saved_listings.filter(listing_id.eq(listing.get_id()))).execute(conn)?)
    }
}

#[cfg(test)]
mod tests;

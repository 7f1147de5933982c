use crate::{
    error::{PantherDbError, PantherDbResult as Result},
    listings::ListingId,
    schema::{tagmappings, tags},
    users::UserId,
};
use diesel::{dsl::count, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_TAG_LEN: usize = 50;

// A pseudo struct for managing the tags table.
pub struct Tags;

impl Tags {
    pub fn list_all(conn: &mut SqliteConnection) -> Result<Vec<Tag>> {
        use crate::schema::tags::dsl::*;
        Ok(tags.order(name.asc()).load::<Tag>(conn)?)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id_provided: &str) -> Result<Tag> {
        use crate::schema::tags::dsl::*;
        Ok(tags.filter(id.eq(id_provided)).first::<Tag>(conn)?)
    }

    /// Tag names are unique, so at most one tag matches.
    pub fn find_by_name(conn: &mut SqliteConnection, name_provided: &str) -> Result<Option<Tag>> {
        use crate::schema::tags::dsl::*;
        Ok(tags
            .filter(name.eq(name_provided))
            .first::<Tag>(conn)
            .optional()?)
    }

    // Tags are shared between listings, reuse the existing one whenever possible.
    pub fn find_or_create(conn: &mut SqliteConnection, name_provided: &str) -> Result<Tag> {
        match Self::find_by_name(conn, name_provided)? {
            Some(tag) => Ok(tag),
            None => Tag::create(conn, name_provided),
        }
    }

    /// Tags attached to the listing, ordered by name
    pub fn of_listing(conn: &mut SqliteConnection, listing: &ListingId) -> Result<Vec<Tag>> {
        TagMappingFinder::new(conn, None).listing(listing).search_tag()
    }

    /// Replace the whole tag set of a listing owned by `seller`. An empty list clears it.
    pub fn replace_for<T: AsRef<str>>(
        conn: &mut SqliteConnection,
        listing: &ListingId,
        seller: &UserId,
        names: &[T],
    ) -> Result<Vec<Tag>> {
        let names = normalize(names)?;
        conn.immediate_transaction::<_, PantherDbError, _>(|c| {
            let info = listing.get_info(c)?;
            if !info.is_owned_by(seller) {
                return Err(PantherDbError::NotOwner);
            }
            if !info.get_listing_status().is_active() {
                return Err(PantherDbError::ListingNotActive);
            }

            TagMappingFinder::new(c, None).delete_by_listing(listing)?;
            names
                .iter()
                .map(|n| -> Result<Tag> {
                    let tag = Tags::find_or_create(c, n)?;
                    TagMapping::create(c, &tag, listing)?;
                    Ok(tag)
                })
                .collect()
        })
    }
}

// Trim, drop blanks and duplicates while keeping the caller's order
fn normalize<T: AsRef<str>>(names: &[T]) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.as_ref().trim()) {
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_TAG_LEN {
            return Err(PantherDbError::InvalidField("tags"));
        }
        if !normalized.iter().any(|n| n == name) {
            normalized.push(name.to_string());
        }
    }
    Ok(normalized)
}

#[derive(
    Debug, Serialize, Deserialize, Queryable, Identifiable, Insertable, AsChangeset, Clone, PartialEq, Eq,
)]
#[diesel(table_name = tags)]
pub struct Tag {
    id: String,
    name: String,
}

impl Tag {
    pub fn create(conn: &mut SqliteConnection, name_provided: impl ToString) -> Result<Self> {
        use crate::schema::tags::dsl::*;
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: name_provided.to_string(),
        };
        diesel::insert_into(tags).values(&tag).execute(conn)?;
        Ok(tag)
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

type BoxedQuery<'a> = tagmappings::BoxedQuery<'a, Sqlite>;

/// A search query helper (builder)
pub struct TagMappingFinder<'a> {
    conn: &'a mut SqliteConnection,
    query: BoxedQuery<'a>,
}

impl<'a> TagMappingFinder<'a> {
    pub fn list(conn: &'a mut SqliteConnection) -> Result<Vec<TagMapping>> {
        Self::new(conn, None).search()
    }

    pub fn search(self) -> Result<Vec<TagMapping>> {
        Ok(self.query.load::<TagMapping>(self.conn)?)
    }

    pub fn search_tag(self) -> Result<Vec<Tag>> {
        let conn = self.conn;
        let tag_ids = self
            .query
            .select(tagmappings::tag)
            .load::<String>(&mut *conn)?;
        Ok(tags::table
            .filter(tags::id.eq_any(tag_ids))
            .order(tags::name.asc())
            .load::<Tag>(conn)?)
    }

    pub fn first(self) -> Result<TagMapping> {
        Ok(self.query.first::<TagMapping>(self.conn)?)
    }

    pub fn delete_by_listing(self, listing_id: &ListingId) -> Result<usize> {
        use crate::schema::tagmappings::dsl::*;
        Ok(diesel::delete(tagmappings.filter(listing.eq(listing_id.get_id()))).execute(self.conn)?)
    }

    pub fn id(mut self, id_provided: &'a str) -> Self {
        use crate::schema::tagmappings::dsl::*;
        self.query = self.query.filter(id.eq(id_provided));
        self
    }

    pub fn listing(mut self, listing_id: &'a ListingId) -> Self {
        use crate::schema::tagmappings::dsl::*;
        self.query = self.query.filter(listing.eq(listing_id.get_id()));
        self
    }

    pub fn tag(mut self, tag_id: &'a Tag) -> Self {
        use crate::schema::tagmappings::dsl::*;
        self.query = self.query.filter(tag.eq(tag_id.get_id()));
        self
    }

    pub fn count(self) -> Result<i64> {
        use crate::schema::tagmappings::dsl::*;
        Ok(self.query.select(count(id)).first::<i64>(self.conn)?)
    }

    pub fn has_mapping(
        conn: &'a mut SqliteConnection,
        tag: &'a Tag,
        listing: &'a ListingId,
    ) -> Result<bool> {
        Ok(Self::new(conn, None).tag(tag).listing(listing).count()? > 0)
    }

    pub fn new(conn: &'a mut SqliteConnection, query: Option<BoxedQuery<'a>>) -> Self {
        use crate::schema::tagmappings::dsl::*;
        if let Some(q) = query {
            Self { conn, query: q }
        } else {
            Self {
                conn,
                query: tagmappings.into_boxed(),
            }
        }
    }
}

#[derive(
    Debug, Serialize, Deserialize, Queryable, Identifiable, Insertable, AsChangeset, Clone,
)]
#[diesel(table_name = tagmappings)]
pub struct TagMapping {
    id: String,
    tag: String,
    listing: String,
}

impl TagMapping {
    pub fn create(conn: &mut SqliteConnection, tag_p: &Tag, listing_p: &ListingId) -> Result<Self> {
        // Only create tag mapping if we have not done so.
        if !TagMappingFinder::has_mapping(conn, tag_p, listing_p)? {
            use crate::schema::tagmappings::dsl::*;
            let tagmapping = Self {
                id: Uuid::new_v4().to_string(),
                tag: tag_p.get_id().to_string(),
                listing: listing_p.get_id().to_string(),
            };
            diesel::insert_into(tagmappings)
                .values(&tagmapping)
                .execute(conn)?;
            Ok(tagmapping)
        } else {
            Err(PantherDbError::TagMappingExisted)
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_tag(&self) -> &str {
        &self.tag
    }

    pub fn get_listing(&self) -> &str {
        &self.listing
    }

    pub fn delete(self, conn: &mut SqliteConnection) -> Result<usize> {
        use crate::schema::tagmappings::dsl::*;
        Ok(diesel::delete(tagmappings.filter(id.eq(self.id))).execute(conn)?)
    }
}

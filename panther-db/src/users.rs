use crate::{
    error::{PantherDbError, PantherDbResult as Result},
    messages::Inboxes,
    schema::{buyers, sellers, students},
};
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    sqlite::Sqlite,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Hashing with the default cost makes the test suite crawl
#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

const MAX_NAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 20;

/// Institutional email domains accepted at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDomains {
    domains: Vec<String>,
}

impl Default for EmailDomains {
    fn default() -> Self {
        Self::new(["pitt.edu"])
    }
}

impl EmailDomains {
    pub fn new<T: ToString>(domains: impl IntoIterator<Item = T>) -> Self {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.to_string().trim_start_matches('@').to_lowercase())
                .collect(),
        }
    }

    /// Whether the (already normalized) email is syntactically sane and belongs to one of the domains.
    /// Subdomains of an accepted domain are accepted as well.
    pub fn accepts(&self, email: &str) -> bool {
        if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
            return false;
        }
        let (local, domain) = match email.split_once('@') {
            Some((l, d)) if !l.is_empty() && !d.is_empty() && !d.contains('@') => (l, d),
            _ => return false,
        };
        if local.starts_with('.') || local.ends_with('.') {
            return false;
        }
        self.domains
            .iter()
            .any(|d| domain == d || domain.ends_with(&format!(".{}", d)))
    }
}

/// A pseudo struct used to manage the table `students` and the role tables
pub struct Users;

impl Users {
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<UserInfo>> {
        UserFinder::list_info(conn)
    }
}

/// Buyer and seller capabilities. Every student gets both at registration.
pub struct Roles;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    pub buyer: bool,
    pub seller: bool,
}

impl Roles {
    // Idempotent, safe to call on every login
    pub fn provision(conn: &mut SqliteConnection, user: &UserId) -> Result<()> {
        diesel::insert_or_ignore_into(buyers::table)
            .values(buyers::id.eq(user.get_id()))
            .execute(conn)?;
        diesel::insert_or_ignore_into(sellers::table)
            .values(sellers::id.eq(user.get_id()))
            .execute(conn)?;
        Ok(())
    }

    pub fn of(conn: &mut SqliteConnection, user: &UserId) -> Result<RoleSet> {
        let buyer = buyers::table
            .filter(buyers::id.eq(user.get_id()))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        let seller = sellers::table
            .filter(sellers::id.eq(user.get_id()))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        Ok(RoleSet { buyer, seller })
    }
}

/// Registration payload. Nothing is checked until `create`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserForm {
    name: String,
    email: String,
    phone: String,
    password: String,
    payment_method: Option<String>,
    payment_info: Option<String>,
}

impl UserForm {
    pub fn new<T: ToString>(name: T, email: T, phone: T, password: T) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: password.to_string(),
            payment_method: None,
            payment_info: None,
        }
    }

    pub fn payment(mut self, method: Option<String>, info: Option<String>) -> Self {
        self.payment_method = method.filter(|m| !m.trim().is_empty());
        self.payment_info = info.filter(|i| !i.trim().is_empty());
        self
    }

    fn verify(self, domains: &EmailDomains) -> Result<UserInfo> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(PantherDbError::InvalidField("name"));
        }
        let email = self.email.trim().to_lowercase();
        if !domains.accepts(&email) {
            return Err(PantherDbError::InvalidEmail);
        }
        let phone = self.phone.trim();
        if phone.is_empty() || phone.chars().count() > MAX_PHONE_LEN {
            return Err(PantherDbError::InvalidField("phone"));
        }
        if self.password.is_empty() {
            return Err(PantherDbError::InvalidField("password"));
        }

        Ok(UserInfo {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            phone: phone.to_string(),
            hashed_passwd: bcrypt::hash(&self.password, HASH_COST)?,
            payment_method: self.payment_method,
            payment_info: self.payment_info,
        })
    }

    /// Register the student together with the buyer role, seller role and inbox.
    pub fn create(self, conn: &mut SqliteConnection, domains: &EmailDomains) -> Result<UserId> {
        let user = self.verify(domains)?;
        let user_id = UserId {
            id: user.id.clone(),
        };

        // Taking the write lock up front keeps concurrent registrations from deadlocking
        conn.immediate_transaction::<_, PantherDbError, _>(|c| {
            use crate::schema::students::dsl::*;
            if students
                .filter(email.eq(&user.email))
                .count()
                .get_result::<i64>(c)?
                > 0
            {
                return Err(PantherDbError::EmailRegistered);
            }
            diesel::insert_into(students)
                .values(&user)
                .execute(c)
                .map_err(|e| match e {
                    // Another registration won the race
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PantherDbError::EmailRegistered
                    }
                    e => e.into(),
                })?;
            Roles::provision(c, &user_id)?;
            Inboxes::ensure(c, &user_id)?;
            Ok(())
        })?;
        Ok(user_id)
    }
}

/// The ID referencing a single student
#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq, Eq)]
#[diesel(table_name = students)]
pub struct UserId {
    id: String,
}

impl UserId {
    pub fn find(conn: &mut SqliteConnection, id_provided: &str) -> Result<Self> {
        UserFinder::new(conn, None).id(id_provided).first()
    }

    pub fn find_by_email(conn: &mut SqliteConnection, email_provided: &str) -> Result<Self> {
        let normalized = email_provided.trim().to_lowercase();
        UserFinder::new(conn, None).email(&normalized).first()
    }

    /// Check the credentials. Missing roles or inbox are backfilled on success.
    pub fn login(
        conn: &mut SqliteConnection,
        email_provided: &str,
        passwd_provided: &str,
    ) -> Result<Self> {
        let info = match UserId::find_by_email(conn, email_provided) {
            Ok(id) => id.get_info(conn)?,
            Err(PantherDbError::StudentNotFound) => return Err(PantherDbError::InvalidCredentials),
            Err(e) => return Err(e),
        };
        if !info.verify_passwd(passwd_provided)? {
            return Err(PantherDbError::InvalidCredentials);
        }

        let user = info.to_id();
        conn.transaction::<_, PantherDbError, _>(|c| {
            Roles::provision(c, &user)?;
            Inboxes::ensure(c, &user)?;
            Ok(())
        })?;
        Ok(user)
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_info(&self, conn: &mut SqliteConnection) -> Result<UserInfo> {
        UserFinder::new(conn, None).id(&self.id).first_info()
    }
}

type BoxedQuery<'a> = students::BoxedQuery<'a, Sqlite>;

/// A search query helper (builder)
pub struct UserFinder<'a> {
    conn: &'a mut SqliteConnection,
    query: BoxedQuery<'a>,
}

impl<'a> UserFinder<'a> {
    pub fn list(conn: &'a mut SqliteConnection) -> Result<Vec<UserId>> {
        Self::new(conn, None).search()
    }

    pub fn list_info(conn: &'a mut SqliteConnection) -> Result<Vec<UserInfo>> {
        Self::new(conn, None).search_info()
    }

    pub fn new(conn: &'a mut SqliteConnection, query: Option<BoxedQuery<'a>>) -> Self {
        use crate::schema::students::dsl::*;
        if let Some(q) = query {
            Self { conn, query: q }
        } else {
            Self {
                conn,
                query: students.into_boxed(),
            }
        }
    }

    pub fn search(self) -> Result<Vec<UserId>> {
        use crate::schema::students::dsl::*;
        Ok(self
            .query
            .select(id)
            .load::<String>(self.conn)?
            .into_iter()
            .map(|x| UserId { id: x })
            .collect())
    }

    pub fn search_info(self) -> Result<Vec<UserInfo>> {
        Ok(self.query.load::<UserInfo>(self.conn)?)
    }

    pub fn first(self) -> Result<UserId> {
        use crate::schema::students::dsl::*;
        self.query
            .select(id)
            .first::<String>(self.conn)
            .optional()?
            .map(|x| UserId { id: x })
            .ok_or(PantherDbError::StudentNotFound)
    }

    pub fn first_info(self) -> Result<UserInfo> {
        self.query
            .first::<UserInfo>(self.conn)
            .optional()?
            .ok_or(PantherDbError::StudentNotFound)
    }

    pub fn id(mut self, id_provided: &'a str) -> Self {
        use crate::schema::students::dsl::*;
        self.query = self.query.filter(id.eq(id_provided));
        self
    }

    pub fn email(mut self, email_provided: &'a str) -> Self {
        use crate::schema::students::dsl::*;
        self.query = self.query.filter(email.eq(email_provided));
        self
    }
}

/// A single student, corresponding to a row in the table `students`
#[derive(
    Debug, Serialize, Deserialize, Queryable, Identifiable, Insertable, AsChangeset, Clone,
)]
#[diesel(table_name = students)]
pub struct UserInfo {
    id: String,
    name: String,
    email: String,
    phone: String,
    #[serde(skip_serializing)]
    hashed_passwd: String,
    payment_method: Option<String>,
    payment_info: Option<String>,
}

impl UserInfo {
    pub fn to_id(&self) -> UserId {
        UserId {
            id: self.id.clone(),
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_email(&self) -> &str {
        &self.email
    }

    pub fn get_phone(&self) -> &str {
        &self.phone
    }

    pub fn get_payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn get_payment_info(&self) -> Option<&str> {
        self.payment_info.as_deref()
    }

    pub fn verify_passwd(&self, passwd: impl AsRef<[u8]>) -> Result<bool> {
        Ok(bcrypt::verify(passwd, &self.hashed_passwd)?)
    }
}

use bcrypt::BcryptError;
use thiserror::Error;

pub type PantherDbResult<T> = Result<T, PantherDbError>;

/// Coarse classification of failures, used by the web layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input
    Validation,
    /// A referenced id does not exist
    NotFound,
    /// The caller does not own the entity it tried to mutate
    NotOwner,
    /// Uniqueness violation
    Conflict,
    /// Well-formed request refused by a marketplace rule
    BusinessRule,
    /// Storage or hashing fault
    Internal,
}

#[derive(Error, Debug)]
pub enum PantherDbError {
    #[error("errored on hashing using bcrypt: {0}")]
    HashError(#[from] BcryptError),

    #[error("database query failed with: {0}")]
    QueryError(diesel::result::Error),

    #[error("the requested record doesn't exist")]
    RecordNotFound,

    #[error("failed to (de)serialize stored json: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to run migrations: {0}")]
    MigrationError(String),

    #[error("email must be a valid institutional address")]
    InvalidEmail,

    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("email has already been registered")]
    EmailRegistered,

    #[error("email or password was incorrect")]
    InvalidCredentials,

    #[error("no student found given the information")]
    StudentNotFound,

    #[error("sender doesn't exist")]
    SenderNotFound,

    #[error("receiver doesn't exist")]
    ReceiverNotFound,

    #[error("listing doesn't exist")]
    ListingNotFound,

    #[error("only the seller may modify the listing")]
    NotOwner,

    #[error("cannot purchase your own listing")]
    SelfPurchase,

    #[error("cannot save your own listing")]
    SelfFavorite,

    #[error("the listing is no longer active")]
    ListingNotActive,

    #[error("the listing already carries this tag")]
    TagMappingExisted,
}

impl PantherDbError {
    pub fn kind(&self) -> ErrorKind {
        use PantherDbError::*;
        match self {
            InvalidEmail | InvalidField(_) | EmptyContent | InvalidCredentials => {
                ErrorKind::Validation
            }
            StudentNotFound | SenderNotFound | ReceiverNotFound | ListingNotFound
            | RecordNotFound => ErrorKind::NotFound,
            NotOwner => ErrorKind::NotOwner,
            EmailRegistered | TagMappingExisted => ErrorKind::Conflict,
            SelfPurchase | SelfFavorite | ListingNotActive => ErrorKind::BusinessRule,
            HashError(_) | QueryError(_) | JsonError(_) | MigrationError(_) => ErrorKind::Internal,
        }
    }
}

// Lookups that come back empty are not storage faults
impl From<diesel::result::Error> for PantherDbError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => PantherDbError::RecordNotFound,
            e => PantherDbError::QueryError(e),
        }
    }
}

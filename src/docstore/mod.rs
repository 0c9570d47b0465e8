//! Document-store seam for the collections that never lived in the
//! relational schema: auth accounts, per-rating detail, comments and
//! messages. Production runs against MongoDB; tests swap in the
//! in-memory implementation.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::MemoryDocStore;
pub use mongo::MongoDocStore;

/// Hard schema bounds on a stored rating. The HTTP layer separately
/// enforces the narrower [1,5] range; this one is the collection's own
/// constraint and stays distinct.
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("rating {0} outside [{RATING_MIN},{RATING_MAX}]")]
    RatingOutOfRange(f64),

    #[error(transparent)]
    Backend(#[from] mongodb::error::Error),
}

/// Auth account, distinct from the relational `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub username: String,

    /// Stored lowercase, unique across the collection.
    pub email: String,

    pub password_hash: String,

    pub created_at: mongodb::bson::DateTime,

    pub updated_at: mongodb::bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub movie_id: i32,

    pub email: String,

    pub rating: f64,

    pub created_at: mongodb::bson::DateTime,
}

impl RatingDoc {
    /// Rejects values outside the collection's [0,5] bound.
    pub fn new(movie_id: i32, email: &str, rating: f64) -> Result<Self, DocError> {
        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(DocError::RatingOutOfRange(rating));
        }

        Ok(Self {
            id: None,
            movie_id,
            email: email.to_owned(),
            rating,
            created_at: mongodb::bson::DateTime::now(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub movie_id: i32,

    pub username: String,

    pub title: String,

    pub comment: String,

    pub rating: i64,

    #[serde(default)]
    pub upvotes: i64,

    #[serde(default)]
    pub downvotes: i64,

    pub created_at: mongodb::bson::DateTime,
}

impl CommentDoc {
    #[must_use]
    pub fn new(movie_id: i32, username: &str, title: &str, comment: &str, rating: i64) -> Self {
        Self {
            id: None,
            movie_id,
            username: username.to_owned(),
            title: title.to_owned(),
            comment: comment.to_owned(),
            rating,
            upvotes: 0,
            downvotes: 0,
            created_at: mongodb::bson::DateTime::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    pub content: Option<String>,

    /// Email of the authenticated author, never client-supplied.
    pub user: Option<String>,

    pub created_at: mongodb::bson::DateTime,

    pub updated_at: mongodb::bson::DateTime,
}

impl MessageDoc {
    #[must_use]
    pub fn new(name: &str, content: Option<String>, user: Option<String>) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            name: name.to_owned(),
            content,
            user,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Operations the handlers need from the document store. Lookups by id
/// take the hex string from the URL; a string that does not parse as an
/// `ObjectId` is reported as not found.
#[async_trait]
pub trait DocStore: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DocError>;

    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, DocError>;

    /// Inserts the account, returning it with its id set. Fails with
    /// [`DocError::DuplicateEmail`] when the email is already taken.
    async fn insert_account(&self, account: Account) -> Result<Account, DocError>;

    async fn has_rating(&self, movie_id: i32, email: &str) -> Result<bool, DocError>;

    async fn insert_rating(&self, rating: RatingDoc) -> Result<(), DocError>;

    async fn ratings_for_movie(&self, movie_id: i32) -> Result<Vec<f64>, DocError>;

    async fn insert_comment(&self, comment: CommentDoc) -> Result<CommentDoc, DocError>;

    async fn comments_for_movie(&self, movie_id: i32) -> Result<Vec<CommentDoc>, DocError>;

    async fn insert_message(&self, message: MessageDoc) -> Result<MessageDoc, DocError>;

    async fn list_messages(&self) -> Result<Vec<MessageDoc>, DocError>;

    async fn find_message(&self, id: &str) -> Result<Option<MessageDoc>, DocError>;

    /// Updates the name only, bumping `updated_at`, and returns the
    /// document as it looks after the edit.
    async fn rename_message(&self, id: &str, name: &str) -> Result<Option<MessageDoc>, DocError>;

    async fn delete_message(&self, id: &str) -> Result<bool, DocError>;
}

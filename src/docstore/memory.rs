//! In-memory [`DocStore`] used by the integration tests, mirroring the
//! Mongo implementation's visible behavior (unique emails, id lookups,
//! `updated_at` maintenance).

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

use super::{Account, CommentDoc, DocError, DocStore, MessageDoc, RatingDoc};

#[derive(Default)]
pub struct MemoryDocStore {
    accounts: Mutex<Vec<Account>>,
    ratings: Mutex<Vec<RatingDoc>>,
    comments: Mutex<Vec<CommentDoc>>,
    messages: Mutex<Vec<MessageDoc>>,
}

impl MemoryDocStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rating documents stored for a movie.
    pub fn rating_count(&self, movie_id: i32) -> usize {
        self.ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .count()
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

#[async_trait]
impl DocStore for MemoryDocStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DocError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.id == Some(oid)).cloned())
    }

    async fn insert_account(&self, mut account: Account) -> Result<Account, DocError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(DocError::DuplicateEmail);
        }
        account.id = Some(ObjectId::new());
        accounts.push(account.clone());
        Ok(account)
    }

    async fn has_rating(&self, movie_id: i32, email: &str) -> Result<bool, DocError> {
        let ratings = self.ratings.lock().unwrap();
        Ok(ratings
            .iter()
            .any(|r| r.movie_id == movie_id && r.email == email))
    }

    async fn insert_rating(&self, mut rating: RatingDoc) -> Result<(), DocError> {
        rating.id = Some(ObjectId::new());
        self.ratings.lock().unwrap().push(rating);
        Ok(())
    }

    async fn ratings_for_movie(&self, movie_id: i32) -> Result<Vec<f64>, DocError> {
        let ratings = self.ratings.lock().unwrap();
        Ok(ratings
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.rating)
            .collect())
    }

    async fn insert_comment(&self, mut comment: CommentDoc) -> Result<CommentDoc, DocError> {
        comment.id = Some(ObjectId::new());
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn comments_for_movie(&self, movie_id: i32) -> Result<Vec<CommentDoc>, DocError> {
        let comments = self.comments.lock().unwrap();
        Ok(comments
            .iter()
            .filter(|c| c.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn insert_message(&self, mut message: MessageDoc) -> Result<MessageDoc, DocError> {
        message.id = Some(ObjectId::new());
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<MessageDoc>, DocError> {
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn find_message(&self, id: &str) -> Result<Option<MessageDoc>, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().find(|m| m.id == Some(oid)).cloned())
    }

    async fn rename_message(&self, id: &str, name: &str) -> Result<Option<MessageDoc>, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let mut messages = self.messages.lock().unwrap();
        let Some(message) = messages.iter_mut().find(|m| m.id == Some(oid)) else {
            return Ok(None);
        };
        message.name = name.to_owned();
        message.updated_at = mongodb::bson::DateTime::now();
        Ok(Some(message.clone()))
    }

    async fn delete_message(&self, id: &str) -> Result<bool, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.id != Some(oid));
        Ok(messages.len() < before)
    }
}

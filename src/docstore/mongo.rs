use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use tracing::info;

use super::{Account, CommentDoc, DocError, DocStore, MessageDoc, RatingDoc};

pub struct MongoDocStore {
    accounts: Collection<Account>,
    ratings: Collection<RatingDoc>,
    comments: Collection<CommentDoc>,
    messages: Collection<MessageDoc>,
}

impl MongoDocStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, DocError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 }).await?;

        let accounts: Collection<Account> = db.collection("accounts");

        // Duplicate registrations are caught by the server, not by a
        // read-then-write in application code.
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        accounts.create_index(email_index).await?;

        info!("Document store connected ({db_name})");

        Ok(Self {
            accounts,
            ratings: db.collection("ratings"),
            comments: db.collection("comments"),
            messages: db.collection("messages"),
        })
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11000
    )
}

#[async_trait]
impl DocStore for MongoDocStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DocError> {
        Ok(self.accounts.find_one(doc! { "email": email }).await?)
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.accounts.find_one(doc! { "_id": oid }).await?)
    }

    async fn insert_account(&self, mut account: Account) -> Result<Account, DocError> {
        let result = self.accounts.insert_one(&account).await.map_err(|err| {
            if is_duplicate_key(&err) {
                DocError::DuplicateEmail
            } else {
                DocError::Backend(err)
            }
        })?;

        account.id = result.inserted_id.as_object_id();
        Ok(account)
    }

    async fn has_rating(&self, movie_id: i32, email: &str) -> Result<bool, DocError> {
        let existing = self
            .ratings
            .find_one(doc! { "movie_id": movie_id, "email": email })
            .await?;
        Ok(existing.is_some())
    }

    async fn insert_rating(&self, rating: RatingDoc) -> Result<(), DocError> {
        self.ratings.insert_one(&rating).await?;
        Ok(())
    }

    async fn ratings_for_movie(&self, movie_id: i32) -> Result<Vec<f64>, DocError> {
        let docs: Vec<RatingDoc> = self
            .ratings
            .find(doc! { "movie_id": movie_id })
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().map(|r| r.rating).collect())
    }

    async fn insert_comment(&self, mut comment: CommentDoc) -> Result<CommentDoc, DocError> {
        let result = self.comments.insert_one(&comment).await?;
        comment.id = result.inserted_id.as_object_id();
        Ok(comment)
    }

    async fn comments_for_movie(&self, movie_id: i32) -> Result<Vec<CommentDoc>, DocError> {
        let docs = self
            .comments
            .find(doc! { "movie_id": movie_id })
            .await?
            .try_collect()
            .await?;
        Ok(docs)
    }

    async fn insert_message(&self, mut message: MessageDoc) -> Result<MessageDoc, DocError> {
        let result = self.messages.insert_one(&message).await?;
        message.id = result.inserted_id.as_object_id();
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<MessageDoc>, DocError> {
        let docs = self.messages.find(doc! {}).await?.try_collect().await?;
        Ok(docs)
    }

    async fn find_message(&self, id: &str) -> Result<Option<MessageDoc>, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.messages.find_one(doc! { "_id": oid }).await?)
    }

    async fn rename_message(&self, id: &str, name: &str) -> Result<Option<MessageDoc>, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };

        let updated = self
            .messages
            .find_one_and_update(
                doc! { "_id": oid },
                doc! {
                    "$set": {
                        "name": name,
                        "updated_at": mongodb::bson::DateTime::now(),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }

    async fn delete_message(&self, id: &str) -> Result<bool, DocError> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };
        let result = self.messages.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}

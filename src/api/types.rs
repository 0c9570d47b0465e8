use serde::Serialize;

use crate::docstore::{Account, CommentDoc, MessageDoc};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Auth account as exposed over the API: id flattened to hex, hash
/// never included.
#[derive(Debug, Serialize)]
pub struct AccountDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: account.email,
            username: account.username,
            created_at: rfc3339(account.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: String,
    pub movie_id: i32,
    pub username: String,
    pub title: String,
    pub comment: String,
    pub rating: i64,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: String,
}

impl From<CommentDoc> for CommentDto {
    fn from(doc: CommentDoc) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            movie_id: doc.movie_id,
            username: doc.username,
            title: doc.title,
            comment: doc.comment,
            rating: doc.rating,
            upvotes: doc.upvotes,
            downvotes: doc.downvotes,
            created_at: rfc3339(doc.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: String,
    pub name: String,
    pub content: Option<String>,
    pub user: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MessageDoc> for MessageDto {
    fn from(doc: MessageDoc) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: doc.name,
            content: doc.content,
            user: doc.user,
            created_at: rfc3339(doc.created_at),
            updated_at: rfc3339(doc.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentListDto {
    pub comments: Vec<CommentDto>,
}

/// `POST /users/login` payload: bearer token plus display name.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
}

/// `POST /auth/login` payload: bearer token plus the account.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    pub user: AccountDto,
}

fn rfc3339(dt: mongodb::bson::DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

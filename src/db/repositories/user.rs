use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use tokio::task;

use crate::entities::{addresses, prelude::*, users};

/// Registration input after validation. Optional address fields are
/// stored as NULL when absent.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub creation_date: String,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    AlreadyExists,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let user = Users::find_by_id(email)
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user)
    }

    /// Creates the user row and its address row in one transaction.
    /// Either both land or neither does.
    pub async fn register(&self, new_user: NewUser) -> Result<RegisterOutcome> {
        let password = new_user.password.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .context("Password hashing task panicked")??;

        let txn = self.conn.begin().await?;

        match Self::register_in_txn(&txn, new_user, password_hash).await {
            Ok(outcome @ RegisterOutcome::AlreadyExists) => {
                txn.rollback().await?;
                Ok(outcome)
            }
            Ok(outcome) => {
                txn.commit().await?;
                Ok(outcome)
            }
            Err(err) => {
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    async fn register_in_txn(
        txn: &DatabaseTransaction,
        new_user: NewUser,
        password_hash: String,
    ) -> Result<RegisterOutcome> {
        let existing = Users::find_by_id(&new_user.email).one(txn).await?;
        if existing.is_some() {
            return Ok(RegisterOutcome::AlreadyExists);
        }

        users::ActiveModel {
            email: Set(new_user.email.clone()),
            username: Set(new_user.username),
            password_hash: Set(password_hash),
            creation_date: Set(new_user.creation_date),
        }
        .insert(txn)
        .await?;

        addresses::ActiveModel {
            email: Set(new_user.email),
            country: Set(new_user.country),
            street: Set(new_user.street),
            city: Set(new_user.city),
        }
        .insert(txn)
        .await?;

        Ok(RegisterOutcome::Created)
    }

    /// Returns the user when the password matches, `None` otherwise.
    /// Argon2 verification runs on the blocking pool.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<users::Model>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then_some(user))
    }

    pub async fn update_password(&self, email: &str, new_password: &str) -> Result<()> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {email}"))?;

        let password = new_password.to_string();
        let new_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash. Synchronous; callers on the
/// async runtime should wrap this in `spawn_blocking`.
#[must_use]
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

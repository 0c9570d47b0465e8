use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::{info, warn};

use crate::docstore::DocStore;
use crate::entities::movies;

pub mod migrator;
pub mod repositories;

pub use repositories::movie::RatingOutcome;
pub use repositories::user::{NewUser, RegisterOutcome};

/// Connect attempts before giving up at boot. Once connected, the pool
/// handles reconnects on its own.
const CONNECT_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 10, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Self::connect_with_retry(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    async fn connect_with_retry(opt: ConnectOptions) -> Result<DatabaseConnection> {
        let mut attempt = 1;
        loop {
            match Database::connect(opt.clone()).await {
                Ok(conn) => return Ok(conn),
                Err(err) if attempt < CONNECT_ATTEMPTS => {
                    let backoff = Duration::from_millis(500 * u64::from(1u32 << attempt));
                    warn!(
                        "Database connect attempt {attempt}/{CONNECT_ATTEMPTS} failed: {err}, \
                         retrying in {backoff:?}"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn list_movies(&self) -> Result<Vec<movies::Model>> {
        self.movie_repo().list().await
    }

    pub async fn top_movies(&self) -> Result<Vec<movies::Model>> {
        self.movie_repo().top().await
    }

    pub async fn seen_movies(&self, email: &str) -> Result<Vec<movies::Model>> {
        self.movie_repo().seen_by(email).await
    }

    pub async fn get_movie(&self, movie_id: i32) -> Result<Option<movies::Model>> {
        self.movie_repo().get(movie_id).await
    }

    pub async fn add_movie(&self, title: String, description: String) -> Result<movies::Model> {
        self.movie_repo().add(title, description).await
    }

    pub async fn update_movie(
        &self,
        movie_id: i32,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Option<movies::Model>> {
        self.movie_repo().update(movie_id, title, description).await
    }

    pub async fn delete_movie(&self, movie_id: i32) -> Result<bool> {
        self.movie_repo().delete(movie_id).await
    }

    pub async fn rate_movie(
        &self,
        docs: &dyn DocStore,
        movie_id: i32,
        email: &str,
        rating: f64,
    ) -> Result<RatingOutcome> {
        self.movie_repo().rate(docs, movie_id, email, rating).await
    }

    pub async fn register_user(&self, new_user: NewUser) -> Result<RegisterOutcome> {
        self.user_repo().register(new_user).await
    }

    pub async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<crate::entities::users::Model>> {
        self.user_repo().authenticate(email, password).await
    }

    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<crate::entities::users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn update_user_password(&self, email: &str, new_password: &str) -> Result<()> {
        self.user_repo().update_password(email, new_password).await
    }
}

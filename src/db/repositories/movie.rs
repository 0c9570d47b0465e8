use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::docstore::{DocStore, RatingDoc};
use crate::entities::{movies, prelude::*, seen_movies};

/// How many rows `/movies/top` returns.
const TOP_MOVIES_LIMIT: u64 = 10;

#[derive(Debug, PartialEq)]
pub enum RatingOutcome {
    Recorded { mean: f64 },
    MovieNotFound,
    AlreadyRated,
}

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<movies::Model>> {
        Ok(Movies::find().all(&self.conn).await?)
    }

    pub async fn top(&self) -> Result<Vec<movies::Model>> {
        let movies = Movies::find()
            .filter(movies::Column::Rating.is_not_null())
            .order_by_desc(movies::Column::Rating)
            .limit(TOP_MOVIES_LIMIT)
            .all(&self.conn)
            .await?;

        Ok(movies)
    }

    /// Movies the user has marked as seen.
    pub async fn seen_by(&self, email: &str) -> Result<Vec<movies::Model>> {
        let seen = SeenMovies::find()
            .filter(seen_movies::Column::Email.eq(email))
            .all(&self.conn)
            .await?;

        let ids: Vec<i32> = seen.into_iter().map(|s| s.movie_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let movies = Movies::find()
            .filter(movies::Column::MovieId.is_in(ids))
            .all(&self.conn)
            .await?;

        Ok(movies)
    }

    pub async fn get(&self, movie_id: i32) -> Result<Option<movies::Model>> {
        Ok(Movies::find_by_id(movie_id).one(&self.conn).await?)
    }

    pub async fn add(&self, title: String, description: String) -> Result<movies::Model> {
        let result = Movies::insert(movies::ActiveModel {
            title: Set(title),
            description: Set(description),
            rating: Set(None),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        let movie = Movies::find_by_id(result.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created movie"))?;

        Ok(movie)
    }

    /// Updates only the fields that were supplied, leaving the rest as
    /// stored. Returns `None` when the movie does not exist.
    pub async fn update(
        &self,
        movie_id: i32,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Option<movies::Model>> {
        let Some(movie) = Movies::find_by_id(movie_id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: movies::ActiveModel = movie.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, movie_id: i32) -> Result<bool> {
        let result = Movies::delete_by_id(movie_id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Records one rating and recomputes the movie's stored mean, all
    /// within a single relational transaction. Business rejections roll
    /// the transaction back and surface as an outcome, not an error.
    pub async fn rate(
        &self,
        docs: &dyn DocStore,
        movie_id: i32,
        email: &str,
        rating: f64,
    ) -> Result<RatingOutcome> {
        let txn = self.conn.begin().await?;

        match Self::rate_in_txn(&txn, docs, movie_id, email, rating).await {
            Ok(outcome @ (RatingOutcome::MovieNotFound | RatingOutcome::AlreadyRated)) => {
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

    async fn rate_in_txn(
        txn: &DatabaseTransaction,
        docs: &dyn DocStore,
        movie_id: i32,
        email: &str,
        rating: f64,
    ) -> Result<RatingOutcome> {
        let Some(movie) = Movies::find_by_id(movie_id).one(txn).await? else {
            return Ok(RatingOutcome::MovieNotFound);
        };

        // The rating documents live outside the relational transaction,
        // so two concurrent submissions can both pass this check.
        // TODO: back this with a unique index on (movie_id, email) in the
        // ratings collection and treat the duplicate-key error as AlreadyRated.
        if docs.has_rating(movie_id, email).await? {
            return Ok(RatingOutcome::AlreadyRated);
        }

        docs.insert_rating(RatingDoc::new(movie_id, email, rating)?)
            .await?;

        let ratings = docs.ratings_for_movie(movie_id).await?;
        #[allow(clippy::cast_precision_loss)]
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;

        let mut active: movies::ActiveModel = movie.into();
        active.rating = Set(Some(mean));
        active.update(txn).await?;

        Ok(RatingOutcome::Recorded { mean })
    }
}

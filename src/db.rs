// src/db.rs
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Choice, ChoiceTally, Poll, Vote},
    store::PollStore,
};

/// Connects to Postgres and brings the schema up to date.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Maps constraint violations onto the store's own error kinds.
fn classify(err: sqlx::Error, duplicate: &'static str, reference: &'static str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Duplicate(duplicate);
        }
        if db.is_foreign_key_violation() {
            return StoreError::MissingReference(reference);
        }
    }

    StoreError::Database(err)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgStore {
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let polls = sqlx::query_as::<_, Poll>(
            "SELECT id, title, expire_at FROM polls ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(polls)
    }

    async fn find_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let poll = sqlx::query_as::<_, Poll>("SELECT id, title, expire_at FROM polls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(poll)
    }

    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO polls (id, title, expire_at) VALUES ($1, $2, $3)")
            .bind(poll.id)
            .bind(&poll.title)
            .bind(poll.expire_at)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "poll", "poll"))?;

        Ok(())
    }

    async fn list_choices(&self, poll_id: Uuid) -> Result<Vec<Choice>, StoreError> {
        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, title, poll_id FROM choices WHERE poll_id = $1 ORDER BY created_at, id",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    async fn find_choice(&self, id: Uuid) -> Result<Option<Choice>, StoreError> {
        let choice =
            sqlx::query_as::<_, Choice>("SELECT id, title, poll_id FROM choices WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(choice)
    }

    async fn find_choice_by_title(
        &self,
        poll_id: Uuid,
        title: &str,
    ) -> Result<Option<Choice>, StoreError> {
        let choice = sqlx::query_as::<_, Choice>(
            "SELECT id, title, poll_id FROM choices WHERE poll_id = $1 AND title = $2",
        )
        .bind(poll_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(choice)
    }

    async fn insert_choice(&self, choice: &Choice) -> Result<(), StoreError> {
        // UNIQUE (poll_id, title) settles concurrent inserts of the same title
        sqlx::query("INSERT INTO choices (id, title, poll_id) VALUES ($1, $2, $3)")
            .bind(choice.id)
            .bind(&choice.title)
            .bind(choice.poll_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "choice title", "poll"))?;

        Ok(())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO votes (id, choice_id, created_at) VALUES ($1, $2, $3)")
            .bind(vote.id)
            .bind(vote.choice_id)
            .bind(vote.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "vote", "choice"))?;

        Ok(())
    }

    async fn tally_votes(&self, poll_id: Uuid) -> Result<Vec<ChoiceTally>, StoreError> {
        let tallies = sqlx::query_as::<_, ChoiceTally>(
            r#"
            SELECT c.title AS title, COUNT(v.id) AS votes
            FROM votes v
            JOIN choices c ON c.id = v.choice_id
            WHERE c.poll_id = $1
            GROUP BY c.id, c.title
            ORDER BY votes DESC, c.title ASC
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tallies)
    }
}

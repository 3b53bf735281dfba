//! Persistence port for polls, choices and votes.
//!
//! [`PgStore`](crate::db::PgStore) backs the service in production,
//! [`MemoryStore`] keeps everything in process for development and tests.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Choice, ChoiceTally, Poll, Vote},
};

#[async_trait]
pub trait PollStore: Send + Sync {
    /// All polls in creation order.
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError>;

    async fn find_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError>;

    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError>;

    /// Choices of one poll in creation order.
    async fn list_choices(&self, poll_id: Uuid) -> Result<Vec<Choice>, StoreError>;

    async fn find_choice(&self, id: Uuid) -> Result<Option<Choice>, StoreError>;

    async fn find_choice_by_title(
        &self,
        poll_id: Uuid,
        title: &str,
    ) -> Result<Option<Choice>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the poll already has a
    /// choice with the same title.
    async fn insert_choice(&self, choice: &Choice) -> Result<(), StoreError>;

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError>;

    /// Vote counts of the poll's voted choices, most votes first, ties by
    /// title ascending.
    async fn tally_votes(&self, poll_id: Uuid) -> Result<Vec<ChoiceTally>, StoreError>;
}

#[derive(Default)]
struct Collections {
    polls: Vec<Poll>,
    choices: Vec<Choice>,
    votes: Vec<Vote>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        Ok(self.inner.read().await.polls.clone())
    }

    async fn find_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.polls.iter().find(|poll| poll.id == id).cloned())
    }

    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.polls.iter().any(|p| p.id == poll.id) {
            return Err(StoreError::Duplicate("poll"));
        }
        inner.polls.push(poll.clone());
        Ok(())
    }

    async fn list_choices(&self, poll_id: Uuid) -> Result<Vec<Choice>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .choices
            .iter()
            .filter(|choice| choice.poll_id == poll_id)
            .cloned()
            .collect())
    }

    async fn find_choice(&self, id: Uuid) -> Result<Option<Choice>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.choices.iter().find(|choice| choice.id == id).cloned())
    }

    async fn find_choice_by_title(
        &self,
        poll_id: Uuid,
        title: &str,
    ) -> Result<Option<Choice>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .choices
            .iter()
            .find(|choice| choice.poll_id == poll_id && choice.title == title)
            .cloned())
    }

    async fn insert_choice(&self, choice: &Choice) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.polls.iter().any(|poll| poll.id == choice.poll_id) {
            return Err(StoreError::MissingReference("poll"));
        }
        if inner
            .choices
            .iter()
            .any(|c| c.poll_id == choice.poll_id && c.title == choice.title)
        {
            return Err(StoreError::Duplicate("choice title"));
        }

        inner.choices.push(choice.clone());
        Ok(())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.choices.iter().any(|choice| choice.id == vote.choice_id) {
            return Err(StoreError::MissingReference("choice"));
        }

        inner.votes.push(vote.clone());
        Ok(())
    }

    async fn tally_votes(&self, poll_id: Uuid) -> Result<Vec<ChoiceTally>, StoreError> {
        let inner = self.inner.read().await;

        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for vote in &inner.votes {
            *counts.entry(vote.choice_id).or_insert(0) += 1;
        }

        let mut tallies: Vec<ChoiceTally> = inner
            .choices
            .iter()
            .filter(|choice| choice.poll_id == poll_id)
            .filter_map(|choice| {
                counts.get(&choice.id).map(|&votes| ChoiceTally {
                    title: choice.title.clone(),
                    votes,
                })
            })
            .collect();

        tallies.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.title.cmp(&b.title)));
        Ok(tallies)
    }
}

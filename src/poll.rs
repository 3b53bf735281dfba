// src/poll.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Choice, CreateChoiceRequest, CreatePollRequest, Poll, PollResult, Vote},
    store::PollStore,
    timestamp,
};

const POLL_NOT_FOUND: &str = "poll does not exist";
const CHOICE_NOT_FOUND: &str = "choice does not exist";
const POLL_EXPIRED: &str = "poll has expired";

/// Poll operations on top of a [`PollStore`].
#[derive(Clone)]
pub struct PollService {
    store: Arc<dyn PollStore>,
}

impl PollService {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self { store }
    }

    pub async fn list_polls(&self) -> Result<Vec<Poll>, AppError> {
        Ok(self.store.list_polls().await?)
    }

    pub async fn list_choices(&self, poll_id: &str) -> Result<Vec<Choice>, AppError> {
        let poll = self.require_poll(poll_id).await?;
        Ok(self.store.list_choices(poll.id).await?)
    }

    /// Most voted choice of the poll. Ties go to the alphabetically first
    /// title; a poll nobody voted on yet has no result.
    pub async fn poll_result(&self, poll_id: &str) -> Result<PollResult, AppError> {
        let poll = self.require_poll(poll_id).await?;
        let top = self.store.tally_votes(poll.id).await?.into_iter().next();

        if top.is_none() {
            debug!("Poll {} has no votes yet", poll.id);
        }

        Ok(PollResult {
            id: poll.id,
            title: poll.title,
            expire_at: poll.expire_at,
            result: top,
        })
    }

    pub async fn create_poll(&self, request: CreatePollRequest) -> Result<Poll, AppError> {
        let title = non_empty_title(request.title)?;
        let now = Utc::now();

        let expire_at = match request.expire_at.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => timestamp::parse(raw)
                .map(timestamp::truncate_to_minute)
                .ok_or_else(|| {
                    AppError::Validation(
                        "expireAt must be formatted as YYYY/MM/DD HH:mm or RFC 3339".to_string(),
                    )
                })?,
            _ => timestamp::default_expiry(now),
        };

        let poll = Poll {
            id: Uuid::new_v4(),
            title,
            expire_at,
        };
        self.store.insert_poll(&poll).await?;

        info!(
            "Created poll {} expiring {}",
            poll.id,
            timestamp::format(&poll.expire_at)
        );
        Ok(poll)
    }

    /// Checks run in order: title, poll exists, title unique, poll open.
    pub async fn create_choice(&self, request: CreateChoiceRequest) -> Result<Choice, AppError> {
        let title = non_empty_title(request.title)?;
        let poll = self
            .require_poll(request.poll_id.as_deref().unwrap_or_default())
            .await?;

        if self
            .store
            .find_choice_by_title(poll.id, &title)
            .await?
            .is_some()
        {
            debug!("Rejected duplicate choice {title:?} for poll {}", poll.id);
            return Err(AppError::Conflict(
                "choice title already exists for this poll".to_string(),
            ));
        }

        if poll.is_expired(Utc::now()) {
            debug!("Rejected choice for expired poll {}", poll.id);
            return Err(AppError::Forbidden(POLL_EXPIRED.to_string()));
        }

        let choice = Choice {
            id: Uuid::new_v4(),
            title,
            poll_id: poll.id,
        };
        self.store.insert_choice(&choice).await?;

        info!("Created choice {} for poll {}", choice.id, poll.id);
        Ok(choice)
    }

    pub async fn cast_vote(&self, choice_id: &str) -> Result<Vote, AppError> {
        let choice = match parse_id(choice_id) {
            Some(id) => self.store.find_choice(id).await?,
            None => None,
        }
        .ok_or_else(|| AppError::NotFound(CHOICE_NOT_FOUND.to_string()))?;

        // Choices always reference a stored poll
        let poll = self
            .store
            .find_poll(choice.poll_id)
            .await?
            .ok_or_else(|| AppError::NotFound(POLL_NOT_FOUND.to_string()))?;

        let now = Utc::now();
        if poll.is_expired(now) {
            debug!("Rejected vote for expired poll {}", poll.id);
            return Err(AppError::Forbidden(POLL_EXPIRED.to_string()));
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            created_at: now,
            choice_id: choice.id,
        };
        self.store.insert_vote(&vote).await?;

        debug!("Recorded vote for choice {}", choice.id);
        Ok(vote)
    }

    async fn require_poll(&self, poll_id: &str) -> Result<Poll, AppError> {
        let poll = match parse_id(poll_id) {
            Some(id) => self.store.find_poll(id).await?,
            None => None,
        };

        poll.ok_or_else(|| AppError::NotFound(POLL_NOT_FOUND.to_string()))
    }
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn non_empty_title(title: Option<String>) -> Result<String, AppError> {
    match title.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(AppError::Validation("title must not be empty".to_string())),
    }
}

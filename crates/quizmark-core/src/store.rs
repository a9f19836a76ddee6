//! Persistence boundary for question responses and their final grades.
//!
//! The engine talks to storage only through [`GradeStore`], so a database
//! backend can replace [`MemoryGradeStore`] without touching scoring code.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::GradingError;
use crate::model::{GradingRecord, QuestionResponse};

/// Storage for responses and grades.
///
/// `finalize` must be atomic per response: of two concurrent calls for the
/// same id, exactly one succeeds and the other sees `AlreadyGraded`.
#[async_trait]
pub trait GradeStore: Send + Sync {
    /// Store a new or replacement response. Graded responses are frozen.
    async fn submit(&self, response: QuestionResponse) -> Result<(), GradingError>;

    /// Fetch a response by id.
    async fn response(&self, id: &str) -> Result<QuestionResponse, GradingError>;

    /// Attach a final grade. The first writer wins.
    async fn finalize(
        &self,
        id: &str,
        record: GradingRecord,
    ) -> Result<QuestionResponse, GradingError>;

    /// Every response of one attempt, in submission order.
    async fn responses_for_attempt(
        &self,
        attempt_id: &str,
    ) -> Result<Vec<QuestionResponse>, GradingError>;
}

/// In-memory store used by the CLI and tests.
#[derive(Default)]
pub struct MemoryGradeStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<String, QuestionResponse>,
    order: Vec<String>,
}

impl MemoryGradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored responses.
    pub async fn len(&self) -> usize {
        self.inner.read().await.responses.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl GradeStore for MemoryGradeStore {
    async fn submit(&self, response: QuestionResponse) -> Result<(), GradingError> {
        let mut inner = self.inner.write().await;
        match inner.responses.get(&response.id) {
            Some(existing) if existing.is_graded() => {
                tracing::warn!(response = %response.id, "rejecting resubmission of graded response");
                return Err(GradingError::AlreadyGraded(response.id));
            }
            Some(_) => {}
            None => inner.order.push(response.id.clone()),
        }
        inner.responses.insert(response.id.clone(), response);
        Ok(())
    }

    async fn response(&self, id: &str) -> Result<QuestionResponse, GradingError> {
        self.inner
            .read()
            .await
            .responses
            .get(id)
            .cloned()
            .ok_or_else(|| GradingError::ResponseNotFound(id.to_string()))
    }

    async fn finalize(
        &self,
        id: &str,
        record: GradingRecord,
    ) -> Result<QuestionResponse, GradingError> {
        let mut inner = self.inner.write().await;
        let response = inner
            .responses
            .get_mut(id)
            .ok_or_else(|| GradingError::ResponseNotFound(id.to_string()))?;
        if response.is_graded() {
            tracing::warn!(response = %id, "rejecting duplicate grade");
            return Err(GradingError::AlreadyGraded(id.to_string()));
        }
        response.points_earned = record.points_earned;
        response.is_correct = record.is_correct;
        response.grading = Some(record);
        Ok(response.clone())
    }

    async fn responses_for_attempt(
        &self,
        attempt_id: &str,
    ) -> Result<Vec<QuestionResponse>, GradingError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.responses.get(id))
            .filter(|r| r.attempt_id == attempt_id)
            .cloned()
            .collect())
    }
}

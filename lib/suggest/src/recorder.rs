//! Background persistence of computed contexts.

use crate::profile::RevolutionaryContext;
use chrono::Utc;
use eaa_copilot_core::{SessionId, UserId};
use eaa_copilot_signals::{AnalyticsRecord, AnalyticsRecordId, AnalyticsSink};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Submits analytics records without blocking the response.
#[derive(Clone)]
pub struct AnalyticsRecorder {
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsRecorder {
    /// Creates a recorder writing to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink }
    }

    /// Builds the record for one generated suggestion set.
    #[must_use]
    pub fn record_for(
        user_id: &UserId,
        session_id: &SessionId,
        context: &RevolutionaryContext,
        suggestion_count: usize,
        metadata: JsonValue,
    ) -> AnalyticsRecord {
        AnalyticsRecord {
            id: AnalyticsRecordId::new(),
            user_id: user_id.clone(),
            session_id: session_id.clone(),
            persona_type: context.persona.persona_type.to_string(),
            maturity_level: context.business_maturity.level.to_string(),
            frustration_level: context.frustration.current_level,
            stage: context.stage.stage.to_string(),
            opportunity_score: context.opportunity_score,
            suggestion_count: u32::try_from(suggestion_count).unwrap_or(u32::MAX),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Spawns the write. The task logs its own failure and gives up as soon
    /// as `cancel` fires.
    pub fn submit(&self, record: AnalyticsRecord, cancel: CancellationToken) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(record_id = %record.id, "analytics write abandoned");
                }
                result = sink.insert(&record) => match result {
                    Ok(()) => debug!(record_id = %record.id, "analytics recorded"),
                    Err(e) => warn!(
                        record_id = %record.id,
                        user_id = %record.user_id,
                        error = %e,
                        "failed to record analytics"
                    ),
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::default_context;
    use async_trait::async_trait;
    use eaa_copilot_signals::{InMemoryAnalyticsSink, SinkError};
    use std::time::Duration;

    struct FailingSink;

    #[async_trait]
    impl AnalyticsSink for FailingSink {
        async fn insert(&self, _record: &AnalyticsRecord) -> Result<(), SinkError> {
            Err(SinkError::InsertFailed {
                reason: "relation does not exist".to_string(),
            })
        }
    }

    struct StalledSink;

    #[async_trait]
    impl AnalyticsSink for StalledSink {
        async fn insert(&self, _record: &AnalyticsRecord) -> Result<(), SinkError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn record() -> AnalyticsRecord {
        AnalyticsRecorder::record_for(
            &UserId::new("u1").expect("valid"),
            &SessionId::new("s1").expect("valid"),
            &default_context(),
            3,
            serde_json::json!({"channel": "web"}),
        )
    }

    #[test]
    fn record_carries_context() {
        let record = record();
        assert_eq!(record.persona_type, "newcomer");
        assert_eq!(record.maturity_level, "startup");
        assert_eq!(record.stage, "discovery");
        assert_eq!(record.opportunity_score, 0.54);
        assert_eq!(record.suggestion_count, 3);
    }

    #[tokio::test]
    async fn writes_to_sink() {
        let sink = Arc::new(InMemoryAnalyticsSink::new());
        let recorder = AnalyticsRecorder::new(sink.clone());

        recorder
            .submit(record(), CancellationToken::new())
            .await
            .expect("task completes");

        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn sink_failure_is_contained() {
        let recorder = AnalyticsRecorder::new(Arc::new(FailingSink));
        let joined = recorder.submit(record(), CancellationToken::new()).await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn cancellation_abandons_write() {
        let recorder = AnalyticsRecorder::new(Arc::new(StalledSink));
        let cancel = CancellationToken::new();
        let handle = recorder.submit(record(), cancel.clone());

        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("abandoned promptly")
            .expect("task completes");
    }
}

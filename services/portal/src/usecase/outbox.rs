use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::domain::repository::{DeliveryHook, OutboxRepository};
use crate::domain::types::{
    MAX_DELIVERY_ATTEMPTS, OTP_ISSUED_EVENT, OUTBOX_BATCH_SIZE, OtpMessage, OutboxEvent,
    RETRY_BACKOFF_SECS,
};
use crate::error::PortalError;

/// Outcome counts of one relay pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub delivered: usize,
    pub retried: usize,
    pub failed: usize,
}

pub struct RelayOutboxUseCase<O, D>
where
    O: OutboxRepository,
    D: DeliveryHook,
{
    pub outbox: O,
    pub hook: D,
}

impl<O, D> RelayOutboxUseCase<O, D>
where
    O: OutboxRepository,
    D: DeliveryHook,
{
    /// Deliver every due event once.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<RelayReport, PortalError> {
        let events = self.outbox.fetch_due(now, OUTBOX_BATCH_SIZE).await?;
        let mut report = RelayReport::default();
        if events.is_empty() {
            return Ok(report);
        }
        debug!(count = events.len(), "relaying outbox events");

        for event in events {
            let attempts = event.attempts + 1;
            let message = match decode(&event) {
                Ok(message) => message,
                Err(reason) => {
                    warn!(
                        event_id = %event.id,
                        kind = %event.kind,
                        %reason,
                        "outbox event dropped"
                    );
                    self.outbox
                        .mark_failed(event.id, attempts, &reason, now)
                        .await?;
                    report.failed += 1;
                    continue;
                }
            };

            match self.hook.deliver(&message).await {
                Ok(()) => {
                    self.outbox.mark_processed(event.id, now).await?;
                    report.delivered += 1;
                }
                Err(e) if attempts >= MAX_DELIVERY_ATTEMPTS => {
                    error!(event_id = %event.id, attempts, error = ?e, "otp delivery gave up");
                    self.outbox
                        .mark_failed(event.id, attempts, &format!("{e:#}"), now)
                        .await?;
                    report.failed += 1;
                }
                Err(e) => {
                    let retry_at =
                        now + Duration::seconds(RETRY_BACKOFF_SECS * i64::from(attempts));
                    warn!(
                        event_id = %event.id,
                        attempts,
                        error = ?e,
                        "otp delivery failed, will retry"
                    );
                    self.outbox
                        .schedule_retry(event.id, attempts, &format!("{e:#}"), retry_at)
                        .await?;
                    report.retried += 1;
                }
            }
        }

        info!(
            delivered = report.delivered,
            retried = report.retried,
            failed = report.failed,
            "outbox relay pass finished"
        );
        Ok(report)
    }

    /// Poll forever with a fixed period. Errors are logged and the next tick
    /// tries again.
    pub async fn run(self, period: StdDuration) {
        info!(period_secs = period.as_secs(), "outbox relay started");
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.execute(Utc::now()).await {
                error!(error = ?e, "outbox relay pass failed");
            }
        }
    }
}

fn decode(event: &OutboxEvent) -> Result<OtpMessage, String> {
    if event.kind != OTP_ISSUED_EVENT {
        return Err(format!("unknown event kind {}", event.kind));
    }
    serde_json::from_value(event.payload.clone()).map_err(|e| format!("decode payload: {e}"))
}

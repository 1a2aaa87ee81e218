//! ltk-payment
//!
//! Settlement polling for the checkout flow: after the payment provider
//! hands control back, the dashboard polls the order until the backend marks
//! the payment validated or aborted, giving up after a fixed attempt ceiling.
//!
//! The probe receives the attempt number explicitly; the loop never relies on
//! captured mutable state, so the values a continuation sees are always the
//! values it was given.

use std::future::Future;
use std::time::Duration;

use ltk_api::FetchError;
use tracing::{debug, warn};

/// Payment state as reported by the order endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Not settled yet; keep polling.
    Pending,
    Validated,
    Aborted,
}

/// Terminal result of a polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Validated,
    Aborted,
    /// The attempt ceiling was reached without a terminal status. Carries the
    /// last probe error, if the final attempts were failing rather than
    /// pending.
    TimedOut {
        attempts: u32,
        last_error: Option<FetchError>,
    },
}

/// Fixed interval and ceiling; no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 45,
        }
    }
}

/// Poll `probe` until it reports a terminal status or the ceiling is hit.
///
/// A probe error is not terminal: transient failures while the backend
/// settles are expected, so the attempt is consumed and polling continues.
/// The caller decides what a timeout means (typically "contact support").
pub async fn poll_payment<P, Fut>(policy: PollPolicy, mut probe: P) -> PollOutcome
where
    P: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PaymentStatus, FetchError>>,
{
    let mut last_error = None;
    for attempt in 1..=policy.max_attempts {
        match probe(attempt).await {
            Ok(PaymentStatus::Validated) => {
                debug!("payment validated on attempt {attempt}");
                return PollOutcome::Validated;
            }
            Ok(PaymentStatus::Aborted) => {
                debug!("payment aborted on attempt {attempt}");
                return PollOutcome::Aborted;
            }
            Ok(PaymentStatus::Pending) => {
                last_error = None;
            }
            Err(err) => {
                warn!("payment status probe failed on attempt {attempt}: {err}");
                last_error = Some(err);
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    PollOutcome::TimedOut {
        attempts: policy.max_attempts,
        last_error,
    }
}

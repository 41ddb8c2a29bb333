//! Dispatcher: send every message to every contact through a transport.
//!
//! CHANGELOG:
//! - 10/18/2026 - Warn and return early on an empty plan
//! - 10/17/2026 - Added the continue-on-failure policy and RunReport
//! - 10/15/2026 - Initial implementation

use crate::contacts::Contact;
use crate::error::Result;
use crate::plan::{Message, SendPlan};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default pause after each attempted send.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(2);

/// What to do when a single send fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Record the failure and move on to the next send.
    Continue,
}

/// One failed send.
#[derive(Debug, Clone, Serialize)]
pub struct SendFailure {
    pub contact: String,
    pub message: String,
    pub error: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub transport: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<SendFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walks contacts × messages, pacing sends with a fixed delay.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    delay: Duration,
    policy: FailurePolicy,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_DELAY, FailurePolicy::Abort)
    }
}

impl Dispatcher {
    pub fn new(delay: Duration, policy: FailurePolicy) -> Self {
        Self { delay, policy }
    }

    /// Send every message to every contact, contact-major.
    ///
    /// Under `FailurePolicy::Abort` the first failed send is returned as-is
    /// and nothing after it is attempted.
    pub fn run<T: Transport + ?Sized>(
        &self,
        contacts: &[Contact],
        messages: &[Message],
        transport: &mut T,
    ) -> Result<RunReport> {
        self.execute(&SendPlan::cross(contacts, messages), transport)
    }

    /// Execute a prebuilt plan in order.
    pub fn execute<T: Transport + ?Sized>(&self, plan: &SendPlan, transport: &mut T) -> Result<RunReport> {
        info!(
            "Sending {} messages via {} transport.",
            plan.len(),
            transport.name()
        );

        let mut report = RunReport {
            transport: transport.name().to_string(),
            ..Default::default()
        };
        if plan.is_empty() {
            warn!("Nothing to send: no contacts or no messages.");
            return Ok(report);
        }

        for (index, send) in plan.sends.iter().enumerate() {
            debug!(
                "[{}/{}] {} -> {}",
                index + 1,
                plan.len(),
                send.message.describe(),
                send.contact
            );
            report.attempted += 1;

            match transport.send(&send.contact, &send.message) {
                Ok(()) => report.succeeded += 1,
                Err(e) => match self.policy {
                    FailurePolicy::Abort => {
                        error!(
                            "Aborting run after {} of {} sends: {}",
                            report.succeeded,
                            plan.len(),
                            e
                        );
                        return Err(e);
                    }
                    FailurePolicy::Continue => {
                        warn!("Send to {} failed, continuing: {}", send.contact, e);
                        report.failures.push(SendFailure {
                            contact: send.contact.to_string(),
                            message: send.message.describe(),
                            error: e.to_string(),
                        });
                    }
                },
            }

            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }

        if report.is_success() {
            info!("Bulk messages sent successfully ({} sends).", report.succeeded);
        } else {
            warn!(
                "Bulk run finished with {} failures out of {} sends.",
                report.failures.len(),
                report.attempted
            );
        }
        Ok(report)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{PurchaseOutcome, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastError {
    #[default]
    None,
    NotFound,
    OutOfStock,
}

/// Live session progress. Single source of truth, persisted and broadcast on every change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    pub is_monitoring: bool,
    pub owned_resource_id: Option<ResourceId>,
    pub last_probe_time: Option<DateTime<Utc>>,
    pub attempt_count: u32,
    pub last_error: LastError,
    pub success_detected: bool,
    pub purchase_attempted: bool,
    pub purchase_completed: bool,
    pub reached_confirmation: bool,
}

/// Strict state delta. This is the ONLY way state mutates.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDelta {
    SessionStarted { resource: ResourceId, at: DateTime<Utc> },
    ProbeMissed { at: DateTime<Utc> },
    OutOfStock { at: DateTime<Utc> },
    Available { at: DateTime<Utc>, outcome: Option<PurchaseOutcome> },
    ConfirmationReached,
    /// Terminal business outcome: ownership dropped, outcome fields kept.
    SessionEnded,
    /// Explicit stop or resource loss.
    Reset,
}

impl MonitorState {
    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::SessionStarted { resource, at } => {
                *self = MonitorState {
                    is_monitoring: true,
                    owned_resource_id: Some(resource),
                    last_probe_time: Some(at),
                    attempt_count: 1,
                    ..MonitorState::default()
                };
            }
            StateDelta::ProbeMissed { at } => {
                // successDetected never reverts within a session
                if self.success_detected {
                    return;
                }
                self.last_probe_time = Some(at);
                self.attempt_count = self.attempt_count.saturating_add(1);
                self.last_error = LastError::NotFound;
            }
            StateDelta::OutOfStock { at } => {
                if self.success_detected {
                    return;
                }
                self.last_probe_time = Some(at);
                self.last_error = LastError::OutOfStock;
            }
            StateDelta::Available { at, outcome } => {
                self.last_probe_time = Some(at);
                self.last_error = LastError::None;
                self.success_detected = true;
                self.purchase_attempted = outcome.is_some_and(PurchaseOutcome::attempted);
                self.purchase_completed = outcome == Some(PurchaseOutcome::AttemptedSucceeded);
            }
            StateDelta::ConfirmationReached => {
                if self.purchase_completed {
                    self.reached_confirmation = true;
                }
            }
            StateDelta::SessionEnded => {
                self.is_monitoring = false;
                self.owned_resource_id = None;
            }
            StateDelta::Reset => {
                *self = MonitorState::default();
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.is_monitoring && self.owned_resource_id.is_none()
    }
}

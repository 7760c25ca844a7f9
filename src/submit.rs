//! Feedback submission: payload, wire contract, and the sending state
//! machine.
//!
//! A submission runs on a worker thread; its outcome comes back over a
//! channel tagged with a generation counter. Completions that arrive after
//! the widget closed (or after a reset) carry a stale generation and are
//! dropped without touching any state.

use std::sync::mpsc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::page::PageLocation;

/// The header the original wire contract mandates, even though the body is
/// a JSON object. Endpoints built for this contract expect it verbatim.
const CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Submission lifecycle: `Idle -> Sending -> {Sent | Error}`; `Error` can
/// return to `Idle` via [`SubmissionController::back_to_form`], `Sent` is
/// terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Sending,
    Sent,
    Error,
}

/// The single POST body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub description: String,
    /// Data-URL-encoded PNG, or empty when the screenshot was excluded.
    pub screenshot: String,
    /// Page host.
    pub url: String,
    /// Page path.
    pub path: String,
}

impl FeedbackPayload {
    pub fn new(description: String, screenshot: String, location: &PageLocation) -> Self {
        Self {
            description,
            screenshot,
            url: location.host.clone(),
            path: location.path.clone(),
        }
    }
}

pub struct SubmissionController {
    client: reqwest::blocking::Client,
    endpoint: String,
    status: SubmitStatus,
    last_error: Option<String>,
    generation: u64,
    pending: Option<mpsc::Receiver<(u64, std::result::Result<(), String>)>>,
}

impl SubmissionController {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            status: SubmitStatus::Idle,
            last_error: None,
            generation: 0,
            pending: None,
        })
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start the single POST for this payload. Valid from `Idle` only.
    pub fn submit(&mut self, payload: FeedbackPayload) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::ConfigError("no submission endpoint configured".into()));
        }
        match self.status {
            SubmitStatus::Idle => {}
            SubmitStatus::Sending => {
                return Err(Error::SubmitError("a submission is already in flight".into()))
            }
            SubmitStatus::Sent => {
                return Err(Error::SubmitError("feedback was already sent".into()))
            }
            SubmitStatus::Error => {
                return Err(Error::SubmitError(
                    "return to the form before resubmitting".into(),
                ))
            }
        }

        let body = serde_json::to_string(&payload)
            .map_err(|e| Error::SubmitError(format!("payload serialization failed: {}", e)))?;

        self.generation += 1;
        let generation = self.generation;
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let (tx, rx) = mpsc::channel();
        self.pending = Some(rx);
        self.status = SubmitStatus::Sending;
        self.last_error = None;

        std::thread::spawn(move || {
            let outcome = match client
                .post(&endpoint)
                .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
                .body(body)
                .send()
            {
                Ok(resp) if resp.status().is_success() => Ok(()),
                Ok(resp) => Err(format!("failed to post data to {}: {}", endpoint, resp.status())),
                Err(e) => Err(format!("failed to post data to {}: {}", endpoint, e)),
            };
            // The receiver may be gone when the widget closed mid-flight.
            let _ = tx.send((generation, outcome));
        });

        Ok(())
    }

    /// Apply a completed outcome, if one arrived. Returns the new status
    /// when a transition happened.
    pub fn poll(&mut self) -> Option<SubmitStatus> {
        let received = match self.pending.as_ref() {
            Some(rx) => rx.try_recv(),
            None => return None,
        };
        match received {
            Ok((generation, outcome)) => {
                self.pending = None;
                if generation != self.generation {
                    return None;
                }
                Some(self.finish(outcome))
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.pending = None;
                Some(self.finish(Err("submission worker disconnected".into())))
            }
        }
    }

    /// Block until the in-flight submission resolves or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> SubmitStatus {
        if self.status != SubmitStatus::Sending {
            return self.status;
        }
        let Some(rx) = self.pending.take() else {
            return self.status;
        };
        match rx.recv_timeout(timeout) {
            Ok((generation, outcome)) => {
                if generation != self.generation {
                    self.status
                } else {
                    self.finish(outcome)
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.pending = Some(rx);
                self.status
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                self.finish(Err("submission worker disconnected".into()))
            }
        }
    }

    fn finish(&mut self, outcome: std::result::Result<(), String>) -> SubmitStatus {
        match outcome {
            Ok(()) => {
                self.status = SubmitStatus::Sent;
            }
            Err(msg) => {
                self.status = SubmitStatus::Error;
                self.last_error = Some(msg);
            }
        }
        self.status
    }

    /// Error view's "back" action: restore the form.
    pub fn back_to_form(&mut self) {
        if self.status == SubmitStatus::Error {
            self.status = SubmitStatus::Idle;
            self.last_error = None;
        }
    }

    /// Drop any in-flight completion and return to the initial state
    /// (widget close). A late completion from before the reset is ignored
    /// by its stale generation.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.status = SubmitStatus::Idle;
        self.last_error = None;
    }
}

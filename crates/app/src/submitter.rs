//! Local stand-in for the paint contract
//!
//! Runs as a background task. Each `placePixels` call is answered with an
//! outcome and, when confirmed, the `PixelPlaced` logs the chain would emit.
//! Used when no wallet or chain is available.

use pixelburn_ipc::{LooseUint, PixelPlacedLog, PlacePixelsCall, SubmissionOutcome};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Result of one submission as seen by the session driver
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReply {
    pub outcome: SubmissionOutcome,
    /// Logs to feed back into the session (empty unless confirmed)
    pub logs: Vec<PixelPlacedLog>,
}

struct SubmissionRequest {
    call: PlacePixelsCall,
    reply: oneshot::Sender<SubmissionReply>,
}

/// Handle used by the session driver to submit calls
#[derive(Clone)]
pub struct SubmitterHandle {
    tx: mpsc::UnboundedSender<SubmissionRequest>,
}

impl SubmitterHandle {
    /// Submit a call and wait for its outcome.
    ///
    /// If the submitter task is gone the call counts as failed.
    pub async fn submit(&self, call: PlacePixelsCall) -> SubmissionReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let gone = || SubmissionReply {
            outcome: SubmissionOutcome::Failed {
                reason: "submitter stopped".to_string(),
            },
            logs: Vec::new(),
        };

        if self
            .tx
            .send(SubmissionRequest {
                call,
                reply: reply_tx,
            })
            .is_err()
        {
            return gone();
        }
        reply_rx.await.unwrap_or_else(|_| gone())
    }
}

pub struct LocalSubmitter {
    user: String,
    fail: bool,
    rx: mpsc::UnboundedReceiver<SubmissionRequest>,
}

impl LocalSubmitter {
    /// Create a submitter and the handle that feeds it.
    ///
    /// With `fail` set every call is answered as failed.
    pub fn new(user: impl Into<String>, fail: bool) -> (Self, SubmitterHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let submitter = Self {
            user: user.into(),
            fail,
            rx,
        };
        (submitter, SubmitterHandle { tx })
    }

    /// Serve requests until every handle is dropped
    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            let reply = self.answer(&request.call);
            if request.reply.send(reply).is_err() {
                debug!("Submission caller went away");
            }
        }
        debug!("Local submitter stopped");
    }

    fn answer(&self, call: &PlacePixelsCall) -> SubmissionReply {
        if let Err(e) = call.validate() {
            return SubmissionReply {
                outcome: SubmissionOutcome::Failed {
                    reason: e.to_string(),
                },
                logs: Vec::new(),
            };
        }
        if self.fail {
            info!("Local submitter failing call with {} pixels", call.len());
            return SubmissionReply {
                outcome: SubmissionOutcome::Failed {
                    reason: "local submitter configured to fail".to_string(),
                },
                logs: Vec::new(),
            };
        }

        info!(
            "Local submitter placed {} pixels (cost {})",
            call.len(),
            call.cost
        );
        let logs = call
            .xs
            .iter()
            .zip(&call.ys)
            .zip(&call.colors)
            .map(|((&x, &y), &color)| PixelPlacedLog {
                user: self.user.clone(),
                x: LooseUint::Number(x as u64),
                y: LooseUint::Number(y as u64),
                color: LooseUint::Number(color as u64),
                log_index: None,
            })
            .collect();
        SubmissionReply {
            outcome: SubmissionOutcome::Confirmed,
            logs,
        }
    }
}

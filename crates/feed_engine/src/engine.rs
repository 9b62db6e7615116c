use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use feed_logging::{feed_debug, feed_warn};
use tokio_util::sync::CancellationToken;

use crate::driver::FeedClient;
use crate::tracking::TrackingParams;
use crate::{EngineEvent, FeedRequest, RequestId};

enum EngineCommand {
    Enqueue {
        request_id: RequestId,
        request: FeedRequest,
        token: CancellationToken,
    },
    UpdateTrackingList,
}

type TokenMap = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs requests on a background tokio runtime and reports completions over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    tokens: TokenMap,
}

impl EngineHandle {
    pub fn new(client: FeedClient, tracking: Arc<TrackingParams>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("feed-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let tokens: TokenMap = Arc::default();
        let client = Arc::new(client);
        let task_tokens = tokens.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let event_tx = event_tx.clone();
                match command {
                    EngineCommand::Enqueue {
                        request_id,
                        request,
                        token,
                    } => {
                        let client = client.clone();
                        let tokens = task_tokens.clone();
                        runtime.spawn(async move {
                            let event = match token.run_until_cancelled(client.execute(request)).await {
                                Some(result) => EngineEvent::Completed { request_id, result },
                                None => {
                                    feed_debug!("request {} cancelled", request_id);
                                    EngineEvent::Cancelled { request_id }
                                }
                            };
                            lock(&tokens).remove(&request_id);
                            let _ = event_tx.send(event);
                        });
                    }
                    EngineCommand::UpdateTrackingList => {
                        let tracking = tracking.clone();
                        runtime.spawn(async move {
                            let result = tracking
                                .update_tracking_list()
                                .await
                                .map_err(|err| {
                                    feed_warn!("tracking list update failed: {}", err);
                                    err.to_string()
                                });
                            let _ = event_tx.send(EngineEvent::TrackingListUpdated(result));
                        });
                    }
                }
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            tokens,
        })
    }

    pub fn enqueue(&self, request_id: RequestId, request: FeedRequest) {
        let token = CancellationToken::new();
        lock(&self.tokens).insert(request_id, token.clone());
        let _ = self.cmd_tx.send(EngineCommand::Enqueue {
            request_id,
            request,
            token,
        });
    }

    /// Abort a pending request. Returns false when it already finished or never existed.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        match lock(&self.tokens).get(&request_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn update_tracking_list(&self) {
        let _ = self.cmd_tx.send(EngineCommand::UpdateTrackingList);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn lock(tokens: &TokenMap) -> MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
    tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

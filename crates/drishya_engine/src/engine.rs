use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use drishya_core::{CrudRequest, RecordQuery, ReconnectPolicy, StatusUpdateEvent};
use drishya_logging::{drishya_debug, drishya_error};
use thiserror::Error;
use tokio::sync::mpsc as async_mpsc;

use crate::api::{ApiClient, RecordSource};
use crate::config::{ConfigError, EngineConfig};
use crate::live::LiveUpdateChannel;
use crate::session::SessionProvider;
use crate::transport::{Transport, WebSocketTransport};
use crate::{ApiError, EngineEvent};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Fetch(RecordQuery),
    Perform(CrudRequest),
    ConnectLive,
    DisconnectLive,
    Shutdown,
}

/// Runs all I/O on a dedicated thread with its own tokio runtime. Commands
/// go in through the handle; results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, session: Arc<dyn SessionProvider>) -> Result<Self, EngineError> {
        config.validate()?;
        let client = ApiClient::new(&config, session)?;
        let transport = WebSocketTransport::new(config.ws_url.clone());
        Self::with_parts(Arc::new(client), Arc::new(transport), config.reconnect)
    }

    /// Builds an engine from explicit parts, so tests can swap in fakes.
    pub fn with_parts(
        source: Arc<dyn RecordSource>,
        transport: Arc<dyn Transport>,
        policy: ReconnectPolicy,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("drishya-engine-worker")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("drishya-engine".to_string())
            .spawn(move || {
                runtime.block_on(serve(source, transport, policy, cmd_rx, event_tx));
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    pub fn fetch(&self, query: RecordQuery) {
        self.send(EngineCommand::Fetch(query));
    }

    pub fn perform(&self, request: CrudRequest) {
        self.send(EngineCommand::Perform(request));
    }

    pub fn connect_live(&self) {
        self.send(EngineCommand::ConnectLive);
    }

    pub fn disconnect_live(&self) {
        self.send(EngineCommand::DisconnectLive);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            drishya_error!("Engine thread is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                drishya_error!("Engine thread panicked");
            }
        }
    }
}

async fn serve(
    source: Arc<dyn RecordSource>,
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    mut commands: async_mpsc::UnboundedReceiver<EngineCommand>,
    events: mpsc::Sender<EngineEvent>,
) {
    let live = LiveUpdateChannel::spawn(transport, policy);
    let updates = events.clone();
    let _subscription = live.subscribe(move |event: &StatusUpdateEvent| {
        let _ = updates.send(EngineEvent::StatusUpdate(event.clone()));
    });

    let mut state_rx = live.watch_state();
    let state_events = events.clone();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            if state_events.send(EngineEvent::ConnectionChanged(state)).is_err() {
                break;
            }
        }
    });

    while let Some(command) = commands.recv().await {
        match command {
            EngineCommand::Fetch(query) => {
                let source = source.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    let event = match source.fetch(&query).await {
                        Ok(records) => EngineEvent::RecordsLoaded { query, records },
                        Err(error) => EngineEvent::RecordsFailed { query, error },
                    };
                    let _ = events.send(event);
                });
            }
            EngineCommand::Perform(request) => {
                let source = source.clone();
                let events = events.clone();
                tokio::spawn(async move {
                    let result = source.perform(&request).await;
                    let _ = events.send(EngineEvent::CrudFinished { request, result });
                });
            }
            EngineCommand::ConnectLive => live.connect(),
            EngineCommand::DisconnectLive => live.disconnect(),
            EngineCommand::Shutdown => break,
        }
    }
    live.close().await;
    drishya_debug!("Engine command loop stopped");
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use drishya_core::ConnectionState;
use drishya_engine::{Transport, TransportConnection, TransportError};
use tokio::sync::{mpsc, watch};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(drishya_logging::initialize_for_tests);
}

/// What a fake connection does next.
#[derive(Debug, Clone)]
pub enum Frame {
    Text(String),
    Close,
    Error(String),
}

enum Outcome {
    Refuse,
    Accept(mpsc::UnboundedReceiver<Frame>),
}

/// Transport whose connections are scripted by the test. Once the script
/// runs out every open is refused.
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Outcome>>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues an accepted connection; frames sent on the returned sender are
    /// delivered in order. Dropping the sender closes the connection.
    pub fn accept(&self) -> mpsc::UnboundedSender<Frame> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push_back(Outcome::Accept(rx));
        tx
    }

    pub fn refuse(&self) {
        self.lock().push_back(Outcome::Refuse);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Outcome>> {
        self.script.lock().unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(&self) -> Result<Box<dyn TransportConnection>, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let next = self.lock().pop_front().unwrap_or(Outcome::Refuse);
        match next {
            Outcome::Refuse => Err(TransportError::Connect("connection refused".to_string())),
            Outcome::Accept(frames) => Ok(Box::new(FakeConnection {
                frames,
                closes: self.closes.clone(),
            })),
        }
    }
}

struct FakeConnection {
    frames: mpsc::UnboundedReceiver<Frame>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl TransportConnection for FakeConnection {
    async fn next_text(&mut self) -> Result<Option<String>, TransportError> {
        match self.frames.recv().await {
            Some(Frame::Text(text)) => Ok(Some(text)),
            Some(Frame::Close) | None => Ok(None),
            Some(Frame::Error(message)) => Err(TransportError::Receive(message)),
        }
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn update_json(website_id: &str, status: &str) -> String {
    format!(r#"{{"websiteId":"{website_id}","status":"{status}"}}"#)
}

pub async fn wait_for_state(rx: &mut watch::Receiver<ConnectionState>, wanted: ConnectionState) {
    tokio::time::timeout(Duration::from_secs(30), rx.wait_for(|state| *state == wanted))
        .await
        .expect("state reached in time")
        .expect("channel driver alive");
}

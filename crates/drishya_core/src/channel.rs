//! Connection state machine for the live update channel.
//!
//! The machine never touches a socket. It consumes [`ChannelInput`]s and
//! answers with [`ChannelAction`]s that a driver carries out, so the retry
//! policy can be exercised without a server.
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Linear backoff: attempt `n` waits `base_delay * n`, up to `max_attempts`
/// consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelInput {
    ConnectRequested,
    DisconnectRequested,
    TransportOpened,
    /// The peer closed an open connection.
    TransportClosed,
    /// Opening failed, or the connection broke with an error.
    TransportFailed,
    RetryElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAction {
    OpenTransport,
    CloseTransport,
    ScheduleRetry { attempt: u32, delay: Duration },
    CancelRetry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMachine {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempts: u32,
    retry_pending: bool,
}

impl ChannelMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            attempts: 0,
            retry_pending: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect attempts scheduled since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn handle(&mut self, input: ChannelInput) -> Vec<ChannelAction> {
        match input {
            ChannelInput::ConnectRequested => self.on_connect_requested(),
            ChannelInput::DisconnectRequested => self.on_disconnect_requested(),
            ChannelInput::TransportOpened => self.on_opened(),
            ChannelInput::TransportClosed | ChannelInput::TransportFailed => self.on_lost(),
            ChannelInput::RetryElapsed => self.on_retry_elapsed(),
        }
    }

    fn on_connect_requested(&mut self) -> Vec<ChannelAction> {
        if self.state != ConnectionState::Disconnected {
            return Vec::new();
        }
        let mut actions = self.cancel_retry();
        self.attempts = 0;
        self.state = ConnectionState::Connecting;
        actions.push(ChannelAction::OpenTransport);
        actions
    }

    fn on_disconnect_requested(&mut self) -> Vec<ChannelAction> {
        let mut actions = self.cancel_retry();
        if self.state != ConnectionState::Disconnected {
            actions.push(ChannelAction::CloseTransport);
        }
        self.state = ConnectionState::Disconnected;
        actions
    }

    fn on_opened(&mut self) -> Vec<ChannelAction> {
        match self.state {
            ConnectionState::Connecting => {
                self.state = ConnectionState::Connected;
                self.attempts = 0;
                Vec::new()
            }
            // An open that lands after a disconnect is released at once.
            ConnectionState::Disconnected => vec![ChannelAction::CloseTransport],
            ConnectionState::Connected => Vec::new(),
        }
    }

    fn on_lost(&mut self) -> Vec<ChannelAction> {
        if self.state == ConnectionState::Disconnected {
            return Vec::new();
        }
        self.state = ConnectionState::Disconnected;
        if self.attempts >= self.policy.max_attempts {
            return Vec::new();
        }
        self.attempts += 1;
        self.retry_pending = true;
        vec![ChannelAction::ScheduleRetry {
            attempt: self.attempts,
            delay: self.policy.delay_for(self.attempts),
        }]
    }

    fn on_retry_elapsed(&mut self) -> Vec<ChannelAction> {
        if !self.retry_pending || self.state != ConnectionState::Disconnected {
            return Vec::new();
        }
        self.retry_pending = false;
        self.state = ConnectionState::Connecting;
        vec![ChannelAction::OpenTransport]
    }

    fn cancel_retry(&mut self) -> Vec<ChannelAction> {
        if self.retry_pending {
            self.retry_pending = false;
            vec![ChannelAction::CancelRetry]
        } else {
            Vec::new()
        }
    }
}

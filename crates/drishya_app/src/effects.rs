use std::time::Duration;

use chrono::{DateTime, Utc};
use drishya_core::{Effect, Msg};
use drishya_engine::{EngineEvent, EngineHandle};
use drishya_logging::drishya_debug;

/// Executes side effects returned by `update` on the engine and turns its
/// events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            drishya_debug!("Running effect {:?}", effect);
            match effect {
                Effect::FetchRecords(query) => self.engine.fetch(query),
                Effect::Perform(request) => self.engine.perform(request),
                Effect::ConnectLive => self.engine.connect_live(),
                Effect::DisconnectLive => self.engine.disconnect_live(),
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine
            .recv_timeout(timeout)
            .map(|event| to_msg(event, Utc::now()))
    }
}

pub fn to_msg(event: EngineEvent, received_at: DateTime<Utc>) -> Msg {
    match event {
        EngineEvent::RecordsLoaded { records, .. } => Msg::RecordsLoaded(records),
        EngineEvent::RecordsFailed { query, error } => Msg::RecordsFailed {
            view: query.view(),
            message: error.to_string(),
        },
        EngineEvent::CrudFinished { request, result } => Msg::CrudFinished {
            request,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::StatusUpdate(event) => Msg::StatusUpdated { event, received_at },
        EngineEvent::ConnectionChanged(state) => Msg::ConnectionChanged(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use drishya_core::{
        ConnectionState, CrudRequest, LiveStatus, RecordQuery, RecordSet, StatusUpdateEvent,
        ViewKind,
    };
    use drishya_engine::ApiError;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn failed_fetch_names_the_view() {
        let msg = to_msg(
            EngineEvent::RecordsFailed {
                query: RecordQuery::WebsiteScans {
                    website_id: "site-1".to_string(),
                },
                error: ApiError::Network("connection refused".to_string()),
            },
            at(),
        );
        let Msg::RecordsFailed { view, message } = msg else {
            panic!("expected RecordsFailed");
        };
        assert_eq!(view, ViewKind::Scans);
        assert!(message.contains("connection refused"), "{message}");
    }

    #[test]
    fn loaded_records_pass_through() {
        let msg = to_msg(
            EngineEvent::RecordsLoaded {
                query: RecordQuery::Projects,
                records: RecordSet::Projects(Vec::new()),
            },
            at(),
        );
        assert_eq!(msg, Msg::RecordsLoaded(RecordSet::Projects(Vec::new())));
    }

    #[test]
    fn crud_errors_become_text() {
        let request = CrudRequest::DeleteProject {
            id: "project-1".to_string(),
        };
        let msg = to_msg(
            EngineEvent::CrudFinished {
                request: request.clone(),
                result: Err(ApiError::HttpStatus {
                    status: 500,
                    message: "boom".to_string(),
                }),
            },
            at(),
        );
        let Msg::CrudFinished { request: got, result } = msg else {
            panic!("expected CrudFinished");
        };
        assert_eq!(got, request);
        assert!(result.is_err());
    }

    #[test]
    fn live_events_are_stamped() {
        let event = StatusUpdateEvent::new("site-1", LiveStatus::Scanning);
        assert_eq!(
            to_msg(EngineEvent::StatusUpdate(event.clone()), at()),
            Msg::StatusUpdated {
                event,
                received_at: at(),
            }
        );
        assert_eq!(
            to_msg(EngineEvent::ConnectionChanged(ConnectionState::Connected), at()),
            Msg::ConnectionChanged(ConnectionState::Connected)
        );
    }
}

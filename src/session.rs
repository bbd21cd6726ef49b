//! session.rs — Caller-side view state: Idle → Loading → Results | Error.
//!
//! Every `begin()` issues a fresh `RequestId`. A result can only land on the
//! request that is still current; anything else is stale and dropped, so a slow
//! response never overwrites a newer submit or a reset.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::debug;

use crate::error::AnalysisError;
use crate::report::MarketReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Loading { request: RequestId },
    Results(Arc<MarketReport>),
    Error { kind: &'static str, message: String },
}

/// Serializable snapshot for the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionView {
    Idle,
    Loading { request: RequestId },
    Results { report: MarketReport },
    Error { kind: String, message: String },
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    next_id: u64,
    current: Option<RequestId>,
}

#[derive(Debug)]
pub struct Session {
    inner: Mutex<Inner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                next_id: 1,
                current: None,
            }),
        }
    }

    /// Enter Loading for a new request; supersedes any pending one.
    pub fn begin(&self) -> RequestId {
        let mut g = self.inner.lock().expect("session mutex poisoned");
        let id = RequestId(g.next_id);
        g.next_id += 1;
        g.current = Some(id);
        g.state = SessionState::Loading { request: id };
        id
    }

    /// Apply a finished request. Returns `false` (and changes nothing) when
    /// `id` is no longer the current request.
    pub fn resolve(&self, id: RequestId, outcome: &Result<MarketReport, AnalysisError>) -> bool {
        let mut g = self.inner.lock().expect("session mutex poisoned");
        let is_current = g.current == Some(id)
            && matches!(g.state, SessionState::Loading { request } if request == id);
        if !is_current {
            debug!(target: "session", request = id.0, "stale result discarded");
            return false;
        }
        g.state = match outcome {
            Ok(report) => SessionState::Results(Arc::new(report.clone())),
            Err(e) => SessionState::Error {
                kind: e.kind(),
                message: e.to_string(),
            },
        };
        g.current = None;
        true
    }

    /// Like `begin`, but the returned handle clears Loading if it is dropped
    /// without being resolved (e.g. the caller's future was cancelled).
    pub fn begin_pending(self: &Arc<Self>) -> PendingRequest {
        PendingRequest {
            session: Arc::clone(self),
            id: self.begin(),
            settled: false,
        }
    }

    /// Return to Idle if `id` is still the one loading. Returns whether it was.
    pub fn abandon(&self, id: RequestId) -> bool {
        let mut g = self.inner.lock().expect("session mutex poisoned");
        if g.current != Some(id) {
            return false;
        }
        debug!(target: "session", request = id.0, "pending request abandoned");
        g.state = SessionState::Idle;
        g.current = None;
        true
    }

    /// Back to Idle. Pending requests become stale.
    pub fn reset(&self) {
        let mut g = self.inner.lock().expect("session mutex poisoned");
        g.state = SessionState::Idle;
        g.current = None;
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().expect("session mutex poisoned").state.clone()
    }

    pub fn view(&self) -> SessionView {
        match self.state() {
            SessionState::Idle => SessionView::Idle,
            SessionState::Loading { request } => SessionView::Loading { request },
            SessionState::Results(report) => SessionView::Results {
                report: (*report).clone(),
            },
            SessionState::Error { kind, message } => SessionView::Error {
                kind: kind.to_string(),
                message,
            },
        }
    }
}

/// A request in flight. Resolve it explicitly; dropping it unresolved abandons it.
#[derive(Debug)]
pub struct PendingRequest {
    session: Arc<Session>,
    id: RequestId,
    settled: bool,
}

impl PendingRequest {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn resolve(mut self, outcome: &Result<MarketReport, AnalysisError>) -> bool {
        self.settled = true;
        self.session.resolve(self.id, outcome)
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if !self.settled {
            self.session.abandon(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Tier;

    fn report(subject: &str) -> MarketReport {
        MarketReport {
            subject: subject.into(),
            summary: "s".into(),
            keywords: vec![],
            sources: vec![],
            generated_at: "now".into(),
            tier: Tier::Structured,
        }
    }

    #[test]
    fn happy_path_reaches_results() {
        let s = Session::new();
        assert_eq!(s.state(), SessionState::Idle);
        let id = s.begin();
        assert!(matches!(s.state(), SessionState::Loading { .. }));
        assert!(s.resolve(id, &Ok(report("Baker"))));
        match s.state() {
            SessionState::Results(r) => assert_eq!(r.subject, "Baker"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn failure_reaches_error_with_message() {
        let s = Session::new();
        let id = s.begin();
        assert!(s.resolve(id, &Err(AnalysisError::ExtractionFailure)));
        match s.view() {
            SessionView::Error { kind, message } => {
                assert_eq!(kind, "extraction_failure");
                assert!(message.contains("structured data"));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn resubmit_makes_older_result_stale() {
        let s = Session::new();
        let first = s.begin();
        let second = s.begin();
        assert!(first < second);
        assert!(!s.resolve(first, &Ok(report("old"))));
        assert_eq!(s.state(), SessionState::Loading { request: second });
        assert!(s.resolve(second, &Ok(report("new"))));
        // a late duplicate of the same id is ignored too
        assert!(!s.resolve(second, &Ok(report("dup"))));
        match s.state() {
            SessionState::Results(r) => assert_eq!(r.subject, "new"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn reset_discards_pending_result() {
        let s = Session::new();
        let id = s.begin();
        s.reset();
        assert!(!s.resolve(id, &Err(AnalysisError::RateLimited)));
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn dropped_pending_request_returns_to_idle() {
        let s = Arc::new(Session::new());
        let pending = s.begin_pending();
        assert_eq!(s.state(), SessionState::Loading { request: pending.id() });
        drop(pending);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn dropped_stale_request_leaves_newer_one_loading() {
        let s = Arc::new(Session::new());
        let older = s.begin_pending();
        let newer = s.begin_pending();
        drop(older);
        assert_eq!(s.state(), SessionState::Loading { request: newer.id() });
        assert!(newer.resolve(&Ok(report("new"))));
        assert!(matches!(s.state(), SessionState::Results(_)));
    }

    #[test]
    fn view_serializes_with_state_tag() {
        let s = Session::new();
        let v = serde_json::to_value(s.view()).unwrap();
        assert_eq!(v["state"], "idle");
        s.begin();
        let v = serde_json::to_value(s.view()).unwrap();
        assert_eq!(v["state"], "loading");
        assert_eq!(v["request"], 1);
    }
}

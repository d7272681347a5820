//! Scripted in-memory [`Backend`] for unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use console_core::error::{ConsoleError, Result};
use console_core::models::{Credential, Session};

use crate::backend::{Backend, Response};

/// One scripted reply. Queues fall back to `Ok(empty)` once drained.
pub(crate) enum Reply<T> {
    Ok(T),
    Rejected(u16),
    Fault,
    Delayed(Duration, T),
}

pub(crate) struct FakeBackend {
    sessions: Mutex<VecDeque<Reply<Vec<Session>>>>,
    credentials: Mutex<VecDeque<Reply<Vec<Credential>>>>,
    terminate: Mutex<VecDeque<Reply<()>>>,
    /// Extra latency applied to every call.
    delay: Option<Duration>,
    session_calls: AtomicUsize,
    terminated: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
            credentials: Mutex::new(VecDeque::new()),
            terminate: Mutex::new(VecDeque::new()),
            delay: None,
            session_calls: AtomicUsize::new(0),
            terminated: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn push_sessions(&self, reply: Reply<Vec<Session>>) {
        self.sessions.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_credentials(&self, reply: Reply<Vec<Credential>>) {
        self.credentials.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_terminate(&self, reply: Reply<()>) {
        self.terminate.lock().unwrap().push_back(reply);
    }

    pub(crate) fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    /// Session ids passed to `terminate_session`, in call order.
    pub(crate) fn terminated(&self) -> Vec<String> {
        self.terminated.lock().unwrap().clone()
    }
}

async fn resolve<T>(reply: Reply<T>, delay: Option<Duration>) -> Result<Response<T>> {
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
    match reply {
        Reply::Ok(v) => Ok(Response::Ok(v)),
        Reply::Rejected(status) => Ok(Response::Rejected(status)),
        Reply::Fault => Err(ConsoleError::Transport {
            url: "fake://backend".to_string(),
            reason: "connection refused".to_string(),
        }),
        Reply::Delayed(d, v) => {
            tokio::time::sleep(d).await;
            Ok(Response::Ok(v))
        }
    }
}

impl Backend for FakeBackend {
    fn list_sessions(&self) -> impl Future<Output = Result<Response<Vec<Session>>>> + Send {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .sessions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Ok(Vec::new()));
        resolve(reply, self.delay)
    }

    fn list_credentials(&self) -> impl Future<Output = Result<Response<Vec<Credential>>>> + Send {
        let reply = self
            .credentials
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Ok(Vec::new()));
        resolve(reply, self.delay)
    }

    fn terminate_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Response<()>>> + Send {
        self.terminated.lock().unwrap().push(session_id.to_string());
        let reply = self
            .terminate
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Ok(()));
        resolve(reply, self.delay)
    }
}

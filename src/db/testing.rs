//! Scriptable transport stub shared by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::connection::ConnectionConfig;
use super::driver::{OpenOptions, Session, Transport};
use super::error::{ConnectionError, Result};

/// What the stub should do at each step
#[derive(Debug, Clone, Default)]
pub struct StubBehavior {
    pub fail_open: bool,
    pub fail_ping: bool,
    pub database_present: bool,
    pub fail_create: bool,
}

#[derive(Default)]
struct Counters {
    opens: AtomicU32,
    pings: AtomicU32,
    exists_queries: AtomicU32,
    creates: AtomicU32,
    closes: AtomicU32,
}

/// Snapshot of how often each transport operation ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub opens: u32,
    pub pings: u32,
    pub exists_queries: u32,
    pub creates: u32,
    pub closes: u32,
}

pub struct StubTransport {
    behavior: StubBehavior,
    counters: Arc<Counters>,
    opened_with: Mutex<Vec<OpenOptions>>,
}

impl StubTransport {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            counters: Arc::new(Counters::default()),
            opened_with: Mutex::new(Vec::new()),
        })
    }

    pub fn counts(&self) -> CallCounts {
        CallCounts {
            opens: self.counters.opens.load(Ordering::SeqCst),
            pings: self.counters.pings.load(Ordering::SeqCst),
            exists_queries: self.counters.exists_queries.load(Ordering::SeqCst),
            creates: self.counters.creates.load(Ordering::SeqCst),
            closes: self.counters.closes.load(Ordering::SeqCst),
        }
    }

    pub fn opened_with(&self) -> Vec<OpenOptions> {
        self.opened_with.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn open(
        &self,
        _config: &ConnectionConfig,
        options: OpenOptions,
    ) -> Result<Box<dyn Session>> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        self.opened_with.lock().unwrap().push(options);
        if self.behavior.fail_open {
            return Err(ConnectionError::Failed("connect ECONNREFUSED".into()));
        }
        Ok(Box::new(StubSession {
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
        }))
    }
}

struct StubSession {
    behavior: StubBehavior,
    counters: Arc<Counters>,
}

#[async_trait]
impl Session for StubSession {
    async fn ping(&mut self) -> Result<()> {
        self.counters.pings.fetch_add(1, Ordering::SeqCst);
        if self.behavior.fail_ping {
            return Err(ConnectionError::Failed("server has gone away".into()));
        }
        Ok(())
    }

    async fn database_exists(&mut self, _name: &str) -> Result<bool> {
        self.counters.exists_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.behavior.database_present)
    }

    async fn create_database(&mut self, _name: &str) -> Result<()> {
        self.counters.creates.fetch_add(1, Ordering::SeqCst);
        if self.behavior.fail_create {
            return Err(ConnectionError::CreationFailed(
                "Access denied for user 'root'@'localhost' to database 'app_db'".into(),
            ));
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

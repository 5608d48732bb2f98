//! In-memory stand-in for the MongoDB driver.
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mongo_bootstrap::bson::Document;
use mongo_bootstrap::{DbClient, DbHandle, Driver, Error, IndexSpec, Operation};
use mongodb::error::Error as DBError;
use tracing::Level;
use tracing::subscriber::DefaultGuard;

#[derive(Debug, Default)]
pub struct FakeState {
    /// Collections in creation order.
    pub collections: Vec<(String, Vec<Document>)>,
    pub indexes: Vec<(String, Document)>,
    /// Every database call, as `"<operation> <target>"`.
    pub calls: Vec<String>,
    pub connects: usize,
    pub closes: usize,
    pub fail_connect: bool,
    pub fail_close: bool,
    pub fail_on: Option<(Operation, String)>,
    /// Acknowledge at most this many documents per insert.
    pub insert_cap: Option<usize>,
}

impl FakeState {
    pub fn documents(&self, collection: &str) -> Option<&[Document]> {
        self.collections
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, documents)| documents.as_slice())
    }

    pub fn calls_for(&self, operation: Operation) -> Vec<&str> {
        let prefix = format!("{operation} ");
        self.calls
            .iter()
            .filter_map(|call| call.strip_prefix(&prefix))
            .collect()
    }

    fn collection_mut(&mut self, collection: &str) -> &mut Vec<Document> {
        let position = match self.collections.iter().position(|(name, _)| name == collection) {
            Some(position) => position,
            None => {
                self.collections.push((collection.to_string(), Vec::new()));
                self.collections.len() - 1
            }
        };
        &mut self.collections[position].1
    }

    fn record(&mut self, operation: Operation, target: &str) -> Result<(), Error> {
        self.calls.push(format!("{operation} {target}"));
        match &self.fail_on {
            Some((op, name)) if *op == operation && name == target => {
                Err(Error::db(operation, target, injected("operation failed")))
            }
            _ => Ok(()),
        }
    }
}

pub fn injected(message: &str) -> DBError {
    DBError::from(std::io::Error::other(message.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, name: &str, documents: Vec<Document>) -> Self {
        self.state()
            .collections
            .push((name.to_string(), documents));
        self
    }

    pub fn failing_on(self, operation: Operation, target: &str) -> Self {
        self.state().fail_on = Some((operation, target.to_string()));
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Client = FakeClient;

    async fn connect(&self, _uri: &str) -> Result<FakeClient, Error> {
        let mut state = self.state();
        if state.fail_connect {
            return Err(Error::ConnectionError(injected("connection refused")));
        }
        state.connects += 1;
        Ok(FakeClient {
            state: self.state.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[derive(Debug)]
pub struct FakeClient {
    state: Arc<Mutex<FakeState>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl DbClient for FakeClient {
    type Database = FakeDatabase;

    fn database(&self, name: &str) -> FakeDatabase {
        FakeDatabase {
            name: name.to_string(),
            state: self.state.clone(),
            closed: self.closed.clone(),
        }
    }

    async fn close(self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        self.closed.store(true, Ordering::SeqCst);
        if state.fail_close {
            return Err(Error::CloseError(injected("close failed")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FakeDatabase {
    name: String,
    state: Arc<Mutex<FakeState>>,
    closed: Arc<AtomicBool>,
}

impl FakeDatabase {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn open_state(&self, operation: Operation, target: &str) -> Result<MutexGuard<'_, FakeState>, Error> {
        if self.is_closed() {
            return Err(Error::db(operation, target, injected("client is closed")));
        }
        let mut state = self.state.lock().unwrap();
        state.record(operation, target)?;
        Ok(state)
    }
}

#[async_trait]
impl DbHandle for FakeDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, Error> {
        let state = self.open_state(Operation::ListCollections, &self.name)?;
        Ok(state.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn create_collection(&self, name: &str) -> Result<(), Error> {
        let mut state = self.open_state(Operation::CreateCollection, name)?;
        if state.documents(name).is_some() {
            return Err(Error::db(
                Operation::CreateCollection,
                name,
                injected("collection already exists"),
            ));
        }
        state.collections.push((name.to_string(), Vec::new()));
        Ok(())
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<(), Error> {
        let mut state = self.open_state(Operation::CreateIndex, collection)?;
        state.collection_mut(collection);
        state.indexes.push((collection.to_string(), index.keys.clone()));
        Ok(())
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, Error> {
        let mut state = self.open_state(Operation::DeleteMany, collection)?;
        let documents = state.collection_mut(collection);
        let deleted = documents.len() as u64;
        documents.clear();
        Ok(deleted)
    }

    async fn insert_many(&self, collection: &str, documents: &[Document]) -> Result<usize, Error> {
        let mut state = self.open_state(Operation::InsertMany, collection)?;
        let accepted = state.insert_cap.map_or(documents.len(), |cap| cap.min(documents.len()));
        state
            .collection_mut(collection)
            .extend(documents[..accepted].iter().cloned());
        Ok(accepted)
    }
}

/// Log lines written while the returned guard is alive on this thread.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn start(max_level: Level) -> (Self, DefaultGuard) {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

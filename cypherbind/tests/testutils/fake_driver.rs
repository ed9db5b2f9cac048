//! Scripted driver: replays queued row sets and records every executed
//! statement, so tests can assert on the exact wire text and parameters.

use async_trait::async_trait;
use cypherbind::{CypherValue, DriverError, GraphDriver, Row, RowStream, TransactionHandle};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One recorded statement execution
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub text: String,
    pub parameters: Vec<(String, CypherValue)>,
    pub transaction: Option<String>,
}

/// In-memory driver that replays queued responses in order
///
/// Each `run` call consumes the next queued row set; with nothing queued
/// it streams an empty result.
#[derive(Default)]
pub struct ScriptedDriver {
    responses: Mutex<VecDeque<Vec<Row>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the rows the next statement execution will stream
    pub fn enqueue(&self, rows: Vec<Row>) {
        self.responses.lock().push_back(rows);
    }

    /// Every statement executed so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// The most recently executed statement
    pub fn last_call(&self) -> RecordedCall {
        self.calls
            .lock()
            .last()
            .cloned()
            .expect("no statement was executed")
    }
}

struct ScriptedStream {
    rows: VecDeque<Row>,
}

#[async_trait]
impl RowStream for ScriptedStream {
    async fn next_row(&mut self) -> Result<Option<Row>, DriverError> {
        Ok(self.rows.pop_front())
    }
}

#[async_trait]
impl GraphDriver for ScriptedDriver {
    async fn run(
        &self,
        statement: &str,
        parameters: &[(String, CypherValue)],
        transaction: Option<&TransactionHandle>,
    ) -> Result<Box<dyn RowStream>, DriverError> {
        self.calls.lock().push(RecordedCall {
            text: statement.to_string(),
            parameters: parameters.to_vec(),
            transaction: transaction.map(|tx| tx.id().to_string()),
        });
        let rows = self.responses.lock().pop_front().unwrap_or_default();
        Ok(Box::new(ScriptedStream { rows: rows.into() }))
    }
}

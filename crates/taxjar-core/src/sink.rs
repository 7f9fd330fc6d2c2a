//! Consumer side of an extraction run.

use crate::domain::TransactionRecord;

/// Receives records one at a time, in fetch order.
///
/// A sink owns everything after emission: serialization, validation and
/// persistence. Returning an error aborts the run.
pub trait RecordSink {
    fn emit(&mut self, record: TransactionRecord) -> Result<(), SinkError>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn emit(&mut self, record: TransactionRecord) -> Result<(), SinkError> {
        (**self).emit(record)
    }
}

/// Failure reported by a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// In-memory sink for embedding and tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Vec<TransactionRecord>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

impl RecordSink for CollectingSink {
    fn emit(&mut self, record: TransactionRecord) -> Result<(), SinkError> {
        self.records.push(record);
        Ok(())
    }
}

//! NDJSON message writer for the `transactions` stream.
//!
//! | Message | When |
//! |---------|------|
//! | `SCHEMA` | Once, before the first record |
//! | `RECORD` | Once per emitted transaction |
//!
//! Every line is flushed as soon as it is written.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use taxjar_core::schema::{catalog, transactions_schema, KEY_PROPERTIES, STREAM_NAME};
use taxjar_core::{RecordSink, SinkError, TransactionRecord};
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
enum Message<'a> {
    Schema {
        stream: &'a str,
        schema: Value,
        key_properties: &'a [&'a str],
    },
    Record {
        stream: &'a str,
        record: &'a TransactionRecord,
        #[serde(with = "time::serde::rfc3339")]
        time_extracted: OffsetDateTime,
    },
}

/// Writes stream messages to `writer`, one JSON object per line.
pub struct MessageWriter<W: Write> {
    writer: W,
    schema_written: bool,
    records_written: u64,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            schema_written: false,
            records_written: 0,
        }
    }

    /// Writes the `SCHEMA` message unless it already went out.
    pub fn write_schema(&mut self) -> Result<(), SinkError> {
        if self.schema_written {
            return Ok(());
        }

        self.write_line(&Message::Schema {
            stream: STREAM_NAME,
            schema: transactions_schema(),
            key_properties: KEY_PROPERTIES,
        })?;
        self.schema_written = true;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, message: &Message<'_>) -> Result<(), SinkError> {
        let payload = serde_json::to_string(message)?;
        self.writer.write_all(payload.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> RecordSink for MessageWriter<W> {
    fn emit(&mut self, record: TransactionRecord) -> Result<(), SinkError> {
        self.write_schema()?;
        self.write_line(&Message::Record {
            stream: STREAM_NAME,
            record: &record,
            time_extracted: OffsetDateTime::now_utc(),
        })?;
        self.records_written += 1;
        Ok(())
    }
}

/// Pretty-printed discovery catalog.
pub fn write_catalog(mut writer: impl Write) -> Result<(), SinkError> {
    serde_json::to_writer_pretty(&mut writer, &catalog())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

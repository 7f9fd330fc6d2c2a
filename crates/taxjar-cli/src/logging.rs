use std::io::stderr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

pub fn setup_logging(level: LevelFilter) {
    // stdout carries the record stream, so logs go to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

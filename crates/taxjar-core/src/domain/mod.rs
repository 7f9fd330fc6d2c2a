//! # Domain Models
//!
//! Values that flow through an extraction run.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OrderReference`] | Opaque id returned by the per-day order list |
//! | [`TransactionRecord`] | Order detail object handed to the sink unchanged |
//! | [`ListedOrder`] | One list entry: a reference or a blank string |
//! | [`DetailOutcome`] | Result of one detail fetch: emitted or skipped |
//! | [`SkipReason`] | Why a reference produced no record |

mod models;

pub use models::{DetailOutcome, ListedOrder, OrderReference, SkipReason, TransactionRecord};

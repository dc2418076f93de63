#![doc(test(attr(deny(warnings))))]

//! Flux Tracker keeps a personal ledger of salaries, one-time and installment
//! payments, and categories, and derives month views and summaries from it.

pub mod advice;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use crate::core::{LedgerError, LedgerStore, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Flux Tracker tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}

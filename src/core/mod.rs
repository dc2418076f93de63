pub mod errors;
pub mod ledger_store;
pub mod services;
pub mod utils;

pub use errors::{LedgerError, Result};
pub use ledger_store::LedgerStore;

//! npass: a single-file encrypted password store with an interactive shell.

pub mod cli;
pub mod codec;
pub mod crypto;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod interactive;
pub mod models;
pub mod prompt;
pub mod security;
pub mod session;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use codec::VaultCodec;
pub use dispatcher::{Dispatcher, Reply, Status, View};
pub use error::{Result, VaultError};
pub use models::{Credential, Entry};
pub use session::SessionContext;
pub use store::EntryStore;

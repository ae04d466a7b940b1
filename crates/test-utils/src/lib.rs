//! Signing enclaves, a provider and an in-memory brick store for tests.

mod keyring;
mod provider;
mod store;

pub use crate::keyring::{FailingEnclave, Keyring, RecordingEnclave};
pub use crate::provider::TestProvider;
pub use crate::store::MemoryStore;

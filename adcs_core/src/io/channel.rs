// adcs_core/src/io/channel.rs

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::ChannelError;

/// A byte-oriented key-value store reachable from the simulator.
pub trait CommandChannel: Debug + Send {
    /// Returns the value under `key`, or `None` when nothing is stored.
    fn fetch(&mut self, key: &str) -> Result<Option<Vec<u8>>, ChannelError>;

    fn store(&mut self, key: &str, value: &[u8]) -> Result<(), ChannelError>;
}

/// In-process channel. Clones share the same map, so one handle can play
/// the flight software while another is owned by the torque source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChannel {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, key: impl Into<String>, value: Vec<u8>) {
        self.entries().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.entries().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl CommandChannel for InMemoryChannel {
    fn fetch(&mut self, key: &str) -> Result<Option<Vec<u8>>, ChannelError> {
        Ok(self.entries().get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &[u8]) -> Result<(), ChannelError> {
        self.insert(key, value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let writer = InMemoryChannel::new();
        let mut reader = writer.clone();

        assert_eq!(reader.fetch("k").unwrap(), None);
        writer.insert("k", vec![1, 2, 3]);
        assert_eq!(reader.fetch("k").unwrap(), Some(vec![1, 2, 3]));

        reader.store("k", &[4]).unwrap();
        assert_eq!(writer.remove("k"), Some(vec![4]));
        assert!(writer.is_empty());
    }
}

//! Mock hardware adapter for integration tests.
//!
//! Records every pin write and storage access so tests can assert on the
//! full command history without touching real GPIO/PWM registers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use zonedrive::app::events::AppEvent;
use zonedrive::app::ports::{
    ConfigError, ConfigPort, EventSink, OutputPin, StorageError, StoragePort,
};
use zonedrive::config::SystemConfig;

// ── Shared-handle pin ─────────────────────────────────────────

/// The driver owns one clone, the test keeps the other and reads back
/// every level written.
#[derive(Clone)]
pub struct SharedPin {
    inner: Rc<RefCell<PinRecord>>,
}

struct PinRecord {
    level: f32,
    writes: u32,
}

#[allow(dead_code)]
impl SharedPin {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PinRecord {
                level: 0.0,
                writes: 0,
            })),
        }
    }

    pub fn level(&self) -> f32 {
        self.inner.borrow().level
    }

    pub fn writes(&self) -> u32 {
        self.inner.borrow().writes
    }
}

impl Default for SharedPin {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPin for SharedPin {
    fn set_level(&mut self, level: f32) {
        let mut rec = self.inner.borrow_mut();
        rec.level = level.clamp(0.0, 1.0);
        rec.writes += 1;
    }
}

// ── MockNvs ───────────────────────────────────────────────────

pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    /// When set, every write fails with `IoError` (flash-wear fault sim).
    pub fail_writes: bool,
    pub write_count: u32,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            fail_writes: false,
            write_count: 0,
        }
    }
}

impl Default for MockNvs {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let k = format!("{}::{}", namespace, key);
        match self.store.get(&k) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        let k = format!("{}::{}", namespace, key);
        self.store.insert(k, data.to_vec());
        self.write_count += 1;
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        Ok(SystemConfig::default())
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Every `(key, open)` pair from `ValvePositionReached` events, in order.
    pub fn positions_reached(&self) -> Vec<(&'static str, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ValvePositionReached { key, open } => Some((*key, *open)),
                _ => None,
            })
            .collect()
    }

    /// Every `(key, opening)` pair from `ValveTransitionStarted` events.
    pub fn transitions_started(&self) -> Vec<(&'static str, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ValveTransitionStarted { key, opening } => Some((*key, *opening)),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

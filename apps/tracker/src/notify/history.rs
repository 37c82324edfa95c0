use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::notify::transport::DeliveryMethod;

pub const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub method: DeliveryMethod,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub detail: String,
}

/// Bounded, oldest-first-evicted log of delivery attempts.
#[derive(Debug)]
pub struct NotificationHistory {
    capacity: usize,
    records: Mutex<VecDeque<NotificationRecord>>,
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl NotificationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity + 1)),
        }
    }

    pub fn record(&self, record: NotificationRecord) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push_back(record);
        if records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

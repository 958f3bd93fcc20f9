//! Create-only registrant store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("full name is required")]
    MissingName,

    #[error("registrant store is unavailable")]
    Unavailable,
}

/// A registration before it has been stored.
#[derive(Debug, Clone, Default)]
pub struct NewRegistrant {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub disability_type: String,
    pub support_needs: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registrant {
    pub id: u64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub disability_type: String,
    pub support_needs: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

pub trait RegistrantStore: Send + Sync {
    fn create(&self, new: NewRegistrant) -> Result<Registrant, StoreError>;
}

/// In-process store. Ids start at 1.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Registrant>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored registrants. A poisoned lock is `Unavailable`, as in `create`.
    pub fn count(&self) -> Result<usize, StoreError> {
        self.rows
            .lock()
            .map(|rows| rows.len())
            .map_err(|_| StoreError::Unavailable)
    }
}

impl RegistrantStore for MemoryStore {
    fn create(&self, new: NewRegistrant) -> Result<Registrant, StoreError> {
        let full_name = new.full_name.trim();
        if full_name.is_empty() {
            return Err(StoreError::MissingName);
        }

        let mut rows = self.rows.lock().map_err(|_| StoreError::Unavailable)?;
        let registrant = Registrant {
            id: rows.len() as u64 + 1,
            full_name: full_name.to_string(),
            email: new.email,
            phone: new.phone,
            address: new.address,
            city: new.city,
            country: new.country,
            disability_type: new.disability_type,
            support_needs: new.support_needs,
            latitude: new.latitude,
            longitude: new.longitude,
            created_at: Utc::now(),
        };
        rows.push(registrant.clone());
        Ok(registrant)
    }
}

//! Ordered in-memory CRUD over uniquely-identified named records.
//!
//! One registry per reference collection (responsibles, product types, item
//! catalog, conservation types). Insertion order is preserved; it is also
//! the order the collection is persisted and displayed in.

use anyhow::{bail, Result};

use crate::models::NamedRecord;

#[derive(Debug, Clone, Default)]
pub struct Registry<T: NamedRecord> {
    records: Vec<T>,
}

impl<T: NamedRecord> Registry<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.records.iter_mut().find(|record| record.id() == id)
    }

    /// First record whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.records.iter().find(|record| record.name() == name)
    }

    /// Append a record. The name is trimmed and must be non-empty; the id
    /// must not collide with an existing record.
    pub fn insert(&mut self, mut record: T) -> Result<()> {
        let trimmed = record.name().trim().to_string();
        if trimmed.is_empty() {
            bail!("record name must not be blank");
        }
        if self.get(record.id()).is_some() {
            bail!("duplicate record id '{}'", record.id());
        }
        record.set_name(trimmed);
        self.records.push(record);
        Ok(())
    }

    /// Rename an existing record, trimming the new name.
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            bail!("record name must not be blank");
        }
        match self.get_mut(id) {
            Some(record) => {
                record.set_name(trimmed.to_string());
                Ok(())
            }
            None => bail!("no record with id '{id}'"),
        }
    }

    /// Remove a record by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        self.records.len() != before
    }
}

use dashmap::{mapref::entry::Entry, DashMap};
use derive_more::Display;
use diesel::{
    pg::PgConnection,
    prelude::*,
    r2d2::ConnectionManager,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::schema::notes::dsl::{id, notes, record};

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Display)]
pub enum BackendError {
    #[display(fmt = "pooling error: {}", _0)]
    Pool(r2d2::Error),
    #[display(fmt = "diesel error: {}", _0)]
    Database(DieselError),
    #[display(fmt = "migration error: {}", _0)]
    Migration(String),
}

impl std::error::Error for BackendError {}

impl From<r2d2::Error> for BackendError {
    fn from(e: r2d2::Error) -> BackendError {
        BackendError::Pool(e)
    }
}

impl From<DieselError> for BackendError {
    fn from(e: DieselError) -> BackendError {
        BackendError::Database(e)
    }
}

/// Durable byte-string key/value storage. Every call is atomic for the one
/// key it touches and nothing spans more than one key.
pub trait Backend: Send + Sync {
    /// `Ok(None)` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Stores `value` only if `key` is free. Returns whether it was stored,
    /// `false` means someone else already holds the key.
    fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, BackendError>;

    /// Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), BackendError>;
}

/// Process-local backend, nothing survives a restart.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, BackendError> {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value.to_vec());
                Ok(true)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// PostgreSQL-backed storage, one `notes` row per key.
pub struct PgBackend {
    pool: Pool,
}

impl PgBackend {
    /// Builds the connection pool and brings the schema up to date.
    pub fn connect(database_url: &str) -> Result<Self, BackendError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder().build(manager)?;

        let mut pooled = pool.get()?;
        let connection: &mut PgConnection = &mut pooled;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| BackendError::Migration(e.to_string()))?;
        log::info!("applied {} pending migration(s)", applied.len());

        Ok(PgBackend { pool })
    }
}

impl Backend for PgBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut connection = self.pool.get()?;

        let value = notes
            .find(key)
            .select(record)
            .first::<Vec<u8>>(&mut connection)
            .optional()?;
        Ok(value)
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, BackendError> {
        let mut connection = self.pool.get()?;

        match diesel::insert_into(notes)
            .values((id.eq(key), record.eq(value)))
            .execute(&mut connection)
        {
            Ok(_) => Ok(true),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut connection = self.pool.get()?;

        diesel::delete(notes.find(key)).execute(&mut connection)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn missing_key_reads_as_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nope").unwrap(), None);
    }

    #[test]
    fn put_if_absent_never_overwrites() {
        let backend = MemoryBackend::new();
        assert!(backend.put_if_absent("abc", b"first").unwrap());
        assert!(!backend.put_if_absent("abc", b"second").unwrap());
        assert_eq!(backend.get("abc").unwrap(), Some(b"first".to_vec()));
    }

    #[test]
    fn delete_frees_the_key() {
        let backend = MemoryBackend::new();
        backend.put_if_absent("abc", b"value").unwrap();
        backend.delete("abc").unwrap();
        assert_eq!(backend.get("abc").unwrap(), None);
        backend.delete("abc").unwrap();
        assert!(backend.put_if_absent("abc", b"again").unwrap());
    }

    #[test]
    fn concurrent_claims_have_a_single_winner() {
        let backend = Arc::new(MemoryBackend::new());
        let handles: Vec<_> = (0..16)
            .map(|n| {
                let backend = Arc::clone(&backend);
                std::thread::spawn(move || {
                    backend
                        .put_if_absent("contested", n.to_string().as_bytes())
                        .unwrap()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|stored| *stored)
            .count();
        assert_eq!(winners, 1);
    }
}

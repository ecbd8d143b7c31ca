//! Owner persistence port and its Postgres adapter.
//!
//! The existence check and the insert are not wrapped in a transaction;
//! correctness under concurrent registrations depends on the UNIQUE
//! constraint on `owners.email` (see `db/schema.sql`). A unique-violation on
//! insert is translated into [`CreateOwnerError::DuplicateEmail`] so callers
//! see the same failure the pre-check would have returned.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{error::ErrorKind, PgPool};
use std::sync::Arc;

/// A persisted owner row. `password` holds the bcrypt digest, never
/// plaintext.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Owner {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

/// Row to insert at registration. `phone` is not collected by the schema and
/// is seeded empty.
#[derive(Debug)]
pub struct NewOwner {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug)]
pub enum CreateOwnerError {
    /// The unique constraint on `owners.email` rejected the insert.
    DuplicateEmail,
    Store(anyhow::Error),
}

pub type DynOwnerStore = Arc<dyn OwnerStore>;

#[async_trait]
pub trait OwnerStore: Send + Sync {
    async fn owner_by_email(&self, email: &str) -> Result<Option<Owner>>;

    async fn create_owner(&self, owner: NewOwner) -> Result<(), CreateOwnerError>;
}

#[derive(Clone)]
pub struct PgOwnerStore {
    pool: PgPool,
}

impl PgOwnerStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerStore for PgOwnerStore {
    async fn owner_by_email(&self, email: &str) -> Result<Option<Owner>> {
        sqlx::query_as::<_, Owner>(
            "SELECT email, password, name, phone FROM owners WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch owner by email")
    }

    async fn create_owner(&self, owner: NewOwner) -> Result<(), CreateOwnerError> {
        match sqlx::query("INSERT INTO owners (email, password, name, phone) VALUES ($1, $2, $3, $4)")
            .bind(&owner.email)
            .bind(&owner.password)
            .bind(&owner.name)
            .bind(&owner.phone)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(CreateOwnerError::DuplicateEmail),
            Err(e) => Err(CreateOwnerError::Store(e.into())),
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| matches!(db.kind(), ErrorKind::UniqueViolation))
}

#[cfg(test)]
pub(crate) use memory::MemoryOwnerStore;

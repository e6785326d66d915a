//! Repository layer for database operations

pub mod damage_reports;
pub mod item_types;
pub mod ledger;
pub mod requests;
pub mod return_items;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub item_types: item_types::ItemTypesRepository,
    pub requests: requests::RequestsRepository,
    pub ledger: ledger::LedgerRepository,
    pub return_items: return_items::ReturnItemsRepository,
    pub damage_reports: damage_reports::DamageReportsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            item_types: item_types::ItemTypesRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            ledger: ledger::LedgerRepository::new(pool.clone()),
            return_items: return_items::ReturnItemsRepository::new(pool.clone()),
            damage_reports: damage_reports::DamageReportsRepository::new(pool.clone()),
            pool,
        }
    }
}

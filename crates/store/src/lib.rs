//! Storage for the parts catalogue.
//!
//! The `PartStore` trait is the seam between the HTTP layer and durability:
//! an in-memory implementation backs tests and dev, a Postgres implementation
//! backs production. Both enforce the same invariants, including the atomic
//! OUT-direction stock decrement.

pub mod memory;
pub mod part_store;
pub mod postgres;

pub use memory::InMemoryPartStore;
pub use part_store::{PartStore, StoreError, StoreResult};
pub use postgres::PostgresPartStore;

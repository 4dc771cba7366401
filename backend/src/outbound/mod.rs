//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed submission store using Diesel.
//! - **memory**: in-process submission store for local runs and tests.
//! - **sheets**: spreadsheet mirror adapters.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod sheets;

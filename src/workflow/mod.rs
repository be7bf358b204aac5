//! The stateful core: appointment transitions and their side effects,
//! the per-bank inventory ledger, and principal/role resolution. Free
//! functions over the database handle; handlers stay thin.

pub mod directory;
pub mod inventory;
pub mod lifecycle;

//! Input records and ledger value types.

pub mod error;
pub mod expense;
pub mod ledger;
pub mod member;
pub mod settlement;

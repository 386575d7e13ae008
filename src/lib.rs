//! # balance-engine
//!
//! Balance derivation for groups that share expenses.
//!
//! Given a group's members, the expenses they recorded (each divided into
//! per-member splits) and the settlements they made, this engine computes
//! each member's net balance and a directed breakdown of who owes whom.
//!
//! ## Architecture
//!
//! - **core** — Input records (members, expenses, settlements) and ledger value types
//! - **balance** — Accumulation, the optional netting pass, and per-member presentation
//! - **simulation** — Random group generation for benchmarks and manual testing
//!
//! ## Example
//!
//! ```
//! use balance_engine::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let members = vec![Member::new("u1", "Ana"), Member::new("u2", "Ben")];
//! let ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();
//!
//! let lunch = Expense::split_equally(ids[0].clone(), dec!(30), &ids);
//! let result = compute_balances(&members, &[lunch], &[], &LedgerPolicy::default()).unwrap();
//!
//! assert_eq!(result.balances()[0].total_balance, dec!(15));
//! assert_eq!(result.balances()[1].owes[0].amount, dec!(15));
//! ```

pub mod balance;
pub mod core;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::balance::accumulator::{Accumulation, LedgerAccumulator};
    pub use crate::balance::netting::{net_pairs, NettingSummary};
    pub use crate::balance::policy::{LedgerPolicy, OverpaymentPolicy};
    pub use crate::balance::presenter::{BalanceRecord, LedgerPresenter, OwedBy, Owes};
    pub use crate::balance::{compute_balances, GroupBalances};
    pub use crate::core::error::LedgerError;
    pub use crate::core::expense::{Expense, Split};
    pub use crate::core::ledger::{NetTotals, PairwiseLedger};
    pub use crate::core::member::{Member, MemberId, MemberRole};
    pub use crate::core::settlement::Settlement;
}

//! Balance derivation: accumulate, optionally net, present.

pub mod accumulator;
pub mod netting;
pub mod policy;
pub mod presenter;

use crate::core::error::LedgerError;
use crate::core::expense::Expense;
use crate::core::ledger::{NetTotals, PairwiseLedger};
use crate::core::member::{Member, MemberId};
use crate::core::settlement::Settlement;
use accumulator::LedgerAccumulator;
use netting::{net_pairs, NettingSummary};
use policy::LedgerPolicy;
use presenter::{BalanceRecord, LedgerPresenter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything derived for one group in one computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBalances {
    policy: LedgerPolicy,
    totals: NetTotals,
    ledger: PairwiseLedger,
    netting: Option<NettingSummary>,
    balances: Vec<BalanceRecord>,
}

impl GroupBalances {
    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    pub fn totals(&self) -> &NetTotals {
        &self.totals
    }

    /// The pairwise ledger as presented (netted if the policy asked for it).
    pub fn ledger(&self) -> &PairwiseLedger {
        &self.ledger
    }

    /// Present only when the netting pass ran.
    pub fn netting(&self) -> Option<&NettingSummary> {
        self.netting.as_ref()
    }

    pub fn balances(&self) -> &[BalanceRecord] {
        &self.balances
    }

    pub fn balance_of(&self, member: &MemberId) -> Option<&BalanceRecord> {
        self.balances.iter().find(|r| &r.id == member)
    }

    /// Conservation check: net totals sum to zero.
    pub fn is_valid(&self) -> bool {
        self.totals.is_balanced()
    }
}

/// Run the full pipeline for one group.
///
/// Accumulates `expenses` and `settlements` over `members`, applies the
/// netting pass when `policy.net_pairs` is set, and presents one
/// [`BalanceRecord`] per member in the given order.
pub fn compute_balances(
    members: &[Member],
    expenses: &[Expense],
    settlements: &[Settlement],
    policy: &LedgerPolicy,
) -> Result<GroupBalances, LedgerError> {
    let ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();
    let (totals, mut ledger) =
        LedgerAccumulator::accumulate_with(&ids, expenses, settlements, policy.overpayment)?
            .into_parts();

    let netting = policy.net_pairs.then(|| net_pairs(&mut ledger));
    let balances = LedgerPresenter::present(members, &totals, &ledger)?;

    Ok(GroupBalances {
        policy: *policy,
        totals,
        ledger,
        netting,
        balances,
    })
}

impl std::fmt::Display for GroupBalances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Group Balances ===")?;
        writeln!(f, "Members:        {}", self.balances.len())?;
        writeln!(f, "Outstanding:    {}", self.totals.total_outstanding())?;
        writeln!(f, "Overpayment:    {}", self.policy.overpayment)?;
        writeln!(f, "Valid:          {}", self.is_valid())?;
        if let Some(netting) = &self.netting {
            writeln!(f, "Pairs netted:   {}", netting.pairs_collapsed)?;
            writeln!(
                f,
                "Pairwise debt:  {} -> {} ({:.1}% less)",
                netting.gross_before,
                netting.gross_after,
                netting.reduction_percent()
            )?;
        }
        writeln!(f)?;
        for record in &self.balances {
            write!(f, "{}", record)?;
        }
        let debtors = self
            .balances
            .iter()
            .filter(|r| r.total_balance < Decimal::ZERO)
            .count();
        writeln!(f, "\n{} member(s) still owe money.", debtors)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expense::Split;
    use super::policy::OverpaymentPolicy;
    use rust_decimal_macros::dec;

    fn members() -> Vec<Member> {
        vec![Member::new("A", "Alice"), Member::new("B", "Bob")]
    }

    fn mutual_debts() -> Vec<Expense> {
        vec![
            Expense::new(MemberId::new("A"), vec![Split::new(MemberId::new("B"), dec!(30))]),
            Expense::new(MemberId::new("B"), vec![Split::new(MemberId::new("A"), dec!(12))]),
        ]
    }

    #[test]
    fn test_raw_view_keeps_both_directions() {
        let result =
            compute_balances(&members(), &mutual_debts(), &[], &LedgerPolicy::default()).unwrap();
        assert!(result.netting().is_none());
        let alice = result.balance_of(&MemberId::new("A")).unwrap();
        assert_eq!(alice.total_balance, dec!(18));
        assert_eq!(alice.owes.len(), 1);
        assert_eq!(alice.owed_by.len(), 1);
        assert!(result.is_valid());
    }

    #[test]
    fn test_netted_view_single_direction() {
        let policy = LedgerPolicy::default().with_netting(true);
        let result = compute_balances(&members(), &mutual_debts(), &[], &policy).unwrap();
        let alice = result.balance_of(&MemberId::new("A")).unwrap();
        assert!(alice.owes.is_empty());
        assert_eq!(alice.owed_by[0].amount, dec!(18));
        let summary = result.netting().unwrap();
        assert_eq!(summary.pairs_collapsed, 1);
        assert_eq!(summary.gross_after, dec!(18));
    }

    #[test]
    fn test_totals_independent_of_policy() {
        let settlements = vec![Settlement::new(MemberId::new("B"), MemberId::new("A"), dec!(40))];
        let mut seen = Vec::new();
        for overpayment in [
            OverpaymentPolicy::AllowNegative,
            OverpaymentPolicy::ClampAtZero,
            OverpaymentPolicy::NetAgainstReverse,
        ] {
            for net in [false, true] {
                let policy = LedgerPolicy::default()
                    .with_overpayment(overpayment)
                    .with_netting(net);
                let result =
                    compute_balances(&members(), &mutual_debts(), &settlements, &policy).unwrap();
                seen.push(result.totals().clone());
            }
        }
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_display_mentions_every_member() {
        let result =
            compute_balances(&members(), &mutual_debts(), &[], &LedgerPolicy::default()).unwrap();
        let text = result.to_string();
        assert!(text.contains("Alice"));
        assert!(text.contains("Bob"));
        assert!(text.contains("1 member(s) still owe money."));
    }
}

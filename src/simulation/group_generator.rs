//! Random expense-sharing groups for benchmarks and manual testing.

use crate::core::expense::Expense;
use crate::core::member::{Member, MemberId, MemberRole};
use crate::core::settlement::Settlement;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for generating a random group.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of members in the group.
    pub member_count: usize,
    /// Number of expenses to record.
    pub expense_count: usize,
    /// Number of settlements to record.
    pub settlement_count: usize,
    /// Minimum expense total, in cents.
    pub min_cents: i64,
    /// Maximum expense total, in cents.
    pub max_cents: i64,
    /// Probability that a non-payer split is already marked paid.
    pub paid_split_ratio: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            member_count: 5,
            expense_count: 20,
            settlement_count: 5,
            min_cents: 100,
            max_cents: 50_000,
            paid_split_ratio: 0.1,
        }
    }
}

/// A generated group, in the same shape the CLI reads from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedGroup {
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

impl GeneratedGroup {
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }
}

/// Generate a random group.
///
/// Each expense is paid by a random member and split equally among a
/// random non-empty subset of members. Settlements move a random amount
/// between two distinct members. Groups with fewer than two members get
/// no settlements.
pub fn generate_random_group(config: &GroupConfig) -> GeneratedGroup {
    let mut rng = rand::thread_rng();

    let members: Vec<Member> = (0..config.member_count)
        .map(|i| {
            let member = Member::new(format!("USER-{:03}", i), format!("Member {}", i));
            if i == 0 {
                member.with_role(MemberRole::Admin)
            } else {
                member
            }
        })
        .collect();
    let ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();

    let mut expenses = Vec::with_capacity(config.expense_count);
    if !ids.is_empty() {
        let max_cents = config.max_cents.max(config.min_cents + 1);
        let paid_ratio = config.paid_split_ratio.clamp(0.0, 1.0);
        for n in 0..config.expense_count {
            let payer = ids[rng.gen_range(0..ids.len())].clone();
            let share_count = rng.gen_range(1..=ids.len());
            let participants: Vec<MemberId> =
                ids.choose_multiple(&mut rng, share_count).cloned().collect();
            let total = Decimal::new(rng.gen_range(config.min_cents..max_cents), 2);

            let splits = Expense::split_equally(payer.clone(), total, &participants)
                .splits()
                .iter()
                .map(|s| {
                    let mut split = s.clone();
                    split.paid = split.user_id != payer && rng.gen_bool(paid_ratio);
                    split
                })
                .collect();
            expenses.push(
                Expense::new(payer, splits).with_description(format!("Expense #{}", n + 1)),
            );
        }
    }

    let mut settlements = Vec::with_capacity(config.settlement_count);
    if ids.len() >= 2 {
        for _ in 0..config.settlement_count {
            let pair: Vec<&MemberId> = ids.choose_multiple(&mut rng, 2).collect();
            let amount = Decimal::new(rng.gen_range(1..=config.max_cents.max(1) / 4 + 1), 2);
            settlements.push(Settlement::new(pair[0].clone(), pair[1].clone(), amount));
        }
    }

    GeneratedGroup {
        members,
        expenses,
        settlements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::accumulator::LedgerAccumulator;

    #[test]
    fn test_random_group_generation() {
        let config = GroupConfig {
            member_count: 4,
            expense_count: 10,
            settlement_count: 3,
            ..Default::default()
        };
        let group = generate_random_group(&config);
        assert_eq!(group.members.len(), 4);
        assert_eq!(group.expenses.len(), 10);
        assert_eq!(group.settlements.len(), 3);
        for expense in &group.expenses {
            assert!(!expense.splits().is_empty());
            assert!(expense.total() > Decimal::ZERO);
        }
        for s in &group.settlements {
            assert_ne!(s.paid_by(), s.received_by());
        }
    }

    #[test]
    fn test_single_member_group_has_no_settlements() {
        let config = GroupConfig {
            member_count: 1,
            ..Default::default()
        };
        let group = generate_random_group(&config);
        assert!(group.settlements.is_empty());
    }

    #[test]
    fn test_random_group_accumulates() {
        let config = GroupConfig {
            member_count: 12,
            expense_count: 200,
            settlement_count: 40,
            ..Default::default()
        };
        let group = generate_random_group(&config);
        let acc = LedgerAccumulator::accumulate(
            &group.member_ids(),
            &group.expenses,
            &group.settlements,
        )
        .unwrap();
        assert!(acc.is_valid());
    }
}

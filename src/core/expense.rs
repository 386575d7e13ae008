use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest currency unit handed out when splitting a total.
const MINOR_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One member's share of a single expense.
///
/// A split with `paid == true` has already been settled at the line-item
/// level and no longer contributes to outstanding balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub user_id: MemberId,
    pub amount: Decimal,
    #[serde(default)]
    pub paid: bool,
}

impl Split {
    /// An outstanding share.
    pub fn new(user_id: MemberId, amount: Decimal) -> Self {
        Self {
            user_id,
            amount,
            paid: false,
        }
    }

    /// A share that was already settled on its own.
    pub fn settled(user_id: MemberId, amount: Decimal) -> Self {
        Self {
            user_id,
            amount,
            paid: true,
        }
    }
}

/// An expense paid by one member and divided among several.
///
/// # Examples
///
/// ```
/// use balance_engine::core::expense::{Expense, Split};
/// use balance_engine::core::member::MemberId;
/// use rust_decimal_macros::dec;
///
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
///
/// let dinner = Expense::new(
///     alice.clone(),
///     vec![Split::new(alice, dec!(30)), Split::new(bob, dec!(30))],
/// )
/// .with_description("Dinner");
///
/// assert_eq!(dinner.total(), dec!(60));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    #[serde(rename = "paidByUserId")]
    paid_by: MemberId,
    splits: Vec<Split>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "Utc::now")]
    date: DateTime<Utc>,
}

impl Expense {
    pub fn new(paid_by: MemberId, splits: Vec<Split>) -> Self {
        Self {
            id: Uuid::new_v4(),
            paid_by,
            splits,
            description: None,
            date: Utc::now(),
        }
    }

    /// Build an expense whose `total` is shared equally among `participants`.
    ///
    /// `total` is first rounded to the cent (half away from zero). Shares
    /// are rounded down to the cent and the leftover cents go one each to
    /// the first participants, so for a non-negative `total` the splits sum
    /// to the rounded total. The payer may (and usually does) appear among
    /// the participants.
    pub fn split_equally(paid_by: MemberId, total: Decimal, participants: &[MemberId]) -> Self {
        Self::new(paid_by, equal_shares(total, participants))
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn paid_by(&self) -> &MemberId {
        &self.paid_by
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Sum of every split, including the payer's own share and settled shares.
    ///
    /// Saturates at the `Decimal` bounds.
    pub fn total(&self) -> Decimal {
        self.splits
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.amount))
    }
}

fn equal_shares(total: Decimal, participants: &[MemberId]) -> Vec<Split> {
    if participants.is_empty() {
        return Vec::new();
    }
    let total = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let count = Decimal::from(participants.len());
    let share = (total / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut remainder = total - share * count;

    participants
        .iter()
        .map(|member| {
            let mut amount = share;
            if remainder >= MINOR_UNIT {
                amount += MINOR_UNIT;
                remainder -= MINOR_UNIT;
            }
            Split::new(member.clone(), amount)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ids(names: &[&str]) -> Vec<MemberId> {
        names.iter().map(|n| MemberId::new(*n)).collect()
    }

    #[test]
    fn test_expense_creation() {
        let payer = MemberId::new("A");
        let ex = Expense::new(
            payer.clone(),
            vec![
                Split::new(MemberId::new("B"), dec!(20)),
                Split::settled(MemberId::new("C"), dec!(20)),
            ],
        );
        assert_eq!(ex.paid_by(), &payer);
        assert_eq!(ex.splits().len(), 2);
        assert!(ex.splits()[1].paid);
        assert_eq!(ex.total(), dec!(40));
    }

    #[test]
    fn test_split_equally_exact() {
        let members = ids(&["A", "B", "C"]);
        let ex = Expense::split_equally(members[0].clone(), dec!(60), &members);
        let amounts: Vec<Decimal> = ex.splits().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![dec!(20), dec!(20), dec!(20)]);
    }

    #[test]
    fn test_split_equally_remainder_cents() {
        let members = ids(&["A", "B", "C"]);
        let ex = Expense::split_equally(members[0].clone(), dec!(100), &members);
        let amounts: Vec<Decimal> = ex.splits().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_eq!(ex.total(), dec!(100));
    }

    #[test]
    fn test_split_equally_two_leftover_cents() {
        let members = ids(&["A", "B", "C"]);
        let ex = Expense::split_equally(members[0].clone(), dec!(0.05), &members);
        let amounts: Vec<Decimal> = ex.splits().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![dec!(0.02), dec!(0.02), dec!(0.01)]);
    }

    #[test]
    fn test_split_equally_sub_cent_total() {
        let members = ids(&["A", "B"]);
        let ex = Expense::split_equally(members[0].clone(), dec!(10.005), &members);
        let amounts: Vec<Decimal> = ex.splits().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![dec!(5.01), dec!(5.00)]);
        assert_eq!(ex.total(), dec!(10.01));

        let ex = Expense::split_equally(members[0].clone(), dec!(0.004), &members);
        assert_eq!(ex.total(), Decimal::ZERO);
    }

    #[test]
    fn test_split_equally_no_participants() {
        let ex = Expense::split_equally(MemberId::new("A"), dec!(10), &[]);
        assert!(ex.splits().is_empty());
        assert_eq!(ex.total(), Decimal::ZERO);
    }

    #[test]
    fn test_expense_from_json() {
        let ex: Expense = serde_json::from_str(
            r#"{
                "paidByUserId": "A",
                "description": "Groceries",
                "splits": [
                    { "userId": "A", "amount": "12.50" },
                    { "userId": "B", "amount": "12.50", "paid": true }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(ex.paid_by().as_str(), "A");
        assert_eq!(ex.description(), Some("Groceries"));
        assert!(!ex.splits()[0].paid);
        assert!(ex.splits()[1].paid);
        assert_eq!(ex.total(), dec!(25.00));
    }
}

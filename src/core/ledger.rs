use crate::core::error::LedgerError;
use crate::core::member::MemberId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

fn check_unique(members: &[MemberId]) -> Result<(), LedgerError> {
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if !seen.insert(member) {
            return Err(LedgerError::DuplicateMember {
                member: member.clone(),
            });
        }
    }
    Ok(())
}

/// Sum that stops at the `Decimal` bounds instead of panicking.
fn saturating_sum<'a>(values: impl Iterator<Item = &'a Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
}

/// Net position of every member of a group.
///
/// A positive balance means the member is owed money (net creditor).
/// A negative balance means the member owes money (net debtor).
///
/// Every member is seeded with zero up front; looking up anyone else
/// fails instead of silently defaulting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetTotals {
    balances: HashMap<MemberId, Decimal>,
}

impl NetTotals {
    /// Seed a zero balance for each member.
    pub fn seeded(members: &[MemberId]) -> Result<Self, LedgerError> {
        check_unique(members)?;
        Ok(Self {
            balances: members.iter().map(|m| (m.clone(), Decimal::ZERO)).collect(),
        })
    }

    /// Net balance of a member, or `None` if they are not part of the group.
    pub fn get(&self, member: &MemberId) -> Option<Decimal> {
        self.balances.get(member).copied()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.balances.contains_key(member)
    }

    /// Move `amount` of credit from `debtor` to `creditor`.
    ///
    /// Both sides change by the same amount, so the sum stays at zero.
    /// Nothing changes if either side is unknown or would overflow.
    pub(crate) fn transfer(
        &mut self,
        creditor: &MemberId,
        debtor: &MemberId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let credit = self
            .get(creditor)
            .ok_or_else(|| LedgerError::unknown(creditor, "net totals"))?;
        let debit = self
            .get(debtor)
            .ok_or_else(|| LedgerError::unknown(debtor, "net totals"))?;
        if creditor == debtor {
            return Ok(());
        }

        let credit = credit
            .checked_add(amount)
            .ok_or_else(|| LedgerError::overflow(format!("net total of {creditor}")))?;
        let debit = debit
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::overflow(format!("net total of {debtor}")))?;
        self.balances.insert(creditor.clone(), credit);
        self.balances.insert(debtor.clone(), debit);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, Decimal)> {
        self.balances.iter().map(|(m, v)| (m, *v))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances. Zero for any correctly accumulated ledger.
    ///
    /// Saturates at the `Decimal` bounds; totals produced by the
    /// accumulator never get there.
    pub fn sum(&self) -> Decimal {
        saturating_sum(self.balances.values())
    }

    pub fn is_balanced(&self) -> bool {
        self.sum() == Decimal::ZERO
    }

    /// Total that net debtors still have to pay (sum of positive balances).
    pub fn total_outstanding(&self) -> Decimal {
        saturating_sum(self.balances.values().filter(|v| **v > Decimal::ZERO))
    }
}

/// Directed record of how much each member owes each other member.
///
/// Holds one entry per ordered pair `(debtor, creditor)` with
/// `debtor != creditor`. The two directions of a pair are tracked
/// independently; see [`net_pairs`](crate::balance::netting::net_pairs)
/// for collapsing them.
///
/// Entries may be negative: a settlement larger than the recorded debt
/// on its edge leaves that edge below zero under the default policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseLedger {
    /// Members in seeding order, used for deterministic iteration.
    members: Vec<MemberId>,
    /// debtor -> creditor -> amount debtor owes creditor
    #[serde(with = "edges_serde", rename = "owed")]
    edges: Edges,
}

type Edges = HashMap<MemberId, HashMap<MemberId, Decimal>>;

mod edges_serde {
    use super::*;
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use std::collections::BTreeMap;

    /// Written as a nested `debtor -> creditor -> amount` map, sorted by id.
    pub fn serialize<S: serde::Serializer>(edges: &Edges, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(edges.len()))?;
        let sorted: BTreeMap<&MemberId, BTreeMap<&MemberId, &Decimal>> = edges
            .iter()
            .map(|(debtor, row)| (debtor, row.iter().collect()))
            .collect();
        for (debtor, row) in &sorted {
            map.serialize_entry(debtor, row)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Edges, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Edges;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of debtor -> creditor -> amount")
            }
            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut edges = HashMap::new();
                while let Some((debtor, row)) =
                    access.next_entry::<MemberId, HashMap<MemberId, Decimal>>()?
                {
                    if row.contains_key(&debtor) {
                        return Err(de::Error::custom(format!(
                            "member {debtor} cannot owe themself"
                        )));
                    }
                    edges.insert(debtor, row);
                }
                Ok(edges)
            }
        }
        deserializer.deserialize_map(V)
    }
}

impl PairwiseLedger {
    /// Seed a zero entry for every ordered pair of distinct members.
    pub fn seeded(members: &[MemberId]) -> Result<Self, LedgerError> {
        check_unique(members)?;
        let edges = members
            .iter()
            .map(|debtor| {
                let row = members
                    .iter()
                    .filter(|creditor| *creditor != debtor)
                    .map(|creditor| (creditor.clone(), Decimal::ZERO))
                    .collect();
                (debtor.clone(), row)
            })
            .collect();
        Ok(Self {
            members: members.to_vec(),
            edges,
        })
    }

    /// Amount `debtor` is recorded as owing `creditor`.
    ///
    /// `None` if either is outside the group or both are the same member.
    pub fn owed(&self, debtor: &MemberId, creditor: &MemberId) -> Option<Decimal> {
        self.edges.get(debtor)?.get(creditor).copied()
    }

    pub(crate) fn edge_mut(
        &mut self,
        debtor: &MemberId,
        creditor: &MemberId,
    ) -> Result<&mut Decimal, LedgerError> {
        self.edges
            .get_mut(debtor)
            .ok_or_else(|| LedgerError::unknown(debtor, "pairwise ledger"))?
            .get_mut(creditor)
            .ok_or_else(|| LedgerError::unknown(creditor, "pairwise ledger"))
    }

    /// Members in the order the ledger was seeded with.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Every directed edge, in member order.
    pub fn edges(&self) -> impl Iterator<Item = (&MemberId, &MemberId, Decimal)> + '_ {
        self.members.iter().flat_map(move |debtor| {
            self.members.iter().filter_map(move |creditor| {
                self.owed(debtor, creditor)
                    .map(|amount| (debtor, creditor, amount))
            })
        })
    }

    /// Sum of all positive edges: the debt still shown as outstanding.
    ///
    /// Saturates at the `Decimal` bounds like [`NetTotals::sum`].
    pub fn gross_outstanding(&self) -> Decimal {
        saturating_sum(
            self.edges
                .values()
                .flat_map(|row| row.values())
                .filter(|v| **v > Decimal::ZERO),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn abc() -> Vec<MemberId> {
        vec![MemberId::new("A"), MemberId::new("B"), MemberId::new("C")]
    }

    #[test]
    fn test_totals_seeded_to_zero() {
        let totals = NetTotals::seeded(&abc()).unwrap();
        assert_eq!(totals.len(), 3);
        assert_eq!(totals.get(&MemberId::new("B")), Some(Decimal::ZERO));
        assert_eq!(totals.get(&MemberId::new("Z")), None);
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_totals_transfer_balances() {
        let mut totals = NetTotals::seeded(&abc()).unwrap();
        totals
            .transfer(&MemberId::new("A"), &MemberId::new("B"), dec!(25))
            .unwrap();
        assert_eq!(totals.get(&MemberId::new("A")), Some(dec!(25)));
        assert_eq!(totals.get(&MemberId::new("B")), Some(dec!(-25)));
        assert!(totals.is_balanced());
        assert_eq!(totals.total_outstanding(), dec!(25));
    }

    #[test]
    fn test_totals_transfer_unknown_member_leaves_state() {
        let mut totals = NetTotals::seeded(&abc()).unwrap();
        let err = totals
            .transfer(&MemberId::new("A"), &MemberId::new("Z"), dec!(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownMember { ref member, .. } if member.as_str() == "Z"));
        assert_eq!(totals.get(&MemberId::new("A")), Some(Decimal::ZERO));
    }

    #[test]
    fn test_totals_transfer_overflow_leaves_state() {
        let mut totals = NetTotals::seeded(&abc()).unwrap();
        totals
            .transfer(&MemberId::new("A"), &MemberId::new("B"), Decimal::MAX)
            .unwrap();
        let err = totals
            .transfer(&MemberId::new("A"), &MemberId::new("C"), dec!(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
        assert_eq!(totals.get(&MemberId::new("A")), Some(Decimal::MAX));
        assert_eq!(totals.get(&MemberId::new("C")), Some(Decimal::ZERO));
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_aggregates_saturate() {
        let totals: NetTotals =
            serde_json::from_str(&format!(r#"{{ "A": "{0}", "B": "{0}" }}"#, Decimal::MAX)).unwrap();
        assert_eq!(totals.total_outstanding(), Decimal::MAX);
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let members = vec![MemberId::new("A"), MemberId::new("A")];
        assert!(matches!(
            NetTotals::seeded(&members),
            Err(LedgerError::DuplicateMember { .. })
        ));
        assert!(matches!(
            PairwiseLedger::seeded(&members),
            Err(LedgerError::DuplicateMember { .. })
        ));
    }

    #[test]
    fn test_ledger_seeds_all_ordered_pairs() {
        let ledger = PairwiseLedger::seeded(&abc()).unwrap();
        assert_eq!(ledger.edges().count(), 6);
        assert_eq!(
            ledger.owed(&MemberId::new("A"), &MemberId::new("B")),
            Some(Decimal::ZERO)
        );
        assert_eq!(ledger.owed(&MemberId::new("A"), &MemberId::new("A")), None);
    }

    #[test]
    fn test_ledger_edge_mut_reports_missing_member() {
        let mut ledger = PairwiseLedger::seeded(&abc()).unwrap();
        let err = ledger
            .edge_mut(&MemberId::new("A"), &MemberId::new("Z"))
            .unwrap_err();
        assert_eq!(err, LedgerError::unknown(&MemberId::new("Z"), "pairwise ledger"));
    }

    #[test]
    fn test_gross_outstanding_ignores_negative_edges() {
        let mut ledger = PairwiseLedger::seeded(&abc()).unwrap();
        *ledger
            .edge_mut(&MemberId::new("B"), &MemberId::new("A"))
            .unwrap() += dec!(20);
        *ledger
            .edge_mut(&MemberId::new("C"), &MemberId::new("A"))
            .unwrap() -= dec!(5);
        assert_eq!(ledger.gross_outstanding(), dec!(20));
    }

    #[test]
    fn test_ledger_json_nested_shape() {
        let mut ledger = PairwiseLedger::seeded(&abc()).unwrap();
        *ledger
            .edge_mut(&MemberId::new("B"), &MemberId::new("A"))
            .unwrap() += dec!(20);

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["owed"]["B"]["A"], "20");
        assert_eq!(json["members"][0], "A");

        let back: PairwiseLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}

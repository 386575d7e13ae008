use crate::core::error::LedgerError;
use crate::core::ledger::{NetTotals, PairwiseLedger};
use crate::core::member::{Member, MemberId, MemberRole};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// "This member owes `to` the given amount."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owes {
    pub to: MemberId,
    pub amount: Decimal,
}

/// "This member is owed the given amount by `from`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwedBy {
    pub from: MemberId,
    pub amount: Decimal,
}

/// Member-centric view of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub id: MemberId,
    pub name: String,
    pub image_url: Option<String>,
    pub role: MemberRole,
    /// Positive = is owed money, negative = owes money.
    pub total_balance: Decimal,
    pub owes: Vec<Owes>,
    pub owed_by: Vec<OwedBy>,
}

impl BalanceRecord {
    pub fn is_settled(&self) -> bool {
        self.total_balance == Decimal::ZERO && self.owes.is_empty() && self.owed_by.is_empty()
    }
}

impl fmt::Display for BalanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.total_balance > Decimal::ZERO {
            "IS OWED"
        } else if self.total_balance < Decimal::ZERO {
            "OWES"
        } else {
            "SETTLED"
        };
        writeln!(
            f,
            "{} ({}) {:>12}  [{}]",
            self.name, self.id, self.total_balance, status
        )?;
        for o in &self.owes {
            writeln!(f, "    owes {:<16} {:>12}", o.to, o.amount)?;
        }
        for o in &self.owed_by {
            writeln!(f, "    owed by {:<13} {:>12}", o.from, o.amount)?;
        }
        Ok(())
    }
}

/// Shapes accumulated ledger state into per-member balance records.
pub struct LedgerPresenter;

impl LedgerPresenter {
    /// One record per member, in the order given.
    ///
    /// `owes` and `owed_by` follow the same member order and omit zero or
    /// negative edges. A negative edge records an overpayment along that
    /// direction and is not an obligation of either side.
    ///
    /// Read-only: presenting the same state twice yields the same records.
    pub fn present(
        members: &[Member],
        totals: &NetTotals,
        ledger: &PairwiseLedger,
    ) -> Result<Vec<BalanceRecord>, LedgerError> {
        members
            .iter()
            .map(|member| Self::present_member(member, members, totals, ledger))
            .collect()
    }

    fn present_member(
        member: &Member,
        members: &[Member],
        totals: &NetTotals,
        ledger: &PairwiseLedger,
    ) -> Result<BalanceRecord, LedgerError> {
        let total_balance = totals
            .get(&member.id)
            .ok_or_else(|| LedgerError::unknown(&member.id, "net totals"))?;

        let mut owes = Vec::new();
        let mut owed_by = Vec::new();
        for other in members.iter().filter(|o| o.id != member.id) {
            let outgoing = ledger
                .owed(&member.id, &other.id)
                .ok_or_else(|| LedgerError::unknown(&other.id, "pairwise ledger"))?;
            if outgoing > Decimal::ZERO {
                owes.push(Owes {
                    to: other.id.clone(),
                    amount: outgoing,
                });
            }

            let incoming = ledger
                .owed(&other.id, &member.id)
                .ok_or_else(|| LedgerError::unknown(&other.id, "pairwise ledger"))?;
            if incoming > Decimal::ZERO {
                owed_by.push(OwedBy {
                    from: other.id.clone(),
                    amount: incoming,
                });
            }
        }

        Ok(BalanceRecord {
            id: member.id.clone(),
            name: member.name.clone(),
            image_url: member.image_url.clone(),
            role: member.role,
            total_balance,
            owes,
            owed_by,
        })
    }
}

use crate::balance::policy::OverpaymentPolicy;
use crate::core::error::LedgerError;
use crate::core::expense::Expense;
use crate::core::ledger::{NetTotals, PairwiseLedger};
use crate::core::member::MemberId;
use crate::core::settlement::Settlement;
use log::{debug, trace, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Raw ledger state after folding every expense and settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulation {
    totals: NetTotals,
    ledger: PairwiseLedger,
}

impl Accumulation {
    /// Net balance per member.
    pub fn totals(&self) -> &NetTotals {
        &self.totals
    }

    /// Directed debts per ordered pair.
    pub fn ledger(&self) -> &PairwiseLedger {
        &self.ledger
    }

    pub fn into_parts(self) -> (NetTotals, PairwiseLedger) {
        (self.totals, self.ledger)
    }

    /// Conservation check: net totals sum to zero.
    pub fn is_valid(&self) -> bool {
        self.totals.is_balanced()
    }
}

/// Folds expenses and settlements into net totals and a pairwise ledger.
pub struct LedgerAccumulator;

impl LedgerAccumulator {
    /// Accumulate with the default overpayment policy.
    ///
    /// See [`accumulate_with`](Self::accumulate_with).
    pub fn accumulate(
        members: &[MemberId],
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Accumulation, LedgerError> {
        Self::accumulate_with(members, expenses, settlements, OverpaymentPolicy::default())
    }

    /// Fold both event streams into ledger state.
    ///
    /// # Algorithm
    ///
    /// 1. Validate every record: referenced members exist, amounts are
    ///    non-negative, and the combined amount moved fits in a `Decimal`.
    ///    Nothing is folded if any record is rejected.
    /// 2. Seed zero totals and a zero edge for every ordered pair.
    /// 3. For each split not owed to oneself and not already paid:
    ///    payer +amount, debtor -amount, `ledger[debtor][payer] += amount`.
    /// 4. For each settlement between two different members: payer
    ///    +amount, receiver -amount, and the `ledger[payer][receiver]`
    ///    edge shrinks as `policy` dictates. A member paying themself
    ///    changes nothing.
    ///
    /// Every step is a balanced transfer between two members, so the
    /// totals always sum to zero regardless of input order.
    pub fn accumulate_with(
        members: &[MemberId],
        expenses: &[Expense],
        settlements: &[Settlement],
        policy: OverpaymentPolicy,
    ) -> Result<Accumulation, LedgerError> {
        debug!(
            "accumulating {} expenses and {} settlements over {} members ({})",
            expenses.len(),
            settlements.len(),
            members.len(),
            policy
        );

        let mut totals = NetTotals::seeded(members)?;
        let mut ledger = PairwiseLedger::seeded(members)?;

        let known: HashSet<&MemberId> = members.iter().collect();
        validate_expenses(&known, expenses)?;
        validate_settlements(&known, settlements)?;
        check_volume(expenses, settlements)?;

        let mut skipped = 0usize;
        for expense in expenses {
            let payer = expense.paid_by();
            for split in expense.splits() {
                if &split.user_id == payer {
                    trace!("expense {}: skipping payer's own share", expense.id());
                    skipped += 1;
                    continue;
                }
                if split.paid {
                    trace!(
                        "expense {}: skipping settled share of {}",
                        expense.id(),
                        split.user_id
                    );
                    skipped += 1;
                    continue;
                }
                totals.transfer(payer, &split.user_id, split.amount)?;
                let edge = ledger.edge_mut(&split.user_id, payer)?;
                *edge = edge
                    .checked_add(split.amount)
                    .ok_or_else(|| LedgerError::overflow(format!("expense {}", expense.id())))?;
            }
        }

        for settlement in settlements {
            if settlement.paid_by() == settlement.received_by() {
                trace!(
                    "settlement {}: skipping {} paying themself",
                    settlement.id(),
                    settlement.paid_by()
                );
                continue;
            }
            totals.transfer(
                settlement.paid_by(),
                settlement.received_by(),
                settlement.amount(),
            )?;
            apply_settlement(&mut ledger, settlement, policy)?;
        }

        debug!(
            "accumulated ledger: {} splits skipped, {} outstanding",
            skipped,
            ledger.gross_outstanding()
        );

        Ok(Accumulation { totals, ledger })
    }
}

fn validate_expenses(known: &HashSet<&MemberId>, expenses: &[Expense]) -> Result<(), LedgerError> {
    for expense in expenses {
        if !known.contains(expense.paid_by()) {
            return Err(LedgerError::unknown(
                expense.paid_by(),
                format!("expense {}", expense.id()),
            ));
        }
        for (idx, split) in expense.splits().iter().enumerate() {
            let context = || format!("split {} of expense {}", idx, expense.id());
            if !known.contains(&split.user_id) {
                return Err(LedgerError::unknown(&split.user_id, context()));
            }
            if split.amount < Decimal::ZERO {
                return Err(LedgerError::NegativeAmount {
                    amount: split.amount,
                    context: context(),
                });
            }
        }
    }
    Ok(())
}

fn validate_settlements(
    known: &HashSet<&MemberId>,
    settlements: &[Settlement],
) -> Result<(), LedgerError> {
    for settlement in settlements {
        let context = || format!("settlement {}", settlement.id());
        for member in [settlement.paid_by(), settlement.received_by()] {
            if !known.contains(member) {
                return Err(LedgerError::unknown(member, context()));
            }
        }
        if settlement.amount() < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount {
                amount: settlement.amount(),
                context: context(),
            });
        }
    }
    Ok(())
}

/// Reject inputs whose folded amounts could overflow any total or edge.
///
/// Every balance and every edge is bounded by the sum of all amounts that
/// get folded, so checking that one sum keeps the fold and every later
/// aggregate in range.
fn check_volume(expenses: &[Expense], settlements: &[Settlement]) -> Result<(), LedgerError> {
    let mut volume = Decimal::ZERO;
    for expense in expenses {
        for split in expense.splits() {
            if &split.user_id == expense.paid_by() || split.paid {
                continue;
            }
            volume = volume
                .checked_add(split.amount)
                .ok_or_else(|| LedgerError::overflow(format!("expense {}", expense.id())))?;
        }
    }
    for settlement in settlements {
        if settlement.paid_by() == settlement.received_by() {
            continue;
        }
        volume = volume
            .checked_add(settlement.amount())
            .ok_or_else(|| LedgerError::overflow(format!("settlement {}", settlement.id())))?;
    }
    Ok(())
}

fn apply_settlement(
    ledger: &mut PairwiseLedger,
    settlement: &Settlement,
    policy: OverpaymentPolicy,
) -> Result<(), LedgerError> {
    let payer = settlement.paid_by();
    let receiver = settlement.received_by();
    let amount = settlement.amount();

    let overflow = || LedgerError::overflow(format!("settlement {}", settlement.id()));

    let excess = {
        let edge = ledger.edge_mut(payer, receiver)?;
        let before = *edge;
        match policy {
            OverpaymentPolicy::AllowNegative => {
                *edge = before.checked_sub(amount).ok_or_else(overflow)?;
                if *edge < Decimal::ZERO {
                    warn!(
                        "settlement {} leaves {} -> {} at {}",
                        settlement.id(),
                        payer,
                        receiver,
                        *edge
                    );
                }
                Decimal::ZERO
            }
            OverpaymentPolicy::ClampAtZero => {
                if amount > before {
                    warn!(
                        "settlement {} exceeds recorded debt {} -> {} ({} > {}), clamping",
                        settlement.id(),
                        payer,
                        receiver,
                        amount,
                        before
                    );
                }
                *edge = (before - amount).max(Decimal::ZERO);
                Decimal::ZERO
            }
            OverpaymentPolicy::NetAgainstReverse => {
                if before >= amount {
                    *edge = before - amount;
                    Decimal::ZERO
                } else {
                    *edge = Decimal::ZERO;
                    amount - before.max(Decimal::ZERO)
                }
            }
        }
    };

    if excess > Decimal::ZERO {
        debug!(
            "settlement {}: carrying {} over to {} -> {}",
            settlement.id(),
            excess,
            receiver,
            payer
        );
        let reverse = ledger.edge_mut(receiver, payer)?;
        *reverse = reverse.checked_add(excess).ok_or_else(overflow)?;
    }
    Ok(())
}

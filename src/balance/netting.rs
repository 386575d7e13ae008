use crate::core::ledger::PairwiseLedger;
use crate::core::member::MemberId;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of netting a single pair of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairNetting {
    pub member_a: MemberId,
    pub member_b: MemberId,
    /// Amount A owed B before netting.
    pub gross_a_to_b: Decimal,
    /// Amount B owed A before netting.
    pub gross_b_to_a: Decimal,
    /// Positive means A owes B net, negative means B owes A net.
    pub net_amount: Decimal,
}

/// Summary of a netting pass over a whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettingSummary {
    /// Pairs where both directions carried a nonzero entry.
    pub pairs_collapsed: usize,
    /// Positive edge total before netting.
    pub gross_before: Decimal,
    /// Positive edge total after netting.
    pub gross_after: Decimal,
}

impl NettingSummary {
    pub fn reduction(&self) -> Decimal {
        self.gross_before - self.gross_after
    }

    /// Reduction as a percentage of the pre-netting gross.
    pub fn reduction_percent(&self) -> f64 {
        if self.gross_before == Decimal::ZERO {
            return 0.0;
        }
        self.reduction()
            .checked_div(self.gross_before)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|pct| pct.to_string().parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

/// Compute the bilateral net between two members without touching the ledger.
///
/// If A owes B 100 and B owes A 60, A owes B 40 net.
///
/// `None` if the pair is not in the ledger or the difference does not fit
/// in a `Decimal`.
pub fn pair_net(ledger: &PairwiseLedger, a: &MemberId, b: &MemberId) -> Option<PairNetting> {
    let a_to_b = ledger.owed(a, b)?;
    let b_to_a = ledger.owed(b, a)?;
    Some(PairNetting {
        member_a: a.clone(),
        member_b: b.clone(),
        gross_a_to_b: a_to_b,
        gross_b_to_a: b_to_a,
        net_amount: a_to_b.checked_sub(b_to_a)?,
    })
}

/// Collapse each pair's two directed debts into a single direction.
///
/// For every unordered pair {a, b}, `diff = ledger[a][b] - ledger[b][a]`:
/// a positive diff leaves `(diff, 0)`, a negative one `(0, -diff)`, and
/// zero clears both. Afterwards no pair has debt in both directions and
/// no edge is negative.
///
/// Net totals are unaffected: they never depended on how debt was split
/// across directions.
pub fn net_pairs(ledger: &mut PairwiseLedger) -> NettingSummary {
    let gross_before = ledger.gross_outstanding();
    let members = ledger.members().to_vec();
    let mut pairs_collapsed = 0;

    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            let Some(pair) = pair_net(ledger, a, b) else {
                warn!("cannot net {} and {}, leaving both directions as recorded", a, b);
                continue;
            };
            if pair.gross_a_to_b != Decimal::ZERO && pair.gross_b_to_a != Decimal::ZERO {
                pairs_collapsed += 1;
            }
            let (a_to_b, b_to_a) = if pair.net_amount > Decimal::ZERO {
                (pair.net_amount, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -pair.net_amount)
            };
            if let Ok(edge) = ledger.edge_mut(a, b) {
                *edge = a_to_b;
            }
            if let Ok(edge) = ledger.edge_mut(b, a) {
                *edge = b_to_a;
            }
        }
    }

    let summary = NettingSummary {
        pairs_collapsed,
        gross_before,
        gross_after: ledger.gross_outstanding(),
    };
    debug!(
        "netted {} pairs: outstanding {} -> {}",
        summary.pairs_collapsed, summary.gross_before, summary.gross_after
    );
    summary
}

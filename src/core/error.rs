use crate::core::member::MemberId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while folding expenses and settlements into a ledger.
///
/// All of them are fatal for the computation: nothing is accumulated
/// when any input record is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unknown member {member} referenced by {context}")]
    UnknownMember { member: MemberId, context: String },

    #[error("amount must not be negative, got {amount} in {context}")]
    NegativeAmount { amount: Decimal, context: String },

    #[error("member {member} appears more than once in the group")]
    DuplicateMember { member: MemberId },

    #[error("amounts in {context} exceed the representable range")]
    AmountOverflow { context: String },
}

impl LedgerError {
    pub(crate) fn unknown(member: &MemberId, context: impl Into<String>) -> Self {
        LedgerError::UnknownMember {
            member: member.clone(),
            context: context.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LedgerError::AmountOverflow {
            context: context.into(),
        }
    }
}

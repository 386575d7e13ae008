use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A direct repayment from one member to another.
///
/// Settlements are independent of any particular expense: they reduce
/// whatever the payer is recorded as owing the receiver.
///
/// # Examples
///
/// ```
/// use balance_engine::core::member::MemberId;
/// use balance_engine::core::settlement::Settlement;
/// use rust_decimal_macros::dec;
///
/// let payback = Settlement::new(MemberId::new("bob"), MemberId::new("alice"), dec!(10))
///     .with_note("for the taxi");
/// assert_eq!(payback.amount(), dec!(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    #[serde(rename = "paidByUserId")]
    paid_by: MemberId,
    #[serde(rename = "receivedByUserId")]
    received_by: MemberId,
    amount: Decimal,
    #[serde(default)]
    note: Option<String>,
    #[serde(default = "Utc::now")]
    date: DateTime<Utc>,
}

impl Settlement {
    pub fn new(paid_by: MemberId, received_by: MemberId, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            paid_by,
            received_by,
            amount,
            note: None,
            date: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
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

    pub fn received_by(&self) -> &MemberId {
        &self.received_by
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settlement_creation() {
        let s = Settlement::new(MemberId::new("B"), MemberId::new("A"), dec!(10));
        assert_eq!(s.paid_by().as_str(), "B");
        assert_eq!(s.received_by().as_str(), "A");
        assert_eq!(s.amount(), dec!(10));
        assert!(s.note().is_none());
    }

    #[test]
    fn test_settlement_from_json() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{ "id": "{id}", "paidByUserId": "B", "receivedByUserId": "A", "amount": "7.25" }}"#
        );
        let s: Settlement = serde_json::from_str(&json).unwrap();
        assert_eq!(s.id(), id);
        assert_eq!(s.amount(), dec!(7.25));
    }
}

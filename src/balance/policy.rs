use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What a settlement does when it exceeds the debt recorded on its edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverpaymentPolicy {
    /// Subtract the full amount; the directed edge may go negative.
    /// The reverse edge is left untouched.
    #[default]
    AllowNegative,
    /// Subtract, but never below zero. The excess is dropped from the
    /// pairwise view (net totals still record it).
    #[serde(rename = "clamp", alias = "clamp-at-zero")]
    ClampAtZero,
    /// Reduce the edge to zero and carry the excess over to the reverse
    /// edge, so the receiver now owes the payer the difference.
    #[serde(rename = "net-reverse", alias = "net-against-reverse")]
    NetAgainstReverse,
}

#[derive(Debug, Error)]
#[error("unknown overpayment policy '{0}' (expected allow-negative, clamp or net-reverse)")]
pub struct ParsePolicyError(String);

impl FromStr for OverpaymentPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow-negative" => Ok(OverpaymentPolicy::AllowNegative),
            "clamp" | "clamp-at-zero" => Ok(OverpaymentPolicy::ClampAtZero),
            "net-reverse" | "net-against-reverse" => Ok(OverpaymentPolicy::NetAgainstReverse),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for OverpaymentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverpaymentPolicy::AllowNegative => "allow-negative",
            OverpaymentPolicy::ClampAtZero => "clamp",
            OverpaymentPolicy::NetAgainstReverse => "net-reverse",
        };
        f.write_str(name)
    }
}

/// Knobs controlling how raw events become balances.
///
/// The default reproduces the raw, un-netted view: settlements may drive
/// edges negative and both directions of a pair are reported separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerPolicy {
    pub overpayment: OverpaymentPolicy,
    /// Collapse each pair's two directed debts into one before presenting.
    pub net_pairs: bool,
}

impl LedgerPolicy {
    pub fn with_overpayment(mut self, overpayment: OverpaymentPolicy) -> Self {
        self.overpayment = overpayment;
        self
    }

    pub fn with_netting(mut self, net_pairs: bool) -> Self {
        self.net_pairs = net_pairs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = LedgerPolicy::default();
        assert_eq!(policy.overpayment, OverpaymentPolicy::AllowNegative);
        assert!(!policy.net_pairs);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            "clamp".parse::<OverpaymentPolicy>().unwrap(),
            OverpaymentPolicy::ClampAtZero
        );
        assert_eq!(
            "net-reverse".parse::<OverpaymentPolicy>().unwrap(),
            OverpaymentPolicy::NetAgainstReverse
        );
        assert!("sometimes".parse::<OverpaymentPolicy>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for policy in [
            OverpaymentPolicy::AllowNegative,
            OverpaymentPolicy::ClampAtZero,
            OverpaymentPolicy::NetAgainstReverse,
        ] {
            assert_eq!(policy.to_string().parse::<OverpaymentPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_json_names_match_display() {
        for policy in [
            OverpaymentPolicy::AllowNegative,
            OverpaymentPolicy::ClampAtZero,
            OverpaymentPolicy::NetAgainstReverse,
        ] {
            let json = serde_json::to_value(policy).unwrap();
            assert_eq!(json, policy.to_string());

            let config = format!(r#"{{ "overpayment": "{}" }}"#, policy);
            let parsed: LedgerPolicy = serde_json::from_str(&config).unwrap();
            assert_eq!(parsed.overpayment, policy);
        }
    }

    #[test]
    fn test_policy_from_partial_json() {
        let policy: LedgerPolicy = serde_json::from_str(r#"{ "netPairs": true }"#).unwrap();
        assert!(policy.net_pairs);
        assert_eq!(policy.overpayment, OverpaymentPolicy::AllowNegative);

        let policy: LedgerPolicy =
            serde_json::from_str(r#"{ "overpayment": "clamp-at-zero" }"#).unwrap();
        assert_eq!(policy.overpayment, OverpaymentPolicy::ClampAtZero);

        let policy: LedgerPolicy =
            serde_json::from_str(r#"{ "overpayment": "net-against-reverse" }"#).unwrap();
        assert_eq!(policy.overpayment, OverpaymentPolicy::NetAgainstReverse);
    }
}

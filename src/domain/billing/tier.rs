//! Subscription tiers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
}

str_enum!(SubscriptionTier { Free => "free", Pro => "pro" });

impl SubscriptionTier {
    pub fn is_paid(&self) -> bool {
        matches!(self, SubscriptionTier::Pro)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "Free",
            SubscriptionTier::Pro => "Pro",
        }
    }
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        SubscriptionTier::Free
    }
}

/// Stripe subscription states we act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripeSubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Paused,
}

impl StripeSubscriptionStatus {
    /// Tier implied by this status, or `None` to leave the tier unchanged.
    ///
    /// `past_due` keeps access while Stripe retries the charge.
    pub fn implied_tier(&self) -> Option<SubscriptionTier> {
        match self {
            StripeSubscriptionStatus::Active | StripeSubscriptionStatus::Trialing => {
                Some(SubscriptionTier::Pro)
            }
            StripeSubscriptionStatus::Canceled
            | StripeSubscriptionStatus::Unpaid
            | StripeSubscriptionStatus::IncompleteExpired
            | StripeSubscriptionStatus::Paused => Some(SubscriptionTier::Free),
            StripeSubscriptionStatus::PastDue | StripeSubscriptionStatus::Incomplete => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pro_is_paid() {
        assert!(SubscriptionTier::Pro.is_paid());
        assert!(!SubscriptionTier::Free.is_paid());
    }

    #[test]
    fn tier_labels_round_trip() {
        assert_eq!(SubscriptionTier::parse("pro"), Some(SubscriptionTier::Pro));
        assert_eq!(SubscriptionTier::Free.to_string(), "free");
        assert_eq!(SubscriptionTier::parse("gold"), None);
    }

    #[test]
    fn status_maps_to_tier() {
        assert_eq!(
            StripeSubscriptionStatus::Trialing.implied_tier(),
            Some(SubscriptionTier::Pro)
        );
        assert_eq!(
            StripeSubscriptionStatus::Canceled.implied_tier(),
            Some(SubscriptionTier::Free)
        );
        assert_eq!(StripeSubscriptionStatus::PastDue.implied_tier(), None);
    }
}

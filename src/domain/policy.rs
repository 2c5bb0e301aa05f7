//! Feature policy: what each subscription tier may do
//!
//! | Resource | Free | Premium |
//! |----------|------|---------|
//! | Lists | 3 | unlimited |
//! | Notifications per month | 5 | unlimited |
//! | List categories | groceries, household, personal | all |
//! | Item categories | groceries, dairy, produce, household, personal care, other | all |
//! | Units | none, piece, kg, g, L, mL, pack, bottle | all |
//! | Location reminders, sharing, item images, budgets | no | yes |
//!
//! The tables here are pure data; [`crate::storage::EntitlementStore`] pairs
//! them with the persisted tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::category::{ItemCategory, ListCategory, Unit};

/// Maximum number of lists on the free tier
pub const FREE_LIST_LIMIT: u32 = 3;

/// Maximum notifications per period on the free tier
pub const FREE_NOTIFICATION_LIMIT: u32 = 5;

pub const FREE_LIST_CATEGORIES: &[ListCategory] = &[
    ListCategory::Groceries,
    ListCategory::Household,
    ListCategory::Personal,
];

pub const FREE_ITEM_CATEGORIES: &[ItemCategory] = &[
    ItemCategory::Groceries,
    ItemCategory::Dairy,
    ItemCategory::Produce,
    ItemCategory::Household,
    ItemCategory::PersonalCare,
    ItemCategory::Other,
];

pub const FREE_UNITS: &[Unit] = &[
    Unit::None,
    Unit::Piece,
    Unit::Kilogram,
    Unit::Gram,
    Unit::Liter,
    Unit::Milliliter,
    Unit::Pack,
    Unit::Bottle,
];

#[derive(Debug, Error, PartialEq)]
#[error("Unknown subscription tier '{0}'")]
pub struct UnknownTier(pub String);

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Tier::Premium)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

/// Features that are all-or-nothing per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    LocationReminders,
    DataSharing,
    ItemImages,
    BudgetTracking,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::LocationReminders,
        Feature::DataSharing,
        Feature::ItemImages,
        Feature::BudgetTracking,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Feature::LocationReminders => "Location Reminders",
            Feature::DataSharing => "Data Sharing",
            Feature::ItemImages => "Item Images",
            Feature::BudgetTracking => "Budget Tracking",
        }
    }

    /// Marketing description shown in upgrade prompts
    pub fn description(&self) -> &'static str {
        match self {
            Feature::LocationReminders => {
                "Get reminded about your list when you arrive at the store."
            }
            Feature::DataSharing => {
                "Easily share and export your shopping lists with family and friends."
            }
            Feature::ItemImages => "Attach photos to items so you always buy the right one.",
            Feature::BudgetTracking => {
                "Set a budget for each list and see how much you have left as you shop."
            }
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A numeric allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Limited(u32),
    Unlimited,
}

impl Quota {
    /// True if `used` more units still fit under the quota
    pub fn allows(&self, used: u64) -> bool {
        match self {
            Quota::Limited(max) => used < u64::from(*max),
            Quota::Unlimited => true,
        }
    }
}

pub fn list_quota(tier: Tier) -> Quota {
    match tier {
        Tier::Free => Quota::Limited(FREE_LIST_LIMIT),
        Tier::Premium => Quota::Unlimited,
    }
}

pub fn notification_quota(tier: Tier) -> Quota {
    match tier {
        Tier::Free => Quota::Limited(FREE_NOTIFICATION_LIMIT),
        Tier::Premium => Quota::Unlimited,
    }
}

pub fn permits_list_category(tier: Tier, category: ListCategory) -> bool {
    tier.is_premium() || FREE_LIST_CATEGORIES.contains(&category)
}

pub fn permits_item_category(tier: Tier, category: ItemCategory) -> bool {
    tier.is_premium() || FREE_ITEM_CATEGORIES.contains(&category)
}

pub fn permits_unit(tier: Tier, unit: Unit) -> bool {
    tier.is_premium() || FREE_UNITS.contains(&unit)
}

pub fn permits_feature(tier: Tier, _feature: Feature) -> bool {
    tier.is_premium()
}

/// Prompt shown when a free user reaches for a premium feature
pub fn upgrade_prompt(feature: Feature) -> String {
    format!(
        "{} is a Premium feature. {} Upgrade to Premium to unlock it.",
        feature.title(),
        feature.description()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_tier() -> impl Strategy<Value = Tier> {
        prop_oneof![Just(Tier::Free), Just(Tier::Premium)]
    }

    proptest! {
        #[test]
        fn list_quota_matches_rule(tier in any_tier(), n in 0u64..1000) {
            prop_assert_eq!(list_quota(tier).allows(n), tier.is_premium() || n < 3);
        }

        #[test]
        fn notification_quota_matches_rule(tier in any_tier(), n in 0u64..1000) {
            prop_assert_eq!(notification_quota(tier).allows(n), tier.is_premium() || n < 5);
        }
    }

    #[test]
    fn free_list_categories() {
        assert!(permits_list_category(Tier::Free, ListCategory::Groceries));
        assert!(!permits_list_category(Tier::Free, ListCategory::Electronics));
        assert!(permits_list_category(Tier::Premium, ListCategory::Groceries));
        assert!(permits_list_category(Tier::Premium, ListCategory::Electronics));
    }

    #[test]
    fn free_allow_lists_are_exact() {
        let allowed: Vec<_> = ListCategory::ALL
            .into_iter()
            .filter(|c| permits_list_category(Tier::Free, *c))
            .map(|c| c.as_str())
            .collect();
        assert_eq!(allowed, vec!["groceries", "household", "personal"]);

        let allowed: Vec<_> = ItemCategory::ALL
            .into_iter()
            .filter(|c| permits_item_category(Tier::Free, *c))
            .map(|c| c.as_str())
            .collect();
        assert_eq!(
            allowed,
            vec!["groceries", "dairy", "produce", "household", "personal_care", "other"]
        );

        let allowed: Vec<_> = Unit::ALL
            .into_iter()
            .filter(|u| permits_unit(Tier::Free, *u))
            .map(|u| u.as_str())
            .collect();
        assert_eq!(
            allowed,
            vec!["none", "piece", "kilogram", "gram", "liter", "milliliter", "pack", "bottle"]
        );
    }

    #[test]
    fn premium_permits_everything() {
        assert!(ListCategory::ALL.iter().all(|c| permits_list_category(Tier::Premium, *c)));
        assert!(ItemCategory::ALL.iter().all(|c| permits_item_category(Tier::Premium, *c)));
        assert!(Unit::ALL.iter().all(|u| permits_unit(Tier::Premium, *u)));
        assert!(Feature::ALL.iter().all(|f| permits_feature(Tier::Premium, *f)));
        assert!(Feature::ALL.iter().all(|f| !permits_feature(Tier::Free, *f)));
    }

    #[test]
    fn data_sharing_prompt() {
        let prompt = upgrade_prompt(Feature::DataSharing);
        assert!(prompt.contains("share and export"));
        assert!(prompt.contains("Upgrade to Premium"));
    }

    #[test]
    fn every_prompt_has_description_and_call_to_action() {
        for feature in Feature::ALL {
            let prompt = upgrade_prompt(feature);
            assert!(prompt.contains(feature.description()));
            assert!(prompt.contains("Upgrade to Premium"));
        }
    }

    #[test]
    fn tier_parsing() {
        assert_eq!("Premium".parse::<Tier>(), Ok(Tier::Premium));
        assert_eq!("free".parse::<Tier>(), Ok(Tier::Free));
        assert!("gold".parse::<Tier>().is_err());
    }
}

//! Entitlement checks shared by commands

use anyhow::{bail, Result};
use chrono::Utc;

use crate::domain::policy::{FREE_LIST_LIMIT, FREE_NOTIFICATION_LIMIT};
use crate::domain::{Feature, ItemCategory, ListCategory, Unit};
use crate::storage::{EntitlementStore, KeyValueStore};

/// Fails with the feature's upgrade prompt unless the tier unlocks it
pub fn feature<K: KeyValueStore>(plan: &EntitlementStore<K>, feature: Feature) -> Result<()> {
    if !plan.can_use_feature(feature) {
        bail!("{}", plan.upgrade_prompt(feature));
    }
    Ok(())
}

pub fn list_category<K: KeyValueStore>(
    plan: &EntitlementStore<K>,
    category: ListCategory,
) -> Result<()> {
    if !plan.can_use_list_category(category) {
        bail!(
            "The {} list category is a Premium option. Upgrade to Premium to use every category.",
            category.label()
        );
    }
    Ok(())
}

pub fn item_category<K: KeyValueStore>(
    plan: &EntitlementStore<K>,
    category: ItemCategory,
) -> Result<()> {
    if !plan.can_use_item_category(category) {
        bail!(
            "The {} item category is a Premium option. Upgrade to Premium to use every category.",
            category.label()
        );
    }
    Ok(())
}

pub fn unit<K: KeyValueStore>(plan: &EntitlementStore<K>, unit: Unit) -> Result<()> {
    if !plan.can_use_unit(unit) {
        bail!(
            "The '{}' unit is a Premium option. Upgrade to Premium to use every unit.",
            unit.as_str()
        );
    }
    Ok(())
}

pub fn new_list<K: KeyValueStore>(plan: &EntitlementStore<K>, existing: usize) -> Result<()> {
    if !plan.can_create_list(existing) {
        bail!(
            "The free plan holds up to {} lists. Upgrade to Premium for unlimited lists.",
            FREE_LIST_LIMIT
        );
    }
    Ok(())
}

pub fn notification<K: KeyValueStore>(plan: &EntitlementStore<K>) -> Result<()> {
    if !plan.notification_allowed(Utc::now()) {
        bail!(
            "The free plan sends up to {} reminders a month. Upgrade to Premium for unlimited reminders.",
            FREE_NOTIFICATION_LIMIT
        );
    }
    Ok(())
}

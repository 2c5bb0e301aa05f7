//! Entitlement store: the user's tier plus usage counters
//!
//! The tier is derived from two persisted keys, `isPremium` (`"true"` /
//! `"false"`) and `subscriptionTier` (`"free"` / `"premium"`). `isPremium`
//! is authoritative when both are present. Counters are persisted alongside
//! so quotas hold across restarts; the notification counter resets at the
//! start of each calendar month.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::kv::KeyValueStore;
use super::store::StoreError;
use crate::domain::policy::{self, Feature, Tier};
use crate::domain::{ItemCategory, ListCategory, Unit};

pub const KEY_IS_PREMIUM: &str = "isPremium";
pub const KEY_TIER: &str = "subscriptionTier";
pub const KEY_LISTS_CREATED: &str = "listsCreated";
pub const KEY_NOTIFICATIONS_SENT: &str = "notificationsSent";
pub const KEY_NOTIFICATION_PERIOD: &str = "notificationPeriod";

fn period_of(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Tier and usage counters, persisted through a [`KeyValueStore`]
#[derive(Debug)]
pub struct EntitlementStore<K> {
    kv: K,
    tier: Tier,
    lists_created: u32,
    notifications_sent: u32,
    notification_period: String,
}

impl<K: KeyValueStore> EntitlementStore<K> {
    /// Loads state from `kv`. Missing or malformed values fall back to the
    /// free tier and zero counters.
    pub fn load(kv: K) -> Self {
        let tier = Self::read_tier(&kv);
        let lists_created = Self::read_counter(&kv, KEY_LISTS_CREATED);
        let notifications_sent = Self::read_counter(&kv, KEY_NOTIFICATIONS_SENT);
        let notification_period = kv
            .get(KEY_NOTIFICATION_PERIOD)
            .unwrap_or_else(|| period_of(Utc::now()));

        debug!(%tier, lists_created, notifications_sent, "loaded entitlements");

        Self {
            kv,
            tier,
            lists_created,
            notifications_sent,
            notification_period,
        }
    }

    fn read_tier(kv: &K) -> Tier {
        let flag = kv.get(KEY_IS_PREMIUM);
        let named = kv.get(KEY_TIER);

        let from_flag = match flag.as_deref() {
            Some("true") => Some(Tier::Premium),
            Some("false") => Some(Tier::Free),
            Some(other) => {
                warn!(value = other, "ignoring malformed {}", KEY_IS_PREMIUM);
                None
            }
            None => None,
        };
        let from_name = named.as_deref().and_then(|s| match s.parse::<Tier>() {
            Ok(tier) => Some(tier),
            Err(e) => {
                warn!("ignoring {}: {}", KEY_TIER, e);
                None
            }
        });

        match (from_flag, from_name) {
            (Some(a), Some(b)) if a != b => {
                warn!(flag = %a, named = %b, "tier keys disagree, using {}", KEY_IS_PREMIUM);
                a
            }
            (Some(tier), _) | (None, Some(tier)) => tier,
            (None, None) => Tier::Free,
        }
    }

    fn read_counter(kv: &K, key: &str) -> u32 {
        kv.get(key)
            .and_then(|v| match v.parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(key, value = %v, "ignoring malformed counter");
                    None
                }
            })
            .unwrap_or(0)
    }

    pub fn is_premium(&self) -> bool {
        self.tier.is_premium()
    }

    pub fn current_tier(&self) -> Tier {
        self.tier
    }

    /// True if another list may be created given how many already exist
    pub fn can_create_list(&self, existing_list_count: usize) -> bool {
        policy::list_quota(self.tier).allows(existing_list_count as u64)
    }

    /// True if another notification may be sent given how many went out
    /// this period
    pub fn can_send_notification(&self, sent_this_period: u32) -> bool {
        policy::notification_quota(self.tier).allows(u64::from(sent_this_period))
    }

    /// [`Self::can_send_notification`] against the store's own counter
    pub fn notification_allowed(&self, now: DateTime<Utc>) -> bool {
        self.can_send_notification(self.notifications_sent_at(now))
    }

    pub fn can_use_list_category(&self, category: ListCategory) -> bool {
        policy::permits_list_category(self.tier, category)
    }

    pub fn can_use_item_category(&self, category: ItemCategory) -> bool {
        policy::permits_item_category(self.tier, category)
    }

    pub fn can_use_unit(&self, unit: Unit) -> bool {
        policy::permits_unit(self.tier, unit)
    }

    pub fn can_use_feature(&self, feature: Feature) -> bool {
        policy::permits_feature(self.tier, feature)
    }

    pub fn upgrade_prompt(&self, feature: Feature) -> String {
        policy::upgrade_prompt(feature)
    }

    pub fn lists_created(&self) -> u32 {
        self.lists_created
    }

    /// Notifications sent in the period containing `now`
    pub fn notifications_sent_at(&self, now: DateTime<Utc>) -> u32 {
        if self.notification_period == period_of(now) {
            self.notifications_sent
        } else {
            0
        }
    }

    pub fn increment_list_count(&mut self) -> Result<(), StoreError> {
        let created = self.lists_created.saturating_add(1);
        self.kv.set(KEY_LISTS_CREATED, &created.to_string())?;
        self.lists_created = created;
        Ok(())
    }

    /// Records a sent notification
    pub fn increment_notification_count(&mut self) -> Result<(), StoreError> {
        self.increment_notification_count_at(Utc::now())
    }

    pub fn increment_notification_count_at(&mut self, now: DateTime<Utc>) -> Result<(), StoreError> {
        let period = period_of(now);
        let sent = if self.notification_period == period {
            self.notifications_sent.saturating_add(1)
        } else {
            debug!(from = %self.notification_period, to = %period, "new notification period");
            1
        };

        self.set_pair(
            (KEY_NOTIFICATION_PERIOD, period.as_str()),
            (KEY_NOTIFICATIONS_SENT, sent.to_string().as_str()),
        )?;
        self.notification_period = period;
        self.notifications_sent = sent;
        Ok(())
    }

    fn set_tier(&mut self, tier: Tier) -> Result<(), StoreError> {
        let flag = if tier.is_premium() { "true" } else { "false" };
        self.set_pair((KEY_IS_PREMIUM, flag), (KEY_TIER, tier.as_str()))?;
        if self.tier != tier {
            info!(from = %self.tier, to = %tier, "subscription tier changed");
        }
        self.tier = tier;
        Ok(())
    }

    /// Writes two keys together. If the second write fails the first key is
    /// put back to its previous value.
    fn set_pair(&mut self, first: (&str, &str), second: (&str, &str)) -> Result<(), StoreError> {
        let previous = self.kv.get(first.0);
        self.kv.set(first.0, first.1)?;

        if let Err(e) = self.kv.set(second.0, second.1) {
            let restored = match previous {
                Some(value) => self.kv.set(first.0, &value),
                None => self.kv.remove(first.0),
            };
            if let Err(rollback) = restored {
                warn!(key = first.0, error = %rollback, "failed to roll back key");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Completes a (mock) purchase of the premium tier
    pub fn purchase_premium(&mut self) -> Result<(), StoreError> {
        self.set_tier(Tier::Premium)
    }

    /// Re-reads the persisted tier and returns it
    pub fn restore_purchases(&mut self) -> Result<Tier, StoreError> {
        let tier = Self::read_tier(&self.kv);
        self.set_tier(tier)?;
        Ok(tier)
    }

    /// Drops back to the free tier (e.g., after a subscription lapses)
    pub fn downgrade(&mut self) -> Result<(), StoreError> {
        self.set_tier(Tier::Free)
    }

    /// Clears every persisted key and counter
    pub fn reset(&mut self) -> Result<(), StoreError> {
        for key in [
            KEY_IS_PREMIUM,
            KEY_TIER,
            KEY_LISTS_CREATED,
            KEY_NOTIFICATIONS_SENT,
            KEY_NOTIFICATION_PERIOD,
        ] {
            self.kv.remove(key)?;
        }
        self.tier = Tier::Free;
        self.lists_created = 0;
        self.notifications_sent = 0;
        self.notification_period = period_of(Utc::now());
        Ok(())
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }
}

//! Subscription plan commands

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use tracing::info;

use super::output::Output;
use crate::domain::policy::{list_quota, notification_quota};
use crate::domain::{Feature, Quota, Tier};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the current plan, quotas and features
    Status,

    /// Purchase Premium
    Upgrade,

    /// Restore a previous purchase
    Restore,

    /// Return to the free plan
    Downgrade,
}

pub fn run(cmd: PlanCommands, output: &Output) -> Result<()> {
    match cmd {
        PlanCommands::Status => status(output),
        PlanCommands::Upgrade => upgrade(output),
        PlanCommands::Restore => restore(output),
        PlanCommands::Downgrade => downgrade(output),
    }
}

fn quota_text(used: usize, quota: Quota) -> String {
    match quota {
        Quota::Limited(max) => format!("{}/{}", used, max),
        Quota::Unlimited => format!("{} (unlimited)", used),
    }
}

fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let plan = project.entitlements()?;
    let repo = project.repository()?;

    let tier = plan.current_tier();
    let lists = repo.lists().len();
    let sent = plan.notifications_sent_at(Utc::now()) as usize;

    if output.is_json() {
        let features: Vec<_> = Feature::ALL
            .iter()
            .map(|f| {
                serde_json::json!({
                    "feature": f,
                    "available": plan.can_use_feature(*f),
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "tier": tier.as_str(),
            "lists": lists,
            "lists_created": plan.lists_created(),
            "can_create_list": plan.can_create_list(lists),
            "notifications_sent": sent,
            "features": features,
        }));
        return Ok(());
    }

    let label = match tier {
        Tier::Free => "Free",
        Tier::Premium => "Premium",
    };
    output.line(&format!("Plan: {}", label));
    output.line(&format!("Lists: {}", quota_text(lists, list_quota(tier))));
    output.line(&format!(
        "Reminders this month: {}",
        quota_text(sent, notification_quota(tier))
    ));
    output.blank();
    for feature in Feature::ALL {
        let state = if plan.can_use_feature(feature) {
            "available"
        } else {
            "locked"
        };
        output.row(&[feature.title(), state]);
    }

    Ok(())
}

fn upgrade(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut plan = project.entitlements()?;

    if plan.is_premium() {
        output.success("Already on Premium.");
        return Ok(());
    }

    plan.purchase_premium()?;
    info!("upgraded to premium");
    output.success("Welcome to Premium! Every feature is now unlocked.");
    Ok(())
}

fn restore(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut plan = project.entitlements()?;

    match plan.restore_purchases()? {
        Tier::Premium => output.success("Purchases restored. You're on Premium."),
        Tier::Free => output.success("No previous purchase found. You're on the free plan."),
    }
    Ok(())
}

fn downgrade(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut plan = project.entitlements()?;

    plan.downgrade()?;
    info!("downgraded to free");
    output.success("Switched to the free plan.");
    Ok(())
}

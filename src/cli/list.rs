//! List CLI commands

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::gate;
use super::output::Output;
use crate::domain::export::{format_price, format_quantity};
use crate::domain::{Feature, ListCategory, ListId, Location, ShoppingList};
use crate::storage::{EntitlementStore, KeyValueStore, ObjectStore, Project, Repository};

#[derive(Subcommand)]
pub enum ListCommands {
    /// Create a list
    ///
    /// Examples:
    ///   basket list new "Weekly shop"
    ///   basket list new "Party" --category party --budget 80
    ///   basket list new "Staples" --template
    New {
        /// List name
        name: String,

        /// List category (defaults to the project config)
        #[arg(long, short)]
        category: Option<ListCategory>,

        /// Spending budget (Premium)
        #[arg(long)]
        budget: Option<Decimal>,

        /// Save as a reusable template
        #[arg(long)]
        template: bool,
    },

    /// Show all lists
    #[command(alias = "list")]
    Ls {
        /// Only show templates
        #[arg(long)]
        templates: bool,
    },

    /// Show a list and its items
    Show {
        /// List ID or name
        list: String,
    },

    /// Delete a list and its items
    Rm {
        /// List ID or name
        list: String,
    },

    /// Rename a list or change its category
    Rename {
        /// List ID or name
        list: String,

        /// New name
        #[arg(required_unless_present = "category")]
        name: Option<String>,

        /// New category
        #[arg(long, short)]
        category: Option<ListCategory>,
    },

    /// Create a list from a template's items
    FromTemplate {
        /// Template ID or name
        template: String,

        /// Name for the new list
        name: String,
    },

    /// Attach a store location for reminders (Premium)
    Locate {
        /// List ID or name
        list: String,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Reminder radius in meters
        #[arg(long)]
        radius: Option<f64>,

        /// Place name
        #[arg(long)]
        label: Option<String>,
    },

    /// Send a reminder for a list's remaining items
    Remind {
        /// List ID or name
        list: String,
    },

    /// Remove completed items
    ClearCompleted {
        /// List ID or name
        list: String,
    },
}

pub fn run(cmd: ListCommands, output: &Output) -> Result<()> {
    match cmd {
        ListCommands::New {
            name,
            category,
            budget,
            template,
        } => new_list(output, &name, category, budget, template),
        ListCommands::Ls { templates } => list_lists(output, templates),
        ListCommands::Show { list } => show_list(output, &list),
        ListCommands::Rm { list } => remove_list(output, &list),
        ListCommands::Rename {
            list,
            name,
            category,
        } => rename_list(output, &list, name.as_deref(), category),
        ListCommands::FromTemplate { template, name } => from_template(output, &template, &name),
        ListCommands::Locate {
            list,
            lat,
            lon,
            radius,
            label,
        } => locate_list(output, &list, lat, lon, radius, label),
        ListCommands::Remind { list } => remind(output, &list),
        ListCommands::ClearCompleted { list } => clear_completed(output, &list),
    }
}

/// Resolves a list by ID or case-insensitive name
pub(super) fn resolve<S: ObjectStore>(repo: &Repository<S>, needle: &str) -> Result<ListId> {
    match repo.find_list(needle) {
        Some(list) => Ok(list.id.clone()),
        None => bail!("List not found: {}", needle),
    }
}

fn fetch<S: ObjectStore>(repo: &Repository<S>, id: &ListId) -> Result<ShoppingList> {
    repo.list(id)
        .cloned()
        .with_context(|| format!("List not found: {}", id))
}

fn new_list(
    output: &Output,
    name: &str,
    category: Option<ListCategory>,
    budget: Option<Decimal>,
    template: bool,
) -> Result<()> {
    let project = Project::open_current()?;
    let mut plan = project.entitlements()?;
    let mut repo = project.repository()?;

    gate::new_list(&plan, repo.lists().len())?;

    let category = category.unwrap_or(project.config().project.default_list_category);
    gate::list_category(&plan, category)?;

    let mut list = ShoppingList::new(name, category)?;
    list.is_template = template;
    if budget.is_some() {
        gate::feature(&plan, Feature::BudgetTracking)?;
        list.set_budget(budget)?;
    }

    let id = list.id.clone();
    repo.add_list(list)?;
    record_created(&mut plan);
    debug!(list = %id, lists_created = plan.lists_created(), "list created");

    let list = fetch(&repo, &id)?;
    if output.is_json() {
        output.data(&list);
    } else {
        let kind = if list.is_template { "template" } else { "list" };
        output.success(&format!("Created {}: {} - {}", kind, list.id, list.name));
    }

    Ok(())
}

/// Bumps the lists-created counter. The list is already saved, so a
/// failed write is only logged.
fn record_created<K: KeyValueStore>(plan: &mut EntitlementStore<K>) {
    if let Err(e) = plan.increment_list_count() {
        warn!(error = %e, "list saved but the lists-created counter was not updated");
    }
}

fn list_lists(output: &Output, templates_only: bool) -> Result<()> {
    let project = Project::open_current()?;
    let repo = project.repository()?;

    let lists: Vec<&ShoppingList> = if templates_only {
        repo.templates().collect()
    } else {
        repo.lists().iter().collect()
    };

    if output.is_json() {
        let lists: Vec<_> = lists
            .iter()
            .map(|l| {
                serde_json::json!({
                    "id": l.id.to_string(),
                    "name": l.name,
                    "category": l.category,
                    "items": l.items.len(),
                    "completed": l.completed_count(),
                    "is_template": l.is_template,
                    "is_shared": l.is_shared,
                })
            })
            .collect();
        output.data(&lists);
        return Ok(());
    }

    if lists.is_empty() {
        if templates_only {
            output.success("No templates yet. Create one with 'basket list new NAME --template'.");
        } else {
            output.success("No lists yet. Create one with 'basket list new NAME'.");
        }
        return Ok(());
    }

    for list in lists {
        let progress = format!("{}/{}", list.completed_count(), list.items.len());
        let marker = if list.is_template { "template" } else { "" };
        output.row(&[
            &list.id.to_string(),
            &list.name,
            list.category.label(),
            &progress,
            marker,
        ]);
    }

    Ok(())
}

fn show_list(output: &Output, needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let repo = project.repository()?;
    let id = resolve(&repo, needle)?;
    let list = fetch(&repo, &id)?;

    if output.is_json() {
        output.data(&list);
        return Ok(());
    }

    let symbol = project.currency().symbol();

    output.line(&format!("{} ({})", list.name, list.id));
    output.line(&format!("Category: {}", list.category.label()));
    if list.is_template {
        output.line("Template: yes");
    }
    if list.is_shared {
        output.line(&format!("Shared with: {}", list.shared_with.join(", ")));
    }
    if let Some(budget) = list.budget {
        let estimated = match list.estimated_total() {
            Some(total) => format!("{}{}", symbol, format_price(total)),
            None => "n/a".to_string(),
        };
        output.line(&format!(
            "Budget: {}{} (estimated {})",
            symbol,
            format_price(budget),
            estimated
        ));
        if list.is_over_budget() {
            output.line("Over budget!");
        }
    }
    if let Some(location) = &list.location {
        let label = location.label.as_deref().unwrap_or("Store");
        output.line(&format!(
            "Location: {} ({:.5}, {:.5}) within {}m",
            label, location.latitude, location.longitude, location.radius_meters
        ));
    }
    output.blank();

    if list.items.is_empty() {
        output.line("No items.");
        return Ok(());
    }

    for (position, item) in list.items.iter().enumerate() {
        let mark = if item.is_completed { "✅" } else { "⭕" };
        let mut quantity = format_quantity(item.quantity);
        if !item.unit.is_none() {
            quantity.push(' ');
            quantity.push_str(item.unit.abbreviation());
        }
        let price = item
            .price_per_unit
            .map(|p| format!("{}{}", symbol, format_price(p)))
            .unwrap_or_default();
        output.row(&[
            &position.to_string(),
            &item.id.to_string(),
            mark,
            &item.name,
            &quantity,
            &price,
        ]);
    }

    Ok(())
}

fn remove_list(output: &Output, needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let id = resolve(&repo, needle)?;
    let name = fetch(&repo, &id)?.name;

    repo.delete_list(&id)?;

    output.success(&format!("Deleted list: {} - {}", id, name));
    Ok(())
}

fn rename_list(
    output: &Output,
    needle: &str,
    name: Option<&str>,
    category: Option<ListCategory>,
) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let id = resolve(&repo, needle)?;

    let mut list = fetch(&repo, &id)?;
    if let Some(name) = name {
        list.rename(name)?;
    }
    if let Some(category) = category {
        let plan = project.entitlements()?;
        gate::list_category(&plan, category)?;
        list.set_category(category);
    }
    repo.update_list(list)?;

    let list = fetch(&repo, &id)?;
    if output.is_json() {
        output.data(&list);
    } else {
        output.success(&format!(
            "Updated list {}: {} ({})",
            id,
            list.name,
            list.category.label()
        ));
    }
    Ok(())
}

fn from_template(output: &Output, template: &str, name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut plan = project.entitlements()?;
    let mut repo = project.repository()?;

    let template_id = resolve(&repo, template)?;
    gate::new_list(&plan, repo.lists().len())?;

    let Some(id) = repo.instantiate_template(&template_id, name)? else {
        bail!("Template not found: {}", template);
    };
    record_created(&mut plan);

    let list = fetch(&repo, &id)?;
    if output.is_json() {
        output.data(&list);
    } else {
        output.success(&format!(
            "Created list: {} - {} ({} items)",
            list.id,
            list.name,
            list.items.len()
        ));
    }

    Ok(())
}

fn locate_list(
    output: &Output,
    needle: &str,
    lat: f64,
    lon: f64,
    radius: Option<f64>,
    label: Option<String>,
) -> Result<()> {
    let project = Project::open_current()?;
    let plan = project.entitlements()?;
    gate::feature(&plan, Feature::LocationReminders)?;

    let mut repo = project.repository()?;
    let id = resolve(&repo, needle)?;

    let mut location = Location::new(lat, lon)?;
    if let Some(radius) = radius {
        location = location.with_radius(radius)?;
    }
    if let Some(label) = label {
        location = location.with_label(label);
    }

    let mut list = fetch(&repo, &id)?;
    list.set_location(Some(location));
    repo.update_list(list)?;

    output.success(&format!("Set location for list {}", id));
    Ok(())
}

fn remind(output: &Output, needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut plan = project.entitlements()?;
    let repo = project.repository()?;
    let id = resolve(&repo, needle)?;
    let list = fetch(&repo, &id)?;

    gate::notification(&plan)?;

    let remaining = list.items.len() - list.completed_count();
    plan.increment_notification_count()?;
    debug!(
        list = %id,
        sent = plan.notifications_sent_at(Utc::now()),
        "reminder sent"
    );

    let message = match remaining {
        0 => format!("Reminder for {}: everything is checked off", list.name),
        1 => format!("Reminder for {}: 1 item left", list.name),
        n => format!("Reminder for {}: {} items left", list.name, n),
    };
    output.success(&message);
    Ok(())
}

fn clear_completed(output: &Output, needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let id = resolve(&repo, needle)?;

    let removed = repo.clear_completed(&id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "list": id.to_string(),
            "removed": removed,
        }));
    } else {
        output.success(&format!("Removed {} completed item(s) from {}", removed, id));
    }
    Ok(())
}

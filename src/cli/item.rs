//! Item CLI commands

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use super::gate;
use super::list::resolve;
use super::output::Output;
use crate::domain::{Feature, Item, ItemCategory, ItemId, Priority, ShoppingList, Unit};
use crate::storage::{EntitlementStore, KeyValueStore, Project};

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to a list
    ///
    /// Examples:
    ///   basket item add Weekly Milk --qty 2 --unit liter --category dairy
    ///   basket item add Weekly Apples --price 0.45 --notes "Granny Smith"
    Add {
        /// List ID or name
        list: String,

        /// Item name
        name: String,

        #[command(flatten)]
        fields: ItemFields,

        /// Attach a photo of the item (Premium)
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Remove an item
    Rm {
        /// List ID or name
        list: String,

        /// Item ID or name
        item: String,
    },

    /// Toggle an item's completed state
    Done {
        /// List ID or name
        list: String,

        /// Item ID or name
        item: String,
    },

    /// Move an item within its list
    ///
    /// Positions are zero-based, as shown by 'basket list show'. TO is the
    /// position the item is placed in front of, so moving 0 to 2 in
    /// [A, B, C] gives [B, A, C].
    Mv {
        /// List ID or name
        list: String,

        /// Current position
        from: usize,

        /// Destination position
        to: usize,
    },

    /// Change an item's fields
    Edit {
        /// List ID or name
        list: String,

        /// Item ID or name
        item: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ItemFields,

        /// Remove the price
        #[arg(long, conflicts_with = "price")]
        clear_price: bool,
    },
}

/// Optional fields shared by `add` and `edit`
#[derive(Args)]
pub struct ItemFields {
    /// Quantity to buy
    #[arg(long, short)]
    qty: Option<Decimal>,

    /// Unit of measure
    #[arg(long, short)]
    unit: Option<Unit>,

    /// Item category
    #[arg(long, short)]
    category: Option<ItemCategory>,

    /// Price per unit
    #[arg(long, short)]
    price: Option<Decimal>,

    /// Preferred brand
    #[arg(long)]
    brand: Option<String>,

    /// Free-form notes
    #[arg(long, short)]
    notes: Option<String>,

    /// Priority (low, normal, high)
    #[arg(long)]
    priority: Option<Priority>,
}

impl ItemFields {
    /// Checks tier-restricted values before anything is written
    fn check<K: KeyValueStore>(&self, plan: &EntitlementStore<K>) -> Result<()> {
        if let Some(category) = self.category {
            gate::item_category(plan, category)?;
        }
        if let Some(unit) = self.unit {
            gate::unit(plan, unit)?;
        }
        Ok(())
    }

    fn apply(self, item: &mut Item) -> Result<()> {
        if let Some(qty) = self.qty {
            item.set_quantity(qty)?;
        }
        if let Some(price) = self.price {
            item.set_price(Some(price))?;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(brand) = self.brand {
            item.brand = Some(brand).filter(|b| !b.trim().is_empty());
        }
        if let Some(notes) = self.notes {
            item.set_notes(Some(notes));
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        Ok(())
    }
}

pub fn run(cmd: ItemCommands, output: &Output) -> Result<()> {
    match cmd {
        ItemCommands::Add {
            list,
            name,
            fields,
            image,
        } => add_item(output, &list, &name, fields, image),
        ItemCommands::Rm { list, item } => remove_item(output, &list, &item),
        ItemCommands::Done { list, item } => toggle_item(output, &list, &item),
        ItemCommands::Mv { list, from, to } => move_item(output, &list, from, to),
        ItemCommands::Edit {
            list,
            item,
            name,
            fields,
            clear_price,
        } => edit_item(output, &list, &item, name, fields, clear_price),
    }
}

/// Resolves an item by ID or case-insensitive name within a list
fn resolve_item(list: &ShoppingList, needle: &str) -> Result<ItemId> {
    if let Ok(id) = needle.parse::<ItemId>() {
        if list.item(&id).is_some() {
            return Ok(id);
        }
    }
    let wanted = needle.trim().to_lowercase();
    match list.items.iter().find(|i| i.normalized_name() == wanted) {
        Some(item) => Ok(item.id.clone()),
        None => bail!("Item not found in {}: {}", list.name, needle),
    }
}

fn add_item(
    output: &Output,
    list_needle: &str,
    name: &str,
    fields: ItemFields,
    image: Option<PathBuf>,
) -> Result<()> {
    let project = Project::open_current()?;
    let plan = project.entitlements()?;
    let mut repo = project.repository()?;
    let list_id = resolve(&repo, list_needle)?;

    fields.check(&plan)?;
    let mut item = Item::new(name)?;
    fields.apply(&mut item)?;

    if let Some(path) = image {
        gate::feature(&plan, Feature::ItemImages)?;
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        item = item.with_image(bytes);
    }

    let id = item.id.clone();
    repo.add_item(&list_id, item.clone())?;
    project.save_history(&repo)?;

    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("Added item: {} - {}", id, item.name));
    }

    Ok(())
}

fn remove_item(output: &Output, list_needle: &str, item_needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let list_id = resolve(&repo, list_needle)?;
    let item_id = match repo.list(&list_id) {
        Some(list) => resolve_item(list, item_needle)?,
        None => bail!("List not found: {}", list_needle),
    };

    repo.remove_item(&list_id, &item_id)?;

    output.success(&format!("Removed item: {}", item_id));
    Ok(())
}

fn toggle_item(output: &Output, list_needle: &str, item_needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let list_id = resolve(&repo, list_needle)?;
    let item_id = match repo.list(&list_id) {
        Some(list) => resolve_item(list, item_needle)?,
        None => bail!("List not found: {}", list_needle),
    };

    repo.toggle_completion(&list_id, &item_id)?;

    let item = repo
        .list(&list_id)
        .and_then(|l| l.item(&item_id))
        .with_context(|| format!("Item not found: {}", item_id))?;

    if output.is_json() {
        output.data(item);
    } else if item.is_completed {
        output.success(&format!("Checked off: {}", item.name));
    } else {
        output.success(&format!("Unchecked: {}", item.name));
    }

    Ok(())
}

fn move_item(output: &Output, list_needle: &str, from: usize, to: usize) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let list_id = resolve(&repo, list_needle)?;

    repo.reorder_items(&list_id, from, to)?;

    let list = repo
        .list(&list_id)
        .with_context(|| format!("List not found: {}", list_id))?;
    if output.is_json() {
        let order: Vec<_> = list.items.iter().map(|i| i.name.as_str()).collect();
        output.data(&serde_json::json!({
            "list": list_id.to_string(),
            "order": order,
        }));
    } else {
        for (position, item) in list.items.iter().enumerate() {
            output.row(&[&position.to_string(), &item.name]);
        }
    }

    Ok(())
}

fn edit_item(
    output: &Output,
    list_needle: &str,
    item_needle: &str,
    name: Option<String>,
    fields: ItemFields,
    clear_price: bool,
) -> Result<()> {
    let project = Project::open_current()?;
    let plan = project.entitlements()?;
    let mut repo = project.repository()?;
    let list_id = resolve(&repo, list_needle)?;

    let mut item = {
        let Some(list) = repo.list(&list_id) else {
            bail!("List not found: {}", list_needle);
        };
        let item_id = resolve_item(list, item_needle)?;
        list.item(&item_id)
            .cloned()
            .with_context(|| format!("Item not found: {}", item_id))?
    };

    fields.check(&plan)?;
    if let Some(name) = name {
        item.rename(&name)?;
    }
    fields.apply(&mut item)?;
    if clear_price {
        item.set_price(None)?;
    }

    repo.update_item(&list_id, item.clone())?;

    if output.is_json() {
        output.data(&item);
    } else {
        output.success(&format!("Updated item: {} - {}", item.id, item.name));
    }

    Ok(())
}

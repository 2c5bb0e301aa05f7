//! Share formats for a list: plain text and CSV
//!
//! Both renderings list items alphabetically (case-insensitive) and number
//! them from 1. Categories are deliberately absent from either format.

use rust_decimal::Decimal;

use super::currency::Currency;
use super::item::Item;
use super::list::ShoppingList;

const COMPLETED_MARK: &str = "✅";
const PENDING_MARK: &str = "⭕";
const CART: &str = "🛒";
const FOOTER: &str = "Shared from Basket";

/// Quantity without trailing zeros (`1`, `1.5`)
pub fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}

/// Amount with exactly two decimals
pub fn format_price(price: Decimal) -> String {
    format!("{:.2}", price.round_dp(2))
}

/// Items in export order
pub fn sorted_items(list: &ShoppingList) -> Vec<&Item> {
    let mut items: Vec<&Item> = list.items.iter().collect();
    items.sort_by_cached_key(|i| i.name.to_lowercase());
    items
}

fn text_line(index: usize, item: &Item, symbol: &str) -> String {
    let mark = if item.is_completed {
        COMPLETED_MARK
    } else {
        PENDING_MARK
    };
    let mut line = format!(
        "{}. {} {} ({})",
        index,
        mark,
        item.name,
        format_quantity(item.quantity)
    );
    if !item.unit.is_none() {
        line.push(' ');
        line.push_str(item.unit.abbreviation());
    }
    if let Some(price) = item.price_per_unit {
        line.push_str(&format!(" - {}{}", symbol, format_price(price)));
    }
    if let Some(notes) = &item.notes {
        line.push_str(&format!(" ({})", notes));
    }
    line
}

/// Human-readable share text
pub fn share_text(list: &ShoppingList, currency: &Currency) -> String {
    let symbol = currency.symbol();
    let items = sorted_items(list);

    let mut lines = vec![
        format!("{} {}", CART, list.name),
        String::new(),
        format!("Items ({} total):", items.len()),
    ];
    lines.extend(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| text_line(i + 1, item, &symbol)),
    );
    lines.push(String::new());
    lines.push(FOOTER.to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Quotes a CSV field when it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV rendering, one row per item
pub fn share_csv(list: &ShoppingList, currency: &Currency) -> String {
    let symbol = currency.symbol();
    let mut out = format!(
        "No.,Name,Quantity,Unit,Price ({}),Notes,Completed\n",
        symbol.trim_end()
    );

    for (i, item) in sorted_items(list).into_iter().enumerate() {
        let row = [
            (i + 1).to_string(),
            csv_field(&item.name),
            format_quantity(item.quantity),
            csv_field(item.unit.abbreviation()),
            item.price_per_unit.map(format_price).unwrap_or_default(),
            csv_field(item.notes.as_deref().unwrap_or("")),
            if item.is_completed { "Yes" } else { "No" }.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// File name for a list's CSV export: spaces become underscores and
/// anything outside `[A-Za-z0-9_-]` is dropped
pub fn export_file_name(list_name: &str) -> String {
    let stem: String = list_name
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .collect();

    if stem.is_empty() {
        "shopping_list.csv".to_string()
    } else {
        format!("{}.csv", stem)
    }
}

//! Share command

use anyhow::{Context, Result};

use super::gate;
use super::list::resolve;
use super::output::Output;
use crate::domain::export::share_text;
use crate::domain::Feature;
use crate::storage::{shareable_items, Project};

pub fn run(output: &Output, needle: &str, csv: bool, targets: &[String]) -> Result<()> {
    let project = Project::open_current()?;
    let plan = project.entitlements()?;
    gate::feature(&plan, Feature::DataSharing)?;

    let mut repo = project.repository()?;
    let id = resolve(&repo, needle)?;

    if !targets.is_empty() {
        let mut list = repo
            .list(&id)
            .cloned()
            .with_context(|| format!("List not found: {}", id))?;
        for target in targets {
            list.share_with(target.trim());
        }
        repo.update_list(list)?;
    }

    let list = repo
        .list(&id)
        .with_context(|| format!("List not found: {}", id))?;
    let currency = project.currency();

    if csv {
        let bundle = shareable_items(list, currency, &project.exports_dir()?)?;
        if output.is_json() {
            output.data(&serde_json::json!({
                "text": bundle.text,
                "csv_path": bundle.csv_path,
                "shared_with": list.shared_with,
            }));
        } else {
            output.line(bundle.text.trim_end());
            output.blank();
            output.line(&format!("CSV saved to {}", bundle.csv_path.display()));
        }
    } else {
        let text = share_text(list, currency);
        if output.is_json() {
            output.data(&serde_json::json!({
                "text": text,
                "shared_with": list.shared_with,
            }));
        } else {
            output.line(text.trim_end());
        }
    }

    Ok(())
}

/// Clears a list's sharing state. Allowed on every plan.
pub fn stop(output: &Output, needle: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut repo = project.repository()?;
    let id = resolve(&repo, needle)?;

    let mut list = repo
        .list(&id)
        .cloned()
        .with_context(|| format!("List not found: {}", id))?;
    if !list.is_shared {
        output.success(&format!("List {} is not shared", id));
        return Ok(());
    }
    list.unshare();
    repo.update_list(list)?;

    output.success(&format!("Stopped sharing list {}", id));
    Ok(())
}

use super::ui;
use crate::core::kpi::format_entry_amount;
use crate::core::ledger::{EntryInput, Ledger, entries_latest_first};
use crate::core::model::Business;
use crate::store::BusinessRepository;
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

pub fn add(
    repo: &dyn BusinessRepository,
    business: &str,
    input: &EntryInput,
    currency: &str,
) -> Result<()> {
    let mut ledger = Ledger::new(repo.load());
    let entry = ledger.add_entry(business, input)?.clone();
    repo.save(ledger.businesses())?;
    println!(
        "Added entry {} {} on {}",
        entry.id,
        format_entry_amount(entry.amount, currency),
        entry.date
    );
    Ok(())
}

pub fn edit(
    repo: &dyn BusinessRepository,
    business: &str,
    entry_id: &str,
    input: &EntryInput,
    currency: &str,
) -> Result<()> {
    let mut ledger = Ledger::new(repo.load());
    let entry = ledger.edit_entry(business, entry_id, input)?.clone();
    repo.save(ledger.businesses())?;
    println!(
        "Updated entry {} {} on {}",
        entry.id,
        format_entry_amount(entry.amount, currency),
        entry.date
    );
    Ok(())
}

pub fn delete(repo: &dyn BusinessRepository, business: &str, entry_id: &str) -> Result<()> {
    let mut ledger = Ledger::new(repo.load());
    let removed = ledger.delete_entry(business, entry_id)?;
    repo.save(ledger.businesses())?;
    println!("Deleted entry {}", removed.id);
    Ok(())
}

pub fn list(repo: &dyn BusinessRepository, business: &str, currency: &str) -> Result<()> {
    let ledger = Ledger::new(repo.load());
    let business = ledger
        .find(business)
        .with_context(|| format!("Business not found: {business}"))?;

    println!("\n{}", ui::style_text(&business.name, ui::StyleType::Title));
    if business.entries.is_empty() {
        println!("{}", ui::style_text("No entries yet.", ui::StyleType::Subtle));
        return Ok(());
    }
    println!("{}", entry_table(business, currency));
    Ok(())
}

/// Newest entries first.
fn entry_table(business: &Business, currency: &str) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Description"),
        ui::header_cell("Channel"),
        ui::header_cell("Amount"),
        ui::header_cell("Id"),
    ]);
    for entry in entries_latest_first(business) {
        table.add_row(vec![
            Cell::new(&entry.date),
            ui::format_optional_cell(entry.description(), str::to_string),
            ui::format_optional_cell(entry.channel(), str::to_string),
            ui::amount_cell(entry.amount, format_entry_amount(entry.amount, currency)),
            Cell::new(&entry.id),
        ]);
    }
    table
}

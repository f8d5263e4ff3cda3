use super::ui;
use crate::core::ledger::Ledger;
use crate::core::model::Business;
use crate::store::BusinessRepository;
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment, Table};

pub fn add(repo: &dyn BusinessRepository, name: &str) -> Result<()> {
    let mut ledger = Ledger::new(repo.load());
    let business = ledger.create_business(name)?.clone();
    repo.save(ledger.businesses())?;
    println!(
        "Added business {} ({})",
        ui::style_text(&business.name, ui::StyleType::TotalLabel),
        business.id
    );
    Ok(())
}

/// Removes a business together with all its entries.
pub fn remove(repo: &dyn BusinessRepository, key: &str) -> Result<()> {
    let mut ledger = Ledger::new(repo.load());
    let Some(removed) = ledger.remove_business(key) else {
        bail!("Business not found: {key}");
    };
    repo.save(ledger.businesses())?;
    println!(
        "Removed business {} and {} entries",
        ui::style_text(&removed.name, ui::StyleType::TotalLabel),
        removed.entries.len()
    );
    Ok(())
}

pub fn list(repo: &dyn BusinessRepository) -> Result<()> {
    let businesses = repo.load();
    if businesses.is_empty() {
        println!(
            "{}",
            ui::style_text("No businesses yet. Add one with `business add`.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    println!("{}", business_table(&businesses));
    Ok(())
}

fn business_table(businesses: &[Business]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Id"),
        ui::header_cell("Entries"),
    ]);
    for business in businesses {
        table.add_row(vec![
            Cell::new(&business.name),
            Cell::new(&business.id),
            Cell::new(business.entries.len()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

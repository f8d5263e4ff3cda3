use super::ui;
use crate::core::analytics::{Series, aggregate_as_of};
use crate::core::kpi::format_currency;
use crate::core::model::Business;
use crate::core::period::Period;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

/// Prints one business's entries bucketed by `period` with a running total.
pub fn run(business: &Business, period: Period, currency: &str, today: NaiveDate) {
    let series = aggregate_as_of(&business.entries, period, today);
    println!(
        "\n{} {}",
        ui::style_text(&business.name, ui::StyleType::Title),
        ui::style_text(&format!("by {period}"), ui::StyleType::Subtle)
    );
    if series.data.iter().all(|v| *v == 0.0) {
        println!("{}", ui::style_text("No revenue data", ui::StyleType::Subtle));
    }
    if !series.is_empty() {
        println!("{}", chart_table(&series, currency));
    }
}

fn chart_table(series: &Series, currency: &str) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Period"),
        ui::header_cell("Amount"),
        ui::header_cell("Cumulative"),
    ]);
    for ((label, amount), running) in series.points().zip(series.cumulative()) {
        table.add_row(vec![
            Cell::new(label),
            ui::amount_cell(amount, format_currency(amount, currency)),
            ui::amount_cell(running, format_currency(running, currency)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_table() {
        let series = Series {
            labels: vec!["2024-W1".to_string(), "2024-W2".to_string()],
            data: vec![100.0, -40.0],
        };
        let rendered = chart_table(&series, "MAD").to_string();
        assert!(rendered.contains("2024-W1"));
        assert!(rendered.contains("MAD -40"));
        assert!(rendered.contains("MAD 60"));
    }
}

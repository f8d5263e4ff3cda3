use super::ui;
use crate::core::kpi::{Dashboard, format_currency};
use crate::core::model::Business;
use chrono::NaiveDate;
use comfy_table::Table;

pub fn run(businesses: &[Business], currency: &str, today: NaiveDate) {
    let dashboard = Dashboard::compute(businesses, today);

    println!("\n{}", ui::style_text("Dashboard", ui::StyleType::Title));
    println!(
        "{} {}",
        ui::style_text("Net worth:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format_currency(dashboard.net_worth, currency),
            ui::StyleType::TotalValue
        )
    );
    println!(
        "{} {}",
        ui::style_text("Trend (MoM):", ui::StyleType::TotalLabel),
        ui::style_trend(&dashboard.trend.to_string(), dashboard.trend.trend())
    );
    println!(
        "{} {} {}",
        ui::style_text("Profit margin (YTD):", ui::StyleType::TotalLabel),
        ui::style_trend(&dashboard.profit_margin_text(), dashboard.profit_margin_trend()),
        ui::style_trend(
            &format!("({} YoY)", dashboard.profit_margin_delta),
            dashboard.profit_margin_delta.trend()
        )
    );

    if dashboard.revenue_by_month.is_empty() {
        println!(
            "\n{}",
            ui::style_text("No dated entries yet.", ui::StyleType::Subtle)
        );
        return;
    }
    ui::print_separator();
    println!("{}", overview_table(&dashboard, currency));
}

/// Revenue by month alongside the running wealth total.
fn overview_table(dashboard: &Dashboard, currency: &str) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Revenue"),
        ui::header_cell("Wealth"),
    ]);
    for ((label, revenue), wealth) in dashboard
        .revenue_by_month
        .points()
        .zip(dashboard.wealth_by_month.data.iter().copied())
    {
        table.add_row(vec![
            comfy_table::Cell::new(label),
            ui::amount_cell(revenue, format_currency(revenue, currency)),
            ui::amount_cell(wealth, format_currency(wealth, currency)),
        ]);
    }
    table
}

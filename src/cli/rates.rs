use super::ui;
use crate::core::Repository;
use crate::core::views::{DateRange, ExchangeExplorer, ViewState};
use anyhow::Result;
use comfy_table::Cell;

pub fn render(explorer: &ExchangeExplorer) -> String {
    let mut output = String::new();

    let Some(currency) = explorer.selected() else {
        output.push_str(&ui::empty_state("No active currencies to analyse."));
        return output;
    };

    let ranges: Vec<String> = DateRange::ALL_OPTIONS
        .iter()
        .map(|r| {
            if *r == explorer.range() {
                ui::style_text(&format!("[{r}]"), ui::StyleType::Label)
            } else {
                ui::style_text(&r.to_string(), ui::StyleType::Subtle)
            }
        })
        .collect();

    output.push_str(&format!(
        "{}\n",
        ui::style_text(&format!("{currency}/TWD spot sell history"), ui::StyleType::Title)
    ));
    output.push_str(&format!(
        "Currencies: {}\nRange: {}\n\n",
        explorer.currencies().join(", "),
        ranges.join(" ")
    ));

    match explorer.state() {
        ViewState::Loading => {
            output.push_str(&ui::empty_state("Loading..."));
            return output;
        }
        ViewState::Empty => {
            output.push_str(&ui::empty_state("No history for this currency."));
            return output;
        }
        ViewState::Ready => {}
    }

    let points: Vec<_> = explorer
        .chart_series()
        .iter()
        .map(|r| (r.date, r.spot_sell_rate))
        .collect();
    if let Some(summary) = ui::series_summary(&points) {
        output.push_str(&format!("{summary}\n"));
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Spot Sell"),
        ui::header_cell("Cash Sell"),
    ]);
    for row in explorer.table_page() {
        table.add_row(vec![
            Cell::new(row.date.to_string()),
            ui::highlight_cell(row.spot_sell_rate, 4),
            ui::format_optional_cell(row.cash_sell_rate, |v| format!("{v:.4}")),
        ]);
    }
    output.push_str(&table.to_string());

    if let Some(footer) = ui::page_footer(explorer.page(), explorer.total_pages()) {
        output.push_str(&format!("\n{footer}"));
    }
    output
}

pub async fn run(
    repo: Repository,
    default_currency: &str,
    currency: Option<&str>,
    range: DateRange,
    page: usize,
) -> Result<()> {
    let mut explorer = ExchangeExplorer::new(repo, default_currency).with_range(range);

    let pb = ui::new_spinner("Loading exchange rates...");
    explorer.load_currencies().await;
    let mut rejected = None;
    if let Some(code) = currency.map(str::to_uppercase) {
        if !explorer.select_currency(&code).await {
            rejected = Some(code);
        }
    }
    if rejected.is_some() || currency.is_none() {
        explorer.refresh().await;
    }
    pb.finish_and_clear();

    if let Some(code) = rejected {
        println!(
            "{}",
            ui::style_text(
                &format!("{code} is not an active currency, showing the default instead"),
                ui::StyleType::Error
            )
        );
    }

    explorer.go_to_page(page);
    println!("{}", render(&explorer));
    Ok(())
}

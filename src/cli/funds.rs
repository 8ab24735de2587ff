use super::ui;
use crate::core::Repository;
use crate::core::views::{FundExplorer, ViewState};
use anyhow::Result;
use comfy_table::Cell;

fn render_fund_list(explorer: &FundExplorer) -> String {
    if explorer.funds().is_empty() {
        return ui::empty_state("No funds found.");
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Fund"),
        ui::header_cell("Currency"),
    ]);
    for fund in explorer.funds() {
        let marker = if Some(fund.cnyes_id.as_str()) == explorer.selected_id() {
            ui::style_text(&fund.cnyes_id, ui::StyleType::Label)
        } else {
            fund.cnyes_id.clone()
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(&fund.display_name),
            Cell::new(&fund.currency),
        ]);
    }
    table.to_string()
}

pub fn render(explorer: &FundExplorer) -> String {
    let mut output = String::new();

    let Some(id) = explorer.selected_id() else {
        output.push_str(&ui::empty_state("No funds to analyse."));
        return output;
    };
    let title = explorer
        .selected()
        .map(|f| f.label())
        .unwrap_or_else(|| id.to_string());
    output.push_str(&format!(
        "{}\n\n",
        ui::style_text(&format!("{title} NAV history"), ui::StyleType::Title)
    ));

    match explorer.state() {
        ViewState::Loading => {
            output.push_str(&ui::empty_state("Loading..."));
            return output;
        }
        ViewState::Empty => {
            output.push_str(&ui::empty_state("No NAV history for this fund."));
            return output;
        }
        ViewState::Ready => {}
    }

    let points: Vec<_> = explorer
        .chart_series()
        .iter()
        .map(|n| (n.price_date, n.nav))
        .collect();
    if let Some(summary) = ui::series_summary(&points) {
        output.push_str(&format!("{summary}\n"));
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("NAV")]);
    for row in explorer.table_page() {
        table.add_row(vec![
            Cell::new(row.price_date.to_string()),
            ui::highlight_cell(row.nav, 4),
        ]);
    }
    output.push_str(&table.to_string());

    if let Some(footer) = ui::page_footer(explorer.page(), explorer.total_pages()) {
        output.push_str(&format!("\n{footer}"));
    }
    output
}

pub async fn run(repo: Repository, fund: Option<&str>, page: usize, list: bool) -> Result<()> {
    let mut explorer = FundExplorer::new(repo);

    let pb = ui::new_spinner("Loading funds...");
    explorer.load_funds().await;
    if list {
        pb.finish_and_clear();
        println!("{}", render_fund_list(&explorer));
        return Ok(());
    }

    match fund {
        Some(id) => explorer.select_fund(id).await,
        None => explorer.refresh().await,
    }
    pb.finish_and_clear();

    explorer.go_to_page(page);
    println!("{}", render(&explorer));
    Ok(())
}

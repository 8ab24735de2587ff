use super::ui;
use crate::core::views::{CurrencyRoster, ViewState};
use crate::core::Repository;
use anyhow::Result;
use chrono::Local;
use comfy_table::Cell;

pub fn render_roster(roster: &CurrencyRoster) -> String {
    match roster.state() {
        ViewState::Loading => return ui::empty_state("Loading currencies..."),
        ViewState::Empty => return ui::empty_state("No target currencies found."),
        ViewState::Ready => {}
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Status"),
        ui::header_cell("Code"),
        ui::header_cell("Description"),
        ui::header_cell("Created At"),
    ]);

    for currency in roster.currencies() {
        let created_at = currency
            .created_at
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            ui::status_cell(currency.is_active),
            Cell::new(&currency.code),
            Cell::new(&currency.description),
            Cell::new(created_at),
        ]);
    }

    table.to_string()
}

async fn load_roster(repo: Repository) -> CurrencyRoster {
    let mut roster = CurrencyRoster::new(repo);
    let pb = ui::new_spinner("Loading currencies...");
    roster.load().await;
    pb.finish_and_clear();
    roster
}

pub async fn list(repo: Repository) -> Result<()> {
    let roster = load_roster(repo).await;

    println!(
        "{}\n",
        ui::style_text("Target currencies", ui::StyleType::Title)
    );
    println!(
        "{}",
        ui::style_text(
            "Active currencies are synced by the scheduled crawler.",
            ui::StyleType::Subtle
        )
    );
    println!("{}", render_roster(&roster));
    Ok(())
}

/// Flips each code in order; a repeated code is flipped again.
pub async fn toggle(repo: Repository, codes: &[String]) -> Result<()> {
    let mut roster = load_roster(repo).await;

    for code in codes {
        let code = code.to_uppercase();
        if roster.toggle(&code).await {
            let active = roster
                .currencies()
                .iter()
                .any(|c| c.code == code && c.is_active);
            let state = if active { "active" } else { "inactive" };
            println!(
                "{} → {}",
                ui::style_text(&code, ui::StyleType::Label),
                ui::style_text(state, ui::StyleType::Success)
            );
        } else {
            println!(
                "{}",
                ui::style_text(
                    &format!("Could not toggle {code}, see log for details"),
                    ui::StyleType::Error
                )
            );
        }
    }

    println!("{}", render_roster(&roster));
    Ok(())
}

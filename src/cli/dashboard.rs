use super::{currencies, ui};
use crate::core::Repository;
use crate::core::views::dashboard::{DASHBOARD_CURRENCY, DASHBOARD_POINTS};
use crate::core::views::{Dashboard, ViewState};
use anyhow::Result;

fn render_roster(dashboard: &Dashboard) -> String {
    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Exchange & Fund Monitor", ui::StyleType::Title),
        ui::style_text("Crawler currency roster", ui::StyleType::Label),
        currencies::render_roster(dashboard.roster())
    )
}

/// Summary of the recent USD quotes plus the last few chart points.
pub fn render_chart(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}\n",
        ui::style_text(
            &format!("{DASHBOARD_CURRENCY}/TWD spot sell (last {DASHBOARD_POINTS})"),
            ui::StyleType::Label
        )
    ));
    match dashboard.chart_state() {
        ViewState::Ready => {
            let points: Vec<_> = dashboard
                .chart_series()
                .iter()
                .map(|r| (r.date, r.spot_sell_rate))
                .collect();
            if let Some(summary) = ui::series_summary(&points) {
                output.push_str(&summary);
                output.push('\n');
            }
            let trail: Vec<String> = dashboard
                .chart_points()
                .iter()
                .rev()
                .take(5)
                .map(|(day, rate)| match rate {
                    Some(rate) => format!("{day} {rate:.2}"),
                    None => format!("{day} -"),
                })
                .collect();
            output.push_str(&ui::style_text(&trail.join("  "), ui::StyleType::Subtle));
        }
        _ => output.push_str(&ui::empty_state("Loading data...")),
    }
    output
}

pub async fn run(repo: Repository) -> Result<()> {
    let mut dashboard = Dashboard::new(repo);

    let pb = ui::new_spinner("Loading dashboard...");
    dashboard.load().await;
    pb.finish_and_clear();

    println!("{}", render_roster(&dashboard));
    ui::print_separator();
    println!("{}", render_chart(&dashboard));
    Ok(())
}

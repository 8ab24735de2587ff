use super::ui;
use crate::core::sync::{SyncController, SyncJob, TriggerOutcome};
use crate::providers::sync_api::SyncApiClient;
use anyhow::Result;

pub async fn run(base_url: &str, job: SyncJob) -> Result<()> {
    let controller = SyncController::new(SyncApiClient::new(base_url)?);
    println!(
        "API endpoint: {}",
        ui::style_text(controller.endpoint(), ui::StyleType::Label)
    );

    let pb = ui::new_spinner(&format!("Starting {job} sync..."));
    let outcome = controller.run(job).await;
    pb.finish_and_clear();

    match outcome {
        TriggerOutcome::Finished(banner) => println!("{}", ui::banner(&banner)),
        TriggerOutcome::Busy { running } => println!(
            "{}",
            ui::style_text(
                &format!("A {running} sync is still running"),
                ui::StyleType::Error
            )
        ),
    }
    Ok(())
}

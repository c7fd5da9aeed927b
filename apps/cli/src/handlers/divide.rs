use crate::handlers::prompt::Prompt;
use crate::models::plan::Plan;
use crate::render;
use anyhow::{Context, Result};
use cohort::features::division::client::view::PreviewView;
use cohort::features::division::client::{
    Acknowledgment, ConfirmOutcome, DivisionController, DivisionEngine, DivisionError,
};
use std::path::Path;
use tracing::info;

/// Generates a division from `plan` and loops over the preview until the user confirms
/// or quits. `redo` re-reads the plan, so it can be edited in between.
pub async fn run<E: DivisionEngine>(engine: E, plan: &Path) -> Result<()> {
    let mut controller = DivisionController::new(engine);
    let mut prompt = Prompt::new();

    if !submit(&mut controller, plan).await? {
        return Ok(());
    }

    loop {
        let Some(answer) = prompt.ask("[c]onfirm, [r]edo, [e]xport, [q]uit?").await? else {
            break;
        };
        match answer.as_str() {
            "c" | "confirm" => {
                let ack = if prompt.confirm("Persist these subgroups?").await? {
                    Acknowledgment::Granted
                } else {
                    Acknowledgment::Declined
                };
                match controller.confirm(ack).await {
                    Ok(ConfirmOutcome::Confirmed { redirect_url, subgroups }) => {
                        println!("Created {} subgroups.", subgroups.len());
                        if let Some(url) = redirect_url {
                            println!("Continue at {url}");
                        }
                        break;
                    },
                    Ok(ConfirmOutcome::Declined) => println!("Nothing was saved."),
                    Err(err) => println!("{err}. The preview is kept; try again."),
                }
            },
            "r" | "redo" => {
                controller.redo();
                if !submit(&mut controller, plan).await? {
                    break;
                }
            },
            "e" | "export" => match controller.export().await {
                Ok(file) => {
                    tokio::fs::write(&file.filename, &file.bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", file.filename))?;
                    println!("Saved {} ({} bytes)", file.filename, file.bytes.len());
                },
                Err(err) => println!("{err}"),
            },
            "q" | "quit" => {
                if controller.redo() {
                    info!("Preview discarded on quit");
                }
                break;
            },
            other => println!("Unknown choice '{other}'"),
        }
    }
    Ok(())
}

/// Returns `false` when no preview could be produced.
async fn submit<E: DivisionEngine>(controller: &mut DivisionController<E>, plan: &Path) -> Result<bool> {
    let config = Plan::load(plan).await?.to_config()?;
    match controller.submit(config).await {
        Ok(job) => {
            print!("{}", render::preview(&PreviewView::from_job(job)));
            Ok(true)
        },
        Err(err @ (DivisionError::Validation { .. } | DivisionError::Domain { .. })) => {
            println!("{err}");
            Ok(false)
        },
        Err(err) => Err(err).context("Division request failed"),
    }
}

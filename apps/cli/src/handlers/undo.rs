use crate::handlers::prompt::Prompt;
use crate::render;
use anyhow::{Context, Result};
use cohort::features::division::client::{
    Acknowledgment, DivisionController, DivisionEngine, DivisionError, UndoOutcome,
};

/// Reverts the most recent confirmed division. The controller is seeded with the number
/// of divisions the engine currently knows about.
pub async fn run<E: DivisionEngine>(engine: E, yes: bool) -> Result<()> {
    let existing = engine.list_subgroups().await.context("Failed to list subgroups")?;
    let mut controller =
        DivisionController::new(engine).with_confirmed_history(render::division_count(&existing));

    if !controller.can_undo() {
        println!("There is no confirmed division to undo.");
        return Ok(());
    }

    let ack = if yes || Prompt::new().confirm("Remove the most recent division?").await? {
        Acknowledgment::Granted
    } else {
        Acknowledgment::Declined
    };

    match controller.undo(ack).await {
        Ok(UndoOutcome::Undone { message }) => println!("{message}"),
        Ok(UndoOutcome::Declined) => println!("Nothing was removed."),
        Err(err @ DivisionError::Domain { .. }) => println!("{err}"),
        Err(err) => return Err(err).context("Undo failed"),
    }
    Ok(())
}

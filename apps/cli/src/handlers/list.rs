use crate::render;
use anyhow::{Context, Result};
use cohort::features::division::client::DivisionEngine;

pub async fn run<E: DivisionEngine>(engine: E) -> Result<()> {
    let subgroups = engine.list_subgroups().await.context("Failed to list subgroups")?;
    print!("{}", render::subgroups(&subgroups));
    Ok(())
}

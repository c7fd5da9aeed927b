//! Client half of the division workflow.

mod controller;
mod engine;
mod error;
mod http;
pub mod view;

pub use controller::{
    Acknowledgment, ConfirmOutcome, ControllerState, DivisionController, UndoOutcome,
};
pub use engine::{DivisionEngine, ExportFile};
pub use error::{DivisionError, DivisionErrorExt};
pub use http::HttpEngine;

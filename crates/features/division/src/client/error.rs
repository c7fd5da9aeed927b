use std::borrow::Cow;

/// Failures surfaced by the division controller. None of them is fatal to it.
#[cohort_derive::cohort_error]
pub enum DivisionError {
    /// Rejected locally; no request was issued and the state is unchanged.
    #[error("Invalid request{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The engine could not be reached, timed out, or answered something unreadable.
    #[error("Could not reach the division service{}: {message}", format_context(.context))]
    Transport { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The engine's own `error` message, verbatim.
    #[error("{message}")]
    Domain { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal division client error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl DivisionError {
    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub(crate) fn transport(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Transport { message: message.into(), context: None }
    }
}

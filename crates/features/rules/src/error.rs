use std::borrow::Cow;

/// Rejected rule builder edits. The builder is left unchanged in every case.
#[cohort_derive::cohort_error]
pub enum BuilderError {
    #[error("Unknown rule{}: {message}", format_context(.context))]
    UnknownRule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown condition{}: {message}", format_context(.context))]
    UnknownCondition { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Removing the condition would leave its rule empty.
    #[error("A rule must keep at least one condition{}: {message}", format_context(.context))]
    LastCondition { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

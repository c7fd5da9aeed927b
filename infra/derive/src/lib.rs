#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every crate in the workspace.
//!
//! * [`cohort_error`] turns a plain enum into a `thiserror` error with context support.
//! * [`cohort_slice`] turns a struct into an `Arc`-backed feature slice handle.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own
//! macros in doctests; `tests/cohort_error.rs` exercises them for real.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Declares a domain error enum.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant that wraps a `source` error.
/// * `From<Source>` for those variants, so `?` works on upstream errors.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper used inside `#[error(...)]` strings.
///
/// # Requirements
///
/// Every variant must have named fields. A variant with a `source` field must also
/// declare `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[cohort_derive::cohort_error]
/// pub enum RosterError {
///     #[error("Roster I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal roster error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, RosterError> {
///     std::fs::read_to_string(path).context("Reading roster file")
/// }
/// ```
#[proc_macro_attribute]
pub fn cohort_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Declares a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` wraps it in an `Arc`, derefs to
/// it and implements `cohort_kernel::domain::registry::FeatureSlice` so the slice can be
/// registered in the server state.
///
/// ```rust,ignore
/// #[cohort_derive::cohort_slice]
/// pub struct Division {
///     pub store: DivisionStore,
/// }
///
/// let slice = Division::new(DivisionInner { store });
/// ```
#[proc_macro_attribute]
pub fn cohort_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand(input).into()
}

//! Procedural macros for the tsframe crate
//!
//! This crate generates the static name/value tables behind
//! `tsframe::enum_table::EnumTable`, so that enum-like registries are declared
//! once as plain Rust enums instead of being reflected at runtime.

use proc_macro::TokenStream;

mod enum_table;

/// Derive macro for `tsframe::enum_table::EnumTable`
///
/// The enum must only have unit variants. The value type is declared once on
/// the enum and every variant carries a literal value.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumTable)]
/// #[enum_table(value_type = "&'static str")]
/// enum Separator {
///     #[enum_table(value = "-")]
///     Dash,
///     #[enum_table(value = ":", name = "colon")]
///     Colon,
/// }
/// ```
#[proc_macro_derive(EnumTable, attributes(enum_table))]
pub fn derive_enum_table(input: TokenStream) -> TokenStream {
    enum_table::process_derive_enum_table(input)
}

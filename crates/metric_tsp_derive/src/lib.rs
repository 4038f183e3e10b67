//! Derive macros shared by the `metric_tsp_core` option types.
//!
//! Generated code refers to `crate::Error` and `crate::Result`, so the
//! deriving crate must export both with an `Error::invalid_input` constructor.

mod cli_options;
mod cli_value;
mod kv_display;
mod utils;

use proc_macro::TokenStream;

/// Parsing, `FromStr` and `Display` for unit-only enums used as option values.
#[proc_macro_derive(CliValue, attributes(cli_value, cli))]
pub fn derive_cli_value(item: TokenStream) -> TokenStream {
    cli_value::derive_cli_value_inner(item)
}

/// `--long value` / `--long=value` / `--[no-]flag` handling for option structs.
#[proc_macro_derive(CliOptions, attributes(cli))]
pub fn derive_cli_options(item: TokenStream) -> TokenStream {
    cli_options::derive_cli_options_inner(item)
}

/// Single-line `key=value` rendering for log output.
#[proc_macro_derive(KvDisplay, attributes(kv))]
pub fn derive_kv_display(item: TokenStream) -> TokenStream {
    kv_display::derive_kv_display_inner(item)
}

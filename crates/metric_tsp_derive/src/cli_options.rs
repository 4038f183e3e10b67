use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, parse_macro_input, spanned::Spanned};

use crate::utils;

struct CliField {
    long: String,
    value_hint: String,
    parse_with: Option<Path>,
    flag: bool,
}

pub fn derive_cli_options_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "CliOptions can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "CliOptions requires named fields")
            .to_compile_error()
            .into();
    };

    let mut arms = Vec::new();
    let mut flag_names = Vec::new();
    let mut help_rows = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };

        let mut cli_field: Option<CliField> = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("cli") {
                continue;
            }
            let current = cli_field.get_or_insert_with(|| CliField {
                long: utils::to_kebab_case(&field_ident.to_string()),
                value_hint: String::from("<value>"),
                parse_with: None,
                flag: false,
            });
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("flag") {
                    current.flag = true;
                    return Ok(());
                }
                let lit: LitStr = meta.value()?.parse()?;
                if meta.path.is_ident("value") {
                    current.value_hint = lit.value();
                } else if meta.path.is_ident("parse_with") {
                    current.parse_with = Some(syn::parse_str(&lit.value())?);
                } else {
                    return Err(meta.error("expected `value`, `parse_with` or `flag`"));
                }
                Ok(())
            });
            if let Err(err) = parsed {
                return err.to_compile_error().into();
            }
        }

        let Some(cli_field) = cli_field else {
            continue;
        };

        if cli_field.flag && !utils::is_bool(&field.ty) {
            return syn::Error::new(field.span(), "`flag` options must be `bool` fields")
                .to_compile_error()
                .into();
        }

        let long_lit = LitStr::new(&cli_field.long, Span::call_site());
        let doc = utils::doc_text(&field.attrs);

        if cli_field.flag {
            let negated_lit = LitStr::new(&format!("no-{}", cli_field.long), Span::call_site());
            let flag_parse = utils::build_flag_parse_expr();
            arms.push(quote! {
                #long_lit => {
                    self.#field_ident = match value {
                        None => true,
                        Some(raw) => #flag_parse,
                    };
                    Ok(true)
                }
            });
            arms.push(quote! {
                #negated_lit => {
                    if value.is_some() {
                        return Err(crate::Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    self.#field_ident = false;
                    Ok(true)
                }
            });
            flag_names.push(long_lit.clone());
            flag_names.push(negated_lit);
            let shape = LitStr::new(
                &format!("--[no-]{}[=<bool>]", cli_field.long),
                Span::call_site(),
            );
            let doc_lit = LitStr::new(&doc, Span::call_site());
            help_rows.push(quote! { (#shape, #doc_lit) });
        } else {
            let parse_expr = utils::build_cli_parse_expr(&field.ty, cli_field.parse_with.as_ref());
            arms.push(quote! {
                #long_lit => {
                    let raw = value.ok_or_else(|| {
                        crate::Error::invalid_input(format!("Missing value for --{name}"))
                    })?;
                    self.#field_ident = #parse_expr;
                    Ok(true)
                }
            });
            let shape = LitStr::new(
                &format!("--{} {}", cli_field.long, cli_field.value_hint),
                Span::call_site(),
            );
            let doc_lit = LitStr::new(&doc, Span::call_site());
            help_rows.push(quote! { (#shape, #doc_lit) });
        }
    }

    let is_flag_body = if flag_names.is_empty() {
        quote! {
            let _ = name;
            false
        }
    } else {
        quote! { matches!(name, #(#flag_names)|*) }
    };

    let expanded = quote! {
        impl #struct_ident {
            /// `(shape, description)` rows for every option, in declaration order.
            pub const CLI_HELP: &'static [(&'static str, &'static str)] = &[#(#help_rows),*];

            fn cli_is_flag(name: &str) -> bool {
                #is_flag_body
            }

            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((k, v)) = raw_name.split_once('=') {
                    return (k.to_string(), Some(v.to_string()));
                }
                if Self::cli_is_flag(raw_name) {
                    return (raw_name.to_string(), None);
                }

                let value = match args.peek() {
                    Some(next) if !next.starts_with("--") => args.next(),
                    _ => None,
                };

                (raw_name.to_string(), value)
            }

            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }
        }
    };

    TokenStream::from(expanded)
}

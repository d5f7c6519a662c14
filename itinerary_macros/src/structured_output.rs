use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, ItemStruct, LitStr};

use crate::schema_extraction::{
    collect_doc_comments, collect_field_docs, collect_field_names, collect_string_fields,
    ensure_named_struct, infer_description, infer_schema_name, parse_structured_output_args,
};

pub fn structured_output(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match parse_structured_output_args(attr) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let item_struct = parse_macro_input!(item as ItemStruct);

    if let Err(err) = ensure_named_struct(&item_struct) {
        return err.to_compile_error().into();
    }

    if !item_struct.generics.params.is_empty() {
        return syn::Error::new(
            item_struct.generics.span(),
            "`#[structured_output]` does not support generic structs",
        )
        .to_compile_error()
        .into();
    }

    let text_fields = collect_string_fields(&item_struct);
    if text_fields.is_empty() {
        return syn::Error::new(
            item_struct.ident.span(),
            "`#[structured_output]` needs at least one `String` field",
        )
        .to_compile_error()
        .into();
    }

    let schema_name = infer_schema_name(&item_struct, args.name.as_ref());
    let struct_docs = collect_doc_comments(&item_struct.attrs);
    let description = infer_description(args.description.as_ref(), struct_docs);

    let description_tokens = description
        .as_ref()
        .map(|lit| quote! { Some(#lit) })
        .unwrap_or_else(|| quote! { None });

    let field_doc_tokens: Vec<_> = collect_field_docs(&item_struct)
        .iter()
        .map(|(field, doc)| {
            let field_lit = LitStr::new(field, Span::call_site());
            let doc_lit = LitStr::new(doc, Span::call_site());
            quote! { (#field_lit, #doc_lit) }
        })
        .collect();

    let text_field_names: Vec<LitStr> = text_fields
        .iter()
        .map(|ident| LitStr::new(&ident.to_string(), Span::call_site()))
        .collect();

    let field_order: Vec<LitStr> = collect_field_names(&item_struct)
        .iter()
        .map(|name| LitStr::new(name, Span::call_site()))
        .collect();

    let type_name = LitStr::new(&item_struct.ident.to_string(), Span::call_site());
    let ident = &item_struct.ident;

    let expanded = quote! {
        #item_struct

        impl itinerary_planner::schema::StructuredOutput for #ident {
            fn schema() -> &'static itinerary_planner::schema::SchemaHandle {
                static HANDLE: std::sync::OnceLock<itinerary_planner::schema::SchemaHandle> =
                    std::sync::OnceLock::new();
                HANDLE.get_or_init(|| {
                    let mut root = schemars::schema_for!(Self);
                    itinerary_planner::schema::apply_doc_comments(
                        &mut root,
                        #schema_name,
                        #description_tokens,
                        &[#(#field_doc_tokens),*],
                    );
                    itinerary_planner::schema::require_non_empty(
                        &mut root,
                        &[#(#text_field_names),*],
                    );
                    itinerary_planner::schema::SchemaHandle::from_root_schema::<Self>(
                        #schema_name,
                        #type_name,
                        &[#(#field_order),*],
                        root,
                    )
                })
            }
        }

        impl itinerary_planner::schema::TextFields for #ident {
            fn text_fields(&self) -> Vec<(&'static str, &str)> {
                vec![#((#text_field_names, self.#text_fields.as_str())),*]
            }
        }
    };

    expanded.into()
}

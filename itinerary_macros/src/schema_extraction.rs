use proc_macro2::Span;
use syn::{
    parse::Parser, punctuated::Punctuated, spanned::Spanned, Attribute, Expr, ExprLit, Fields,
    Ident, ItemStruct, Lit, LitStr, MetaNameValue, Token, Type,
};

#[derive(Default)]
pub struct StructuredOutputArgs {
    pub name: Option<LitStr>,
    pub description: Option<LitStr>,
}

/// Parses `name = "..", description = ".."`; both are optional.
pub fn parse_structured_output_args(
    attr: proc_macro::TokenStream,
) -> syn::Result<StructuredOutputArgs> {
    let mut args = StructuredOutputArgs::default();
    if attr.is_empty() {
        return Ok(args);
    }

    let parser = Punctuated::<MetaNameValue, Token![,]>::parse_terminated;
    for pair in parser.parse(attr)? {
        let key = pair
            .path
            .get_ident()
            .ok_or_else(|| syn::Error::new_spanned(&pair.path, "expected identifier"))?;
        let value = string_literal(&pair.value)?;

        let slot = match key.to_string().as_str() {
            "name" => &mut args.name,
            "description" => &mut args.description,
            other => {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unsupported argument `{other}`, expected `name` or `description`"),
                ));
            }
        };

        if slot.replace(value).is_some() {
            return Err(syn::Error::new(
                key.span(),
                format!("`{key}` given more than once"),
            ));
        }
    }

    Ok(args)
}

fn string_literal(expr: &Expr) -> syn::Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

pub fn ensure_named_struct(item: &ItemStruct) -> syn::Result<()> {
    if matches!(item.fields, Fields::Named(_)) {
        return Ok(());
    }
    Err(syn::Error::new(
        item.struct_token.span(),
        "`#[structured_output]` only supports structs with named fields",
    ))
}

pub fn collect_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(MetaNameValue { value, .. }) => string_literal(value).ok(),
            _ => None,
        })
        .map(|lit| lit.value().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

pub fn collect_field_docs(item: &ItemStruct) -> Vec<(String, String)> {
    named_fields(item)
        .filter_map(|field| {
            let ident = field.ident.as_ref()?;
            let doc = collect_doc_comments(&field.attrs)?;
            Some((ident.to_string(), doc))
        })
        .collect()
}

pub fn collect_field_names(item: &ItemStruct) -> Vec<String> {
    named_fields(item)
        .filter_map(|field| field.ident.as_ref().map(ToString::to_string))
        .collect()
}

/// Fields declared as plain `String`; `Option<String>` and other types are skipped.
pub fn collect_string_fields(item: &ItemStruct) -> Vec<Ident> {
    named_fields(item)
        .filter(|field| is_string(&field.ty))
        .filter_map(|field| field.ident.clone())
        .collect()
}

fn named_fields(item: &ItemStruct) -> impl Iterator<Item = &syn::Field> {
    let fields = match &item.fields {
        Fields::Named(named) => Some(named.named.iter()),
        _ => None,
    };
    fields.into_iter().flatten()
}

fn is_string(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "String" && segment.arguments.is_none())
            .unwrap_or(false)
}

pub fn infer_schema_name(item: &ItemStruct, explicit: Option<&LitStr>) -> LitStr {
    explicit
        .cloned()
        .unwrap_or_else(|| LitStr::new(&item.ident.to_string(), Span::call_site()))
}

pub fn infer_description(explicit: Option<&LitStr>, doc: Option<String>) -> Option<LitStr> {
    explicit
        .cloned()
        .or_else(|| doc.map(|text| LitStr::new(&text, Span::call_site())))
}

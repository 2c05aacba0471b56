use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token};

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
    params: Option<bool>,
}

#[derive(Default)]
struct SerdeAttrs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

/// Expands `#[api_model]`.
///
/// `params = true` additionally derives `utoipa::IntoParams` for query-string models.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    match build_model(args, &input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn build_model(args: TokenStream, input: &ItemStruct) -> syn::Result<TokenStream> {
    let args = parse_model_args(args)?;
    let derived = derive_names(&input.attrs);
    let serde = serde_attrs(&input.attrs)?;

    let mut derives = Vec::new();
    if !derived.contains("Debug") {
        derives.push(quote!(Debug));
    }
    if !derived.contains("Serialize") {
        derives.push(quote!(::serde::Serialize));
    }
    if !derived.contains("Deserialize") {
        derives.push(quote!(::serde::Deserialize));
    }
    if !derived.contains("ToSchema") {
        derives.push(quote!(::utoipa::ToSchema));
    }
    if args.params.unwrap_or(false) && !derived.contains("IntoParams") {
        derives.push(quote!(::utoipa::IntoParams));
    }
    let derive_attr = if derives.is_empty() { quote!() } else { quote!(#[derive(#(#derives),*)]) };

    let wanted_rename =
        args.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename_attr = match &serde.rename_all {
        Some(existing) if existing.value() != wanted_rename.value() => {
            return Err(syn::Error::new_spanned(
                existing,
                "conflicting serde rename_all; drop it or pass the same value to api_model",
            ));
        },
        Some(_) => quote!(),
        None => quote!(#[serde(rename_all = #wanted_rename)]),
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (serde.deny_unknown_fields, deny) {
        (true, false) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set through serde",
            ));
        },
        (false, true) => quote!(#[serde(deny_unknown_fields)]),
        _ => quote!(),
    };

    let params_attr = if args.params.unwrap_or(false) {
        quote!(#[into_params(parameter_in = Query)])
    } else {
        quote!()
    };

    Ok(quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #params_attr
        #input
    })
}

/// Expands `#[api_handler]`: a thin wrapper over `utoipa::path`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ModelArgs::default();

    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(
                meta,
                "expected name-value arguments like `rename_all = \"...\"`",
            ));
        };

        if nv.path.is_ident("rename_all") {
            let value = lit_str(&nv)?;
            set_once(&mut parsed.rename_all, &nv, value)?;
        } else if nv.path.is_ident("deny_unknown_fields") {
            let value = lit_bool(&nv)?;
            set_once(&mut parsed.deny_unknown_fields, &nv, value)?;
        } else if nv.path.is_ident("params") {
            let value = lit_bool(&nv)?;
            set_once(&mut parsed.params, &nv, value)?;
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "unsupported argument; expected rename_all, deny_unknown_fields or params",
            ));
        }
    }

    Ok(parsed)
}

fn lit_str(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Str(lit) => Ok(lit.clone()),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
    }
}

fn lit_bool(nv: &MetaNameValue) -> syn::Result<bool> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Bool(lit) => Ok(lit.value),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
    }
}

fn set_once<T>(slot: &mut Option<T>, token: &MetaNameValue, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(token, "duplicate argument"));
    }
    *slot = Some(value);
    Ok(())
}

fn serde_attrs(attrs: &[Attribute]) -> syn::Result<SerdeAttrs> {
    let mut info = SerdeAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                info.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                info.deny_unknown_fields = true;
            } else if meta.input.peek(Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(info)
}

fn derive_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(seg) = meta.path.segments.last() {
                names.insert(seg.ident.to_string());
            }
            Ok(())
        });
    }
    names
}

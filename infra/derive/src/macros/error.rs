use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, GenericArgument, Ident, PathArguments, Type};

/// One enum variant as seen by `#[catalog_error]`.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<&'a Field>,
    has_context: bool,
    cfg: Vec<&'a Attribute>,
}

impl ErrorVariant<'_> {
    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

pub fn expand_error(input: DeriveInput) -> TokenStream {
    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "catalog_error can only be applied to enums")
            .to_compile_error();
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        match inspect_variant(variant) {
            Ok(v) => variants.push(v),
            Err(err) => return err.to_compile_error(),
        }
    }

    let name = &input.ident;
    let ext = format_ident!("{name}Ext");
    let derives = missing_derives(&input.attrs);
    let ext_trait = context_trait(name, &ext, &variants);
    let source_impls = variants.iter().filter(|v| !v.is_internal()).filter_map(|v| {
        let field = v.source?;
        Some(source_conversions(name, &ext, v, field))
    });
    let internal_impls = variants.iter().find(|v| v.is_internal()).map(|v| internal_conversions(name, v));

    quote! {
        #derives
        #input

        #ext_trait
        #(#source_impls)*
        #internal_impls

        #[allow(dead_code)]
        fn format_context(
            context: &Option<::std::borrow::Cow<'static, str>>,
        ) -> ::std::borrow::Cow<'static, str> {
            match context {
                Some(c) => ::std::borrow::Cow::Owned(format!(" ({c})")),
                None => ::std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

fn inspect_variant(variant: &syn::Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "catalog_error variants must use named fields",
        ));
    };

    let mut source = None;
    let mut has_context = false;
    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        if ident == "context" {
            if !is_optional_cow(&field.ty) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "context must be Option<Cow<'static, str>>",
                ));
            }
            has_context = true;
        } else if ident == "source" || has_attr(field, "source") || has_attr(field, "from") {
            source = Some(field);
        }
    }

    if source.is_some() && !has_context {
        return Err(syn::Error::new_spanned(
            &variant.ident,
            "variants wrapping a source also need `context: Option<Cow<'static, str>>`",
        ));
    }

    Ok(ErrorVariant {
        ident: &variant.ident,
        source,
        has_context,
        cfg: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).collect(),
    })
}

fn missing_derives(attrs: &[Attribute]) -> TokenStream {
    let present = derive_names(attrs);
    let mut wanted = Vec::new();
    if !present.contains("Debug") {
        wanted.push(quote!(Debug));
    }
    if !present.contains("Error") {
        wanted.push(quote!(::thiserror::Error));
    }
    if wanted.is_empty() { quote!() } else { quote!(#[derive(#(#wanted),*)]) }
}

fn context_trait(name: &Ident, ext: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        let cfg = &v.cfg;
        quote!(#(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()),)
    });

    quote! {
        pub trait #ext<T> {
            /// Attaches a human readable context to the error.
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    #[allow(unreachable_patterns)]
                    match &mut err {
                        #(#arms)*
                        _ => {},
                    }
                    err
                })
            }
        }
    }
}

fn source_conversions(
    name: &Ident,
    ext: &Ident,
    variant: &ErrorVariant<'_>,
    field: &Field,
) -> TokenStream {
    let ty = &field.ty;
    let Some(field_ident) = field.ident.as_ref() else {
        return quote!();
    };
    let ident = variant.ident;
    let cfg = &variant.cfg;

    quote! {
        #(#cfg)*
        #[automatically_derived]
        impl ::std::convert::From<#ty> for #name {
            #[inline]
            fn from(#field_ident: #ty) -> Self {
                Self::#ident { #field_ident, context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #ty> {
            #[inline]
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, #name> {
                self.map_err(|#field_ident| #name::#ident {
                    #field_ident,
                    context: Some(context.into()),
                })
            }
        }
    }
}

fn internal_conversions(name: &Ident, variant: &ErrorVariant<'_>) -> TokenStream {
    let cfg = &variant.cfg;
    let context = if variant.has_context { quote!(, context: None) } else { quote!() };

    quote! {
        #(#cfg)*
        impl ::std::convert::From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: ::std::borrow::Cow::Borrowed(message) #context }
            }
        }

        #(#cfg)*
        impl ::std::convert::From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: ::std::borrow::Cow::Owned(message) #context }
            }
        }
    }
}

fn has_attr(field: &Field, name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(name))
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

/// Last path segment with its generic arguments, e.g. `Option<..>` from `std::option::Option<..>`.
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) => path.path.segments.last(),
        _ => None,
    }
}

fn angle_args(segment: &syn::PathSegment) -> Option<&syn::punctuated::Punctuated<GenericArgument, syn::Token![,]>> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => Some(&args.args),
        _ => None,
    }
}

fn is_optional_cow(ty: &Type) -> bool {
    let Some(option) = last_segment(ty).filter(|s| s.ident == "Option") else {
        return false;
    };
    let Some(args) = angle_args(option).filter(|args| args.len() == 1) else {
        return false;
    };
    let Some(GenericArgument::Type(inner)) = args.first() else {
        return false;
    };
    let Some(cow) = last_segment(inner).filter(|s| s.ident == "Cow") else {
        return false;
    };
    let Some(args) = angle_args(cow) else {
        return false;
    };
    let mut args = args.iter();
    match (args.next(), args.next(), args.next()) {
        (Some(GenericArgument::Lifetime(lt)), Some(GenericArgument::Type(target)), None) => {
            lt.ident == "static" && last_segment(target).is_some_and(|s| s.ident == "str")
        },
        _ => false,
    }
}

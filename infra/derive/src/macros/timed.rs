use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemFn, Path};

/// Expands `#[timed]` / `#[timed(TypeName)]`.
///
/// A local drop guard is injected at the top of the body, so early returns,
/// `?` and dropped futures are all measured the same way.
pub fn expand_timed(args: TokenStream, input: ItemFn) -> TokenStream {
    let owner = if args.is_empty() {
        None
    } else {
        match syn::parse2::<Path>(args) {
            Ok(path) => path.segments.last().map(|seg| seg.ident.to_string()),
            Err(err) => return err.to_compile_error(),
        }
    };

    let method = input.sig.ident.to_string();
    let label = owner.map_or_else(|| method.clone(), |owner| format!("{owner}.{method}"));

    let ItemFn { attrs, vis, sig, block } = input;
    let stmts = &block.stmts;

    quote! {
        #(#attrs)*
        #vis #sig {
            struct __TimedGuard(::std::time::Instant);
            impl ::std::ops::Drop for __TimedGuard {
                fn drop(&mut self) {
                    ::tracing::info!(
                        "Method {} executed in {} ms",
                        #label,
                        self.0.elapsed().as_millis()
                    );
                }
            }
            let __timed_guard = __TimedGuard(::std::time::Instant::now());
            #(#stmts)*
        }
    }
}

use proc_macro::TokenStream;
use proc_macro2::Span;

///
/// Run an async api test against a freshly spawned application.
///
/// The spawned application is available as `app` inside the test body. Use
/// `#[parley_macros::test(strategy = "User")]` to pick a bootstrap strategy other than `Default`.
///
#[proc_macro_attribute]
pub fn test(args: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = syn::parse_macro_input!(item as syn::ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &mut input.sig;
    let body = &input.block;

    let args = syn::parse_macro_input!(args as syn::AttributeArgs);
    let mut strategy = None;

    for arg in &args {
        let name_value = match arg {
            syn::NestedMeta::Meta(syn::Meta::NameValue(name_value)) => name_value,
            _ => return unknown_argument(arg),
        };

        let key = name_value
            .path
            .get_ident()
            .map(|ident| ident.to_string().to_lowercase());

        match (key.as_deref(), &name_value.lit) {
            (Some("strategy"), syn::Lit::Str(lit)) => strategy = Some(lit.value()),
            _ => return unknown_argument(arg),
        }
    }

    let strategy = match syn::parse_str::<syn::Path>(&format!(
        "crate::helpers::BootstrapType::{}",
        strategy.unwrap_or_else(|| "Default".to_string())
    )) {
        Ok(path) => path,
        Err(error) => return error.to_compile_error().into(),
    };

    sig.asyncness = None;

    (quote::quote_spanned! {Span::call_site()=>
        #[test]
        #(#attrs)*
        #vis #sig {
            actix_rt::System::new()
                .block_on(async {
                    let app = crate::helpers::spawn_app(#strategy).await;

                    #body

                    crate::helpers::teardown(app).await;
                })
        }
    })
    .into()
}

fn unknown_argument(arg: &syn::NestedMeta) -> TokenStream {
    syn::Error::new_spanned(arg, "Unknown argument specified")
        .to_compile_error()
        .into()
}

use {
    proc_macro::TokenStream,
    proc_macro2::Span,
    proc_macro_error2::{abort, proc_macro_error},
    quote::{quote, ToTokens},
    syn::{parse_macro_input, Attribute, Ident, ItemFn, LitInt, ReturnType},
};

/// Modifiers only make sense below `#[crucible::test]`, which consumes them.
macro_rules! crucible_modifier {
    ($name:ident) => {
        #[proc_macro_error]
        #[proc_macro_attribute]
        pub fn $name(_attr: TokenStream, item: TokenStream) -> TokenStream {
            let fn_item = parse_macro_input!(item as ItemFn);
            abort!(
                fn_item.sig.ident,
                "`#[crucible::{}]` must be placed below `#[crucible::test]`",
                stringify!($name)
            )
        }
    };
}

crucible_modifier!(iterations);
crucible_modifier!(seed);
crucible_modifier!(name_binding);
crucible_modifier!(expect_fail);

#[derive(Default)]
struct Modifiers {
    iterations: Option<LitInt>,
    seed: Option<LitInt>,
    name_binding: Option<Ident>,
    expect_fail: bool,
}

/// `#[crucible::<name>]` attributes, identified by the second path segment.
fn modifier_name(attr: &Attribute) -> Option<String> {
    let segments = &attr.path().segments;
    if segments.len() == 2 && segments[0].ident == "crucible" {
        Some(segments[1].ident.to_string())
    } else {
        None
    }
}

fn take_modifiers(attrs: Vec<Attribute>) -> (Vec<Attribute>, Modifiers) {
    let mut kept = Vec::new();
    let mut modifiers = Modifiers::default();

    for attr in attrs {
        match modifier_name(&attr).as_deref() {
            Some("iterations") => modifiers.iterations = Some(parse_arg(&attr)),
            Some("seed") => modifiers.seed = Some(parse_arg(&attr)),
            Some("name_binding") => {
                let binding: Ident = parse_arg(&attr);
                if binding != "fresh" && binding != "shared" {
                    abort!(binding, "expected `fresh` or `shared`");
                }
                modifiers.name_binding = Some(binding);
            }
            Some("expect_fail") => {
                if !matches!(attr.meta, syn::Meta::Path(_)) {
                    abort!(attr, "`#[crucible::expect_fail]` does not take any arguments");
                }
                modifiers.expect_fail = true;
            }
            Some(other) => abort!(attr, "unknown harness modifier `crucible::{}`", other),
            None => kept.push(attr),
        }
    }
    (kept, modifiers)
}

fn parse_arg<T: syn::parse::Parse>(attr: &Attribute) -> T {
    match attr.parse_args::<T>() {
        Ok(arg) => arg,
        Err(err) => abort!(err.span(), "{}", err),
    }
}

/// Turn a zero-argument function into a `#[test]` that runs it as a harness.
///
/// ```ignore
/// #[crucible::test]
/// #[crucible::iterations(64)]
/// fn no_overflow() {
///     let a = crucible::uint32("a");
///     crucible::assuming!(a < 1000);
///     crucible::check!(a + 1 > a);
/// }
/// ```
#[proc_macro_error]
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        abort!(
            proc_macro2::TokenStream::from(attr),
            "`#[crucible::test]` does not take any arguments"
        );
    }
    let fn_item = parse_macro_input!(item as ItemFn);
    let (attrs, modifiers) = take_modifiers(fn_item.attrs);
    let vis = fn_item.vis;
    let sig = fn_item.sig;
    let body = fn_item.block;

    if !sig.inputs.is_empty() {
        abort!(sig.inputs, "crucible harnesses cannot take arguments");
    }
    if !sig.generics.params.is_empty() {
        abort!(sig.generics, "crucible harnesses cannot be generic");
    }
    if sig.asyncness.is_some() {
        abort!(sig.asyncness, "crucible harnesses cannot be async");
    }

    let name = &sig.ident;
    let output = match &sig.output {
        ReturnType::Default => quote!(()),
        ReturnType::Type(_, ty) => ty.to_token_stream(),
    };
    let iterations = modifiers
        .iterations
        .map(|n| quote!(config.iterations = #n;));
    let seed = modifiers.seed.map(|n| quote!(config.seed = Some(#n);));
    let name_binding = modifiers.name_binding.map(|binding| {
        let variant = match binding.to_string().as_str() {
            "shared" => Ident::new("Shared", Span::call_site()),
            _ => Ident::new("Fresh", Span::call_site()),
        };
        quote!(config.name_binding = ::crucible::NameBinding::#variant;)
    });
    let expectation = if modifiers.expect_fail {
        quote!(report.expect_fail())
    } else {
        quote!(report.expect_pass())
    };

    quote!(
        #(#attrs)*
        #[::core::prelude::v1::test]
        #vis fn #name() {
            fn harness() -> #output #body

            ::crucible::init_tracing();
            #[allow(unused_mut)]
            let mut config = ::crucible::RunConfig::from_env()
                .unwrap_or_else(|err| panic!("invalid crucible configuration: {err}"));
            #iterations
            #seed
            #name_binding
            let runner = ::crucible::Runner::new(config);
            let report = runner.run(concat!(module_path!(), "::", stringify!(#name)), || {
                let _ = harness();
            });
            #expectation;
        }
    )
    .into()
}

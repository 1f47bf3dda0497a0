/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Procedural macros backing the `sam_test` crate.

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Runs an `async fn` test returning `Result<_, _>` on a multi-thread tokio runtime.
///
/// Panics raised anywhere in the test (including inside spawned dispatch tasks) are
/// recorded by a temporary panic hook and re-raised with their location once the
/// test body completes, so a panic swallowed by a detached task still fails the test.
///
/// ```ignore
/// use sam_test::prelude::*;
///
/// #[sam_test]
/// async fn agent_answers() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn sam_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;
    let attrs = &input.attrs;
    let name = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let async_name = syn::Ident::new(&format!("__{}_async", name), name.span());

    let output = quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() {
            use std::sync::atomic::{AtomicBool, Ordering};
            use std::sync::Arc;
            use std::panic;
            use ::sam_test::__private::parking_lot;
            use ::sam_test::__private::tracing;

            #[derive(Clone, Default)]
            struct PanicRecord {
                occurred: Arc<AtomicBool>,
                message: Arc<parking_lot::Mutex<Option<String>>>,
                location: Arc<parking_lot::Mutex<Option<String>>>,
            }

            let record = PanicRecord::default();
            let hook_record = record.clone();

            let orig_hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                hook_record.occurred.store(true, Ordering::SeqCst);
                let payload = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned());
                *hook_record.message.lock() = payload;
                *hook_record.location.lock() = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                tracing::error!(
                    "Panic: {}",
                    hook_record
                        .message
                        .lock()
                        .clone()
                        .unwrap_or_else(|| "No error message".to_string())
                        .trim()
                        .replace('\n', " ")
                );
                orig_hook(info);
            }));

            let runtime = ::sam_test::__private::tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();

            let test_span = tracing::info_span!("sam_test", name = stringify!(#name));
            let result = runtime.block_on(tracing::Instrument::instrument(#async_name(), test_span));
            drop(runtime);

            if record.occurred.load(Ordering::SeqCst) {
                let message = record
                    .message
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "No error message".to_string());
                let location = record
                    .location
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "unknown location".to_string());
                panic!("Panic at {}: {}", location, message.trim().replace('\n', " "));
            }

            result.unwrap();
        }

        async fn #async_name(#inputs) #output #body
    };

    output.into()
}

//! Sensitive word detection and desensitization for text and structured data.
//!
//! A [`WordPolicy`] holds a dictionary of words. Plain words are matched by a
//! character trie; words carrying regex syntax become patterns compiled
//! through a shared cache. Matches are rewritten with a mask, with pinyin,
//! with pinyin initials or with homophones.
//!
//! A [`Resolver`] runs an ordered [`PolicyCollection`] over strings and over
//! any value implementing [`Walk`]:
//! - `desensitize` rewrites every string leaf in place.
//! - `contains_sensitive` stops at the first matching leaf.
//! - `match_sensitive` reports every match.
//!
//! Each call takes a [`Request`] naming the traffic [`Direction`] and an
//! optional tag; only policies whose direction intersects the request and
//! whose tag admits it run. Fields marked `#[walk(tag = "...")]` narrow the
//! set for their subtree, `#[walk(ignore)]` skips them.
//!
//! Shared nodes (`Arc<RwLock<T>>`, `Arc<Mutex<T>>`) are visited once per
//! call, so cyclic graphs terminate. Siblings are walked in parallel on a
//! rayon pool.
//!
//! The `Walk` derive macro lives in `sensitive-words-derive` and is
//! re-exported when the `derive` feature is enabled.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use sensitive_words_derive::Walk;

#[allow(unused_extern_crates)]
extern crate self as sensitive_words;

// Module declarations
mod context;
mod error;
pub mod options;
pub mod pattern;
pub mod phonetic;
pub mod policy;
mod resolver;
#[cfg(feature = "slog")]
pub mod slog;
pub mod trie;
pub mod walk;

// Re-exports
pub use context::Context;
pub use error::{Error, Result};
pub use options::{Direction, GroupReplace, ReplaceMode, WhitespaceOptions};
pub use phonetic::{HomophoneContexts, PhoneticTable, Phonetics, StaticPhoneticTable};
pub use policy::{MatchResult, PolicyConfig, WordPolicy};
pub use resolver::{MatchResultCollection, PolicyCollection, Request, Resolver};
pub use tokio_util::sync::CancellationToken;
pub use walk::Walk;

//! Text primitives for script hosts.
//!
//! The host hands the library dynamically typed [`Value`]s and gets byte strings back:
//!
//! - [`stringify`] turns one value into its canonical text, honoring a render hook,
//! - [`concat`] joins the text of every element of a [`Sequence`],
//! - [`escape_html`] stringifies one value and makes it safe to embed in HTML.
//!
//! All of them are total and keep no state between calls. [`module::open`] builds the
//! export table a host loader installs, and [`wire`] is the value document format used
//! across the C ABI.

pub mod concat;
pub mod error;
pub mod escape;
pub mod module;
pub mod number;
pub mod sequence;
pub mod stringify;
pub mod value;
pub mod wire;

pub use concat::{concat, concat_with, ConcatOptions, LengthPolicy};
pub use error::CallError;
pub use escape::{escape_html, escape_html_bytes, escape_html_into};
pub use number::Number;
pub use sequence::{Sequence, Table};
pub use stringify::{stringify, stringify_into};
pub use value::{Handle, HostObject, Object, Opaque, Renderable, Value};

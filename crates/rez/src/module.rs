//! Export table handed to a host loader.
//!
//! Nothing here touches host state: [`open`] returns a fresh table of `{name -> export}`
//! and the host decides where to install it. The layout is
//!
//! ```text
//! rez
//! ├── concat(sequence) -> string
//! └── escape
//!     └── html(value?) -> string | nil
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::concat::{concat_with, ConcatOptions};
use crate::error::CallError;
use crate::escape::escape_html;
use crate::value::Value;

/// A function callable by the host with its positional arguments.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync>;

#[derive(Clone)]
pub enum Export {
    Function(NativeFn),
    Namespace(Namespace),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Function(_) => f.write_str("Function"),
            Export::Namespace(ns) => f.debug_tuple("Namespace").field(ns).finish(),
        }
    }
}

#[derive(Clone, Default)]
pub struct Namespace {
    entries: BTreeMap<&'static str, Export>,
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, export: Export) -> Self {
        self.entries.insert(name, export);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name)
    }

    /// Resolves a dotted path such as `escape.html`.
    pub fn lookup(&self, path: &str) -> Option<&Export> {
        let mut parts = path.split('.');
        let mut cur = self.entries.get(parts.next()?)?;
        for part in parts {
            match cur {
                Export::Namespace(ns) => cur = ns.entries.get(part)?,
                Export::Function(_) => return None,
            }
        }
        Some(cur)
    }

    pub fn call(&self, path: &str, args: &[Value]) -> Result<Value, CallError> {
        match self.lookup(path) {
            Some(Export::Function(f)) => {
                tracing::trace!(export = path, args = args.len(), "call");
                f(args)
            }
            Some(Export::Namespace(_)) => Err(CallError::NotAFunction(path.to_string())),
            None => {
                tracing::debug!(export = path, "no such export");
                Err(CallError::UnknownExport(path.to_string()))
            }
        }
    }

    /// Dotted paths of every function in the table, sorted.
    pub fn function_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, export) in &self.entries {
            let path = if prefix.is_empty() {
                (*name).to_string()
            } else {
                format!("{prefix}.{name}")
            };
            match export {
                Export::Function(_) => out.push(path),
                Export::Namespace(ns) => ns.collect_paths(&path, out),
            }
        }
    }
}

/// The complete `rez` module with default options.
pub fn open() -> Namespace {
    open_with(ConcatOptions::default())
}

pub fn open_with(opts: ConcatOptions) -> Namespace {
    Namespace::new()
        .with("concat", concat_export(opts))
        .with("escape", open_escape())
}

/// `rez.concat` on its own: the export is the function itself.
pub fn open_concat() -> Export {
    concat_export(ConcatOptions::default())
}

/// `rez.escape`: a namespace holding `html`.
pub fn open_escape() -> Export {
    Export::Namespace(Namespace::new().with("html", Export::Function(Arc::new(html))))
}

fn concat_export(opts: ConcatOptions) -> Export {
    Export::Function(Arc::new(move |args: &[Value]| concat_call(args, &opts)))
}

fn concat_call(args: &[Value], opts: &ConcatOptions) -> Result<Value, CallError> {
    let first = args.first();
    let Some(sequence) = first.and_then(Value::as_sequence) else {
        let got = first.map_or("no value", Value::type_name).to_string();
        tracing::debug!(function = "concat", %got, "rejected argument #1");
        return Err(CallError::BadArgument {
            position: 1,
            function: "concat",
            expected: "table",
            got,
        });
    };
    Ok(Value::String(concat_with(sequence, opts)))
}

fn html(args: &[Value]) -> Result<Value, CallError> {
    Ok(escape_html(args.first()).map_or(Value::Nil, Value::String))
}

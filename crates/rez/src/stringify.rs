
use crate::value::{Opaque, Value};

/// Canonical text of a value. Never fails.
pub fn stringify(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    stringify_into(value, &mut out);
    out
}

/// Appends the canonical text of `value` to `out`.
///
/// A render hook on an opaque value runs exactly once; its result is classified like any
/// other value but is not rendered again, so a hook returning another hooked object
/// yields that object's diagnostic form.
pub fn stringify_into(value: &Value, out: &mut Vec<u8>) {
    let rendered;
    let value = match value.as_opaque().and_then(Opaque::renderable) {
        Some(hook) => {
            rendered = hook.render();
            &rendered
        }
        None => value,
    };

    match value {
        Value::String(s) => out.extend_from_slice(s),
        Value::Nil => out.extend_from_slice(b"nil"),
        Value::Number(n) => n.write_to(out),
        Value::Boolean(true) => out.extend_from_slice(b"true"),
        Value::Boolean(false) => out.extend_from_slice(b"false"),
        Value::Other(o) => write_diagnostic(o, out),
    }
}

// "<typename>: <handle>"; for human eyes only.
fn write_diagnostic(o: &Opaque, out: &mut Vec<u8>) {
    out.extend_from_slice(o.type_name().as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(o.handle().to_string().as_bytes());
}

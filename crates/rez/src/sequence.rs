use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::value::{HostObject, Opaque, Renderable, Value};

/// An ordered collection addressed by 1-based position.
///
/// `reported_len` is the collection's own notion of its length. Consumers trust it and
/// never look past it, even when later positions hold values.
pub trait Sequence: Send + Sync {
    fn reported_len(&self) -> usize;

    /// The element at `position` (1-based), or `None` for a hole.
    fn element(&self, position: usize) -> Option<&Value>;
}

impl Sequence for [Value] {
    fn reported_len(&self) -> usize {
        self.len()
    }

    fn element(&self, position: usize) -> Option<&Value> {
        self.get(position.checked_sub(1)?)
    }
}

impl Sequence for Vec<Value> {
    fn reported_len(&self) -> usize {
        self.as_slice().reported_len()
    }

    fn element(&self, position: usize) -> Option<&Value> {
        self.as_slice().element(position)
    }
}

/// A host table: sparse positional slots, a type label and an optional render hook.
///
/// Nil is never stored; assigning it clears the slot. The reported length is a border
/// (an occupied `n` followed by an empty `n + 1`, or 0 when position 1 is empty):
///
/// - when the last slot of the array it was built from is occupied, counting starts
///   there, so `["a", nil, "c"]` reports 3 and its hole renders as `nil`,
/// - otherwise it is the first border, so `["a", nil, "c", nil]` and tables filled by
///   [`Table::set`] with a gap report only the prefix before the gap.
///
/// A length declared by the host through [`Table::with_reported_len`] overrides both.
#[derive(Clone, Debug)]
pub struct Table {
    type_name: Cow<'static, str>,
    slots: BTreeMap<usize, Value>,
    array_len: usize,
    declared_len: Option<usize>,
    rendered: Option<Value>,
}

impl Default for Table {
    fn default() -> Self {
        Table::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Table {
            type_name: Cow::Borrowed("table"),
            slots: BTreeMap::new(),
            array_len: 0,
            declared_len: None,
            rendered: None,
        }
    }

    /// Builds a table from values at positions 1, 2, ...; Nil values leave holes.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut table = Table::new();
        for (idx, value) in values.into_iter().enumerate() {
            table.set(idx + 1, value);
            table.array_len = idx + 1;
        }
        table
    }

    pub fn with_type_name(mut self, type_name: impl Into<Cow<'static, str>>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Fixes the reported length regardless of which slots are occupied.
    pub fn with_reported_len(mut self, len: usize) -> Self {
        self.declared_len = Some(len);
        self
    }

    pub fn with_render(mut self, rendered: Value) -> Self {
        self.rendered = Some(rendered);
        self
    }

    pub fn set(&mut self, position: usize, value: Value) {
        if value.is_nil() {
            self.slots.remove(&position);
        } else {
            self.slots.insert(position, value);
        }
    }

    pub fn border(&self) -> usize {
        let mut n = if self.slots.contains_key(&self.array_len) {
            self.array_len
        } else {
            0
        };
        while self.slots.contains_key(&(n + 1)) {
            n += 1;
        }
        n
    }

    pub fn into_opaque(self) -> Opaque {
        Opaque::new(self)
    }

    pub fn into_value(self) -> Value {
        Value::Other(self.into_opaque())
    }
}

impl Sequence for Table {
    fn reported_len(&self) -> usize {
        self.declared_len.unwrap_or_else(|| self.border())
    }

    fn element(&self, position: usize) -> Option<&Value> {
        self.slots.get(&position)
    }
}

impl Renderable for Table {
    fn render(&self) -> Value {
        self.rendered.clone().unwrap_or_default()
    }
}

impl HostObject for Table {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        self.rendered.as_ref().map(|_| self as &dyn Renderable)
    }

    fn as_sequence(&self) -> Option<&dyn Sequence> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_are_one_based() {
        let v = vec![Value::from("a"), Value::from("b")];
        assert_eq!(v.reported_len(), 2);
        assert_eq!(Sequence::element(&v, 0), None);
        assert_eq!(Sequence::element(&v, 1), Some(&Value::from("a")));
        assert_eq!(Sequence::element(&v, 2), Some(&Value::from("b")));
        assert_eq!(Sequence::element(&v, 3), None);
    }

    #[test]
    fn dense_table_border_is_its_length() {
        let t = Table::from_values([Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(t.reported_len(), 3);
    }

    #[test]
    fn occupied_array_end_is_the_reported_length() {
        let t = Table::from_values([Value::from(1), Value::Nil, Value::from(3)]);
        assert_eq!(t.reported_len(), 3);
        assert_eq!(Sequence::element(&t, 2), None);
        assert_eq!(Sequence::element(&t, 3), Some(&Value::from(3)));
    }

    #[test]
    fn empty_array_end_falls_back_to_first_border() {
        let t = Table::from_values([Value::from(1), Value::Nil, Value::from(3), Value::Nil]);
        assert_eq!(t.reported_len(), 1);

        let t = Table::from_values([Value::Nil, Value::from(2)]);
        assert_eq!(t.reported_len(), 2);

        let t = Table::from_values([Value::Nil, Value::from(2), Value::Nil]);
        assert_eq!(t.reported_len(), 0);
    }

    #[test]
    fn sparse_table_reports_first_border() {
        let mut t = Table::new();
        t.set(2, Value::from("x"));
        assert_eq!(t.reported_len(), 0);

        t.set(1, Value::from("w"));
        t.set(4, Value::from("z"));
        assert_eq!(t.reported_len(), 2);
    }

    #[test]
    fn positions_after_array_end_extend_the_length() {
        let mut t = Table::from_values([Value::from(1), Value::from(2)]);
        t.set(3, Value::from(3));
        assert_eq!(t.reported_len(), 3);
    }

    #[test]
    fn declared_length_overrides_border() {
        let t = Table::from_values([Value::from("a"), Value::Nil, Value::Nil])
            .with_reported_len(3);
        assert_eq!(t.border(), 1);
        assert_eq!(t.reported_len(), 3);
        assert_eq!(Sequence::element(&t, 3), None);

        let t = Table::from_values([Value::from("a"), Value::from("b")]).with_reported_len(1);
        assert_eq!(t.reported_len(), 1);
    }

    #[test]
    fn assigning_nil_clears_slot() {
        let mut t = Table::from_values([Value::from(1), Value::from(2)]);
        t.set(2, Value::Nil);
        assert_eq!(t.reported_len(), 1);
        assert_eq!(Sequence::element(&t, 2), None);
    }

    #[test]
    fn position_zero_is_not_part_of_the_sequence() {
        let mut t = Table::new();
        t.set(0, Value::from("zero"));
        t.set(1, Value::from("one"));
        assert_eq!(t.reported_len(), 1);
    }

    #[test]
    fn table_capabilities() {
        let plain = Table::new();
        assert!(plain.as_sequence().is_some());
        assert!(plain.as_renderable().is_none());
        assert_eq!(plain.type_name(), "table");

        let hooked = Table::new().with_render(Value::from("R")).with_type_name("list");
        assert_eq!(hooked.type_name(), "list");
        assert_eq!(
            hooked.as_renderable().map(|r| r.render()),
            Some(Value::from("R"))
        );
    }
}

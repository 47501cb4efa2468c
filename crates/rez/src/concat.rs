use crate::sequence::Sequence;
use crate::stringify::stringify_into;
use crate::value::Value;

/// How many positions of a sequence `concat` visits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LengthPolicy {
    /// Trust the sequence's reported length; holes inside it render as `nil`.
    #[default]
    Reported,
    /// Stop at the first hole or Nil, never past the reported length.
    UntilNil,
}

impl LengthPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            LengthPolicy::Reported => "reported",
            LengthPolicy::UntilNil => "until-nil",
        }
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for LengthPolicy {
    fn value_variants<'a>() -> &'a [Self] {
        const ALL: [LengthPolicy; 2] = [LengthPolicy::Reported, LengthPolicy::UntilNil];
        &ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConcatOptions {
    pub length: LengthPolicy,
}

/// Joins the text of positions `1..=reported_len` in order, with no separators.
pub fn concat<S: Sequence + ?Sized>(sequence: &S) -> Vec<u8> {
    concat_with(sequence, &ConcatOptions::default())
}

pub fn concat_with<S: Sequence + ?Sized>(sequence: &S, opts: &ConcatOptions) -> Vec<u8> {
    let last = sequence.reported_len();
    let mut out = Vec::new();
    for position in 1..=last {
        match sequence.element(position) {
            None | Some(Value::Nil) if opts.length == LengthPolicy::UntilNil => break,
            None => stringify_into(&Value::Nil, &mut out),
            Some(value) => stringify_into(value, &mut out),
        }
    }
    out
}

use std::fmt;

/// A host number: hosts keep integers and floats as distinct subtypes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Appends the canonical decimal text of the number.
    pub fn write_to(self, out: &mut Vec<u8>) {
        match self {
            Number::Integer(n) => {
                let mut buf = itoa::Buffer::new();
                out.extend_from_slice(buf.format(n).as_bytes());
            }
            Number::Float(x) => {
                let mut buf = ryu::Buffer::new();
                out.extend_from_slice(format_float(&mut buf, x).as_bytes());
            }
        }
    }
}

// Non-finite values get fixed spellings; finite ones use ryu's shortest round-trip
// form with an integral ".0" suffix dropped.
fn format_float(buf: &mut ryu::Buffer, x: f64) -> &str {
    let s: &str = if x.is_nan() {
        "nan"
    } else if x == f64::INFINITY {
        "inf"
    } else if x == f64::NEG_INFINITY {
        "-inf"
    } else {
        buf.format_finite(x)
    };
    s.strip_suffix(".0").unwrap_or(s)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Float(x) => f.write_str(format_float(&mut ryu::Buffer::new(), x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(n: Number) -> String {
        let mut out = Vec::new();
        n.write_to(&mut out);
        String::from_utf8(out).expect("number text is ASCII")
    }

    #[test]
    fn integers() {
        assert_eq!(text(Number::Integer(0)), "0");
        assert_eq!(text(Number::Integer(-12)), "-12");
        assert_eq!(text(Number::Integer(i64::MAX)), "9223372036854775807");
        assert_eq!(text(Number::Integer(i64::MIN)), "-9223372036854775808");
    }

    #[test]
    fn integral_floats_drop_fraction() {
        assert_eq!(text(Number::Float(42.0)), "42");
        assert_eq!(text(Number::Float(-3.0)), "-3");
        assert_eq!(text(Number::Float(0.0)), "0");
        assert_eq!(text(Number::Float(-0.0)), "-0");
    }

    #[test]
    fn fractional_and_exponent_floats() {
        assert_eq!(text(Number::Float(0.5)), "0.5");
        assert_eq!(text(Number::Float(0.1)), "0.1");
        assert_eq!(text(Number::Float(-2.25)), "-2.25");
        assert_eq!(text(Number::Float(1e21)), "1e21");
        assert_eq!(text(Number::Float(1e-7)), "1e-7");
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(text(Number::Float(f64::NAN)), "nan");
        assert_eq!(text(Number::Float(f64::INFINITY)), "inf");
        assert_eq!(text(Number::Float(f64::NEG_INFINITY)), "-inf");
    }

    #[test]
    fn display_matches_written_text() {
        for n in [
            Number::Integer(7),
            Number::Float(7.0),
            Number::Float(7.25),
            Number::Float(f64::NAN),
        ] {
            assert_eq!(n.to_string(), text(n));
        }
    }
}

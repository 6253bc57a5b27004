//! Numeric payload of `Value::Number`.
//!
//! A single representation serves the signed, unsigned and floating views:
//! integers are stored as `i128` so every `i64` and `u64` fits losslessly.

use std::fmt;

/// Integer or floating point number.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i128),
    Float(f64),
}

/// Exclusive upper bound of `i64` as a float (`2^63`).
const I64_END: f64 = 9_223_372_036_854_775_808.0;
/// Exclusive upper bound of `u64` as a float (`2^64`).
const U64_END: f64 = 18_446_744_073_709_551_616.0;
/// Exclusive upper bound of `i128` as a float (`2^127`).
const I128_END: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

impl Number {
    /// Signed view. Floats are truncated toward zero.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range is checked before truncating the float"
    )]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(n) => i64::try_from(n).ok(),
            Number::Float(f) if f.is_finite() && f >= -I64_END && f < I64_END => {
                Some(f.trunc() as i64)
            }
            Number::Float(_) => None,
        }
    }

    /// Unsigned view. Floats are truncated toward zero.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "range is checked before truncating the float"
    )]
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Number::Int(n) => u64::try_from(n).ok(),
            Number::Float(f) if f.is_finite() && f > -1.0 && f < U64_END => Some(f.trunc() as u64),
            Number::Float(_) => None,
        }
    }

    /// Floating view. Large integers lose precision.
    #[expect(
        clippy::cast_precision_loss,
        reason = "the floating view is documented as lossy"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    /// Integer value if this is an integer, or a float without fraction.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "integral and inside the i128 range"
    )]
    pub(crate) fn as_integral(self) -> Option<i128> {
        match self {
            Number::Int(n) => Some(n),
            Number::Float(f) if f.fract() == 0.0 && f >= -I128_END && f < I128_END => {
                Some(f as i128)
            }
            Number::Float(_) => None,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl PartialEq for Number {
    #[expect(clippy::float_cmp, reason = "numbers compare by exact value")]
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Float(x) if x.is_nan() => f.write_str("NaN"),
            Number::Float(x) if x.is_infinite() => {
                f.write_str(if x.is_sign_negative() { "-inf" } else { "inf" })
            }
            Number::Float(x) => {
                let text = x.to_string();
                if text.contains(['.', 'e']) {
                    f.write_str(&text)
                } else {
                    write!(f, "{text}.0")
                }
            }
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                #[inline]
                fn from(n: $ty) -> Self {
                    Number::Int(i128::from(n))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<f32> for Number {
    #[inline]
    fn from(f: f32) -> Self {
        Number::Float(f64::from(f))
    }
}

impl From<f64> for Number {
    #[inline]
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

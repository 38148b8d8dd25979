//! Integer coercion for id-like query fields.

/// Conversion into the `i64` used for ids, profile ids, and TopN `n`.
///
/// On failure the implementation returns the rejected value's textual form so
/// the caller can report it alongside the query and field name.
pub trait IntoInteger {
    /// Coerces `self` into an integer.
    fn into_integer(self) -> Result<i64, String>;
}

macro_rules! lossless_into_integer {
    ($($ty:ty),*) => {
        $(
            impl IntoInteger for $ty {
                fn into_integer(self) -> Result<i64, String> {
                    Ok(i64::from(self))
                }
            }
        )*
    };
}

macro_rules! checked_into_integer {
    ($($ty:ty),*) => {
        $(
            impl IntoInteger for $ty {
                fn into_integer(self) -> Result<i64, String> {
                    i64::try_from(self).map_err(|_| self.to_string())
                }
            }
        )*
    };
}

lossless_into_integer!(i8, i16, i32, i64, u8, u16, u32);
checked_into_integer!(u64, usize, isize, i128, u128);

impl IntoInteger for f64 {
    /// Finite floats truncate toward zero.
    fn into_integer(self) -> Result<i64, String> {
        // i64::MAX is not representable as f64; the exclusive upper bound is 2^63.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        let truncated = self.trunc();
        if truncated.is_finite() && truncated >= -LIMIT && truncated < LIMIT {
            Ok(truncated as i64)
        } else {
            Err(format!("{self:?}"))
        }
    }
}

impl IntoInteger for f32 {
    fn into_integer(self) -> Result<i64, String> {
        f64::from(self).into_integer()
    }
}

impl IntoInteger for &str {
    /// Accepts optional surrounding whitespace and a leading sign.
    fn into_integer(self) -> Result<i64, String> {
        self.trim()
            .parse::<i64>()
            .map_err(|_| format!("{self:?}"))
    }
}

impl IntoInteger for String {
    fn into_integer(self) -> Result<i64, String> {
        self.as_str().into_integer()
    }
}

impl IntoInteger for &String {
    fn into_integer(self) -> Result<i64, String> {
        self.as_str().into_integer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_convert() {
        assert_eq!(7u8.into_integer(), Ok(7));
        assert_eq!((-3i32).into_integer(), Ok(-3));
        assert_eq!(u64::MAX.into_integer(), Err(u64::MAX.to_string()));
        assert_eq!(12usize.into_integer(), Ok(12));
    }

    #[test]
    fn floats_truncate_toward_zero() {
        assert_eq!(3.9f64.into_integer(), Ok(3));
        assert_eq!((-3.9f64).into_integer(), Ok(-3));
        assert_eq!(f64::NAN.into_integer(), Err("NaN".into()));
        assert_eq!(f64::INFINITY.into_integer(), Err("inf".into()));
        assert!(1e19f64.into_integer().is_err());
    }

    #[test]
    fn strings_parse_trimmed_integers() {
        assert_eq!(" 42 ".into_integer(), Ok(42));
        assert_eq!("-5".into_integer(), Ok(-5));
        assert_eq!("1.5".into_integer(), Err("\"1.5\"".into()));
        assert_eq!(String::from("abc").into_integer(), Err("\"abc\"".into()));
    }
}

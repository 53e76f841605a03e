// SPDX-License-Identifier: MIT

//! Conversion of command arguments into the wire's byte-string form.
//!
//! Per §4.5, non-bytes arguments are converted to their UTF-8 decimal text
//! form before framing; byte-string arguments pass through untouched
//! (binary-safe).

use bytes::Bytes;

/// Anything that can be turned into a single request argument.
pub trait Argument {
    fn into_arg(self) -> Bytes;
}

impl Argument for Bytes {
    fn into_arg(self) -> Bytes {
        self
    }
}

impl Argument for Vec<u8> {
    fn into_arg(self) -> Bytes {
        Bytes::from(self)
    }
}

impl Argument for &[u8] {
    fn into_arg(self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl Argument for String {
    fn into_arg(self) -> Bytes {
        Bytes::from(self.into_bytes())
    }
}

impl Argument for &str {
    fn into_arg(self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

macro_rules! impl_argument_for_decimal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Argument for $ty {
                fn into_arg(self) -> Bytes {
                    Bytes::from(self.to_string().into_bytes())
                }
            }
        )*
    };
}

impl_argument_for_decimal!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Build a request argument vector from a sequence of heterogeneous
/// [`Argument`]s, e.g. `args!["SET", key, value]`.
#[macro_export]
macro_rules! args {
    ($($a:expr),* $(,)?) => {
        vec![$( $crate::protocol::args::Argument::into_arg($a) ),*]
    };
}

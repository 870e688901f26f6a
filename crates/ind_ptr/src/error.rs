use core::any::type_name;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// An argument could not be turned into a non-optional handle.
///
/// Returned when binding an [`Indirect`](crate::Indirect) to a null address,
/// or when a checked downcast finds a referent of a different type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidArgument {
    #[error("cannot bind an indirect reference to a null `{0}` pointer")]
    NullPointer(&'static str),

    #[error("bad cast: the referent of `{from}` is not a `{to}`")]
    BadCast {
        from: &'static str,
        to: &'static str,
    },
}

/// Checked access into an empty optional handle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BadAccess {
    #[error("bad access: optional indirect reference to `{0}` is empty")]
    Empty(&'static str),
}

/// Any error produced by this crate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IndirectError {
    #[error("invalid argument: {0}")]
    InvalidArgument(InvalidArgument),

    #[error("{0}")]
    BadAccess(BadAccess),
}

// -----------------------------------------------------------------------------
// Constructors

impl InvalidArgument {
    #[cold]
    #[inline(never)]
    pub(crate) fn null_pointer<T: ?Sized>() -> Self {
        let ty = type_name::<T>();
        log::debug!("refusing to bind `Indirect<{ty}>` to a null pointer");
        Self::NullPointer(ty)
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn bad_cast<T: ?Sized, U: ?Sized>() -> Self {
        let from = type_name::<T>();
        let to = type_name::<U>();
        log::debug!("downcast of `{from}` to `{to}` failed: referent type mismatch");
        Self::BadCast { from, to }
    }
}

impl BadAccess {
    #[cold]
    #[inline(never)]
    pub(crate) fn empty<T: ?Sized>() -> Self {
        let ty = type_name::<T>();
        log::debug!("checked access into an empty `OptionalIndirect<{ty}>`");
        Self::Empty(ty)
    }
}

// -----------------------------------------------------------------------------
// Conversion

/// Promotion into [`IndirectError`] is infallible, so `?` works in functions
/// returning the umbrella type. Demotion is a `TryFrom` that hands the error
/// back unchanged when it holds the other variant.
macro_rules! impl_from {
    ($name:ident, $variant:ident) => {
        impl From<$name> for IndirectError {
            #[inline]
            fn from(value: $name) -> Self {
                IndirectError::$variant(value)
            }
        }

        impl TryFrom<IndirectError> for $name {
            type Error = IndirectError;

            #[inline]
            fn try_from(value: IndirectError) -> Result<Self, Self::Error> {
                match value {
                    IndirectError::$variant(ret) => Ok(ret),
                    other => Err(other),
                }
            }
        }

        impl $name {
            #[inline]
            pub fn promote(self) -> IndirectError {
                IndirectError::$variant(self)
            }
        }
    };
}

impl_from!(InvalidArgument, InvalidArgument);
impl_from!(BadAccess, BadAccess);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_record_type_names() {
        assert_eq!(
            InvalidArgument::null_pointer::<i32>(),
            InvalidArgument::NullPointer("i32")
        );
        assert_eq!(BadAccess::empty::<u8>(), BadAccess::Empty("u8"));

        let InvalidArgument::BadCast { from, to } = InvalidArgument::bad_cast::<i32, str>() else {
            panic!("expected a bad cast");
        };
        assert_eq!(from, "i32");
        assert_eq!(to, "str");
    }

    #[test]
    fn promote_round_trips() {
        let err = BadAccess::empty::<i32>().promote();
        assert!(matches!(err, IndirectError::BadAccess(_)));
        assert_eq!(BadAccess::try_from(err), Ok(BadAccess::Empty("i32")));

        let err: IndirectError = InvalidArgument::null_pointer::<i32>().into();
        assert!(matches!(err, IndirectError::InvalidArgument(_)));
    }

    #[test]
    fn mismatched_demotion_returns_error() {
        let err = BadAccess::empty::<i32>().promote();
        assert_eq!(InvalidArgument::try_from(err), Err(err));

        let err = InvalidArgument::null_pointer::<u8>().promote();
        assert_eq!(BadAccess::try_from(err), Err(err));
    }

    #[test]
    fn question_mark_promotes_both_kinds() {
        use crate::{Indirect, OptionalIndirect};

        fn first_bound(o: OptionalIndirect<'_, u8>, raw: *const u8) -> Result<u8, IndirectError> {
            let a = *o.value()?;
            let b = unsafe { Indirect::from_ptr(raw) }?;
            Ok(a + *b)
        }

        let x = 2u8;
        assert_eq!(first_bound(OptionalIndirect::from_ref(&x), &raw const x), Ok(4));
        assert_eq!(
            first_bound(OptionalIndirect::EMPTY, &raw const x),
            Err(IndirectError::BadAccess(BadAccess::Empty("u8")))
        );
        assert_eq!(
            first_bound(OptionalIndirect::from_ref(&x), core::ptr::null()),
            Err(IndirectError::InvalidArgument(InvalidArgument::NullPointer("u8")))
        );
    }
}

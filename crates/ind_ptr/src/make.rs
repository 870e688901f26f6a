//! Free constructors deducing the referent type from a reference.
//!
//! There are intentionally no raw-pointer versions: binding an [`Indirect`]
//! to a pointer can fail while binding an [`OptionalIndirect`] cannot, so a
//! single deduced name would hide which of the two is happening.

use crate::indirect::{Indirect, IndirectMut};
use crate::optional::{OptionalIndirect, OptionalIndirectMut};

/// Binds an [`Indirect`] to `r`.
///
/// # Examples
///
/// ```
/// use ind_ptr::Indirect;
///
/// let x = 1;
/// let v = ind_ptr::indirect(&x);
/// assert!(core::ptr::eq(Indirect::get(v), &x));
/// ```
#[inline(always)]
pub const fn indirect<T: ?Sized>(r: &T) -> Indirect<'_, T> {
    Indirect::from_ref(r)
}

/// Binds an [`IndirectMut`] to `r`.
#[inline(always)]
pub const fn indirect_mut<T: ?Sized>(r: &mut T) -> IndirectMut<'_, T> {
    IndirectMut::from_mut(r)
}

/// Binds an [`OptionalIndirect`] to `r`. The result is never empty.
#[inline(always)]
pub const fn optional_indirect<T: ?Sized>(r: &T) -> OptionalIndirect<'_, T> {
    OptionalIndirect::from_ref(r)
}

/// Binds an [`OptionalIndirectMut`] to `r`. The result is never empty.
#[inline(always)]
pub const fn optional_indirect_mut<T: ?Sized>(r: &mut T) -> OptionalIndirectMut<'_, T> {
    OptionalIndirectMut::from_mut(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduced_handles_bind_to_argument() {
        let x = 3u8;
        assert_eq!(indirect(&x), Indirect::from_ref(&x));
        assert_eq!(optional_indirect(&x), OptionalIndirect::from_ref(&x));
        assert!(optional_indirect(&x).is_some());

        let mut y = [1, 2];
        *indirect_mut(&mut y[..]).first_mut().unwrap() = 5;
        optional_indirect_mut(&mut y).value_mut().unwrap()[1] = 6;
        assert_eq!(y, [5, 6]);
    }
}

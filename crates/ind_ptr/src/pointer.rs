use core::ptr::{self, NonNull};

use crate::indirect::{Indirect, IndirectMut};
use crate::optional::{OptionalIndirect, OptionalIndirectMut};

// -----------------------------------------------------------------------------
// GetPointer

/// Uniform extraction of the address behind a pointer-like value.
///
/// Raw pointers return themselves, owning pointers return the address they
/// manage, handles return the address they hold. Generic adapters can use
/// this instead of depending on a method name of one pointer family.
///
/// [`get_non_null`](Self::get_non_null) works for every target, slices and
/// trait objects included. [`get_pointer`](Self::get_pointer) additionally
/// encodes "no target" as null, which needs a sized target.
///
/// # Examples
///
/// ```
/// use ind_ptr::{GetPointer, Indirect, OptionalIndirect};
///
/// let x = 5;
/// let raw = &raw const x;
///
/// assert_eq!(raw.get_pointer(), raw);
/// assert_eq!(Indirect::from_ref(&x).get_pointer(), raw);
/// assert!(OptionalIndirect::<i32>::new().get_pointer().is_null());
///
/// let s: &[i32] = &[1, 2];
/// let o = OptionalIndirect::from_ref(s);
/// assert_eq!(o.get_non_null().map(|p| p.len()), Some(2));
/// assert!(OptionalIndirect::<[i32]>::EMPTY.get_non_null().is_none());
/// ```
pub trait GetPointer {
    type Target: ?Sized;

    /// Returns the address of the target, or `None` if there is none.
    fn get_non_null(&self) -> Option<NonNull<Self::Target>>;

    /// Returns the address of the target, or null if there is none.
    #[inline]
    fn get_pointer(&self) -> *const Self::Target
    where
        Self::Target: Sized,
    {
        match self.get_non_null() {
            Some(ptr) => ptr.as_ptr().cast_const(),
            None => ptr::null(),
        }
    }
}

/// Free-function form of [`GetPointer::get_non_null`].
#[inline(always)]
pub fn get_non_null<P: GetPointer + ?Sized>(p: &P) -> Option<NonNull<P::Target>> {
    p.get_non_null()
}

/// Free-function form of [`GetPointer::get_pointer`].
#[inline(always)]
pub fn get_pointer<P>(p: &P) -> *const P::Target
where
    P: GetPointer + ?Sized,
    P::Target: Sized,
{
    p.get_pointer()
}

/// Returns `true` if `a` and `b` point to the same address.
///
/// Works across pointer families and target types, e.g. an [`Indirect`] to a
/// slice against a reference to its first element. Pointer metadata is
/// ignored. An empty side (a null raw pointer, an empty optional handle)
/// never refers to an object, so the result is `false` even when both sides
/// are empty.
///
/// # Examples
///
/// ```
/// use ind_ptr::{Indirect, OptionalIndirect, same_object};
///
/// let arr = [7, 8];
/// let handle: Indirect<'_, [i32]> = Indirect::from_ref(&arr[..]);
///
/// assert!(same_object(&handle, &&arr[0]));
/// assert!(!same_object(&handle, &&arr[1]));
///
/// let empty = OptionalIndirect::<i32>::EMPTY;
/// assert!(!same_object(&empty, &empty));
/// ```
#[inline]
pub fn same_object<A, B>(a: &A, b: &B) -> bool
where
    A: GetPointer + ?Sized,
    B: GetPointer + ?Sized,
{
    match (a.get_non_null(), b.get_non_null()) {
        (Some(a), Some(b)) => ptr::addr_eq(a.as_ptr(), b.as_ptr()),
        _ => false,
    }
}

// -----------------------------------------------------------------------------
// Implementation

impl<T: ?Sized> GetPointer for *const T {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        NonNull::new(self.cast_mut())
    }
}

impl<T: ?Sized> GetPointer for *mut T {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        NonNull::new(*self)
    }
}

impl<T: ?Sized> GetPointer for NonNull<T> {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        Some(*self)
    }
}

impl<T: ?Sized> GetPointer for Option<NonNull<T>> {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        *self
    }
}

impl<T: ?Sized> GetPointer for &T {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        Some(NonNull::from_ref(*self))
    }
}

impl<T: ?Sized> GetPointer for &mut T {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        Some(NonNull::from_ref(&**self))
    }
}

impl<T: ?Sized> GetPointer for Indirect<'_, T> {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        Some(Indirect::as_non_null(*self))
    }
}

impl<T: ?Sized> GetPointer for IndirectMut<'_, T> {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        Some(IndirectMut::as_non_null(self))
    }
}

impl<T: ?Sized> GetPointer for OptionalIndirect<'_, T> {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        self.as_non_null()
    }
}

impl<T: ?Sized> GetPointer for OptionalIndirectMut<'_, T> {
    type Target = T;

    #[inline(always)]
    fn get_non_null(&self) -> Option<NonNull<T>> {
        self.as_non_null()
    }
}

#[cfg(feature = "alloc")]
mod alloc_impls {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::sync::Arc;

    use core::ptr::NonNull;

    use super::GetPointer;

    impl<T: ?Sized> GetPointer for Box<T> {
        type Target = T;

        #[inline(always)]
        fn get_non_null(&self) -> Option<NonNull<T>> {
            Some(NonNull::from_ref(&**self))
        }
    }

    impl<T: ?Sized> GetPointer for Rc<T> {
        type Target = T;

        #[inline(always)]
        fn get_non_null(&self) -> Option<NonNull<T>> {
            NonNull::new(Rc::as_ptr(self).cast_mut())
        }
    }

    impl<T: ?Sized> GetPointer for Arc<T> {
        type Target = T;

        #[inline(always)]
        fn get_non_null(&self) -> Option<NonNull<T>> {
            NonNull::new(Arc::as_ptr(self).cast_mut())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GetPointer, get_non_null, get_pointer, same_object};
    use crate::{AsAny, Indirect, IndirectMut, OptionalIndirect, OptionalIndirectMut};
    use core::ptr::{self, NonNull};

    trait Shape: AsAny {}

    struct Square;

    impl Shape for Square {}

    #[test]
    fn raw_pointers_are_identity() {
        let mut x = 1;
        let c = &raw const x;
        let m = &raw mut x;
        assert_eq!(get_pointer(&c), c);
        assert_eq!(get_pointer(&m), c);
        assert_eq!(NonNull::new(m).get_pointer(), c);
        assert!(None::<NonNull<i32>>.get_pointer().is_null());
        assert!(get_non_null(&ptr::null::<i32>()).is_none());
    }

    #[test]
    fn handles_expose_held_address() {
        let mut x = 2;
        let c = &raw const x;
        assert_eq!(get_pointer(&Indirect::from_ref(&x)), c);
        assert_eq!(get_pointer(&OptionalIndirect::from_ref(&x)), c);
        assert_eq!(get_pointer(&&x), c);

        let h = IndirectMut::from_mut(&mut x);
        assert_eq!(get_pointer(&h), c);
    }

    #[test]
    fn unsized_optional_handles_expose_held_address() {
        let bytes = [1u8, 2, 3];
        let o: OptionalIndirect<'_, [u8]> = OptionalIndirect::from_ref(&bytes[..]);
        let p = get_non_null(&o).unwrap();
        assert_eq!(p.len(), 3);
        assert!(ptr::addr_eq(p.as_ptr(), &raw const bytes));
        assert!(same_object(&o, &&bytes[0]));
        assert!(get_non_null(&OptionalIndirect::<[u8]>::EMPTY).is_none());

        let sq = Square;
        let shape: OptionalIndirect<'_, dyn Shape> = OptionalIndirect::from_ref(&sq);
        assert!(same_object(&shape, &&sq));
        assert!(!same_object(&OptionalIndirect::<dyn Shape>::EMPTY, &shape));

        let mut tail = [0u8; 2];
        let m: OptionalIndirectMut<'_, [u8]> = OptionalIndirectMut::from_mut(&mut tail[..]);
        assert_eq!(m.get_non_null().map(|p| p.len()), Some(2));
    }

    #[test]
    fn same_object_ignores_metadata() {
        let arr = [1u8, 2, 3];
        let whole: &[u8] = &arr;
        let first = &arr[0];
        assert!(same_object(&whole, &first));
        assert!(same_object(&Indirect::from_ref(whole), &ptr::from_ref(&arr)));
        assert!(!same_object(&first, &&arr[1]));
    }

    #[test]
    fn empty_sides_never_match() {
        let empty = OptionalIndirect::<u8>::EMPTY;
        assert!(!same_object(&empty, &empty));
        assert!(!same_object(&ptr::null::<u8>(), &ptr::null_mut::<u8>()));

        let x = 1u8;
        assert!(!same_object(&empty, &&x));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn owning_pointers_expose_managed_address() {
        use alloc::boxed::Box;
        use alloc::rc::Rc;
        use alloc::sync::Arc;

        let b = Box::new(3);
        assert!(same_object(&b, &Indirect::from_ref(&*b)));

        let r = Rc::new(4);
        let r2 = Rc::clone(&r);
        assert!(same_object(&r, &r2));
        assert_eq!(get_pointer(&r), Rc::as_ptr(&r));

        let a = Arc::new(5);
        assert!(same_object(&a, &OptionalIndirect::from_ref(&*a)));

        let s: Box<[u8]> = Box::new([1, 2]);
        assert_eq!(get_non_null(&s).map(|p| p.len()), Some(2));
    }
}

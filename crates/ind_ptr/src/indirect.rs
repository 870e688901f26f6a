use core::any::Any;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

use crate::cast::AsAny;
use crate::error::InvalidArgument;

// -----------------------------------------------------------------------------
// Identity semantics

#[inline(always)]
fn thin_addr<T: ?Sized>(ptr: NonNull<T>) -> *const () {
    ptr.as_ptr().cast_const().cast::<()>()
}

/// Comparison, hashing and formatting shared by both non-optional handles.
///
/// Everything compares the held address only, never the referent.
/// Pointer metadata (slice length, vtable) is ignored, and distinct
/// zero-sized objects placed at the same address compare equal.
macro_rules! impl_identity {
    ($name:ident) => {
        impl<T: ?Sized> PartialEq for $name<'_, T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                thin_addr(self.ptr) == thin_addr(other.ptr)
            }
        }

        impl<T: ?Sized> Eq for $name<'_, T> {}

        impl<T: ?Sized> PartialOrd for $name<'_, T> {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(Ord::cmp(self, other))
            }
        }

        impl<T: ?Sized> Ord for $name<'_, T> {
            #[inline]
            fn cmp(&self, other: &Self) -> Ordering {
                thin_addr(self.ptr).cmp(&thin_addr(other.ptr))
            }
        }

        impl<T: ?Sized> Hash for $name<'_, T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                thin_addr(self.ptr).hash(state);
            }
        }

        impl<T: ?Sized> fmt::Pointer for $name<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Pointer::fmt(&self.ptr, f)
            }
        }

        impl<T: ?Sized + fmt::Debug> fmt::Debug for $name<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&&**self).finish()
            }
        }

        impl<T: ?Sized + fmt::Display> fmt::Display for $name<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&**self, f)
            }
        }

        impl<T: ?Sized> AsRef<T> for $name<'_, T> {
            #[inline(always)]
            fn as_ref(&self) -> &T {
                self
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Indirect

/// A non-null, rebindable, non-owning reference to a `T`.
///
/// `Indirect` is constructed like a reference and assigned like a pointer:
/// binding requires a live object, assignment replaces the held address
/// without touching either referent. It is `Copy`, has no empty state and
/// compares by identity. Two distinct zero-sized objects may share an
/// address and then compare equal.
///
/// `Indirect` dereferences to `T`, so its own operations are associated
/// functions (`Indirect::get(v)` rather than `v.get()`) and never hide a
/// method of the referent.
///
/// # Examples
///
/// ```
/// use ind_ptr::Indirect;
///
/// let i = 1;
/// let j = 2;
///
/// let mut v = Indirect::from_ref(&i);
/// v = Indirect::from_ref(&j);
///
/// assert_eq!(*v, 2);
/// assert!(core::ptr::eq(Indirect::get(v), &j));
/// assert_eq!(i, 1);
/// ```
#[repr(transparent)]
pub struct Indirect<'a, T: ?Sized> {
    ptr: NonNull<T>,
    _marker: PhantomData<&'a T>,
}

// SAFETY: `Indirect` behaves like `&'a T`.
unsafe impl<T: ?Sized + Sync> Send for Indirect<'_, T> {}
// SAFETY: `Indirect` behaves like `&'a T`.
unsafe impl<T: ?Sized + Sync> Sync for Indirect<'_, T> {}

impl<T: ?Sized> Clone for Indirect<'_, T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Indirect<'_, T> {}

impl_identity!(Indirect);

impl<'a, T: ?Sized> Indirect<'a, T> {
    /// Binds to the object behind `r`.
    #[inline(always)]
    pub const fn from_ref(r: &'a T) -> Self {
        Self {
            ptr: NonNull::from_ref(r),
            _marker: PhantomData,
        }
    }

    /// Binds to the object at `ptr`.
    ///
    /// Returns [`InvalidArgument::NullPointer`] if `ptr` is null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be
    /// [convertible to a reference](https://doc.rust-lang.org/stable/core/ptr/index.html#pointer-to-reference-conversion)
    /// for the whole lifetime `'a`, and the pointee must not be mutated during
    /// that lifetime.
    ///
    /// # Examples
    ///
    /// ```
    /// use ind_ptr::{Indirect, InvalidArgument};
    ///
    /// let x = 3;
    /// let v = unsafe { Indirect::from_ptr(&raw const x) }.unwrap();
    /// assert_eq!(*v, 3);
    ///
    /// let err = unsafe { Indirect::<i32>::from_ptr(core::ptr::null()) }.unwrap_err();
    /// assert!(matches!(err, InvalidArgument::NullPointer(_)));
    /// ```
    #[inline]
    pub unsafe fn from_ptr(ptr: *const T) -> Result<Self, InvalidArgument> {
        match NonNull::new(ptr.cast_mut()) {
            // SAFETY: upheld by the caller.
            Some(ptr) => Ok(unsafe { Self::from_non_null(ptr) }),
            None => Err(InvalidArgument::null_pointer::<T>()),
        }
    }

    /// Binds to the object at `ptr`.
    ///
    /// # Safety
    ///
    /// Same as [`from_ptr`](Self::from_ptr).
    #[inline(always)]
    pub const unsafe fn from_non_null(ptr: NonNull<T>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Returns the referent with the full lifetime `'a`.
    #[inline(always)]
    pub const fn get(this: Self) -> &'a T {
        // SAFETY: `ptr` came from a reference valid for `'a`.
        unsafe { this.ptr.as_ref() }
    }

    /// Returns the held address. Never null.
    #[inline(always)]
    pub const fn as_ptr(this: Self) -> *const T {
        this.ptr.as_ptr().cast_const()
    }

    /// Returns the held address as a [`NonNull`].
    #[inline(always)]
    pub const fn as_non_null(this: Self) -> NonNull<T> {
        this.ptr
    }

    /// Rebinds to a reference derived from the current referent.
    ///
    /// This is the compile-time checked conversion: projecting to a field or
    /// unsizing to a trait object.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::fmt::Debug;
    /// use ind_ptr::Indirect;
    ///
    /// let pair = (1u8, "one");
    /// let second = Indirect::map(Indirect::from_ref(&pair), |p| &p.1);
    /// assert_eq!(*second, "one");
    ///
    /// let erased = Indirect::map(Indirect::from_ref(&pair), |p| p as &dyn Debug);
    /// assert!(core::ptr::addr_eq(Indirect::as_ptr(erased), &raw const pair));
    /// ```
    #[inline]
    pub fn map<U: ?Sized>(this: Self, f: impl FnOnce(&'a T) -> &'a U) -> Indirect<'a, U> {
        Indirect::from_ref(f(Self::get(this)))
    }

    /// Reinterprets the held address as pointing to a `U`, unchecked.
    ///
    /// # Safety
    ///
    /// The referent must be a valid, properly aligned `U`.
    #[inline(always)]
    pub const unsafe fn cast<U>(this: Self) -> Indirect<'a, U> {
        // SAFETY: upheld by the caller.
        unsafe { Indirect::from_non_null(this.ptr.cast()) }
    }

    /// Removes the shared-access restriction.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that no other reference to the referent is
    /// used for the rest of `'a`, and that the referent was not originally
    /// obtained from a shared borrow of memory that may not be written.
    #[inline(always)]
    pub const unsafe fn cast_mut(this: Self) -> IndirectMut<'a, T> {
        // SAFETY: upheld by the caller.
        unsafe { IndirectMut::from_non_null(this.ptr) }
    }

    /// Returns `true` if the referent is a `U`.
    #[inline]
    pub fn is<U: Any>(this: Self) -> bool
    where
        T: AsAny,
    {
        Self::get(this).as_any().is::<U>()
    }

    /// Checked conversion to the concrete type of the referent.
    ///
    /// Returns [`InvalidArgument::BadCast`] when the referent is not a `U`,
    /// since an `Indirect` cannot represent "nothing".
    #[inline]
    pub fn downcast<U: Any>(this: Self) -> Result<Indirect<'a, U>, InvalidArgument>
    where
        T: AsAny,
    {
        match Self::get(this).as_any().downcast_ref::<U>() {
            Some(r) => Ok(Indirect::from_ref(r)),
            None => Err(InvalidArgument::bad_cast::<T, U>()),
        }
    }
}

impl<T: ?Sized> Deref for Indirect<'_, T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        Indirect::get(*self)
    }
}

impl<'a, T: ?Sized> From<&'a T> for Indirect<'a, T> {
    #[inline(always)]
    fn from(r: &'a T) -> Self {
        Self::from_ref(r)
    }
}

impl<'a, T: ?Sized> From<&'a mut T> for Indirect<'a, T> {
    #[inline(always)]
    fn from(r: &'a mut T) -> Self {
        Self::from_ref(r)
    }
}

impl<'a, T: ?Sized> From<IndirectMut<'a, T>> for Indirect<'a, T> {
    #[inline(always)]
    fn from(value: IndirectMut<'a, T>) -> Self {
        IndirectMut::into_indirect(value)
    }
}

// -----------------------------------------------------------------------------
// IndirectMut

/// A non-null, rebindable, non-owning reference with unique access to a `T`.
///
/// The unique counterpart of [`Indirect`]: it yields `&mut T` and is therefore
/// move-only. Rebinding is ordinary assignment of another `IndirectMut`.
/// Like [`Indirect`], its own operations are associated functions and it
/// compares by held address, zero-sized referents included.
///
/// # Examples
///
/// ```
/// use ind_ptr::{Indirect, IndirectMut};
///
/// let mut a = 1;
/// let mut b = 2;
///
/// let mut h = IndirectMut::from_mut(&mut a);
/// *h += 10;
/// h = IndirectMut::from_mut(&mut b);
/// *h += 20;
///
/// let shared: Indirect<'_, i32> = h.into();
/// assert_eq!(*shared, 22);
/// assert_eq!(a, 11);
/// ```
#[repr(transparent)]
pub struct IndirectMut<'a, T: ?Sized> {
    ptr: NonNull<T>,
    _marker: PhantomData<&'a mut T>,
}

// SAFETY: `IndirectMut` behaves like `&'a mut T`.
unsafe impl<T: ?Sized + Send> Send for IndirectMut<'_, T> {}
// SAFETY: `IndirectMut` behaves like `&'a mut T`.
unsafe impl<T: ?Sized + Sync> Sync for IndirectMut<'_, T> {}

impl_identity!(IndirectMut);

impl<'a, T: ?Sized> IndirectMut<'a, T> {
    /// Binds to the object behind `r`.
    #[inline(always)]
    pub const fn from_mut(r: &'a mut T) -> Self {
        Self {
            ptr: NonNull::from_mut(r),
            _marker: PhantomData,
        }
    }

    /// Binds to the object at `ptr`.
    ///
    /// Returns [`InvalidArgument::NullPointer`] if `ptr` is null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be convertible to a mutable reference for the
    /// whole lifetime `'a`, and no other access to the pointee may happen
    /// during that lifetime.
    #[inline]
    pub unsafe fn from_ptr(ptr: *mut T) -> Result<Self, InvalidArgument> {
        match NonNull::new(ptr) {
            // SAFETY: upheld by the caller.
            Some(ptr) => Ok(unsafe { Self::from_non_null(ptr) }),
            None => Err(InvalidArgument::null_pointer::<T>()),
        }
    }

    /// Binds to the object at `ptr`.
    ///
    /// # Safety
    ///
    /// Same as [`from_ptr`](Self::from_ptr).
    #[inline(always)]
    pub const unsafe fn from_non_null(ptr: NonNull<T>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Returns the referent with the full lifetime `'a`.
    #[inline(always)]
    pub fn into_mut(this: Self) -> &'a mut T {
        let mut ptr = this.ptr;
        // SAFETY: `ptr` came from a unique reference valid for `'a`,
        // and `this` is consumed.
        unsafe { ptr.as_mut() }
    }

    /// Returns the referent as a shared reference with the full lifetime `'a`.
    #[inline(always)]
    pub fn into_ref(this: Self) -> &'a T {
        Self::into_mut(this)
    }

    /// Gives up unique access, keeping the binding.
    #[inline(always)]
    pub fn into_indirect(this: Self) -> Indirect<'a, T> {
        // SAFETY: shared access is a subset of unique access.
        unsafe { Indirect::from_non_null(this.ptr) }
    }

    /// Borrows as a shared handle for the lifetime of `this`.
    #[inline(always)]
    pub const fn as_indirect(this: &Self) -> Indirect<'_, T> {
        // SAFETY: the shared borrow of `this` prevents unique access while
        // the result lives.
        unsafe { Indirect::from_non_null(this.ptr) }
    }

    /// Reborrows for a shorter lifetime, leaving `this` usable afterwards.
    #[inline(always)]
    pub fn reborrow(this: &mut Self) -> IndirectMut<'_, T> {
        IndirectMut::from_mut(&mut **this)
    }

    /// Returns the held address. Never null.
    #[inline(always)]
    pub const fn as_ptr(this: &Self) -> *const T {
        this.ptr.as_ptr().cast_const()
    }

    /// Returns the held address for writing. Never null.
    #[inline(always)]
    pub const fn as_mut_ptr(this: &mut Self) -> *mut T {
        this.ptr.as_ptr()
    }

    /// Returns the held address as a [`NonNull`].
    #[inline(always)]
    pub const fn as_non_null(this: &Self) -> NonNull<T> {
        this.ptr
    }

    /// Rebinds to a unique reference derived from the current referent.
    #[inline]
    pub fn map<U: ?Sized>(this: Self, f: impl FnOnce(&'a mut T) -> &'a mut U) -> IndirectMut<'a, U> {
        IndirectMut::from_mut(f(Self::into_mut(this)))
    }

    /// Reinterprets the held address as pointing to a `U`, unchecked.
    ///
    /// # Safety
    ///
    /// The referent must be a valid, properly aligned `U`.
    #[inline(always)]
    pub unsafe fn cast<U>(this: Self) -> IndirectMut<'a, U> {
        // SAFETY: upheld by the caller.
        unsafe { IndirectMut::from_non_null(this.ptr.cast()) }
    }

    /// Returns `true` if the referent is a `U`.
    #[inline]
    pub fn is<U: Any>(this: &Self) -> bool
    where
        T: AsAny,
    {
        (**this).as_any().is::<U>()
    }

    /// Checked conversion to the concrete type of the referent.
    ///
    /// Returns [`InvalidArgument::BadCast`] when the referent is not a `U`.
    #[inline]
    pub fn downcast<U: Any>(this: Self) -> Result<IndirectMut<'a, U>, InvalidArgument>
    where
        T: AsAny,
    {
        match Self::into_mut(this).as_any_mut().downcast_mut::<U>() {
            Some(r) => Ok(IndirectMut::from_mut(r)),
            None => Err(InvalidArgument::bad_cast::<T, U>()),
        }
    }
}

impl<T: ?Sized> Deref for IndirectMut<'_, T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        // SAFETY: `&self` prevents unique access while the result lives.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized> DerefMut for IndirectMut<'_, T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: `&mut self` is the only path to the referent.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: ?Sized> AsMut<T> for IndirectMut<'_, T> {
    #[inline(always)]
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

impl<'a, T: ?Sized> From<&'a mut T> for IndirectMut<'a, T> {
    #[inline(always)]
    fn from(r: &'a mut T) -> Self {
        Self::from_mut(r)
    }
}

#[cfg(test)]
mod tests {
    use super::{Indirect, IndirectMut};
    use crate::{AsAny, InvalidArgument};
    use core::cell::Cell;
    use core::mem::size_of;
    use core::ptr;

    trait Shape: AsAny {
        fn sides(&self) -> u32;
    }

    struct Triangle;
    #[derive(Debug)]
    struct Square(u32);

    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    #[test]
    fn binds_to_identity() {
        let x = 5;
        let v = Indirect::from_ref(&x);
        assert!(ptr::eq(&*v, &x));
        assert!(ptr::eq(Indirect::get(v), &x));
        assert_eq!(Indirect::as_ptr(v), &raw const x);
    }

    #[test]
    fn assignment_rebinds_without_writing() {
        let i = 1;
        let j = 2;
        let mut a = Indirect::from_ref(&i);
        let b = Indirect::from_ref(&j);
        assert_ne!(a, b);

        a = b;
        assert_eq!(a, b);
        assert_eq!(*a, 2);
        assert!(ptr::eq(&*a, &j));
        assert_eq!(i, 1);
    }

    #[test]
    fn compares_identity_not_value() {
        let x = [7u8; 4];
        let y = [7u8; 4];
        assert_eq!(x, y);
        assert_ne!(Indirect::from_ref(&x), Indirect::from_ref(&y));
        assert_eq!(Indirect::from_ref(&x), Indirect::from_ref(&x));

        // Ordering follows the addresses.
        let arr = [0u32; 2];
        let lo = Indirect::from_ref(&arr[0]);
        let hi = Indirect::from_ref(&arr[1]);
        assert!(lo < hi);
    }

    #[test]
    fn unsized_referents_compare_by_address() {
        let s = [1, 2, 3];
        let whole: Indirect<'_, [i32]> = Indirect::from_ref(&s[..]);
        let prefix: Indirect<'_, [i32]> = Indirect::from_ref(&s[..1]);
        assert_eq!(whole, prefix);
        assert_eq!(whole.len(), 3);
    }

    #[test]
    fn referent_methods_are_not_shadowed() {
        let cell = Cell::new(5);
        let v = Indirect::from_ref(&cell);
        assert_eq!(v.get(), 5);
        v.set(6);
        assert_eq!(cell.get(), 6);

        let s = [10, 20, 30];
        let v: Indirect<'_, [i32]> = Indirect::from_ref(&s[..]);
        assert_eq!(v.get(0), Some(&10));
        assert_eq!(v.first(), Some(&10));

        let mut t = [1, 2];
        let base = t.as_ptr();
        let mut h: IndirectMut<'_, [i32]> = IndirectMut::from_mut(&mut t[..]);
        *h.get_mut(1).unwrap() = 5;
        assert_eq!(h.as_ptr(), base);
        assert_eq!(t, [1, 5]);
    }

    #[test]
    fn from_ptr_checks_null() {
        let x = 9;
        let v = unsafe { Indirect::from_ptr(&raw const x) }.unwrap();
        assert_eq!(v, Indirect::from_ref(&x));
        assert_eq!(*v, 9);

        let err = unsafe { Indirect::<u64>::from_ptr(ptr::null()) }.unwrap_err();
        assert_eq!(err, InvalidArgument::NullPointer("u64"));

        let err = unsafe { IndirectMut::<u64>::from_ptr(ptr::null_mut()) }.unwrap_err();
        assert!(matches!(err, InvalidArgument::NullPointer(_)));
    }

    #[test]
    fn interior_mutability_through_shared_handle() {
        let counter = Cell::new(0);
        let a = Indirect::from_ref(&counter);
        let b = a;
        a.set(a.get() + 1);
        b.set(b.get() + 1);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn unique_handle_writes_and_reborrows() {
        let mut x = 1;
        let mut h = IndirectMut::from_mut(&mut x);
        {
            let mut r = IndirectMut::reborrow(&mut h);
            *r = 4;
        }
        *h *= 2;
        assert_eq!(IndirectMut::as_indirect(&h), IndirectMut::as_indirect(&h));
        let shared = IndirectMut::into_indirect(h);
        assert_eq!(*shared, 8);
        assert_eq!(x, 8);
    }

    #[test]
    fn map_projects_and_unsizes() {
        let sq = Square(2);
        let whole = Indirect::from_ref(&sq);
        let field = Indirect::map(whole, |s| &s.0);
        assert_eq!(*field, 2);

        let shape = Indirect::map(whole, |s| s as &dyn Shape);
        assert_eq!(shape.sides(), 4);
        assert!(ptr::addr_eq(Indirect::as_ptr(shape), Indirect::as_ptr(whole)));
    }

    #[test]
    fn downcast_checks_runtime_type() {
        let sq = Square(5);
        let tri = Triangle;

        let shape: Indirect<'_, dyn Shape> = Indirect::from_ref(&sq);
        assert!(Indirect::is::<Square>(shape));
        let back = Indirect::downcast::<Square>(shape).unwrap();
        assert_eq!(back.0, 5);
        assert!(ptr::eq(Indirect::get(back), &sq));

        let shape: Indirect<'_, dyn Shape> = Indirect::from_ref(&tri);
        let err = Indirect::downcast::<Square>(shape).unwrap_err();
        assert!(matches!(err, InvalidArgument::BadCast { .. }));
    }

    #[test]
    fn downcast_mut_writes_through() {
        let mut sq = Square(1);
        {
            let shape: IndirectMut<'_, dyn Shape> = IndirectMut::from_mut(&mut sq);
            assert!(IndirectMut::is::<Square>(&shape));
            let mut back = IndirectMut::downcast::<Square>(shape).unwrap();
            back.0 = 6;
        }
        assert_eq!(sq.0, 6);

        let mut tri = Triangle;
        let shape: IndirectMut<'_, dyn Shape> = IndirectMut::from_mut(&mut tri);
        assert!(IndirectMut::downcast::<Square>(shape).is_err());
    }

    #[test]
    fn const_casts() {
        let mut x = 3;
        let unique = IndirectMut::from_mut(&mut x);
        let shared: Indirect<'_, i32> = unique.into();
        let mut again = unsafe { Indirect::cast_mut(shared) };
        *again += 1;
        assert_eq!(x, 4);
    }

    #[test]
    fn zero_sized_referents_share_identity() {
        let units = [(), ()];
        assert_eq!(Indirect::from_ref(&units[0]), Indirect::from_ref(&units[1]));
    }

    #[test]
    fn thin_and_thread_safe() {
        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}
        fn is_copy<T: Copy>() {}

        is_send::<Indirect<'_, i32>>();
        is_sync::<Indirect<'_, i32>>();
        is_copy::<Indirect<'_, i32>>();
        is_send::<IndirectMut<'_, i32>>();
        is_sync::<IndirectMut<'_, i32>>();

        assert_eq!(size_of::<Indirect<'_, i32>>(), size_of::<&i32>());
        assert_eq!(size_of::<Option<Indirect<'_, i32>>>(), size_of::<&i32>());
    }
}

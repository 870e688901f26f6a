use core::any::Any;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

use crate::cast::AsAny;
use crate::error::BadAccess;
use crate::indirect::{Indirect, IndirectMut};

// -----------------------------------------------------------------------------
// Identity semantics

/// Identity comparison for the optional handles.
///
/// Empty handles are equal to each other and sort before every bound handle.
/// Bound handles compare by address, like [`Indirect`], so distinct
/// zero-sized objects placed at the same address compare equal.
macro_rules! impl_identity {
    ($name:ident) => {
        impl<T: ?Sized> $name<'_, T> {
            #[inline(always)]
            fn addr(&self) -> Option<*const ()> {
                match self.ptr {
                    Some(ptr) => Some(ptr.as_ptr().cast_const().cast::<()>()),
                    None => None,
                }
            }
        }

        impl<T: ?Sized> PartialEq for $name<'_, T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.addr() == other.addr()
            }
        }

        impl<T: ?Sized> Eq for $name<'_, T> {}

        impl<T: ?Sized> PartialOrd for $name<'_, T> {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<T: ?Sized> Ord for $name<'_, T> {
            #[inline]
            fn cmp(&self, other: &Self) -> Ordering {
                self.addr().cmp(&other.addr())
            }
        }

        impl<T: ?Sized> Hash for $name<'_, T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.addr().hash(state);
            }
        }

        impl<T: ?Sized> fmt::Pointer for $name<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Pointer::fmt(&self.addr().unwrap_or(ptr::null()), f)
            }
        }

        impl<T: ?Sized + fmt::Debug> fmt::Debug for $name<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.get() {
                    Some(value) => f.debug_tuple(stringify!($name)).field(&value).finish(),
                    None => write!(f, "{}(empty)", stringify!($name)),
                }
            }
        }

        impl<T: ?Sized> Default for $name<'_, T> {
            #[inline(always)]
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

// -----------------------------------------------------------------------------
// OptionalIndirect

/// An optional, rebindable, non-owning reference to a `T`.
///
/// The nullable counterpart of [`Indirect`]. It starts out empty, can be bound
/// to an object, reset, and converted into an [`Indirect`] with a check.
/// Same size as a pointer.
///
/// Comparison is by held address. Two distinct zero-sized objects may share
/// an address and then compare equal.
///
/// # Examples
///
/// ```
/// use ind_ptr::OptionalIndirect;
///
/// let i = 1;
///
/// let mut o = OptionalIndirect::new();
/// assert!(o.is_none());
///
/// o = OptionalIndirect::from_ref(&i);
/// assert!(o.is_some());
/// assert_eq!(o.value(), Ok(&i));
///
/// o = OptionalIndirect::EMPTY;
/// assert!(o.is_none());
/// assert_eq!(o.value_or(7), 7);
/// ```
#[repr(transparent)]
pub struct OptionalIndirect<'a, T: ?Sized> {
    ptr: Option<NonNull<T>>,
    _marker: PhantomData<&'a T>,
}

// SAFETY: `OptionalIndirect` behaves like `Option<&'a T>`.
unsafe impl<T: ?Sized + Sync> Send for OptionalIndirect<'_, T> {}
// SAFETY: `OptionalIndirect` behaves like `Option<&'a T>`.
unsafe impl<T: ?Sized + Sync> Sync for OptionalIndirect<'_, T> {}

impl<T: ?Sized> Clone for OptionalIndirect<'_, T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for OptionalIndirect<'_, T> {}

impl_identity!(OptionalIndirect);

impl<'a, T: ?Sized> OptionalIndirect<'a, T> {
    /// The empty handle.
    pub const EMPTY: Self = Self {
        ptr: None,
        _marker: PhantomData,
    };

    /// Creates an empty handle.
    #[inline(always)]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Binds to the object behind `r`.
    #[inline(always)]
    pub const fn from_ref(r: &'a T) -> Self {
        Self {
            ptr: Some(NonNull::from_ref(r)),
            _marker: PhantomData,
        }
    }

    /// Widens an [`Indirect`]. The result is never empty.
    #[inline(always)]
    pub const fn from_indirect(ind: Indirect<'a, T>) -> Self {
        Self {
            ptr: Some(Indirect::as_non_null(ind)),
            _marker: PhantomData,
        }
    }

    /// Binds to the object at `ptr`, or creates an empty handle if `ptr` is null.
    ///
    /// Unlike [`Indirect::from_ptr`] this never fails: null is the empty state.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be
    /// [convertible to a reference](https://doc.rust-lang.org/stable/core/ptr/index.html#pointer-to-reference-conversion)
    /// for the whole lifetime `'a`, and the pointee must not be mutated during
    /// that lifetime.
    #[inline(always)]
    pub const unsafe fn from_ptr(ptr: *const T) -> Self {
        Self {
            ptr: NonNull::new(ptr.cast_mut()),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle is bound.
    #[inline(always)]
    pub const fn is_some(self) -> bool {
        self.ptr.is_some()
    }

    /// Returns `true` if the handle is empty.
    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.ptr.is_none()
    }

    /// Returns the referent, or `None` if empty.
    #[inline]
    pub const fn get(self) -> Option<&'a T> {
        match self.ptr {
            // SAFETY: `ptr` came from a reference valid for `'a`.
            Some(ptr) => Some(unsafe { ptr.as_ref() }),
            None => None,
        }
    }

    /// Returns the referent without checking for emptiness.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    #[inline(always)]
    pub const unsafe fn get_unchecked(self) -> &'a T {
        // SAFETY: the caller guarantees the handle is bound.
        unsafe { self.ptr.unwrap_unchecked().as_ref() }
    }

    /// Checked access to the referent.
    ///
    /// Returns [`BadAccess::Empty`] if the handle is empty.
    #[inline]
    pub fn value(self) -> Result<&'a T, BadAccess> {
        self.get().ok_or_else(BadAccess::empty::<T>)
    }

    /// Returns a copy of the referent, or `default` if empty.
    #[inline]
    pub fn value_or(self, default: T) -> T
    where
        T: Clone,
    {
        match self.get() {
            Some(value) => value.clone(),
            None => default,
        }
    }

    /// Returns a copy of the referent, or the result of `f` if empty.
    #[inline]
    pub fn value_or_else(self, f: impl FnOnce() -> T) -> T
    where
        T: Clone,
    {
        match self.get() {
            Some(value) => value.clone(),
            None => f(),
        }
    }

    /// Checked conversion into an [`Indirect`].
    ///
    /// Returns [`BadAccess::Empty`] if the handle is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ind_ptr::{BadAccess, Indirect, OptionalIndirect};
    ///
    /// let x = 4;
    /// let ind = OptionalIndirect::from_ref(&x).into_indirect().unwrap();
    /// assert_eq!(ind, Indirect::from_ref(&x));
    ///
    /// let empty = OptionalIndirect::<i32>::new();
    /// assert_eq!(empty.into_indirect(), Err(BadAccess::Empty("i32")));
    /// ```
    #[inline]
    pub fn into_indirect(self) -> Result<Indirect<'a, T>, BadAccess> {
        match self.ptr {
            // SAFETY: `ptr` came from a reference valid for `'a`.
            Some(ptr) => Ok(unsafe { Indirect::from_non_null(ptr) }),
            None => Err(BadAccess::empty::<T>()),
        }
    }

    /// Returns the held address, or `None` if empty.
    #[inline(always)]
    pub const fn as_non_null(self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Binds to the object behind `r`, discarding the previous binding.
    #[inline(always)]
    pub const fn set(&mut self, r: &'a T) {
        self.ptr = Some(NonNull::from_ref(r));
    }

    /// Resets to the empty state.
    #[inline(always)]
    pub const fn reset(&mut self) {
        self.ptr = None;
    }

    /// Takes the binding out, leaving the handle empty.
    #[inline(always)]
    pub const fn take(&mut self) -> Self {
        mem::replace(self, Self::EMPTY)
    }

    /// Binds to `r`, returning the previous handle.
    #[inline(always)]
    pub const fn replace(&mut self, r: &'a T) -> Self {
        mem::replace(self, Self::from_ref(r))
    }

    /// Rebinds to a reference derived from the referent. Empty stays empty.
    #[inline]
    pub fn map<U: ?Sized>(self, f: impl FnOnce(&'a T) -> &'a U) -> OptionalIndirect<'a, U> {
        match self.get() {
            Some(value) => OptionalIndirect::from_ref(f(value)),
            None => OptionalIndirect::EMPTY,
        }
    }

    /// Reinterprets the held address as pointing to a `U`, unchecked.
    ///
    /// # Safety
    ///
    /// If bound, the referent must be a valid, properly aligned `U`.
    #[inline(always)]
    pub const unsafe fn cast<U>(self) -> OptionalIndirect<'a, U> {
        OptionalIndirect {
            ptr: match self.ptr {
                Some(ptr) => Some(ptr.cast()),
                None => None,
            },
            _marker: PhantomData,
        }
    }

    /// Removes the shared-access restriction.
    ///
    /// # Safety
    ///
    /// Same as [`Indirect::cast_mut`].
    #[inline(always)]
    pub const unsafe fn cast_mut(self) -> OptionalIndirectMut<'a, T> {
        OptionalIndirectMut {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle is bound to a `U`.
    #[inline]
    pub fn is<U: Any>(self) -> bool
    where
        T: AsAny,
    {
        self.get().is_some_and(|value| value.as_any().is::<U>())
    }

    /// Checked conversion to the concrete type of the referent.
    ///
    /// Yields an empty handle when the referent is not a `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::any::Any;
    /// use ind_ptr::OptionalIndirect;
    ///
    /// let x = 1u32;
    /// let any: OptionalIndirect<'_, dyn Any> = OptionalIndirect::from_ref(&x);
    ///
    /// assert!(any.downcast::<u32>().is_some());
    /// assert!(any.downcast::<i64>().is_none());
    /// ```
    #[inline]
    pub fn downcast<U: Any>(self) -> OptionalIndirect<'a, U>
    where
        T: AsAny,
    {
        match self.get() {
            Some(value) => match value.as_any().downcast_ref::<U>() {
                Some(r) => OptionalIndirect::from_ref(r),
                None => OptionalIndirect::EMPTY,
            },
            None => OptionalIndirect::EMPTY,
        }
    }
}

impl<T> OptionalIndirect<'_, T> {
    /// Returns the held address, or null if empty.
    #[inline(always)]
    pub const fn as_ptr(self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr().cast_const(),
            None => ptr::null(),
        }
    }
}

impl<'a, T: ?Sized> From<&'a T> for OptionalIndirect<'a, T> {
    #[inline(always)]
    fn from(r: &'a T) -> Self {
        Self::from_ref(r)
    }
}

impl<'a, T: ?Sized> From<Option<&'a T>> for OptionalIndirect<'a, T> {
    #[inline]
    fn from(r: Option<&'a T>) -> Self {
        match r {
            Some(r) => Self::from_ref(r),
            None => Self::EMPTY,
        }
    }
}

impl<'a, T: ?Sized> From<Indirect<'a, T>> for OptionalIndirect<'a, T> {
    #[inline(always)]
    fn from(ind: Indirect<'a, T>) -> Self {
        Self::from_indirect(ind)
    }
}

impl<'a, T: ?Sized> From<OptionalIndirect<'a, T>> for Option<&'a T> {
    #[inline(always)]
    fn from(value: OptionalIndirect<'a, T>) -> Self {
        value.get()
    }
}

impl<'a, T: ?Sized> TryFrom<OptionalIndirect<'a, T>> for Indirect<'a, T> {
    type Error = BadAccess;

    #[inline]
    fn try_from(value: OptionalIndirect<'a, T>) -> Result<Self, Self::Error> {
        value.into_indirect()
    }
}

impl<T: ?Sized> PartialEq<Indirect<'_, T>> for OptionalIndirect<'_, T> {
    #[inline]
    fn eq(&self, other: &Indirect<'_, T>) -> bool {
        match self.ptr {
            Some(ptr) => ptr::addr_eq(ptr.as_ptr(), Indirect::as_ptr(*other)),
            None => false,
        }
    }
}

impl<T: ?Sized> PartialEq<OptionalIndirect<'_, T>> for Indirect<'_, T> {
    #[inline]
    fn eq(&self, other: &OptionalIndirect<'_, T>) -> bool {
        other == self
    }
}

// -----------------------------------------------------------------------------
// OptionalIndirectMut

/// An optional, rebindable, non-owning reference with unique access to a `T`.
///
/// The unique counterpart of [`OptionalIndirect`], and the optional
/// counterpart of [`IndirectMut`]. Move-only.
///
/// # Examples
///
/// ```
/// use ind_ptr::OptionalIndirectMut;
///
/// let mut x = 1;
///
/// let mut o = OptionalIndirectMut::from_mut(&mut x);
/// if let Ok(v) = o.value_mut() {
///     *v += 1;
/// }
/// o.reset();
/// assert!(o.value_mut().is_err());
///
/// assert_eq!(x, 2);
/// ```
#[repr(transparent)]
pub struct OptionalIndirectMut<'a, T: ?Sized> {
    ptr: Option<NonNull<T>>,
    _marker: PhantomData<&'a mut T>,
}

// SAFETY: `OptionalIndirectMut` behaves like `Option<&'a mut T>`.
unsafe impl<T: ?Sized + Send> Send for OptionalIndirectMut<'_, T> {}
// SAFETY: `OptionalIndirectMut` behaves like `Option<&'a mut T>`.
unsafe impl<T: ?Sized + Sync> Sync for OptionalIndirectMut<'_, T> {}

impl_identity!(OptionalIndirectMut);

impl<'a, T: ?Sized> OptionalIndirectMut<'a, T> {
    /// The empty handle.
    pub const EMPTY: Self = Self {
        ptr: None,
        _marker: PhantomData,
    };

    /// Creates an empty handle.
    #[inline(always)]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Binds to the object behind `r`.
    #[inline(always)]
    pub const fn from_mut(r: &'a mut T) -> Self {
        Self {
            ptr: Some(NonNull::from_mut(r)),
            _marker: PhantomData,
        }
    }

    /// Widens an [`IndirectMut`]. The result is never empty.
    #[inline(always)]
    pub fn from_indirect_mut(ind: IndirectMut<'a, T>) -> Self {
        Self {
            ptr: Some(IndirectMut::as_non_null(&ind)),
            _marker: PhantomData,
        }
    }

    /// Binds to the object at `ptr`, or creates an empty handle if `ptr` is null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be convertible to a mutable reference for the
    /// whole lifetime `'a`, and no other access to the pointee may happen
    /// during that lifetime.
    #[inline(always)]
    pub const unsafe fn from_ptr(ptr: *mut T) -> Self {
        Self {
            ptr: NonNull::new(ptr),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle is bound.
    #[inline(always)]
    pub const fn is_some(&self) -> bool {
        self.ptr.is_some()
    }

    /// Returns `true` if the handle is empty.
    #[inline(always)]
    pub const fn is_none(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns the referent, or `None` if empty.
    #[inline]
    pub const fn get(&self) -> Option<&T> {
        match self.ptr {
            // SAFETY: `&self` prevents unique access while the result lives.
            Some(ptr) => Some(unsafe { ptr.as_ref() }),
            None => None,
        }
    }

    /// Returns the referent mutably, or `None` if empty.
    #[inline]
    pub const fn get_mut(&mut self) -> Option<&mut T> {
        match self.ptr {
            // SAFETY: `&mut self` is the only path to the referent.
            Some(mut ptr) => Some(unsafe { ptr.as_mut() }),
            None => None,
        }
    }

    /// Returns the referent with the full lifetime `'a`, or `None` if empty.
    #[inline]
    pub fn into_mut(self) -> Option<&'a mut T> {
        match self.ptr {
            // SAFETY: `ptr` came from a unique reference valid for `'a`,
            // and `self` is consumed.
            Some(mut ptr) => Some(unsafe { ptr.as_mut() }),
            None => None,
        }
    }

    /// Returns the referent mutably without checking for emptiness.
    ///
    /// # Safety
    ///
    /// The handle must not be empty.
    #[inline(always)]
    pub const unsafe fn get_unchecked_mut(&mut self) -> &mut T {
        // SAFETY: the caller guarantees the handle is bound.
        unsafe { self.ptr.unwrap_unchecked().as_mut() }
    }

    /// Checked access to the referent.
    #[inline]
    pub fn value(&self) -> Result<&T, BadAccess> {
        self.get().ok_or_else(BadAccess::empty::<T>)
    }

    /// Checked mutable access to the referent.
    #[inline]
    pub fn value_mut(&mut self) -> Result<&mut T, BadAccess> {
        self.get_mut().ok_or_else(BadAccess::empty::<T>)
    }

    /// Returns a copy of the referent, or `default` if empty.
    #[inline]
    pub fn value_or(&self, default: T) -> T
    where
        T: Clone,
    {
        self.as_optional().value_or(default)
    }

    /// Checked conversion into an [`IndirectMut`].
    ///
    /// Returns [`BadAccess::Empty`] if the handle is empty.
    #[inline]
    pub fn into_indirect_mut(self) -> Result<IndirectMut<'a, T>, BadAccess> {
        match self.ptr {
            // SAFETY: `ptr` came from a unique reference valid for `'a`.
            Some(ptr) => Ok(unsafe { IndirectMut::from_non_null(ptr) }),
            None => Err(BadAccess::empty::<T>()),
        }
    }

    /// Gives up unique access, keeping the binding.
    #[inline(always)]
    pub fn into_optional(self) -> OptionalIndirect<'a, T> {
        OptionalIndirect {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Borrows as a shared optional handle for the lifetime of `&self`.
    #[inline(always)]
    pub const fn as_optional(&self) -> OptionalIndirect<'_, T> {
        OptionalIndirect {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Reborrows for a shorter lifetime, leaving `self` usable afterwards.
    #[inline]
    pub fn reborrow(&mut self) -> OptionalIndirectMut<'_, T> {
        match self.get_mut() {
            Some(r) => OptionalIndirectMut::from_mut(r),
            None => OptionalIndirectMut::EMPTY,
        }
    }

    /// Returns the held address, or `None` if empty.
    #[inline(always)]
    pub const fn as_non_null(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Binds to the object behind `r`, discarding the previous binding.
    #[inline(always)]
    pub const fn set(&mut self, r: &'a mut T) {
        self.ptr = Some(NonNull::from_mut(r));
    }

    /// Resets to the empty state.
    #[inline(always)]
    pub const fn reset(&mut self) {
        self.ptr = None;
    }

    /// Takes the binding out, leaving the handle empty.
    #[inline(always)]
    pub const fn take(&mut self) -> Self {
        mem::replace(self, Self::EMPTY)
    }

    /// Rebinds to a unique reference derived from the referent. Empty stays empty.
    #[inline]
    pub fn map<U: ?Sized>(
        self,
        f: impl FnOnce(&'a mut T) -> &'a mut U,
    ) -> OptionalIndirectMut<'a, U> {
        match self.into_mut() {
            Some(value) => OptionalIndirectMut::from_mut(f(value)),
            None => OptionalIndirectMut::EMPTY,
        }
    }

    /// Returns `true` if the handle is bound to a `U`.
    #[inline]
    pub fn is<U: Any>(&self) -> bool
    where
        T: AsAny,
    {
        self.as_optional().is::<U>()
    }

    /// Checked conversion to the concrete type of the referent.
    ///
    /// Yields an empty handle when the referent is not a `U`.
    #[inline]
    pub fn downcast<U: Any>(self) -> OptionalIndirectMut<'a, U>
    where
        T: AsAny,
    {
        match self.into_mut() {
            Some(value) => match value.as_any_mut().downcast_mut::<U>() {
                Some(r) => OptionalIndirectMut::from_mut(r),
                None => OptionalIndirectMut::EMPTY,
            },
            None => OptionalIndirectMut::EMPTY,
        }
    }
}

impl<T> OptionalIndirectMut<'_, T> {
    /// Returns the held address, or null if empty.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.as_optional().as_ptr()
    }
}

impl<'a, T: ?Sized> From<&'a mut T> for OptionalIndirectMut<'a, T> {
    #[inline(always)]
    fn from(r: &'a mut T) -> Self {
        Self::from_mut(r)
    }
}

impl<'a, T: ?Sized> From<Option<&'a mut T>> for OptionalIndirectMut<'a, T> {
    #[inline]
    fn from(r: Option<&'a mut T>) -> Self {
        match r {
            Some(r) => Self::from_mut(r),
            None => Self::EMPTY,
        }
    }
}

impl<'a, T: ?Sized> From<IndirectMut<'a, T>> for OptionalIndirectMut<'a, T> {
    #[inline(always)]
    fn from(ind: IndirectMut<'a, T>) -> Self {
        Self::from_indirect_mut(ind)
    }
}

impl<'a, T: ?Sized> From<OptionalIndirectMut<'a, T>> for OptionalIndirect<'a, T> {
    #[inline(always)]
    fn from(value: OptionalIndirectMut<'a, T>) -> Self {
        value.into_optional()
    }
}

impl<'a, T: ?Sized> TryFrom<OptionalIndirectMut<'a, T>> for IndirectMut<'a, T> {
    type Error = BadAccess;

    #[inline]
    fn try_from(value: OptionalIndirectMut<'a, T>) -> Result<Self, Self::Error> {
        value.into_indirect_mut()
    }
}

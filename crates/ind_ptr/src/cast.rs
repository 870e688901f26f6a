use core::any::Any;

// -----------------------------------------------------------------------------
// AsAny

/// Access to the concrete type behind a referent, used by the checked
/// `downcast` methods of every handle in this crate.
///
/// Every sized `T: Any` implements it, as do `dyn Any`, `dyn Any + Send` and
/// `dyn Any + Send + Sync`. A trait object type opts in through a supertrait:
///
/// ```
/// use ind_ptr::{AsAny, Indirect};
///
/// trait Shape: AsAny {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// let sq = Square(2.0);
/// let shape: Indirect<'_, dyn Shape> = Indirect::from_ref(&sq);
///
/// let back = Indirect::downcast::<Square>(shape).unwrap();
/// assert_eq!(back.0, 2.0);
/// assert!(Indirect::downcast::<u8>(shape).is_err());
/// ```
pub trait AsAny: Any {
    /// Upcasts the referent to `&dyn Any`, preserving its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts the referent to `&mut dyn Any`, preserving its concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline(always)]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

macro_rules! impl_as_any_for_dyn {
    ($($ty:ty),+ $(,)?) => {$(
        impl AsAny for $ty {
            #[inline(always)]
            fn as_any(&self) -> &dyn Any {
                self
            }

            #[inline(always)]
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    )+};
}

impl_as_any_for_dyn!(dyn Any, dyn Any + Send, dyn Any + Send + Sync);

#[cfg(test)]
mod tests {
    use super::AsAny;
    use core::any::Any;

    #[test]
    fn dyn_any_keeps_concrete_type() {
        let x = 7u16;
        let erased: &dyn Any = &x;
        assert!(erased.as_any().is::<u16>());

        let erased: &(dyn Any + Send + Sync) = &x;
        assert_eq!(erased.as_any().downcast_ref::<u16>(), Some(&7));
    }

    #[test]
    fn as_any_mut_writes_through() {
        let mut x = 1i64;
        *x.as_any_mut().downcast_mut::<i64>().unwrap() = 5;
        assert_eq!(x, 5);
    }
}

//! Non-owning indirection handles.
//!
//! The handles in this crate are constructed like references and assigned
//! like pointers: binding needs a live object, and assignment rebinds the
//! handle without writing through it. All of them compare by identity (the
//! held address), never by the value of the referent.
//!
//! **Indirect** and **IndirectMut**
//!
//! [`Indirect<'a, T>`] is a non-null, `Copy` handle yielding `&T`.
//! [`IndirectMut<'a, T>`] is its move-only counterpart yielding `&mut T`.
//! Neither has an empty state.
//!
//! **OptionalIndirect** and **OptionalIndirectMut**
//!
//! [`OptionalIndirect<'a, T>`] and [`OptionalIndirectMut<'a, T>`] add an
//! explicit empty state, checked access through `value` and checked
//! conversion back into the non-optional handles.
//!
//! **Helpers**
//!
//! - [`indirect`], [`optional_indirect`] and their `_mut` forms deduce the
//!   handle type from a reference.
//! - `map`, `downcast` and `cast_mut` on every handle cover compile-time
//!   checked, run-time checked and access-changing conversions. Run-time
//!   checks go through [`AsAny`]. On the dereferencing handles these are
//!   associated functions (`Indirect::map(v, f)`), so a referent method of
//!   the same name stays reachable as `v.map(..)`.
//! - [`GetPointer`], [`get_non_null`] and [`get_pointer`] extract the
//!   address behind raw pointers, owning pointers and handles alike.
//!
//! Every handle is the size of a pointer and carries a lifetime, so a handle
//! can never outlive the object it was bound to.
#![expect(unsafe_code, reason = "Handles are raw pointers with a lifetime.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

#[cfg(feature = "alloc")]
extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod cast;
mod error;
mod indirect;
mod make;
mod optional;
mod pointer;

// -----------------------------------------------------------------------------
// Top-level exports

pub use cast::AsAny;
pub use error::{BadAccess, IndirectError, InvalidArgument};
pub use indirect::{Indirect, IndirectMut};
pub use make::{indirect, indirect_mut, optional_indirect, optional_indirect_mut};
pub use optional::{OptionalIndirect, OptionalIndirectMut};
pub use pointer::{GetPointer, get_non_null, get_pointer, same_object};

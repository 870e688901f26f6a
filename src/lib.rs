#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use ind_ptr as ptr;

pub use ind_ptr::{Indirect, IndirectMut, OptionalIndirect, OptionalIndirectMut};

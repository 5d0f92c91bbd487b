//! Functional core of the coherent entity repository.
//!
//! Everything in this crate is pure: schema descriptors, row mapping, the
//! collection codec, cache and store contracts. The I/O lives in the
//! `coherent` crate.

pub mod cache;
pub mod collection;
pub mod convention;
pub mod entity;
pub mod storage;

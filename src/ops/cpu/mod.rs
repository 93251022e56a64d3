//! CPU implementation of operations.
//!
//! This module contains the operation trait implementations for the CPU runtime.

pub mod normalization;

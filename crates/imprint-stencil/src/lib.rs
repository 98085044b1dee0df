// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Imprint Developers

//! # imprint-stencil
//!
//! Parse-to-runtime stencil builder for a SpiderMonkey-style JavaScript
//! engine.
//!
//! ## Overview
//!
//! This crate sits between a parser and the execution engine. It converts
//! the parser's output — atoms, lexical scopes, regular expressions,
//! per-script metadata and bytecode, and object/array literal contents —
//! into a compact, GC-free, index-addressed representation (the
//! *stencil*) that the runtime instantiates into real objects later. The
//! parser never touches the memory manager.
//!
//! - Every cross-reference is a small-integer index into a named,
//!   append-only table; indices equal creation order.
//! - Construction is single-threaded and single-writer; the finished
//!   [`CompilationStencil`] is read-only.
//! - All string data lives in one bump arena owned by the in-flight
//!   compilation and released in a single bulk deallocation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bumpalo::Bump;
//! use imprint_stencil::{compile_global_script, CompileOptions};
//!
//! imprint_stencil::initialize();
//!
//! let alloc = Bump::new();
//! let outcome = run_foreign_parser(&alloc, source);
//! let stencil = compile_global_script(&alloc, outcome, &CompileOptions::default())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atom;
pub mod config;
pub mod convert;
pub mod error;
pub mod foreign;
pub mod init;
pub mod objliteral;
pub mod regexp;
pub mod stencil;

// Re-exports for convenience
pub use atom::{AtomIndex, AtomTable, Encoding};
pub use config::CompileOptions;
pub use convert::{build_stencil, build_stencil_into, compile_global_script};
pub use error::{CompileError, ObjLiteralError, StencilError};
pub use foreign::ParseOutcome;
pub use init::initialize;
pub use stencil::{CompilationState, CompilationStencil};

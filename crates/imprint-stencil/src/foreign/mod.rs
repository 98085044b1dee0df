//! Foreign parser interface.
//!
//! The parser lives in a separate library and hands over one of three
//! outcomes per source buffer: a complete intermediate form, a hard
//! syntax error, or an "unimplemented feature" signal telling the caller
//! to fall back to an alternate frontend.
//!
//! The types here mirror that boundary: plain data with no behavior.
//! Every cross-reference inside the intermediate form is a position into
//! one of the sibling lists — atom numbers into [`ForeignResult::atoms`],
//! slice numbers into [`ForeignResult::slices`], scope numbers into
//! [`ForeignResult::scopes`], and so on. The conversion pipeline
//! translates these into stencil-table indices.

use std::fmt;

use crate::atom::Encoding;

/// Result of invoking the foreign parser on one source buffer.
#[derive(Debug)]
pub enum ParseOutcome<'alloc> {
    /// Parse succeeded; the intermediate form is ready for conversion.
    Success(ForeignResult<'alloc>),
    /// Hard syntax error in the source.
    SyntaxError(ForeignSyntaxError),
    /// The parser does not implement a feature the source needs.
    Unimplemented,
}

/// Syntax-error report from the foreign parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignSyntaxError {
    /// Human-readable message
    pub message: String,
    /// 1-based source line of the error
    pub lineno: u32,
    /// 0-based source column of the error
    pub column: u32,
}

impl fmt::Display for ForeignSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.lineno, self.column)
    }
}

/// The foreign intermediate form of one successful parse.
#[derive(Debug, Default)]
pub struct ForeignResult<'alloc> {
    /// Raw atom bytes, addressed by position from every other record
    pub atoms: Vec<ForeignAtom<'alloc>>,
    /// Raw source slices (regular expression pattern text)
    pub slices: Vec<&'alloc str>,
    /// Scope records in creation order
    pub scopes: Vec<ForeignScopeData>,
    /// Regular expression records
    pub regexps: Vec<ForeignRegExpItem>,
    /// Script records; index 0 is the top-level script
    pub scripts: Vec<ForeignScriptStencil>,
    /// Bytecode blobs referenced by script records
    pub script_data: Vec<ForeignImmutableScriptData>,
}

/// Raw bytes of one atom plus their encoding.
#[derive(Debug, Clone, Copy)]
pub struct ForeignAtom<'alloc> {
    /// The undecoded bytes
    pub bytes: &'alloc [u8],
    /// How the bytes are encoded
    pub encoding: Encoding,
}

/// One binding as the parser recorded it.
#[derive(Debug, Clone, Copy)]
pub struct ForeignBindingName {
    /// Atom number of the binding's name
    pub name: u32,
    /// Captured by an inner closure
    pub is_closed_over: bool,
    /// A top-level function declaration
    pub is_top_level_function: bool,
}

/// One scope record, tagged by kind.
#[derive(Debug, Clone)]
pub enum ForeignScopeData {
    /// The outermost scope of the compilation
    Global(ForeignGlobalScope),
    /// A function-body var scope
    Var(ForeignVarScope),
    /// A block-level lexical scope
    Lexical(ForeignLexicalScope),
    /// A function parameter/body scope
    Function(ForeignFunctionScope),
}

/// Payload of a global scope record.
#[derive(Debug, Clone, Default)]
pub struct ForeignGlobalScope {
    /// Bindings in declaration order
    pub bindings: Vec<ForeignBindingName>,
    /// Position of the first `let` binding
    pub let_start: u32,
    /// Position of the first `const` binding
    pub const_start: u32,
}

/// Payload of a function-body var scope record.
#[derive(Debug, Clone)]
pub struct ForeignVarScope {
    /// Bindings in declaration order
    pub bindings: Vec<ForeignBindingName>,
    /// First frame slot available to this scope
    pub first_frame_slot: u32,
    /// Scope number of the enclosing scope
    pub enclosing: u32,
    /// The surrounding function's scope can grow at runtime
    pub function_has_extensible_scope: bool,
}

/// Payload of a lexical scope record.
#[derive(Debug, Clone)]
pub struct ForeignLexicalScope {
    /// Bindings in declaration order
    pub bindings: Vec<ForeignBindingName>,
    /// Position of the first `const` binding
    pub const_start: u32,
    /// First frame slot available to this scope
    pub first_frame_slot: u32,
    /// Scope number of the enclosing scope
    pub enclosing: u32,
}

/// Payload of a function scope record.
#[derive(Debug, Clone)]
pub struct ForeignFunctionScope {
    /// Bindings in declaration order; `None` is an elided positional
    /// parameter
    pub bindings: Vec<Option<ForeignBindingName>>,
    /// At least one parameter has a default-value expression
    pub has_parameter_exprs: bool,
    /// Position of the first non-positional formal binding
    pub non_positional_formal_start: u32,
    /// Position of the first var binding
    pub var_start: u32,
    /// Script number of the function this scope belongs to
    pub function_index: u32,
    /// The function is an arrow function
    pub is_arrow: bool,
    /// Scope number of the enclosing scope
    pub enclosing: u32,
}

/// One regular expression literal as the parser recorded it.
#[derive(Debug, Clone, Copy)]
pub struct ForeignRegExpItem {
    /// Slice number of the pattern text
    pub pattern: u32,
    /// `g` flag
    pub global: bool,
    /// `i` flag
    pub ignore_case: bool,
    /// `m` flag
    pub multi_line: bool,
    /// `s` flag
    pub dot_all: bool,
    /// `y` flag
    pub sticky: bool,
    /// `u` flag
    pub unicode: bool,
}

/// Source coordinates of one script.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignSourceExtent {
    /// Byte offset where the script's code starts
    pub source_start: u32,
    /// Byte offset just past the script's code
    pub source_end: u32,
    /// Byte offset where `toString` output starts
    pub to_string_start: u32,
    /// Byte offset just past `toString` output
    pub to_string_end: u32,
    /// 1-based starting line
    pub lineno: u32,
    /// 0-based starting column
    pub column: u32,
}

/// One tagged entry of a script's GC-thing list.
#[derive(Debug, Clone, Copy)]
pub enum ForeignGCThing {
    /// Cleared entry
    Null,
    /// Atom number
    Atom(u32),
    /// Script number
    Script(u32),
    /// Scope number
    Scope(u32),
    /// Regular expression number
    RegExp(u32),
}

/// One script record.
#[derive(Debug, Clone, Default)]
pub struct ForeignScriptStencil {
    /// Raw immutable flag bits computed by the parser
    pub immutable_flags: u32,
    /// Atom number of the function name, if the script is a named
    /// function
    pub fun_name: Option<u32>,
    /// Raw function flag bits
    pub fun_flags: u16,
    /// Declared argument count
    pub fun_nargs: u16,
    /// Scope number of a lazily compiled function's enclosing scope
    pub lazy_function_enclosing_scope_index: Option<u32>,
    /// The function literal was emitted into its enclosing script
    pub was_function_emitted: bool,
    /// Position into [`ForeignResult::script_data`]; `None` exactly when
    /// the script is deferred and not yet fully compiled
    pub immutable_script_data: Option<u32>,
    /// Source coordinates
    pub extent: ForeignSourceExtent,
    /// Tagged references used by this script's bytecode, in order
    pub gcthings: Vec<ForeignGCThing>,
}

/// One scope note of a bytecode blob.
#[derive(Debug, Clone, Copy)]
pub struct ForeignScopeNote {
    /// GC-thing number of the scope in effect
    pub index: u32,
    /// Bytecode offset where the note starts
    pub start: u32,
    /// Length of the noted bytecode range
    pub length: u32,
    /// Position of the enclosing note, or `u32::MAX`
    pub parent: u32,
}

/// One bytecode blob and its fixed metadata.
#[derive(Debug, Clone, Default)]
pub struct ForeignImmutableScriptData {
    /// Bytecode offset of the main entry point
    pub main_offset: u32,
    /// Number of fixed frame slots
    pub nfixed: u32,
    /// Total number of frame slots
    pub nslots: u32,
    /// GC-thing number of the body scope
    pub body_scope_index: u32,
    /// Number of inline-cache entries the bytecode needs
    pub num_ic_entries: u32,
    /// Length reported by `Function.prototype.length`
    pub fun_length: u16,
    /// The bytecode itself
    pub bytecode: Vec<u8>,
    /// Scope notes covering the bytecode
    pub scope_notes: Vec<ForeignScopeNote>,
}

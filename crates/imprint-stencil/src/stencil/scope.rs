//! Scope stencils.
//!
//! A scope stencil captures one lexical scope's bindings and slot layout
//! in a form the runtime can instantiate later. Scopes link to their
//! enclosing scope by table position; only the outermost global scope
//! has no enclosing link.

use crate::atom::AtomIndex;

use super::indices::{ScopeIndex, ScriptIndex};

/// Which kind of scope a stencil describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The outermost scope of a compilation
    Global,
    /// A function-body var scope
    FunctionBodyVar,
    /// A block-level lexical scope
    Lexical,
    /// A function parameter/body scope
    Function,
}

/// One binding in a scope's ordered binding array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingName {
    /// Interned name; `None` for an elided positional parameter
    pub atom: Option<AtomIndex>,
    /// The binding is captured by an inner closure
    pub closed_over: bool,
    /// The binding is a top-level function declaration
    pub is_top_level_function: bool,
}

impl BindingName {
    /// A cleared slot standing in for an elided positional parameter.
    pub fn empty() -> Self {
        Self {
            atom: None,
            closed_over: false,
            is_top_level_function: false,
        }
    }
}

/// A global scope's bindings and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalScopeStencil {
    /// Bindings in declaration order
    pub bindings: Vec<BindingName>,
    /// Position of the first `let` binding
    pub let_start: u32,
    /// Position of the first `const` binding
    pub const_start: u32,
}

/// A function-body var scope's bindings and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarScopeStencil {
    /// Bindings in declaration order
    pub bindings: Vec<BindingName>,
    /// First frame slot available to this scope
    pub first_frame_slot: u32,
    /// First frame slot left free after this scope's bindings
    pub next_frame_slot: u32,
    /// Number of environment slots, when an environment object is needed
    pub num_environment_slots: Option<u32>,
    /// The enclosing scope
    pub enclosing: ScopeIndex,
}

/// A lexical scope's bindings and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalScopeStencil {
    /// Bindings in declaration order
    pub bindings: Vec<BindingName>,
    /// Position of the first `const` binding
    pub const_start: u32,
    /// First frame slot available to this scope
    pub first_frame_slot: u32,
    /// First frame slot left free after this scope's bindings
    pub next_frame_slot: u32,
    /// The enclosing scope
    pub enclosing: ScopeIndex,
}

/// A function scope's bindings and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionScopeStencil {
    /// Bindings in declaration order
    pub bindings: Vec<BindingName>,
    /// At least one parameter has a default-value expression
    pub has_parameter_exprs: bool,
    /// Position of the first non-positional formal binding
    pub non_positional_formal_start: u32,
    /// Position of the first var binding
    pub var_start: u32,
    /// First frame slot left free after this scope's bindings
    pub next_frame_slot: u32,
    /// Number of environment slots, when an environment object is needed
    pub num_environment_slots: Option<u32>,
    /// The function this scope belongs to
    pub function_index: ScriptIndex,
    /// The function is an arrow function
    pub is_arrow: bool,
    /// The enclosing scope
    pub enclosing: ScopeIndex,
}

/// One persisted scope, tagged by kind.
///
/// Table position equals creation order; everything downstream addresses
/// scopes by that position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeStencil {
    /// The outermost scope of a compilation
    Global(GlobalScopeStencil),
    /// A function-body var scope
    Var(VarScopeStencil),
    /// A block-level lexical scope
    Lexical(LexicalScopeStencil),
    /// A function parameter/body scope
    Function(FunctionScopeStencil),
}

/// Frame slots are handed to bindings that stay on the frame; captured
/// bindings live in the environment object instead.
fn frame_slot_count(bindings: &[BindingName]) -> u32 {
    bindings.iter().filter(|b| !b.closed_over).count() as u32
}

fn environment_slot_count(bindings: &[BindingName]) -> u32 {
    bindings.iter().filter(|b| b.closed_over).count() as u32
}

impl ScopeStencil {
    /// Build the single outermost global scope.
    pub fn for_global_scope(
        bindings: Vec<BindingName>,
        let_start: u32,
        const_start: u32,
    ) -> ScopeStencil {
        ScopeStencil::Global(GlobalScopeStencil {
            bindings,
            let_start,
            const_start,
        })
    }

    /// Build a function-body var scope. The next free frame slot and the
    /// environment shape are derived from the bindings.
    pub fn for_var_scope(
        bindings: Vec<BindingName>,
        first_frame_slot: u32,
        function_has_extensible_scope: bool,
        enclosing: ScopeIndex,
    ) -> ScopeStencil {
        let next_frame_slot = first_frame_slot + frame_slot_count(&bindings);
        let captured = environment_slot_count(&bindings);
        let needs_environment = captured > 0 || function_has_extensible_scope;
        ScopeStencil::Var(VarScopeStencil {
            bindings,
            first_frame_slot,
            next_frame_slot,
            num_environment_slots: needs_environment.then_some(captured),
            enclosing,
        })
    }

    /// Build a lexical scope. The next free frame slot is derived from
    /// the bindings.
    pub fn for_lexical_scope(
        bindings: Vec<BindingName>,
        const_start: u32,
        first_frame_slot: u32,
        enclosing: ScopeIndex,
    ) -> ScopeStencil {
        let next_frame_slot = first_frame_slot + frame_slot_count(&bindings);
        ScopeStencil::Lexical(LexicalScopeStencil {
            bindings,
            const_start,
            first_frame_slot,
            next_frame_slot,
            enclosing,
        })
    }

    /// Build a function scope. Function scopes always start at frame
    /// slot zero; the environment shape is derived from the bindings and
    /// the parameter-expression flag.
    pub fn for_function_scope(
        bindings: Vec<BindingName>,
        has_parameter_exprs: bool,
        non_positional_formal_start: u32,
        var_start: u32,
        function_index: ScriptIndex,
        is_arrow: bool,
        enclosing: ScopeIndex,
    ) -> ScopeStencil {
        let next_frame_slot = frame_slot_count(&bindings);
        let captured = environment_slot_count(&bindings);
        let needs_environment = captured > 0 || has_parameter_exprs;
        ScopeStencil::Function(FunctionScopeStencil {
            bindings,
            has_parameter_exprs,
            non_positional_formal_start,
            var_start,
            next_frame_slot,
            num_environment_slots: needs_environment.then_some(captured),
            function_index,
            is_arrow,
            enclosing,
        })
    }

    /// The kind tag of this scope.
    pub fn kind(&self) -> ScopeKind {
        match self {
            ScopeStencil::Global(_) => ScopeKind::Global,
            ScopeStencil::Var(_) => ScopeKind::FunctionBodyVar,
            ScopeStencil::Lexical(_) => ScopeKind::Lexical,
            ScopeStencil::Function(_) => ScopeKind::Function,
        }
    }

    /// The ordered binding array.
    pub fn bindings(&self) -> &[BindingName] {
        match self {
            ScopeStencil::Global(s) => &s.bindings,
            ScopeStencil::Var(s) => &s.bindings,
            ScopeStencil::Lexical(s) => &s.bindings,
            ScopeStencil::Function(s) => &s.bindings,
        }
    }

    /// The enclosing scope; `None` only for the outermost global scope.
    pub fn enclosing(&self) -> Option<ScopeIndex> {
        match self {
            ScopeStencil::Global(_) => None,
            ScopeStencil::Var(s) => Some(s.enclosing),
            ScopeStencil::Lexical(s) => Some(s.enclosing),
            ScopeStencil::Function(s) => Some(s.enclosing),
        }
    }

    /// First frame slot left free after this scope's bindings. Global
    /// scope bindings never occupy frame slots.
    pub fn next_frame_slot(&self) -> u32 {
        match self {
            ScopeStencil::Global(_) => 0,
            ScopeStencil::Var(s) => s.next_frame_slot,
            ScopeStencil::Lexical(s) => s.next_frame_slot,
            ScopeStencil::Function(s) => s.next_frame_slot,
        }
    }
}

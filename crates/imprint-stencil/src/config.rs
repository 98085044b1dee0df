//! Compile options consumed by the stencil builder.

/// Ambient configuration for one compilation.
///
/// These are the host-supplied knobs that get merged into every script's
/// immutable flags during conversion; the parser cannot know them.
#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// Compiling self-hosted intrinsics
    pub self_hosting_mode: bool,
    /// Force strict-mode semantics regardless of source directives
    pub force_strict_mode: bool,
    /// The script runs against a non-syntactic scope chain
    pub non_syntactic_scope: bool,
    /// The top-level script is known to execute at most once
    pub is_run_once: bool,
    /// The top-level script's completion value is unused
    pub no_script_rval: bool,
}

impl CompileOptions {
    /// Create options with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable self-hosting mode
    pub fn with_self_hosting_mode(mut self, enabled: bool) -> Self {
        self.self_hosting_mode = enabled;
        self
    }

    /// Enable or disable forced strict mode
    pub fn with_force_strict_mode(mut self, enabled: bool) -> Self {
        self.force_strict_mode = enabled;
        self
    }

    /// Enable or disable the non-syntactic scope chain
    pub fn with_non_syntactic_scope(mut self, enabled: bool) -> Self {
        self.non_syntactic_scope = enabled;
        self
    }

    /// Mark the top-level script as run-once
    pub fn with_is_run_once(mut self, enabled: bool) -> Self {
        self.is_run_once = enabled;
        self
    }

    /// Mark the top-level script's completion value as unused
    pub fn with_no_script_rval(mut self, enabled: bool) -> Self {
        self.no_script_rval = enabled;
        self
    }
}

//! Tests for the conversion pipeline.

use bumpalo::Bump;

use super::*;
use crate::atom::Encoding;
use crate::foreign::{
    ForeignAtom, ForeignBindingName, ForeignFunctionScope, ForeignGCThing, ForeignGlobalScope,
    ForeignImmutableScriptData, ForeignLexicalScope, ForeignRegExpItem, ForeignScopeData,
    ForeignScopeNote, ForeignScriptStencil, ForeignSyntaxError, ForeignVarScope,
};
use crate::stencil::scope::ScopeKind;
use crate::stencil::script::ImmutableScriptFlags;
use crate::stencil::{GCThing, RegExpIndex, ScopeIndex, ScriptIndex};

fn utf8_atoms(texts: &[&'static str]) -> Vec<ForeignAtom<'static>> {
    texts
        .iter()
        .map(|text| ForeignAtom {
            bytes: text.as_bytes(),
            encoding: Encoding::Utf8,
        })
        .collect()
}

fn binding(name: u32) -> ForeignBindingName {
    ForeignBindingName {
        name,
        is_closed_over: false,
        is_top_level_function: false,
    }
}

fn regexp_item(pattern: u32) -> ForeignRegExpItem {
    ForeignRegExpItem {
        pattern,
        global: false,
        ignore_case: false,
        multi_line: false,
        dot_all: false,
        sticky: false,
        unicode: false,
    }
}

fn top_level_script(gcthings: Vec<ForeignGCThing>) -> ForeignScriptStencil {
    ForeignScriptStencil {
        gcthings,
        ..Default::default()
    }
}

fn build<'alloc>(
    alloc: &'alloc Bump,
    result: &ForeignResult<'alloc>,
) -> Result<CompilationStencil<'alloc>, StencilError> {
    crate::init::initialize();
    build_stencil(alloc, result, &CompileOptions::default())
}

#[test]
fn test_empty_result_builds_empty_stencil() {
    let alloc = Bump::new();
    let stencil = build(&alloc, &ForeignResult::default()).unwrap();

    assert!(stencil.atoms().is_empty());
    assert!(stencil.scopes().is_empty());
    assert!(stencil.regexps().is_empty());
    assert!(stencil.scripts().is_empty());
}

#[test]
fn test_scope_table_aligns_with_input_order() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["a", "b", "c", "d"]),
        scopes: vec![
            ForeignScopeData::Global(ForeignGlobalScope {
                bindings: vec![binding(0)],
                let_start: 1,
                const_start: 1,
            }),
            ForeignScopeData::Lexical(ForeignLexicalScope {
                bindings: vec![binding(1)],
                const_start: 0,
                first_frame_slot: 0,
                enclosing: 0,
            }),
            ForeignScopeData::Var(ForeignVarScope {
                bindings: vec![binding(2)],
                first_frame_slot: 1,
                enclosing: 1,
                function_has_extensible_scope: false,
            }),
            ForeignScopeData::Function(ForeignFunctionScope {
                bindings: vec![Some(binding(3))],
                has_parameter_exprs: false,
                non_positional_formal_start: 1,
                var_start: 1,
                function_index: 0,
                is_arrow: false,
                enclosing: 2,
            }),
        ],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let kinds: Vec<ScopeKind> = stencil.scopes().iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ScopeKind::Global,
            ScopeKind::Lexical,
            ScopeKind::FunctionBodyVar,
            ScopeKind::Function,
        ]
    );
    // Each non-global scope points one entry back.
    for (i, scope) in stencil.scopes().iter().enumerate().skip(1) {
        assert_eq!(scope.enclosing(), Some(ScopeIndex::new(i as u32 - 1)));
    }
}

#[test]
fn test_binding_triples_survive_conversion() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["x", "y", "z"]),
        scopes: vec![ForeignScopeData::Global(ForeignGlobalScope {
            bindings: vec![
                ForeignBindingName {
                    name: 0,
                    is_closed_over: true,
                    is_top_level_function: false,
                },
                ForeignBindingName {
                    name: 1,
                    is_closed_over: false,
                    is_top_level_function: true,
                },
                ForeignBindingName {
                    name: 2,
                    is_closed_over: false,
                    is_top_level_function: false,
                },
            ],
            let_start: 3,
            const_start: 3,
        })],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let bindings = stencil.scopes()[0].bindings();
    let triples: Vec<(Option<&str>, bool, bool)> = bindings
        .iter()
        .map(|b| {
            (
                b.atom.and_then(|a| stencil.atoms().get(a)),
                b.closed_over,
                b.is_top_level_function,
            )
        })
        .collect();
    assert_eq!(
        triples,
        vec![
            (Some("x"), true, false),
            (Some("y"), false, true),
            (Some("z"), false, false),
        ]
    );
}

#[test]
fn test_global_and_function_scope_pair() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["a", "b", "c"]),
        scopes: vec![
            ForeignScopeData::Global(ForeignGlobalScope {
                bindings: vec![binding(0), binding(1)],
                let_start: 2,
                const_start: 2,
            }),
            ForeignScopeData::Function(ForeignFunctionScope {
                bindings: vec![Some(binding(2))],
                has_parameter_exprs: false,
                non_positional_formal_start: 1,
                var_start: 1,
                function_index: 1,
                is_arrow: false,
                enclosing: 0,
            }),
        ],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    assert_eq!(stencil.scopes().len(), 2);

    let enclosing = stencil.scopes()[1].enclosing().unwrap();
    let outer = stencil.scope(enclosing).unwrap();
    assert_eq!(outer.kind(), ScopeKind::Global);
    assert_eq!(outer.bindings().len(), 2);
}

#[test]
fn test_elided_parameter_becomes_cleared_binding() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["p"]),
        scopes: vec![ForeignScopeData::Function(ForeignFunctionScope {
            bindings: vec![None, Some(binding(0))],
            has_parameter_exprs: false,
            non_positional_formal_start: 2,
            var_start: 2,
            function_index: 0,
            is_arrow: true,
            enclosing: 0,
        })],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let bindings = stencil.scopes()[0].bindings();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].atom, None);
    assert!(bindings[1].atom.is_some());
}

// ============================================================================
// Regular expressions
// ============================================================================

#[test]
fn test_regexp_flags_translate() {
    let alloc = Bump::new();
    let result = ForeignResult {
        slices: vec!["ab+c"],
        regexps: vec![ForeignRegExpItem {
            pattern: 0,
            global: true,
            ignore_case: false,
            multi_line: true,
            dot_all: false,
            sticky: false,
            unicode: true,
        }],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    assert_eq!(stencil.regexps().len(), 1);
    let regexp = &stencil.regexps()[0];
    assert!(regexp.flags().global());
    assert!(regexp.flags().multiline());
    assert!(regexp.flags().unicode());
    assert!(!regexp.flags().ignore_case());
    assert_eq!(stencil.atoms().get(regexp.atom()), Some("ab+c"));
}

#[test]
fn test_invalid_regexp_aborts_whole_conversion() {
    let alloc = Bump::new();
    let result = ForeignResult {
        slices: vec!["ok", "[z-a]"],
        regexps: vec![regexp_item(0), regexp_item(1)],
        scripts: vec![top_level_script(Vec::new())],
        ..Default::default()
    };

    let err = build(&alloc, &result).unwrap_err();
    assert!(matches!(err, StencilError::RegExpSyntax { .. }));
}

#[test]
fn test_flag_dependent_regexp_validation() {
    let alloc = Bump::new();
    // `\q` is only an error under the unicode flag.
    let sloppy = ForeignResult {
        slices: vec![r"\q"],
        regexps: vec![regexp_item(0)],
        ..Default::default()
    };
    assert!(build(&alloc, &sloppy).is_ok());

    let strict = ForeignResult {
        slices: vec![r"\q"],
        regexps: vec![ForeignRegExpItem {
            unicode: true,
            ..regexp_item(0)
        }],
        ..Default::default()
    };
    assert!(matches!(
        build(&alloc, &strict),
        Err(StencilError::RegExpSyntax { .. })
    ));
}

// ============================================================================
// Scripts, GC things, shared data
// ============================================================================

#[test]
fn test_gcthing_list_converts_in_order() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["a", "b"]),
        slices: vec!["x+"],
        scopes: vec![
            ForeignScopeData::Global(ForeignGlobalScope::default()),
            ForeignScopeData::Lexical(ForeignLexicalScope {
                bindings: Vec::new(),
                const_start: 0,
                first_frame_slot: 0,
                enclosing: 0,
            }),
        ],
        regexps: vec![regexp_item(0)],
        scripts: vec![top_level_script(vec![
            ForeignGCThing::Atom(0),
            ForeignGCThing::Scope(1),
            ForeignGCThing::Null,
            ForeignGCThing::RegExp(0),
        ])],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let things = stencil.gcthings_of(ScriptIndex::TOP_LEVEL);
    assert_eq!(things.len(), 4);

    let GCThing::Atom(atom) = things[0] else {
        panic!("expected atom entry");
    };
    assert_eq!(stencil.atoms().get(atom), Some("a"));

    let GCThing::Scope(scope) = things[1] else {
        panic!("expected scope entry");
    };
    assert_eq!(scope, ScopeIndex::new(1));
    assert_eq!(stencil.scope(scope).unwrap().kind(), ScopeKind::Lexical);

    assert_eq!(things[2], GCThing::Null);

    let GCThing::RegExp(regexp) = things[3] else {
        panic!("expected regexp entry");
    };
    assert_eq!(regexp, RegExpIndex::new(0));
    assert!(stencil.regexp(regexp).is_some());
}

#[test]
fn test_script_without_gcthings_stores_nothing() {
    let alloc = Bump::new();
    let result = ForeignResult {
        scripts: vec![top_level_script(Vec::new())],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    assert!(stencil.gcthings_of(ScriptIndex::TOP_LEVEL).is_empty());
    assert!(stencil.scripts()[0].gcthings.is_empty());
}

#[test]
fn test_config_flags_merge_into_top_level_only() {
    let alloc = Bump::new();
    crate::init::initialize();
    let result = ForeignResult {
        scripts: vec![
            top_level_script(Vec::new()),
            ForeignScriptStencil {
                immutable_flags: ImmutableScriptFlags::IS_FUNCTION.raw(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let options = CompileOptions::new()
        .with_self_hosting_mode(true)
        .with_is_run_once(true)
        .with_no_script_rval(true);

    let stencil = build_stencil(&alloc, &result, &options).unwrap();
    let top = stencil.script_extra(ScriptIndex::TOP_LEVEL).unwrap();
    assert!(top.immutable_flags.has(ImmutableScriptFlags::SELF_HOSTED));
    assert!(top.immutable_flags.has(ImmutableScriptFlags::TREAT_AS_RUN_ONCE));
    assert!(top.immutable_flags.has(ImmutableScriptFlags::NO_SCRIPT_RVAL));

    let inner = stencil.script_extra(ScriptIndex::new(1)).unwrap();
    assert!(inner.immutable_flags.has(ImmutableScriptFlags::SELF_HOSTED));
    assert!(!inner.immutable_flags.has(ImmutableScriptFlags::TREAT_AS_RUN_ONCE));
    assert!(!inner.immutable_flags.has(ImmutableScriptFlags::NO_SCRIPT_RVAL));
}

#[test]
fn test_function_metadata_converts() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["outer"]),
        scopes: vec![ForeignScopeData::Global(ForeignGlobalScope::default())],
        scripts: vec![
            top_level_script(Vec::new()),
            ForeignScriptStencil {
                immutable_flags: ImmutableScriptFlags::IS_FUNCTION.raw(),
                fun_name: Some(0),
                fun_flags: 0x0041,
                fun_nargs: 2,
                lazy_function_enclosing_scope_index: Some(0),
                was_function_emitted: true,
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let script = stencil.script(ScriptIndex::new(1)).unwrap();
    assert_eq!(
        script.function_atom.and_then(|a| stencil.atoms().get(a)),
        Some("outer")
    );
    assert_eq!(script.function_flags.raw(), 0x0041);
    assert_eq!(script.lazy_function_enclosing_scope, Some(ScopeIndex::new(0)));
    assert!(script.was_function_emitted);
    assert_eq!(stencil.script_extra(ScriptIndex::new(1)).unwrap().nargs, 2);
}

#[test]
fn test_function_fields_ignored_for_non_functions() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["stray"]),
        scripts: vec![ForeignScriptStencil {
            fun_name: Some(0),
            fun_nargs: 3,
            ..Default::default()
        }],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let script = stencil.script(ScriptIndex::TOP_LEVEL).unwrap();
    assert_eq!(script.function_atom, None);
    assert_eq!(stencil.script_extra(ScriptIndex::TOP_LEVEL).unwrap().nargs, 0);
}

#[test]
fn test_extent_copies_field_by_field() {
    let alloc = Bump::new();
    let result = ForeignResult {
        scripts: vec![ForeignScriptStencil {
            extent: crate::foreign::ForeignSourceExtent {
                source_start: 10,
                source_end: 90,
                to_string_start: 5,
                to_string_end: 95,
                lineno: 3,
                column: 7,
            },
            ..Default::default()
        }],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let extent = stencil.script_extra(ScriptIndex::TOP_LEVEL).unwrap().extent;
    assert_eq!(extent.source_start, 10);
    assert_eq!(extent.source_end, 90);
    assert_eq!(extent.to_string_start, 5);
    assert_eq!(extent.to_string_end, 95);
    assert_eq!(extent.lineno, 3);
    assert_eq!(extent.column, 7);
}

#[test]
fn test_bytecode_blob_registration() {
    let alloc = Bump::new();
    let result = ForeignResult {
        scripts: vec![
            ForeignScriptStencil {
                immutable_script_data: Some(0),
                ..Default::default()
            },
            ForeignScriptStencil {
                immutable_flags: ImmutableScriptFlags::IS_FUNCTION.raw(),
                ..Default::default()
            },
        ],
        script_data: vec![ForeignImmutableScriptData {
            main_offset: 2,
            nfixed: 1,
            nslots: 4,
            body_scope_index: 0,
            num_ic_entries: 3,
            fun_length: 0,
            bytecode: vec![0xDE, 0xAD],
            scope_notes: vec![ForeignScopeNote {
                index: 0,
                start: 0,
                length: 2,
                parent: u32::MAX,
            }],
        }],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();

    // The compiled top level has shared data; the deferred function
    // does not.
    assert!(stencil.scripts()[0].has_shared_data);
    assert!(!stencil.scripts()[1].has_shared_data);

    let data = stencil.shared_data().get(ScriptIndex::TOP_LEVEL).unwrap();
    assert_eq!(data.bytecode, vec![0xDE, 0xAD]);
    assert_eq!(data.nslots, 4);
    assert_eq!(data.scope_notes.len(), 1);
    assert_eq!(data.scope_notes[0].length, 2);
    assert!(stencil.shared_data().get(ScriptIndex::new(1)).is_none());
}

#[test]
fn test_scripts_sharing_a_blob_share_one_allocation() {
    let alloc = Bump::new();
    let result = ForeignResult {
        scripts: vec![
            top_level_script(Vec::new()),
            ForeignScriptStencil {
                immutable_flags: ImmutableScriptFlags::IS_FUNCTION.raw(),
                immutable_script_data: Some(0),
                ..Default::default()
            },
            ForeignScriptStencil {
                immutable_flags: ImmutableScriptFlags::IS_FUNCTION.raw(),
                immutable_script_data: Some(0),
                ..Default::default()
            },
        ],
        script_data: vec![ForeignImmutableScriptData {
            bytecode: vec![0x01],
            ..Default::default()
        }],
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    let first = stencil.shared_data().get(ScriptIndex::new(1)).unwrap();
    let second = stencil.shared_data().get(ScriptIndex::new(2)).unwrap();
    assert!(std::sync::Arc::ptr_eq(first, second));
}

#[test]
fn test_foreign_atom_dedup() {
    let alloc = Bump::new();
    let result = ForeignResult {
        atoms: utf8_atoms(&["same", "same"]),
        ..Default::default()
    };

    let stencil = build(&alloc, &result).unwrap();
    assert_eq!(stencil.atoms().len(), 1);
}

// ============================================================================
// Driver outcomes
// ============================================================================

#[test]
fn test_compile_global_script_success() {
    let alloc = Bump::new();
    crate::init::initialize();
    let outcome = ParseOutcome::Success(ForeignResult {
        scripts: vec![top_level_script(Vec::new())],
        ..Default::default()
    });

    let stencil = compile_global_script(&alloc, outcome, &CompileOptions::default()).unwrap();
    assert_eq!(stencil.scripts().len(), 1);
}

#[test]
fn test_compile_global_script_syntax_error() {
    let alloc = Bump::new();
    let outcome = ParseOutcome::SyntaxError(ForeignSyntaxError {
        message: "unexpected token".to_string(),
        lineno: 2,
        column: 14,
    });

    let err = compile_global_script(&alloc, outcome, &CompileOptions::default()).unwrap_err();
    let CompileError::Syntax(error) = err else {
        panic!("expected syntax error");
    };
    assert_eq!(error.lineno, 2);
    assert_eq!(error.to_string(), "unexpected token (line 2, column 14)");
}

#[test]
fn test_compile_global_script_unimplemented() {
    let alloc = Bump::new();
    let err =
        compile_global_script(&alloc, ParseOutcome::Unimplemented, &CompileOptions::default())
            .unwrap_err();
    assert!(matches!(err, CompileError::Unimplemented));
}

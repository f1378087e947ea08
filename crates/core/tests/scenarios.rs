//! End-to-end pipeline checks on small inputs with fully specified
//! expected output tuples.

use toks_core::{
    analyze, output, ChunkFlags, IdKind, IdSubKind, KeywordTable, VecSink, LANG_C,
};
use toks_core::IdKind::*;
use toks_core::IdSubKind::*;

type Tuple = (IdKind, IdSubKind, String, String);

fn run(src: &str) -> Vec<Tuple> {
    let state = analyze(src.as_bytes(), LANG_C, &KeywordTable::new()).unwrap();
    let mut sink = VecSink::default();
    output(&state, &mut sink).unwrap();
    sink.entries
        .into_iter()
        .map(|(_, _, scope, kind, sub, ident)| (kind, sub, ident, scope))
        .collect()
}

fn tuple(kind: IdKind, sub: IdSubKind, ident: &str, scope: &str) -> Tuple {
    (kind, sub, ident.to_string(), scope.to_string())
}

#[test]
fn enum_definition_with_values() {
    let got = run("enum enua { ENUA_A, ENUA_B };");
    assert_eq!(
        got,
        vec![
            tuple(Enum, Definition, "enua", "<global>"),
            tuple(EnumVal, Definition, "ENUA_A", "<global>:enua"),
            tuple(EnumVal, Definition, "ENUA_B", "<global>:enua"),
        ]
    );
}

#[test]
fn enum_forward_declaration() {
    let got = run("enum enua;");
    assert_eq!(got, vec![tuple(Enum, Declaration, "enua", "<global>")]);
}

#[test]
fn typedef_enum_with_tag() {
    let got = run("typedef enum enub { ENUB_A } enub;");
    assert_eq!(
        got,
        vec![
            tuple(Enum, Definition, "enub", "<global>"),
            tuple(EnumVal, Definition, "ENUB_A", "<global>:enub"),
            tuple(EnumType, Definition, "enub", "<global>"),
        ]
    );
}

#[test]
fn function_definition_params_and_body() {
    let got = run("int functiona(int a, int b) { return a + b; }");
    assert_eq!(
        got,
        vec![
            tuple(Function, Definition, "functiona", "<global>"),
            tuple(Var, Definition, "a", "<global>:functiona()"),
            tuple(Var, Definition, "b", "<global>:functiona()"),
            tuple(Var, Reference, "a", "<global>:functiona{}"),
            tuple(Var, Reference, "b", "<global>:functiona{}"),
        ]
    );
}

#[test]
fn struct_with_self_reference() {
    let got = run("struct struc { int a; struct struc *b; } ;");
    assert_eq!(
        got,
        vec![
            tuple(Struct, Definition, "struc", "<global>"),
            tuple(Var, Definition, "a", "<global>:struc"),
            tuple(Struct, Reference, "struc", "<global>:struc"),
            tuple(Var, Definition, "b", "<global>:struc"),
        ]
    );
}

#[test]
fn preproc_branching_params() {
    let src = "int f(\n    int a,\n#if defined(DEFINE)\n    int b,\n#endif\n    int c) { return a+c; }\n";
    let state = analyze(src.as_bytes(), LANG_C, &KeywordTable::new()).unwrap();
    let mut sink = VecSink::default();
    output(&state, &mut sink).unwrap();

    // every branch is analysed: all three parameters are definitions
    for name in ["a", "b", "c"] {
        assert!(
            sink.entries
                .iter()
                .any(|(_, _, _, k, s, id)| *k == Var && *s == Definition && id == name),
            "missing VAR DEFINITION for {name}"
        );
    }

    // b sits inside the #if region, the others do not
    let flag_of = |name: &str| {
        state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.text == name && c.flags.contains(ChunkFlags::VAR_DEF))
            .map(|c| c.flags.contains(ChunkFlags::IN_PREPROC))
            .unwrap()
    };
    assert!(flag_of("b"));
    assert!(!flag_of("a"));
    assert!(!flag_of("c"));

    // the definition itself is still found
    assert!(sink
        .entries
        .iter()
        .any(|(_, _, _, k, s, id)| *k == Function && *s == Definition && id == "f"));
}

#[test]
fn typedef_without_tag() {
    let got = run("typedef enum { ENUB_A, ENUB_B } enub;");
    assert_eq!(
        got,
        vec![
            tuple(EnumVal, Definition, "ENUB_A", "<global>"),
            tuple(EnumVal, Definition, "ENUB_B", "<global>"),
            tuple(EnumType, Definition, "enub", "<global>"),
        ]
    );
}

#[test]
fn typedef_alias_is_a_reference_to_the_tag() {
    let got = run("enum enua { ENUA_A };\ntypedef enum enua enua;\n");
    // the typedef line sees the tag as a reference and defines the alias
    assert!(got.contains(&tuple(Enum, Reference, "enua", "<global>")));
    assert!(got.contains(&tuple(EnumType, Definition, "enua", "<global>")));
}

#[test]
fn prototypes_and_extern_declarations() {
    let got = run("int functiona(int a, int b);\nextern int functionb(int a, int b);\n");
    assert!(got.contains(&tuple(Function, Declaration, "functiona", "<global>")));
    assert!(got.contains(&tuple(Function, Declaration, "functionb", "<global>")));
    // prototype parameters live in the () scope
    assert!(got.contains(&tuple(Var, Definition, "a", "<global>:functiona()")));
    assert!(got.contains(&tuple(Var, Definition, "b", "<global>:functionb()")));
}

#[test]
fn function_calls_are_references() {
    let got = run("int g(int a) { return functiona(a, 1); }");
    assert!(got.contains(&tuple(Function, Reference, "functiona", "<global>:g{}")));
}

#[test]
fn local_declarations_reference_their_types() {
    let got = run(
        "enum enua { ENUA_A };\nvoid fn(void)\n{\n    enum enua a1;\n    enua a2;\n}\n",
    );
    assert!(got.contains(&tuple(Enum, Reference, "enua", "<global>:fn{}")));
    assert!(got.contains(&tuple(Var, Definition, "a1", "<global>:fn{}")));
    // an unknown type name is emitted as a plain type reference
    assert!(got.contains(&tuple(Type, Reference, "enua", "<global>:fn{}")));
    assert!(got.contains(&tuple(Var, Definition, "a2", "<global>:fn{}")));
}

#[test]
fn inline_enum_declares_variables() {
    let got = run("void fn(void) { enum enuh {ENUH_A, ENUH_B} h1, *h2; }");
    assert!(got.contains(&tuple(Enum, Definition, "enuh", "<global>:fn{}")));
    assert!(got.contains(&tuple(EnumVal, Definition, "ENUH_A", "<global>:fn{}:enuh")));
    assert!(got.contains(&tuple(Var, Definition, "h1", "<global>:fn{}")));
    assert!(got.contains(&tuple(Var, Definition, "h2", "<global>:fn{}")));
}

#[test]
fn static_function_scope_is_local() {
    let got = run("static int functionc(int a, int b)\n{\n    return a + b;\n}\n");
    assert!(got.contains(&tuple(Function, Definition, "functionc", "<local>")));
}

#[test]
fn macros_and_macro_functions() {
    let got = run("#define LIMIT 10\n#define TWICE(x) ((x)+(x))\n");
    assert!(got.contains(&tuple(Macro, Definition, "LIMIT", "<preproc>")));
    assert!(got.contains(&tuple(MacroFunction, Definition, "TWICE", "<preproc>")));
}

#[test]
fn union_definition() {
    let got = run("union unio { int a; char b; };");
    assert!(got.contains(&tuple(Union, Definition, "unio", "<global>")));
    assert!(got.contains(&tuple(Var, Definition, "a", "<global>:unio")));
    assert!(got.contains(&tuple(Var, Definition, "b", "<global>:unio")));
}

#[test]
fn enum_values_across_preproc_branches() {
    let src = "typedef enum enud {\n    ENUD_A,\n#if defined(DEFINE)\n    ENUD_B1,\n#else\n    ENUD_B2,\n#endif\n    ENUD_C,\n} enud;\n";
    let got = run(src);
    for name in ["ENUD_A", "ENUD_B1", "ENUD_B2", "ENUD_C"] {
        assert!(
            got.iter()
                .any(|(k, s, id, _)| *k == EnumVal && *s == Definition && id == name),
            "missing ENUM_VAL for {name}"
        );
    }
    assert!(got.contains(&tuple(Enum, Definition, "enud", "<global>")));
    assert!(got.contains(&tuple(EnumType, Definition, "enud", "<global>")));
}

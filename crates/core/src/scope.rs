//! Scope assignment: every chunk gets a `:`-joined chain of the named
//! definers whose bodies enclose it, rooted at `<global>`, `<local>`,
//! or `<preproc>`.

use crate::chunk::{ChunkId, Nav};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

pub fn assign_scope(state: &mut FileState) {
    // after a full run every chunk carries at least its root
    if let Some(head) = state.chunks.head() {
        if !state.chunks.get(head).scope.is_empty() {
            return;
        }
    }

    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        let c = state.chunks.get(id);
        let kind = c.kind;
        let flags = c.flags;
        let level = c.level;

        // namespace bodies
        if kind == TokenKind::Word
            && c.parent_kind == TokenKind::Namespace
            && flags.contains(ChunkFlags::DEF)
        {
            let label = c.text.clone();
            if let Some(open) =
                state.chunks.next_kind(id, TokenKind::BraceOpen, Some(level), Nav::Preproc)
            {
                mark_scope(state, open, &label);
            }
            continue;
        }

        // function parameter regions and bodies
        let is_proto = kind == TokenKind::FuncProto
            || (kind == TokenKind::FuncClass && flags.contains(ChunkFlags::PROTO));
        let is_def = kind == TokenKind::FuncDef
            || (kind == TokenKind::FuncClass && flags.contains(ChunkFlags::DEF));
        if is_proto || is_def {
            let base = definer_label(state, id);
            let Some(fparen) = state.chunks.next_ncnl(id, Nav::Preproc) else {
                continue;
            };
            if state.chunks.get(fparen).kind != TokenKind::FparenOpen {
                continue;
            }
            let close = mark_scope(state, fparen, &format!("{base}()"));
            if is_def {
                let mut after = state.chunks.next_ncnl(close, Nav::Preproc);
                while let Some(a) = after {
                    if state.chunks.get(a).kind == TokenKind::Qualifier {
                        after = state.chunks.next_ncnl(a, Nav::Preproc);
                    } else {
                        break;
                    }
                }
                if let Some(open) = after {
                    if state.chunks.get(open).kind == TokenKind::BraceOpen {
                        mark_scope(state, open, &format!("{base}{{}}"));
                    }
                }
            }
            continue;
        }

        // struct/union/enum/class bodies
        if kind == TokenKind::Type
            && matches!(
                c.parent_kind,
                TokenKind::Class | TokenKind::Struct | TokenKind::Union | TokenKind::Enum
            )
            && flags.contains(ChunkFlags::DEF)
        {
            let label = c.text.clone();
            if let Some(open) =
                state.chunks.next_kind(id, TokenKind::BraceOpen, Some(level), Nav::Preproc)
            {
                mark_scope(state, open, &label);
            }
        }
    }

    // every chunk gets its root
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        let c = state.chunks.get_mut(id);
        let root = if c.flags.contains(ChunkFlags::STATIC) {
            "<local>"
        } else if c.flags.contains(ChunkFlags::IN_PREPROC) {
            "<preproc>"
        } else {
            "<global>"
        };
        if c.scope.is_empty() {
            c.scope = root.to_string();
        } else {
            c.scope = format!("{root}:{}", c.scope);
        }
    }
}

/// Definer text with its qualifier prefix and destructor marker:
/// `C::~C` labels as `C:~C`.
fn definer_label(state: &FileState, id: ChunkId) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut cur = id;

    let mut prev = state.chunks.prev_ncnl(cur, Nav::Preproc);
    let mut tilde = false;
    if let Some(p) = prev {
        if state.chunks.get(p).kind == TokenKind::Inv {
            tilde = true;
            cur = p;
            prev = state.chunks.prev_ncnl(cur, Nav::Preproc);
        }
    }
    while let Some(p) = prev {
        if state.chunks.get(p).kind != TokenKind::DcMember {
            break;
        }
        let Some(q) = state.chunks.prev_ncnl(p, Nav::Preproc) else {
            break;
        };
        let qc = state.chunks.get(q);
        if !matches!(qc.kind, TokenKind::Type | TokenKind::Word) {
            break;
        }
        parts.push(qc.text.clone());
        cur = q;
        prev = state.chunks.prev_ncnl(cur, Nav::Preproc);
    }
    parts.reverse();

    let name = &state.chunks.get(id).text;
    let mut label = String::new();
    for p in &parts {
        label.push_str(p);
        label.push(':');
    }
    if tilde {
        label.push('~');
    }
    label.push_str(name);
    label
}

/// Append `label` to the scope of every chunk from `open` through its
/// matching closer. Returns the closer (or the last chunk reached).
fn mark_scope(state: &mut FileState, open: ChunkId, label: &str) -> ChunkId {
    let close_kind = state.chunks.get(open).kind.matching_close();
    let level = state.chunks.get(open).level;

    let mut pc = open;
    loop {
        let c = state.chunks.get_mut(pc);
        if !c.scope.is_empty() {
            c.scope.push(':');
        }
        c.scope.push_str(label);

        let c = state.chunks.get(pc);
        if pc != open && Some(c.kind) == close_kind && c.level == level {
            return pc;
        }
        match state.chunks.next(pc, Nav::Preproc) {
            Some(n) => pc = n,
            None => return pc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTable;
    use crate::lang::{LangFlags, LANG_C, LANG_CPP};
    use crate::pipeline;

    fn run(src: &str, lang: LangFlags) -> FileState {
        pipeline::analyze(src.as_bytes(), lang, &KeywordTable::new()).unwrap()
    }

    fn scope_of(state: &FileState, text: &str) -> String {
        state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.text == text)
            .map(|c| c.scope.clone())
            .unwrap()
    }

    #[test]
    fn test_function_scopes() {
        let state = run("int f(int a) { return a; }", LANG_C);
        assert_eq!(scope_of(&state, "f"), "<global>");
        // the parameter is inside the paren region
        let scopes: Vec<String> = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .filter(|c| c.text == "a")
            .map(|c| c.scope.clone())
            .collect();
        assert_eq!(scopes, vec!["<global>:f()", "<global>:f{}"]);
    }

    #[test]
    fn test_enum_scope() {
        let state = run("enum e { A, B };", LANG_C);
        assert_eq!(scope_of(&state, "e"), "<global>");
        assert_eq!(scope_of(&state, "A"), "<global>:e");
        assert_eq!(scope_of(&state, "B"), "<global>:e");
    }

    #[test]
    fn test_nested_scopes() {
        let state = run("namespace n { class C { void m(int x) { x; } }; }", LANG_CPP);
        assert_eq!(scope_of(&state, "C"), "<global>:n");
        assert_eq!(scope_of(&state, "m"), "<global>:n:C");
        // x appears once in the params and once in the body
        let scopes: Vec<String> = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .filter(|c| c.text == "x")
            .map(|c| c.scope.clone())
            .collect();
        assert_eq!(scopes, vec!["<global>:n:C:m()", "<global>:n:C:m{}"]);
    }

    #[test]
    fn test_qualified_method_scope() {
        let state = run("void C::m(int x) { x; }", LANG_CPP);
        let scopes: Vec<String> = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .filter(|c| c.text == "x")
            .map(|c| c.scope.clone())
            .collect();
        assert_eq!(scopes, vec!["<global>:C:m()", "<global>:C:m{}"]);
    }

    #[test]
    fn test_macro_scope_is_preproc() {
        let state = run("#define MAX 10\n", LANG_C);
        assert_eq!(scope_of(&state, "MAX"), "<preproc>");
    }

    #[test]
    fn test_static_scope_is_local() {
        let state = run("static int counter;", LANG_C);
        assert_eq!(scope_of(&state, "counter"), "<local>");
    }
}

//! Token-sequence cleanup: small rewrites that only need the raw
//! neighbour sequence, run before any level information exists.

use crate::chunk::{ChunkId, Nav};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

pub fn tokenize_cleanup(state: &mut FileState) {
    mark_preproc_parents(state);
    fuse_tsquare(state);
    mark_template_angles(state);
}

/// Record the directive kind on each `#` chunk and mark the macro name
/// after `#define`.
fn mark_preproc_parents(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        if state.chunks.get(id).kind != TokenKind::Preproc {
            continue;
        }
        let Some(next) = state.chunks.next_ncnl(id, Nav::All) else {
            continue;
        };
        let directive = state.chunks.get(next).kind;
        state.chunks.get_mut(id).parent_kind = if directive.is_pp_directive() {
            directive
        } else {
            TokenKind::PpOther
        };

        if directive == TokenKind::PpDefine {
            mark_macro_name(state, next);
        }
    }
}

/// The word after `#define` becomes `MACRO`, or `MACRO_FUNC` when a
/// `(` follows with no whitespace in between.
fn mark_macro_name(state: &mut FileState, define_id: ChunkId) {
    let Some(name_id) = state.chunks.next_ncnl(define_id, Nav::All) else {
        return;
    };
    let name = state.chunks.get(name_id);
    if name.kind != TokenKind::Word || !name.is_preproc() {
        return;
    }
    let name_end = name.orig_col_end;
    let name_line = name.orig_line;

    let func_like = state
        .chunks
        .next(name_id, Nav::All)
        .map(|n| {
            let c = state.chunks.get(n);
            c.kind == TokenKind::ParenOpen
                && c.orig_line == name_line
                && c.orig_col == name_end
        })
        .unwrap_or(false);

    let name = state.chunks.get_mut(name_id);
    name.kind = if func_like {
        TokenKind::MacroFunc
    } else {
        TokenKind::Macro
    };
    name.flags |= ChunkFlags::DEF;
}

/// Fuse an adjacent `[` `]` pair into one `[]` chunk.
fn fuse_tsquare(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        if state.chunks.get(id).kind != TokenKind::SquareOpen {
            continue;
        }
        let Some(next) = state.chunks.next(id, Nav::All) else {
            continue;
        };
        let n = state.chunks.get(next);
        if n.kind != TokenKind::SquareClose
            || n.orig_line != state.chunks.get(id).orig_line
            || n.orig_col != state.chunks.get(id).orig_col_end
        {
            continue;
        }
        let end = n.orig_col_end;
        state.chunks.unlink(next);
        let open = state.chunks.get_mut(id);
        open.kind = TokenKind::Tsquare;
        open.text = "[]".to_string();
        open.orig_col_end = end;
    }
}

/// Retype the `<` ... `>` after a `template` keyword into angle
/// brackets. Nested `>>` is kept as a shift by default, matching the
/// original's conservative policy.
fn mark_template_angles(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        if state.chunks.get(id).kind != TokenKind::Template {
            continue;
        }
        let Some(open) = state.chunks.next_ncnl(id, Nav::Preproc) else {
            continue;
        };
        let oc = state.chunks.get(open);
        if oc.kind != TokenKind::Compare || oc.text != "<" {
            continue;
        }
        // find the matching `>` at depth 0 of this parameter list
        let mut depth = 0u32;
        let mut cur = open;
        let mut close = None;
        while let Some(n) = state.chunks.next_ncnl(cur, Nav::Preproc) {
            let c = state.chunks.get(n);
            match c.kind {
                TokenKind::Compare if c.text == "<" => depth += 1,
                TokenKind::Compare if c.text == ">" => {
                    if depth == 0 {
                        close = Some(n);
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon | TokenKind::BraceOpen | TokenKind::BraceClose => break,
                _ => {}
            }
            cur = n;
        }
        if let Some(close) = close {
            state.chunks.get_mut(open).kind = TokenKind::AngleOpen;
            state.chunks.get_mut(close).kind = TokenKind::AngleClose;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTable;
    use crate::lang::{LangFlags, LANG_C, LANG_CPP, LANG_D};
    use crate::tokenize::tokenize;

    fn run(src: &str, lang: LangFlags) -> FileState {
        let mut state = FileState::new(lang);
        tokenize(&mut state, src.as_bytes(), &KeywordTable::new());
        tokenize_cleanup(&mut state);
        state
    }

    fn find<'a>(state: &'a FileState, text: &str) -> &'a crate::chunk::Chunk {
        state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.text == text)
            .unwrap()
    }

    #[test]
    fn test_preproc_parent_kinds() {
        let state = run("#include <a.h>\n#if X\n#endif\n#pragma once\n", LANG_C);
        let parents: Vec<_> = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .filter(|c| c.kind == TokenKind::Preproc)
            .map(|c| c.parent_kind)
            .collect();
        assert_eq!(
            parents,
            vec![TokenKind::PpInclude, TokenKind::PpIf, TokenKind::PpEndif, TokenKind::PpOther]
        );
    }

    #[test]
    fn test_object_macro() {
        let state = run("#define MAX 10\n", LANG_C);
        let max = find(&state, "MAX");
        assert_eq!(max.kind, TokenKind::Macro);
        assert!(max.flags.contains(ChunkFlags::DEF));
    }

    #[test]
    fn test_function_macro_requires_adjacent_paren() {
        let state = run("#define SQ(x) ((x)*(x))\n#define NOT (1)\n", LANG_C);
        assert_eq!(find(&state, "SQ").kind, TokenKind::MacroFunc);
        // space before the paren makes it an object-like macro
        assert_eq!(find(&state, "NOT").kind, TokenKind::Macro);
    }

    #[test]
    fn test_tsquare_fusion() {
        let state = run("int[] a; b[1];", LANG_D);
        let kinds: Vec<_> = state.chunks.ids().map(|id| state.chunks.get(id).kind).collect();
        assert!(kinds.contains(&TokenKind::Tsquare));
        // the subscripted pair is untouched
        assert!(kinds.contains(&TokenKind::SquareOpen));
        assert!(kinds.contains(&TokenKind::SquareClose));
    }

    #[test]
    fn test_template_angles() {
        let state = run("template <typename T> class X {};", LANG_CPP);
        let open = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.kind == TokenKind::AngleOpen)
            .expect("angle open");
        assert_eq!(open.text, "<");
        assert!(state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .any(|c| c.kind == TokenKind::AngleClose));
    }

    #[test]
    fn test_plain_less_than_stays_compare() {
        let state = run("if (a < b) c();", LANG_CPP);
        assert!(state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .all(|c| c.kind != TokenKind::AngleOpen));
    }
}

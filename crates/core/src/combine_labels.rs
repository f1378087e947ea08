//! Colon disambiguation: every `:` chunk is resolved against its
//! `[prev, colon, next]` window into case, access, class-base,
//! ternary, bit-field, or label colons.

use crate::chunk::{ChunkId, Nav};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

pub fn combine_labels(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        if state.chunks.get(id).kind != TokenKind::Colon {
            continue;
        }
        let Some(prev) = state.chunks.prev_ncnl(id, Nav::Preproc) else {
            continue;
        };
        let next = state.chunks.next_ncnl(id, Nav::Preproc);

        let new_kind = classify_colon(state, id, prev, next);
        if let Some(kind) = new_kind {
            state.chunks.get_mut(id).kind = kind;
            if kind == TokenKind::LabelColon {
                state.chunks.get_mut(prev).kind = TokenKind::Label;
            }
        }
    }
}

fn classify_colon(
    state: &FileState,
    colon: ChunkId,
    prev: ChunkId,
    next: Option<ChunkId>,
) -> Option<TokenKind> {
    let cc = state.chunks.get(colon);
    let pc = state.chunks.get(prev);

    // `default:` and `case X:`
    if pc.kind == TokenKind::Default {
        return Some(TokenKind::CaseColon);
    }
    if statement_head(state, colon).map(|h| state.chunks.get(h).kind) == Some(TokenKind::Case) {
        return Some(TokenKind::CaseColon);
    }

    // `public:` and friends
    if pc.kind == TokenKind::Private {
        return Some(TokenKind::PrivateColon);
    }

    // `class X : base` (before the body opens)
    if let Some(head) = statement_head(state, colon) {
        let hk = state.chunks.get(head).kind;
        if matches!(hk, TokenKind::Class | TokenKind::Struct)
            && state.chunks.get(head).level == cc.level
        {
            return Some(TokenKind::ClassColon);
        }
    }

    // ternary: an unanswered `?` earlier in the expression
    if open_question_before(state, colon) {
        return Some(TokenKind::CondColon);
    }

    // bit-field: `unsigned x : 3;` inside a struct
    if cc.flags.contains(ChunkFlags::IN_STRUCT)
        && matches!(pc.kind, TokenKind::Word | TokenKind::Type)
        && next.map(|n| state.chunks.get(n).kind) == Some(TokenKind::Number)
    {
        return Some(TokenKind::BitColon);
    }

    // label: a lone word starting its statement
    if pc.kind == TokenKind::Word && pc.flags.contains(ChunkFlags::STMT_START) {
        return Some(TokenKind::LabelColon);
    }

    None
}

/// First chunk of the statement the colon sits in.
fn statement_head(state: &FileState, from: ChunkId) -> Option<ChunkId> {
    let mut cur = from;
    loop {
        if state.chunks.get(cur).flags.contains(ChunkFlags::STMT_START) {
            return Some(cur);
        }
        cur = state.chunks.prev_ncnl(cur, Nav::Preproc)?;
    }
}

/// True when a `?` at the colon's level appears after the statement
/// start with no colon in between answering it.
fn open_question_before(state: &FileState, colon: ChunkId) -> bool {
    let level = state.chunks.get(colon).level;
    let mut open = 0i32;
    let mut cur = colon;
    while let Some(p) = state.chunks.prev_ncnl(cur, Nav::Preproc) {
        let c = state.chunks.get(p);
        if c.is_semicolon() || matches!(c.kind, TokenKind::BraceOpen | TokenKind::BraceClose) {
            break;
        }
        if c.level == level {
            match c.kind {
                TokenKind::Question => open += 1,
                TokenKind::CondColon | TokenKind::Colon => open -= 1,
                _ => {}
            }
        }
        if c.flags.contains(ChunkFlags::STMT_START) {
            break;
        }
        cur = p;
    }
    open > 0
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

    fn colon_kinds(state: &FileState) -> Vec<TokenKind> {
        state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id).kind)
            .filter(|k| {
                matches!(
                    k,
                    TokenKind::Colon
                        | TokenKind::CaseColon
                        | TokenKind::LabelColon
                        | TokenKind::PrivateColon
                        | TokenKind::ClassColon
                        | TokenKind::CondColon
                        | TokenKind::BitColon
                )
            })
            .collect()
    }

    #[test]
    fn test_case_and_default_colons() {
        let state = run(
            "void f(int x) { switch (x) { case 1: break; default: break; } }",
            LANG_C,
        );
        assert_eq!(
            colon_kinds(&state),
            vec![TokenKind::CaseColon, TokenKind::CaseColon]
        );
    }

    #[test]
    fn test_access_colon() {
        let state = run("class X { public: int a; };", LANG_CPP);
        assert_eq!(colon_kinds(&state), vec![TokenKind::PrivateColon]);
    }

    #[test]
    fn test_class_base_colon() {
        let state = run("class X : Y { };", LANG_CPP);
        assert_eq!(colon_kinds(&state), vec![TokenKind::ClassColon]);
    }

    #[test]
    fn test_ternary_colon() {
        let state = run("void f(int a) { int b = a ? 1 : 2; }", LANG_C);
        assert_eq!(colon_kinds(&state), vec![TokenKind::CondColon]);
    }

    #[test]
    fn test_bitfield_colon() {
        let state = run("struct s { unsigned a : 3; };", LANG_C);
        assert_eq!(colon_kinds(&state), vec![TokenKind::BitColon]);
    }

    #[test]
    fn test_label_colon() {
        let state = run("void f(void) { again: f(); goto again; }", LANG_C);
        assert_eq!(colon_kinds(&state), vec![TokenKind::LabelColon]);
        // the label word is no longer a plain word
        assert!(state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .any(|c| c.kind == TokenKind::Label && c.text == "again"));
    }
}

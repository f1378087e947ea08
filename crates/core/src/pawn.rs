//! Pawn prescan: Pawn statements may end at a newline instead of a
//! semicolon, so virtual semicolons are inserted where a line visibly
//! completes a statement. The rest of the pipeline then treats Pawn
//! like the braced languages.

use crate::chunk::{Chunk, ChunkId, Nav};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

pub fn pawn_prescan(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        if !state.chunks.get(id).is_newline() {
            continue;
        }
        let Some(prev) = state.chunks.prev_ncnl(id, Nav::Preproc) else {
            continue;
        };
        let pc = state.chunks.get(prev);
        // only inside a function-ish body
        if pc.brace_level == 0 {
            continue;
        }
        if !can_end_statement(pc.kind) {
            continue;
        }
        let Some(next) = state.chunks.next_ncnl(id, Nav::Preproc) else {
            continue;
        };
        let nc = state.chunks.get(next);
        if !starts_statement(nc.kind) || nc.level != pc.level {
            continue;
        }

        let (line, col_end) = (pc.orig_line, pc.orig_col_end);
        let (level, brace_level, pp_level) = (pc.level, pc.brace_level, pc.pp_level);
        let flags = pc.flags & ChunkFlags::COPY;
        state.chunks.insert_after(
            prev,
            Chunk {
                kind: TokenKind::VSemicolon,
                text: String::new(),
                orig_line: line,
                orig_col: col_end,
                orig_col_end: col_end,
                flags: flags | ChunkFlags::PUNCTUATOR,
                level,
                brace_level,
                pp_level,
                ..Default::default()
            },
        );
    }
}

/// Token kinds that can legally terminate a Pawn statement.
fn can_end_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Word
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::ParenClose
            | TokenKind::FparenClose
            | TokenKind::SquareClose
            | TokenKind::Tsquare
            | TokenKind::Incdec
            | TokenKind::BraceClose
    )
}

/// Token kinds that begin a fresh statement rather than continuing the
/// previous line.
fn starts_statement(kind: TokenKind) -> bool {
    !matches!(
        kind,
        TokenKind::Assign
            | TokenKind::Arith
            | TokenKind::Bool
            | TokenKind::Compare
            | TokenKind::Shift
            | TokenKind::Star
            | TokenKind::Amp
            | TokenKind::Member
            | TokenKind::DcMember
            | TokenKind::Question
            | TokenKind::Colon
            | TokenKind::CondColon
            | TokenKind::Comma
            | TokenKind::BraceOpen
            | TokenKind::ParenOpen
            | TokenKind::SquareOpen
            | TokenKind::Semicolon
            | TokenKind::BraceClose
            | TokenKind::Else
            | TokenKind::While
            | TokenKind::WhileOfDo
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTable;
    use crate::lang::LANG_PAWN;
    use crate::pipeline;

    #[test]
    fn test_virtual_semicolons_between_statements() {
        let src = "main()\n{\n    new a = 1\n    new b = 2\n}\n";
        let state = pipeline::analyze(src.as_bytes(), LANG_PAWN, &KeywordTable::new()).unwrap();
        let vsemis = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .filter(|c| c.kind == TokenKind::VSemicolon)
            .count();
        assert!(vsemis >= 1, "expected a virtual semicolon between the lines");
    }

    #[test]
    fn test_no_virtual_semicolon_on_continuation() {
        let src = "main()\n{\n    a = b +\n        c\n}\n";
        let state = pipeline::analyze(src.as_bytes(), LANG_PAWN, &KeywordTable::new()).unwrap();
        // the line ends in `+`, which cannot end a statement
        let after_plus = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .filter(|c| c.kind == TokenKind::VSemicolon && c.orig_line == 3)
            .count();
        assert_eq!(after_plus, 0);
    }
}

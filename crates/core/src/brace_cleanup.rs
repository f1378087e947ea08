//! Brace cleanup: assigns nesting levels, types statement and function
//! parens, inserts virtual braces around brace-omitting control forms,
//! and propagates region flags. After this pass the level information
//! on every chunk is accurate.

use crate::chunk::{Chunk, ChunkId, Nav};
use crate::error::{ParseError, Result};
use crate::keywords::{pattern_class, PatternClass};
use crate::parse_frame::{pf_check, Frame, PseEntry, Stage, PSE_MAX};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

/// Structural state saved at the start of a directive line so the
/// directive's own parens cannot leak into the surrounding code.
struct DirectiveScope {
    pse_len: usize,
    level: u32,
    brace_level: u32,
}

/// Where virtual-brace closers are spliced in.
enum Anchor {
    After(ChunkId),
    Before(ChunkId),
}

pub fn brace_cleanup(state: &mut FileState) -> Result<()> {
    let mut frm = Frame::default();
    let mut dir: Option<DirectiveScope> = None;

    let mut cur = state.chunks.head();
    while let Some(pc) = cur {
        let next = state.chunks.next(pc, Nav::All);
        step(state, &mut frm, &mut dir, pc)?;
        cur = next;
    }

    // Close whatever is still open at end of file.
    for e in &frm.pse {
        if e.kind.is_opening() && e.kind != TokenKind::VbraceOpen {
            log::warn!(
                "unclosed {} from line {} at level {}",
                e.kind.name(),
                e.open_line,
                e.level
            );
        }
    }
    if let Some(tail) = state.chunks.tail() {
        let mut anchor = Anchor::After(tail);
        cascade_close(state, &mut frm, &mut anchor, true);
    }
    Ok(())
}

fn step(
    state: &mut FileState,
    frm: &mut Frame,
    dir: &mut Option<DirectiveScope>,
    pc: ChunkId,
) -> Result<()> {
    let kind = state.chunks.get(pc).kind;

    if kind == TokenKind::Preproc {
        let pp = pf_check(state, frm, pc);
        *dir = Some(DirectiveScope {
            pse_len: frm.pse.len(),
            level: frm.level,
            brace_level: frm.brace_level,
        });
        let flags = frm.flags;
        let c = state.chunks.get_mut(pc);
        c.level = frm.level;
        c.brace_level = frm.brace_level;
        c.pp_level = pp;
        c.flags |= flags;
        return Ok(());
    }

    if let Some(scope) = dir.as_ref() {
        if kind == TokenKind::Newline {
            frm.pse.truncate(scope.pse_len);
            frm.level = scope.level;
            frm.brace_level = scope.brace_level;
            *dir = None;
            assign_trivia(state, frm, pc);
            return Ok(());
        }
        directive_token(state, frm, pc);
        return Ok(());
    }

    let c = state.chunks.get(pc);
    if c.is_newline() || c.is_comment() {
        assign_trivia(state, frm, pc);
        return Ok(());
    }

    parse_token(state, frm, pc)
}

fn assign_trivia(state: &mut FileState, frm: &Frame, pc: ChunkId) {
    let pp = state.frame_pp_level;
    let flags = frm.flags;
    let c = state.chunks.get_mut(pc);
    c.level = frm.level;
    c.brace_level = frm.brace_level;
    c.pp_level = pp;
    c.flags |= flags;
    if pp > 0 {
        c.flags |= ChunkFlags::IN_PREPROC;
    }
}

/// Tokens inside a directive line only balance their own nesting; no
/// statement machinery runs for them.
fn directive_token(state: &mut FileState, frm: &mut Frame, pc: ChunkId) {
    assign_trivia(state, frm, pc);
    let kind = state.chunks.get(pc).kind;
    match kind {
        TokenKind::ParenOpen | TokenKind::SquareOpen | TokenKind::BraceOpen => {
            // bound only by the directive scope; overflow cannot leak out
            if frm.pse.len() < PSE_MAX {
                let line = state.chunks.get(pc).orig_line;
                frm.pse.push(PseEntry {
                    kind,
                    level: frm.level,
                    open_line: line,
                    chunk: Some(pc),
                    parent: TokenKind::None,
                    stage: Stage::None,
                    saved_flags: frm.flags,
                });
                frm.level += 1;
                if kind == TokenKind::BraceOpen {
                    frm.brace_level += 1;
                }
            }
        }
        TokenKind::ParenClose | TokenKind::SquareClose | TokenKind::BraceClose => {
            let want = match kind {
                TokenKind::ParenClose => TokenKind::ParenOpen,
                TokenKind::SquareClose => TokenKind::SquareOpen,
                _ => TokenKind::BraceOpen,
            };
            if frm.top().map(|e| e.kind) == Some(want) {
                frm.pse.pop();
                frm.level -= 1;
                if kind == TokenKind::BraceClose {
                    frm.brace_level -= 1;
                }
                let c = state.chunks.get_mut(pc);
                c.level = frm.level;
                c.brace_level = frm.brace_level;
            }
        }
        _ => {}
    }
}

fn parse_token(state: &mut FileState, frm: &mut Frame, pc: ChunkId) -> Result<()> {
    let consumed = check_complex_statements(state, frm, pc)?;

    mark_stmt_expr(state, frm, pc);

    let pp = state.frame_pp_level;
    let flags = frm.flags;
    {
        let c = state.chunks.get_mut(pc);
        c.level = frm.level;
        c.brace_level = frm.brace_level;
        c.pp_level = pp;
        c.flags |= flags;
        if pp > 0 {
            c.flags |= ChunkFlags::IN_PREPROC;
        }
    }

    if consumed {
        return Ok(());
    }

    let kind = state.chunks.get(pc).kind;
    match kind {
        TokenKind::ParenOpen | TokenKind::SquareOpen | TokenKind::AngleOpen => {
            open_paren(state, frm, pc)?;
        }
        TokenKind::BraceOpen => {
            open_brace(state, frm, pc)?;
        }
        k if k.is_closing() => {
            close_any(state, frm, pc);
        }
        TokenKind::Semicolon => {
            end_statement(frm);
            let mut anchor = Anchor::After(pc);
            cascade_close(state, frm, &mut anchor, false);
        }
        TokenKind::Typedef => {
            frm.flags |= ChunkFlags::IN_TYPEDEF;
            frm.typedef_level = Some(frm.level);
        }
        TokenKind::Enum | TokenKind::Struct | TokenKind::Union | TokenKind::Class => {
            frm.stmt_kw = Some(kind);
        }
        TokenKind::Assign => {
            frm.saw_assign = true;
            frm.expr_count = 0;
        }
        k if pattern_class(k) != PatternClass::None => {
            push_statement(state, frm, pc, k)?;
        }
        _ => {}
    }
    Ok(())
}

/// Drive the stage machine for the innermost pending statement. May
/// retype `pc`, pop finished statements, or insert a virtual brace
/// before `pc`. Returns true when `pc` was fully consumed as a stage
/// transition.
fn check_complex_statements(state: &mut FileState, frm: &mut Frame, pc: ChunkId) -> Result<bool> {
    loop {
        let stage = frm.top_stage();
        if stage == Stage::None {
            return Ok(false);
        }
        let kind = state.chunks.get(pc).kind;
        match stage {
            Stage::Paren1 | Stage::WodParen => {
                if kind == TokenKind::ParenOpen {
                    return Ok(false);
                }
                // keyword without its parens; drop the expectation
                frm.pse.pop();
            }
            Stage::OpParen1 => {
                if kind == TokenKind::ParenOpen {
                    return Ok(false);
                }
                frm.top_mut().unwrap().stage = Stage::Brace2;
            }
            Stage::Brace2 | Stage::BraceDo => {
                if kind == TokenKind::BraceOpen {
                    return Ok(false);
                }
                let top_kind = frm.top().unwrap().kind;
                if top_kind == TokenKind::Namespace
                    && matches!(kind, TokenKind::Word | TokenKind::Type | TokenKind::DcMember)
                {
                    return Ok(false);
                }
                insert_vbrace_open(state, frm, pc)?;
                return Ok(false);
            }
            Stage::Else => {
                if kind == TokenKind::Else {
                    let top = frm.top_mut().unwrap();
                    top.kind = TokenKind::Else;
                    top.stage = Stage::ElseIf;
                    return Ok(true);
                }
                frm.pse.pop();
                let mut anchor = Anchor::Before(pc);
                cascade_close(state, frm, &mut anchor, false);
            }
            Stage::ElseIf => {
                if kind == TokenKind::If {
                    let top = frm.top_mut().unwrap();
                    top.kind = TokenKind::If;
                    top.stage = Stage::Paren1;
                    return Ok(true);
                }
                frm.top_mut().unwrap().stage = Stage::Brace2;
            }
            Stage::While => {
                if kind == TokenKind::While {
                    state.chunks.get_mut(pc).kind = TokenKind::WhileOfDo;
                    let top = frm.top_mut().unwrap();
                    top.kind = TokenKind::WhileOfDo;
                    top.stage = Stage::WodParen;
                    return Ok(true);
                }
                frm.pse.pop();
                let mut anchor = Anchor::Before(pc);
                cascade_close(state, frm, &mut anchor, false);
            }
            Stage::WodSemi => {
                frm.pse.pop();
                if kind == TokenKind::Semicolon {
                    // the `;` still closes the do-while statement
                    return Ok(false);
                }
            }
            Stage::Catch => {
                if kind == TokenKind::Catch {
                    let top = frm.top_mut().unwrap();
                    top.kind = TokenKind::Catch;
                    top.stage = Stage::OpParen1;
                    return Ok(true);
                }
                if kind == TokenKind::Finally {
                    let top = frm.top_mut().unwrap();
                    top.kind = TokenKind::Finally;
                    top.stage = Stage::Brace2;
                    return Ok(true);
                }
                frm.pse.pop();
                let mut anchor = Anchor::Before(pc);
                cascade_close(state, frm, &mut anchor, false);
            }
            Stage::None => unreachable!(),
        }
    }
}

fn mark_stmt_expr(state: &mut FileState, frm: &mut Frame, pc: ChunkId) {
    let kind = state.chunks.get(pc).kind;
    let mut add = ChunkFlags::empty();
    if frm.stmt_count == 0 {
        add |= ChunkFlags::STMT_START;
    }
    if frm.expr_count == 0 {
        add |= ChunkFlags::EXPR_START;
    }
    state.chunks.get_mut(pc).flags |= add;
    frm.stmt_count += 1;
    frm.expr_count += 1;

    use TokenKind::*;
    if matches!(
        kind,
        Assign | Arith | Bool | Compare | Shift | Star | Amp | Not | Inv | Question
            | Colon | Comma | Return | Case | Throw
    ) {
        frm.expr_count = 0;
    }
    if kind == Colon {
        frm.stmt_count = 0;
    }
}

fn end_statement(frm: &mut Frame) {
    frm.stmt_count = 0;
    frm.expr_count = 0;
    frm.stmt_kw = Option::None;
    frm.saw_assign = false;
    if let Some(lvl) = frm.typedef_level {
        if frm.level <= lvl {
            frm.flags.remove(ChunkFlags::IN_TYPEDEF);
            frm.typedef_level = None;
        }
    }
}

fn push_pse(frm: &mut Frame, entry: PseEntry, line: u32) -> Result<()> {
    if frm.pse.len() >= PSE_MAX {
        return Err(ParseError::TooDeep(line));
    }
    frm.pse.push(entry);
    Ok(())
}

/// Push the expectation entry for a statement keyword.
fn push_statement(state: &mut FileState, frm: &mut Frame, pc: ChunkId, kind: TokenKind) -> Result<()> {
    let stage = match pattern_class(kind) {
        PatternClass::PBraced => Stage::Paren1,
        PatternClass::Braced => {
            if kind == TokenKind::Do {
                Stage::BraceDo
            } else {
                Stage::Brace2
            }
        }
        PatternClass::OpBraced => Stage::OpParen1,
        PatternClass::VBraced => Stage::Brace2,
        PatternClass::Else => Stage::ElseIf,
        PatternClass::None => return Ok(()),
    };
    let line = state.chunks.get(pc).orig_line;
    push_pse(
        frm,
        PseEntry {
            kind,
            level: frm.level,
            open_line: line,
            chunk: Some(pc),
            parent: TokenKind::None,
            stage,
            saved_flags: frm.flags,
        },
        line,
    )
}

/// Classify and push an opening paren, square, or angle bracket.
fn open_paren(state: &mut FileState, frm: &mut Frame, pc: ChunkId) -> Result<()> {
    use TokenKind::*;
    let kind = state.chunks.get(pc).kind;
    let line = state.chunks.get(pc).orig_line;

    let (new_kind, parent) = if kind == ParenOpen {
        let prev_kind = state
            .chunks
            .prev_ncnl(pc, Nav::Preproc)
            .map(|p| state.chunks.get(p).kind);
        match prev_kind {
            Some(k @ (If | For | While | WhileOfDo | Switch | Catch | Sizeof)) => {
                (SparenOpen, k)
            }
            Some(
                Word | ParenClose | SparenClose | FparenClose | SquareClose | Tsquare
                | Operator,
            ) => (FparenOpen, TokenKind::None),
            _ => (ParenOpen, TokenKind::None),
        }
    } else {
        (kind, TokenKind::None)
    };

    let saved_flags = frm.flags;
    match new_kind {
        SparenOpen => {
            frm.flags |= ChunkFlags::IN_SPAREN;
            if parent == For {
                frm.flags |= ChunkFlags::IN_FOR;
            }
            frm.sparen_count += 1;
        }
        AngleOpen => frm.flags |= ChunkFlags::IN_TEMPLATE,
        _ => {}
    }

    {
        let c = state.chunks.get_mut(pc);
        c.kind = new_kind;
        c.parent_kind = parent;
    }
    push_pse(
        frm,
        PseEntry {
            kind: new_kind,
            level: frm.level,
            open_line: line,
            chunk: Some(pc),
            parent,
            stage: Stage::None,
            saved_flags,
        },
        line,
    )?;
    frm.level += 1;
    frm.paren_count += 1;
    Ok(())
}

fn open_brace(state: &mut FileState, frm: &mut Frame, pc: ChunkId) -> Result<()> {
    use TokenKind::*;
    let line = state.chunks.get(pc).orig_line;

    let parent = match frm.top_stage() {
        Stage::Brace2 | Stage::BraceDo => frm.top().unwrap().kind,
        _ => {
            if frm.saw_assign {
                Assign
            } else {
                frm.stmt_kw.take().unwrap_or(TokenKind::None)
            }
        }
    };

    let saved_flags = frm.flags;
    match parent {
        Enum => frm.flags |= ChunkFlags::IN_ENUM,
        Struct | Union => frm.flags |= ChunkFlags::IN_STRUCT,
        Class => frm.flags |= ChunkFlags::IN_CLASS,
        Namespace => frm.flags |= ChunkFlags::IN_NAMESPACE,
        Assign => frm.flags |= ChunkFlags::IN_ARRAY_ASSIGN,
        _ => {}
    }

    state.chunks.get_mut(pc).parent_kind = parent;
    push_pse(
        frm,
        PseEntry {
            kind: BraceOpen,
            level: frm.level,
            open_line: line,
            chunk: Some(pc),
            parent,
            stage: Stage::None,
            saved_flags,
        },
        line,
    )?;
    frm.level += 1;
    frm.brace_level += 1;
    frm.stmt_kw = Option::None;
    frm.saw_assign = false;
    frm.stmt_count = 0;
    frm.expr_count = 0;
    Ok(())
}

fn close_any(state: &mut FileState, frm: &mut Frame, pc: ChunkId) {
    use TokenKind::*;
    let kind = state.chunks.get(pc).kind;

    // a real `}` implicitly ends any single-statement bodies
    if kind == BraceClose {
        while frm.top().map(|e| e.kind) == Some(VbraceOpen) {
            pop_vbrace(state, frm, &mut Anchor::Before(pc));
        }
    }

    let family = |k: TokenKind| -> bool {
        match kind {
            BraceClose => k == BraceOpen,
            SquareClose => k == SquareOpen,
            AngleClose => k == AngleOpen,
            _ => matches!(k, ParenOpen | SparenOpen | FparenOpen),
        }
    };

    let Some(pos) = frm.pse.iter().rposition(|e| family(e.kind)) else {
        // unmatched closer: no underflow, levels stay as assigned
        return;
    };
    // drop abandoned entries above the match (stage expectations or
    // unclosed deeper opens from ill-formed code); virtual braces still
    // get their closer so pairs stay balanced
    while frm.pse.len() > pos + 1 {
        if frm.top().map(|e| e.kind) == Some(VbraceOpen) {
            pop_vbrace(state, frm, &mut Anchor::Before(pc));
            continue;
        }
        let e = frm.pse.pop().unwrap();
        if e.kind.is_opening() {
            frm.level = frm.level.saturating_sub(1);
            if e.kind == BraceOpen {
                frm.brace_level = frm.brace_level.saturating_sub(1);
            }
        }
        frm.flags = e.saved_flags;
    }

    let entry = frm.pse.pop().unwrap();
    frm.level = frm.level.saturating_sub(1);
    if entry.kind == BraceOpen {
        frm.brace_level = frm.brace_level.saturating_sub(1);
    }
    frm.flags = entry.saved_flags;

    {
        let new_kind = match entry.kind {
            SparenOpen => SparenClose,
            FparenOpen => FparenClose,
            _ => kind,
        };
        let (lvl, blvl) = (frm.level, frm.brace_level);
        let c = state.chunks.get_mut(pc);
        c.kind = new_kind;
        c.parent_kind = entry.parent;
        c.level = lvl;
        c.brace_level = blvl;
    }

    match entry.kind {
        SparenOpen => {
            // the statement keyword now expects its controlled code
            if let Some(top) = frm.top_mut() {
                match top.stage {
                    Stage::Paren1 | Stage::OpParen1 => top.stage = Stage::Brace2,
                    Stage::WodParen => top.stage = Stage::WodSemi,
                    _ => {}
                }
            }
        }
        BraceOpen => {
            if let Some(open) = entry.chunk {
                mark_brace_body(state, open, pc);
            }
            frm.stmt_count = 0;
            frm.expr_count = 0;
            frm.stmt_kw = Option::None;
            let mut anchor = Anchor::After(pc);
            cascade_close(state, frm, &mut anchor, false);
        }
        _ => {}
    }
}

/// After a statement's body closed, advance or pop the pending
/// statement entries and close enclosing single-statement bodies.
fn cascade_close(state: &mut FileState, frm: &mut Frame, anchor: &mut Anchor, at_eof: bool) {
    use TokenKind::*;
    loop {
        let Some(top) = frm.top() else { return };
        if top.kind == VbraceOpen {
            pop_vbrace(state, frm, anchor);
            continue;
        }
        if at_eof {
            frm.pse.pop();
            continue;
        }
        let (kind, stage) = (top.kind, top.stage);
        match stage {
            Stage::Brace2 | Stage::BraceDo => match kind {
                If => {
                    frm.top_mut().unwrap().stage = Stage::Else;
                    return;
                }
                Do => {
                    frm.top_mut().unwrap().stage = Stage::While;
                    return;
                }
                Try | Catch => {
                    frm.top_mut().unwrap().stage = Stage::Catch;
                    return;
                }
                _ => {
                    frm.pse.pop();
                }
            },
            Stage::None => return,
            // waiting for a specific token (else, while, catch, ...)
            _ => return,
        }
    }
}

fn pop_vbrace(state: &mut FileState, frm: &mut Frame, anchor: &mut Anchor) {
    let entry = frm.pse.pop().unwrap();
    frm.level = frm.level.saturating_sub(1);
    frm.brace_level = frm.brace_level.saturating_sub(1);
    frm.flags = entry.saved_flags;

    let pp = state.frame_pp_level;
    let mut flags = frm.flags;
    if pp > 0 {
        flags |= ChunkFlags::IN_PREPROC;
    }
    let target = match *anchor {
        Anchor::After(id) | Anchor::Before(id) => id,
    };
    let t = state.chunks.get(target);
    let proto = Chunk {
        kind: TokenKind::VbraceClose,
        parent_kind: entry.parent,
        text: String::new(),
        orig_line: t.orig_line,
        orig_col: t.orig_col,
        orig_col_end: t.orig_col,
        flags,
        level: frm.level,
        brace_level: frm.brace_level,
        pp_level: pp,
        ..Default::default()
    };
    match anchor {
        Anchor::After(id) => {
            let new = state.chunks.insert_after(*id, proto);
            *anchor = Anchor::After(new);
        }
        Anchor::Before(id) => {
            state.chunks.insert_before(*id, proto);
        }
    }
}

/// Insert a `VbraceOpen` before `pc` for a brace-omitting body.
fn insert_vbrace_open(state: &mut FileState, frm: &mut Frame, pc: ChunkId) -> Result<()> {
    let parent = frm.top().unwrap().kind;
    let pp = state.frame_pp_level;
    let mut flags = frm.flags;
    if pp > 0 {
        flags |= ChunkFlags::IN_PREPROC;
    }
    let (line, col) = {
        let c = state.chunks.get(pc);
        (c.orig_line, c.orig_col)
    };
    let proto = Chunk {
        kind: TokenKind::VbraceOpen,
        parent_kind: parent,
        text: String::new(),
        orig_line: line,
        orig_col: col,
        orig_col_end: col,
        flags,
        level: frm.level,
        brace_level: frm.brace_level,
        pp_level: pp,
        ..Default::default()
    };
    let vb = state.chunks.insert_before(pc, proto);
    push_pse(
        frm,
        PseEntry {
            kind: TokenKind::VbraceOpen,
            level: frm.level,
            open_line: line,
            chunk: Some(vb),
            parent,
            stage: Stage::None,
            saved_flags: frm.flags,
        },
        line,
    )?;
    frm.level += 1;
    frm.brace_level += 1;
    frm.stmt_count = 0;
    frm.expr_count = 0;
    Ok(())
}

fn mark_brace_body(state: &mut FileState, open: ChunkId, close: ChunkId) {
    if !state.chunks.newline_between(open, close) {
        let mut id = open;
        loop {
            state.chunks.get_mut(id).flags |= ChunkFlags::ONE_LINER;
            if id == close {
                break;
            }
            match state.chunks.next(id, Nav::All) {
                Some(n) => id = n,
                None => break,
            }
        }
    }
    if state.chunks.next_ncnl(open, Nav::All) == Some(close) {
        state.chunks.get_mut(open).flags |= ChunkFlags::EMPTY_BODY;
        state.chunks.get_mut(close).flags |= ChunkFlags::EMPTY_BODY;
    }
}

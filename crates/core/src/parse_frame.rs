//! Parse frames: the nesting state tracked by brace cleanup, and the
//! snapshot stack that makes every `#if`/`#else`/`#endif` branch parse
//! as if it were the only one taken.

use crate::chunk::ChunkId;
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

/// Parser stack bound; exceeding it aborts the file.
pub const PSE_MAX: usize = 128;
/// Snapshot stack bound; exceeding it stops snapshotting only.
pub const FRAME_MAX: usize = 16;

/// What the cleanup pass expects next for the innermost statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    None,
    /// if/for/switch/while: expecting `(`
    Paren1,
    /// catch/version: optional `(`
    OpParen1,
    /// parens of a while-of-do
    WodParen,
    /// semicolon after a while-of-do
    WodSemi,
    /// do: expecting a braced or single statement
    BraceDo,
    /// if/else/for/switch/while: expecting the controlled statement
    Brace2,
    /// expecting `else` after `if`
    Else,
    /// expecting `if` after `else`
    ElseIf,
    /// expecting `while` after `do`
    While,
    /// expecting `catch` or `finally` after `try`
    Catch,
}

/// One parser stack entry: an open nesting level or a statement
/// keyword waiting for its controlled code.
#[derive(Debug, Clone)]
pub struct PseEntry {
    pub kind: TokenKind,
    pub level: u32,
    pub open_line: u32,
    pub chunk: Option<ChunkId>,
    pub parent: TokenKind,
    pub stage: Stage,
    /// Region flags in force before this entry; restored on pop
    pub saved_flags: ChunkFlags,
}

/// Value-semantics nesting state. Copied whole onto the snapshot stack.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub ref_no: u32,
    /// nesting of parens/squares/angles/braces
    pub level: u32,
    /// nesting of braces and virtual braces
    pub brace_level: u32,
    pub pp_level: u32,
    pub sparen_count: u32,
    pub paren_count: u32,
    pub pse: Vec<PseEntry>,
    /// `PpIf` or `PpElse` while inside the matching region
    pub in_ifdef: TokenKind,
    pub stmt_count: u32,
    pub expr_count: u32,
    /// Region flags applied to chunks as they are walked
    pub flags: ChunkFlags,
    /// enum/struct/union/class keyword seen in the current statement
    pub stmt_kw: Option<TokenKind>,
    /// An `=` was seen in the current statement (array initialisers)
    pub saw_assign: bool,
    /// Level of an active `typedef`, cleared at its terminating `;`
    pub typedef_level: Option<u32>,
}

impl Frame {
    pub fn top(&self) -> Option<&PseEntry> {
        self.pse.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut PseEntry> {
        self.pse.last_mut()
    }

    pub fn top_stage(&self) -> Stage {
        self.top().map_or(Stage::None, |e| e.stage)
    }
}

/// Push a copy of the frame onto the snapshot stack (`#if`).
pub fn pf_push(state: &mut FileState, frm: &mut Frame) {
    if state.frames.len() < FRAME_MAX {
        state.frames.push(frm.clone());
        state.frame_ref_no += 1;
        frm.ref_no = state.frame_ref_no;
    }
    log::debug!("pf_push: count = {}", state.frames.len());
}

fn pf_copy_tos(state: &FileState, frm: &mut Frame) {
    if let Some(top) = state.frames.last() {
        *frm = top.clone();
    }
}

fn pf_copy_2nd_tos(state: &FileState, frm: &mut Frame) {
    if state.frames.len() > 1 {
        *frm = state.frames[state.frames.len() - 2].clone();
    }
}

fn pf_trash_tos(state: &mut FileState) {
    state.frames.pop();
}

/// Pop the top snapshot into the working frame (`#endif`).
pub fn pf_pop(state: &mut FileState, frm: &mut Frame) {
    if !state.frames.is_empty() {
        pf_copy_tos(state, frm);
        pf_trash_tos(state);
    }
}

/// Handle the frame effects of a preprocessor directive chunk and
/// return the pp level to record on it.
///
/// An `#if` pushes a snapshot; `#else` restores the pre-`#if` state so
/// the branch parses against the same base; `#endif` discards whatever
/// branch state is on top. The working frame always reflects the
/// current branch as if it were the only one.
pub fn pf_check(state: &mut FileState, frm: &mut Frame, pc: ChunkId) -> u32 {
    let mut pp_level = state.frame_pp_level;
    let (kind, parent, line) = {
        let c = state.chunks.get(pc);
        (c.kind, c.parent_kind, c.orig_line)
    };
    if kind != TokenKind::Preproc {
        return pp_level;
    }

    match parent {
        TokenKind::PpIf => {
            state.frame_pp_level += 1;
            pf_push(state, frm);
            frm.in_ifdef = TokenKind::PpIf;
            log::debug!(
                "line {line}: if-push #{}, frames = {}",
                frm.ref_no,
                state.frames.len()
            );
        }
        TokenKind::PpElse => {
            pp_level = pp_level.saturating_sub(1);
            // Keep the #if branch state on the stack and re-parse this
            // branch from the pre-#if base.
            if frm.in_ifdef == TokenKind::PpIf {
                pf_push(state, frm);
                frm.in_ifdef = TokenKind::PpElse;
            }
            pf_copy_2nd_tos(state, frm);
            frm.in_ifdef = TokenKind::PpElse;
            log::debug!("line {line}: else-push, frames = {}", state.frames.len());
        }
        TokenKind::PpEndif => {
            state.frame_pp_level = state.frame_pp_level.saturating_sub(1);
            pp_level = pp_level.saturating_sub(1);
            if frm.in_ifdef == TokenKind::PpElse {
                // stack is [...] [base] [if]: drop both, resume [...]
                pf_copy_tos(state, frm);
                if state.frames.len() > 1 {
                    frm.in_ifdef = state.frames[state.frames.len() - 2].in_ifdef;
                } else {
                    frm.in_ifdef = TokenKind::None;
                }
                pf_trash_tos(state);
                pf_trash_tos(state);
                log::debug!("line {line}: endif-trash/pop, frames = {}", state.frames.len());
            } else if frm.in_ifdef == TokenKind::PpIf {
                pf_pop(state, frm);
                log::debug!("line {line}: endif-pop, frames = {}", state.frames.len());
            }
        }
        _ => {}
    }
    frm.pp_level = state.frame_pp_level;
    pp_level
}

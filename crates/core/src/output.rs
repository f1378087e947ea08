//! Emission: classify named chunks into identifier kinds and hand them
//! to the index sink.

use std::io::Write;

use crate::chunk::Chunk;
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, IdKind, IdSubKind, TokenKind};

/// One classified identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry<'a> {
    pub line: u32,
    pub col: u32,
    pub scope: &'a str,
    pub kind: IdKind,
    pub sub_kind: IdSubKind,
    pub identifier: &'a str,
}

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Where classified identifiers go. Implemented by the index store;
/// one `begin`/`commit` bracket per file surrounds the inserts.
pub trait IndexSink {
    fn begin(&mut self) -> Result<(), SinkError>;
    fn insert_entry(&mut self, entry: &OutputEntry<'_>) -> Result<(), SinkError>;
    fn commit(&mut self) -> Result<(), SinkError>;
}

fn sub_from_flags(flags: ChunkFlags) -> IdSubKind {
    if flags.contains(ChunkFlags::DEF) {
        IdSubKind::Definition
    } else if flags.contains(ChunkFlags::PROTO) {
        IdSubKind::Declaration
    } else if flags.contains(ChunkFlags::REF) {
        IdSubKind::Reference
    } else {
        IdSubKind::Unknown
    }
}

/// The classification table. `None` means the chunk names nothing.
pub fn classify(c: &Chunk) -> Option<(IdKind, IdSubKind)> {
    if c.flags.contains(ChunkFlags::PUNCTUATOR) {
        return None;
    }
    match c.kind {
        TokenKind::FuncDef => Some((IdKind::Function, IdSubKind::Definition)),
        TokenKind::FuncProto => Some((IdKind::Function, IdSubKind::Declaration)),
        TokenKind::FuncCall => Some((IdKind::Function, IdSubKind::Reference)),
        TokenKind::FuncClass => Some((IdKind::Function, sub_from_flags(c.flags))),
        TokenKind::MacroFunc => Some((IdKind::MacroFunction, IdSubKind::Definition)),
        TokenKind::Macro => Some((IdKind::Macro, IdSubKind::Definition)),
        TokenKind::FuncType => Some((IdKind::FunctionType, IdSubKind::Definition)),
        TokenKind::Type => {
            if c.flags.contains(ChunkFlags::KEYWORD) {
                return None;
            }
            match c.parent_kind {
                TokenKind::Typedef => {
                    let kind = if c.flags.contains(ChunkFlags::TYPEDEF_STRUCT) {
                        IdKind::StructType
                    } else if c.flags.contains(ChunkFlags::TYPEDEF_UNION) {
                        IdKind::UnionType
                    } else if c.flags.contains(ChunkFlags::TYPEDEF_ENUM) {
                        IdKind::EnumType
                    } else {
                        IdKind::Type
                    };
                    Some((kind, IdSubKind::Definition))
                }
                TokenKind::Struct => Some((IdKind::Struct, sub_from_flags(c.flags))),
                TokenKind::Union => Some((IdKind::Union, sub_from_flags(c.flags))),
                TokenKind::Enum => Some((IdKind::Enum, sub_from_flags(c.flags))),
                TokenKind::Class => Some((IdKind::Class, sub_from_flags(c.flags))),
                _ => Some((IdKind::Type, IdSubKind::Reference)),
            }
        }
        TokenKind::Word | TokenKind::FuncVar | TokenKind::FuncCtorVar => {
            match c.parent_kind {
                TokenKind::None => {
                    if c.flags.contains(ChunkFlags::IN_ENUM) {
                        Some((IdKind::EnumVal, IdSubKind::Definition))
                    } else if c.flags.contains(ChunkFlags::VAR_DEF) {
                        Some((IdKind::Var, IdSubKind::Definition))
                    } else if c.flags.contains(ChunkFlags::VAR_DECL) {
                        Some((IdKind::Var, IdSubKind::Declaration))
                    } else {
                        Some((IdKind::Var, IdSubKind::Reference))
                    }
                }
                TokenKind::Namespace => Some((IdKind::Namespace, sub_from_flags(c.flags))),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Emit every named chunk to the sink, bracketed by one begin/commit.
/// The commit runs regardless of insert failures; the first insert
/// error is reported after the bracket closes.
pub fn output(state: &FileState, sink: &mut dyn IndexSink) -> Result<(), SinkError> {
    sink.begin()?;
    let mut first_err: Option<SinkError> = None;
    for id in state.chunks.ids() {
        let c = state.chunks.get(id);
        let Some((kind, sub_kind)) = classify(c) else {
            continue;
        };
        let entry = OutputEntry {
            line: c.orig_line,
            col: c.orig_col,
            scope: &c.scope,
            kind,
            sub_kind,
            identifier: &c.text,
        };
        if let Err(e) = sink.insert_entry(&entry) {
            log::error!("index insert failed for '{}': {e}", c.text);
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
    }
    sink.commit()?;
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Collecting sink used by tests and by the dump-only paths.
#[derive(Debug, Default)]
pub struct VecSink {
    pub entries: Vec<(u32, u32, String, IdKind, IdSubKind, String)>,
}

impl IndexSink for VecSink {
    fn begin(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn insert_entry(&mut self, e: &OutputEntry<'_>) -> Result<(), SinkError> {
        self.entries.push((
            e.line,
            e.col,
            e.scope.to_string(),
            e.kind,
            e.sub_kind,
            e.identifier.to_string(),
        ));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Debug dump of the parsed chunk stream (`-d`).
pub fn dump_tokens(state: &FileState, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "# -=====-")?;
    writeln!(
        out,
        "# Line           Tag        Parent      Scope  Cols  Br/Lvl/Pp  Nl  Flags  Text"
    )?;
    for id in state.chunks.ids() {
        let c = state.chunks.get(id);
        write!(
            out,
            "# {:4}> {:>13}[{:>13}][{}][{}/{}][{}/{}/{}][{}] ",
            c.orig_line,
            c.kind.name(),
            c.parent_kind.name(),
            c.scope,
            c.orig_col,
            c.orig_col_end,
            c.brace_level,
            c.level,
            c.pp_level,
            c.nl_count,
        )?;
        write!(out, "{}", c.flags.names().join(","))?;
        if !c.is_newline() && !c.text.is_empty() {
            write!(out, " {}", c.text)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "# -=====-")?;
    Ok(())
}

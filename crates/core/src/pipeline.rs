//! Per-file pipeline state and the stage driver.

use crate::brace_cleanup;
use crate::chunk::ChunkList;
use crate::combine_labels;
use crate::error::Result;
use crate::fix_symbols;
use crate::keywords::KeywordTable;
use crate::lang::{self, LangFlags};
use crate::parse_frame::Frame;
use crate::pawn;
use crate::scope;
use crate::tokenize;
use crate::tokenize_cleanup;

/// Everything owned while one file moves through the pipeline. Created
/// per input file and dropped after emission.
#[derive(Debug, Default)]
pub struct FileState {
    pub lang: LangFlags,
    pub chunks: ChunkList,
    /// `#if` snapshot stack
    pub frames: Vec<Frame>,
    pub frame_pp_level: u32,
    pub frame_ref_no: u32,
}

impl FileState {
    pub fn new(lang: LangFlags) -> Self {
        Self {
            lang,
            ..Default::default()
        }
    }
}

/// Run the full analysis pipeline over decoded UTF-8 input.
///
/// Stage order matters: levels only exist after brace cleanup, and the
/// symbol passes read flags the earlier stages set.
pub fn analyze(data: &[u8], lang: LangFlags, keywords: &KeywordTable) -> Result<FileState> {
    let mut state = FileState::new(lang);

    tokenize::tokenize(&mut state, data, keywords);
    tokenize_cleanup::tokenize_cleanup(&mut state);
    brace_cleanup::brace_cleanup(&mut state)?;
    if lang.contains(lang::LANG_PAWN) {
        pawn::pawn_prescan(&mut state);
    }
    fix_symbols::fix_symbols(&mut state);
    combine_labels::combine_labels(&mut state);
    scope::assign_scope(&mut state);

    Ok(state)
}

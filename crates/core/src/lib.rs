//! # toks-core
//!
//! The analysis pipeline of the `toks` cross-reference indexer: it
//! turns raw source bytes into a stream of classified, scoped
//! identifier occurrences.
//!
//! ## Pipeline
//!
//! ```text
//! bytes
//!   ├──> decode            (BOM detection, UTF-16 → UTF-8, NUL check)
//!   ├──> tokenize          (byte walk → chunk list)
//!   ├──> tokenize_cleanup  (neighbour rewrites, macro names)
//!   ├──> brace_cleanup     (levels, statement parens, virtual braces,
//!   │                       #if frame stack)
//!   ├──> pawn_prescan      (virtual semicolons, Pawn only)
//!   ├──> fix_symbols       (typedefs, tags, functions, variables)
//!   ├──> combine_labels    (colon disambiguation)
//!   ├──> assign_scope      (enclosing-definer chains)
//!   └──> output            (classified tuples → IndexSink)
//! ```
//!
//! Every stage mutates the single chunk list owned by [`FileState`];
//! the caller supplies the language flags, a keyword table, and a sink
//! for the emitted entries.
//!
//! ## Example
//!
//! ```rust
//! use toks_core::{analyze, output, KeywordTable, VecSink, LANG_C};
//!
//! let src = b"enum color { RED, GREEN };";
//! let state = analyze(src, LANG_C, &KeywordTable::new()).unwrap();
//! let mut sink = VecSink::default();
//! output(&state, &mut sink).unwrap();
//! assert_eq!(sink.entries.len(), 3); // color, RED, GREEN
//! ```

mod brace_cleanup;
mod chars;
mod chunk;
mod combine_labels;
mod decode;
mod error;
mod fix_symbols;
mod keywords;
mod lang;
mod output;
mod parse_frame;
mod pawn;
mod pipeline;
mod scope;
mod token;
mod tokenize;
mod tokenize_cleanup;

pub use chunk::{Chunk, ChunkId, ChunkList, Nav};
pub use decode::{decode, detect_encoding, Encoding};
pub use error::{ParseError, Result};
pub use keywords::KeywordTable;
pub use lang::{
    from_filename, from_tag, to_string as lang_to_string, LangFlags, LANG_ALL, LANG_ALLC,
    LANG_C, LANG_CPP, LANG_CS, LANG_D, LANG_ECMA, LANG_JAVA, LANG_NONE, LANG_OC, LANG_PAWN,
    LANG_VALA,
};
pub use output::{classify, dump_tokens, output, IndexSink, OutputEntry, SinkError, VecSink};
pub use pipeline::{analyze, FileState};
pub use token::{ChunkFlags, IdKind, IdSubKind, TokenKind};

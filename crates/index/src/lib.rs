//! # toks-index
//!
//! The SQLite-backed cross-reference store. Entries produced by
//! `toks-core` land in per-sub-kind tables (`Defs`, `Decls`, `Refs`)
//! keyed by a `Files` row; the file's content digest decides whether a
//! re-run needs to re-analyze at all.

mod error;
mod store;

pub use error::{IndexError, Result};
pub use store::{FileSession, Hit, Index, QuerySelect};

//! The chunk list: an arena of lexemes threaded into a doubly-linked
//! list, with the navigation filters the passes are written against.

use crate::token::{ChunkFlags, TokenKind};

/// Index of a chunk in the arena. Stable across inserts and unlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(u32);

impl ChunkId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One lexeme: token, whitespace run, comment, or virtual brace.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub kind: TokenKind,
    /// The kind that caused this chunk (the `{` of an enum body has
    /// `parent_kind == Enum`)
    pub parent_kind: TokenKind,
    pub text: String,
    pub orig_line: u32,
    pub orig_col: u32,
    pub orig_col_end: u32,
    pub flags: ChunkFlags,
    /// Newlines inside a `Newline`, `NlCont`, or multi-line comment
    pub nl_count: u32,
    /// Nesting in braces, parens, squares and angles
    pub level: u32,
    /// Nesting in braces and virtual braces only
    pub brace_level: u32,
    /// Nesting in the `#if` frame stack
    pub pp_level: u32,
    /// `:`-joined chain of enclosing definers
    pub scope: String,
    pub(crate) prev: Option<ChunkId>,
    pub(crate) next: Option<ChunkId>,
}

impl Chunk {
    pub fn is_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::NlCont)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::CommentMulti)
    }

    pub fn is_preproc(&self) -> bool {
        self.flags.contains(ChunkFlags::IN_PREPROC)
    }

    pub fn is_vbrace(&self) -> bool {
        matches!(self.kind, TokenKind::VbraceOpen | TokenKind::VbraceClose)
    }

    pub fn is_semicolon(&self) -> bool {
        matches!(self.kind, TokenKind::Semicolon | TokenKind::VSemicolon)
    }
}

/// Navigation mode, mirroring the two cursor behaviors the passes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nav {
    /// Visit every chunk
    #[default]
    All,
    /// Stay within the current preprocessor region: from a preproc
    /// chunk never leave the directive, from a normal chunk skip
    /// preproc chunks entirely
    Preproc,
}

#[derive(Debug, Default)]
pub struct ChunkList {
    arena: Vec<Chunk>,
    head: Option<ChunkId>,
    tail: Option<ChunkId>,
}

impl ChunkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(&self) -> Option<ChunkId> {
        self.head
    }

    pub fn tail(&self) -> Option<ChunkId> {
        self.tail
    }

    pub fn get(&self, id: ChunkId) -> &Chunk {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: ChunkId) -> &mut Chunk {
        &mut self.arena[id.index()]
    }

    fn alloc(&mut self, chunk: Chunk) -> ChunkId {
        let id = ChunkId(self.arena.len() as u32);
        self.arena.push(chunk);
        id
    }

    /// Append at the tail.
    pub fn push_back(&mut self, chunk: Chunk) -> ChunkId {
        let id = self.alloc(chunk);
        let old_tail = self.tail;
        self.arena[id.index()].prev = old_tail;
        self.arena[id.index()].next = None;
        match old_tail {
            Some(t) => self.arena[t.index()].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Insert a new chunk after `after`.
    pub fn insert_after(&mut self, after: ChunkId, chunk: Chunk) -> ChunkId {
        let id = self.alloc(chunk);
        let old_next = self.arena[after.index()].next;
        self.arena[id.index()].prev = Some(after);
        self.arena[id.index()].next = old_next;
        self.arena[after.index()].next = Some(id);
        match old_next {
            Some(n) => self.arena[n.index()].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    /// Insert a new chunk before `before`.
    pub fn insert_before(&mut self, before: ChunkId, chunk: Chunk) -> ChunkId {
        let id = self.alloc(chunk);
        let old_prev = self.arena[before.index()].prev;
        self.arena[id.index()].next = Some(before);
        self.arena[id.index()].prev = old_prev;
        self.arena[before.index()].prev = Some(id);
        match old_prev {
            Some(p) => self.arena[p.index()].next = Some(id),
            None => self.head = Some(id),
        }
        id
    }

    /// Unlink a chunk from the list. The arena slot is not reused.
    pub fn unlink(&mut self, id: ChunkId) {
        let prev = self.arena[id.index()].prev;
        let next = self.arena[id.index()].next;
        match prev {
            Some(p) => self.arena[p.index()].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.arena[n.index()].prev = prev,
            None => self.tail = prev,
        }
        self.arena[id.index()].prev = None;
        self.arena[id.index()].next = None;
    }

    fn raw_next(&self, id: ChunkId) -> Option<ChunkId> {
        self.arena[id.index()].next
    }

    fn raw_prev(&self, id: ChunkId) -> Option<ChunkId> {
        self.arena[id.index()].prev
    }

    /// Next chunk under the given navigation mode.
    pub fn next(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        let mut pc = self.raw_next(id)?;
        if nav == Nav::All {
            return Some(pc);
        }
        if self.get(id).is_preproc() {
            // confined to the preprocessor region
            if self.get(pc).is_preproc() {
                return Some(pc);
            }
            return None;
        }
        while self.get(pc).is_preproc() {
            pc = self.raw_next(pc)?;
        }
        Some(pc)
    }

    /// Previous chunk under the given navigation mode.
    pub fn prev(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        let mut pc = self.raw_prev(id)?;
        if nav == Nav::All {
            return Some(pc);
        }
        if self.get(id).is_preproc() {
            if self.get(pc).is_preproc() {
                return Some(pc);
            }
            return None;
        }
        while self.get(pc).is_preproc() {
            pc = self.raw_prev(pc)?;
        }
        Some(pc)
    }

    fn skip_next(
        &self,
        mut id: ChunkId,
        nav: Nav,
        skip: impl Fn(&Chunk) -> bool,
    ) -> Option<ChunkId> {
        loop {
            id = self.next(id, nav)?;
            if !skip(self.get(id)) {
                return Some(id);
            }
        }
    }

    fn skip_prev(
        &self,
        mut id: ChunkId,
        nav: Nav,
        skip: impl Fn(&Chunk) -> bool,
    ) -> Option<ChunkId> {
        loop {
            id = self.prev(id, nav)?;
            if !skip(self.get(id)) {
                return Some(id);
            }
        }
    }

    /// Next non-comment chunk
    pub fn next_nc(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_next(id, nav, |c| c.is_comment())
    }

    /// Next non-comment, non-newline chunk
    pub fn next_ncnl(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_next(id, nav, |c| c.is_comment() || c.is_newline())
    }

    /// Next non-newline chunk
    pub fn next_nnl(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_next(id, nav, |c| c.is_newline())
    }

    /// Next non-comment, non-newline, non-preprocessor chunk. Within a
    /// preprocessor region this stays in the region.
    pub fn next_ncnlnp(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        if self.get(id).is_preproc() {
            self.skip_next(id, nav, |c| {
                c.is_preproc() && (c.is_comment() || c.is_newline())
            })
        } else {
            self.skip_next(id, nav, |c| {
                c.is_comment() || c.is_newline() || c.is_preproc()
            })
        }
    }

    /// Next non-virtual-brace chunk
    pub fn next_nvb(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_next(id, nav, |c| c.is_vbrace())
    }

    pub fn prev_nc(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_prev(id, nav, |c| c.is_comment())
    }

    pub fn prev_ncnl(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_prev(id, nav, |c| c.is_comment() || c.is_newline())
    }

    pub fn prev_nnl(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_prev(id, nav, |c| c.is_newline())
    }

    pub fn prev_ncnlnp(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        if self.get(id).is_preproc() {
            self.skip_prev(id, nav, |c| {
                c.is_preproc() && (c.is_comment() || c.is_newline())
            })
        } else {
            self.skip_prev(id, nav, |c| {
                c.is_comment() || c.is_newline() || c.is_preproc()
            })
        }
    }

    pub fn prev_nvb(&self, id: ChunkId, nav: Nav) -> Option<ChunkId> {
        self.skip_prev(id, nav, |c| c.is_vbrace())
    }

    /// Next chunk of the given kind. `level` of `None` matches any
    /// nesting level.
    pub fn next_kind(
        &self,
        mut id: ChunkId,
        kind: TokenKind,
        level: Option<u32>,
        nav: Nav,
    ) -> Option<ChunkId> {
        loop {
            id = self.next(id, nav)?;
            let c = self.get(id);
            if c.kind == kind && level.map_or(true, |l| c.level == l) {
                return Some(id);
            }
        }
    }

    pub fn prev_kind(
        &self,
        mut id: ChunkId,
        kind: TokenKind,
        level: Option<u32>,
        nav: Nav,
    ) -> Option<ChunkId> {
        loop {
            id = self.prev(id, nav)?;
            let c = self.get(id);
            if c.kind == kind && level.map_or(true, |l| c.level == l) {
                return Some(id);
            }
        }
    }

    /// Find the closer matching an opener, at the opener's level.
    pub fn matching_close(&self, open: ChunkId, nav: Nav) -> Option<ChunkId> {
        let oc = self.get(open);
        let close_kind = oc.kind.matching_close()?;
        self.next_kind(open, close_kind, Some(oc.level), nav)
    }

    /// True when a newline chunk sits between the two chunks.
    pub fn newline_between(&self, start: ChunkId, end: ChunkId) -> bool {
        let mut id = start;
        while id != end {
            if self.get(id).is_newline() {
                return true;
            }
            match self.next(id, Nav::All) {
                Some(n) => id = n,
                None => return false,
            }
        }
        false
    }

    /// Iterate linked chunk ids head to tail.
    pub fn ids(&self) -> impl Iterator<Item = ChunkId> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let id = cur?;
            cur = self.raw_next(id);
            Some(id)
        })
    }

    /// Number of linked chunks.
    pub fn len(&self) -> usize {
        self.ids().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

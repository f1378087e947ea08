//! Lexical tokenization: UTF-8 bytes to the initial chunk list.

use crate::chars;
use crate::chunk::Chunk;
use crate::keywords::{self, KeywordTable};
use crate::lang::{self, LangFlags};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

/// Where the cursor is relative to a preprocessor directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PpState {
    /// Not on a directive line
    No,
    /// Just consumed the `#`, the next word names the directive
    DirectiveWord,
    /// Somewhere in the directive body
    Body,
}

struct Cursor<'a> {
    data: &'a [u8],
    idx: usize,
    /// 1-based position of the next byte
    line: u32,
    col: u32,
    pp: PpState,
    /// No token yet on the current line (a `#` here starts a directive)
    at_line_start: bool,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.data.get(self.idx).copied()
    }

    fn peek_at(&self, off: usize) -> Option<u8> {
        self.data.get(self.idx + off).copied()
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.idx..]
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.idx += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn in_preproc(&self) -> bool {
        self.pp != PpState::No
    }
}

/// Tokenize the decoded input into `state.chunks`. Every produced chunk
/// records its original line and column span.
pub fn tokenize(state: &mut FileState, data: &[u8], keywords: &KeywordTable) {
    let mut cur = Cursor {
        data,
        idx: 0,
        line: 1,
        col: 1,
        pp: PpState::No,
        at_line_start: true,
    };

    while cur.idx < data.len() {
        let b = cur.peek().unwrap_or(0);

        if chars::is_newline(b) {
            parse_newlines(state, &mut cur);
            continue;
        }
        if chars::is_space(b) {
            cur.bump();
            continue;
        }
        if b == b'\\' && is_line_continuation(&cur) {
            parse_line_continuation(state, &mut cur);
            continue;
        }
        if b == b'/' {
            match cur.peek_at(1) {
                Some(b'/') => {
                    parse_line_comment(state, &mut cur);
                    continue;
                }
                Some(b'*') => {
                    parse_block_comment(state, &mut cur);
                    continue;
                }
                _ => {}
            }
        }
        if chars::is_quote(b) {
            parse_string(state, &mut cur, b, true);
            continue;
        }
        if b == b'@' {
            if parse_at(state, &mut cur, keywords) {
                continue;
            }
        }
        if chars::is_digit(b)
            || (b == b'.' && cur.peek_at(1).map_or(false, chars::is_digit))
        {
            parse_number(state, &mut cur);
            continue;
        }
        if chars::is_word_start(b) {
            parse_word(state, &mut cur, keywords, 0);
            continue;
        }
        if b == b'#' && cur.at_line_start && cur.pp == PpState::No {
            let (line, col) = (cur.line, cur.col);
            cur.bump();
            cur.pp = PpState::DirectiveWord;
            emit(state, &mut cur, TokenKind::Preproc, "#", line, col, 0);
            continue;
        }
        if let Some((kind, len)) = keywords::find_punctuator(cur.rest(), state.lang) {
            let (line, col) = (cur.line, cur.col);
            let text = text_of(cur.rest(), len);
            for _ in 0..len {
                cur.bump();
            }
            emit(state, &mut cur, kind, &text, line, col, 0);
            continue;
        }

        // Unclassifiable byte; keep it so the stream round-trips.
        let (line, col) = (cur.line, cur.col);
        let text = text_of(cur.rest(), 1);
        cur.bump();
        emit(state, &mut cur, TokenKind::Junk, &text, line, col, 0);
    }
}

fn text_of(bytes: &[u8], len: usize) -> String {
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

/// A backslash counts as a line continuation when only whitespace
/// separates it from the newline.
fn is_line_continuation(cur: &Cursor) -> bool {
    let mut off = 1;
    while let Some(b) = cur.peek_at(off) {
        if chars::is_newline(b) {
            return true;
        }
        if !chars::is_space(b) {
            return false;
        }
        off += 1;
    }
    false
}

fn emit(
    state: &mut FileState,
    cur: &mut Cursor,
    kind: TokenKind,
    text: &str,
    line: u32,
    col: u32,
    nl_count: u32,
) {
    let mut flags = ChunkFlags::empty();
    if cur.in_preproc() || kind == TokenKind::Preproc {
        flags |= ChunkFlags::IN_PREPROC;
    }
    if is_punctuator_kind(kind) {
        flags |= ChunkFlags::PUNCTUATOR;
    }
    state.chunks.push_back(Chunk {
        kind,
        text: text.to_string(),
        orig_line: line,
        orig_col: col,
        orig_col_end: cur.col,
        flags,
        nl_count,
        ..Default::default()
    });
    if !matches!(kind, TokenKind::Newline | TokenKind::NlCont) {
        cur.at_line_start = false;
    }
}

fn is_punctuator_kind(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        BraceOpen | BraceClose | ParenOpen | ParenClose | SquareOpen | SquareClose
            | Semicolon | Comma | Colon | Question | Ellipsis | Assign | Arith | Amp
            | Star | Bool | Not | Inv | Compare | Shift | Incdec | Member | DcMember
            | Pound | Preproc
    )
}

fn parse_newlines(state: &mut FileState, cur: &mut Cursor) {
    let (line, col) = (cur.line, cur.col);
    let mut nl_count = 0u32;
    while let Some(b) = cur.peek() {
        if b == b'\r' {
            cur.bump();
            if cur.peek() == Some(b'\n') {
                cur.bump();
            } else {
                cur.line += 1;
                cur.col = 1;
            }
            nl_count += 1;
        } else if b == b'\n' {
            cur.bump();
            nl_count += 1;
        } else {
            break;
        }
        // A directive ends at the first unescaped newline; emit one
        // newline chunk per line so the boundary stays visible.
        if cur.in_preproc() {
            break;
        }
    }
    // The newline ends the directive, so the chunk itself is not part
    // of it.
    cur.pp = PpState::No;
    emit(state, cur, TokenKind::Newline, "", line, col, nl_count);
    cur.at_line_start = true;
}

fn parse_line_continuation(state: &mut FileState, cur: &mut Cursor) {
    let (line, col) = (cur.line, cur.col);
    cur.bump(); // the backslash
    while let Some(b) = cur.peek() {
        if chars::is_newline(b) {
            break;
        }
        cur.bump();
    }
    if cur.peek() == Some(b'\r') {
        cur.bump();
    }
    if cur.peek() == Some(b'\n') {
        cur.bump();
    }
    emit(state, cur, TokenKind::NlCont, "\\", line, col, 1);
}

fn parse_line_comment(state: &mut FileState, cur: &mut Cursor) {
    let (line, col) = (cur.line, cur.col);
    let start = cur.idx;
    while let Some(b) = cur.peek() {
        if chars::is_newline(b) {
            break;
        }
        cur.bump();
    }
    let text = text_of(&cur.data[start..], cur.idx - start);
    emit(state, cur, TokenKind::Comment, &text, line, col, 0);
}

fn parse_block_comment(state: &mut FileState, cur: &mut Cursor) {
    let (line, col) = (cur.line, cur.col);
    let start = cur.idx;
    let mut nl_count = 0u32;
    cur.bump();
    cur.bump(); // "/*"
    loop {
        match cur.peek() {
            None => break,
            Some(b'*') if cur.peek_at(1) == Some(b'/') => {
                cur.bump();
                cur.bump();
                break;
            }
            Some(b'\n') => {
                nl_count += 1;
                cur.bump();
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
    let text = text_of(&cur.data[start..], cur.idx - start);
    emit(state, cur, TokenKind::CommentMulti, &text, line, col, nl_count);
}

/// Parse a quoted literal. `escapes` is false for raw flavors.
fn parse_string(state: &mut FileState, cur: &mut Cursor, quote: u8, escapes: bool) {
    let (line, col) = (cur.line, cur.col);
    let start = cur.idx;
    let mut nl_count = 0u32;
    cur.bump(); // opening quote
    // backquoted D strings never process escapes
    let escapes = escapes && quote != b'`';
    while let Some(b) = cur.peek() {
        if b == b'\n' {
            nl_count += 1;
        }
        if escapes && b == b'\\' {
            cur.bump();
            if cur.peek() == Some(b'\n') {
                nl_count += 1;
            }
            cur.bump();
            continue;
        }
        cur.bump();
        if b == quote {
            break;
        }
    }
    let text = text_of(&cur.data[start..], cur.idx - start);
    emit(state, cur, TokenKind::String, &text, line, col, nl_count);
}

/// Verbatim string: no escapes, a doubled quote continues the literal.
fn parse_verbatim_string(state: &mut FileState, cur: &mut Cursor, line: u32, col: u32, start: usize) {
    let mut nl_count = 0u32;
    cur.bump(); // opening quote
    while let Some(b) = cur.peek() {
        if b == b'\n' {
            nl_count += 1;
        }
        cur.bump();
        if b == b'"' {
            if cur.peek() == Some(b'"') {
                cur.bump();
                continue;
            }
            break;
        }
    }
    let text = text_of(&cur.data[start..], cur.idx - start);
    emit(state, cur, TokenKind::String, &text, line, col, nl_count);
}

/// `@` sequences: Objective-C strings and keywords, Java/C#
/// annotations, C# verbatim strings. Returns false when the `@` is not
/// recognised here.
fn parse_at(state: &mut FileState, cur: &mut Cursor, keywords: &KeywordTable) -> bool {
    let lang = state.lang;
    let next = cur.peek_at(1);
    if next == Some(b'"')
        && (lang.contains(lang::LANG_OC) || lang.contains(lang::LANG_CS))
    {
        let (line, col) = (cur.line, cur.col);
        let start = cur.idx;
        cur.bump(); // '@'
        parse_verbatim_string(state, cur, line, col, start);
        return true;
    }
    if next.map_or(false, chars::is_word_start) {
        if lang.contains(lang::LANG_OC) {
            cur.bump(); // keep the '@' in the lexeme
            parse_word(state, cur, keywords, 1);
            return true;
        }
        if lang.contains(lang::LANG_JAVA) || lang.contains(lang::LANG_CS) {
            let (line, col) = (cur.line, cur.col);
            let start = cur.idx;
            cur.bump();
            while cur.peek().map_or(false, chars::is_word_cont) {
                cur.bump();
            }
            let text = text_of(&cur.data[start..], cur.idx - start);
            emit(state, cur, TokenKind::Annotation, &text, line, col, 0);
            return true;
        }
    }
    false
}

/// Parse an identifier (optionally with `prefix` bytes such as the OC
/// `@` already consumed) and resolve keywords.
fn parse_word(state: &mut FileState, cur: &mut Cursor, keywords: &KeywordTable, prefix: usize) {
    let start = cur.idx - prefix;
    let line = cur.line;
    let col = cur.col - prefix as u32;

    // D raw strings: r"..." takes the whole literal, no escapes
    if prefix == 0
        && cur.peek() == Some(b'r')
        && cur.peek_at(1) == Some(b'"')
        && state.lang.contains(lang::LANG_D)
    {
        cur.bump(); // the r
        parse_string(state, cur, b'"', false);
        let tail = state.chunks.tail().unwrap();
        let c = state.chunks.get_mut(tail);
        c.text.insert(0, 'r');
        c.orig_col = col;
        return;
    }

    while cur.peek().map_or(false, chars::is_word_cont) {
        cur.bump();
    }
    let text = text_of(&cur.data[start..], cur.idx - start);

    let (kind, keyword) = if cur.pp == PpState::DirectiveWord {
        cur.pp = PpState::Body;
        (keywords::find_directive(&text), true)
    } else {
        match keywords.find(&text, state.lang, cur.in_preproc()) {
            Some(k) => (k, true),
            None => (TokenKind::Word, false),
        }
    };
    emit(state, cur, kind, &text, line, col, 0);
    if keyword {
        let tail = state.chunks.tail().unwrap();
        state.chunks.get_mut(tail).flags |= ChunkFlags::KEYWORD;
    }
}

fn parse_number(state: &mut FileState, cur: &mut Cursor) {
    let (line, col) = (cur.line, cur.col);
    let start = cur.idx;

    if cur.peek() == Some(b'0')
        && matches!(cur.peek_at(1), Some(b'x') | Some(b'X'))
    {
        cur.bump();
        cur.bump();
        while cur
            .peek()
            .map_or(false, |b| chars::is_hex(b) || b == b'_')
        {
            cur.bump();
        }
    } else if cur.peek() == Some(b'0')
        && matches!(cur.peek_at(1), Some(b'b') | Some(b'B'))
        && cur.peek_at(2).map_or(false, |b| b == b'0' || b == b'1')
    {
        cur.bump();
        cur.bump();
        while matches!(cur.peek(), Some(b'0') | Some(b'1') | Some(b'_')) {
            cur.bump();
        }
    } else {
        while cur
            .peek()
            .map_or(false, |b| chars::is_digit(b) || b == b'_')
        {
            cur.bump();
        }
        if cur.peek() == Some(b'.') && cur.peek_at(1).map_or(false, chars::is_digit) {
            cur.bump();
            while cur
                .peek()
                .map_or(false, |b| chars::is_digit(b) || b == b'_')
            {
                cur.bump();
            }
        }
        if matches!(cur.peek(), Some(b'e') | Some(b'E'))
            && (cur.peek_at(1).map_or(false, chars::is_digit)
                || (matches!(cur.peek_at(1), Some(b'+') | Some(b'-'))
                    && cur.peek_at(2).map_or(false, chars::is_digit)))
        {
            cur.bump(); // e
            if matches!(cur.peek(), Some(b'+') | Some(b'-')) {
                cur.bump();
            }
            while cur.peek().map_or(false, chars::is_digit) {
                cur.bump();
            }
        }
    }
    // type suffixes: uUlLfF and friends
    while cur.peek().map_or(false, |b| b.is_ascii_alphabetic()) {
        cur.bump();
    }

    let text = text_of(&cur.data[start..], cur.idx - start);
    emit(state, cur, TokenKind::Number, &text, line, col, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{LANG_C, LANG_CPP, LANG_JAVA, LANG_OC};
    use crate::pipeline::FileState;
    use crate::token::TokenKind::*;

    fn lex(src: &str, lang: LangFlags) -> FileState {
        let mut state = FileState::new(lang);
        let keywords = KeywordTable::new();
        tokenize(&mut state, src.as_bytes(), &keywords);
        state
    }

    fn kinds(state: &FileState) -> Vec<TokenKind> {
        state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id).kind)
            .collect()
    }

    fn texts(state: &FileState) -> Vec<std::string::String> {
        state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id).text.clone())
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        let state = lex("int x = 42;\n", LANG_C);
        assert_eq!(
            kinds(&state),
            vec![Type, Word, Assign, Number, Semicolon, Newline]
        );
        assert_eq!(texts(&state), vec!["int", "x", "=", "42", ";", ""]);
    }

    #[test]
    fn test_positions_are_one_based() {
        let state = lex("int x;\nchar y;\n", LANG_C);
        let chunks: Vec<_> = state.chunks.ids().map(|id| state.chunks.get(id)).collect();
        assert_eq!((chunks[0].orig_line, chunks[0].orig_col), (1, 1));
        assert_eq!(chunks[0].orig_col_end, 4);
        assert_eq!((chunks[1].orig_line, chunks[1].orig_col), (1, 5));
        // "char" starts line 2
        assert_eq!((chunks[4].orig_line, chunks[4].orig_col), (2, 1));
    }

    #[test]
    fn test_comments() {
        let state = lex("a // line\n/* multi\nline */ b\n", LANG_C);
        let ks = kinds(&state);
        assert_eq!(
            ks,
            vec![Word, Comment, Newline, CommentMulti, Word, Newline]
        );
        let texts = texts(&state);
        assert_eq!(texts[1], "// line");
        assert_eq!(texts[3], "/* multi\nline */");
        // the block comment records its embedded newline
        let multi = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.kind == CommentMulti)
            .unwrap();
        assert_eq!(multi.nl_count, 1);
    }

    #[test]
    fn test_strings_and_escapes() {
        let state = lex(r#"s = "a\"b"; c = 'x';"#, LANG_C);
        let texts = texts(&state);
        assert_eq!(texts[2], r#""a\"b""#);
        assert_eq!(texts[6], "'x'");
    }

    #[test]
    fn test_numbers() {
        let state = lex("0x1F 0b101 1.5e-3 42UL 7", LANG_C);
        assert_eq!(kinds(&state), vec![Number; 5]);
        assert_eq!(texts(&state), vec!["0x1F", "0b101", "1.5e-3", "42UL", "7"]);
    }

    #[test]
    fn test_keywords_and_flags() {
        let state = lex("if (x) return;", LANG_C);
        assert_eq!(
            kinds(&state),
            vec![If, ParenOpen, Word, ParenClose, Return, Semicolon]
        );
        let first = state.chunks.get(state.chunks.head().unwrap());
        assert!(first.flags.contains(ChunkFlags::KEYWORD));
    }

    #[test]
    fn test_preproc_line() {
        let state = lex("#define MAX 10\nint x;\n", LANG_C);
        let ks = kinds(&state);
        assert_eq!(
            ks,
            vec![Preproc, PpDefine, Word, Number, Newline, Type, Word, Semicolon, Newline]
        );
        let chunks: Vec<_> = state.chunks.ids().map(|id| state.chunks.get(id)).collect();
        for c in &chunks[..4] {
            assert!(c.flags.contains(ChunkFlags::IN_PREPROC), "{:?}", c.kind);
        }
        // the terminating newline and following code are not in the directive
        for c in &chunks[4..] {
            assert!(!c.flags.contains(ChunkFlags::IN_PREPROC), "{:?}", c.kind);
        }
    }

    #[test]
    fn test_preproc_continuation() {
        let state = lex("#define M(a) \\\n  (a)\nx;\n", LANG_C);
        let ks = kinds(&state);
        let nl_cont_pos = ks.iter().position(|k| *k == NlCont).unwrap();
        // chunks after the continuation are still inside the directive
        let after: Vec<_> = state.chunks.ids().skip(nl_cont_pos + 1).collect();
        let paren = state.chunks.get(after[0]);
        assert_eq!(paren.kind, ParenOpen);
        assert!(paren.flags.contains(ChunkFlags::IN_PREPROC));
        // the `x` on the next real line is not
        let x = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.text == "x")
            .unwrap();
        assert!(!x.flags.contains(ChunkFlags::IN_PREPROC));
    }

    #[test]
    fn test_hash_mid_line_is_not_preproc() {
        let state = lex("a # b\n", LANG_C);
        assert_eq!(kinds(&state), vec![Word, Pound, Word, Newline]);
    }

    #[test]
    fn test_pp_directive_word_kinds() {
        let state = lex("#ifdef A\n#else\n#endif\n", LANG_C);
        let ks = kinds(&state);
        assert_eq!(
            ks,
            vec![Preproc, PpIf, Word, Newline, Preproc, PpElse, Newline, Preproc, PpEndif, Newline]
        );
    }

    #[test]
    fn test_if_in_macro_body_is_not_directive() {
        let state = lex("#define M if (1)\n", LANG_C);
        let ks = kinds(&state);
        assert_eq!(
            ks,
            vec![Preproc, PpDefine, Word, If, ParenOpen, Number, ParenClose, Newline]
        );
    }

    #[test]
    fn test_dc_member() {
        let state = lex("a::b", LANG_CPP);
        assert_eq!(kinds(&state), vec![Word, DcMember, Word]);
    }

    #[test]
    fn test_annotations() {
        let state = lex("@Override void f()", LANG_JAVA);
        assert_eq!(
            kinds(&state),
            vec![Annotation, Type, Word, ParenOpen, ParenClose]
        );
        assert_eq!(texts(&state)[0], "@Override");
    }

    #[test]
    fn test_oc_at_keywords_and_strings() {
        let state = lex("@interface Foo\ns = @\"hi\";", LANG_OC);
        let ks = kinds(&state);
        assert_eq!(ks[0], Class);
        assert_eq!(texts(&state)[0], "@interface");
        let s = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.kind == String)
            .unwrap();
        assert_eq!(s.text, "@\"hi\"");
    }

    #[test]
    fn test_d_raw_string() {
        let state = lex(r#"s = r"a\b";"#, crate::lang::LANG_D);
        let s = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.kind == String)
            .unwrap();
        assert_eq!(s.text, r#"r"a\b""#);
    }

    #[test]
    fn test_non_ascii_identifier_stays_single_word() {
        let state = lex("caf\u{e9} = 1;", LANG_C);
        assert_eq!(kinds(&state), vec![Word, Assign, Number, Semicolon]);
        assert_eq!(texts(&state)[0], "caf\u{e9}");
    }

    #[test]
    fn test_newline_run_coalesces() {
        let state = lex("a\n\n\nb", LANG_C);
        assert_eq!(kinds(&state), vec![Word, Newline, Word]);
        let nl = state
            .chunks
            .ids()
            .map(|id| state.chunks.get(id))
            .find(|c| c.kind == Newline)
            .unwrap();
        assert_eq!(nl.nl_count, 3);
    }
}

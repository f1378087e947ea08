//! Keyword and punctuator tables, keyed by language mask.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::lang::{self, LangFlags, FLAG_PP};
use crate::token::TokenKind;

/// How a statement keyword shapes the code that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternClass {
    None,
    /// keyword + braced stmt: do, try, finally
    Braced,
    /// keyword + parens + braced stmt: switch, if, for, while
    PBraced,
    /// keyword + optional parens + braced stmt: catch, version
    OpBraced,
    /// keyword + value + braced stmt: namespace
    VBraced,
    /// Special case of Braced for `if` chains
    Else,
}

/// The pattern class is a property of the token kind.
pub fn pattern_class(kind: TokenKind) -> PatternClass {
    match kind {
        K::If | K::For | K::While | K::Switch => PatternClass::PBraced,
        K::Do | K::Try | K::Finally => PatternClass::Braced,
        K::Catch => PatternClass::OpBraced,
        K::Namespace => PatternClass::VBraced,
        K::Else => PatternClass::Else,
        _ => PatternClass::None,
    }
}

struct KeywordEntry {
    text: &'static str,
    kind: TokenKind,
    lang: u16,
}

const C: u16 = lang::LANG_C.0;
const CPP: u16 = lang::LANG_CPP.0;
const D: u16 = lang::LANG_D.0;
const CS: u16 = lang::LANG_CS.0;
const JAVA: u16 = lang::LANG_JAVA.0;
const OC: u16 = lang::LANG_OC.0;
const VALA: u16 = lang::LANG_VALA.0;
const PAWN: u16 = lang::LANG_PAWN.0;
const ECMA: u16 = lang::LANG_ECMA.0;
const ALL: u16 = lang::LANG_ALL.0;
const ALLC: u16 = lang::LANG_ALLC.0;

use TokenKind as K;

#[rustfmt::skip]
static KEYWORDS: &[KeywordEntry] = &[
    KeywordEntry { text: "@catch",         kind: K::Catch,      lang: OC },
    KeywordEntry { text: "@class",         kind: K::Class,      lang: OC },
    KeywordEntry { text: "@dynamic",       kind: K::Qualifier,  lang: OC },
    KeywordEntry { text: "@encode",        kind: K::Sizeof,     lang: OC },
    KeywordEntry { text: "@end",           kind: K::OcEnd,      lang: OC },
    KeywordEntry { text: "@finally",       kind: K::Finally,    lang: OC },
    KeywordEntry { text: "@implementation", kind: K::Class,     lang: OC },
    KeywordEntry { text: "@interface",     kind: K::Class,      lang: OC },
    KeywordEntry { text: "@private",       kind: K::Private,    lang: OC },
    KeywordEntry { text: "@property",      kind: K::Qualifier,  lang: OC },
    KeywordEntry { text: "@protected",     kind: K::Private,    lang: OC },
    KeywordEntry { text: "@protocol",      kind: K::Class,      lang: OC },
    KeywordEntry { text: "@public",        kind: K::Private,    lang: OC },
    KeywordEntry { text: "@selector",      kind: K::Sizeof,     lang: OC },
    KeywordEntry { text: "@synthesize",    kind: K::Qualifier,  lang: OC },
    KeywordEntry { text: "@throw",         kind: K::Throw,      lang: OC },
    KeywordEntry { text: "@try",           kind: K::Try,        lang: OC },
    KeywordEntry { text: "BOOL",           kind: K::Type,       lang: OC },
    KeywordEntry { text: "IMP",            kind: K::Type,       lang: OC },
    KeywordEntry { text: "SEL",            kind: K::Type,       lang: OC },
    KeywordEntry { text: "_Bool",          kind: K::Type,       lang: C },
    KeywordEntry { text: "_Complex",       kind: K::Type,       lang: C },
    KeywordEntry { text: "__gshared",      kind: K::Qualifier,  lang: D },
    KeywordEntry { text: "abstract",       kind: K::Qualifier,  lang: CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "alias",          kind: K::Typedef,    lang: D },
    KeywordEntry { text: "assert",         kind: K::Sizeof,     lang: D | JAVA },
    KeywordEntry { text: "auto",           kind: K::Qualifier,  lang: C | CPP | D },
    KeywordEntry { text: "bool",           kind: K::Type,       lang: CPP | CS | D | VALA | PAWN },
    KeywordEntry { text: "boolean",        kind: K::Type,       lang: JAVA | ECMA },
    KeywordEntry { text: "break",          kind: K::Break,      lang: ALL },
    KeywordEntry { text: "byte",           kind: K::Type,       lang: CS | D | JAVA | ECMA },
    KeywordEntry { text: "case",           kind: K::Case,       lang: ALL },
    KeywordEntry { text: "cast",           kind: K::Sizeof,     lang: D },
    KeywordEntry { text: "catch",          kind: K::Catch,      lang: CPP | CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "cdouble",        kind: K::Type,       lang: D },
    KeywordEntry { text: "cent",           kind: K::Type,       lang: D },
    KeywordEntry { text: "cfloat",         kind: K::Type,       lang: D },
    KeywordEntry { text: "char",           kind: K::Type,       lang: ALLC | PAWN },
    KeywordEntry { text: "class",          kind: K::Class,      lang: CPP | CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "const",          kind: K::Qualifier,  lang: ALL },
    KeywordEntry { text: "constexpr",      kind: K::Qualifier,  lang: CPP },
    KeywordEntry { text: "continue",       kind: K::Continue,   lang: ALL },
    KeywordEntry { text: "creal",          kind: K::Type,       lang: D },
    KeywordEntry { text: "dchar",          kind: K::Type,       lang: D },
    KeywordEntry { text: "debug",          kind: K::Catch,      lang: D },
    KeywordEntry { text: "decimal",        kind: K::Type,       lang: CS },
    KeywordEntry { text: "decl",           kind: K::Qualifier,  lang: PAWN },
    KeywordEntry { text: "default",        kind: K::Default,    lang: ALL },
    KeywordEntry { text: "defined",        kind: K::PpDefined,  lang: ALLC | FLAG_PP },
    KeywordEntry { text: "delegate",       kind: K::Type,       lang: CS | D | VALA },
    KeywordEntry { text: "delete",         kind: K::Delete,     lang: CPP | D | ECMA | VALA },
    KeywordEntry { text: "do",             kind: K::Do,         lang: ALL },
    KeywordEntry { text: "double",         kind: K::Type,       lang: ALLC | ECMA },
    KeywordEntry { text: "else",           kind: K::Else,       lang: ALL },
    KeywordEntry { text: "enum",           kind: K::Enum,       lang: ALLC | PAWN },
    KeywordEntry { text: "event",          kind: K::Qualifier,  lang: CS },
    KeywordEntry { text: "explicit",       kind: K::Qualifier,  lang: CPP | CS },
    KeywordEntry { text: "extends",        kind: K::Qualifier,  lang: JAVA | ECMA },
    KeywordEntry { text: "extern",         kind: K::Extern,     lang: C | CPP | CS | D | VALA },
    KeywordEntry { text: "final",          kind: K::Qualifier,  lang: CPP | D | JAVA | ECMA },
    KeywordEntry { text: "finally",        kind: K::Finally,    lang: CS | D | JAVA | ECMA },
    KeywordEntry { text: "float",          kind: K::Type,       lang: ALLC | PAWN | ECMA },
    KeywordEntry { text: "for",            kind: K::For,        lang: ALL },
    KeywordEntry { text: "foreach",        kind: K::For,        lang: CS | D | VALA },
    KeywordEntry { text: "foreach_reverse", kind: K::For,       lang: D },
    KeywordEntry { text: "forward",        kind: K::Qualifier,  lang: PAWN },
    KeywordEntry { text: "friend",         kind: K::Friend,     lang: CPP },
    KeywordEntry { text: "function",       kind: K::Type,       lang: D | ECMA },
    KeywordEntry { text: "goto",           kind: K::Goto,       lang: ALLC },
    KeywordEntry { text: "id",             kind: K::Type,       lang: OC },
    KeywordEntry { text: "idouble",        kind: K::Type,       lang: D },
    KeywordEntry { text: "ifloat",         kind: K::Type,       lang: D },
    KeywordEntry { text: "immutable",      kind: K::Qualifier,  lang: D },
    KeywordEntry { text: "implements",     kind: K::Qualifier,  lang: JAVA | ECMA },
    KeywordEntry { text: "import",         kind: K::Using,      lang: D | JAVA | OC | ECMA },
    KeywordEntry { text: "inline",         kind: K::Qualifier,  lang: C | CPP },
    KeywordEntry { text: "instanceof",     kind: K::Sizeof,     lang: JAVA | ECMA },
    KeywordEntry { text: "interface",      kind: K::Class,      lang: CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "internal",       kind: K::Private,    lang: CS | VALA },
    KeywordEntry { text: "invariant",      kind: K::Qualifier,  lang: D },
    KeywordEntry { text: "ireal",          kind: K::Type,       lang: D },
    KeywordEntry { text: "lock",           kind: K::While,      lang: CS | VALA },
    KeywordEntry { text: "long",           kind: K::Type,       lang: ALLC | ECMA },
    KeywordEntry { text: "mixin",          kind: K::Sizeof,     lang: D },
    KeywordEntry { text: "module",         kind: K::Using,      lang: D },
    KeywordEntry { text: "mutable",        kind: K::Qualifier,  lang: CPP },
    KeywordEntry { text: "namespace",      kind: K::Namespace,  lang: CPP | CS | D | VALA },
    KeywordEntry { text: "native",         kind: K::Qualifier,  lang: JAVA | PAWN | ECMA },
    KeywordEntry { text: "new",            kind: K::New,        lang: CPP | CS | D | JAVA | VALA | ECMA },
    // Pawn's `new` introduces a variable declaration
    KeywordEntry { text: "new",            kind: K::Qualifier,  lang: PAWN },
    KeywordEntry { text: "nothrow",        kind: K::Qualifier,  lang: D },
    KeywordEntry { text: "object",         kind: K::Type,       lang: CS },
    KeywordEntry { text: "operator",       kind: K::Operator,   lang: CPP | CS },
    KeywordEntry { text: "out",            kind: K::Qualifier,  lang: CS | D | VALA },
    KeywordEntry { text: "override",       kind: K::Qualifier,  lang: CS | D | VALA },
    KeywordEntry { text: "package",        kind: K::Using,      lang: D | JAVA | ECMA },
    KeywordEntry { text: "private",        kind: K::Private,    lang: CPP | CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "protected",      kind: K::Private,    lang: CPP | CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "public",         kind: K::Private,    lang: CPP | CS | D | JAVA | PAWN | VALA | ECMA },
    KeywordEntry { text: "pure",           kind: K::Qualifier,  lang: D },
    KeywordEntry { text: "readonly",       kind: K::Qualifier,  lang: CS },
    KeywordEntry { text: "real",           kind: K::Type,       lang: D },
    KeywordEntry { text: "ref",            kind: K::Qualifier,  lang: CS | D | VALA },
    KeywordEntry { text: "register",       kind: K::Qualifier,  lang: C | CPP },
    KeywordEntry { text: "restrict",       kind: K::Qualifier,  lang: C },
    KeywordEntry { text: "return",         kind: K::Return,     lang: ALL },
    KeywordEntry { text: "sbyte",          kind: K::Type,       lang: CS },
    KeywordEntry { text: "sealed",         kind: K::Qualifier,  lang: CS },
    KeywordEntry { text: "short",          kind: K::Type,       lang: ALLC },
    KeywordEntry { text: "signed",         kind: K::Type,       lang: C | CPP },
    KeywordEntry { text: "sizeof",         kind: K::Sizeof,     lang: C | CPP | CS | D | PAWN | VALA },
    KeywordEntry { text: "static",         kind: K::Qualifier,  lang: ALL },
    KeywordEntry { text: "stock",          kind: K::Qualifier,  lang: PAWN },
    KeywordEntry { text: "strictfp",       kind: K::Qualifier,  lang: JAVA },
    KeywordEntry { text: "string",         kind: K::Type,       lang: CS | D | VALA },
    KeywordEntry { text: "struct",         kind: K::Struct,     lang: C | CPP | CS | D | VALA },
    KeywordEntry { text: "switch",         kind: K::Switch,     lang: ALL },
    KeywordEntry { text: "synchronized",   kind: K::While,      lang: D | JAVA | ECMA },
    KeywordEntry { text: "template",       kind: K::Template,   lang: CPP | D },
    KeywordEntry { text: "throw",          kind: K::Throw,      lang: CPP | CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "throws",         kind: K::Qualifier,  lang: JAVA | ECMA },
    KeywordEntry { text: "transient",      kind: K::Qualifier,  lang: JAVA | ECMA },
    KeywordEntry { text: "try",            kind: K::Try,        lang: CPP | CS | D | JAVA | VALA | ECMA },
    KeywordEntry { text: "typedef",        kind: K::Typedef,    lang: C | CPP | D | OC },
    KeywordEntry { text: "typename",       kind: K::Qualifier,  lang: CPP },
    KeywordEntry { text: "typeof",         kind: K::Sizeof,     lang: C | CPP | CS | D | VALA | ECMA },
    KeywordEntry { text: "ubyte",          kind: K::Type,       lang: D },
    KeywordEntry { text: "ucent",          kind: K::Type,       lang: D },
    KeywordEntry { text: "uint",           kind: K::Type,       lang: CS | D | VALA },
    KeywordEntry { text: "ulong",          kind: K::Type,       lang: CS | D | VALA },
    KeywordEntry { text: "union",          kind: K::Union,      lang: C | CPP | D },
    KeywordEntry { text: "unittest",       kind: K::Try,        lang: D },
    KeywordEntry { text: "unsafe",         kind: K::Qualifier,  lang: CS },
    KeywordEntry { text: "unsigned",       kind: K::Type,       lang: C | CPP },
    KeywordEntry { text: "ushort",         kind: K::Type,       lang: CS | D | VALA },
    KeywordEntry { text: "using",          kind: K::Using,      lang: CPP | CS | VALA },
    KeywordEntry { text: "var",            kind: K::Type,       lang: CS | VALA | ECMA },
    KeywordEntry { text: "version",        kind: K::Catch,      lang: D },
    KeywordEntry { text: "virtual",        kind: K::Qualifier,  lang: CPP | CS | VALA },
    KeywordEntry { text: "void",           kind: K::Type,       lang: ALL },
    KeywordEntry { text: "volatile",       kind: K::Qualifier,  lang: C | CPP | CS | JAVA | ECMA },
    KeywordEntry { text: "wchar",          kind: K::Type,       lang: D },
    KeywordEntry { text: "wchar_t",        kind: K::Type,       lang: C | CPP },
    KeywordEntry { text: "while",          kind: K::While,      lang: ALL },
];

static KEYWORD_MAP: Lazy<HashMap<&'static str, Vec<&'static KeywordEntry>>> =
    Lazy::new(|| {
        let mut map: HashMap<&'static str, Vec<&'static KeywordEntry>> = HashMap::new();
        for entry in KEYWORDS {
            map.entry(entry.text).or_default().push(entry);
        }
        map
    });

/// Preprocessor directive words, looked up for the token immediately
/// following a `#`.
pub fn find_directive(word: &str) -> TokenKind {
    match word {
        "if" | "ifdef" | "ifndef" => K::PpIf,
        "else" | "elif" => K::PpElse,
        "endif" => K::PpEndif,
        "define" => K::PpDefine,
        "include" | "import" => K::PpInclude,
        "undef" => K::PpUndef,
        _ => K::PpOther,
    }
}

/// Keyword table: the static language tables plus identifiers
/// registered at runtime through `-t` type files.
#[derive(Debug, Default)]
pub struct KeywordTable {
    extra_types: HashMap<String, TokenKind>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identifier that should tokenize as a type name in
    /// every language.
    pub fn add_type(&mut self, name: impl Into<String>) {
        self.extra_types.insert(name.into(), TokenKind::Type);
    }

    pub fn extra_len(&self) -> usize {
        self.extra_types.len()
    }

    /// Resolve a word to its keyword kind, or `None` for a plain
    /// identifier. Preprocessor-only entries match only when
    /// `in_preproc` holds.
    pub fn find(&self, word: &str, lang: LangFlags, in_preproc: bool) -> Option<TokenKind> {
        if let Some(kind) = self.extra_types.get(word) {
            return Some(*kind);
        }
        let entries = KEYWORD_MAP.get(word)?;
        for entry in entries {
            if (entry.lang & FLAG_PP) != 0 && !in_preproc {
                continue;
            }
            if (entry.lang & lang.0) != 0 {
                return Some(entry.kind);
            }
        }
        None
    }
}

/// Longest-prefix punctuator match. Returns the kind and byte length.
pub fn find_punctuator(bytes: &[u8], lang: LangFlags) -> Option<(TokenKind, usize)> {
    let ecma_like = lang.contains(lang::LANG_JAVA) || lang.contains(lang::LANG_ECMA);
    if bytes.len() >= 4 && &bytes[..4] == b">>>=" && ecma_like {
        return Some((K::Assign, 4));
    }
    if bytes.len() >= 3 {
        match &bytes[..3] {
            b"<<=" | b">>=" => return Some((K::Assign, 3)),
            b"..." => return Some((K::Ellipsis, 3)),
            b"->*" => return Some((K::Member, 3)),
            b">>>" if ecma_like => return Some((K::Shift, 3)),
            b"===" | b"!==" if ecma_like => return Some((K::Compare, 3)),
            _ => {}
        }
    }
    if bytes.len() >= 2 {
        match &bytes[..2] {
            b"<<" | b">>" => return Some((K::Shift, 2)),
            b"<=" | b">=" | b"==" | b"!=" => return Some((K::Compare, 2)),
            b"&&" | b"||" => return Some((K::Bool, 2)),
            b"++" | b"--" => return Some((K::Incdec, 2)),
            b"+=" | b"-=" | b"*=" | b"/=" | b"%=" | b"&=" | b"|=" | b"^=" => {
                return Some((K::Assign, 2))
            }
            b"->" => return Some((K::Member, 2)),
            b"::" => return Some((K::DcMember, 2)),
            b"##" => return Some((K::Pound, 2)),
            _ => {}
        }
    }
    let kind = match bytes.first()? {
        b'{' => K::BraceOpen,
        b'}' => K::BraceClose,
        b'(' => K::ParenOpen,
        b')' => K::ParenClose,
        b'[' => K::SquareOpen,
        b']' => K::SquareClose,
        b';' => K::Semicolon,
        b',' => K::Comma,
        b':' => K::Colon,
        b'?' => K::Question,
        b'.' => K::Member,
        b'=' => K::Assign,
        b'+' | b'-' | b'/' | b'%' | b'^' | b'|' => K::Arith,
        b'*' => K::Star,
        b'&' => K::Amp,
        b'!' => K::Not,
        b'~' => K::Inv,
        b'<' | b'>' => K::Compare,
        b'#' => K::Pound,
        _ => return None,
    };
    Some((kind, 1))
}

use bitflags::bitflags;

/// Token kinds assigned to chunks. Opener/closer pairs are declared
/// adjacently and matched through [`TokenKind::matching_close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum TokenKind {
    #[default]
    None,
    /// Unclassifiable byte run, kept only for round-tripping
    Junk,

    Newline,
    /// Backslash-newline inside a preprocessor directive
    NlCont,
    Comment,
    CommentMulti,

    Word,
    Number,
    String,
    /// A type name: built-in, user-registered, or resolved by the
    /// symbol passes
    Type,

    BraceOpen,
    BraceClose,
    VbraceOpen,
    VbraceClose,
    ParenOpen,
    ParenClose,
    /// Statement parens: `if (`, `while (`, ...
    SparenOpen,
    SparenClose,
    /// Function parens: `name(`
    FparenOpen,
    FparenClose,
    SquareOpen,
    SquareClose,
    AngleOpen,
    AngleClose,
    /// `[]` fused pair
    Tsquare,

    Semicolon,
    /// Virtual semicolon inserted by the Pawn prescan
    VSemicolon,
    Comma,
    Colon,
    CaseColon,
    LabelColon,
    PrivateColon,
    ClassColon,
    /// The `:` of a ternary expression
    CondColon,
    /// Struct bit-field `:`
    BitColon,
    Question,
    Ellipsis,

    Assign,
    Arith,
    /// `&`, position dependent
    Amp,
    /// `*`, position dependent
    Star,
    /// `&&` and `||`
    Bool,
    Not,
    /// `~`
    Inv,
    Compare,
    Shift,
    Incdec,
    /// `.` and `->`
    Member,
    /// `::`
    DcMember,
    /// `#` and `##` inside a macro body
    Pound,

    /// The `#` that introduces a directive
    Preproc,
    PpIf,
    PpElse,
    PpEndif,
    PpDefine,
    PpInclude,
    PpUndef,
    PpOther,
    /// The `defined` operator inside a `#if` condition
    PpDefined,

    Macro,
    MacroFunc,

    FuncDef,
    FuncProto,
    FuncCall,
    /// Constructor or destructor
    FuncClass,
    /// Function (pointer) type name from a typedef
    FuncType,
    /// Function-pointer variable
    FuncVar,
    /// `Type name(args);` constructor-style variable
    FuncCtorVar,

    /// Statement label name
    Label,
    /// `@Name` annotation (Java, C#)
    Annotation,
    /// Objective-C `@end`
    OcEnd,

    If,
    Else,
    For,
    While,
    /// The `while` that terminates a do-loop
    WhileOfDo,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Goto,
    Throw,
    Try,
    Catch,
    Finally,
    Sizeof,
    New,
    Delete,
    Operator,

    Struct,
    Union,
    Enum,
    Class,
    Namespace,
    Typedef,
    Template,
    Using,
    Friend,
    /// `const`, `volatile`, `inline`, `static`, ...
    Qualifier,
    Extern,
    /// Access specifier keyword: `public`, `private`, `protected`
    Private,
}

impl TokenKind {
    /// The closing kind paired with an opening kind, if any.
    pub fn matching_close(self) -> Option<TokenKind> {
        match self {
            TokenKind::BraceOpen => Some(TokenKind::BraceClose),
            TokenKind::VbraceOpen => Some(TokenKind::VbraceClose),
            TokenKind::ParenOpen => Some(TokenKind::ParenClose),
            TokenKind::SparenOpen => Some(TokenKind::SparenClose),
            TokenKind::FparenOpen => Some(TokenKind::FparenClose),
            TokenKind::SquareOpen => Some(TokenKind::SquareClose),
            TokenKind::AngleOpen => Some(TokenKind::AngleClose),
            _ => None,
        }
    }

    pub fn is_opening(self) -> bool {
        self.matching_close().is_some()
    }

    pub fn is_closing(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            BraceClose | VbraceClose | ParenClose | SparenClose | FparenClose
                | SquareClose | AngleClose
        )
    }

    /// For a closer, the paren family it belongs to (any of the three
    /// paren kinds map to `ParenClose`).
    pub fn is_paren_close(self) -> bool {
        use TokenKind::*;
        matches!(self, ParenClose | SparenClose | FparenClose)
    }

    pub fn is_paren_open(self) -> bool {
        use TokenKind::*;
        matches!(self, ParenOpen | SparenOpen | FparenOpen)
    }

    /// Preprocessor directive kinds (the word after `#`)
    pub fn is_pp_directive(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            PpIf | PpElse | PpEndif | PpDefine | PpInclude | PpUndef | PpOther
        )
    }

    /// Name used by the token dump and by `-t` file diagnostics.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            None => "NONE",
            Junk => "JUNK",
            Newline => "NEWLINE",
            NlCont => "NL_CONT",
            Comment => "COMMENT",
            CommentMulti => "COMMENT_MULTI",
            Word => "WORD",
            Number => "NUMBER",
            String => "STRING",
            Type => "TYPE",
            BraceOpen => "BRACE_OPEN",
            BraceClose => "BRACE_CLOSE",
            VbraceOpen => "VBRACE_OPEN",
            VbraceClose => "VBRACE_CLOSE",
            ParenOpen => "PAREN_OPEN",
            ParenClose => "PAREN_CLOSE",
            SparenOpen => "SPAREN_OPEN",
            SparenClose => "SPAREN_CLOSE",
            FparenOpen => "FPAREN_OPEN",
            FparenClose => "FPAREN_CLOSE",
            SquareOpen => "SQUARE_OPEN",
            SquareClose => "SQUARE_CLOSE",
            AngleOpen => "ANGLE_OPEN",
            AngleClose => "ANGLE_CLOSE",
            Tsquare => "TSQUARE",
            Semicolon => "SEMICOLON",
            VSemicolon => "VSEMICOLON",
            Comma => "COMMA",
            Colon => "COLON",
            CaseColon => "CASE_COLON",
            LabelColon => "LABEL_COLON",
            PrivateColon => "PRIVATE_COLON",
            ClassColon => "CLASS_COLON",
            CondColon => "COND_COLON",
            BitColon => "BIT_COLON",
            Question => "QUESTION",
            Ellipsis => "ELLIPSIS",
            Assign => "ASSIGN",
            Arith => "ARITH",
            Amp => "AMP",
            Star => "STAR",
            Bool => "BOOL",
            Not => "NOT",
            Inv => "INV",
            Compare => "COMPARE",
            Shift => "SHIFT",
            Incdec => "INCDEC",
            Member => "MEMBER",
            DcMember => "DC_MEMBER",
            Pound => "POUND",
            Preproc => "PREPROC",
            PpIf => "PP_IF",
            PpElse => "PP_ELSE",
            PpEndif => "PP_ENDIF",
            PpDefine => "PP_DEFINE",
            PpInclude => "PP_INCLUDE",
            PpUndef => "PP_UNDEF",
            PpOther => "PP_OTHER",
            PpDefined => "PP_DEFINED",
            Macro => "MACRO",
            MacroFunc => "MACRO_FUNC",
            FuncDef => "FUNC_DEF",
            FuncProto => "FUNC_PROTO",
            FuncCall => "FUNC_CALL",
            FuncClass => "FUNC_CLASS",
            FuncType => "FUNC_TYPE",
            FuncVar => "FUNC_VAR",
            FuncCtorVar => "FUNC_CTOR_VAR",
            Label => "LABEL",
            Annotation => "ANNOTATION",
            OcEnd => "OC_END",
            If => "IF",
            Else => "ELSE",
            For => "FOR",
            While => "WHILE",
            WhileOfDo => "WHILE_OF_DO",
            Do => "DO",
            Switch => "SWITCH",
            Case => "CASE",
            Default => "DEFAULT",
            Break => "BREAK",
            Continue => "CONTINUE",
            Return => "RETURN",
            Goto => "GOTO",
            Throw => "THROW",
            Try => "TRY",
            Catch => "CATCH",
            Finally => "FINALLY",
            Sizeof => "SIZEOF",
            New => "NEW",
            Delete => "DELETE",
            Operator => "OPERATOR",
            Struct => "STRUCT",
            Union => "UNION",
            Enum => "ENUM",
            Class => "CLASS",
            Namespace => "NAMESPACE",
            Typedef => "TYPEDEF",
            Template => "TEMPLATE",
            Using => "USING",
            Friend => "FRIEND",
            Qualifier => "QUALIFIER",
            Extern => "EXTERN",
            Private => "PRIVATE",
        }
    }
}

bitflags! {
    /// Per-chunk property bits. The low 16 bits are region flags copied
    /// onto chunks inserted in the same context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChunkFlags: u64 {
        const IN_PREPROC      = 1 << 0;
        const IN_STRUCT       = 1 << 1;
        const IN_ENUM         = 1 << 2;
        const IN_FCN_DEF      = 1 << 3;
        const IN_FCN_CALL     = 1 << 4;
        const IN_SPAREN       = 1 << 5;
        const IN_TEMPLATE     = 1 << 6;
        const IN_TYPEDEF      = 1 << 7;
        const IN_CONST_ARGS   = 1 << 8;
        const IN_ARRAY_ASSIGN = 1 << 9;
        const IN_CLASS        = 1 << 10;
        const IN_CLASS_BASE   = 1 << 11;
        const IN_NAMESPACE    = 1 << 12;
        const IN_FOR          = 1 << 13;
        const IN_OC_MSG       = 1 << 14;

        const STMT_START      = 1 << 17;
        const EXPR_START      = 1 << 18;
        const VAR_TYPE        = 1 << 22;
        const VAR_DEF         = 1 << 23;
        const VAR_DECL        = 1 << 24;
        const VAR_INLINE      = 1 << 25;
        const LVALUE          = 1 << 28;
        const ONE_LINER       = 1 << 29;
        const EMPTY_BODY      = 1 << 30;
        const PUNCTUATOR      = 1 << 32;
        const KEYWORD         = 1 << 33;
        const STATIC          = 1 << 36;
        const DEF             = 1 << 39;
        const PROTO           = 1 << 40;
        const REF             = 1 << 41;
        const TYPEDEF_STRUCT  = 1 << 42;
        const TYPEDEF_UNION   = 1 << 43;
        const TYPEDEF_ENUM    = 1 << 44;
    }
}

impl ChunkFlags {
    /// Region flags propagated to chunks created inside the region.
    pub const COPY: ChunkFlags = ChunkFlags::from_bits_truncate(0x0000_ffff);

    /// Names for set bits, used by the token dump.
    pub fn names(self) -> Vec<&'static str> {
        const TABLE: &[(ChunkFlags, &str)] = &[
            (ChunkFlags::IN_PREPROC, "IN_PREPROC"),
            (ChunkFlags::IN_STRUCT, "IN_STRUCT"),
            (ChunkFlags::IN_ENUM, "IN_ENUM"),
            (ChunkFlags::IN_FCN_DEF, "IN_FCN_DEF"),
            (ChunkFlags::IN_FCN_CALL, "IN_FCN_CALL"),
            (ChunkFlags::IN_SPAREN, "IN_SPAREN"),
            (ChunkFlags::IN_TEMPLATE, "IN_TEMPLATE"),
            (ChunkFlags::IN_TYPEDEF, "IN_TYPEDEF"),
            (ChunkFlags::IN_CONST_ARGS, "IN_CONST_ARGS"),
            (ChunkFlags::IN_ARRAY_ASSIGN, "IN_ARRAY_ASSIGN"),
            (ChunkFlags::IN_CLASS, "IN_CLASS"),
            (ChunkFlags::IN_CLASS_BASE, "IN_CLASS_BASE"),
            (ChunkFlags::IN_NAMESPACE, "IN_NAMESPACE"),
            (ChunkFlags::IN_FOR, "IN_FOR"),
            (ChunkFlags::IN_OC_MSG, "IN_OC_MSG"),
            (ChunkFlags::STMT_START, "STMT_START"),
            (ChunkFlags::EXPR_START, "EXPR_START"),
            (ChunkFlags::VAR_TYPE, "VAR_TYPE"),
            (ChunkFlags::VAR_DEF, "VAR_DEF"),
            (ChunkFlags::VAR_DECL, "VAR_DECL"),
            (ChunkFlags::VAR_INLINE, "VAR_INLINE"),
            (ChunkFlags::LVALUE, "LVALUE"),
            (ChunkFlags::ONE_LINER, "ONE_LINER"),
            (ChunkFlags::EMPTY_BODY, "EMPTY_BODY"),
            (ChunkFlags::PUNCTUATOR, "PUNCTUATOR"),
            (ChunkFlags::KEYWORD, "KEYWORD"),
            (ChunkFlags::STATIC, "STATIC"),
            (ChunkFlags::DEF, "DEF"),
            (ChunkFlags::PROTO, "PROTO"),
            (ChunkFlags::REF, "REF"),
            (ChunkFlags::TYPEDEF_STRUCT, "TYPEDEF_STRUCT"),
            (ChunkFlags::TYPEDEF_UNION, "TYPEDEF_UNION"),
            (ChunkFlags::TYPEDEF_ENUM, "TYPEDEF_ENUM"),
        ];
        TABLE
            .iter()
            .filter(|(f, _)| self.contains(*f))
            .map(|(_, n)| *n)
            .collect()
    }
}

/// Identifier kind recorded in the index. The discriminants are the
/// integer values stored in the `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IdKind {
    Unknown = 0,
    Macro = 1,
    MacroFunction = 2,
    Function = 3,
    Struct = 4,
    Union = 5,
    Enum = 6,
    EnumVal = 7,
    Class = 8,
    StructType = 9,
    UnionType = 10,
    EnumType = 11,
    FunctionType = 12,
    Type = 13,
    Var = 14,
    Namespace = 15,
}

impl IdKind {
    pub fn name(self) -> &'static str {
        match self {
            IdKind::Unknown => "UNKNOWN",
            IdKind::Macro => "MACRO",
            IdKind::MacroFunction => "MACRO_FUNCTION",
            IdKind::Function => "FUNCTION",
            IdKind::Struct => "STRUCT",
            IdKind::Union => "UNION",
            IdKind::Enum => "ENUM",
            IdKind::EnumVal => "ENUM_VAL",
            IdKind::Class => "CLASS",
            IdKind::StructType => "STRUCT_TYPE",
            IdKind::UnionType => "UNION_TYPE",
            IdKind::EnumType => "ENUM_TYPE",
            IdKind::FunctionType => "FUNCTION_TYPE",
            IdKind::Type => "TYPE",
            IdKind::Var => "VAR",
            IdKind::Namespace => "NAMESPACE",
        }
    }

    pub fn from_i64(v: i64) -> IdKind {
        match v {
            1 => IdKind::Macro,
            2 => IdKind::MacroFunction,
            3 => IdKind::Function,
            4 => IdKind::Struct,
            5 => IdKind::Union,
            6 => IdKind::Enum,
            7 => IdKind::EnumVal,
            8 => IdKind::Class,
            9 => IdKind::StructType,
            10 => IdKind::UnionType,
            11 => IdKind::EnumType,
            12 => IdKind::FunctionType,
            13 => IdKind::Type,
            14 => IdKind::Var,
            15 => IdKind::Namespace,
            _ => IdKind::Unknown,
        }
    }
}

/// Definition / declaration / reference discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IdSubKind {
    Unknown = 0,
    Definition = 1,
    Declaration = 2,
    Reference = 3,
}

impl IdSubKind {
    pub fn name(self) -> &'static str {
        match self {
            IdSubKind::Unknown => "UNKNOWN",
            IdSubKind::Definition => "DEF",
            IdSubKind::Declaration => "DECL",
            IdSubKind::Reference => "REF",
        }
    }
}

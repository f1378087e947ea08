//! Symbol classification: peephole passes that re-type chunks to mark
//! typedefs, tag definitions, namespaces, function roles, and variable
//! definitions. Pass order is load-bearing: tags must exist before the
//! declaration scanner runs, and function typing must precede it so
//! prototypes are not mistaken for variables.

use std::collections::HashMap;

use crate::chunk::{ChunkId, Nav};
use crate::pipeline::FileState;
use crate::token::{ChunkFlags, TokenKind};

pub fn fix_symbols(state: &mut FileState) {
    fix_typedefs(state);
    fix_enum_struct_union(state);
    mark_namespaces(state);
    mark_functions(state);
    mark_variable_definitions(state);
    mark_qualifier_chains(state);
}

fn set_sub_kind(flags: &mut ChunkFlags, sub: ChunkFlags) {
    flags.remove(ChunkFlags::DEF | ChunkFlags::PROTO | ChunkFlags::REF);
    *flags |= sub;
}

/// List-order sequence numbers, rebuilt per pass because virtual brace
/// insertion makes arena ids unordered.
fn seq_map(state: &FileState) -> HashMap<ChunkId, usize> {
    state.chunks.ids().enumerate().map(|(i, id)| (id, i)).collect()
}

/// typedef bodies: the last name of each comma segment at the typedef's
/// level becomes a TYPE definition; `typedef ret (*name)(args)` marks a
/// function type instead.
fn fix_typedefs(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        if state.chunks.get(id).kind != TokenKind::Typedef {
            continue;
        }
        let td_level = state.chunks.get(id).level;

        let mut flavor = ChunkFlags::empty();
        let mut fn_name: Option<ChunkId> = None;
        let mut last_name: Option<ChunkId> = None;
        let mut names: Vec<ChunkId> = Vec::new();

        let mut cur = id;
        while let Some(n) = state.chunks.next_ncnl(cur, Nav::Preproc) {
            cur = n;
            let c = state.chunks.get(n);
            match c.kind {
                TokenKind::Semicolon | TokenKind::VSemicolon if c.level == td_level => {
                    if let Some(w) = last_name.take() {
                        names.push(w);
                    }
                    break;
                }
                TokenKind::Comma if c.level == td_level => {
                    if let Some(w) = last_name.take() {
                        names.push(w);
                    }
                }
                TokenKind::Enum if c.level == td_level => flavor = ChunkFlags::TYPEDEF_ENUM,
                TokenKind::Struct if c.level == td_level => {
                    flavor = ChunkFlags::TYPEDEF_STRUCT
                }
                TokenKind::Union if c.level == td_level => flavor = ChunkFlags::TYPEDEF_UNION,
                TokenKind::Word | TokenKind::Type if c.level == td_level => {
                    last_name = Some(n)
                }
                k if k.is_paren_open() && c.level == td_level && fn_name.is_none() => {
                    fn_name = find_fn_ptr_name(state, n);
                }
                _ => {}
            }
        }

        if let Some(f) = fn_name {
            let c = state.chunks.get_mut(f);
            c.kind = TokenKind::FuncType;
            c.parent_kind = TokenKind::Typedef;
            set_sub_kind(&mut c.flags, ChunkFlags::DEF);
        } else {
            for w in names {
                let c = state.chunks.get_mut(w);
                c.kind = TokenKind::Type;
                c.parent_kind = TokenKind::Typedef;
                set_sub_kind(&mut c.flags, ChunkFlags::DEF);
                c.flags |= flavor;
            }
        }
    }
}

/// `( * name )` inside a typedef. Returns the name chunk.
fn find_fn_ptr_name(state: &FileState, open: ChunkId) -> Option<ChunkId> {
    let mut cur = open;
    let mut saw_star = false;
    while let Some(n) = state.chunks.next_ncnl(cur, Nav::Preproc) {
        cur = n;
        let c = state.chunks.get(n);
        match c.kind {
            TokenKind::Star => saw_star = true,
            TokenKind::Qualifier => {}
            TokenKind::Word | TokenKind::FuncType if saw_star => return Some(n),
            _ => return None,
        }
    }
    None
}

/// Tags after struct/union/enum/class: DEF when a body follows, PROTO
/// on a bare `;`, REF otherwise. Class base lists are marked as class
/// references.
fn fix_enum_struct_union(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        let kw = state.chunks.get(id).kind;
        if !matches!(
            kw,
            TokenKind::Enum | TokenKind::Struct | TokenKind::Union | TokenKind::Class
        ) {
            continue;
        }
        // keyword chunks only; tags retyped by earlier runs keep Type kind
        if !state.chunks.get(id).flags.contains(ChunkFlags::KEYWORD) {
            continue;
        }
        let Some(mut tag) = state.chunks.next_ncnl(id, Nav::Preproc) else {
            continue;
        };
        // `enum class X` and `enum struct X`
        if matches!(state.chunks.get(tag).kind, TokenKind::Class | TokenKind::Struct)
            && kw == TokenKind::Enum
        {
            match state.chunks.next_ncnl(tag, Nav::Preproc) {
                Some(t) => tag = t,
                None => continue,
            }
        }
        let tc = state.chunks.get(tag);
        if !matches!(tc.kind, TokenKind::Word | TokenKind::Type) {
            continue; // anonymous
        }
        let tag_level = tc.level;

        let mut after = state.chunks.next_ncnl(tag, Nav::Preproc);

        // skip a class inheritance list up to the body
        if kw == TokenKind::Class || (kw == TokenKind::Struct && after_is_colon(state, after)) {
            if after_is_colon(state, after) {
                let mut cur = after.unwrap();
                while let Some(n) = state.chunks.next_ncnl(cur, Nav::Preproc) {
                    let c = state.chunks.get(n);
                    if c.kind == TokenKind::BraceOpen || c.is_semicolon() {
                        after = Some(n);
                        break;
                    }
                    if matches!(c.kind, TokenKind::Word | TokenKind::Type)
                        && c.level == tag_level
                    {
                        let c = state.chunks.get_mut(n);
                        c.kind = TokenKind::Type;
                        c.parent_kind = TokenKind::Class;
                        c.flags |= ChunkFlags::IN_CLASS_BASE;
                        set_sub_kind(&mut c.flags, ChunkFlags::REF);
                    }
                    cur = n;
                }
            }
        }

        let sub = match after.map(|a| state.chunks.get(a).kind) {
            Some(TokenKind::BraceOpen) => ChunkFlags::DEF,
            Some(TokenKind::Semicolon) | Some(TokenKind::VSemicolon) => ChunkFlags::PROTO,
            _ => ChunkFlags::REF,
        };
        let c = state.chunks.get_mut(tag);
        c.kind = TokenKind::Type;
        c.parent_kind = kw;
        set_sub_kind(&mut c.flags, sub);
    }
}

fn after_is_colon(state: &FileState, after: Option<ChunkId>) -> bool {
    after.map_or(false, |a| {
        matches!(
            state.chunks.get(a).kind,
            TokenKind::Colon | TokenKind::ClassColon
        )
    })
}

/// Names after the `namespace` keyword.
fn mark_namespaces(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        let c = state.chunks.get(id);
        if c.kind != TokenKind::Namespace || !c.flags.contains(ChunkFlags::KEYWORD) {
            continue;
        }
        let level = c.level;
        // collect the name components up to `{` or `;`
        let mut words: Vec<ChunkId> = Vec::new();
        let mut cur = id;
        let mut has_body = false;
        while let Some(n) = state.chunks.next_ncnl(cur, Nav::Preproc) {
            let k = state.chunks.get(n);
            match k.kind {
                TokenKind::Word if k.level == level => words.push(n),
                TokenKind::DcMember => {}
                TokenKind::BraceOpen => {
                    has_body = true;
                    break;
                }
                _ => break,
            }
            cur = n;
        }
        for w in words {
            let c = state.chunks.get_mut(w);
            c.parent_kind = TokenKind::Namespace;
            if has_body {
                set_sub_kind(&mut c.flags, ChunkFlags::DEF);
            }
        }
    }
}

/// A class body region, for constructor and destructor detection.
struct ClassRegion {
    open_seq: usize,
    close_seq: usize,
    name: String,
}

fn collect_class_regions(state: &FileState, seq: &HashMap<ChunkId, usize>) -> Vec<ClassRegion> {
    let mut regions = Vec::new();
    for id in state.chunks.ids() {
        let c = state.chunks.get(id);
        if c.kind != TokenKind::Type
            || c.parent_kind != TokenKind::Class
            || !c.flags.contains(ChunkFlags::DEF)
        {
            continue;
        }
        let Some(open) = state.chunks.next_kind(id, TokenKind::BraceOpen, Some(c.level), Nav::Preproc)
        else {
            continue;
        };
        let Some(close) = state.chunks.matching_close(open, Nav::Preproc) else {
            continue;
        };
        regions.push(ClassRegion {
            open_seq: seq[&open],
            close_seq: seq[&close],
            name: c.text.clone(),
        });
    }
    regions
}

/// Function typing: definition, prototype, call, constructor, or
/// constructor-style variable, decided by what follows the closing
/// paren and what precedes the name.
fn mark_functions(state: &mut FileState) {
    let seq = seq_map(state);
    let classes = collect_class_regions(state, &seq);
    let in_class_named = |s: usize, text: &str| -> bool {
        classes
            .iter()
            .any(|r| r.open_seq < s && s < r.close_seq && r.name == text)
    };

    let cpp_like = state.lang.contains(crate::lang::LANG_CPP)
        || state.lang.contains(crate::lang::LANG_CS)
        || state.lang.contains(crate::lang::LANG_JAVA)
        || state.lang.contains(crate::lang::LANG_VALA);

    // function-body depth tracked in list order
    let mut body_stack: Vec<u32> = Vec::new();
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        let c = state.chunks.get(id);
        let kind = c.kind;
        let level = c.level;

        if kind == TokenKind::BraceClose {
            if body_stack.last() == Some(&level) {
                body_stack.pop();
            }
            continue;
        }
        if kind != TokenKind::Word {
            continue;
        }
        let text = c.text.clone();
        let s = seq[&id];

        let Some(fparen) = state.chunks.next_ncnl(id, Nav::Preproc) else {
            continue;
        };
        if state.chunks.get(fparen).kind != TokenKind::FparenOpen {
            continue;
        }
        let Some(close) = state.chunks.matching_close(fparen, Nav::Preproc) else {
            continue;
        };

        // what follows the parameter list, past trailing qualifiers
        let mut after = state.chunks.next_ncnl(close, Nav::Preproc);
        while let Some(a) = after {
            if state.chunks.get(a).kind == TokenKind::Qualifier {
                state.chunks.get_mut(a).flags |= ChunkFlags::IN_CONST_ARGS;
                after = state.chunks.next_ncnl(a, Nav::Preproc);
            } else {
                break;
            }
        }
        let after_kind = after.map(|a| state.chunks.get(a).kind);

        let prev_kind = state
            .chunks
            .prev_ncnl(id, Nav::Preproc)
            .map(|p| state.chunks.get(p).kind);
        // constructors match the enclosing class name; destructors add `~`
        let is_ctor_name = in_class_named(s, &text);

        let new_kind;
        let sub;
        match after_kind {
            Some(TokenKind::BraceOpen) => {
                new_kind = if is_ctor_name {
                    TokenKind::FuncClass
                } else {
                    TokenKind::FuncDef
                };
                sub = ChunkFlags::DEF;
            }
            Some(TokenKind::Semicolon) | Some(TokenKind::VSemicolon) | Some(TokenKind::Comma) => {
                let declish = matches!(
                    prev_kind,
                    Some(TokenKind::Type)
                        | Some(TokenKind::Word)
                        | Some(TokenKind::Qualifier)
                        | Some(TokenKind::Star)
                        | Some(TokenKind::Amp)
                );
                if is_ctor_name {
                    new_kind = TokenKind::FuncClass;
                    sub = ChunkFlags::PROTO;
                } else if declish && cpp_like && !body_stack.is_empty() {
                    // `Type name(args);` inside a function body
                    new_kind = TokenKind::FuncCtorVar;
                    sub = ChunkFlags::VAR_DEF;
                } else if declish {
                    new_kind = TokenKind::FuncProto;
                    sub = ChunkFlags::PROTO;
                } else {
                    new_kind = TokenKind::FuncCall;
                    sub = ChunkFlags::REF;
                }
            }
            _ => {
                new_kind = TokenKind::FuncCall;
                sub = ChunkFlags::REF;
            }
        }

        {
            let c = state.chunks.get_mut(id);
            c.kind = new_kind;
            if sub == ChunkFlags::VAR_DEF {
                c.flags |= ChunkFlags::VAR_DEF;
            } else {
                set_sub_kind(&mut c.flags, sub);
            }
        }

        match new_kind {
            TokenKind::FuncDef | TokenKind::FuncProto | TokenKind::FuncClass => {
                if has_static_qualifier(state, id) {
                    state.chunks.get_mut(id).flags |= ChunkFlags::STATIC;
                }
                state.chunks.get_mut(fparen).parent_kind = new_kind;
                state.chunks.get_mut(close).parent_kind = new_kind;
                flag_region(state, fparen, close, ChunkFlags::IN_FCN_DEF);
                fix_fcn_params(state, fparen, close);
                if new_kind != TokenKind::FuncProto {
                    if let (Some(a), Some(TokenKind::BraceOpen)) = (after, after_kind) {
                        state.chunks.get_mut(a).parent_kind = new_kind;
                        if let Some(bc) = state.chunks.matching_close(a, Nav::Preproc) {
                            state.chunks.get_mut(bc).parent_kind = new_kind;
                        }
                        // the body we just entered, for ctor-var detection
                        let body_level = state.chunks.get(a).level;
                        body_stack.push(body_level);
                    }
                }
            }
            TokenKind::FuncCall => {
                state.chunks.get_mut(fparen).parent_kind = TokenKind::FuncCall;
                state.chunks.get_mut(close).parent_kind = TokenKind::FuncCall;
                flag_region(state, fparen, close, ChunkFlags::IN_FCN_CALL);
            }
            _ => {}
        }
    }
}

/// True when the declaration specifiers before a function name carry
/// `static`.
fn has_static_qualifier(state: &FileState, id: ChunkId) -> bool {
    let mut cur = id;
    while let Some(p) = state.chunks.prev_ncnl(cur, Nav::Preproc) {
        let c = state.chunks.get(p);
        match c.kind {
            TokenKind::Qualifier if c.text == "static" => return true,
            TokenKind::Qualifier
            | TokenKind::Type
            | TokenKind::Word
            | TokenKind::Star
            | TokenKind::Amp
            | TokenKind::DcMember
            | TokenKind::Inv => {}
            _ => return false,
        }
        if c.flags.contains(ChunkFlags::STMT_START) {
            return false;
        }
        cur = p;
    }
    false
}

/// Apply a region flag to everything strictly between open and close.
fn flag_region(state: &mut FileState, open: ChunkId, close: ChunkId, flag: ChunkFlags) {
    let mut cur = open;
    while let Some(n) = state.chunks.next(cur, Nav::All) {
        if n == close {
            break;
        }
        state.chunks.get_mut(n).flags |= flag;
        cur = n;
    }
}

/// Mark parameter names and their types inside a definition or
/// prototype paren pair. Directive-line tokens are stepped over so
/// parameters inside `#if` branches are still marked.
fn fix_fcn_params(state: &mut FileState, open: ChunkId, close: ChunkId) {
    let depth = state.chunks.get(open).level + 1;

    // one comma-separated segment at a time
    let mut segment: Vec<ChunkId> = Vec::new();
    let mut on_directive = false;
    let mut cur = open;
    loop {
        let Some(n) = state.chunks.next(cur, Nav::All) else { break };
        cur = n;
        if n == close {
            mark_param_segment(state, &segment, depth);
            break;
        }
        let c = state.chunks.get(n);
        if c.kind == TokenKind::Preproc {
            on_directive = true;
            continue;
        }
        if c.is_newline() {
            if c.kind == TokenKind::Newline {
                on_directive = false;
            }
            continue;
        }
        if on_directive || c.is_comment() {
            continue;
        }
        if c.kind == TokenKind::Comma && c.level == depth {
            mark_param_segment(state, &segment, depth);
            segment.clear();
            continue;
        }
        segment.push(n);
    }
}

fn mark_param_segment(state: &mut FileState, segment: &[ChunkId], depth: u32) {
    // function-pointer parameter: `ret (*name)(args)`
    for (i, &id) in segment.iter().enumerate() {
        let c = state.chunks.get(id);
        if c.kind.is_paren_open() && c.level == depth {
            if let Some(name) = find_fn_ptr_name(state, id) {
                let nc = state.chunks.get_mut(name);
                nc.kind = TokenKind::FuncVar;
                nc.flags |= ChunkFlags::VAR_DEF;
                for &t in &segment[..i] {
                    mark_as_param_type(state, t, depth);
                }
                return;
            }
        }
    }

    // plain parameter: the trailing word is the name, what precedes is
    // its type
    let mut name = None;
    let mut leading = 0usize;
    for (i, &id) in segment.iter().enumerate() {
        let c = state.chunks.get(id);
        if c.level != depth {
            continue;
        }
        match c.kind {
            TokenKind::Word => {
                name = Some(id);
                leading = i;
            }
            TokenKind::Tsquare | TokenKind::SquareOpen | TokenKind::SquareClose => {}
            _ => {}
        }
    }
    let Some(name) = name else { return };
    // an unnamed or bare-word segment has nothing to mark
    let has_type = segment[..leading].iter().any(|&id| {
        matches!(
            state.chunks.get(id).kind,
            TokenKind::Type
                | TokenKind::Word
                | TokenKind::Qualifier
                | TokenKind::Struct
                | TokenKind::Union
                | TokenKind::Enum
                | TokenKind::Class
        )
    });
    if !has_type {
        return;
    }
    for &t in &segment[..leading] {
        mark_as_param_type(state, t, depth);
    }
    let c = state.chunks.get_mut(name);
    c.flags |= ChunkFlags::VAR_DEF;
}

fn mark_as_param_type(state: &mut FileState, id: ChunkId, depth: u32) {
    let c = state.chunks.get_mut(id);
    if c.level != depth {
        return;
    }
    match c.kind {
        TokenKind::Word => {
            c.kind = TokenKind::Type;
            c.flags |= ChunkFlags::VAR_TYPE;
        }
        TokenKind::Type => c.flags |= ChunkFlags::VAR_TYPE,
        _ => {}
    }
}

/// Declaration scanner: `type name` sequences at statement scope become
/// variable definitions (declarations under `extern`).
fn mark_variable_definitions(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    let mut skip_until: Option<ChunkId> = None;

    for id in ids {
        if let Some(until) = skip_until {
            if id != until {
                continue;
            }
            skip_until = None;
            continue;
        }
        if !is_decl_start(state, id) {
            continue;
        }
        skip_until = scan_declaration(state, id);
    }
}

fn is_decl_start(state: &FileState, id: ChunkId) -> bool {
    let c = state.chunks.get(id);
    if !matches!(
        c.kind,
        TokenKind::Qualifier
            | TokenKind::Type
            | TokenKind::Word
            | TokenKind::Struct
            | TokenKind::Union
            | TokenKind::Enum
            | TokenKind::Class
            | TokenKind::Extern
    ) {
        return false;
    }
    if c.flags.intersects(
        ChunkFlags::IN_TYPEDEF
            | ChunkFlags::IN_FCN_DEF
            | ChunkFlags::IN_FCN_CALL
            | ChunkFlags::IN_ENUM
            | ChunkFlags::IN_ARRAY_ASSIGN
            | ChunkFlags::IN_CLASS_BASE,
    ) {
        return false;
    }
    if c.flags.contains(ChunkFlags::STMT_START) && !c.flags.contains(ChunkFlags::IN_SPAREN) {
        return true;
    }
    // the init clause of a for loop
    if c.flags.contains(ChunkFlags::IN_FOR) {
        if let Some(p) = state.chunks.prev_ncnl(id, Nav::Preproc) {
            return state.chunks.get(p).kind == TokenKind::SparenOpen;
        }
    }
    false
}

/// One declarator segment is done: the trailing word is the name, any
/// words before it are part of the type. Returns how many words were
/// promoted to types.
fn finish_declarator(
    state: &mut FileState,
    words: &mut Vec<ChunkId>,
    type_count: usize,
    name_flags: ChunkFlags,
) -> usize {
    let Some(&name) = words.last() else { return 0 };
    if type_count == 0 && words.len() < 2 {
        return 0;
    }
    let promoted = words.len() - 1;
    for &w in &words[..promoted] {
        let c = state.chunks.get_mut(w);
        c.kind = TokenKind::Type;
        c.flags |= ChunkFlags::VAR_TYPE;
    }
    state.chunks.get_mut(name).flags |= name_flags;
    words.clear();
    promoted
}

/// Walk one declaration statement. Returns the chunk after which the
/// outer scan resumes.
fn scan_declaration(state: &mut FileState, start: ChunkId) -> Option<ChunkId> {
    let decl_level = state.chunks.get(start).level;

    let mut saw_extern = false;
    let mut saw_static = false;
    let mut inline_body = false;
    let mut type_count = 0usize;
    let mut words: Vec<ChunkId> = Vec::new();

    let name_flags = |saw_extern: bool, saw_static: bool, inline_body: bool| {
        let mut add = if saw_extern {
            ChunkFlags::VAR_DECL
        } else {
            ChunkFlags::VAR_DEF
        };
        if saw_static {
            add |= ChunkFlags::STATIC;
        }
        if inline_body {
            add |= ChunkFlags::VAR_INLINE;
        }
        add
    };

    let mut cur = start;
    let mut first = true;
    loop {
        let n = if first {
            first = false;
            start
        } else {
            match state.chunks.next_ncnl(cur, Nav::Preproc) {
                Some(n) => n,
                None => break,
            }
        };
        cur = n;
        let c = state.chunks.get(n);
        let kind = c.kind;
        let level = c.level;

        match kind {
            TokenKind::Semicolon | TokenKind::VSemicolon if level <= decl_level => {
                finish_declarator(
                    state,
                    &mut words,
                    type_count,
                    name_flags(saw_extern, saw_static, inline_body),
                );
                break;
            }
            TokenKind::Comma if level == decl_level => {
                type_count += finish_declarator(
                    state,
                    &mut words,
                    type_count,
                    name_flags(saw_extern, saw_static, inline_body),
                );
            }
            TokenKind::Assign => {
                type_count += finish_declarator(
                    state,
                    &mut words,
                    type_count,
                    name_flags(saw_extern, saw_static, inline_body),
                );
                // skip the initialiser expression
                let mut done = false;
                while let Some(x) = state.chunks.next_ncnl(cur, Nav::Preproc) {
                    cur = x;
                    let xc = state.chunks.get(x);
                    if xc.is_semicolon() && xc.level <= decl_level {
                        done = true;
                        break;
                    }
                    if xc.kind == TokenKind::Comma && xc.level == decl_level {
                        break;
                    }
                }
                if done {
                    break;
                }
            }
            TokenKind::Qualifier => {
                if c.text == "static" {
                    saw_static = true;
                }
                type_count += 1;
            }
            TokenKind::Extern => saw_extern = true,
            TokenKind::Type => {
                type_count += 1;
                let c = state.chunks.get_mut(n);
                c.flags |= ChunkFlags::VAR_TYPE;
            }
            TokenKind::Struct | TokenKind::Union | TokenKind::Enum | TokenKind::Class => {
                type_count += 1;
            }
            TokenKind::Word => words.push(n),
            TokenKind::Star | TokenKind::Amp | TokenKind::DcMember => {}
            TokenKind::Tsquare => {}
            TokenKind::SquareOpen => {
                // array dimensions
                if let Some(close) = state.chunks.matching_close(n, Nav::Preproc) {
                    cur = close;
                } else {
                    return Some(n);
                }
            }
            TokenKind::AngleOpen => {
                if let Some(close) = state.chunks.matching_close(n, Nav::Preproc) {
                    cur = close;
                } else {
                    return Some(n);
                }
            }
            TokenKind::BraceOpen
                if matches!(
                    c.parent_kind,
                    TokenKind::Enum | TokenKind::Struct | TokenKind::Union | TokenKind::Class
                ) =>
            {
                // inline type body: `enum tag { ... } var;`
                inline_body = true;
                type_count += 1;
                match state.chunks.matching_close(n, Nav::Preproc) {
                    Some(close) => cur = close,
                    None => return Some(n),
                }
            }
            _ => {
                // not a declaration after all
                return Some(n);
            }
        }
    }

    state.chunks.next(cur, Nav::All)
}

/// `A::B::name`: the leading components are type references.
fn mark_qualifier_chains(state: &mut FileState) {
    let ids: Vec<ChunkId> = state.chunks.ids().collect();
    for id in ids {
        let c = state.chunks.get(id);
        if c.kind != TokenKind::Word || c.parent_kind != TokenKind::None {
            continue;
        }
        let Some(next) = state.chunks.next_ncnl(id, Nav::Preproc) else {
            continue;
        };
        if state.chunks.get(next).kind != TokenKind::DcMember {
            continue;
        }
        let c = state.chunks.get_mut(id);
        c.kind = TokenKind::Type;
    }
}

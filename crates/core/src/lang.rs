use std::path::Path;

/// Language selection bitmask. Several languages share keyword table
/// entries, so membership tests are mask intersections rather than
/// equality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LangFlags(pub u16);

pub const LANG_NONE: LangFlags = LangFlags(0x0000);
pub const LANG_C: LangFlags = LangFlags(0x0001);
pub const LANG_CPP: LangFlags = LangFlags(0x0002);
pub const LANG_D: LangFlags = LangFlags(0x0004);
pub const LANG_CS: LangFlags = LangFlags(0x0008);
pub const LANG_JAVA: LangFlags = LangFlags(0x0010);
pub const LANG_OC: LangFlags = LangFlags(0x0020);
pub const LANG_VALA: LangFlags = LangFlags(0x0040);
pub const LANG_PAWN: LangFlags = LangFlags(0x0080);
pub const LANG_ECMA: LangFlags = LangFlags(0x0100);

/// All C-like languages (everything except Pawn and ECMAScript)
pub const LANG_ALLC: LangFlags = LangFlags(0x017f);
/// Every language
pub const LANG_ALL: LangFlags = LangFlags(0x0fff);

/// Keyword table entries with this bit match only inside a preprocessor
/// directive.
pub const FLAG_PP: u16 = 0x8000;

impl LangFlags {
    pub fn contains(self, other: LangFlags) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: LangFlags) -> LangFlags {
        LangFlags(self.0 | other.0)
    }
}

struct FileLang {
    ext: &'static str,
    tag: &'static str,
    lang: LangFlags,
}

/// Extension and tag table. Order matters: the first suffix match wins.
const LANGUAGES: &[FileLang] = &[
    FileLang { ext: ".c", tag: "C", lang: LANG_C },
    FileLang { ext: ".cpp", tag: "CPP", lang: LANG_CPP },
    FileLang { ext: ".d", tag: "D", lang: LANG_D },
    FileLang { ext: ".cs", tag: "CS", lang: LANG_CS },
    FileLang { ext: ".vala", tag: "VALA", lang: LANG_VALA },
    FileLang { ext: ".java", tag: "JAVA", lang: LANG_JAVA },
    FileLang { ext: ".pawn", tag: "PAWN", lang: LANG_PAWN },
    FileLang { ext: ".p", tag: "", lang: LANG_PAWN },
    FileLang { ext: ".sma", tag: "", lang: LANG_PAWN },
    FileLang { ext: ".inl", tag: "", lang: LANG_PAWN },
    FileLang { ext: ".h", tag: "", lang: LANG_C },
    FileLang { ext: ".cxx", tag: "", lang: LANG_CPP },
    FileLang { ext: ".hpp", tag: "", lang: LANG_CPP },
    FileLang { ext: ".hxx", tag: "", lang: LANG_CPP },
    FileLang { ext: ".cc", tag: "", lang: LANG_CPP },
    FileLang { ext: ".cp", tag: "", lang: LANG_CPP },
    FileLang { ext: ".C", tag: "", lang: LANG_CPP },
    FileLang { ext: ".CPP", tag: "", lang: LANG_CPP },
    FileLang { ext: ".c++", tag: "", lang: LANG_CPP },
    FileLang { ext: ".di", tag: "", lang: LANG_D },
    FileLang { ext: ".m", tag: "OC", lang: LANG_OC },
    FileLang { ext: ".mm", tag: "OC+", lang: LangFlags(LANG_OC.0 | LANG_CPP.0) },
    FileLang { ext: ".sqc", tag: "", lang: LANG_C }, // embedded SQL
    FileLang { ext: ".es", tag: "ECMA", lang: LANG_ECMA },
];

/// Detect the language from the filename extension. Defaults to C.
pub fn from_filename(path: impl AsRef<Path>) -> LangFlags {
    let name = path.as_ref().to_string_lossy();
    for entry in LANGUAGES {
        if name.ends_with(entry.ext) {
            return entry.lang;
        }
    }
    LANG_C
}

/// Look up a `-l` override tag. Returns `LANG_NONE` for unknown tags.
pub fn from_tag(tag: &str) -> LangFlags {
    for entry in LANGUAGES {
        if !entry.tag.is_empty() && entry.tag.eq_ignore_ascii_case(tag) {
            return entry.lang;
        }
    }
    LANG_NONE
}

/// Tag text for a language set, for log lines.
pub fn to_string(lang: LangFlags) -> &'static str {
    for entry in LANGUAGES {
        if entry.lang == lang && !entry.tag.is_empty() {
            return entry.tag;
        }
    }
    for entry in LANGUAGES {
        if lang.contains(entry.lang) && !entry.tag.is_empty() {
            return entry.tag;
        }
    }
    "???"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(from_filename("foo.c"), LANG_C);
        assert_eq!(from_filename("foo.cpp"), LANG_CPP);
        assert_eq!(from_filename("src/foo.hpp"), LANG_CPP);
        assert_eq!(from_filename("foo.java"), LANG_JAVA);
        assert_eq!(from_filename("foo.sma"), LANG_PAWN);
        assert_eq!(from_filename("foo.es"), LANG_ECMA);
        // unknown extensions fall back to C
        assert_eq!(from_filename("README"), LANG_C);
    }

    #[test]
    fn test_mm_is_both_oc_and_cpp() {
        let lang = from_filename("foo.mm");
        assert!(lang.contains(LANG_OC));
        assert!(lang.contains(LANG_CPP));
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(from_tag("C"), LANG_C);
        assert_eq!(from_tag("cpp"), LANG_CPP);
        assert_eq!(from_tag("OC+"), LangFlags(LANG_OC.0 | LANG_CPP.0));
        assert_eq!(from_tag("klingon"), LANG_NONE);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(LANG_C), "C");
        assert_eq!(to_string(LANG_VALA), "VALA");
    }
}

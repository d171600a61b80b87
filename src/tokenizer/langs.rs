//! Per-language scanning tables.
//!
//! One static table per supported language drives the generic scanner:
//! keyword and type word lists, comment markers, directive prefix, and
//! string syntax. The word lists cover what a highlighter needs, not
//! the full reserved-word census of every standard revision.

/// How a directive token starts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Directive {
    pub prefix: char,
}

/// A block comment delimiter pair; `nestable` comments count depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockComment {
    pub open: &'static str,
    pub close: &'static str,
    pub nestable: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LanguageSpec {
    pub keywords: &'static [&'static str],
    pub types: &'static [&'static str],
    pub line_comments: &'static [&'static str],
    pub block_comments: &'static [BlockComment],
    pub directive: Option<Directive>,
    /// Quotes opening an escaped, single-line string literal.
    pub string_quotes: &'static [char],
    /// Quote opening a raw, multi-line string literal (Go backticks).
    pub raw_string_quote: Option<char>,
    pub char_quote: Option<char>,
    /// Ada compares keywords case-insensitively.
    pub case_insensitive: bool,
}

pub(crate) static C_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "auto", "break", "case", "catch", "class", "const", "continue", "default", "delete",
        "do", "else", "enum", "extern", "for", "friend", "goto", "if", "inline", "namespace",
        "new", "operator", "private", "protected", "public", "register", "restrict", "return",
        "sizeof", "static", "struct", "switch", "template", "this", "throw", "try", "typedef",
        "typename", "union", "using", "virtual", "volatile", "while",
    ],
    types: &[
        "bool", "char", "double", "float", "int", "int16_t", "int32_t", "int64_t", "int8_t",
        "long", "short", "signed", "size_t", "ssize_t", "uint16_t", "uint32_t", "uint64_t",
        "uint8_t", "unsigned", "void", "wchar_t",
    ],
    line_comments: &["//"],
    block_comments: &[BlockComment {
        open: "/*",
        close: "*/",
        nestable: false,
    }],
    directive: Some(Directive { prefix: '#' }),
    string_quotes: &['"'],
    raw_string_quote: None,
    char_quote: Some('\''),
    case_insensitive: false,
};

pub(crate) static ASM_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "add", "and", "call", "cmp", "dec", "div", "inc", "jae", "jb", "je", "jmp", "jne",
        "jnz", "jz", "lea", "mov", "mul", "neg", "nop", "not", "or", "pop", "push", "ret",
        "sar", "shl", "shr", "sub", "test", "xor",
    ],
    types: &[],
    line_comments: &["#", ";", "//"],
    block_comments: &[BlockComment {
        open: "/*",
        close: "*/",
        nestable: false,
    }],
    directive: Some(Directive { prefix: '.' }),
    string_quotes: &['"'],
    raw_string_quote: None,
    char_quote: Some('\''),
    case_insensitive: true,
};

pub(crate) static D_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "abstract", "alias", "align", "asm", "assert", "auto", "body", "break", "case", "cast",
        "catch", "class", "const", "continue", "debug", "default", "delegate", "delete",
        "deprecated", "do", "else", "enum", "export", "extern", "final", "finally", "for",
        "foreach", "function", "goto", "if", "immutable", "import", "in", "inout", "interface",
        "invariant", "is", "lazy", "mixin", "module", "new", "nothrow", "null", "out",
        "override", "package", "pragma", "private", "protected", "public", "pure", "ref",
        "return", "scope", "shared", "static", "struct", "super", "switch", "synchronized",
        "template", "this", "throw", "try", "typeof", "union", "unittest", "version", "while",
        "with",
    ],
    types: &[
        "bool", "byte", "cdouble", "cent", "cfloat", "char", "dchar", "double", "float",
        "idouble", "ifloat", "int", "ireal", "long", "real", "short", "ubyte", "ucent", "uint",
        "ulong", "ushort", "void", "wchar",
    ],
    line_comments: &["//"],
    block_comments: &[
        BlockComment {
            open: "/*",
            close: "*/",
            nestable: false,
        },
        BlockComment {
            open: "/+",
            close: "+/",
            nestable: true,
        },
    ],
    directive: None,
    string_quotes: &['"'],
    raw_string_quote: Some('`'),
    char_quote: Some('\''),
    case_insensitive: false,
};

pub(crate) static GO_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "break", "case", "chan", "const", "continue", "default", "defer", "else",
        "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
        "package", "range", "return", "select", "struct", "switch", "type", "var",
    ],
    types: &[
        "bool", "byte", "complex128", "complex64", "error", "float32", "float64", "int",
        "int16", "int32", "int64", "int8", "rune", "string", "uint", "uint16", "uint32",
        "uint64", "uint8", "uintptr",
    ],
    line_comments: &["//"],
    block_comments: &[BlockComment {
        open: "/*",
        close: "*/",
        nestable: false,
    }],
    directive: None,
    string_quotes: &['"'],
    raw_string_quote: Some('`'),
    char_quote: Some('\''),
    case_insensitive: false,
};

pub(crate) static RUST_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "type",
        "unsafe", "use", "where", "while",
    ],
    types: &[
        "Box", "Option", "Result", "Self", "String", "Vec", "bool", "char", "f32", "f64",
        "i128", "i16", "i32", "i64", "i8", "isize", "str", "u128", "u16", "u32", "u64", "u8",
        "usize",
    ],
    line_comments: &["//"],
    block_comments: &[BlockComment {
        open: "/*",
        close: "*/",
        nestable: true,
    }],
    directive: None,
    string_quotes: &['"'],
    raw_string_quote: None,
    char_quote: Some('\''),
    case_insensitive: false,
};

pub(crate) static ADA_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "abort", "abs", "abstract", "accept", "access", "aliased", "all", "and", "array",
        "at", "begin", "body", "case", "constant", "declare", "delay", "delta", "digits",
        "do", "else", "elsif", "end", "entry", "exception", "exit", "for", "function",
        "generic", "goto", "if", "in", "interface", "is", "limited", "loop", "mod", "new",
        "not", "null", "of", "or", "others", "out", "overriding", "package", "pragma",
        "private", "procedure", "protected", "raise", "range", "record", "rem", "renames",
        "requeue", "return", "reverse", "select", "separate", "subtype", "synchronized",
        "tagged", "task", "terminate", "then", "type", "until", "use", "when", "while",
        "with", "xor",
    ],
    types: &[
        "boolean", "character", "duration", "float", "integer", "natural", "positive",
        "string", "wide_character", "wide_string",
    ],
    line_comments: &["--"],
    block_comments: &[],
    directive: None,
    string_quotes: &['"'],
    raw_string_quote: None,
    char_quote: Some('\''),
    case_insensitive: true,
};

/// The internal dialect used for the frontend's own help and rc files.
pub(crate) static HELP_SPEC: LanguageSpec = LanguageSpec {
    keywords: &[
        "bind", "highlight", "imap", "iunmap", "map", "set", "shell", "source", "unmap",
    ],
    types: &[],
    line_comments: &["#"],
    block_comments: &[],
    directive: None,
    string_quotes: &['"'],
    raw_string_quote: None,
    char_quote: None,
    case_insensitive: false,
};

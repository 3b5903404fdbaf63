//! SQL identifier validation
//!
//! Identifiers are never quoted or escaped; anything that is not a plain
//! unquoted identifier is rejected before it can reach SQL text.
//!
//! PostgreSQL folds unquoted identifiers to lower case, so `COST_TOTAL` and
//! `cost_total` name the same column. Every name is brought to its folded
//! form with `canonical` before it is authorized or emitted.

/// PostgreSQL truncates identifiers beyond this length
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// PostgreSQL reserved key words, including those reserved except as
/// function or type names. None of them can stand unquoted as a column
/// reference or output name.
const RESERVED_WORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "system_user", "table",
    "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

/// `[A-Za-z_][A-Za-z0-9_]*`, at most `MAX_IDENTIFIER_LEN` bytes, and not a
/// reserved word in any letter case
pub fn is_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return false,
    }
    bytes.len() <= MAX_IDENTIFIER_LEN
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        && !is_reserved_word(s)
}

pub fn is_reserved_word(s: &str) -> bool {
    RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(s))
}

/// The name PostgreSQL resolves an unquoted identifier (or `schema.table`) to
pub fn canonical(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// An identifier already in folded form
pub fn is_canonical_identifier(s: &str) -> bool {
    is_identifier(s) && !s.bytes().any(|b| b.is_ascii_uppercase())
}

/// A table name already in folded form
pub fn is_canonical_table_name(s: &str) -> bool {
    is_table_name(s) && !s.bytes().any(|b| b.is_ascii_uppercase())
}

/// A table name: an identifier, optionally schema-qualified (`schema.table`)
pub fn is_table_name(s: &str) -> bool {
    match s.split_once('.') {
        Some((schema, table)) => is_identifier(schema) && is_identifier(table),
        None => is_identifier(s),
    }
}

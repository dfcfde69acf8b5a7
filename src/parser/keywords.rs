//! Reserved words and known function names

/// Words always lexed as keywords (case-insensitive)
const RESERVED: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CHECK",
    "COLLATE", "COLUMN", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_TIMESTAMP", "DEFAULT",
    "DELETE", "DESC", "DISTINCT", "DO", "DROP", "ELSE", "END", "ESCAPE", "EXCEPT", "EXISTS", "FALSE",
    "FIRST", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IF", "IN", "INDEX", "INNER", "INSERT",
    "INTERSECT", "INTERVAL", "INTO", "IS", "JOIN", "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "NATURAL",
    "NOT", "NOTHING", "NULL", "NULLS", "OFFSET", "ON", "OR", "ORDER", "OUTER", "OVER", "PARTITION",
    "PRIMARY", "RECURSIVE", "REFERENCES", "RENAME", "REPLACE", "RETURNING", "RIGHT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TO", "TRIGGER", "TRUE", "UNION", "UNIQUE", "UPDATE",
    "USING", "VALUES", "VIEW", "WHEN", "WHERE", "WINDOW", "WITH",
];

/// Function names that become keywords when directly called
const FUNCTIONS: &[&str] = &[
    "ABS", "ARRAY_AGG", "AVG", "CAST", "COALESCE", "CONCAT", "COUNT", "DATE", "DENSE_RANK", "EXTRACT",
    "GROUP_CONCAT", "IFNULL", "LENGTH", "LOWER", "MAX", "MIN", "NOW", "NULLIF", "RANK", "ROUND",
    "ROW_NUMBER", "STRING_AGG", "SUBSTR", "SUBSTRING", "SUM", "TRIM", "UPPER",
];

/// Keywords that are written like functions: `COUNT(*)`, `LEFT(name, 3)`
const CALLABLE: &[&str] = &["LEFT", "RIGHT", "REPLACE"];

/// Keywords that end an operand, so a following `-` is binary
const VALUE_KEYWORDS: &[&str] = &["NULL", "TRUE", "FALSE", "END", "CURRENT_TIMESTAMP"];

fn contains(set: &[&str], word: &str) -> bool {
    set.iter().any(|w| w.eq_ignore_ascii_case(word))
}

/// Is `word` in the reserved-word set?
pub fn is_reserved(word: &str) -> bool {
    contains(RESERVED, word)
}

/// Is `word` a known function name?
pub fn is_function(word: &str) -> bool {
    contains(FUNCTIONS, word)
}

/// Keywords written without a space before their argument list
pub fn is_callable(word: &str) -> bool {
    contains(FUNCTIONS, word) || contains(CALLABLE, word)
}

pub fn is_value_keyword(word: &str) -> bool {
    contains(VALUE_KEYWORDS, word)
}

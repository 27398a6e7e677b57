//! Identifier casing derived from schema titles.
//!
//! Titles are split into words at non-alphanumeric characters, at
//! lower-to-upper transitions, at the end of an acronym ("XMLParser" →
//! "XML", "Parser") and between letters and digits. The casings below join
//! those words back together.

/// Split a title into words.
pub fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in s.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
                let next = chars.get(i + 1).copied();
                let boundary = (prev.is_lowercase() && c.is_uppercase())
                    || (prev.is_uppercase()
                        && c.is_uppercase()
                        && next.map_or(false, char::is_lowercase))
                    || (prev.is_numeric() != c.is_numeric());
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `"My Schema"` → `"mySchema"`
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in words(s).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `"My Schema"` → `"MySchema"`
pub fn to_pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// `"My Schema"` → `"my_schema"`
pub fn to_snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Check if a string is a Rust keyword
pub fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async" | "await" | "break" | "const" | "continue" | "crate" | "dyn"
            | "else" | "enum" | "extern" | "false" | "fn" | "for" | "if" | "impl"
            | "in" | "let" | "loop" | "match" | "mod" | "move" | "mut" | "pub"
            | "ref" | "return" | "self" | "Self" | "static" | "struct" | "super"
            | "trait" | "true" | "type" | "unsafe" | "use" | "where" | "while"
            | "abstract" | "become" | "box" | "do" | "final" | "macro" | "override"
            | "priv" | "typeof" | "unsized" | "virtual" | "yield" | "try"
    )
}

pub fn is_python_keyword(s: &str) -> bool {
    matches!(
        s,
        "False" | "None" | "True" | "and" | "as" | "assert" | "async" | "await"
            | "break" | "class" | "continue" | "def" | "del" | "elif" | "else"
            | "except" | "finally" | "for" | "from" | "global" | "if" | "import"
            | "in" | "is" | "lambda" | "nonlocal" | "not" | "or" | "pass"
            | "raise" | "return" | "try" | "while" | "with" | "yield"
    )
}

pub fn is_go_keyword(s: &str) -> bool {
    matches!(
        s,
        "break" | "case" | "chan" | "const" | "continue" | "default" | "defer" | "else"
            | "fallthrough" | "for" | "func" | "go" | "goto" | "if" | "import"
            | "interface" | "map" | "package" | "range" | "return" | "select"
            | "struct" | "switch" | "type" | "var"
    )
}

/// Reserved words that cannot name a TypeScript binding in a module.
pub fn is_ts_reserved(s: &str) -> bool {
    matches!(
        s,
        "break" | "case" | "catch" | "class" | "const" | "continue" | "debugger"
            | "default" | "delete" | "do" | "else" | "enum" | "export" | "extends"
            | "false" | "finally" | "for" | "function" | "if" | "import" | "in"
            | "instanceof" | "new" | "null" | "return" | "super" | "switch" | "this"
            | "throw" | "true" | "try" | "typeof" | "var" | "void" | "while" | "with"
            | "implements" | "interface" | "let" | "package" | "private"
            | "protected" | "public" | "static" | "yield" | "await"
    )
}

/// Identifier for generated source: digit-safe, with a trailing `_` when it
/// collides with a keyword of the target language.
pub fn safe_ident(ident: String, is_keyword: fn(&str) -> bool) -> String {
    let ident = leading_digit_safe(ident);
    if is_keyword(&ident) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// A valid identifier must not start with a digit.
pub fn leading_digit_safe(ident: String) -> String {
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", ident)
    } else {
        ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        assert_eq!(words("Foo Bar"), vec!["Foo", "Bar"]);
        assert_eq!(words("fooBar-baz_qux"), vec!["foo", "Bar", "baz", "qux"]);
        assert_eq!(words("XMLHttpRequest"), vec!["XML", "Http", "Request"]);
        assert_eq!(words("v2Schema"), vec!["v", "2", "Schema"]);
        assert!(words("  --  ").is_empty());
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("My Schema"), "mySchema");
        assert_eq!(to_camel_case("Foo Bar"), "fooBar");
        assert_eq!(to_camel_case("OPEN-RPC meta"), "openRpcMeta");
        assert_eq!(to_camel_case("already_snake"), "alreadySnake");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Foo Bar"), "foo_bar");
        assert_eq!(to_snake_case("TenantId"), "tenant_id");
        assert_eq!(to_snake_case("API"), "api");
        assert_eq!(to_snake_case("JSON Schema v7"), "json_schema_v_7");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("foo bar"), "FooBar");
        assert_eq!(to_pascal_case("tenant_id"), "TenantId");
        assert_eq!(to_pascal_case("user-profile"), "UserProfile");
    }

    #[test]
    fn test_safe_ident() {
        assert_eq!(safe_ident("type".into(), is_go_keyword), "type_");
        assert_eq!(safe_ident("default".into(), is_ts_reserved), "default_");
        assert_eq!(safe_ident("fooBar".into(), is_ts_reserved), "fooBar");
        assert_eq!(safe_ident("3d".into(), is_go_keyword), "_3d");
    }

    #[test]
    fn test_leading_digit_safe() {
        assert_eq!(leading_digit_safe("3d".into()), "_3d");
        assert_eq!(leading_digit_safe("d3".into()), "d3");
    }
}

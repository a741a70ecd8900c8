//! Quoting utilities for PostgreSQL identifiers and string literals.

/// Wrap `s` in `quote_char`, doubling every embedded occurrence of it.
///
/// PostgreSQL escapes a quote inside a quoted token by repeating it, for both
/// `"identifiers"` and `'literals'` (with `standard_conforming_strings` on).
pub fn quote_with(s: &str, quote_char: char) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push(quote_char);
    for c in s.chars() {
        if c == quote_char {
            result.push(c);
        }
        result.push(c);
    }
    result.push(quote_char);
    result
}

/// Quote an identifier: `users` → `"users"`, `a"b` → `"a""b"`.
#[inline]
pub fn quote_ident(name: &str) -> String {
    quote_with(name, '"')
}

/// Quote a string literal: `O'Brien` → `'O''Brien'`.
#[inline]
pub fn quote_literal(s: &str) -> String {
    quote_with(s, '\'')
}

/// Quote and dot-join identifier parts: `["public", "users"]` → `"public"."users"`.
pub fn qualify(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| quote_ident(part))
        .collect::<Vec<_>>()
        .join(".")
}

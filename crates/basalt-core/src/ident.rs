//! Identifier quoting.

/// Wraps an identifier in double quotes.
///
/// Dotted qualified names have each segment quoted and rejoined, so
/// `public.posts` becomes `"public"."posts"`.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    let quoted: Vec<String> = name.split('.').map(|seg| format!("\"{seg}\"")).collect();
    quoted.join(".")
}

mod macros;

pub use macros::*;

/// Converts `string` into a slug: lowercases it, removes every character that
/// isn't an ASCII letter, digit, space, or hyphen, then replaces each space
/// with a hyphen.
///
/// Slugs are used for identity-key values, category names, and locator keys.
/// Labels shown to users keep their original text.
///
/// ```rust
/// use trellis::util::slugify;
///
/// assert_eq!(slugify("Spring Garden Tour!"), "spring-garden-tour");
/// assert_eq!(slugify(&slugify("Spring Garden Tour!")), "spring-garden-tour");
/// ```
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());
    for ch in string.chars().flat_map(char::to_lowercase) {
        match ch {
            'a'..='z' | '0'..='9' | '-' => output.push(ch),
            ' ' => output.push('-'),
            _ => {}
        }
    }

    output
}

/// Returns `true` if `slug` is exactly what [`slugify()`] would produce for
/// some input, that is, it consists only of `[a-z0-9-]`.
pub fn is_slug(slug: &str) -> bool {
    slug.bytes().all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'))
}

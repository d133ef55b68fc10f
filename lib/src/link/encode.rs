/// Takes a set of sets of byte characters, return a 2^8 array with non-zero
/// values at the indices corresponding to the character byte values.
const fn char_table(sets: &[&[u8]]) -> [u8; 256] {
    let mut table = [0u8; 256];

    let mut i = 0;
    while i < sets.len() {
        let set: &[u8] = sets[i];

        let mut j = 0;
        while j < set.len() {
            let c: u8 = set[j];
            table[c as usize] = c;
            j += 1;
        }

        i += 1;
    }

    table
}

const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const DIGIT: &[u8] = b"0123456789";

/// Bytes a form-encoded query component may carry unescaped.
const FORM_CHARS: [u8; 256] = char_table(&[ALPHA, DIGIT, b"*-._"]);

/// Bytes a path segment may carry unescaped.
const SEGMENT_CHARS: [u8; 256] = char_table(&[ALPHA, DIGIT, b"-._~"]);

const HEX: &[u8; 16] = b"0123456789ABCDEF";

#[inline(always)]
const fn is_form_char(c: u8) -> bool { FORM_CHARS[c as usize] != 0 }

#[inline(always)]
const fn is_segment_char(c: u8) -> bool { SEGMENT_CHARS[c as usize] != 0 }

fn push_escaped(output: &mut String, b: u8) {
    output.push('%');
    output.push(HEX[(b >> 4) as usize] as char);
    output.push(HEX[(b & 0xF) as usize] as char);
}

/// Encodes `value` as an `application/x-www-form-urlencoded` component.
///
/// ```rust
/// use trellis::link::encode_component;
///
/// assert_eq!(encode_component("garden-tour"), "garden-tour");
/// assert_eq!(encode_component("a b&c"), "a+b%26c");
/// ```
pub fn encode_component(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b' ' => output.push('+'),
            b if is_form_char(b) => output.push(b as char),
            b => push_escaped(&mut output, b),
        }
    }

    output
}

/// Encodes `value` for use as a single URL path segment.
pub fn encode_segment(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b if is_segment_char(b) => output.push(b as char),
            b => push_escaped(&mut output, b),
        }
    }

    output
}

/// Decodes a form-encoded component. Malformed escapes are kept verbatim.
pub fn decode_component(value: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None
        }
    }

    let bytes = value.as_bytes();
    let mut output = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => output.push(b' '),
            b'%' => match (bytes.get(i + 1).copied().and_then(hex), bytes.get(i + 2).copied().and_then(hex)) {
                (Some(hi), Some(lo)) => {
                    output.push(hi << 4 | lo);
                    i += 2;
                }
                _ => output.push(b'%'),
            },
            b => output.push(b),
        }

        i += 1;
    }

    String::from_utf8_lossy(&output).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_char_table(table: &[u8]) {
        for (i, &v) in table.iter().enumerate() {
            if v != 0 {
                assert_eq!(i, v as usize);
            }
        }
    }

    #[test]
    fn check_tables() {
        test_char_table(&FORM_CHARS[..]);
        test_char_table(&SEGMENT_CHARS[..]);
    }

    #[test]
    fn escapes() {
        assert_eq!(encode_component("50% off"), "50%25+off");
        assert_eq!(encode_component("caf\u{e9}"), "caf%C3%A9");
        assert_eq!(encode_segment("two words/x"), "two%20words%2Fx");
        assert_eq!(decode_component("a+b%26c"), "a b&c");
        assert_eq!(decode_component("caf%c3%a9"), "caf\u{e9}");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
    }
}

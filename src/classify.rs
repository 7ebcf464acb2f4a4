//! Byte predicates shared by the parser and the formatter.

pub fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t' || is_newline(b)
}

pub fn is_newline(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

pub fn is_object_begin(b: u8) -> bool {
    b == b'{'
}

pub fn is_object_end(b: u8) -> bool {
    b == b'}'
}

pub fn is_array_begin(b: u8) -> bool {
    b == b'['
}

pub fn is_array_end(b: u8) -> bool {
    b == b']'
}

pub fn is_quote(b: u8) -> bool {
    b == b'"'
}

pub fn is_backslash(b: u8) -> bool {
    b == b'\\'
}

pub fn is_minus(b: u8) -> bool {
    b == b'-'
}

pub fn is_exponent(b: u8) -> bool {
    b == b'e' || b == b'E'
}

pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

pub fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

pub fn is_oct(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

pub fn is_bin(b: u8) -> bool {
    b == b'0' || b == b'1'
}

pub fn is_base_prefix(b: u8) -> bool {
    b == b'x' || b == b'o' || b == b'b'
}

pub fn is_lower_alpha(b: u8) -> bool {
    b.is_ascii_lowercase()
}

/// ASCII control characters, including DEL.
pub fn is_control(b: u8) -> bool {
    b <= 0x1f || b == 0x7f
}

/// Bytes that may appear unescaped between the quotes of a string.
pub fn is_allowed_alpha(b: u8) -> bool {
    !is_quote(b) && !is_backslash(b) && !is_control(b)
}

/// Value of a hexadecimal digit, either case.
pub fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        for b in [b' ', b'\t', b'\r', b'\n'] {
            assert!(is_whitespace(b));
        }
        for b in [b'a', b'{', 0x0b, 0x0c, 0x00] {
            assert!(!is_whitespace(b));
        }
    }

    #[test]
    fn test_digit_classes() {
        assert!(is_oct(b'7'));
        assert!(!is_oct(b'8'));
        assert!(is_bin(b'1'));
        assert!(!is_bin(b'2'));
        assert!(is_hex(b'F') && is_hex(b'f') && is_hex(b'9'));
        assert!(!is_hex(b'g'));
        assert_eq!(hex_value(b'a'), Some(10));
        assert_eq!(hex_value(b'F'), Some(15));
        assert_eq!(hex_value(b'7'), Some(7));
        assert_eq!(hex_value(b'x'), None);
    }

    #[test]
    fn test_string_alphabet() {
        assert!(is_allowed_alpha(b'a'));
        assert!(is_allowed_alpha(b'/'));
        assert!(is_allowed_alpha(0xc3));
        assert!(!is_allowed_alpha(b'"'));
        assert!(!is_allowed_alpha(b'\\'));
        assert!(!is_allowed_alpha(b'\n'));
        assert!(!is_allowed_alpha(0x00));
        assert!(!is_allowed_alpha(0x7f));
    }
}

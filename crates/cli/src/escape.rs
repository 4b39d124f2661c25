/// Escape arbitrary bytes into a printable ASCII string, for embedding a
/// pattern or replacement fragment inside an error message or `--colors`
/// report.
///
/// Bytes outside of a printable ASCII whitelist are rendered as `\xNN`, and
/// `\n`/`\r`/`\t`/`\\` are rendered as their common two-character escapes.
pub fn escape(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => escaped.push_str(r"\n"),
            b'\r' => escaped.push_str(r"\r"),
            b'\t' => escaped.push_str(r"\t"),
            b'\\' => escaped.push_str(r"\\"),
            0x20..=0x7e => escaped.push(b as char),
            _ => escaped.push_str(&format!(r"\x{:02x}", b)),
        }
    }
    escaped
}

/// Reverse of [`escape`]: replace `\n`, `\r`, `\t`, `\0`, `\xNN` and `\\`
/// escape sequences in `s` with the bytes they denote. Any other
/// backslash-prefixed sequence is left untouched (backslash included), since
/// it's most likely a regex metacharacter escape meant for the matcher, not
/// for this layer.
pub fn unescape(s: &str) -> Vec<u8> {
    #[derive(Clone, Copy, Eq, PartialEq)]
    enum State {
        Literal,
        Escape,
        HexFirst,
        HexSecond(u8),
    }

    let mut bytes = Vec::with_capacity(s.len());
    let mut state = State::Literal;
    for &b in s.as_bytes() {
        state = match state {
            State::Escape => match b {
                b'n' => {
                    bytes.push(b'\n');
                    State::Literal
                }
                b'r' => {
                    bytes.push(b'\r');
                    State::Literal
                }
                b't' => {
                    bytes.push(b'\t');
                    State::Literal
                }
                b'0' => {
                    bytes.push(0);
                    State::Literal
                }
                b'\\' => {
                    bytes.push(b'\\');
                    State::Literal
                }
                b'x' => State::HexFirst,
                _ => {
                    bytes.push(b'\\');
                    bytes.push(b);
                    State::Literal
                }
            },
            State::HexFirst => State::HexSecond(b),
            State::HexSecond(hi) => {
                if let (Some(hi), Some(lo)) = (hex_digit(hi), hex_digit(b)) {
                    bytes.push(hi * 16 + lo);
                } else {
                    bytes.push(b'x');
                    bytes.push(hi);
                    bytes.push(b);
                }
                State::Literal
            }
            State::Literal if b == b'\\' => State::Escape,
            State::Literal => {
                bytes.push(b);
                State::Literal
            }
        };
    }
    if let State::Escape = state {
        bytes.push(b'\\');
    }
    bytes
}

fn hex_digit(b: u8) -> Option<u8> {
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
    fn escape_renders_common_escapes() {
        assert_eq!(escape(b"a\nb\tc"), r"a\nb\tc");
    }

    #[test]
    fn escape_renders_non_printable_as_hex() {
        assert_eq!(escape(&[0x00, 0x7f]), r"\x00\x7f");
    }

    #[test]
    fn unescape_round_trips_common_escapes() {
        assert_eq!(unescape(r"a\nb\tc"), b"a\nb\tc");
    }

    #[test]
    fn unescape_decodes_hex_bytes() {
        assert_eq!(unescape(r"\x41\x42"), b"AB");
    }

    #[test]
    fn unescape_leaves_unknown_escapes_alone() {
        assert_eq!(unescape(r"\d+"), br"\d+");
    }
}

/// Interpolates the capture references in `replacement` into `dst`, using
/// `name_to_index` to resolve named groups and `append` to resolve the
/// text of each indexed group.
///
/// This implements the same replacement syntax as the `regex` crate's
/// `Captures::expand`: `$1`, `$name`, `${1}` and `${name}` are all
/// substituted with the corresponding capture group (or left untouched,
/// along with the `$`, if the group doesn't exist). `$$` escapes to a
/// literal `$`.
pub fn interpolate<A, N>(
    mut replacement: &[u8],
    mut append: A,
    mut name_to_index: N,
    dst: &mut Vec<u8>,
) where
    A: FnMut(usize, &mut Vec<u8>),
    N: FnMut(&str) -> Option<usize>,
{
    loop {
        let dollar = match replacement.iter().position(|&b| b == b'$') {
            None => break,
            Some(i) => i,
        };
        dst.extend(&replacement[..dollar]);
        let rest = &replacement[dollar..];
        match find_ref(rest) {
            None => {
                dst.push(b'$');
                replacement = &rest[1..];
            }
            Some(CaptureRef::Literal) => {
                dst.push(b'$');
                replacement = &rest[2..];
            }
            Some(CaptureRef::Number { cap, end }) => {
                append(cap, dst);
                replacement = &rest[end..];
            }
            Some(CaptureRef::Named { name, end }) => {
                if let Some(i) = name_to_index(name) {
                    append(i, dst);
                }
                replacement = &rest[end..];
            }
        }
    }
    dst.extend(replacement);
}

/// A capture reference recognized at the start of a `$`-prefixed slice.
#[derive(Debug, Eq, PartialEq)]
enum CaptureRef<'a> {
    /// `$$`, an escape for a literal `$`.
    Literal,
    /// `$1` or `${1}`; `end` is the byte length of the reference.
    Number { cap: usize, end: usize },
    /// `$name` or `${name}`; `end` is the byte length of the reference.
    Named { name: &'a str, end: usize },
}

/// Parses a `$`-prefixed capture reference occurring at the start of
/// `text`. Returns `None` if `text` doesn't begin with a recognized
/// reference, in which case the `$` is emitted literally by the caller.
fn find_ref(text: &[u8]) -> Option<CaptureRef<'_>> {
    debug_assert_eq!(text.first(), Some(&b'$'));
    if text.len() < 2 {
        return None;
    }
    if text[1] == b'$' {
        return Some(CaptureRef::Literal);
    }
    if text[1] == b'{' {
        let close = text.iter().position(|&b| b == b'}')?;
        let name = std::str::from_utf8(&text[2..close]).ok()?;
        if name.is_empty() {
            return None;
        }
        return Some(match name.parse::<u32>() {
            Ok(i) => CaptureRef::Number { cap: i as usize, end: close + 1 },
            Err(_) => CaptureRef::Named { name, end: close + 1 },
        });
    }
    let name_end = text[1..]
        .iter()
        .position(|&b| !is_valid_cap_letter(b))
        .map(|i| i + 1)
        .unwrap_or(text.len());
    if name_end == 1 {
        return None;
    }
    let name = std::str::from_utf8(&text[1..name_end]).ok()?;
    Some(match name.parse::<u32>() {
        Ok(i) => CaptureRef::Number { cap: i as usize, end: name_end },
        Err(_) => CaptureRef::Named { name, end: name_end },
    })
}

fn is_valid_cap_letter(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_')
}

#[cfg(test)]
mod tests {
    use super::interpolate;

    fn interp(replacement: &str, caps: &[(&str, usize)], dsts: &[(usize, &str)]) -> String {
        let mut dst = vec![];
        interpolate(
            replacement.as_bytes(),
            |i, dst| {
                if let Some(&(_, s)) = dsts.iter().find(|&&(j, _)| i == j) {
                    dst.extend(s.as_bytes());
                }
            },
            |name| caps.iter().find(|&&(n, _)| n == name).map(|&(_, i)| i),
            &mut dst,
        );
        String::from_utf8(dst).unwrap()
    }

    #[test]
    fn numbered() {
        let dsts = [(0, "FULL"), (1, "ONE"), (2, "TWO")];
        assert_eq!(interp("$0", &[], &dsts), "FULL");
        assert_eq!(interp("$1", &[], &dsts), "ONE");
        assert_eq!(interp("$2", &[], &dsts), "TWO");
        assert_eq!(interp("a$1b$2c", &[], &dsts), "aONEbTWOc");
        assert_eq!(interp("${1}x", &[], &dsts), "ONEx");
    }

    #[test]
    fn named() {
        let caps = [("foo", 1usize)];
        let dsts = [(1, "MATCH")];
        assert_eq!(interp("$foo", &caps, &dsts), "MATCH");
        assert_eq!(interp("${foo}bar", &caps, &dsts), "MATCHbar");
    }

    #[test]
    fn literal_dollar() {
        assert_eq!(interp("$$", &[], &[]), "$");
        assert_eq!(interp("a$$b", &[], &[]), "a$b");
    }

    #[test]
    fn missing_group_is_dropped() {
        assert_eq!(interp("x$9y", &[], &[]), "xy");
    }

    #[test]
    fn dangling_dollar_is_literal() {
        assert_eq!(interp("foo$", &[], &[]), "foo$");
    }
}

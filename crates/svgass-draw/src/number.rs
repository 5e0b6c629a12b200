//! Number lexing shared by the attribute and path interpreters.

/// Byte cursor over numeric mini-language text.
///
/// Whitespace and commas both separate tokens.
pub(crate) struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    pub(crate) fn skip_separators(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && (bytes[self.pos].is_ascii_whitespace() || bytes[self.pos] == b',') {
            self.pos += 1;
        }
    }

    /// Next byte after separators, without consuming it.
    pub(crate) fn peek(&mut self) -> Option<u8> {
        self.skip_separators();
        self.bytes().get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    /// Whether the next token looks like the start of a number.
    pub(crate) fn at_number(&mut self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'+' | b'-' | b'.'))
    }

    /// Read one number. On failure the position is left unchanged.
    pub(crate) fn number(&mut self) -> Option<f64> {
        self.skip_separators();
        let start = self.pos;
        let end = scan_number(self.bytes(), start)?;
        let value = self.text[start..end].parse::<f64>().ok()?;
        self.pos = end;
        Some(value)
    }

    /// Read one arc flag: a single `0` or `1`, which may be glued to the
    /// following token.
    pub(crate) fn flag(&mut self) -> Option<bool> {
        let flag = match self.peek()? {
            b'0' => false,
            b'1' => true,
            _ => return None,
        };
        self.pos += 1;
        Some(flag)
    }
}

/// End of the number starting at `start`, if there is one.
///
/// Grammar: `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
fn scan_number(bytes: &[u8], start: usize) -> Option<usize> {
    let digits = |mut at: usize| {
        let from = at;
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        (at, at - from)
    };

    let mut at = start;
    if matches!(bytes.get(at), Some(b'+' | b'-')) {
        at += 1;
    }
    let (after_int, int_len) = digits(at);
    at = after_int;
    let mut frac_len = 0;
    if bytes.get(at) == Some(&b'.') {
        let (after_frac, len) = digits(at + 1);
        if int_len > 0 || len > 0 {
            at = after_frac;
            frac_len = len;
        }
    }
    if int_len == 0 && frac_len == 0 {
        return None;
    }

    if matches!(bytes.get(at), Some(b'e' | b'E')) {
        let mut exp = at + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let (after_exp, exp_len) = digits(exp);
        if exp_len > 0 {
            at = after_exp;
        }
    }
    Some(at)
}

/// Leading number of `s` after optional whitespace; trailing text such as
/// a unit suffix is ignored.
pub(crate) fn leading_number(s: &str) -> Option<f64> {
    Lexer::new(s.trim_start()).number()
}

/// Every number up to the first non-numeric token.
pub(crate) fn number_list(s: &str) -> Vec<f64> {
    let mut lexer = Lexer::new(s);
    std::iter::from_fn(|| lexer.number()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_forms() {
        assert_eq!(number_list("1 -2.5 .5 +3 1e2 2.E-1"), vec![1.0, -2.5, 0.5, 3.0, 100.0, 0.2]);
    }

    #[test]
    fn test_glued_numbers() {
        // "0.5.5" is two numbers, "-1-2" too
        assert_eq!(number_list("0.5.5-1-2"), vec![0.5, 0.5, -1.0, -2.0]);
    }

    #[test]
    fn test_exponent_needs_digits() {
        let mut lexer = Lexer::new("3em");
        assert_eq!(lexer.number(), Some(3.0));
        assert_eq!(lexer.peek(), Some(b'e'));
    }

    #[test]
    fn test_failure_keeps_position() {
        let mut lexer = Lexer::new("  - x");
        assert_eq!(lexer.number(), None);
        assert_eq!(lexer.peek(), Some(b'-'));
    }

    #[test]
    fn test_flags() {
        let mut lexer = Lexer::new("1,0 01");
        assert_eq!(lexer.flag(), Some(true));
        assert_eq!(lexer.flag(), Some(false));
        assert_eq!(lexer.flag(), Some(false));
        assert_eq!(lexer.flag(), Some(true));
        assert_eq!(lexer.flag(), None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number(" 2px"), Some(2.0));
        assert_eq!(leading_number("50%"), Some(50.0));
        assert_eq!(leading_number("auto"), None);
    }
}

//! ECMAScript pattern syntax validation.
//!
//! Validates a pattern against its flag set before any stencil is
//! created. With the `u` flag the full strict grammar applies: invalid
//! escapes, raw brackets and quantified assertions are errors. Without
//! it, the web-compatibility extensions apply and most malformed escapes
//! fall back to literal characters.
//!
//! This is a recognizer only; it never builds a match automaton.

use super::RegExpFlags;

/// A pattern rejected by [`check_pattern_syntax`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSyntaxError {
    /// Human-readable description
    pub message: String,
    /// Byte offset of the error within the pattern
    pub offset: usize,
}

/// Validate `pattern` under `flags`.
///
/// Returns `Ok(())` exactly when the pattern is a syntactically valid
/// regular expression for the given flag set.
pub fn check_pattern_syntax(pattern: &str, flags: RegExpFlags) -> Result<(), PatternSyntaxError> {
    let (capture_count, group_names) = prescan(pattern)?;
    let mut checker = PatternChecker {
        text: pattern,
        pos: 0,
        unicode: flags.unicode(),
        capture_count,
        group_names,
    };
    checker.disjunction()?;
    if checker.pos != pattern.len() {
        // disjunction() only stops early at an unopened ')'.
        return Err(checker.error("unmatched ) in regular expression"));
    }
    Ok(())
}

/// Count capture groups and collect named-group names ahead of the main
/// parse, so backreferences that appear before their group validate.
fn prescan(text: &str) -> Result<(u32, Vec<&str>), PatternSyntaxError> {
    let mut captures = 0u32;
    let mut names: Vec<&str> = Vec::new();
    let mut in_class = false;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if chars.peek().map(|&(_, c)| c) != Some('?') {
                    captures += 1;
                    continue;
                }
                chars.next();
                if chars.peek().map(|&(_, c)| c) != Some('<') {
                    continue;
                }
                chars.next();
                match chars.peek().map(|&(_, c)| c) {
                    Some('=') | Some('!') => continue,
                    _ => {}
                }
                // Named capture group; the main parse validates the
                // name's character set.
                captures += 1;
                let name_start = chars.peek().map_or(text.len(), |&(i, _)| i);
                while let Some(&(_, c)) = chars.peek() {
                    if c == '>' {
                        break;
                    }
                    chars.next();
                }
                let name_end = chars.peek().map_or(text.len(), |&(i, _)| i);
                let name = &text[name_start..name_end];
                if names.contains(&name) {
                    return Err(PatternSyntaxError {
                        message: "duplicate capture group name".to_string(),
                        offset,
                    });
                }
                names.push(name);
            }
            _ => {}
        }
    }
    Ok((captures, names))
}

/// Whether a term can carry a quantifier.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Quantifiable {
    Yes,
    /// Assertions; quantifiable only under the web-compat grammar
    LegacyOnly,
    /// Lookbehind assertions; never quantifiable
    No,
}

struct PatternChecker<'a> {
    text: &'a str,
    pos: usize,
    unicode: bool,
    capture_count: u32,
    group_names: Vec<&'a str>,
}

impl<'a> PatternChecker<'a> {
    fn error(&self, message: &str) -> PatternSyntaxError {
        PatternSyntaxError {
            message: message.to_string(),
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.text[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    // ======================================================================
    // Disjunction / Alternative / Term
    // ======================================================================

    fn disjunction(&mut self) -> Result<(), PatternSyntaxError> {
        loop {
            self.alternative()?;
            if !self.eat('|') {
                return Ok(());
            }
        }
    }

    fn alternative(&mut self) -> Result<(), PatternSyntaxError> {
        loop {
            let Some(c) = self.peek() else { return Ok(()) };
            if c == '|' || c == ')' {
                return Ok(());
            }
            let quantifiable = self.term(c)?;
            let quantifier_offset = self.pos;
            if self.try_quantifier()? {
                let allowed = match quantifiable {
                    Quantifiable::Yes => true,
                    Quantifiable::LegacyOnly => !self.unicode,
                    Quantifiable::No => false,
                };
                if !allowed {
                    return Err(PatternSyntaxError {
                        message: "invalid quantifier".to_string(),
                        offset: quantifier_offset,
                    });
                }
            }
        }
    }

    fn term(&mut self, c: char) -> Result<Quantifiable, PatternSyntaxError> {
        match c {
            '^' | '$' => {
                self.bump();
                Ok(Quantifiable::LegacyOnly)
            }
            '\\' => {
                self.bump();
                self.atom_escape()
            }
            '(' => {
                self.bump();
                self.group()
            }
            '[' => {
                self.bump();
                self.character_class()?;
                Ok(Quantifiable::Yes)
            }
            '*' | '+' | '?' => Err(self.error("nothing to repeat")),
            '{' => {
                // A well-formed bounded quantifier with no preceding
                // atom; anything else is a literal brace outside the
                // strict grammar.
                let start = self.pos;
                if self.try_quantifier()? {
                    self.pos = start;
                    return Err(self.error("nothing to repeat"));
                }
                if self.unicode {
                    return Err(self.error(
                        "raw bracket is not allowed in regular expression with unicode flag",
                    ));
                }
                self.bump();
                Ok(Quantifiable::Yes)
            }
            '}' | ']' => {
                if self.unicode {
                    return Err(self.error(
                        "raw bracket is not allowed in regular expression with unicode flag",
                    ));
                }
                self.bump();
                Ok(Quantifiable::Yes)
            }
            _ => {
                self.bump();
                Ok(Quantifiable::Yes)
            }
        }
    }

    /// Consume a quantifier if one starts here. Returns whether one was
    /// consumed; a malformed `{` sequence is left untouched.
    fn try_quantifier(&mut self) -> Result<bool, PatternSyntaxError> {
        match self.peek() {
            Some('*') | Some('+') | Some('?') => {
                self.bump();
                self.eat('?');
                Ok(true)
            }
            Some('{') => {
                let start = self.pos;
                self.bump();
                let Some(min) = self.decimal_digits() else {
                    self.pos = start;
                    return Ok(false);
                };
                let max = if self.eat(',') {
                    if self.peek() == Some('}') { None } else { self.decimal_digits() }
                } else {
                    Some(min)
                };
                if self.eat(',') || !self.eat('}') {
                    self.pos = start;
                    return Ok(false);
                }
                if let Some(max) = max {
                    if max < min {
                        self.pos = start;
                        return Err(self.error("numbers out of order in {} quantifier"));
                    }
                }
                self.eat('?');
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn decimal_digits(&mut self) -> Option<u64> {
        let mut value: Option<u64> = None;
        while let Some(c) = self.peek() {
            let Some(digit) = c.to_digit(10) else { break };
            self.bump();
            value = Some(
                value
                    .unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(u64::from(digit)),
            );
        }
        value
    }

    // ======================================================================
    // Groups and assertions
    // ======================================================================

    fn group(&mut self) -> Result<Quantifiable, PatternSyntaxError> {
        if !self.eat('?') {
            self.disjunction()?;
            self.expect_group_close()?;
            return Ok(Quantifiable::Yes);
        }
        match self.peek() {
            Some(':') => {
                self.bump();
                self.disjunction()?;
                self.expect_group_close()?;
                Ok(Quantifiable::Yes)
            }
            Some('=') | Some('!') => {
                self.bump();
                self.disjunction()?;
                self.expect_group_close()?;
                Ok(Quantifiable::LegacyOnly)
            }
            Some('<') => {
                self.bump();
                match self.peek() {
                    Some('=') | Some('!') => {
                        self.bump();
                        self.disjunction()?;
                        self.expect_group_close()?;
                        Ok(Quantifiable::No)
                    }
                    _ => {
                        self.group_name()?;
                        self.disjunction()?;
                        self.expect_group_close()?;
                        Ok(Quantifiable::Yes)
                    }
                }
            }
            _ => Err(self.error("invalid group")),
        }
    }

    fn expect_group_close(&mut self) -> Result<(), PatternSyntaxError> {
        if !self.eat(')') {
            return Err(self.error("missing ) in regular expression"));
        }
        Ok(())
    }

    fn group_name(&mut self) -> Result<(), PatternSyntaxError> {
        let mut first = true;
        loop {
            match self.peek() {
                Some('>') if !first => {
                    self.bump();
                    return Ok(());
                }
                Some(c) if is_group_name_char(c, first) => {
                    self.bump();
                    first = false;
                }
                _ => return Err(self.error("invalid capture group name")),
            }
        }
    }

    // ======================================================================
    // Escapes
    // ======================================================================

    fn atom_escape(&mut self) -> Result<Quantifiable, PatternSyntaxError> {
        let Some(c) = self.peek() else {
            return Err(self.error("trailing \\ in regular expression"));
        };
        match c {
            'b' | 'B' => {
                self.bump();
                Ok(Quantifiable::LegacyOnly)
            }
            '1'..='9' => {
                let reference = self.decimal_digits().unwrap_or(0);
                // Outside unicode mode an oversized reference falls back
                // to a legacy octal escape.
                if self.unicode && reference > u64::from(self.capture_count) {
                    return Err(self.error("back reference out of range"));
                }
                Ok(Quantifiable::Yes)
            }
            '0' => {
                self.bump();
                if self.unicode && self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.error("invalid decimal escape"));
                }
                Ok(Quantifiable::Yes)
            }
            'k' => {
                self.bump();
                // `\k` is a named backreference whenever the pattern has
                // named groups, and always under the strict grammar.
                if self.unicode || !self.group_names.is_empty() {
                    self.named_reference()?;
                }
                Ok(Quantifiable::Yes)
            }
            _ => {
                self.shared_escape(c, false)?;
                Ok(Quantifiable::Yes)
            }
        }
    }

    fn named_reference(&mut self) -> Result<(), PatternSyntaxError> {
        let offset = self.pos;
        if !self.eat('<') {
            return Err(self.error("invalid named capture reference"));
        }
        let name_start = self.pos;
        while self.peek().is_some_and(|c| c != '>') {
            self.bump();
        }
        let name = &self.text[name_start..self.pos];
        if !self.eat('>') || !self.group_names.contains(&name) {
            return Err(PatternSyntaxError {
                message: "invalid named capture reference".to_string(),
                offset,
            });
        }
        Ok(())
    }

    /// Escapes valid both inside and outside character classes. Returns
    /// the code point when the escape denotes a single character.
    fn shared_escape(&mut self, c: char, in_class: bool) -> Result<Option<u32>, PatternSyntaxError> {
        match c {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                self.bump();
                Ok(None)
            }
            'f' => { self.bump(); Ok(Some(0x0C)) }
            'n' => { self.bump(); Ok(Some(0x0A)) }
            'r' => { self.bump(); Ok(Some(0x0D)) }
            't' => { self.bump(); Ok(Some(0x09)) }
            'v' => { self.bump(); Ok(Some(0x0B)) }
            'c' => {
                self.bump();
                match self.peek() {
                    Some(l) if l.is_ascii_alphabetic() => {
                        self.bump();
                        Ok(Some(u32::from(l) % 32))
                    }
                    _ if self.unicode => Err(self.error("invalid escape sequence")),
                    // Web compat: `\c` with no control letter matches a
                    // literal backslash-c.
                    _ => Ok(Some(u32::from('c'))),
                }
            }
            'x' => {
                self.bump();
                match self.read_hex(2) {
                    Some(value) => Ok(Some(value)),
                    None if self.unicode => Err(self.error("invalid escape sequence")),
                    None => Ok(Some(u32::from('x'))),
                }
            }
            'u' => {
                self.bump();
                self.unicode_escape()
            }
            'p' | 'P' => {
                self.bump();
                if self.unicode {
                    self.unicode_property()?;
                    Ok(None)
                } else {
                    Ok(Some(u32::from(c)))
                }
            }
            '^' | '$' | '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}'
            | '|' | '/' => {
                self.bump();
                Ok(Some(u32::from(c)))
            }
            '-' => {
                // `\-` is a class escape only; outside a class the
                // strict grammar rejects it.
                if self.unicode && !in_class {
                    return Err(self.error("invalid identity escape"));
                }
                self.bump();
                Ok(Some(u32::from(c)))
            }
            _ => {
                if self.unicode {
                    return Err(self.error("invalid identity escape"));
                }
                self.bump();
                Ok(Some(u32::from(c)))
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<Option<u32>, PatternSyntaxError> {
        if self.unicode && self.peek() == Some('{') {
            self.bump();
            let digits_start = self.pos;
            let mut value: u32 = 0;
            while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
                self.bump();
                value = value.saturating_mul(16).saturating_add(digit);
            }
            if self.pos == digits_start || !self.eat('}') || value > 0x10FFFF {
                return Err(self.error("invalid unicode escape"));
            }
            return Ok(Some(value));
        }
        match self.read_hex(4) {
            Some(value) => Ok(Some(value)),
            None if self.unicode => Err(self.error("invalid unicode escape")),
            None => Ok(Some(u32::from('u'))),
        }
    }

    fn unicode_property(&mut self) -> Result<(), PatternSyntaxError> {
        if !self.eat('{') {
            return Err(self.error("invalid property name"));
        }
        let name_start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '=')
        {
            self.bump();
        }
        if self.pos == name_start || !self.eat('}') {
            return Err(self.error("invalid property name"));
        }
        Ok(())
    }

    fn read_hex(&mut self, count: usize) -> Option<u32> {
        let start = self.pos;
        let mut value = 0u32;
        for _ in 0..count {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                self.pos = start;
                return None;
            };
            self.bump();
            value = value * 16 + digit;
        }
        Some(value)
    }

    // ======================================================================
    // Character classes
    // ======================================================================

    fn character_class(&mut self) -> Result<(), PatternSyntaxError> {
        self.eat('^');
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated character class")),
                Some(']') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    let start_offset = self.pos;
                    let first = self.class_atom()?;
                    if self.peek() != Some('-') || self.peek2() == Some(']') || self.peek2().is_none()
                    {
                        continue;
                    }
                    self.bump();
                    let second = self.class_atom()?;
                    match (first, second) {
                        (Some(lo), Some(hi)) => {
                            if lo > hi {
                                return Err(PatternSyntaxError {
                                    message: "range out of order in character class".to_string(),
                                    offset: start_offset,
                                });
                            }
                        }
                        _ => {
                            // A class escape as a range bound is only an
                            // error under the strict grammar.
                            if self.unicode {
                                return Err(PatternSyntaxError {
                                    message: "invalid character class".to_string(),
                                    offset: start_offset,
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    fn class_atom(&mut self) -> Result<Option<u32>, PatternSyntaxError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated character class"));
        };
        if c != '\\' {
            return Ok(Some(u32::from(c)));
        }
        let Some(c) = self.peek() else {
            return Err(self.error("trailing \\ in regular expression"));
        };
        match c {
            'b' => {
                self.bump();
                Ok(Some(0x08))
            }
            'B' => {
                if self.unicode {
                    return Err(self.error("invalid escape sequence"));
                }
                self.bump();
                Ok(Some(u32::from('B')))
            }
            '0'..='9' => {
                if self.unicode && c != '0' {
                    return Err(self.error("invalid decimal escape"));
                }
                // Legacy octal-ish escape; consume the digit run.
                self.decimal_digits();
                Ok(Some(0))
            }
            _ => self.shared_escape(c, true),
        }
    }
}

fn is_group_name_char(c: char, first: bool) -> bool {
    if first {
        c.is_alphabetic() || c == '_' || c == '$'
    } else {
        c.is_alphanumeric() || c == '_' || c == '$'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pattern: &str) -> Result<(), PatternSyntaxError> {
        check_pattern_syntax(pattern, RegExpFlags::empty())
    }

    fn check_unicode(pattern: &str) -> Result<(), PatternSyntaxError> {
        check_pattern_syntax(pattern, RegExpFlags::UNICODE)
    }

    #[test]
    fn test_accepts_simple_patterns() {
        assert!(check("abc").is_ok());
        assert!(check("a(b|c)*d").is_ok());
        assert!(check("^foo$").is_ok());
        assert!(check(".+?").is_ok());
        assert!(check("a{2,4}b{3}c{5,}").is_ok());
        assert!(check(r"\d+\.\d*").is_ok());
    }

    #[test]
    fn test_accepts_classes_and_groups() {
        assert!(check(r"[a-z\d_]+").is_ok());
        assert!(check("[^abc]").is_ok());
        assert!(check("[]-]").is_ok());
        assert!(check("(?:x)(?=y)(?!z)").is_ok());
        assert!(check("(?<=a)(?<!b)c").is_ok());
        assert!(check_unicode(r"(?<year>\d{4})-(?<month>\d{2})").is_ok());
        assert!(check_unicode(r"\k<year>(?<year>a)").is_ok());
    }

    #[test]
    fn test_accepts_unicode_escapes() {
        assert!(check_unicode(r"A\u{1F600}").is_ok());
        assert!(check_unicode(r"\p{L}+\P{Nd}").is_ok());
        assert!(check_unicode(r"[A-Z]").is_ok());
    }

    #[test]
    fn test_rejects_unbalanced_groups() {
        assert!(check("(a").is_err());
        assert!(check("a)").is_err());
        assert!(check("(?:a").is_err());
    }

    #[test]
    fn test_rejects_bad_quantifiers() {
        assert!(check("*a").is_err());
        assert!(check("+").is_err());
        assert!(check("a{3,1}").is_err());
        assert!(check("(?<=a)*").is_err());
        assert!(check_unicode("(?=a)*").is_err());
        // Web compat allows a quantified lookahead.
        assert!(check("(?=a)*").is_ok());
    }

    #[test]
    fn test_rejects_bad_classes() {
        assert!(check("[a").is_err());
        assert!(check("[z-a]").is_err());
        assert!(check_unicode(r"[\d-x]").is_err());
        // Without the strict grammar a class escape bound is a literal.
        assert!(check(r"[\d-x]").is_ok());
    }

    #[test]
    fn test_rejects_trailing_backslash() {
        assert!(check("a\\").is_err());
    }

    #[test]
    fn test_unicode_mode_is_strict_about_escapes() {
        assert!(check_unicode(r"\q").is_err());
        assert!(check(r"\q").is_ok());
        assert!(check_unicode(r"\x1").is_err());
        assert!(check(r"\x1").is_ok());
        assert!(check_unicode(r"\u12").is_err());
        assert!(check(r"\u12").is_ok());
        assert!(check_unicode(r"\u{110000}").is_err());
    }

    #[test]
    fn test_unicode_mode_rejects_raw_brackets() {
        assert!(check_unicode("a{").is_err());
        assert!(check_unicode("}").is_err());
        assert!(check_unicode("]").is_err());
        assert!(check("a{").is_ok());
        assert!(check("}").is_ok());
        assert!(check("]").is_ok());
    }

    #[test]
    fn test_lone_brace_quantifier_fallback() {
        // `\u` outside unicode mode is an identity escape, so the brace
        // sequence after it parses as a quantifier on the literal `u`.
        assert!(check(r"\u{2}").is_ok());
        // Not a valid quantifier: hex digits. Literal braces instead.
        assert!(check(r"\u{1F600}").is_ok());
    }

    #[test]
    fn test_named_group_rules() {
        assert!(check("(?<dup>x)(?<dup>y)").is_err());
        assert!(check_unicode(r"\k<missing>").is_err());
        // `\k` with no named groups in the pattern is a literal outside
        // unicode mode.
        assert!(check(r"\k<missing>").is_ok());
        assert!(check("(?<1bad>x)").is_err());
        assert!(check("(?<good_1>x)").is_ok());
    }

    #[test]
    fn test_backreference_bounds() {
        assert!(check_unicode(r"(a)\1").is_ok());
        assert!(check_unicode(r"(a)\2").is_err());
        // Legacy octal fallback outside unicode mode.
        assert!(check(r"(a)\2").is_ok());
    }

    #[test]
    fn test_invalid_group_syntax() {
        assert!(check("(?+a)").is_err());
        assert!(check_unicode("(?<>x)").is_err());
    }

    #[test]
    fn test_error_offsets_point_into_pattern() {
        let err = check("[z-a]").unwrap_err();
        assert_eq!(err.offset, 1);
        let err = check("a{3,1}").unwrap_err();
        assert_eq!(err.offset, 1);
    }
}

//! Lexical analysis: source text to token stream.

use td12_util::{Diagnostic, ErrorCategory, Span};

use crate::cursor::Cursor;
use crate::token::{
    Token, TokenKind, KEYWORDS, MAX_IDENTIFIER_LENGTH, PUNCTUATORS_1, PUNCTUATORS_2,
    PUNCTUATORS_3,
};

type LexResult<T> = Result<T, Diagnostic>;

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    filename: String,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, filename: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(source),
            filename: filename.into(),
        }
    }

    /// Tokenize the whole input, stopping at the first lexical error.
    pub fn tokenize(source: &'a str, filename: impl Into<String>) -> LexResult<Vec<Token>> {
        let mut lexer = Self::new(source, filename);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn span(&self, line: u32, column: u32, length: u32) -> Span {
        Span::new(self.filename.clone(), line, column, length)
    }

    fn err(&self, kind: &'static str, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(ErrorCategory::Lexical, kind, message, span)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.current() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                        self.cursor.advance();
                    }
                }
                '/' if self.cursor.peek(1) == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_at_end() && !self.cursor.starts_with("*/") {
                        self.cursor.advance();
                    }
                    if self.cursor.starts_with("*/") {
                        self.cursor.advance();
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    pub fn next_token(&mut self) -> LexResult<Option<Token>> {
        self.skip_trivia();
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let (line, column) = (self.cursor.line(), self.cursor.column());
        let c = self.cursor.current();

        if c == '#' {
            return Ok(Some(self.lex_directive(line, column)));
        }
        if c == '_' || c.is_ascii_alphabetic() {
            return self.lex_word(line, column).map(Some);
        }
        if c.is_ascii_digit() || (c == '.' && self.cursor.peek(1).is_ascii_digit()) {
            return Ok(Some(self.lex_number(line, column)));
        }
        if c == '\'' {
            return self.lex_char(line, column).map(Some);
        }
        if c == '"' {
            return self.lex_string(line, column).map(Some);
        }
        self.lex_punctuation(line, column).map(Some)
    }

    fn lex_directive(&mut self, line: u32, column: u32) -> Token {
        let mut lexeme = String::new();
        while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
            lexeme.push(self.cursor.advance());
        }
        Token::new(TokenKind::Directive, lexeme, self.span(line, column, (self.cursor.column() - column).max(1)))
    }

    fn lex_word(&mut self, line: u32, column: u32) -> LexResult<Token> {
        let mut lexeme = String::new();
        while self.cursor.current() == '_' || self.cursor.current().is_ascii_alphanumeric() {
            lexeme.push(self.cursor.advance());
        }
        let span = self.span(line, column, lexeme.chars().count() as u32);
        if lexeme.len() > MAX_IDENTIFIER_LENGTH {
            return Err(self.err(
                "IdentifierTooLong",
                format!(
                    "identifier '{lexeme}' is {} characters long; the limit is {MAX_IDENTIFIER_LENGTH}",
                    lexeme.len()
                ),
                span,
            ));
        }
        let kind = if KEYWORDS.contains(&lexeme.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(Token::new(kind, lexeme, span))
    }

    fn lex_number(&mut self, line: u32, column: u32) -> Token {
        let mut lexeme = String::new();

        if self.cursor.current() == '0' && matches!(self.cursor.peek(1), 'b' | 'o' | 'x' | 'B' | 'O' | 'X') {
            lexeme.push(self.cursor.advance());
            lexeme.push(self.cursor.advance());
            while self.cursor.current().is_ascii_hexdigit() || self.cursor.current() == '_' {
                lexeme.push(self.cursor.advance());
            }
            return Token::new(TokenKind::NumberLiteral, lexeme.clone(), self.span(line, column, lexeme.chars().count() as u32));
        }

        while self.cursor.current().is_ascii_digit() || self.cursor.current() == '_' {
            lexeme.push(self.cursor.advance());
        }
        if self.cursor.current() == '.' && self.cursor.peek(1).is_ascii_digit() {
            lexeme.push(self.cursor.advance());
            while self.cursor.current().is_ascii_digit() || self.cursor.current() == '_' {
                lexeme.push(self.cursor.advance());
            }
        }
        if matches!(self.cursor.current(), 'e' | 'E') {
            let save = lexeme.len();
            let mut exponent = String::new();
            exponent.push(self.cursor.current());
            let next = self.cursor.peek(1);
            let has_sign = next == '+' || next == '-';
            let digit_offset = if has_sign { 2 } else { 1 };
            if self.cursor.peek(digit_offset).is_ascii_digit() {
                lexeme.push(self.cursor.advance());
                if has_sign {
                    lexeme.push(self.cursor.advance());
                }
                while self.cursor.current().is_ascii_digit() {
                    lexeme.push(self.cursor.advance());
                }
            } else {
                lexeme.truncate(save);
            }
        }

        Token::new(TokenKind::NumberLiteral, lexeme.clone(), self.span(line, column, lexeme.chars().count() as u32))
    }

    fn lex_char(&mut self, line: u32, column: u32) -> LexResult<Token> {
        let mut lexeme = String::new();
        lexeme.push(self.cursor.advance()); // opening quote
        let mut body_chars = 0usize;
        loop {
            match self.cursor.current() {
                '\0' => break,
                '\n' => {
                    let span = self.span(line, column, lexeme.chars().count() as u32);
                    return Err(self.err("UnexpectedNewline", "newline inside character literal", span));
                }
                '\'' => {
                    lexeme.push(self.cursor.advance());
                    break;
                }
                '\\' => {
                    lexeme.push(self.cursor.advance());
                    if self.cursor.current() != '\0' {
                        lexeme.push(self.cursor.advance());
                    }
                    body_chars += 1;
                }
                c => {
                    lexeme.push(c);
                    self.cursor.advance();
                    body_chars += 1;
                }
            }
        }
        let span = self.span(line, column, lexeme.chars().count() as u32);
        if body_chars > 1 {
            return Err(self.err(
                "CharacterLiteralTooLong",
                "character literal may contain at most one character",
                span,
            ));
        }
        Ok(Token::new(TokenKind::CharLiteral, lexeme, span))
    }

    fn lex_string(&mut self, line: u32, column: u32) -> LexResult<Token> {
        let mut lexeme = String::new();
        lexeme.push(self.cursor.advance()); // opening quote
        loop {
            match self.cursor.current() {
                '\0' => break,
                '\n' => {
                    let span = self.span(line, column, lexeme.chars().count() as u32);
                    return Err(self.err("UnexpectedNewline", "newline inside string literal", span));
                }
                '"' => {
                    lexeme.push(self.cursor.advance());
                    break;
                }
                '\\' => {
                    lexeme.push(self.cursor.advance());
                    if self.cursor.current() != '\0' {
                        lexeme.push(self.cursor.advance());
                    }
                }
                c => {
                    lexeme.push(c);
                    self.cursor.advance();
                }
            }
        }
        let span = self.span(line, column, lexeme.chars().count() as u32);
        Ok(Token::new(TokenKind::StringLiteral, lexeme, span))
    }

    fn lex_punctuation(&mut self, line: u32, column: u32) -> LexResult<Token> {
        for p in PUNCTUATORS_3 {
            if self.cursor.starts_with(p) {
                for _ in 0..3 {
                    self.cursor.advance();
                }
                return Ok(Token::new(TokenKind::Punctuation, *p, self.span(line, column, 3)));
            }
        }
        for p in PUNCTUATORS_2 {
            if self.cursor.starts_with(p) {
                for _ in 0..2 {
                    self.cursor.advance();
                }
                return Ok(Token::new(TokenKind::Punctuation, *p, self.span(line, column, 2)));
            }
        }
        let c = self.cursor.current();
        if PUNCTUATORS_1.contains(&c) {
            self.cursor.advance();
            return Ok(Token::new(TokenKind::Punctuation, c.to_string(), self.span(line, column, 1)));
        }
        let span = self.span(line, column, 1);
        self.cursor.advance();
        Err(self.err("InvalidPunctuation", format!("unexpected character '{c}'"), span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::tokenize(src, "t.td12").expect("lex should succeed")
    }

    #[test]
    fn every_keyword_lexes_to_exactly_one_keyword_token() {
        for kw in KEYWORDS {
            let tokens = lex(kw);
            assert_eq!(tokens.len(), 1, "keyword {kw}");
            assert_eq!(tokens[0].kind, TokenKind::Keyword);
            assert_eq!(tokens[0].lexeme, *kw);
        }
    }

    #[test]
    fn identifier_over_limit_is_an_error() {
        let err = Lexer::tokenize("abcdefghijklmnop", "t.td12").unwrap_err();
        assert_eq!(err.kind, "IdentifierTooLong");
    }

    #[test]
    fn directive_runs_to_end_of_line() {
        let tokens = lex("#define FOO\nlet x");
        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[0].lexeme, "#define FOO");
    }

    #[test]
    fn line_comment_is_discarded() {
        let tokens = lex("let // comment\nx");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].lexeme, "x");
    }

    #[test]
    fn block_comment_is_discarded() {
        let tokens = lex("let /* a\nb */ x");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn newline_in_string_literal_is_an_error() {
        let err = Lexer::tokenize("\"abc\ndef\"", "t.td12").unwrap_err();
        assert_eq!(err.kind, "UnexpectedNewline");
    }

    #[test]
    fn char_literal_with_two_characters_is_an_error() {
        let err = Lexer::tokenize("'ab'", "t.td12").unwrap_err();
        assert_eq!(err.kind, "CharacterLiteralTooLong");
    }

    #[test]
    fn escaped_char_literal_is_fine() {
        let tokens = lex("'\\n'");
        assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
    }

    #[test]
    fn greedy_multichar_punctuator_wins_over_prefix() {
        let tokens = lex("a <<= b");
        assert!(tokens.iter().any(|t| t.lexeme == "<<="));
    }

    #[test]
    fn number_literal_forms() {
        for src in ["123", "0b1010", "0o17", "0xFF", "1_000", ".5", "1e10", "1.5e-3"] {
            let tokens = lex(src);
            assert_eq!(tokens[0].kind, TokenKind::NumberLiteral, "{src}");
        }
    }

    #[test]
    fn invalid_punctuation_reports_the_character() {
        let err = Lexer::tokenize("`", "t.td12").unwrap_err();
        assert_eq!(err.kind, "InvalidPunctuation");
    }
}

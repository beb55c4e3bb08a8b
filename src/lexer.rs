use std::collections::VecDeque;

use crate::ast::{Infix, Keyword, Token, TokenKind};
use crate::error::LexError;
use crate::value::Value;

/// Turns query text into tokens, with lookahead for the parser.
///
/// Tokens are lexed lazily. [`peek`](Tokenizer::peek) lexes ahead into a
/// buffer without moving the cursor.
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    lookahead: VecDeque<Token>,
    current: Option<Token>,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Tokenizer {
            input: input.chars().collect(),
            position: 0,
            lookahead: VecDeque::new(),
            current: None,
        }
    }

    /// Tokenizes the rest of the input.
    pub fn parse(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Advances the cursor and returns the new current token, `None` once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let next = match self.lookahead.pop_front() {
            Some(token) => Some(token),
            None => self.lex_token()?,
        };
        self.current = next.clone();
        Ok(next)
    }

    /// The token `k` positions after the current one, without advancing.
    /// `peek(0)` is the current token.
    pub fn peek(&mut self, k: usize) -> Result<Option<Token>, LexError> {
        if k == 0 {
            return Ok(self.current.clone());
        }
        while self.lookahead.len() < k {
            match self.lex_token()? {
                Some(token) => self.lookahead.push_back(token),
                None => return Ok(None),
            }
        }
        Ok(self.lookahead.get(k - 1).cloned())
    }

    /// The token most recently returned by [`next_token`](Tokenizer::next_token).
    pub fn current_token(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_word_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads `Word(/Word)*` or `Word(.Word)*`. A separator only joins words
    /// when a word starts right after it, otherwise `/` is left for division.
    fn read_path(&mut self) -> String {
        let mut path = self.read_word();
        while let Some(sep @ ('/' | '.')) = self.current_char() {
            if !self.peek_char(1).is_some_and(is_word_start) {
                break;
            }
            self.advance();
            path.push(sep);
            path.push_str(&self.read_word());
        }
        path
    }

    /// Consumes `word` if it is the next word after optional whitespace.
    fn consume_word(&mut self, word: &str) -> bool {
        let saved = self.position;
        self.skip_whitespace();
        if self.current_char().is_some_and(is_word_start) && self.read_word() == word {
            return true;
        }
        self.position = saved;
        false
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(LexError::new("Unterminated string: missing closing quote", start))
    }

    fn read_param(&mut self) -> Result<Option<String>, LexError> {
        let start = self.position;
        self.advance(); // Consume '{'
        self.skip_whitespace();
        let name = self.read_word();
        self.skip_whitespace();

        match self.current_char() {
            Some('}') => {
                self.advance();
                Ok((!name.is_empty()).then_some(name))
            }
            Some(ch) => Err(LexError::new(
                format!("Unexpected character '{ch}' in template placeholder"),
                self.position,
            )),
            None => Err(LexError::new("Unterminated template placeholder", start)),
        }
    }

    fn read_number(&mut self) -> Result<Value, LexError> {
        let start = self.position;

        if self.current_char() == Some('0') && matches!(self.peek_char(1), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.current_char().filter(char::is_ascii_hexdigit) {
                digits.push(ch);
                self.advance();
            }
            if digits.is_empty() {
                return Err(LexError::new("Hexadecimal literal has no digits", start));
            }
            self.reject_trailing_word(start)?;
            return i64::from_str_radix(&digits, 16)
                .map(Value::Integer)
                .map_err(|e| LexError::new(format!("Invalid hexadecimal literal: {e}"), start));
        }

        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        self.reject_trailing_word(start)?;

        if is_float {
            number
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| LexError::new(format!("Invalid float: {e}"), start))
        } else {
            number
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| LexError::new(format!("Invalid integer: {e}"), start))
        }
    }

    /// `15abc` and `1.x` are malformed, not a number followed by a word.
    fn reject_trailing_word(&self, start: usize) -> Result<(), LexError> {
        match self.current_char() {
            Some(ch) if is_word_char(ch) || ch == '.' => Err(LexError::new(
                format!("Malformed numeric literal: unexpected '{ch}'"),
                start,
            )),
            _ => Ok(()),
        }
    }

    fn read_word_token(&mut self) -> TokenKind {
        let path = self.read_path();

        match path.as_str() {
            "is" if self.consume_word("not") => TokenKind::Infix(Infix::IsNot),
            "is" => TokenKind::Infix(Infix::Is),
            "not" if self.consume_word("in") => TokenKind::Infix(Infix::NotIn),
            "in" => TokenKind::Infix(Infix::In),
            "and" => TokenKind::Infix(Infix::And),
            "or" => TokenKind::Infix(Infix::Or),
            "matches" => TokenKind::Infix(Infix::Matches),
            "where" => TokenKind::Infix(Infix::Where),
            word => match Keyword::from_word(word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier(path),
            },
        }
    }

    fn lex_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let start = self.position;
        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        let kind = match ch {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '+' => {
                self.advance();
                TokenKind::Infix(Infix::Add)
            }
            '-' => {
                if self.peek_char(1) == Some('>') {
                    self.advance();
                    self.advance();
                    TokenKind::Infix(Infix::Arrow)
                } else {
                    self.advance();
                    TokenKind::Infix(Infix::Subtract)
                }
            }
            '*' => {
                self.advance();
                TokenKind::Infix(Infix::Multiply)
            }
            '/' => {
                self.advance();
                TokenKind::Infix(Infix::Divide)
            }
            '=' => match self.peek_char(1) {
                Some('=') => {
                    self.advance();
                    self.advance();
                    TokenKind::Infix(Infix::Equal)
                }
                Some('~') => {
                    self.advance();
                    self.advance();
                    TokenKind::Infix(Infix::RegexMatch)
                }
                _ => {
                    return Err(LexError::new(
                        "Unexpected '=' (did you mean '==' or '=~'?)",
                        start,
                    ));
                }
            },
            '!' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::Infix(Infix::NotEqual)
                } else {
                    return Err(LexError::new("Unexpected '!' (did you mean '!='?)", start));
                }
            }
            '>' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::Infix(Infix::GreaterEqual)
                } else {
                    self.advance();
                    TokenKind::Infix(Infix::GreaterThan)
                }
            }
            '<' => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::Infix(Infix::LessEqual)
                } else {
                    self.advance();
                    TokenKind::Infix(Infix::LessThan)
                }
            }
            '{' => TokenKind::Param(self.read_param()?),
            '\'' | '"' => TokenKind::Literal(Value::String(self.read_string(ch)?)),
            ch if ch.is_ascii_digit() => TokenKind::Literal(self.read_number()?),
            ch if is_word_start(ch) => self.read_word_token(),
            ch => {
                return Err(LexError::new(format!("Unexpected character '{ch}'"), start));
            }
        };

        Ok(Some(Token::new(kind, start)))
    }
}

fn is_word_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Tokenizes `source` in one go.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(source).parse()
}

#[test]
fn test_word_operators() {
    let tokens = tokenize("is not  in not\n in and or matches where").unwrap();
    let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Infix(Infix::IsNot),
            TokenKind::Infix(Infix::In),
            TokenKind::Infix(Infix::NotIn),
            TokenKind::Infix(Infix::And),
            TokenKind::Infix(Infix::Or),
            TokenKind::Infix(Infix::Matches),
            TokenKind::Infix(Infix::Where),
        ]
    );
}

#[test]
fn test_paths_and_division() {
    let tokens = tokenize("Process/pid / 2").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier("Process/pid".to_string()));
    assert_eq!(tokens[1].kind, TokenKind::Infix(Infix::Divide));
    assert_eq!(tokens[2].kind, TokenKind::Literal(Value::Integer(2)));
    assert_eq!(tokens[2].position, 14);
}

//! XPath Lexer
//!
//! Tokenizes XPath expressions into tokens.

/// XPath token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Pipe,        // |
    Plus,        // +
    Minus,       // -
    Star,        // *
    Eq,          // =
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    And,         // and
    Or,          // or
    Mod,         // mod
    Div,         // div

    // Brackets
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    // Literals
    Number(f64),
    String(String),

    // Names
    Name(String),     // NCName
    NameTest(String), // prefix:* or prefix:local
    NodeType(String), // node(), text(), comment(), processing-instruction()

    /// Axis name; the following `::` is its own token
    Axis(String),

    DoubleColon, // ::
    Comma,       // ,
    Dollar,      // $

    Eof,
}

/// XPath lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Single-byte operator or bracket
    fn single(&mut self, token: Token) -> Result<Token, String> {
        self.advance(1);
        Ok(token)
    }

    /// One of two tokens depending on whether `next` follows
    fn pair(&mut self, next: char, long: Token, short: Token) -> Result<Token, String> {
        self.advance(1);
        if self.peek() == Some(next) {
            self.advance(1);
            Ok(long)
        } else {
            Ok(short)
        }
    }

    pub fn next_token(&mut self) -> Result<Token, String> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        match c {
            '/' => self.pair('/', Token::DoubleSlash, Token::Slash),
            '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            '.' => self.pair('.', Token::DoubleDot, Token::Dot),
            '@' => self.single(Token::At),
            '|' => self.single(Token::Pipe),
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => self.single(Token::Star),
            '=' => self.single(Token::Eq),
            '!' if self.peek_at(1) == Some('=') => {
                self.advance(2);
                Ok(Token::NotEq)
            }
            '<' => self.pair('=', Token::LtEq, Token::Lt),
            '>' => self.pair('=', Token::GtEq, Token::Gt),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '[' => self.single(Token::LeftBracket),
            ']' => self.single(Token::RightBracket),
            ',' => self.single(Token::Comma),
            '$' => self.single(Token::Dollar),
            ':' if self.peek_at(1) == Some(':') => {
                self.advance(2);
                Ok(Token::DoubleColon)
            }
            '"' | '\'' => self.read_string(c),
            '0'..='9' => self.read_number(),
            _ if is_name_start_char(c) => Ok(self.read_name_or_keyword()),
            _ => Err(format!("Unexpected character '{}' at offset {}", c, self.pos)),
        }
    }

    fn read_number(&mut self) -> Result<Token, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }
        if self.peek() == Some('.') {
            self.advance(1);
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }
        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .map(Token::Number)
            .map_err(|_| format!("Invalid number '{}'", num_str))
    }

    fn read_string(&mut self, quote: char) -> Result<Token, String> {
        self.advance(1);
        let start = self.pos;
        match self.remaining().find(quote) {
            Some(len) => {
                let value = self.input[start..start + len].to_string();
                self.advance(len + 1);
                Ok(Token::String(value))
            }
            None => Err(format!("Unterminated string literal at offset {}", start - 1)),
        }
    }

    fn read_ncname(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn read_name_or_keyword(&mut self) -> Token {
        let name = self.read_ncname();

        match name {
            "and" => Token::And,
            "or" => Token::Or,
            "mod" => Token::Mod,
            "div" => Token::Div,
            _ => {
                // Qualified name test
                if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
                    self.advance(1);
                    if self.peek() == Some('*') {
                        self.advance(1);
                        return Token::NameTest(format!("{}:*", name));
                    }
                    let local = self.read_ncname();
                    return Token::NameTest(format!("{}:{}", name, local));
                }

                let after_name = self.pos;
                self.skip_whitespace();
                if self.remaining().starts_with("::") {
                    Token::Axis(name.to_string())
                } else if self.peek() == Some('(') {
                    match name {
                        "node" | "text" | "comment" | "processing-instruction" => {
                            Token::NodeType(name.to_string())
                        }
                        _ => Token::Name(name.to_string()),
                    }
                } else {
                    self.pos = after_name;
                    Token::Name(name.to_string())
                }
            }
        }
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Token {
        Token::Name(s.to_string())
    }

    #[test]
    fn test_simple_path() {
        let tokens = Lexer::new("/route-engine/slot").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![Token::Slash, name("route-engine"), Token::Slash, name("slot")]
        );
    }

    #[test]
    fn test_predicate() {
        let tokens = Lexer::new("item[@id='test']").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                name("item"),
                Token::LeftBracket,
                Token::At,
                name("id"),
                Token::Eq,
                Token::String("test".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_axis() {
        let tokens = Lexer::new("ancestor::multi-routing-engine-item/re-name")
            .tokenize()
            .unwrap();
        assert_eq!(tokens[0], Token::Axis("ancestor".to_string()));
        assert_eq!(tokens[1], Token::DoubleColon);
        assert_eq!(tokens[2], name("multi-routing-engine-item"));
    }

    #[test]
    fn test_qualified_names() {
        let tokens = Lexer::new("junos:chassis/ns:*").tokenize().unwrap();
        assert_eq!(tokens[0], Token::NameTest("junos:chassis".to_string()));
        assert_eq!(tokens[2], Token::NameTest("ns:*".to_string()));
    }

    #[test]
    fn test_numbers_and_node_types() {
        let tokens = Lexer::new("text() and position() = .5").tokenize().unwrap();
        assert_eq!(tokens[0], Token::NodeType("text".to_string()));
        assert!(matches!(tokens.last(), Some(Token::Number(n)) if *n == 0.5));
    }

    #[test]
    fn test_errors() {
        assert!(Lexer::new("a[@b='x]").tokenize().is_err());
        assert!(Lexer::new("a # b").tokenize().is_err());
    }
}

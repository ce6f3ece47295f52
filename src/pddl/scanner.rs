use std::{iter::Iterator, str::CharIndices};

/// `scan` builds a `Scanner` and scans `src` for every possible token.
pub fn scan(src: &str) -> Vec<Token> {
    Scanner::new(src).collect()
}

/// `Scanner` splits PDDL source into tokens.
///
/// Tokens only record positions within the source, so nothing is copied
/// while scanning.  Identifiers, variables and keywords are restricted to
/// ASCII; comments (`;` to end of line) may contain any UTF-8 text.
/// Keywords such as `:action` or `:typing` are all scanned as
/// `TokenType::Keyword` and told apart by the parser.
pub struct Scanner<'a> {
    next: Option<(usize, char)>, // Character read ahead but not yet consumed.
    chars: CharIndices<'a>,      // Iterator over source.
    col: usize,                  // Current column within source.
    line: usize,                 // Current line within source.
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner {
            next: None,
            chars: src.char_indices(),
            col: 1,
            line: 1,
        }
    }

    /// `read` returns the read-ahead character if there is one, otherwise
    /// the next character of the source.
    fn read(&mut self) -> Option<(usize, char)> {
        self.next.take().or_else(|| self.chars.next())
    }

    /// `single` returns a one character token and advances the column.
    fn single(&mut self, what: TokenType, pos: usize) -> Token {
        let col = self.col;
        self.col += 1;
        Token {
            what,
            pos,
            end: pos + 1,
            col,
            line: self.line,
        }
    }

    /// `comment` skips to the end of the line.  The newline itself is left
    /// for the caller so that line counting stays in one place.
    fn comment(&mut self) {
        while let Some((pos, ch)) = self.chars.next() {
            if ch == '\n' {
                self.next = Some((pos, ch));
                return;
            }
        }
    }

    /// `name_end` consumes the letters, digits, `-` and `_` that continue a
    /// name starting at `start` and returns the position one past its end.
    fn name_end(&mut self, start: usize, first: char) -> usize {
        let mut end = start + first.len_utf8();

        while let Some((pos, ch)) = self.chars.next() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                end = pos + ch.len_utf8();
                self.col += 1;
            } else {
                self.next = Some((pos, ch));
                break;
            }
        }
        end
    }

    /// `ident` returns an identifier: a letter followed by any number of
    /// letters, digits, `-` or `_`.
    fn ident(&mut self, pos: usize, first: char) -> Token {
        let col = self.col;
        self.col += 1;
        let end = self.name_end(pos, first);

        Token {
            what: TokenType::Ident,
            pos,
            end,
            col,
            line: self.line,
        }
    }

    /// `prefixed` scans a name introduced by `?` or `:`.  The token covers
    /// the prefix and is `Invalid` when no letter follows it.
    fn prefixed(&mut self, pos: usize, what: TokenType) -> Token {
        let col = self.col;
        self.col += 1;

        match self.chars.next() {
            Some((p, ch)) if ch.is_ascii_alphabetic() => {
                self.col += 1;
                let end = self.name_end(p, ch);
                Token {
                    what,
                    pos,
                    end,
                    col,
                    line: self.line,
                }
            }
            next => {
                self.next = next;
                Token {
                    what: TokenType::Invalid,
                    pos,
                    end: pos + 1,
                    col,
                    line: self.line,
                }
            }
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((pos, ch)) = self.read() {
            match ch {
                ' ' | '\t' | '\r' => self.col += 1,
                '\n' => {
                    self.col = 1;
                    self.line += 1;
                }
                ';' => self.comment(),
                '(' => return Some(self.single(TokenType::LParen, pos)),
                ')' => return Some(self.single(TokenType::RParen, pos)),
                '-' => return Some(self.single(TokenType::Minus, pos)),
                '=' => return Some(self.single(TokenType::Equal, pos)),
                '?' => return Some(self.prefixed(pos, TokenType::Variable)),
                ':' => return Some(self.prefixed(pos, TokenType::Keyword)),
                c if c.is_ascii_alphabetic() => return Some(self.ident(pos, c)),
                c => {
                    let mut t = self.single(TokenType::Invalid, pos);
                    t.end = pos + c.len_utf8();
                    return Some(t);
                }
            }
        }
        None
    }
}

/// Token is primary object that is returned from calling `Scanner::scan`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token {
    /// What type of token this one is.
    pub what: TokenType,
    /// Position of where the token was found from scanner's source contents.
    pub pos: usize,
    /// Position that is one past the last character of the scanned token.
    pub end: usize,
    /// Column number of where the token was found.
    pub col: usize,
    /// Line number of where the token was found.
    pub line: usize,
}

impl Token {
    /// `to_str` returns the source text of the token.  `src` should be the
    /// exact source contents that was scanned.
    pub fn to_str(self, src: &str) -> &str {
        &src[self.pos..self.end]
    }

    /// `is_ident` returns true if the token is the identifier `ident`,
    /// ignoring case.
    pub fn is_ident(self, src: &str, ident: &str) -> bool {
        self.what == TokenType::Ident && self.to_str(src).eq_ignore_ascii_case(ident)
    }

    /// `is_keyword` returns true if the token is the keyword `kw` (including
    /// its leading colon), ignoring case.
    pub fn is_keyword(self, src: &str, kw: &str) -> bool {
        self.what == TokenType::Keyword && self.to_str(src).eq_ignore_ascii_case(kw)
    }
}

/// TokenType specifies what kind of token was scanned.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    Invalid,
    LParen,
    RParen,
    Minus,
    Equal,
    Ident,
    Variable,
    Keyword,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Invalid => "invalid",
            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::Minus => "-",
            TokenType::Equal => "=",
            TokenType::Ident => "identifier",
            TokenType::Variable => "variable",
            TokenType::Keyword => "keyword",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_scan() {
        const TEST: &'static str = "
; blocks ₳
(on-table
  ?x) b_2";

        let tokens = scan(TEST);
        assert_eq!(tokens.len(), 5);

        let t = &tokens[0];
        assert_eq!(t.what, TokenType::LParen);
        assert_eq!(t.pos, 14, "invalid position");
        assert_eq!(t.col, 1, "invalid column");
        assert_eq!(t.line, 3, "invalid line");

        let t = &tokens[1];
        assert_eq!(t.what, TokenType::Ident);
        assert_eq!(t.to_str(TEST), "on-table");
        assert_eq!(t.col, 2, "invalid column");
        assert_eq!(t.line, 3, "invalid line");

        let t = &tokens[2];
        assert_eq!(t.what, TokenType::Variable);
        assert_eq!(t.to_str(TEST), "?x");
        assert_eq!(t.col, 3, "invalid column");
        assert_eq!(t.line, 4, "invalid line");

        let t = &tokens[3];
        assert_eq!(t.what, TokenType::RParen);
        assert_eq!(t.col, 5, "invalid column");

        let t = &tokens[4];
        assert_eq!(t.what, TokenType::Ident);
        assert_eq!(t.to_str(TEST), "b_2");
        assert_eq!(t.col, 7, "invalid column");
        assert_eq!(t.line, 4, "invalid line");
    }

    #[test]
    fn keywords_and_operators() {
        const TEST: &'static str = "(:requirements :typing) ?a - (= ?a b)";

        let what: Vec<TokenType> = scan(TEST).iter().map(|t| t.what).collect();
        assert_eq!(
            what,
            vec![
                TokenType::LParen,
                TokenType::Keyword,
                TokenType::Keyword,
                TokenType::RParen,
                TokenType::Variable,
                TokenType::Minus,
                TokenType::LParen,
                TokenType::Equal,
                TokenType::Variable,
                TokenType::Ident,
                TokenType::RParen,
            ]
        );

        let tokens = scan(TEST);
        assert!(tokens[1].is_keyword(TEST, ":REQUIREMENTS"));
        assert_eq!(tokens[2].to_str(TEST), ":typing");
        assert_eq!(tokens[2].col, 16);
    }

    #[test]
    fn minus_ends_nothing_inside_names() {
        let src = "pick-up -";
        let tokens = scan(src);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].to_str(src), "pick-up");
        assert_eq!(tokens[1].what, TokenType::Minus);
        assert_eq!(tokens[1].col, 9);
    }

    #[test]
    fn invalid_prefixes() {
        let src = "? :1 %";
        let tokens = scan(src);

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].what, TokenType::Invalid);
        assert_eq!(tokens[1].what, TokenType::Invalid);
        assert_eq!(tokens[1].col, 3);
        assert_eq!(tokens[2].what, TokenType::Invalid);
        assert_eq!(tokens[2].to_str(src), "1");
        assert_eq!(tokens[3].to_str(src), "%");
    }

    #[test]
    fn comment_at_end_of_input() {
        let tokens = scan("a ; trailing");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn is_ident_ignores_case() {
        let src = "DEFINE";
        let t = scan(src)[0];
        assert!(t.is_ident(src, "define"));
        assert!(!t.is_keyword(src, "define"));
    }
}

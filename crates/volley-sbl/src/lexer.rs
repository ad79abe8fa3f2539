#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Tag,
}

/// A literal-text or tag slice of a template. `position` is the byte offset
/// of the token content in the input (for tags, the offset of the content
/// just past the begin marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub position: usize,
}

/// Splits a template into alternating literal-text and tag tokens.
///
/// Markers are matched verbatim. Inside a tag a backslash escapes the next
/// character, and single/double quotes suppress end-marker recognition, but
/// the tag content is kept raw; escapes and quotes are interpreted later by
/// the shell-word splitter. An unterminated tag at end of input is still
/// emitted as a tag token.
#[derive(Debug, Clone)]
pub struct Lexer {
    begin: String,
    end: String,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new("{", "}")
    }
}

impl Lexer {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let bytes = input.as_bytes();
        let begin = self.begin.as_bytes();
        let end = self.end.as_bytes();

        let mut tokens = Vec::new();
        let mut in_tag = false;
        let mut in_escape = false;
        let mut in_quote: Option<u8> = None;
        // i is the start of the current token, j the scan position
        let mut i = 0;
        let mut j = 0;

        while j < bytes.len() {
            if !in_tag {
                if bytes[j..].starts_with(begin) {
                    if j > i {
                        tokens.push(Token {
                            kind: TokenKind::Text,
                            content: input[i..j].to_string(),
                            position: i,
                        });
                    }
                    in_tag = true;
                    j += begin.len();
                    i = j;
                    in_escape = false;
                    in_quote = None;
                } else {
                    j += char_len(input, j);
                }
            } else if in_escape {
                in_escape = false;
                j += char_len(input, j);
            } else {
                let b = bytes[j];
                if b == b'\\' {
                    in_escape = true;
                    j += 1;
                } else if b == b'"' || b == b'\'' {
                    if in_quote == Some(b) {
                        in_quote = None;
                    } else if in_quote.is_none() {
                        in_quote = Some(b);
                    }
                    j += 1;
                } else if in_quote.is_none() && bytes[j..].starts_with(end) {
                    tokens.push(Token {
                        kind: TokenKind::Tag,
                        content: input[i..j].to_string(),
                        position: i,
                    });
                    j += end.len();
                    i = j;
                    in_tag = false;
                } else {
                    j += char_len(input, j);
                }
            }
        }

        if in_tag {
            // unterminated tag, emitted as-is (even when empty)
            tokens.push(Token {
                kind: TokenKind::Tag,
                content: input[i..j].to_string(),
                position: i,
            });
        } else if i < j {
            tokens.push(Token {
                kind: TokenKind::Text,
                content: input[i..j].to_string(),
                position: i,
            });
        }

        tokens
    }
}

fn char_len(input: &str, at: usize) -> usize {
    input[at..].chars().next().map(char::len_utf8).unwrap_or(1)
}

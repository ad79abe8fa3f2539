use crate::{
    ast::{Arg, Attrs, AttrValue, Node},
    lexer::{Lexer, Token, TokenKind},
    shlex, syntax,
};

/// Turns a token stream into nodes. Tags that match no syntax rule fall
/// back to literal echoes of themselves, markers included; nodes without
/// an explicit `#id` get `scope:N` ids counted per parse.
#[derive(Debug, Default)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self { lexer }
    }

    pub fn parse(&self, input: &str, scope: &str) -> Vec<Node> {
        self.parse_tokens(&self.lexer.tokenize(input), scope)
    }

    pub fn parse_tokens(&self, tokens: &[Token], scope: &str) -> Vec<Node> {
        let mut auto_id = 0;
        let mut ast = Vec::with_capacity(tokens.len());

        for token in tokens {
            let (opcode, data, mut attr) = match token.kind {
                TokenKind::Text => (
                    "echo",
                    vec![Arg::Text(token.content.clone())],
                    Attrs::default(),
                ),
                TokenKind::Tag => {
                    let parts = shlex::split(&token.content);
                    let head = parts.first().map(String::as_str).unwrap_or_default();
                    let (opcode, data) = match syntax::classify(head, scope) {
                        Some(matched) => matched,
                        None => (
                            "echo",
                            vec![Arg::Text(format!(
                                "{}{}{}",
                                self.lexer.begin(),
                                token.content,
                                self.lexer.end()
                            ))],
                        ),
                    };
                    let attr = self.parse_attrs(parts.get(1..).unwrap_or_default(), scope);
                    (opcode, data, attr)
                }
            };

            if opcode != "echo" && !attr.contains_key("id") {
                attr.insert(
                    "id".to_string(),
                    AttrValue::Text(format!("{scope}:{auto_id}")),
                );
                auto_id += 1;
            }

            ast.push(Node { opcode, data, attr });
        }

        ast
    }

    fn parse_attrs(&self, sources: &[String], scope: &str) -> Attrs {
        let mut attr = Attrs::default();
        for source in sources {
            if let Some((name, value)) = syntax::classify_attr(source, scope) {
                attr.insert(name, value);
            }
        }
        attr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<Node> {
        Parser::default().parse(input, "main")
    }

    #[test]
    fn test_parse_plain_text() {
        let ast = parse("hello world");
        assert_eq!(ast.len(), 1);
        assert_eq!(ast[0].opcode, "echo");
        assert_eq!(ast[0].echo_text(), Some("hello world"));
    }

    #[test]
    fn test_parse_sequence_tag() {
        let ast = parse("{1:5}");
        assert_eq!(ast.len(), 1);
        assert_eq!(ast[0].opcode, "seq");
        assert_eq!(
            ast[0].data,
            vec![Arg::Int(1), Arg::Int(5), Arg::Int(1)]
        );
        assert_eq!(ast[0].id(), Some("main:0"));
    }

    #[test]
    fn test_parse_mixed_text_and_tags() {
        let ast = parse("id={1:5}&name={a|b}");
        let opcodes: Vec<&str> = ast.iter().map(|node| node.opcode).collect();
        assert_eq!(opcodes, vec!["echo", "seq", "echo", "choose"]);
        assert_eq!(ast[0].echo_text(), Some("id="));
        assert_eq!(ast[2].echo_text(), Some("&name="));
    }

    #[test]
    fn test_parse_explicit_id_and_pow() {
        let ast = parse("{1:3 #q ^w}{11:33:11 #w}");
        assert_eq!(ast[0].id(), Some("main:q"));
        assert_eq!(ast[0].pow(), Some("main:w"));
        assert_eq!(ast[1].id(), Some("main:w"));
        assert_eq!(ast[1].pow(), None);
    }

    #[test]
    fn test_auto_id_skips_explicit_ids() {
        let ast = parse("{1:5 #q}{2:9}{3:7}");
        assert_eq!(ast[0].id(), Some("main:q"));
        assert_eq!(ast[1].id(), Some("main:0"));
        assert_eq!(ast[2].id(), Some("main:1"));
    }

    #[test]
    fn test_unmatched_tag_degrades_to_echo() {
        let ast = parse("{hello}");
        assert_eq!(ast.len(), 1);
        assert_eq!(ast[0].opcode, "echo");
        assert_eq!(ast[0].echo_text(), Some("{hello}"));
        assert_eq!(ast[0].id(), None);
    }

    #[test]
    fn test_empty_tag_degrades_to_echo() {
        let ast = parse("{}");
        assert_eq!(ast[0].opcode, "echo");
        assert_eq!(ast[0].echo_text(), Some("{}"));
    }

    #[test]
    fn test_degraded_tag_keeps_custom_markers() {
        let parser = Parser::new(Lexer::new("<<", ">>"));
        let ast = parser.parse("<<hello>>", "main");
        assert_eq!(ast[0].opcode, "echo");
        assert_eq!(ast[0].echo_text(), Some("<<hello>>"));
    }

    #[test]
    fn test_parse_encoding_attribute() {
        let ast = parse("{a|b encoding=urlc,str}");
        assert_eq!(ast[0].encoding(), Some("urlc,str"));
    }

    #[test]
    fn test_parse_flag_attribute() {
        let ast = parse("{1:5 verbose}");
        assert_eq!(
            ast[0].attr.get("verbose"),
            Some(&AttrValue::Flag(true))
        );
    }

    #[test]
    fn test_parse_quoted_attribute_value() {
        let ast = parse("{choose:words.txt note='a b'}");
        assert_eq!(ast[0].opcode, "chooseFromFile");
        assert_eq!(
            ast[0].attr.get("note"),
            Some(&AttrValue::Text("a b".to_string()))
        );
    }

    #[test]
    fn test_unterminated_tag_still_parses() {
        let ast = parse("x{1:5");
        assert_eq!(ast.len(), 2);
        assert_eq!(ast[0].echo_text(), Some("x"));
        assert_eq!(ast[1].opcode, "seq");
    }

    #[test]
    fn test_scope_qualifies_ids() {
        let ast = Parser::default().parse("{1:5}{#q}", "url");
        assert_eq!(ast[0].id(), Some("url:0"));
        assert_eq!(ast[1].opcode, "ref");
        assert_eq!(ast[1].data, vec![Arg::Text("url:q".to_string())]);
    }
}

//! Tree builder
//!
//! Turns the scanner's token stream into a tree of [`Node`]s. Conditional
//! chains are nested: an `elif` or `else` becomes the last child of the
//! preceding `if`/`elif`, and one `endif` closes the whole chain. Blocks
//! still open at the end of input are closed implicitly.

use super::ast::Node;
use super::error::{Error, Result};
use super::lexer::{Lexer, Token, TokenKind};
use super::tags::{
    directive_payload, parse_elif_tag, parse_else_tag, parse_for_tag, parse_if_tag,
    parse_value_tag,
};

/// Directive keywords recognised in `{% ... %}` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    If,
    Elif,
    Else,
    For,
    EndIf,
    EndFor,
}

impl Directive {
    fn classify(tag: &str) -> Result<Self> {
        let payload = directive_payload(tag)?;
        let keyword = payload.split_whitespace().next().unwrap_or_default();

        match keyword {
            "if" => Ok(Directive::If),
            "elif" => Ok(Directive::Elif),
            "else" => Ok(Directive::Else),
            "for" => Ok(Directive::For),
            "endif" if payload == "endif" => Ok(Directive::EndIf),
            "endfor" if payload == "endfor" => Ok(Directive::EndFor),
            _ => Err(Error::invalid_tag(format!(
                "unrecognized directive '{}'",
                tag
            ))),
        }
    }
}

/// What ended a run of sibling nodes
enum StopKind {
    Eof,
    EndIf,
    EndFor,
    Elif(Node),
    Else(Node),
}

struct Stop {
    kind: StopKind,
    line: usize,
    column: usize,
}

impl Stop {
    fn error(&self, message: &str) -> Error {
        located(Error::invalid_tag(message), self.line, self.column)
    }
}

/// Attach the template position to an error
fn located(err: Error, line: usize, column: usize) -> Error {
    let message = format!("line {}, column {}: {}", line, column, err);
    err.with_context(message)
}

/// Parser for templates
pub struct Parser {
    tokens: std::vec::IntoIter<Token>,
}

impl Parser {
    /// Create a new parser from input string
    pub fn new(input: &str) -> Self {
        let tokens = Lexer::new(input).tokenize();
        Self::from_tokens(tokens)
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
        }
    }

    /// Parse the entire template into its top-level nodes
    pub fn parse(&mut self) -> Result<Vec<Node>> {
        let (nodes, stop) = self.parse_nodes()?;

        match stop.kind {
            StopKind::Eof => Ok(nodes),
            StopKind::Elif(_) => Err(stop.error("elif without a preceding if")),
            StopKind::Else(_) => Err(stop.error("else without a preceding if or elif")),
            StopKind::EndIf => Err(stop.error("endif without a matching if")),
            StopKind::EndFor => Err(stop.error("endfor without a matching for")),
        }
    }

    /// Parse sibling nodes until a block boundary or the end of input
    fn parse_nodes(&mut self) -> Result<(Vec<Node>, Stop)> {
        let mut nodes = Vec::new();

        loop {
            let Some(token) = self.tokens.next() else {
                return Ok((nodes, Stop { kind: StopKind::Eof, line: 0, column: 0 }));
            };
            let (line, column) = (token.line, token.column);
            let at = |err: Error| located(err, line, column);
            let stop = |kind: StopKind| Stop { kind, line, column };

            match token.kind {
                TokenKind::Text(text) => nodes.push(Node::Text(text)),

                TokenKind::ValueTag(tag) => nodes.push(parse_value_tag(&tag).map_err(at)?),

                TokenKind::DirectiveTag(tag) => match Directive::classify(&tag).map_err(at)? {
                    Directive::If => {
                        let node = parse_if_tag(&tag).map_err(at)?;
                        nodes.push(self.parse_if_chain(node)?);
                    }
                    Directive::For => {
                        let node = parse_for_tag(&tag).map_err(at)?;
                        nodes.push(self.parse_for(node)?);
                    }
                    Directive::Elif => {
                        let node = parse_elif_tag(&tag).map_err(at)?;
                        return Ok((nodes, stop(StopKind::Elif(node))));
                    }
                    Directive::Else => {
                        let node = parse_else_tag(&tag).map_err(at)?;
                        return Ok((nodes, stop(StopKind::Else(node))));
                    }
                    Directive::EndIf => return Ok((nodes, stop(StopKind::EndIf))),
                    Directive::EndFor => return Ok((nodes, stop(StopKind::EndFor))),
                },

                TokenKind::Eof => return Ok((nodes, stop(StopKind::Eof))),
            }
        }
    }

    /// Parse the body of an if or elif node; the rest of the chain nests inside
    fn parse_if_chain(&mut self, mut head: Node) -> Result<Node> {
        let (mut children, stop) = self.parse_nodes()?;

        match stop.kind {
            StopKind::Eof | StopKind::EndIf => {}
            StopKind::Elif(elif) => children.push(self.parse_if_chain(elif)?),
            StopKind::Else(else_node) => children.push(self.parse_else(else_node)?),
            StopKind::EndFor => return Err(stop.error("endfor inside an if block")),
        }

        head.set_children(children)?;
        Ok(head)
    }

    /// Parse the body of an else node up to the closing endif
    fn parse_else(&mut self, mut node: Node) -> Result<Node> {
        let (children, stop) = self.parse_nodes()?;

        match stop.kind {
            StopKind::Eof | StopKind::EndIf => {}
            StopKind::Elif(_) => return Err(stop.error("elif after else")),
            StopKind::Else(_) => return Err(stop.error("multiple else blocks")),
            StopKind::EndFor => return Err(stop.error("endfor inside an else block")),
        }

        node.set_children(children)?;
        Ok(node)
    }

    /// Parse the body of a for node up to the closing endfor
    fn parse_for(&mut self, mut node: Node) -> Result<Node> {
        let (children, stop) = self.parse_nodes()?;

        match stop.kind {
            StopKind::Eof | StopKind::EndFor => {}
            StopKind::Elif(_) => return Err(stop.error("elif inside a for block")),
            StopKind::Else(_) => return Err(stop.error("else inside a for block")),
            StopKind::EndIf => return Err(stop.error("endif inside a for block")),
        }

        node.set_children(children)?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn parse(input: &str) -> Result<Vec<Node>> {
        Parser::new(input).parse()
    }

    #[test]
    fn test_text_and_values() {
        let nodes = parse("Hello {$ name }!").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::text("Hello "),
                Node::value("name").unwrap(),
                Node::text("!")
            ]
        );
    }

    #[test]
    fn test_if_block() {
        let nodes = parse("a{% if x %}b{% endif %}c").unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].kind(), NodeKind::If);
        assert_eq!(nodes[1].children(), &[Node::text("b")]);
    }

    #[test]
    fn test_elif_chain_is_nested() {
        let nodes =
            parse("{% if a %}A{% elif b %}B{% elif c %}C{% else %}E{% endif %}!").unwrap();
        assert_eq!(nodes.len(), 2);

        let if_children = nodes[0].children();
        assert_eq!(if_children.len(), 2);
        assert_eq!(if_children[1].kind(), NodeKind::Elif);

        let b_children = if_children[1].children();
        assert_eq!(b_children[0], Node::text("B"));
        assert_eq!(b_children[1].kind(), NodeKind::Elif);

        let c_children = b_children[1].children();
        assert_eq!(c_children[1].kind(), NodeKind::Else);
        assert_eq!(c_children[1].children(), &[Node::text("E")]);

        assert_eq!(nodes[1], Node::text("!"));
    }

    #[test]
    fn test_nested_if_inside_elif() {
        let nodes =
            parse("{% if debug %}D{% elif test %}T{% if gravity %}G{% endif %}{% endif %}")
                .unwrap();
        assert_eq!(nodes.len(), 1);

        let elif = &nodes[0].children()[1];
        assert_eq!(elif.kind(), NodeKind::Elif);
        assert_eq!(elif.children()[1].kind(), NodeKind::If);
    }

    #[test]
    fn test_for_block() {
        let nodes = parse("{% for users as user %}{$ user },{% endfor %}").unwrap();
        match &nodes[0] {
            Node::For {
                list,
                alias,
                children,
            } => {
                assert_eq!(list, "users");
                assert_eq!(alias, "user");
                assert_eq!(children.len(), 2);
            }
            other => panic!("Expected for node, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_blocks_close_at_end() {
        let nodes = parse("Hello {% if is_world %}world").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].children(), &[Node::text("world")]);

        assert!(parse("{% for a as b %}x").is_ok());
    }

    #[test]
    fn test_structure_errors() {
        for input in [
            "{% elif debug %}Debug mode{% endif %}",
            "{% else %}Debug mode{% endif %}",
            "{% if debug %}D{% else %}R{% else %}, not debug{% endif %}",
            "{% if debug %}D{% else %}R{% elif x %}X{% endif %}",
            "text{% endif %}",
            "{% endfor %}",
            "{% if a %}{% endfor %}",
            "{% for a as b %}{% endif %}",
            "{% for a as b %}{% else %}{% endfor %}",
            "hello {% infloop %}world{% endinfloop %}",
            "{% endif now %}",
            "{%  %}",
        ] {
            assert!(parse(input).unwrap_err().is_invalid_tag(), "{}", input);
        }
    }

    #[test]
    fn test_for_syntax_error_kind() {
        let err = parse("Users: {% for users user %}{$ user },{% endfor %}").unwrap_err();
        assert!(err.is_expression_syntax());
    }

    #[test]
    fn test_errors_carry_position() {
        let err = parse("line\n  {$ bad..name }").unwrap_err();
        assert!(err.is_invalid_tag());
        assert!(err.to_string().starts_with("line 2, column 3"));
    }
}

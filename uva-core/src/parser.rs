//! Recursive-descent parser producing an [`AstNode`] tree.
//!
//! Statement-level nodes are attached to their parent before a fault inside
//! them is propagated, so a failed parse still yields every declaration that
//! was started.

use crate::ast::{AstNode, NodeKind};
use crate::error::{CoreError, Recovered};
use crate::lexer::{Token, TokenCategory};

/// Deepest nesting of statements and expressions accepted before parsing
/// stops with a fault.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse a whole token stream into a tree rooted at a `Root` node.
///
/// Parsing stops at the first fault; the tree built so far is returned with
/// it.
pub fn parse_all(tokens: &[Token]) -> Recovered<AstNode> {
    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
    };
    let mut root = AstNode::root();
    match parser.parse_program(&mut root) {
        Ok(()) => Recovered::complete(root),
        Err(fault) => Recovered::partial(root, fault),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    /// Statements and expressions currently open.
    depth: usize,
}

impl<'t> Parser<'t> {
    fn parse_program(&mut self, root: &mut AstNode) -> Result<(), CoreError> {
        while self.peek().is_some() {
            self.parse_statement(root)?;
        }
        Ok(())
    }

    fn parse_statement(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.nested("statement", |p| {
            let token = p.expect_any("statement")?;
            match (token.category, token.text.as_str()) {
                (TokenCategory::Delimiter, ";") => {
                    p.position += 1;
                    Ok(())
                }
                (TokenCategory::Keyword, "class") => p.parse_class(parent),
                (TokenCategory::Keyword, "function") => p.parse_function(parent),
                (TokenCategory::Keyword, "let" | "var" | "const") => p.parse_variable(parent),
                (TokenCategory::Keyword, "if") => p.parse_if(parent),
                (TokenCategory::Keyword, "while") => p.parse_while(parent),
                (TokenCategory::Keyword, "return") => p.parse_return(parent),
                _ => {
                    let expr = p.parse_expression()?;
                    let mut node = AstNode::new(NodeKind::ExpressionStatement);
                    node.push(expr);
                    parent.push(node);
                    Ok(())
                }
            }
        })
    }

    /// Run `body` one nesting level deeper, failing once the limit is hit.
    fn nested<R>(
        &mut self,
        what: &str,
        body: impl FnOnce(&mut Self) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let token = self.expect_any(what)?;
            return Err(error_at(
                token,
                format!("{what} nested deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    /// Build `node` with `body`, attaching it to `parent` whether or not
    /// `body` succeeds.
    fn build(
        &mut self,
        parent: &mut AstNode,
        mut node: AstNode,
        body: impl FnOnce(&mut Self, &mut AstNode) -> Result<(), CoreError>,
    ) -> Result<(), CoreError> {
        let result = body(self, &mut node);
        parent.push(node);
        result
    }

    fn parse_class(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.position += 1; // 'class'
        self.build(parent, AstNode::new(NodeKind::ClassDeclaration), |p, class| {
            let name = p.expect_identifier("class name")?;
            class.push(AstNode::with_token(NodeKind::DeclarationName, name));
            if p.eat_keyword("extends") {
                let base = p.expect_identifier("base class name")?;
                class.push(AstNode::with_token(NodeKind::BaseClass, base));
            }
            p.parse_statements(class, &["end"])?;
            p.expect_keyword("end")
        })
    }

    fn parse_function(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.position += 1; // 'function'
        self.build(parent, AstNode::new(NodeKind::FunctionDeclaration), |p, function| {
            let name = p.expect_identifier("function name")?;
            function.push(AstNode::with_token(NodeKind::DeclarationName, name));
            p.parse_parameters(function)?;
            p.build(function, AstNode::new(NodeKind::Block), |p, block| {
                p.parse_statements(block, &["end"])
            })?;
            p.expect_keyword("end")
        })
    }

    fn parse_parameters(&mut self, function: &mut AstNode) -> Result<(), CoreError> {
        self.expect_delimiter("(")?;
        self.build(function, AstNode::new(NodeKind::ParameterList), |p, params| {
            if p.eat_delimiter(")") {
                return Ok(());
            }
            loop {
                let name = p.expect_identifier("parameter name")?;
                params.push(AstNode::with_token(NodeKind::Parameter, name));
                if !p.eat_delimiter(",") {
                    break;
                }
            }
            p.expect_delimiter(")")
        })
    }

    fn parse_variable(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.position += 1; // 'let' / 'var' / 'const'
        self.build(parent, AstNode::new(NodeKind::VariableDeclaration), |p, variable| {
            let name = p.expect_identifier("variable name")?;
            variable.push(AstNode::with_token(NodeKind::DeclarationName, name));
            if p.eat_operator("=") {
                variable.push(p.parse_expression()?);
            }
            Ok(())
        })
    }

    fn parse_if(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.position += 1; // 'if'
        self.build(parent, AstNode::new(NodeKind::IfStatement), |p, statement| {
            statement.push(p.parse_expression()?);
            p.build(statement, AstNode::new(NodeKind::Block), |p, block| {
                p.parse_statements(block, &["else", "end"])
            })?;
            if p.eat_keyword("else") {
                p.build(statement, AstNode::new(NodeKind::Block), |p, block| {
                    p.parse_statements(block, &["end"])
                })?;
            }
            p.expect_keyword("end")
        })
    }

    fn parse_while(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.position += 1; // 'while'
        self.build(parent, AstNode::new(NodeKind::WhileStatement), |p, statement| {
            statement.push(p.parse_expression()?);
            p.build(statement, AstNode::new(NodeKind::Block), |p, block| {
                p.parse_statements(block, &["end"])
            })?;
            p.expect_keyword("end")
        })
    }

    fn parse_return(&mut self, parent: &mut AstNode) -> Result<(), CoreError> {
        self.position += 1; // 'return'
        self.build(parent, AstNode::new(NodeKind::ReturnStatement), |p, statement| {
            if p.peek().is_some_and(starts_expression) {
                statement.push(p.parse_expression()?);
            }
            Ok(())
        })
    }

    /// Parse statements into `block` until one of the `terminators` keywords
    /// is next. The terminator itself is left for the caller.
    fn parse_statements(
        &mut self,
        block: &mut AstNode,
        terminators: &[&str],
    ) -> Result<(), CoreError> {
        loop {
            let token = self.expect_any(&format!("'{}'", terminators.join("' or '")))?;
            if token.category == TokenCategory::Keyword
                && terminators.contains(&token.text.as_str())
            {
                return Ok(());
            }
            self.parse_statement(block)?;
        }
    }

    fn parse_expression(&mut self) -> Result<AstNode, CoreError> {
        self.nested("expression", |p| {
            let target = p.parse_binary(1)?;
            if let Some(operator) = p.peek().filter(|t| t.is(TokenCategory::Operator, "=")) {
                p.position += 1;
                let value = p.parse_expression()?;
                let mut node = AstNode::with_token(NodeKind::Assignment, operator.clone());
                node.push(target);
                node.push(value);
                return Ok(node);
            }
            Ok(target)
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<AstNode, CoreError> {
        let mut left = self.parse_unary()?;
        while let Some((operator, precedence)) = self
            .peek()
            .and_then(|t| binary_precedence(t).map(|p| (t, p)))
        {
            if precedence < min_precedence {
                break;
            }
            self.position += 1;
            let right = self.parse_binary(precedence + 1)?;
            let mut node = AstNode::with_token(NodeKind::BinaryExpression, operator.clone());
            node.push(left);
            node.push(right);
            left = node;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<AstNode, CoreError> {
        if let Some(operator) = self.peek().filter(|t| is_unary_operator(t)) {
            self.position += 1;
            let operand = self.nested("expression", Self::parse_unary)?;
            let mut node = AstNode::with_token(NodeKind::UnaryExpression, operator.clone());
            node.push(operand);
            return Ok(node);
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<AstNode, CoreError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_delimiter("(") {
                let mut call = AstNode::new(NodeKind::Call);
                call.push(expr);
                let mut args = AstNode::new(NodeKind::ArgumentList);
                self.parse_list(&mut args, ")")?;
                call.push(args);
                expr = call;
            } else if self.eat_operator(".") {
                let member = self.expect_identifier("member name")?;
                let mut access = AstNode::new(NodeKind::MemberAccess);
                access.push(expr);
                access.push(AstNode::with_token(NodeKind::Identifier, member));
                expr = access;
            } else if self.eat_delimiter("[") {
                let mut index = AstNode::new(NodeKind::Index);
                index.push(expr);
                index.push(self.parse_expression()?);
                self.expect_delimiter("]")?;
                expr = index;
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<AstNode, CoreError> {
        let token = self.expect_any("expression")?;
        match token.category {
            TokenCategory::Literal => {
                self.position += 1;
                Ok(AstNode::with_token(NodeKind::Literal, token.clone()))
            }
            TokenCategory::Identifier => {
                self.position += 1;
                Ok(AstNode::with_token(NodeKind::Identifier, token.clone()))
            }
            TokenCategory::Keyword if token.text == "self" => {
                self.position += 1;
                Ok(AstNode::with_token(NodeKind::Identifier, token.clone()))
            }
            TokenCategory::Delimiter if token.text == "(" => {
                self.position += 1;
                let expr = self.parse_expression()?;
                self.expect_delimiter(")")?;
                Ok(expr)
            }
            TokenCategory::Delimiter if token.text == "[" => {
                self.position += 1;
                let mut array = AstNode::with_token(NodeKind::ArrayLiteral, token.clone());
                self.parse_list(&mut array, "]")?;
                Ok(array)
            }
            _ => Err(error_at(token, format!("expected expression, found '{}'", token.text))),
        }
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, list: &mut AstNode, close: &str) -> Result<(), CoreError> {
        if self.eat_delimiter(close) {
            return Ok(());
        }
        loop {
            list.push(self.parse_expression()?);
            if !self.eat_delimiter(",") {
                break;
            }
        }
        self.expect_delimiter(close)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    fn expect_any(&self, what: &str) -> Result<&'t Token, CoreError> {
        self.peek()
            .ok_or_else(|| CoreError::UnexpectedEof(format!("expected {what}")))
    }

    fn eat(&mut self, category: TokenCategory, text: &str) -> bool {
        if self.peek().is_some_and(|t| t.is(category, text)) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.eat(TokenCategory::Keyword, keyword)
    }

    fn eat_operator(&mut self, operator: &str) -> bool {
        self.eat(TokenCategory::Operator, operator)
    }

    fn eat_delimiter(&mut self, delimiter: &str) -> bool {
        self.eat(TokenCategory::Delimiter, delimiter)
    }

    fn expect(&mut self, category: TokenCategory, text: &str) -> Result<(), CoreError> {
        let token = self.expect_any(&format!("'{text}'"))?;
        if self.eat(category, text) {
            Ok(())
        } else {
            Err(error_at(token, format!("expected '{text}', found '{}'", token.text)))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), CoreError> {
        self.expect(TokenCategory::Keyword, keyword)
    }

    fn expect_delimiter(&mut self, delimiter: &str) -> Result<(), CoreError> {
        self.expect(TokenCategory::Delimiter, delimiter)
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Token, CoreError> {
        let token = self.expect_any(what)?;
        if token.category != TokenCategory::Identifier {
            return Err(error_at(token, format!("expected {what}, found '{}'", token.text)));
        }
        self.position += 1;
        Ok(token.clone())
    }
}

fn error_at(token: &Token, message: String) -> CoreError {
    CoreError::ParseError {
        file: token.origin_file.clone(),
        position: token.position,
        message,
    }
}

fn binary_precedence(token: &Token) -> Option<u8> {
    if !matches!(token.category, TokenCategory::Operator | TokenCategory::Keyword) {
        return None;
    }
    match token.text.as_str() {
        "or" | "||" => Some(1),
        "and" | "&&" => Some(2),
        "==" | "!=" => Some(3),
        "<" | "<=" | ">" | ">=" => Some(4),
        "+" | "-" => Some(5),
        "*" | "/" | "%" => Some(6),
        _ => None,
    }
}

fn is_unary_operator(token: &Token) -> bool {
    token.is(TokenCategory::Operator, "!")
        || token.is(TokenCategory::Operator, "-")
        || token.is_keyword("not")
}

fn starts_expression(token: &Token) -> bool {
    match token.category {
        TokenCategory::Identifier | TokenCategory::Literal => true,
        TokenCategory::Keyword => matches!(token.text.as_str(), "self" | "not"),
        TokenCategory::Operator => matches!(token.text.as_str(), "!" | "-"),
        TokenCategory::Delimiter => matches!(token.text.as_str(), "(" | "["),
        TokenCategory::Directive => false,
    }
}

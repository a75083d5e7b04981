use crate::lexer::Token;

/// Tag of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    ClassDeclaration,
    /// Name of a class, function or variable declaration; carries the name token.
    DeclarationName,
    BaseClass,
    FunctionDeclaration,
    ParameterList,
    Parameter,
    Block,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    ReturnStatement,
    ExpressionStatement,
    Assignment,
    BinaryExpression,
    UnaryExpression,
    Call,
    ArgumentList,
    MemberAccess,
    Index,
    ArrayLiteral,
    Identifier,
    Literal,
}

/// A node of the syntax tree.
///
/// Children are kept in source order. Leaf and name nodes carry the token
/// they were built from; operator nodes carry their operator token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub children: Vec<AstNode>,
    pub token: Option<Token>,
}

impl AstNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            token: None,
        }
    }

    pub fn with_token(kind: NodeKind, token: Token) -> Self {
        Self {
            kind,
            children: Vec::new(),
            token: Some(token),
        }
    }

    pub fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    pub fn push(&mut self, child: AstNode) {
        self.children.push(child);
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<&AstNode> {
        self.children.iter().find(|child| child.kind == kind)
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }
}

// Long operator and postfix chains grow deep left spines; tear them down
// with an explicit stack instead of recursing once per level.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_child_of_kind() {
        let mut node = AstNode::new(NodeKind::ClassDeclaration);
        node.push(AstNode::new(NodeKind::BaseClass));
        node.push(AstNode::new(NodeKind::DeclarationName));
        assert!(node.child_of_kind(NodeKind::DeclarationName).is_some());
        assert!(node.child_of_kind(NodeKind::Block).is_none());
    }

    #[test]
    fn drops_deep_trees_without_recursing() {
        let mut node = AstNode::new(NodeKind::Identifier);
        for _ in 0..1_000_000 {
            let mut parent = AstNode::new(NodeKind::UnaryExpression);
            parent.push(node);
            node = parent;
        }
        drop(node);
    }
}

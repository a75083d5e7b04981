//! Top-level class declarations and their textual references.
//!
//! Matching is a flat, whole-stream comparison of identifier text. There is
//! no scoping: shadowed names, member names and the declaration's own name
//! token all count as references.

use std::path::PathBuf;

use tracing::debug;
use uva_core::{AstNode, NodeKind, SourcePosition, Token, TokenCategory};

use crate::tokens::TokenStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
        }
    }
}

/// A place where a token appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub origin_file: PathBuf,
    pub position: SourcePosition,
}

impl From<&Token> for Reference {
    fn from(token: &Token) -> Self {
        Self {
            origin_file: token.origin_file.clone(),
            position: token.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub origin_file: PathBuf,
    pub position: SourcePosition,
    /// Every identifier token with the same text, in token-stream order.
    pub references: Vec<Reference>,
}

/// Collect the class declarations directly under `root`, in source order.
pub fn resolve_declarations(root: &AstNode, tokens: &TokenStream) -> Vec<Declaration> {
    root.children
        .iter()
        .filter(|node| node.is(NodeKind::ClassDeclaration))
        .filter_map(|class| {
            let Some(name) = class
                .child_of_kind(NodeKind::DeclarationName)
                .and_then(|node| node.token.as_ref())
            else {
                debug!("skipping class declaration without a name");
                return None;
            };
            Some(Declaration {
                kind: DeclarationKind::Class,
                name: name.text.clone(),
                origin_file: name.origin_file.clone(),
                position: name.position,
                references: find_references(&name.text, tokens),
            })
        })
        .collect()
}

/// Identifier tokens whose text equals `name` exactly.
pub fn find_references(name: &str, tokens: &TokenStream) -> Vec<Reference> {
    tokens
        .iter()
        .filter(|token| token.category == TokenCategory::Identifier && token.text == name)
        .map(Reference::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use uva_core::{parse_all, tokenize};

    fn resolve(source: &str) -> Vec<Declaration> {
        let tokens = TokenStream::from(tokenize(Path::new("main.uva"), source).value);
        let root = parse_all(tokens.as_slice()).value;
        resolve_declarations(&root, &tokens)
    }

    fn offsets(declaration: &Declaration) -> Vec<usize> {
        declaration
            .references
            .iter()
            .map(|r| r.position.offset)
            .collect()
    }

    #[test]
    fn declaration_counts_itself_as_a_reference() {
        let declarations = resolve("class Lonely\nend");
        assert_eq!(declarations.len(), 1);
        let lonely = &declarations[0];
        assert_eq!(lonely.name, "Lonely");
        assert_eq!(lonely.kind, DeclarationKind::Class);
        assert_eq!(lonely.position, SourcePosition::new(1, 7, 6));
        assert_eq!(offsets(lonely), vec![6]);
    }

    #[test]
    fn references_span_the_whole_stream_in_order() {
        let source = "let a = Foo()\nclass Foo\n  function make()\n    return Foo()\n  end\nend\nFoo.make()";
        let declarations = resolve(source);
        let foo = &declarations[0];
        assert_eq!(foo.references.len(), 4);
        let positions = offsets(foo);
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert_eq!(positions[1], foo.position.offset);
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let declarations = resolve("class Foo end\nfoo\nFooBar\nFoo\n'Foo'");
        assert_eq!(offsets(&declarations[0]), vec![6, 25]);
    }

    #[test]
    fn no_scoping_or_shadowing_awareness() {
        let declarations = resolve("class Item end\nfunction f(Item)\n  let Item = 1\nend");
        assert_eq!(declarations[0].references.len(), 3);
    }

    #[test]
    fn only_top_level_classes_in_source_order() {
        let declarations = resolve("class B end\nfunction f()\nend\nclass A end\nif x\n  class Nested end\nend");
        let names: Vec<_> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn no_classes_yields_empty_list() {
        assert!(resolve("let x = 1").is_empty());
        assert!(resolve("").is_empty());
    }

    #[test]
    fn skips_class_node_without_name() {
        let mut root = AstNode::root();
        root.push(AstNode::new(NodeKind::ClassDeclaration));
        assert!(resolve_declarations(&root, &TokenStream::default()).is_empty());
    }
}

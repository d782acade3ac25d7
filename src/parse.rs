//! Source parsing and JSX discovery.
//!
//! Parses a JS/TS module with oxc, finds every outermost JSX element or
//! fragment and converts it into a `TreeNode`. JSX nested inside embedded
//! expressions is converted too and kept in the expression as a tree part,
//! tagged with the lexical scope it appears in.

use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::walk::{walk_arrow_function_expression, walk_function};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::scope::ScopeFlags;

use crate::ir::{
    is_component_tag, AttrName, Attribute, ElementNode, Expr, ExprPart, FragmentNode, Literal,
    Scope, TreeNode, Value,
};
use crate::validate::{CompilerError, SourceLocation, ERR_PARSE};
use crate::whitespace::decode_entities;

/// One outermost JSX literal found in the program.
#[derive(Debug, Clone)]
pub struct JsxSite {
    pub start: usize,
    pub end: usize,
    pub scope: Scope,
    pub tree: TreeNode,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub sites: Vec<JsxSite>,
    /// Local names bound by the program's import declarations.
    pub imported_names: Vec<String>,
    /// Byte offset where module-scope declarations go: after the hashbang
    /// and directive prologue.
    pub declaration_offset: usize,
}

fn source_type_for(file_path: &str) -> SourceType {
    let source_type = SourceType::from_path(file_path)
        .unwrap_or_else(|_| SourceType::default().with_module(true));
    if source_type.is_typescript() {
        source_type
    } else {
        source_type.with_jsx(true)
    }
}

pub fn parse_source(source: &str, file_path: &str) -> Result<ParsedSource, CompilerError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type_for(file_path)).parse();

    if let Some(error) = ret.errors.first() {
        let offset = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| label.offset())
            .unwrap_or(0);
        let location = SourceLocation::from_offset(source, offset);
        return Err(CompilerError::new(
            ERR_PARSE,
            &error.to_string(),
            file_path,
            location.line,
            location.column,
        ));
    }
    if ret.panicked {
        return Err(CompilerError::new(ERR_PARSE, "Parser gave up", file_path, 1, 1));
    }

    let program = &ret.program;
    let declaration_offset = match (program.directives.last(), &program.hashbang) {
        (Some(directive), _) => directive.span.end as usize,
        (None, Some(hashbang)) => hashbang.span.end as usize,
        (None, None) => 0,
    };

    let mut collector = JsxCollector::new(source, 0);
    collector.visit_program(program);
    if let Some(error) = collector.error {
        return Err(error.in_file(file_path));
    }

    let mut sites = collector.sites;
    sites.sort_by_key(|s| s.start);

    Ok(ParsedSource {
        sites,
        imported_names: collector.imported_names,
        declaration_offset,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTOR
// ═══════════════════════════════════════════════════════════════════════════════

struct JsxCollector<'s> {
    source: &'s str,
    function_depth: u32,
    sites: Vec<JsxSite>,
    imported_names: Vec<String>,
    /// First conversion failure; the visit cannot return it directly.
    error: Option<CompilerError>,
}

impl<'s> JsxCollector<'s> {
    fn new(source: &'s str, function_depth: u32) -> Self {
        Self {
            source,
            function_depth,
            sites: vec![],
            imported_names: vec![],
            error: None,
        }
    }

    fn scope(&self) -> Scope {
        if self.function_depth > 0 {
            Scope::Function
        } else {
            Scope::Module
        }
    }

    fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::from_offset(self.source, span.start as usize)
    }

    fn record(&mut self, span: Span, tree: Result<TreeNode, CompilerError>) {
        match tree {
            Ok(tree) => self.sites.push(JsxSite {
                start: span.start as usize,
                end: span.end as usize,
                scope: self.scope(),
                tree,
            }),
            Err(error) => {
                if self.error.is_none() {
                    self.error = Some(error);
                }
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Conversion
    // ───────────────────────────────────────────────────────────────────────────

    fn convert_element(&mut self, el: &JSXElement<'_>) -> Result<TreeNode, CompilerError> {
        let name = &el.opening_element.name;
        let tag: String = name
            .span()
            .source_text(self.source)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let is_component = match name {
            JSXElementName::NamespacedName(_) => false,
            JSXElementName::ThisExpression(_) => true,
            _ => is_component_tag(&tag),
        };

        let mut attrs = Vec::with_capacity(el.opening_element.attributes.len());
        for item in &el.opening_element.attributes {
            attrs.push(self.convert_attribute(item)?);
        }

        let children = self.convert_children(&el.children)?;

        Ok(TreeNode::Element(ElementNode {
            tag,
            is_component,
            attrs,
            children,
            location: self.location(el.span),
        }))
    }

    fn convert_fragment(&mut self, frag: &JSXFragment<'_>) -> Result<TreeNode, CompilerError> {
        Ok(TreeNode::Fragment(FragmentNode {
            key: None,
            children: self.convert_children(&frag.children)?,
            location: self.location(frag.span),
        }))
    }

    fn convert_attribute(&mut self, item: &JSXAttributeItem<'_>) -> Result<Attribute, CompilerError> {
        match item {
            JSXAttributeItem::Attribute(attr) => {
                let name = match &attr.name {
                    JSXAttributeName::Identifier(id) => AttrName::plain(id.name.as_str()),
                    JSXAttributeName::NamespacedName(ns) => AttrName::Namespaced {
                        namespace: ns.namespace.name.to_string(),
                        name: ns.name.name.to_string(),
                    },
                };
                let value = match &attr.value {
                    None => Value::literal(Literal::Bool(true)),
                    Some(JSXAttributeValue::StringLiteral(s)) => {
                        Value::string(decode_entities(s.value.as_str()))
                    }
                    Some(JSXAttributeValue::ExpressionContainer(container)) => {
                        match container.expression.as_expression() {
                            Some(expr) => self.convert_value(expr)?,
                            None => Value::literal(Literal::Undefined),
                        }
                    }
                    Some(JSXAttributeValue::Element(el)) => {
                        let tree = self.convert_element(el)?;
                        self.tree_value(tree)
                    }
                    Some(JSXAttributeValue::Fragment(frag)) => {
                        let tree = self.convert_fragment(frag)?;
                        self.tree_value(tree)
                    }
                };
                Ok(Attribute::Named {
                    name,
                    value,
                    location: self.location(attr.span),
                })
            }
            JSXAttributeItem::SpreadAttribute(spread) => Ok(Attribute::Spread {
                argument: self.convert_expr(&spread.argument)?,
                location: self.location(spread.span),
            }),
        }
    }

    fn convert_children(&mut self, children: &[JSXChild<'_>]) -> Result<Vec<TreeNode>, CompilerError> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                JSXChild::Text(text) => out.push(TreeNode::Text {
                    value: text.value.to_string(),
                }),
                JSXChild::Element(el) => out.push(self.convert_element(el)?),
                JSXChild::Fragment(frag) => out.push(self.convert_fragment(frag)?),
                JSXChild::ExpressionContainer(container) => {
                    // `{}` and `{/* comment */}` carry nothing
                    if let Some(expr) = container.expression.as_expression() {
                        out.push(TreeNode::ExpressionSlot {
                            value: self.convert_value(expr)?,
                        });
                    }
                }
                JSXChild::Spread(spread) => out.push(TreeNode::ExpressionSlot {
                    value: Value::Expr {
                        expr: self.convert_expr(&spread.expression)?,
                    },
                }),
            }
        }
        Ok(out)
    }

    fn tree_value(&self, tree: TreeNode) -> Value {
        Value::Expr {
            expr: Expr {
                parts: vec![ExprPart::Tree {
                    node: Box::new(tree),
                    scope: self.scope(),
                }],
            },
        }
    }

    fn convert_value(&mut self, expr: &Expression<'_>) -> Result<Value, CompilerError> {
        if let Expression::StringLiteral(s) = expr.without_parentheses() {
            return Ok(Value::string(s.value.as_str()));
        }
        if let Expression::TemplateLiteral(tpl) = expr.without_parentheses() {
            if let ([quasi], true) = (tpl.quasis.as_slice(), tpl.expressions.is_empty()) {
                if let Some(cooked) = &quasi.value.cooked {
                    return Ok(Value::string(cooked.as_str()));
                }
            }
        }
        let converted = self.convert_expr(expr)?;
        Ok(match converted.as_plain_source() {
            Some(code) => Value::from_source(code),
            None => Value::Expr { expr: converted },
        })
    }

    /// Source text of `expr`, with any JSX inside it converted to tree parts.
    fn convert_expr(&mut self, expr: &Expression<'_>) -> Result<Expr, CompilerError> {
        let span = expr.span();
        let mut nested = JsxCollector::new(self.source, self.function_depth);
        nested.visit_expression(expr);
        if let Some(error) = nested.error {
            return Err(error);
        }
        let mut sites = nested.sites;
        sites.sort_by_key(|s| s.start);

        let mut parts = Vec::with_capacity(sites.len() * 2 + 1);
        let mut cursor = span.start as usize;
        for site in sites {
            if site.start > cursor {
                parts.push(ExprPart::Source {
                    code: self.source[cursor..site.start].to_string(),
                });
            }
            parts.push(ExprPart::Tree {
                node: Box::new(site.tree),
                scope: site.scope,
            });
            cursor = site.end;
        }
        let end = span.end as usize;
        if end > cursor || parts.is_empty() {
            parts.push(ExprPart::Source {
                code: self.source[cursor..end.max(cursor)].to_string(),
            });
        }
        Ok(Expr { parts })
    }
}

impl<'a, 's> Visit<'a> for JsxCollector<'s> {
    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        if self.error.is_some() {
            return;
        }
        let tree = self.convert_element(it);
        self.record(it.span, tree);
    }

    fn visit_jsx_fragment(&mut self, it: &JSXFragment<'a>) {
        if self.error.is_some() {
            return;
        }
        let tree = self.convert_fragment(it);
        self.record(it.span, tree);
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        self.function_depth += 1;
        walk_function(self, it, flags);
        self.function_depth -= 1;
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        self.function_depth += 1;
        walk_arrow_function_expression(self, it);
        self.function_depth -= 1;
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        if let Some(specifiers) = &it.specifiers {
            for specifier in specifiers {
                let local = match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
                };
                self.imported_names.push(local.name.to_string());
            }
        }
    }
}

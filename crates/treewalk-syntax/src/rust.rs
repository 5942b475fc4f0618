//! Rust grammar adapter built on `syn`.

use crate::tokens::{
    self, BLOCK, CALL, CLOSURE, CONST_DEF, ENUM_DEF, FIELD, FILE, FN_DEF, FOR, IF, IMPL_DEF, LET,
    LOOP, MACRO_CALL, MATCH, MATCH_ARM, METHOD_CALL, METHOD_DEF, MOD_DEF, PARAM, RCURLY, RETURN,
    STATIC_DEF, STRUCT_DEF, TRAIT_DEF, TRY, TYPE_ALIAS, UNSAFE, USE, VARIANT, WHILE,
};
use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Arm, Block, Expr, ExprCall, ExprClosure, ExprForLoop, ExprIf, ExprLoop, ExprMatch,
    ExprMethodCall, ExprReturn, ExprTry, ExprUnsafe, ExprWhile, Field, FnArg, ImplItemFn, ItemConst,
    ItemEnum, ItemFn, ItemImpl, ItemMod, ItemStatic, ItemStruct, ItemTrait, ItemType, ItemUse,
    Local, Macro, Pat, TraitItemFn, Type, UseTree, Variant,
};
use tracing::debug;
use treewalk_core::{Ast, FileText, Language, NodeId, ParseError, TokenType};

/// Rust sources, parsed with `syn` into the [`tokens`] vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustLanguage;

impl RustLanguage {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Language for RustLanguage {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn token_count(&self) -> usize {
        tokens::NAMES.len()
    }

    fn token_name(&self, ty: TokenType) -> Option<&'static str> {
        tokens::name(ty)
    }

    fn token_id(&self, name: &str) -> Option<TokenType> {
        tokens::id(name)
    }

    fn parse(&self, file: &FileText) -> Result<Ast, ParseError> {
        if file.content().trim().is_empty() {
            return Ok(Ast::new());
        }

        let syntax = syn::parse_file(file.content()).map_err(|e| parse_error(&e))?;
        let mut builder = TreeBuilder::new();
        builder.visit_file(&syntax);
        debug!(
            "Parsed {} into {} node(s)",
            file.path().display(),
            builder.ast.len()
        );
        Ok(builder.ast)
    }
}

fn parse_error(err: &syn::Error) -> ParseError {
    let start = err.span().start();
    let error = ParseError::new(err.to_string());
    if start.line == 0 {
        error
    } else {
        error.at(start.line, start.column)
    }
}

/// Mirrors the `syn` tree into an [`Ast`], keeping only the constructs the
/// vocabulary names. The stack always holds the root at its bottom.
struct TreeBuilder {
    ast: Ast,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let ast = Ast::with_root(FILE, "", 1, 0);
        let stack = ast.root_id().into_iter().collect();
        Self { ast, stack }
    }

    fn enter(&mut self, ty: TokenType, text: impl Into<String>, span: Span) {
        let start = span.start();
        if let Some(&parent) = self.stack.last() {
            let id = self
                .ast
                .append_new(parent, ty, text, start.line, start.column);
            self.stack.push(id);
        }
    }

    fn leave(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn nest(
        &mut self,
        ty: TokenType,
        text: impl Into<String>,
        span: Span,
        walk: impl FnOnce(&mut Self),
    ) {
        self.enter(ty, text, span);
        walk(self);
        self.leave();
    }
}

impl<'ast> Visit<'ast> for TreeBuilder {
    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        self.nest(USE, use_text(&node.tree), node.use_token.span, |_| {});
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        self.nest(MOD_DEF, node.ident.to_string(), node.mod_token.span, |b| {
            visit::visit_item_mod(b, node);
        });
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.nest(FN_DEF, node.sig.ident.to_string(), node.sig.fn_token.span, |b| {
            visit::visit_item_fn(b, node);
        });
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.nest(METHOD_DEF, node.sig.ident.to_string(), node.sig.fn_token.span, |b| {
            visit::visit_impl_item_fn(b, node);
        });
    }

    fn visit_trait_item_fn(&mut self, node: &'ast TraitItemFn) {
        self.nest(METHOD_DEF, node.sig.ident.to_string(), node.sig.fn_token.span, |b| {
            visit::visit_trait_item_fn(b, node);
        });
    }

    fn visit_fn_arg(&mut self, node: &'ast FnArg) {
        let (text, span) = match node {
            FnArg::Receiver(receiver) => ("self".to_string(), receiver.self_token.span),
            FnArg::Typed(typed) => (pat_text(&typed.pat), typed.pat.span()),
        };
        self.nest(PARAM, text, span, |b| visit::visit_fn_arg(b, node));
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        self.nest(STRUCT_DEF, node.ident.to_string(), node.struct_token.span, |b| {
            visit::visit_item_struct(b, node);
        });
    }

    fn visit_item_enum(&mut self, node: &'ast ItemEnum) {
        self.nest(ENUM_DEF, node.ident.to_string(), node.enum_token.span, |b| {
            visit::visit_item_enum(b, node);
        });
    }

    fn visit_variant(&mut self, node: &'ast Variant) {
        self.nest(VARIANT, node.ident.to_string(), node.ident.span(), |b| {
            visit::visit_variant(b, node);
        });
    }

    fn visit_field(&mut self, node: &'ast Field) {
        let (text, span) = match &node.ident {
            Some(ident) => (ident.to_string(), ident.span()),
            None => ("_".to_string(), node.ty.span()),
        };
        self.nest(FIELD, text, span, |b| visit::visit_field(b, node));
    }

    fn visit_item_trait(&mut self, node: &'ast ItemTrait) {
        self.nest(TRAIT_DEF, node.ident.to_string(), node.trait_token.span, |b| {
            visit::visit_item_trait(b, node);
        });
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        self.nest(IMPL_DEF, type_name(&node.self_ty), node.impl_token.span, |b| {
            visit::visit_item_impl(b, node);
        });
    }

    fn visit_item_type(&mut self, node: &'ast ItemType) {
        self.nest(TYPE_ALIAS, node.ident.to_string(), node.type_token.span, |b| {
            visit::visit_item_type(b, node);
        });
    }

    fn visit_item_const(&mut self, node: &'ast ItemConst) {
        self.nest(CONST_DEF, node.ident.to_string(), node.const_token.span, |b| {
            visit::visit_item_const(b, node);
        });
    }

    fn visit_item_static(&mut self, node: &'ast ItemStatic) {
        self.nest(STATIC_DEF, node.ident.to_string(), node.static_token.span, |b| {
            visit::visit_item_static(b, node);
        });
    }

    fn visit_block(&mut self, node: &'ast Block) {
        let braces = node.brace_token.span;
        self.enter(BLOCK, "{", braces.open());
        visit::visit_block(self, node);
        self.nest(RCURLY, "}", braces.close(), |_| {});
        self.leave();
    }

    fn visit_local(&mut self, node: &'ast Local) {
        self.nest(LET, pat_text(&node.pat), node.let_token.span, |b| {
            visit::visit_local(b, node);
        });
    }

    fn visit_expr_if(&mut self, node: &'ast ExprIf) {
        self.nest(IF, "if", node.if_token.span, |b| visit::visit_expr_if(b, node));
    }

    fn visit_expr_match(&mut self, node: &'ast ExprMatch) {
        self.nest(MATCH, "match", node.match_token.span, |b| {
            visit::visit_expr_match(b, node);
        });
    }

    fn visit_arm(&mut self, node: &'ast Arm) {
        self.nest(MATCH_ARM, "=>", node.pat.span(), |b| visit::visit_arm(b, node));
    }

    fn visit_expr_loop(&mut self, node: &'ast ExprLoop) {
        self.nest(LOOP, "loop", node.loop_token.span, |b| {
            visit::visit_expr_loop(b, node);
        });
    }

    fn visit_expr_while(&mut self, node: &'ast ExprWhile) {
        self.nest(WHILE, "while", node.while_token.span, |b| {
            visit::visit_expr_while(b, node);
        });
    }

    fn visit_expr_for_loop(&mut self, node: &'ast ExprForLoop) {
        self.nest(FOR, "for", node.for_token.span, |b| {
            visit::visit_expr_for_loop(b, node);
        });
    }

    fn visit_expr_closure(&mut self, node: &'ast ExprClosure) {
        self.nest(CLOSURE, "|", node.span(), |b| {
            visit::visit_expr_closure(b, node);
        });
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        let callee = match &*node.func {
            Expr::Path(path) => path_text(&path.path),
            _ => String::new(),
        };
        self.nest(CALL, callee, node.func.span(), |b| {
            visit::visit_expr_call(b, node);
        });
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        self.nest(METHOD_CALL, node.method.to_string(), node.method.span(), |b| {
            visit::visit_expr_method_call(b, node);
        });
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        self.nest(MACRO_CALL, path_text(&node.path), node.path.span(), |b| {
            visit::visit_macro(b, node);
        });
    }

    fn visit_expr_return(&mut self, node: &'ast ExprReturn) {
        self.nest(RETURN, "return", node.return_token.span, |b| {
            visit::visit_expr_return(b, node);
        });
    }

    fn visit_expr_try(&mut self, node: &'ast ExprTry) {
        self.nest(TRY, "?", node.question_token.spans[0], |b| {
            visit::visit_expr_try(b, node);
        });
    }

    fn visit_expr_unsafe(&mut self, node: &'ast ExprUnsafe) {
        self.nest(UNSAFE, "unsafe", node.unsafe_token.span, |b| {
            visit::visit_expr_unsafe(b, node);
        });
    }
}

fn path_text(path: &syn::Path) -> String {
    let joined = path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");
    if path.leading_colon.is_some() {
        format!("::{joined}")
    } else {
        joined
    }
}

fn use_text(tree: &UseTree) -> String {
    match tree {
        UseTree::Path(p) => format!("{}::{}", p.ident, use_text(&p.tree)),
        UseTree::Name(n) => n.ident.to_string(),
        UseTree::Rename(r) => format!("{} as {}", r.ident, r.rename),
        UseTree::Glob(_) => "*".to_string(),
        UseTree::Group(g) => {
            let items: Vec<String> = g.items.iter().map(use_text).collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn pat_text(pat: &Pat) -> String {
    match pat {
        Pat::Ident(p) => p.ident.to_string(),
        Pat::Type(t) => pat_text(&t.pat),
        Pat::Reference(r) => pat_text(&r.pat),
        Pat::Tuple(_) | Pat::TupleStruct(_) => "(..)".to_string(),
        Pat::Struct(_) => "{..}".to_string(),
        _ => "_".to_string(),
    }
}

fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .map_or_else(String::new, |s| s.ident.to_string()),
        Type::Reference(r) => type_name(&r.elem),
        _ => "_".to_string(),
    }
}

//! Reference collection visitor.

use oxc_ast::ast::{
    ArrowFunctionExpression, BindingIdentifier, BindingPatternKind, CallExpression, Class,
    ExportDefaultDeclaration, ExportDefaultDeclarationKind, ExportSpecifier, Expression, Function,
    IdentifierReference, StaticMemberExpression, TSInterfaceDeclaration, TSType, TSTypeAliasDeclaration,
    VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::{ScopeFlags, Scoping, SymbolId};
use rustc_hash::FxHashMap;

use super::{FunctionOwner, ReferenceContext, ReferenceFact};
use crate::span::{LineIndex, NodeKind};

#[derive(Debug, Clone)]
enum Frame {
    Function(FunctionOwner),
    Class,
    /// An immediately invoked function runs on its caller's path.
    Transparent,
}

/// Walks a whole program and records, for every resolved identifier
/// reference, the [`ReferenceContext`] it is evaluated in.
pub(super) struct ReferenceCollector<'s> {
    scoping: &'s Scoping,
    source: &'s str,
    index: &'s LineIndex,
    frames: Vec<Frame>,
    /// Frame for the next function entered, set by its syntactic parent.
    pending: Option<Frame>,
    in_export_specifier: bool,
    member: Option<String>,
    references: FxHashMap<SymbolId, Vec<ReferenceFact>>,
}

impl<'s> ReferenceCollector<'s> {
    pub(super) fn new(scoping: &'s Scoping, source: &'s str, index: &'s LineIndex) -> Self {
        Self {
            scoping,
            source,
            index,
            frames: Vec::new(),
            pending: None,
            in_export_specifier: false,
            member: None,
            references: FxHashMap::default(),
        }
    }

    pub(super) fn into_references(self) -> FxHashMap<SymbolId, Vec<ReferenceFact>> {
        self.references
    }

    fn context(&self) -> ReferenceContext {
        if self.in_export_specifier {
            return ReferenceContext::ReExport;
        }

        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Transparent => continue,
                Frame::Function(owner) => return ReferenceContext::Function(owner.clone()),
                Frame::Class => return ReferenceContext::ClassBody,
            }
        }

        ReferenceContext::TopLevel
    }

    fn enter_function(&mut self, id: Option<&BindingIdentifier<'_>>) {
        let frame = self.pending.take().unwrap_or_else(|| {
            id.and_then(binding_owner)
                .map_or(Frame::Function(FunctionOwner::Anonymous), Frame::Function)
        });
        self.frames.push(frame);
    }
}

fn binding_owner(id: &BindingIdentifier<'_>) -> Option<FunctionOwner> {
    id.symbol_id.get().map(|symbol| FunctionOwner::Binding {
        symbol,
        name: id.name.to_string(),
    })
}

fn is_function_like(expr: &Expression<'_>) -> bool {
    matches!(
        expr.without_parentheses(),
        Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_)
    )
}

impl<'a, 'ast> Visit<'ast> for ReferenceCollector<'a> {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'ast>) {
        let Some(reference_id) = ident.reference_id.get() else {
            return;
        };
        let Some(symbol) = self.scoping.get_reference(reference_id).symbol_id() else {
            return;
        };

        let fact = ReferenceFact {
            node: self.index.node(NodeKind::Identifier, ident.span, self.source),
            context: self.context(),
            member: self.member.take(),
        };
        self.references.entry(symbol).or_default().push(fact);
    }

    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'ast>) {
        if let Expression::Identifier(ident) = &expr.object {
            self.member = Some(expr.property.name.to_string());
            self.visit_identifier_reference(ident);
            self.member = None;
            return;
        }

        walk::walk_static_member_expression(self, expr);
    }

    fn visit_function(&mut self, func: &Function<'ast>, flags: ScopeFlags) {
        self.enter_function(func.id.as_ref());
        walk::walk_function(self, func, flags);
        self.frames.pop();
    }

    fn visit_arrow_function_expression(&mut self, arrow: &ArrowFunctionExpression<'ast>) {
        self.enter_function(None);
        walk::walk_arrow_function_expression(self, arrow);
        self.frames.pop();
    }

    /// `const f = () => {}` names the function after its binding.
    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'ast>) {
        if let (BindingPatternKind::BindingIdentifier(id), Some(init)) = (&decl.id.kind, &decl.init)
        {
            if is_function_like(init) {
                if let Some(owner) = binding_owner(id) {
                    self.visit_binding_pattern(&decl.id);
                    self.pending = Some(Frame::Function(owner));
                    self.visit_expression(init);
                    self.pending = None;
                    return;
                }
            }
        }

        walk::walk_variable_declarator(self, decl);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'ast>) {
        if is_function_like(&call.callee) {
            self.pending = Some(Frame::Transparent);
            self.visit_expression(&call.callee);
            self.pending = None;
            for argument in &call.arguments {
                self.visit_argument(argument);
            }
            return;
        }

        walk::walk_call_expression(self, call);
    }

    fn visit_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'ast>) {
        let anonymous = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => func.id.is_none(),
            ExportDefaultDeclarationKind::FunctionExpression(func) => func.id.is_none(),
            ExportDefaultDeclarationKind::ArrowFunctionExpression(_) => true,
            _ => false,
        };
        if anonymous {
            self.pending = Some(Frame::Function(FunctionOwner::DefaultExport));
        }
        walk::walk_export_default_declaration(self, decl);
        self.pending = None;
    }

    fn visit_export_specifier(&mut self, specifier: &ExportSpecifier<'ast>) {
        self.in_export_specifier = true;
        walk::walk_export_specifier(self, specifier);
        self.in_export_specifier = false;
    }

    /// Heritage and decorators run at definition time; the body does not.
    fn visit_class(&mut self, class: &Class<'ast>) {
        for decorator in &class.decorators {
            self.visit_decorator(decorator);
        }
        if let Some(super_class) = &class.super_class {
            self.visit_expression(super_class);
        }

        self.frames.push(Frame::Class);
        self.visit_class_body(&class.body);
        self.frames.pop();
    }

    // Type positions never read runtime values.
    fn visit_ts_type(&mut self, _ty: &TSType<'ast>) {}

    fn visit_ts_interface_declaration(&mut self, _decl: &TSInterfaceDeclaration<'ast>) {}

    fn visit_ts_type_alias_declaration(&mut self, _decl: &TSTypeAliasDeclaration<'ast>) {}
}

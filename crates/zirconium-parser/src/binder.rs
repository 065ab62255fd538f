//! Declaration binding.
//!
//! Walks a parsed [`SourceFile`] and records every declaration in a
//! [`SymbolTable`]. The file, each block, each function and each `for`
//! loop open a scope of their own.
//!
//! A bare `name = value` only declares a new variable when `name` does not
//! already resolve to an enclosing binding; otherwise it is a reassignment.

use rustc_hash::FxHashMap;
use zirconium_core::{NodeId, ParseError, ParseErrorKind, ParseErrors, Span};

use crate::ast::*;

// ============================================================================
// Types
// ============================================================================

/// Index of a scope in a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The file scope.
    pub const ROOT: ScopeId = ScopeId(0);
}

/// What a symbol was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
    Constant,
    Enum,
    Parameter,
}

/// A declared name.
#[derive(Debug, Clone, Copy)]
pub struct Symbol<'ast> {
    pub name: &'ast str,
    pub kind: SymbolKind,
    /// Scope the name was declared in.
    pub scope: ScopeId,
    /// The declaring node.
    pub node: NodeId,
    pub span: Span,
    /// Declared with an `export` prefix.
    pub exported: bool,
}

#[derive(Debug, Default)]
struct Scope<'ast> {
    parent: Option<ScopeId>,
    names: FxHashMap<&'ast str, usize>,
}

// ============================================================================
// SymbolTable
// ============================================================================

/// Declarations grouped by lexical scope.
#[derive(Debug)]
pub struct SymbolTable<'ast> {
    symbols: Vec<Symbol<'ast>>,
    scopes: Vec<Scope<'ast>>,
    /// Scope opened by a file, block, function or loop node.
    owners: FxHashMap<NodeId, ScopeId>,
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> SymbolTable<'ast> {
    /// A table with only the root scope.
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::default()],
            owners: FxHashMap::default(),
        }
    }

    /// Every symbol in declaration order.
    pub fn symbols(&self) -> &[Symbol<'ast>] {
        &self.symbols
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// The scope opened by `node`, if it opens one.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.owners.get(&node).copied()
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.0 as usize).and_then(|s| s.parent)
    }

    /// Look `name` up in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol<'ast>> {
        let index = *self.scopes.get(scope.0 as usize)?.names.get(name)?;
        self.symbols.get(index)
    }

    /// Look `name` up from `scope` outward to the root.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol<'ast>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.parent(id);
        }
        None
    }

    /// Symbols declared directly in `scope`.
    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol<'ast>> {
        self.symbols.iter().filter(move |s| s.scope == scope)
    }

    /// Symbols declared with `export`.
    pub fn exports(&self) -> impl Iterator<Item = &Symbol<'ast>> {
        self.symbols.iter().filter(|s| s.exported)
    }

    fn push_scope(&mut self, parent: ScopeId, owner: NodeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            names: FxHashMap::default(),
        });
        self.owners.insert(owner, id);
        id
    }

    /// Declare `symbol`, returning the binding it replaces in the same scope.
    fn declare(&mut self, symbol: Symbol<'ast>) -> Option<Symbol<'ast>> {
        let index = self.symbols.len();
        self.symbols.push(symbol);
        let scope = self.scopes.get_mut(symbol.scope.0 as usize)?;
        let previous = scope.names.insert(symbol.name, index)?;
        self.symbols.get(previous).copied()
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Output of [`bind`].
#[derive(Debug)]
pub struct BindResult<'ast> {
    pub symbols: SymbolTable<'ast>,
    pub warnings: ParseErrors,
}

/// Collect the declarations of `file`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn bind<'ast>(file: &'ast SourceFile<'ast>) -> BindResult<'ast> {
    let mut binder = Binder::new();
    binder.visit_source_file(file);
    binder.finish()
}

/// Visitor that fills a [`SymbolTable`].
pub struct Binder<'ast> {
    table: SymbolTable<'ast>,
    current: ScopeId,
    warnings: ParseErrors,
}

impl Default for Binder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Binder<'ast> {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            current: ScopeId::ROOT,
            warnings: ParseErrors::new(),
        }
    }

    pub fn finish(self) -> BindResult<'ast> {
        BindResult {
            symbols: self.table,
            warnings: self.warnings,
        }
    }

    fn with_scope(&mut self, owner: NodeId, f: impl FnOnce(&mut Self)) {
        let outer = self.current;
        self.current = self.table.push_scope(outer, owner);
        f(self);
        self.current = outer;
    }

    fn declare(&mut self, name: &'ast Identifier<'ast>, kind: SymbolKind, meta: &NodeMeta) {
        let symbol = Symbol {
            name: name.name,
            kind,
            scope: self.current,
            node: meta.id,
            span: name.meta.span,
            exported: meta.flags().contains(NodeFlags::EXPORT),
        };
        let previous = self.table.declare(symbol);
        if previous.is_some_and(|p| p.kind == SymbolKind::Constant) {
            self.warnings.push(
                ParseError::new(
                    ParseErrorKind::InvalidVariableAssignment,
                    name.meta.span,
                    format!("'{}' is already declared as a constant in this scope", name.name),
                )
                .with_node(meta.id),
            );
        }
    }
}

impl<'ast> Visitor<'ast> for Binder<'ast> {
    fn visit_source_file(&mut self, file: &'ast SourceFile<'ast>) {
        self.table.owners.insert(file.meta.id, ScopeId::ROOT);
        walk_source_file(self, file);
    }

    fn visit_block(&mut self, block: &'ast Block<'ast>) {
        self.with_scope(block.meta.id, |binder| walk_block(binder, block));
    }

    fn visit_variable_statement(&mut self, stmt: &'ast VariableStatement<'ast>) {
        self.visit_expr(stmt.declaration.initializer);

        let name = stmt.declaration.name;
        let kind = if stmt.is_const() {
            SymbolKind::Constant
        } else {
            SymbolKind::Variable
        };
        if stmt.is_declaration() {
            self.declare(name, kind, &stmt.meta);
            return;
        }

        match self.table.lookup(self.current, name.name) {
            Some(existing) if existing.kind == SymbolKind::Constant && existing.scope == self.current => {
                self.warnings.push(
                    ParseError::new(
                        ParseErrorKind::InvalidVariableAssignment,
                        name.meta.span,
                        format!("assignment to constant '{}'", name.name),
                    )
                    .with_node(stmt.meta.id),
                );
            }
            Some(_) => {}
            None => self.declare(name, SymbolKind::Variable, &stmt.meta),
        }
    }

    fn visit_for_in_statement(&mut self, stmt: &'ast ForInStatement<'ast>) {
        self.visit_expr(stmt.expression);
        self.with_scope(stmt.meta.id, |binder| {
            binder.declare(stmt.initializer, SymbolKind::Variable, &stmt.meta);
            binder.visit_block(stmt.body);
        });
    }

    fn visit_function_declaration(&mut self, func: &'ast FunctionDeclaration<'ast>) {
        self.declare(func.name, SymbolKind::Function, &func.meta);
        self.with_scope(func.meta.id, |binder| {
            for param in func.parameters {
                binder.visit_parameter(param);
            }
            binder.visit_block(func.body);
        });
    }

    fn visit_function_expression(&mut self, func: &'ast FunctionExpression<'ast>) {
        self.with_scope(func.meta.id, |binder| walk_function_expression(binder, func));
    }

    fn visit_parameter(&mut self, param: &'ast Parameter<'ast>) {
        self.declare(param.name, SymbolKind::Parameter, &param.meta);
    }

    fn visit_enum_declaration(&mut self, decl: &'ast EnumDeclaration<'ast>) {
        self.declare(decl.name, SymbolKind::Enum, &decl.meta);
    }
}

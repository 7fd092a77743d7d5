//! AST visitor trait for traversing the syntax tree.
//!
//! Default implementations walk into every child, so an implementation only
//! overrides the node kinds it cares about.

use crate::node::*;
use crate::types::FunctionId;

/// A visitor over the AST. Functions are handed out with the arena lifetime
/// so they can be collected.
pub trait AstVisitor<'a> {
    fn visit_function(&mut self, node: &'a FunctionNode<'a>) {
        walk_function(self, node);
    }

    fn visit_block(&mut self, node: &Block<'a>) {
        for statement in node.statements.iter() {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &Statement<'a>) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expression: &Expression<'a>) {
        walk_expression(self, expression);
    }
}

pub fn walk_function<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &'a FunctionNode<'a>) {
    visitor.visit_block(&node.body);
}

pub fn walk_statement<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, statement: &Statement<'a>) {
    match statement {
        Statement::Block(n) => visitor.visit_block(&n.block),
        Statement::Var(n) => {
            if let Some(init) = n.init {
                visitor.visit_expression(init);
            }
        }
        Statement::Empty(_) | Statement::Continue(_) | Statement::Break(_) | Statement::Debugger(_) => {}
        Statement::Expression(n) => visitor.visit_expression(n.expression),
        Statement::If(n) => {
            visitor.visit_expression(n.test);
            visitor.visit_block(&n.pass);
            if let Some(ref fail) = n.fail {
                visitor.visit_block(fail);
            }
        }
        Statement::While(n) => {
            visitor.visit_expression(n.test);
            visitor.visit_block(&n.body);
        }
        Statement::For(n) => {
            match n.init {
                Some(ForInit::Vars(vars)) => {
                    for var in vars.iter() {
                        if let Some(init) = var.init {
                            visitor.visit_expression(init);
                        }
                    }
                }
                Some(ForInit::Expression(init)) => visitor.visit_expression(init),
                None => {}
            }
            if let Some(test) = n.test {
                visitor.visit_expression(test);
            }
            if let Some(modify) = n.modify {
                visitor.visit_expression(modify);
            }
            visitor.visit_block(&n.body);
        }
        Statement::Return(n) => {
            if let Some(expression) = n.expression {
                visitor.visit_expression(expression);
            }
        }
        Statement::With(n) => {
            visitor.visit_expression(n.expression);
            visitor.visit_block(&n.body);
        }
        Statement::Switch(n) => {
            visitor.visit_expression(n.expression);
            for case in n.cases.iter() {
                if let Some(test) = case.test {
                    visitor.visit_expression(test);
                }
                visitor.visit_block(&case.body);
            }
        }
        Statement::Label(n) => visitor.visit_block(&n.body),
        Statement::Throw(n) => visitor.visit_expression(n.expression),
        Statement::Try(n) => {
            visitor.visit_block(&n.body);
            for catch in n.catches.iter() {
                if let Some(condition) = catch.condition {
                    visitor.visit_expression(condition);
                }
                visitor.visit_block(&catch.body);
            }
            if let Some(ref finally_body) = n.finally_body {
                visitor.visit_block(finally_body);
            }
        }
    }
}

pub fn walk_expression<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, expression: &Expression<'a>) {
    match expression {
        Expression::Ident(_) | Expression::This(_) | Expression::Literal(_) | Expression::Error(_) => {}
        Expression::Array(n) => {
            for element in n.elements.iter().flatten() {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(n) => walk_properties(visitor, n.properties),
        Expression::Function(function) => visitor.visit_function(*function),
        Expression::Class(n) => {
            if let Some(heritage) = n.heritage {
                visitor.visit_expression(heritage);
            }
            visitor.visit_function(n.constructor);
            walk_properties(visitor, n.elements);
        }
        Expression::Access(n) => visitor.visit_expression(n.base),
        Expression::Index(n) => {
            visitor.visit_expression(n.base);
            visitor.visit_expression(n.index);
        }
        Expression::Call(n) => {
            visitor.visit_expression(n.function);
            for arg in n.args.iter() {
                visitor.visit_expression(arg);
            }
        }
        Expression::Unary(n) => visitor.visit_expression(n.expression),
        Expression::Binary(n) => {
            visitor.visit_expression(n.lhs);
            visitor.visit_expression(n.rhs);
        }
        Expression::Ternary(n) => {
            visitor.visit_expression(n.test);
            visitor.visit_expression(n.true_expression);
            visitor.visit_expression(n.false_expression);
        }
        Expression::Runtime(n) => {
            for arg in n.args.iter() {
                visitor.visit_expression(arg);
            }
        }
    }
}

fn walk_properties<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, properties: &[PropertyNode<'a>]) {
    for property in properties {
        if let PropertyKey::Computed { expression, .. } = property.key {
            visitor.visit_expression(expression);
        }
        if let Some(value) = property.value {
            visitor.visit_expression(value);
        }
        if let Some(getter) = property.getter {
            visitor.visit_function(getter);
        }
        if let Some(setter) = property.setter {
            visitor.visit_function(setter);
        }
    }
}

struct FunctionCollector<'a> {
    functions: Vec<&'a FunctionNode<'a>>,
}

impl<'a> AstVisitor<'a> for FunctionCollector<'a> {
    fn visit_function(&mut self, node: &'a FunctionNode<'a>) {
        self.functions.push(node);
        walk_function(self, node);
    }
}

/// Every function in the tree, `root` first, in source order.
pub fn collect_functions<'a>(root: &'a FunctionNode<'a>) -> Vec<&'a FunctionNode<'a>> {
    let mut collector = FunctionCollector { functions: Vec::new() };
    collector.visit_function(root);
    collector.functions
}

/// Find a function by its id.
pub fn find_function<'a>(root: &'a FunctionNode<'a>, id: FunctionId) -> Option<&'a FunctionNode<'a>> {
    collect_functions(root).into_iter().find(|function| function.id == id)
}

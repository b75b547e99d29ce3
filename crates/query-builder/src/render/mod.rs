//! Turns AST nodes into parameterised SQL for a given [`Dialect`].

use crate::dialect::Dialect;
use serde_json::Value;

pub mod expr;
pub mod select;

pub trait Render {
    fn render(&self, r: &mut Renderer);
}

pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Binds `val` and writes its placeholder.
    pub fn add_param(&mut self, val: Value) {
        let placeholder = self.placeholder(val);
        self.sql.push_str(&placeholder);
    }

    /// Binds `val` and returns its placeholder without writing it.
    pub fn placeholder(&mut self, val: Value) -> String {
        let placeholder = self.dialect.get_placeholder(self.params.len());
        self.params.push(val);
        placeholder
    }

    /// Renders `node` into a detached buffer that shares this renderer's
    /// parameter list, returning the produced SQL.
    pub fn render_detached(&mut self, node: &dyn Render) -> String {
        let outer = std::mem::take(&mut self.sql);
        node.render(self);
        std::mem::replace(&mut self.sql, outer)
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Renders a single node from scratch.
pub fn render_with(node: &dyn Render, dialect: &dyn Dialect) -> (String, Vec<Value>) {
    let mut renderer = Renderer::new(dialect);
    node.render(&mut renderer);
    renderer.finish()
}

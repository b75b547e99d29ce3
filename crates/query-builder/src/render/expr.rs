use crate::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident, Logical, LogicalOperator},
    render::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::BinaryOp(op) => op.render(r),
            Expr::Logical(group) => group.render(r),
            Expr::Not(inner) => {
                r.sql.push_str("NOT ");
                // Keep the operand grouped so `NOT` never binds to half of it.
                let grouped = matches!(**inner, Expr::BinaryOp(_) | Expr::Logical(_));
                if !grouped {
                    r.sql.push('(');
                }
                inner.render(r);
                if !grouped {
                    r.sql.push(')');
                }
            }
            Expr::InList { expr, list } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(" IN (");
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    r.add_param(item.clone());
                }
                r.sql.push_str("))");
            }
            Expr::InSubquery { expr, subquery } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(" IN (");
                subquery.render(r);
                r.sql.push_str("))");
            }
            Expr::Subquery(select) => {
                r.sql.push('(');
                select.render(r);
                r.sql.push(')');
            }
            Expr::Contains { expr, value } => {
                let target = r.render_detached(expr.as_ref());
                let placeholder = r.placeholder(value.clone());
                let sql = r.dialect.render_contains(&target, &placeholder);
                r.sql.push_str(&sql);
            }
            Expr::FunctionCall(func) => func.render(r),
            Expr::Wildcard => r.sql.push('*'),
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::Like => " LIKE ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for Logical {
    fn render(&self, r: &mut Renderer) {
        if self.operands.is_empty() {
            // Identity element of the connective.
            r.sql.push_str(match self.op {
                LogicalOperator::And => "TRUE",
                LogicalOperator::Or => "FALSE",
            });
            return;
        }

        let sep = match self.op {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };

        r.sql.push('(');
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(sep);
            }
            operand.render(r);
        }
        r.sql.push(')');
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            arg.render(r);
        }
        r.sql.push(')');
    }
}

use std::fmt::Write;

use super::Expression;

/// Renders an expression as a single-line s-expression.
///
/// Used for trace logging and test fixtures; the output is not parsed back.
pub fn print_expression(expr: &Expression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expr);
    out
}

fn write_expression(out: &mut String, expr: &Expression) {
    match expr {
        Expression::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Expression::String(s) => {
            let _ = write!(out, "{:?}", s.as_ref());
        }
        Expression::Symbol(name) => out.push_str(name),
        Expression::Container(c) => {
            let _ = write!(out, "<container {}>", c.type_name());
        }
        Expression::Function(func) => {
            let _ = write!(out, "<native {}>", func.name());
        }
        Expression::Quote(value) => {
            let _ = write!(out, "'{}", value);
        }
        Expression::If {
            test,
            then,
            otherwise,
        } => {
            out.push_str("(if ");
            write_expression(out, test);
            out.push(' ');
            write_expression(out, then);
            out.push(' ');
            write_expression(out, otherwise);
            out.push(')');
        }
        Expression::Begin(body) => {
            out.push_str("(begin");
            for expr in body {
                out.push(' ');
                write_expression(out, expr);
            }
            out.push(')');
        }
        Expression::Fun { params, body } => {
            out.push_str("(lambda (");
            out.push_str(&params.iter().map(|p| p.as_ref()).collect::<Vec<_>>().join(" "));
            out.push_str(") ");
            write_expression(out, body);
            out.push(')');
        }
        Expression::Apply { callee, args } => {
            out.push('(');
            write_expression(out, callee);
            for arg in args {
                out.push(' ');
                write_expression(out, arg);
            }
            out.push(')');
        }
    }
}

// ABOUTME: Post-order AST rewriting used by macro expansion and unquote

use crate::ast::{BlockStatement, Expression, Program, Statement};

/// The rewrite callback. It sees every expression after that expression's
/// children have already been rebuilt, and its output replaces the node.
/// Errors abort the walk and surface to the caller.
pub type Modifier<'a, E> = dyn FnMut(Expression) -> Result<Expression, E> + 'a;

pub fn modify_program<E>(program: Program, modifier: &mut Modifier<E>) -> Result<Program, E> {
    let statements = program
        .statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect::<Result<Vec<_>, E>>()?;
    Ok(Program { statements })
}

pub fn modify_statement<E>(statement: Statement, modifier: &mut Modifier<E>) -> Result<Statement, E> {
    match statement {
        Statement::Let { token, name, value } => Ok(Statement::Let {
            token,
            name,
            value: modify_expression(value, modifier)?,
        }),
        Statement::Return { token, value } => Ok(Statement::Return {
            token,
            value: modify_expression(value, modifier)?,
        }),
        Statement::Expression { token, expression } => Ok(Statement::Expression {
            token,
            expression: modify_expression(expression, modifier)?,
        }),
    }
}

fn modify_block<E>(block: BlockStatement, modifier: &mut Modifier<E>) -> Result<BlockStatement, E> {
    let statements = block
        .statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect::<Result<Vec<_>, E>>()?;
    Ok(BlockStatement {
        token: block.token,
        statements,
    })
}

/// Rebuilds compound nodes from rewritten children, then submits the result
/// to the modifier. Leaves, call expressions, and macro literals pass
/// through with their children untouched; the modifier still sees them.
pub fn modify_expression<E>(
    expression: Expression,
    modifier: &mut Modifier<E>,
) -> Result<Expression, E> {
    let rebuilt = match expression {
        Expression::Infix {
            token,
            left,
            operator,
            right,
        } => Expression::Infix {
            token,
            left: Box::new(modify_expression(*left, modifier)?),
            operator,
            right: Box::new(modify_expression(*right, modifier)?),
        },
        Expression::Prefix {
            token,
            operator,
            right,
        } => Expression::Prefix {
            token,
            operator,
            right: Box::new(modify_expression(*right, modifier)?),
        },
        Expression::Index { token, left, index } => Expression::Index {
            token,
            left: Box::new(modify_expression(*left, modifier)?),
            index: Box::new(modify_expression(*index, modifier)?),
        },
        Expression::If {
            token,
            condition,
            consequence,
            alternative,
        } => Expression::If {
            token,
            condition: Box::new(modify_expression(*condition, modifier)?),
            consequence: modify_block(consequence, modifier)?,
            alternative: alternative
                .map(|alternative| modify_block(alternative, modifier))
                .transpose()?,
        },
        Expression::Function {
            token,
            parameters,
            body,
        } => Expression::Function {
            token,
            parameters,
            body: modify_block(body, modifier)?,
        },
        Expression::Array { token, elements } => Expression::Array {
            token,
            elements: elements
                .into_iter()
                .map(|element| modify_expression(element, modifier))
                .collect::<Result<Vec<_>, E>>()?,
        },
        Expression::Hash { token, pairs } => Expression::Hash {
            token,
            pairs: pairs
                .into_iter()
                .map(|(key, value)| {
                    Ok((
                        modify_expression(key, modifier)?,
                        modify_expression(value, modifier)?,
                    ))
                })
                .collect::<Result<Vec<_>, E>>()?,
        },
        other => other,
    };
    modifier(rebuilt)
}

//!
//! Preparation of resolved method trees into executable nodes.
//!
//! Besides interning names, this allocates the state of every specializing site,
//! checks variable addresses against their scopes and decides which blocks need
//! to capture their enclosing activation.
//!

use std::rc::Rc;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use num_bigint::BigInt;
use som_core::ast;

use crate::class::ClassId;
use crate::dispatch::CallSiteId;
use crate::method::MethodEnv;
use crate::nodes::{
    BlockBody, Body, ControlKind, ControlSend, Expression, FieldAccess, Literal, Message,
    SuperMessage,
};
use crate::universe::Universe;

/// The maximum number of parameters a block can have.
pub const MAX_BLOCK_PARAMETERS: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Scope {
    nb_params: usize,
    nb_locals: usize,
}

struct MethodCompiler<'a> {
    universe: &'a mut Universe,
    holder: ClassId,
    signature: &'a str,
    nb_fields: usize,
    scopes: Vec<Scope>,
    call_sites: Vec<CallSiteId>,
}

/// Prepare the body of a method, to be installed in `holder`.
pub fn compile_method(
    universe: &mut Universe,
    holder: ClassId,
    defn: &ast::MethodDef,
) -> Result<MethodEnv> {
    let (locals, body) = match &defn.body {
        ast::MethodBody::Body { locals, body } => (locals, body),
        ast::MethodBody::Primitive => {
            bail!("'{}' is a primitive, it has no body to compile", defn.signature)
        }
    };

    let expected_params = arity(&defn.signature);
    if defn.parameters.len() != expected_params {
        bail!(
            "'{}' expects {} parameters, but {} are declared",
            defn.signature,
            expected_params,
            defn.parameters.len(),
        );
    }

    let nb_fields = universe.class(holder).nb_fields();
    let mut compiler = MethodCompiler {
        universe,
        holder,
        signature: defn.signature.as_str(),
        nb_fields,
        scopes: vec![Scope {
            nb_params: defn.parameters.len(),
            nb_locals: locals.len(),
        }],
        call_sites: Vec::new(),
    };

    let body = compiler
        .compile_body(body)
        .with_context(|| format!("could not compile method '{}'", defn.signature))?;

    Ok(MethodEnv {
        nb_params: defn.parameters.len(),
        nb_locals: locals.len(),
        body,
        call_sites: compiler.call_sites,
    })
}

/// The number of arguments a selector takes.
pub fn arity(signature: &str) -> usize {
    if signature.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        0
    } else if signature.ends_with(':') {
        signature.chars().filter(|ch| *ch == ':').count()
    } else {
        1
    }
}

impl MethodCompiler<'_> {
    fn compile_body(&mut self, body: &ast::Body) -> Result<Body> {
        let exprs = body
            .exprs
            .iter()
            .map(|expr| self.compile_expr(expr))
            .collect::<Result<Vec<_>>>()?;
        Ok(Body { exprs })
    }

    fn compile_expr(&mut self, expr: &ast::Expression) -> Result<Expression> {
        let expr = match expr {
            ast::Expression::SelfRef => Expression::SelfRef,
            ast::Expression::Reference(variable) => {
                self.check_variable(variable)?;
                match variable {
                    ast::Variable::Field(index) => Expression::FieldRead(self.field_access(*index)),
                    _ => Expression::Read(*variable),
                }
            }
            ast::Expression::Assignment(variable, expr) => {
                self.check_variable(variable)?;
                let expr = Box::new(self.compile_expr(expr)?);
                match variable {
                    ast::Variable::Field(index) => {
                        Expression::FieldWrite(self.field_access(*index), expr)
                    }
                    _ => Expression::Write(*variable, expr),
                }
            }
            ast::Expression::Global(name) => {
                Expression::Global(self.universe.intern_symbol(name))
            }
            ast::Expression::Message(message) => self.compile_message(message)?,
            ast::Expression::SuperMessage(message) => self.compile_super_message(message)?,
            ast::Expression::Exit(expr, span) => {
                Expression::Exit(Box::new(self.compile_expr(expr)?), *span)
            }
            ast::Expression::Literal(literal) => Expression::Literal(self.compile_literal(literal)?),
            ast::Expression::Block(block) => self.compile_block(block)?,
        };
        Ok(expr)
    }

    fn compile_message(&mut self, message: &ast::Message) -> Result<Expression> {
        let expected = arity(&message.signature);
        if message.values.len() != expected {
            bail!(
                "message #{} sent with {} arguments, expected {}",
                message.signature,
                message.values.len(),
                expected,
            );
        }

        let receiver = Box::new(self.compile_expr(&message.receiver)?);
        let values = message
            .values
            .iter()
            .map(|value| self.compile_expr(value))
            .collect::<Result<Vec<_>>>()?;
        let selector = self.universe.intern_symbol(&message.signature);
        let site = self.new_call_site();
        let message_node = Message {
            receiver,
            selector,
            values,
            site,
        };

        let control = self
            .universe
            .config
            .specialize_control_flow
            .then(|| ControlKind::from_signature(&message.signature))
            .flatten();
        match control {
            Some(kind) => Ok(Expression::Control(ControlSend {
                kind,
                message: message_node,
                site: self.universe.sites.new_control_site(),
            })),
            None => Ok(Expression::Message(message_node)),
        }
    }

    fn compile_super_message(&mut self, message: &ast::SuperMessage) -> Result<Expression> {
        let lookup_class = self.universe.class(self.holder).super_class().ok_or_else(|| {
            anyhow!(
                "'{}' sends #{} to super, but '{}' has no superclass",
                self.signature,
                message.signature,
                self.universe.class(self.holder).name(),
            )
        })?;
        let values = message
            .values
            .iter()
            .map(|value| self.compile_expr(value))
            .collect::<Result<Vec<_>>>()?;
        let selector = self.universe.intern_symbol(&message.signature);
        let site = self.new_call_site();
        Ok(Expression::SuperMessage(SuperMessage {
            selector,
            values,
            lookup_class,
            site,
        }))
    }

    fn compile_block(&mut self, block: &ast::Block) -> Result<Expression> {
        if block.parameters.len() > MAX_BLOCK_PARAMETERS {
            bail!(
                "blocks can have at most {} parameters, found one with {}",
                MAX_BLOCK_PARAMETERS,
                block.parameters.len(),
            );
        }
        self.scopes.push(Scope {
            nb_params: block.parameters.len(),
            nb_locals: block.locals.len(),
        });
        let body = self.compile_body(&block.body);
        self.scopes.pop();

        Ok(Expression::Block(Rc::new(BlockBody {
            nb_params: block.parameters.len(),
            nb_locals: block.locals.len(),
            body: body?,
            captures: body_reaches_out(&block.body, 0),
        })))
    }

    fn compile_literal(&mut self, literal: &ast::Literal) -> Result<Literal> {
        let literal = match literal {
            ast::Literal::Symbol(sym) => Literal::Symbol(self.universe.intern_symbol(sym)),
            ast::Literal::String(string) => Literal::String(Rc::new(string.clone())),
            ast::Literal::Double(double) => Literal::Double(*double),
            ast::Literal::Integer(int) => Literal::Integer(*int),
            ast::Literal::BigInteger(int) => Literal::BigInteger(
                BigInt::from_str(int)
                    .with_context(|| format!("invalid big integer literal '{}'", int))?,
            ),
            ast::Literal::Array(items) => Literal::Array(
                items
                    .iter()
                    .map(|item| self.compile_literal(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(literal)
    }

    fn check_variable(&self, variable: &ast::Variable) -> Result<()> {
        let (up_idx, idx, is_argument) = match *variable {
            ast::Variable::Field(index) if index < self.nb_fields => return Ok(()),
            ast::Variable::Field(index) => bail!(
                "field #{} out of range ('{}' has {} fields)",
                index,
                self.universe.class(self.holder).name(),
                self.nb_fields,
            ),
            ast::Variable::Argument { up_idx, idx } => (up_idx, idx, true),
            ast::Variable::Local { up_idx, idx } => (up_idx, idx, false),
        };
        let scope = self
            .scopes
            .len()
            .checked_sub(up_idx + 1)
            .and_then(|depth| self.scopes.get(depth))
            .ok_or_else(|| anyhow!("{:?} refers past the enclosing method", variable))?;
        let available = if is_argument {
            scope.nb_params
        } else {
            scope.nb_locals
        };
        if idx >= available {
            bail!("{:?} out of range (only {} in scope)", variable, available);
        }
        Ok(())
    }

    fn field_access(&mut self, index: usize) -> FieldAccess {
        FieldAccess {
            index,
            site: self.universe.sites.new_field_site(),
        }
    }

    fn new_call_site(&mut self) -> CallSiteId {
        let site = self.universe.sites.new_call_site();
        self.call_sites.push(site);
        site
    }
}

/// Whether a block body (at `depth` blocks below the one being checked)
/// refers to anything outside of the checked block.
fn body_reaches_out(body: &ast::Body, depth: usize) -> bool {
    body.exprs.iter().any(|expr| expr_reaches_out(expr, depth))
}

fn expr_reaches_out(expr: &ast::Expression, depth: usize) -> bool {
    match expr {
        // globals may end up sending `unknownGlobal:` to `self`
        ast::Expression::SelfRef
        | ast::Expression::SuperMessage(_)
        | ast::Expression::Exit(..)
        | ast::Expression::Global(_) => true,
        ast::Expression::Reference(variable) => variable_reaches_out(variable, depth),
        ast::Expression::Assignment(variable, expr) => {
            variable_reaches_out(variable, depth) || expr_reaches_out(expr, depth)
        }
        ast::Expression::Message(message) => {
            expr_reaches_out(&message.receiver, depth)
                || message.values.iter().any(|value| expr_reaches_out(value, depth))
        }
        ast::Expression::Block(block) => body_reaches_out(&block.body, depth + 1),
        ast::Expression::Literal(_) => false,
    }
}

fn variable_reaches_out(variable: &ast::Variable, depth: usize) -> bool {
    match *variable {
        ast::Variable::Field(_) => true,
        ast::Variable::Argument { up_idx, .. } | ast::Variable::Local { up_idx, .. } => {
            up_idx > depth
        }
    }
}

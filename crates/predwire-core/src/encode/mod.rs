//! Module: encode
//! Responsibility: host expression tree -> wire node tree.
//! Does not own: document layout (see `codec`).
//!
//! The encoder accepts only the closed wire grammar. Anything else fails
//! with `UnsupportedExpressionShape` rather than being approximated.


use crate::{
    codec::{self, Document},
    config::PredicateConfig,
    error::PredicateError,
    expr::{
        BinaryOp, CallExpr, CallTarget, Expr, LambdaExpr, MemberExpr, ParamId, UnaryOp,
        evaluate_closed,
    },
    node::{
        BinaryNode, BinaryOperator, ConstantNode, LambdaNode, MemberNode, MethodCallNode,
        ParameterNode, PredicateNode, UnaryNode,
    },
    obs::sink::{MetricsEvent, record},
};
use tracing::{debug, warn};

/// Encode a root predicate lambda.
pub fn encode(lambda: &LambdaExpr) -> Result<LambdaNode, PredicateError> {
    encode_with_config(lambda, &PredicateConfig::default())
}

pub fn encode_with_config(
    lambda: &LambdaExpr,
    config: &PredicateConfig,
) -> Result<LambdaNode, PredicateError> {
    let result = Encoder::new(config).root(lambda);

    match &result {
        Ok(node) => {
            let nodes = node.node_count();
            record(MetricsEvent::EncodeFinish {
                nodes: u64::try_from(nodes).unwrap_or(u64::MAX),
            });
            debug!(nodes, parameters = node.parameters.len(), "predicate encoded");
        }
        Err(err) => {
            record(MetricsEvent::EncodeRejected { kind: err.kind() });
            warn!(kind = err.kind().as_str(), error = %err, "predicate encode rejected");
        }
    }

    result
}

/// Encode straight to the transport-agnostic document.
pub fn encode_to_document(lambda: &LambdaExpr) -> Result<Document, PredicateError> {
    encode(lambda).map(|node| codec::write_lambda(&node))
}

///
/// Encoder
///

struct Encoder<'c> {
    config: &'c PredicateConfig,
    /// Declared parameters of every enclosing lambda, innermost last.
    scopes: Vec<Vec<(ParamId, ParameterNode)>>,
    nodes: usize,
}

impl<'c> Encoder<'c> {
    const fn new(config: &'c PredicateConfig) -> Self {
        Self {
            config,
            scopes: Vec::new(),
            nodes: 0,
        }
    }

    fn root(&mut self, lambda: &LambdaExpr) -> Result<LambdaNode, PredicateError> {
        let mut node = self.lambda(lambda, 1)?;
        node.subject = lambda.params.first().map(|param| param.ty.clone());

        Ok(node)
    }

    fn lambda(&mut self, lambda: &LambdaExpr, depth: usize) -> Result<LambdaNode, PredicateError> {
        self.enter(depth)?;

        let mut declared: Vec<(ParamId, ParameterNode)> = Vec::with_capacity(lambda.params.len());
        for param in &lambda.params {
            let node = ParameterNode::new(param.name.clone(), param.ty.clone());

            // the wire identifies parameters by (name, type) only
            let clash = declared
                .iter()
                .chain(self.scopes.iter().flatten())
                .any(|(id, other)| *other == node && *id != param.id);
            if clash {
                return Err(PredicateError::unsupported(format!(
                    "parameter '{}: {}' is declared twice with distinct identities",
                    param.name, param.ty
                )));
            }

            self.count()?;
            declared.push((param.id, node));
        }

        let parameters = declared.iter().map(|(_, node)| node.clone()).collect();
        self.scopes.push(declared);
        let body = self.expr(&lambda.body, depth + 1);
        self.scopes.pop();

        Ok(LambdaNode {
            parameters,
            body: Box::new(body?),
            subject: None,
        })
    }

    fn expr(&mut self, expr: &Expr, depth: usize) -> Result<PredicateNode, PredicateError> {
        match expr {
            Expr::Lambda(lambda) => Ok(PredicateNode::Lambda(self.lambda(lambda, depth)?)),
            Expr::Binary(binary) => {
                self.enter(depth)?;
                let operator = wire_operator(binary.op).ok_or_else(|| {
                    PredicateError::unsupported(format!(
                        "binary operator '{}' has no wire form",
                        binary.op.symbol()
                    ))
                })?;

                Ok(PredicateNode::Binary(BinaryNode {
                    operator,
                    left: Box::new(self.expr(&binary.left, depth + 1)?),
                    right: Box::new(self.expr(&binary.right, depth + 1)?),
                }))
            }
            Expr::Unary(unary) => {
                self.enter(depth)?;
                if unary.op != UnaryOp::Not {
                    return Err(PredicateError::unsupported(format!(
                        "unary operator '{}' has no wire form",
                        unary.op.symbol()
                    )));
                }

                Ok(PredicateNode::Unary(UnaryNode {
                    operand: Box::new(self.expr(&unary.operand, depth + 1)?),
                }))
            }
            Expr::Member(member) => self.member(expr, member, depth),
            Expr::Call(call) => self.call(call, depth),
            Expr::Constant(constant) => {
                self.enter(depth)?;
                let node = ConstantNode::try_new(constant.ty.clone(), constant.value.clone())
                    .ok_or_else(|| {
                        PredicateError::unsupported(format!(
                            "{} constant of type '{}' is not portable",
                            constant.value.kind_label(),
                            constant.ty
                        ))
                    })?;

                Ok(PredicateNode::Constant(node))
            }
            Expr::Parameter(param) => {
                self.enter(depth)?;
                let declared = self
                    .scopes
                    .iter()
                    .flatten()
                    .find(|(id, _)| *id == param.id)
                    .map(|(_, node)| node.clone())
                    .ok_or_else(|| {
                        PredicateError::unsupported(format!(
                            "parameter '{}' is not declared by an enclosing lambda",
                            param.name
                        ))
                    })?;

                Ok(PredicateNode::Parameter(declared))
            }
            Expr::Conditional(_) => Err(PredicateError::unsupported(
                "conditional expressions have no wire form",
            )),
        }
    }

    /// Member access, or a single constant when the chain is closed over.
    fn member(
        &mut self,
        expr: &Expr,
        member: &MemberExpr,
        depth: usize,
    ) -> Result<PredicateNode, PredicateError> {
        if references_parameter(&member.target) {
            self.enter(depth)?;
            let target = self.expr(&member.target, depth + 1)?;

            return Ok(PredicateNode::Member(MemberNode {
                target: Box::new(target),
                member: member.member.name.clone(),
            }));
        }

        self.enter(depth)?;
        let value = evaluate_closed(expr).map_err(|err| {
            PredicateError::unsupported(format!(
                "captured member '{}' could not be evaluated: {err}",
                member.member.name
            ))
        })?;
        let node = ConstantNode::try_new(member.member.ty.clone(), value).ok_or_else(|| {
            PredicateError::unsupported(format!(
                "captured member '{}' of type '{}' is not portable",
                member.member.name, member.member.ty
            ))
        })?;

        record(MetricsEvent::ConstantCollapsed);
        debug!(member = %member.member.name, ty = %member.member.ty, "captured member chain collapsed");

        Ok(PredicateNode::Constant(node))
    }

    fn call(&mut self, call: &CallExpr, depth: usize) -> Result<PredicateNode, PredicateError> {
        self.enter(depth)?;
        let method = call.target.name();

        let (receiver, rest) = match (&call.receiver, call.target) {
            (Some(receiver), CallTarget::Instance(_)) => {
                let node = self.member_access(receiver, depth + 1).ok_or_else(|| {
                    PredicateError::unsupported(format!(
                        "receiver of '{method}' must be a member access on a parameter"
                    ))
                })??;

                (Some(node), call.args.as_slice())
            }
            (None, CallTarget::Sequence(_)) => {
                let Some((source, rest)) = call.args.split_first() else {
                    return Err(PredicateError::unsupported(format!(
                        "'{method}' has no source sequence"
                    )));
                };
                let node = self.member_access(source, depth + 1).ok_or_else(|| {
                    PredicateError::unsupported(format!(
                        "source sequence of '{method}' must be a member access on a parameter"
                    ))
                })??;

                let mut arguments = Vec::with_capacity(call.args.len());
                arguments.push(PredicateNode::Member(node));
                for arg in rest {
                    arguments.push(self.expr(arg, depth + 1)?);
                }

                return Ok(PredicateNode::MethodCall(MethodCallNode {
                    receiver: None,
                    method: method.to_string(),
                    arguments,
                }));
            }
            _ => {
                return Err(PredicateError::unsupported(format!(
                    "call shape of '{method}' has no wire form"
                )));
            }
        };

        let arguments = rest
            .iter()
            .map(|arg| self.expr(arg, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PredicateNode::MethodCall(MethodCallNode {
            receiver,
            method: method.to_string(),
            arguments,
        }))
    }

    /// `None` when `expr` is not a parameter-rooted member access.
    fn member_access(
        &mut self,
        expr: &Expr,
        depth: usize,
    ) -> Option<Result<MemberNode, PredicateError>> {
        let Expr::Member(member) = expr else {
            return None;
        };
        if !references_parameter(&member.target) {
            return None;
        }

        Some(match self.member(expr, member, depth) {
            Ok(PredicateNode::Member(node)) => Ok(node),
            Ok(_) => Err(PredicateError::unsupported(format!(
                "member '{}' did not encode as a member access",
                member.member.name
            ))),
            Err(err) => Err(err),
        })
    }

    fn enter(&mut self, depth: usize) -> Result<(), PredicateError> {
        if depth > self.config.max_depth {
            return Err(PredicateError::unsupported(format!(
                "expression nests deeper than {} levels",
                self.config.max_depth
            )));
        }

        self.count()
    }

    fn count(&mut self) -> Result<(), PredicateError> {
        self.nodes += 1;
        if self.nodes > self.config.max_nodes {
            return Err(PredicateError::unsupported(format!(
                "expression exceeds {} nodes",
                self.config.max_nodes
            )));
        }

        Ok(())
    }
}

const fn wire_operator(op: BinaryOp) -> Option<BinaryOperator> {
    let operator = match op {
        BinaryOp::Equal => BinaryOperator::Equal,
        BinaryOp::NotEqual => BinaryOperator::NotEqual,
        BinaryOp::LessThan => BinaryOperator::LessThan,
        BinaryOp::LessThanOrEqual => BinaryOperator::LessThanOrEqual,
        BinaryOp::GreaterThan => BinaryOperator::GreaterThan,
        BinaryOp::GreaterThanOrEqual => BinaryOperator::GreaterThanOrEqual,
        BinaryOp::AndAlso => BinaryOperator::AndAlso,
        BinaryOp::OrElse => BinaryOperator::OrElse,
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => return None,
    };

    Some(operator)
}

/// True when any parameter occurs in `expr`.
fn references_parameter(expr: &Expr) -> bool {
    match expr {
        Expr::Parameter(_) => true,
        Expr::Constant(_) => false,
        Expr::Lambda(lambda) => references_parameter(&lambda.body),
        Expr::Binary(binary) => {
            references_parameter(&binary.left) || references_parameter(&binary.right)
        }
        Expr::Unary(unary) => references_parameter(&unary.operand),
        Expr::Member(member) => references_parameter(&member.target),
        Expr::Call(call) => {
            call.receiver.as_deref().is_some_and(references_parameter)
                || call.args.iter().any(references_parameter)
        }
        Expr::Conditional(cond) => {
            references_parameter(&cond.test)
                || references_parameter(&cond.if_true)
                || references_parameter(&cond.if_false)
        }
    }
}

//! Module: decode
//! Responsibility: wire node tree -> type-checked host expression tree.
//! Does not own: document parsing (see `codec`) or evaluation (see `expr`).
//!
//! Every type, member, and method name on the wire is resolved through a
//! `TypeDirectory`. Nothing outside the directory's allow-list can be
//! reached from a document.

mod registry;

#[cfg(test)]
mod tests;

use crate::{
    codec::{self, Document, child_path},
    config::PredicateConfig,
    directory::TypeDirectory,
    error::PredicateError,
    expr::{BinaryOp, Expr, ExprBuilder, ExprError, LambdaExpr, ParameterExpr},
    node::{
        BinaryOperator, LambdaNode, MemberNode, MethodCallNode, ParameterNode, PredicateNode,
    },
    obs::sink::{MetricsEvent, record},
    value::TypeTag,
};
use tracing::{debug, warn};

// re-exports
pub use registry::ParameterRegistry;

/// Decode a root predicate lambda against `directory`.
pub fn decode(
    node: &LambdaNode,
    directory: &dyn TypeDirectory,
) -> Result<LambdaExpr, PredicateError> {
    decode_with_config(node, directory, &PredicateConfig::default())
}

pub fn decode_with_config(
    node: &LambdaNode,
    directory: &dyn TypeDirectory,
    config: &PredicateConfig,
) -> Result<LambdaExpr, PredicateError> {
    let mut decoder = Decoder::new(directory, config);
    let result = decoder.root(node);

    finish(result, &decoder)
}

/// Read a document and decode it in one step.
pub fn decode_document(
    doc: &Document,
    directory: &dyn TypeDirectory,
) -> Result<LambdaExpr, PredicateError> {
    decode_document_with_config(doc, directory, &PredicateConfig::default())
}

pub fn decode_document_with_config(
    doc: &Document,
    directory: &dyn TypeDirectory,
    config: &PredicateConfig,
) -> Result<LambdaExpr, PredicateError> {
    match codec::read_lambda_with_config(doc, config) {
        Ok(node) => decode_with_config(&node, directory, config),
        Err(err) => {
            record(MetricsEvent::DecodeRejected { kind: err.kind() });
            warn!(kind = err.kind().as_str(), error = %err, "predicate document rejected");

            Err(err)
        }
    }
}

fn finish(
    result: Result<LambdaExpr, PredicateError>,
    decoder: &Decoder<'_>,
) -> Result<LambdaExpr, PredicateError> {
    match &result {
        Ok(_) => {
            record(MetricsEvent::DecodeFinish {
                nodes: u64::try_from(decoder.nodes).unwrap_or(u64::MAX),
                parameters: u64::try_from(decoder.registry.len()).unwrap_or(u64::MAX),
            });
            debug!(
                nodes = decoder.nodes,
                parameters = decoder.registry.len(),
                "predicate decoded"
            );
        }
        Err(err) => {
            record(MetricsEvent::DecodeRejected { kind: err.kind() });
            warn!(kind = err.kind().as_str(), error = %err, "predicate decode rejected");
        }
    }

    result
}

///
/// Decoder
///
/// Recursive descent over one root lambda. Owns the registry for that
/// decode and the stack of lambda scopes currently open.
///

struct Decoder<'a> {
    builder: ExprBuilder<'a>,
    config: &'a PredicateConfig,
    registry: ParameterRegistry,
    scopes: Vec<Vec<ParameterExpr>>,
    nodes: usize,
}

impl<'a> Decoder<'a> {
    fn new(directory: &'a dyn TypeDirectory, config: &'a PredicateConfig) -> Self {
        Self {
            builder: ExprBuilder::new(directory),
            config,
            registry: ParameterRegistry::new(),
            scopes: Vec::new(),
            nodes: 0,
        }
    }

    fn root(&mut self, node: &LambdaNode) -> Result<LambdaExpr, PredicateError> {
        let lambda = self.lambda(node, "$", 1)?;
        if !lambda.ty().is_bool() {
            return Err(PredicateError::type_resolution(format!(
                "predicate body must be Bool, found '{}'",
                lambda.ty()
            )));
        }

        Ok(lambda)
    }

    fn lambda(
        &mut self,
        node: &LambdaNode,
        path: &str,
        depth: usize,
    ) -> Result<LambdaExpr, PredicateError> {
        self.enter(path, depth)?;

        let params_path = child_path(path, codec::FIELD_PARAMETERS);
        let mut declared: Vec<ParameterExpr> = Vec::with_capacity(node.parameters.len());
        for (i, param) in node.parameters.iter().enumerate() {
            let item_path = format!("{params_path}[{i}]");
            self.count(&item_path)?;

            let ty = self.resolve_type(&param.ty)?;
            let shadowed = declared
                .iter()
                .chain(self.scopes.iter().flatten())
                .any(|other| other.name == param.name && other.ty == ty);
            if shadowed {
                return Err(PredicateError::malformed(
                    item_path,
                    format!("parameter '{}: {}' is declared twice", param.name, param.ty),
                ));
            }

            declared.push(self.registry.resolve(&param.name, &ty));
        }

        if let Some(subject) = &node.subject {
            let subject = self.resolve_type(subject)?;
            if declared.first().map(|param| &param.ty) != Some(&subject) {
                return Err(PredicateError::type_resolution(format!(
                    "subject '{subject}' does not match the first parameter"
                )));
            }
        }

        self.scopes.push(declared.clone());
        let body = self.node(&node.body, &child_path(path, codec::FIELD_BODY), depth + 1);
        self.scopes.pop();

        self.builder
            .lambda(declared, body?)
            .map_err(|err| expr_failure(path, err))
    }

    /// Any node except a lambda.
    fn node(
        &mut self,
        node: &PredicateNode,
        path: &str,
        depth: usize,
    ) -> Result<Expr, PredicateError> {
        match node {
            PredicateNode::Lambda(_) => Err(PredicateError::malformed(
                path,
                "a lambda is only valid as a sequence operation argument",
            )),
            PredicateNode::Binary(binary) => {
                self.enter(path, depth)?;
                let left = self.node(
                    &binary.left,
                    &child_path(path, codec::FIELD_LEFT),
                    depth + 1,
                )?;
                let right = self.node(
                    &binary.right,
                    &child_path(path, codec::FIELD_RIGHT),
                    depth + 1,
                )?;

                self.builder
                    .binary(host_operator(binary.operator), left, right)
                    .map_err(|err| expr_failure(path, err))
            }
            PredicateNode::Unary(unary) => {
                self.enter(path, depth)?;
                let operand = self.node(
                    &unary.operand,
                    &child_path(path, codec::FIELD_OPERAND),
                    depth + 1,
                )?;

                self.builder
                    .not(operand)
                    .map_err(|err| expr_failure(path, err))
            }
            PredicateNode::Member(member) => self.member(member, path, depth),
            PredicateNode::MethodCall(call) => self.call(call, path, depth),
            PredicateNode::Constant(constant) => {
                self.enter(path, depth)?;

                self.builder
                    .typed_constant(constant.ty().clone(), constant.value().clone())
                    .map_err(|err| expr_failure(path, err))
            }
            PredicateNode::Parameter(param) => {
                self.enter(path, depth)?;
                self.reference(param, path).map(Expr::Parameter)
            }
        }
    }

    fn member(
        &mut self,
        member: &MemberNode,
        path: &str,
        depth: usize,
    ) -> Result<Expr, PredicateError> {
        self.enter(path, depth)?;
        let target = self.node(
            &member.target,
            &child_path(path, codec::FIELD_TARGET),
            depth + 1,
        )?;

        self.builder
            .member(target, &member.member)
            .map_err(|err| expr_failure(path, err))
    }

    fn call(
        &mut self,
        call: &MethodCallNode,
        path: &str,
        depth: usize,
    ) -> Result<Expr, PredicateError> {
        self.enter(path, depth)?;

        let args_path = child_path(path, codec::FIELD_ARGUMENTS);
        let mut args = Vec::with_capacity(call.arguments.len());
        for (i, arg) in call.arguments.iter().enumerate() {
            let arg_path = format!("{args_path}[{i}]");
            let expr = match arg {
                PredicateNode::Lambda(lambda) => {
                    Expr::Lambda(self.lambda(lambda, &arg_path, depth + 1)?)
                }
                other => self.node(other, &arg_path, depth + 1)?,
            };
            args.push(expr);
        }

        match &call.receiver {
            None => {
                let parameterized = args.first().is_some_and(|arg| arg.ty().is_parameterized());
                if !parameterized {
                    return Err(PredicateError::unsupported(format!(
                        "call '{}' at {path} has no receiver and its first argument is not a sequence",
                        call.method
                    )));
                }

                self.builder
                    .sequence_call(&call.method, args)
                    .map_err(|err| expr_failure(path, err))
            }
            Some(receiver) => {
                let receiver =
                    self.member(receiver, &child_path(path, codec::FIELD_RECEIVER), depth + 1)?;

                self.builder
                    .call(receiver, &call.method, args)
                    .map_err(|err| expr_failure(path, err))
            }
        }
    }

    /// A parameter reference must name a declaration of an open lambda.
    fn reference(
        &mut self,
        param: &ParameterNode,
        path: &str,
    ) -> Result<ParameterExpr, PredicateError> {
        let ty = self.resolve_type(&param.ty)?;
        let declared = self
            .scopes
            .iter()
            .flatten()
            .any(|other| other.name == param.name && other.ty == ty);
        if !declared {
            return Err(PredicateError::malformed(
                path,
                format!(
                    "parameter '{}: {}' is not declared by an enclosing lambda",
                    param.name, param.ty
                ),
            ));
        }

        Ok(self.registry.resolve(&param.name, &ty))
    }

    fn resolve_type(&self, ty: &TypeTag) -> Result<TypeTag, PredicateError> {
        self.builder
            .directory()
            .resolve_type(ty)
            .ok_or_else(|| PredicateError::type_resolution(format!("unknown type '{ty}'")))
    }

    fn enter(&mut self, path: &str, depth: usize) -> Result<(), PredicateError> {
        if depth > self.config.max_depth {
            return Err(PredicateError::malformed(
                path,
                format!("nesting exceeds {} levels", self.config.max_depth),
            ));
        }

        self.count(path)
    }

    fn count(&mut self, path: &str) -> Result<(), PredicateError> {
        self.nodes += 1;
        if self.nodes > self.config.max_nodes {
            return Err(PredicateError::malformed(
                path,
                format!("predicate exceeds {} nodes", self.config.max_nodes),
            ));
        }

        Ok(())
    }
}

const fn host_operator(op: BinaryOperator) -> BinaryOp {
    match op {
        BinaryOperator::Equal => BinaryOp::Equal,
        BinaryOperator::NotEqual => BinaryOp::NotEqual,
        BinaryOperator::LessThan => BinaryOp::LessThan,
        BinaryOperator::LessThanOrEqual => BinaryOp::LessThanOrEqual,
        BinaryOperator::GreaterThan => BinaryOp::GreaterThan,
        BinaryOperator::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
        BinaryOperator::AndAlso => BinaryOp::AndAlso,
        BinaryOperator::OrElse => BinaryOp::OrElse,
    }
}

/// Map a host construction failure onto the wire error taxonomy.
fn expr_failure(path: &str, err: ExprError) -> PredicateError {
    match err {
        ExprError::UnknownMethod { .. }
        | ExprError::UnknownSequenceOp { .. }
        | ExprError::AmbiguousSequenceOp { .. } => {
            PredicateError::method_resolution(err.to_string())
        }
        ExprError::DuplicateParameter { .. } | ExprError::LambdaOperand { .. } => {
            PredicateError::malformed(path, err.to_string())
        }
        ExprError::UnknownType { .. }
        | ExprError::UnknownMember { .. }
        | ExprError::IncompatibleOperands { .. }
        | ExprError::IncompatibleOperand { .. }
        | ExprError::ConstantMismatch { .. }
        | ExprError::UninferableConstant => PredicateError::type_resolution(err.to_string()),
    }
}

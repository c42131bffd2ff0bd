use crate::{
    directory::{MemberAccess, SequenceOp, SequenceOpKind},
    expr::{
        BinaryExpr, BinaryOp, CallExpr, CallTarget, EvalError, Expr, LambdaExpr, MemberExpr,
        OpClass, ParamId, UnaryOp,
    },
    model::EntityValue,
    types::Float64,
    value::{TypeTag, Value, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// Env
///
/// Parameter bindings in scope. Inner lambdas push on top of outer ones.
///

#[derive(Debug, Default)]
pub struct Env {
    bindings: Vec<(ParamId, Value)>,
}

impl Env {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, id: ParamId, value: Value) {
        self.bindings.push((id, value));
    }

    fn unbind(&mut self) {
        self.bindings.pop();
    }

    fn lookup(&self, id: ParamId) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == id)
            .map(|(_, value)| value)
    }
}

/// Evaluate an expression that references no parameters.
pub fn evaluate_closed(expr: &Expr) -> Result<Value, EvalError> {
    evaluate(expr, &mut Env::new())
}

pub fn evaluate(expr: &Expr, env: &mut Env) -> Result<Value, EvalError> {
    match expr {
        Expr::Lambda(_) => Err(EvalError::LambdaNotValue),
        Expr::Constant(constant) => Ok(constant.value.clone()),
        Expr::Parameter(param) => {
            env.lookup(param.id)
                .cloned()
                .ok_or_else(|| EvalError::UnboundParameter {
                    id: param.id,
                    name: param.name.clone(),
                })
        }
        Expr::Member(member) => eval_member(member, env),
        Expr::Binary(binary) => eval_binary(binary, env),
        Expr::Unary(unary) => {
            let operand = evaluate(&unary.operand, env)?;
            eval_unary(unary.op, &operand)
        }
        Expr::Call(call) => eval_call(call, env),
        Expr::Conditional(cond) => {
            if eval_bool("?:", &cond.test, env)? {
                evaluate(&cond.if_true, env)
            } else {
                evaluate(&cond.if_false, env)
            }
        }
    }
}

fn eval_bool(op: &str, expr: &Expr, env: &mut Env) -> Result<bool, EvalError> {
    let value = evaluate(expr, env)?;
    value.as_bool().ok_or_else(|| EvalError::InvalidOperand {
        op: op.to_string(),
        found: value.kind_label(),
    })
}

fn eval_member(member: &MemberExpr, env: &mut Env) -> Result<Value, EvalError> {
    let target = evaluate(&member.target, env)?;

    match member.member.access {
        MemberAccess::Field => {
            let record = target.as_record().ok_or_else(|| EvalError::NotARecord {
                member: member.member.name.clone(),
                found: target.kind_label(),
            })?;

            record
                .field(&member.member.name)
                .cloned()
                .ok_or_else(|| EvalError::MissingField {
                    entity: record.entity().to_string(),
                    field: member.member.name.clone(),
                })
        }
        MemberAccess::Builtin(def) => (def.read)(&target),
    }
}

fn eval_binary(binary: &BinaryExpr, env: &mut Env) -> Result<Value, EvalError> {
    let op = binary.op;

    // short-circuit before touching the right operand
    match op {
        BinaryOp::AndAlso => {
            let result =
                eval_bool(op.symbol(), &binary.left, env)? && eval_bool(op.symbol(), &binary.right, env)?;
            return Ok(Value::Bool(result));
        }
        BinaryOp::OrElse => {
            let result =
                eval_bool(op.symbol(), &binary.left, env)? || eval_bool(op.symbol(), &binary.right, env)?;
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    let left = evaluate(&binary.left, env)?;
    let right = evaluate(&binary.right, env)?;

    match op.class() {
        OpClass::Equality => {
            let equal = left == right;
            Ok(Value::Bool(if op == BinaryOp::Equal { equal } else { !equal }))
        }
        OpClass::Ordering => {
            let ordering =
                strict_order_cmp(&left, &right).ok_or_else(|| EvalError::InvalidOperand {
                    op: op.symbol().to_string(),
                    found: left.kind_label(),
                })?;

            let result = match op {
                BinaryOp::LessThan => ordering == Ordering::Less,
                BinaryOp::LessThanOrEqual => ordering != Ordering::Greater,
                BinaryOp::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        OpClass::Arithmetic => eval_arithmetic(op, &left, &right),
        OpClass::Logical => Err(EvalError::InvalidOperand {
            op: op.symbol().to_string(),
            found: left.kind_label(),
        }),
    }
}

fn eval_arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let symbol = op.symbol();
    let overflow = || EvalError::Overflow { op: symbol };

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0 {
                return Err(EvalError::DivideByZero);
            }
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or_else(overflow)
        }
        (Value::Uint(a), Value::Uint(b)) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0 {
                return Err(EvalError::DivideByZero);
            }
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result.map(Value::Uint).ok_or_else(overflow)
        }
        (Value::Float64(a), Value::Float64(b)) => {
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b.get() == 0.0 {
                return Err(EvalError::DivideByZero);
            }
            let result = match op {
                BinaryOp::Add => a.checked(*b, |x, y| x + y),
                BinaryOp::Subtract => a.checked(*b, |x, y| x - y),
                BinaryOp::Multiply => a.checked(*b, |x, y| x * y),
                BinaryOp::Divide => a.checked(*b, |x, y| x / y),
                _ => a.checked(*b, |x, y| x % y),
            };
            result.map(Value::Float64).ok_or_else(overflow)
        }
        _ => Err(EvalError::InvalidOperand {
            op: symbol.to_string(),
            found: left.kind_label(),
        }),
    }
}

fn eval_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::Overflow { op: "-" }),
        (UnaryOp::Negate, Value::Float64(f)) => Float64::try_new(-f.get())
            .map(Value::Float64)
            .ok_or(EvalError::Overflow { op: "-" }),
        _ => Err(EvalError::InvalidOperand {
            op: op.symbol().to_string(),
            found: operand.kind_label(),
        }),
    }
}

fn eval_call(call: &CallExpr, env: &mut Env) -> Result<Value, EvalError> {
    match call.target {
        CallTarget::Instance(method) => {
            let receiver = match &call.receiver {
                Some(receiver) => evaluate(receiver, env)?,
                None => {
                    return Err(EvalError::InvalidOperand {
                        op: method.name.to_string(),
                        found: "missing",
                    });
                }
            };
            let args = call
                .args
                .iter()
                .map(|arg| evaluate(arg, env))
                .collect::<Result<Vec<_>, _>>()?;

            (method.invoke)(&receiver, &args)
        }
        CallTarget::Sequence(op) => eval_sequence(op, &call.args, env),
    }
}

fn eval_sequence(op: &SequenceOp, args: &[Expr], env: &mut Env) -> Result<Value, EvalError> {
    let invalid = |found: &'static str| EvalError::InvalidOperand {
        op: op.name.to_string(),
        found,
    };

    let source = evaluate(args.first().ok_or_else(|| invalid("missing"))?, env)?;
    let items = source.as_list().ok_or_else(|| invalid(source.kind_label()))?;
    let predicate = || {
        args.get(1)
            .and_then(Expr::as_lambda)
            .ok_or_else(|| invalid("missing"))
    };

    match op.kind {
        SequenceOpKind::AnyNonEmpty => Ok(Value::Bool(!items.is_empty())),
        SequenceOpKind::AnyMatch => {
            let predicate = predicate()?;
            for item in items {
                if apply_predicate(predicate, item, env)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        SequenceOpKind::AllMatch => {
            let predicate = predicate()?;
            for item in items {
                if !apply_predicate(predicate, item, env)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        SequenceOpKind::Count => count_value(items.len()),
        SequenceOpKind::CountMatch => {
            let predicate = predicate()?;
            let mut count = 0usize;
            for item in items {
                if apply_predicate(predicate, item, env)? {
                    count += 1;
                }
            }
            count_value(count)
        }
        SequenceOpKind::Contains => {
            let needle = evaluate(args.get(1).ok_or_else(|| invalid("missing"))?, env)?;
            Ok(Value::Bool(items.contains(&needle)))
        }
    }
}

fn count_value(count: usize) -> Result<Value, EvalError> {
    i64::try_from(count)
        .map(Value::Int)
        .map_err(|_| EvalError::Overflow { op: "Count" })
}

fn apply_predicate(lambda: &LambdaExpr, item: &Value, env: &mut Env) -> Result<bool, EvalError> {
    let param = lambda.params.first().ok_or(EvalError::PredicateArity {
        found: lambda.params.len(),
    })?;

    env.bind(param.id, item.clone());
    let result = eval_bool("predicate", &lambda.body, env);
    env.unbind();

    result
}

///
/// CompiledPredicate
///
/// Single-parameter Bool lambda ready to run against subjects.
///

#[derive(Clone, Debug)]
pub struct CompiledPredicate {
    lambda: LambdaExpr,
}

impl CompiledPredicate {
    pub fn compile(lambda: LambdaExpr) -> Result<Self, EvalError> {
        if lambda.params.len() != 1 {
            return Err(EvalError::PredicateArity {
                found: lambda.params.len(),
            });
        }
        if !lambda.ty().is_bool() {
            return Err(EvalError::PredicateNotBoolean {
                found: lambda.ty().clone(),
            });
        }

        Ok(Self { lambda })
    }

    #[must_use]
    pub const fn lambda(&self) -> &LambdaExpr {
        &self.lambda
    }

    #[must_use]
    pub fn subject_type(&self) -> Option<&TypeTag> {
        self.lambda.params.first().map(|param| &param.ty)
    }

    pub fn evaluate(&self, subject: &Value) -> Result<bool, EvalError> {
        if let Some(expected) = self.subject_type()
            && !subject.conforms_to(expected)
        {
            return Err(EvalError::SubjectMismatch {
                expected: expected.clone(),
                found: subject.kind_label(),
            });
        }

        apply_predicate(&self.lambda, subject, &mut Env::new())
    }

    pub fn matches<E: EntityValue>(&self, entity: &E) -> Result<bool, EvalError> {
        self.evaluate(&entity.to_value())
    }

    /// Subjects for which the predicate holds, in input order.
    pub fn filter<'e, E: EntityValue>(&self, items: &'e [E]) -> Result<Vec<&'e E>, EvalError> {
        let mut kept = Vec::new();
        for item in items {
            if self.matches(item)? {
                kept.push(item);
            }
        }

        Ok(kept)
    }
}

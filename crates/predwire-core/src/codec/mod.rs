//! Module: codec
//! Responsibility: tagged, self-describing mapping between `PredicateNode`
//! trees and `Document` records.
//! Does not own: type/member/method resolution (see `decode`).
//!
//! Every node is written as a record with a `kind` discriminator plus
//! kind-specific named fields. Nested nodes go through the same generic
//! writer, dispatched by the node's runtime kind. Constants carry their
//! `type` tag next to the `value` payload so the payload can be read back
//! without guessing.

mod document;


use crate::{
    config::PredicateConfig,
    error::PredicateError,
    node::{
        BinaryNode, BinaryOperator, ConstantNode, LambdaNode, MemberNode, MethodCallNode,
        NodeKind, ParameterNode, PredicateNode, UnaryNode,
    },
    types::{Float64, Ulid},
    value::{TypeTag, Value},
};
use predwire_primitives::ScalarKind;
use std::collections::BTreeMap;

// re-exports
pub use document::Document;

///
/// FIELD NAMES
///

pub const FIELD_KIND: &str = "kind";
pub const FIELD_BODY: &str = "body";
pub const FIELD_PARAMETERS: &str = "parameters";
pub const FIELD_SUBJECT: &str = "subject";
pub const FIELD_OPERATOR: &str = "operator";
pub const FIELD_LEFT: &str = "left";
pub const FIELD_RIGHT: &str = "right";
pub const FIELD_OPERAND: &str = "operand";
pub const FIELD_TARGET: &str = "target";
pub const FIELD_MEMBER: &str = "member";
pub const FIELD_RECEIVER: &str = "receiver";
pub const FIELD_METHOD: &str = "method";
pub const FIELD_ARGUMENTS: &str = "arguments";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_VALUE: &str = "value";
pub const FIELD_NAME: &str = "name";

///
/// WRITE
///

#[must_use]
pub fn write(node: &PredicateNode) -> Document {
    match node {
        PredicateNode::Lambda(lambda) => write_lambda(lambda),
        PredicateNode::Binary(binary) => record(
            NodeKind::Binary,
            [
                (FIELD_OPERATOR, Document::from(binary.operator.as_str())),
                (FIELD_LEFT, write(&binary.left)),
                (FIELD_RIGHT, write(&binary.right)),
            ],
        ),
        PredicateNode::Unary(unary) => {
            record(NodeKind::Unary, [(FIELD_OPERAND, write(&unary.operand))])
        }
        PredicateNode::Member(member) => write_member(member),
        PredicateNode::MethodCall(call) => record(
            NodeKind::MethodCall,
            [
                (
                    FIELD_RECEIVER,
                    call.receiver.as_ref().map_or(Document::Null, write_member),
                ),
                (FIELD_METHOD, Document::from(call.method.as_str())),
                (
                    FIELD_ARGUMENTS,
                    Document::List(call.arguments.iter().map(write).collect()),
                ),
            ],
        ),
        PredicateNode::Constant(constant) => record(
            NodeKind::Constant,
            [
                (FIELD_TYPE, Document::from(constant.ty().to_string())),
                (FIELD_VALUE, write_payload(constant.value())),
            ],
        ),
        PredicateNode::Parameter(param) => write_parameter(param),
    }
}

#[must_use]
pub fn write_lambda(lambda: &LambdaNode) -> Document {
    record(
        NodeKind::Lambda,
        [
            (FIELD_BODY, write(&lambda.body)),
            (
                FIELD_PARAMETERS,
                Document::List(lambda.parameters.iter().map(write_parameter).collect()),
            ),
            (
                FIELD_SUBJECT,
                lambda
                    .subject
                    .as_ref()
                    .map_or(Document::Null, |ty| Document::from(ty.to_string())),
            ),
        ],
    )
}

fn write_member(member: &MemberNode) -> Document {
    record(
        NodeKind::Member,
        [
            (FIELD_TARGET, write(&member.target)),
            (FIELD_MEMBER, Document::from(member.member.as_str())),
        ],
    )
}

fn write_parameter(param: &ParameterNode) -> Document {
    record(
        NodeKind::Parameter,
        [
            (FIELD_NAME, Document::from(param.name.as_str())),
            (FIELD_TYPE, Document::from(param.ty.to_string())),
        ],
    )
}

fn record<const N: usize>(kind: NodeKind, fields: [(&str, Document); N]) -> Document {
    let mut map = BTreeMap::new();
    map.insert(FIELD_KIND.to_string(), Document::from(kind.as_str()));
    for (name, doc) in fields {
        map.insert(name.to_string(), doc);
    }

    Document::Record(map)
}

fn write_payload(value: &Value) -> Document {
    match value {
        Value::Bool(b) => Document::Bool(*b),
        Value::Float64(f) => Document::Float(f.get()),
        Value::Int(n) => Document::Int(*n),
        Value::List(items) => Document::List(items.iter().map(write_payload).collect()),
        Value::Null => Document::Null,
        // unreachable through ConstantNode; kept total
        Value::Record(record) => Document::Record(
            record
                .fields()
                .map(|(name, value)| (name.to_string(), write_payload(value)))
                .collect(),
        ),
        Value::Text(text) => Document::Text(text.clone()),
        Value::Uint(n) => Document::Uint(*n),
        Value::Ulid(ulid) => Document::Text(ulid.to_string()),
    }
}

///
/// READ
///

pub fn read(doc: &Document) -> Result<PredicateNode, PredicateError> {
    read_with_config(doc, &PredicateConfig::default())
}

pub fn read_with_config(
    doc: &Document,
    config: &PredicateConfig,
) -> Result<PredicateNode, PredicateError> {
    Reader::new(config).node(doc, "$", 1)
}

/// Read a document whose root must be a `Lambda` node.
pub fn read_lambda(doc: &Document) -> Result<LambdaNode, PredicateError> {
    read_lambda_with_config(doc, &PredicateConfig::default())
}

pub fn read_lambda_with_config(
    doc: &Document,
    config: &PredicateConfig,
) -> Result<LambdaNode, PredicateError> {
    match read_with_config(doc, config)? {
        PredicateNode::Lambda(lambda) => Ok(lambda),
        other => Err(PredicateError::malformed(
            "$",
            format!("root must be a Lambda node, found {}", other.kind()),
        )),
    }
}

///
/// Reader
///
/// Carries limits and the running node count for one read.
///

struct Reader<'c> {
    config: &'c PredicateConfig,
    nodes: usize,
}

impl<'c> Reader<'c> {
    const fn new(config: &'c PredicateConfig) -> Self {
        Self { config, nodes: 0 }
    }

    fn node(
        &mut self,
        doc: &Document,
        path: &str,
        depth: usize,
    ) -> Result<PredicateNode, PredicateError> {
        if depth > self.config.max_depth {
            return Err(PredicateError::malformed(
                path,
                format!("nesting exceeds {} levels", self.config.max_depth),
            ));
        }
        self.nodes += 1;
        if self.nodes > self.config.max_nodes {
            return Err(PredicateError::malformed(
                path,
                format!("document exceeds {} nodes", self.config.max_nodes),
            ));
        }

        let kind_name = text_field(doc, FIELD_KIND, path)?;
        let kind =
            NodeKind::from_name(kind_name).ok_or_else(|| PredicateError::unknown_kind(kind_name))?;

        let node = match kind {
            NodeKind::Lambda => PredicateNode::Lambda(self.lambda(doc, path, depth)?),
            NodeKind::Binary => {
                let name = text_field(doc, FIELD_OPERATOR, path)?;
                let operator = BinaryOperator::from_name(name).ok_or_else(|| {
                    PredicateError::malformed(
                        child_path(path, FIELD_OPERATOR),
                        format!("unknown binary operator '{name}'"),
                    )
                })?;

                PredicateNode::Binary(BinaryNode {
                    operator,
                    left: Box::new(self.child(doc, FIELD_LEFT, path, depth)?),
                    right: Box::new(self.child(doc, FIELD_RIGHT, path, depth)?),
                })
            }
            NodeKind::Unary => PredicateNode::Unary(UnaryNode {
                operand: Box::new(self.child(doc, FIELD_OPERAND, path, depth)?),
            }),
            NodeKind::Member => PredicateNode::Member(self.member(doc, path, depth)?),
            NodeKind::MethodCall => PredicateNode::MethodCall(self.method_call(doc, path, depth)?),
            NodeKind::Constant => PredicateNode::Constant(read_constant(doc, path)?),
            NodeKind::Parameter => PredicateNode::Parameter(read_parameter(doc, path)?),
        };

        Ok(node)
    }

    fn child(
        &mut self,
        doc: &Document,
        field: &str,
        path: &str,
        depth: usize,
    ) -> Result<PredicateNode, PredicateError> {
        let child = required(doc, field, path)?;
        self.node(child, &child_path(path, field), depth + 1)
    }

    fn lambda(
        &mut self,
        doc: &Document,
        path: &str,
        depth: usize,
    ) -> Result<LambdaNode, PredicateError> {
        let params_path = child_path(path, FIELD_PARAMETERS);
        let items = list_field(doc, FIELD_PARAMETERS, path)?;

        let mut parameters = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{params_path}[{i}]");
            match self.node(item, &item_path, depth + 1)? {
                PredicateNode::Parameter(param) => parameters.push(param),
                other => {
                    return Err(PredicateError::malformed(
                        item_path,
                        format!("expected a Parameter node, found {}", other.kind()),
                    ));
                }
            }
        }

        let subject = match doc.get(FIELD_SUBJECT) {
            None | Some(Document::Null) => None,
            Some(Document::Text(name)) => Some(parse_tag(name)?),
            Some(other) => {
                return Err(PredicateError::malformed(
                    child_path(path, FIELD_SUBJECT),
                    format!("expected text or null, found {}", other.kind_label()),
                ));
            }
        };

        let body = self.child(doc, FIELD_BODY, path, depth)?;

        Ok(LambdaNode {
            parameters,
            body: Box::new(body),
            subject,
        })
    }

    fn member(
        &mut self,
        doc: &Document,
        path: &str,
        depth: usize,
    ) -> Result<MemberNode, PredicateError> {
        let member = text_field(doc, FIELD_MEMBER, path)?.to_string();
        let target = self.child(doc, FIELD_TARGET, path, depth)?;

        Ok(MemberNode {
            target: Box::new(target),
            member,
        })
    }

    fn method_call(
        &mut self,
        doc: &Document,
        path: &str,
        depth: usize,
    ) -> Result<MethodCallNode, PredicateError> {
        let method = text_field(doc, FIELD_METHOD, path)?.to_string();

        let receiver = match doc.get(FIELD_RECEIVER) {
            None | Some(Document::Null) => None,
            Some(_) => {
                let receiver_path = child_path(path, FIELD_RECEIVER);
                match self.child(doc, FIELD_RECEIVER, path, depth)? {
                    PredicateNode::Member(member) => Some(member),
                    other => {
                        return Err(PredicateError::malformed(
                            receiver_path,
                            format!("receiver must be a Member node, found {}", other.kind()),
                        ));
                    }
                }
            }
        };

        let args_path = child_path(path, FIELD_ARGUMENTS);
        let items = list_field(doc, FIELD_ARGUMENTS, path)?;
        let mut arguments = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            arguments.push(self.node(item, &format!("{args_path}[{i}]"), depth + 1)?);
        }

        Ok(MethodCallNode {
            receiver,
            method,
            arguments,
        })
    }
}

fn read_parameter(doc: &Document, path: &str) -> Result<ParameterNode, PredicateError> {
    let name = text_field(doc, FIELD_NAME, path)?;
    let ty = parse_tag(text_field(doc, FIELD_TYPE, path)?)?;

    Ok(ParameterNode::new(name, ty))
}

fn read_constant(doc: &Document, path: &str) -> Result<ConstantNode, PredicateError> {
    let ty = parse_tag(text_field(doc, FIELD_TYPE, path)?)?;
    let payload = required(doc, FIELD_VALUE, path)?;

    let value = read_payload(&ty, payload).ok_or_else(|| {
        PredicateError::type_resolution(format!(
            "constant at {path}: {} payload does not match type '{ty}'",
            payload.kind_label()
        ))
    })?;

    ConstantNode::try_new(ty.clone(), value).ok_or_else(|| {
        PredicateError::type_resolution(format!(
            "constant at {path}: type '{ty}' cannot be carried as a constant"
        ))
    })
}

/// Payload decoding is driven by the declared type, never by the payload.
#[allow(clippy::cast_precision_loss)]
fn read_payload(ty: &TypeTag, doc: &Document) -> Option<Value> {
    let value = match (ty, doc) {
        (TypeTag::Null, Document::Null) => Value::Null,
        (TypeTag::List(element), Document::List(items)) => Value::List(
            items
                .iter()
                .map(|item| read_payload(element, item))
                .collect::<Option<Vec<_>>>()?,
        ),
        (TypeTag::Scalar(kind), doc) => match (kind, doc) {
            (ScalarKind::Bool, Document::Bool(b)) => Value::Bool(*b),
            (ScalarKind::Int, Document::Int(n)) => Value::Int(*n),
            (ScalarKind::Int, Document::Uint(n)) => Value::Int(i64::try_from(*n).ok()?),
            (ScalarKind::Uint, Document::Uint(n)) => Value::Uint(*n),
            (ScalarKind::Uint, Document::Int(n)) => Value::Uint(u64::try_from(*n).ok()?),
            (ScalarKind::Float64, Document::Float(f)) => Value::Float64(Float64::try_new(*f)?),
            (ScalarKind::Float64, Document::Int(n)) => Value::Float64(exact_float(*n)?),
            (ScalarKind::Text, Document::Text(text)) => Value::Text(text.clone()),
            (ScalarKind::Ulid, Document::Text(text)) => {
                Value::Ulid(Ulid::from_string(text).ok()?)
            }
            _ => return None,
        },
        _ => return None,
    };

    Some(value)
}

// Largest magnitude below which every integer has an exact f64 form.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

// Integral float payloads are accepted only when the conversion is lossless.
fn exact_float(n: i64) -> Option<Float64> {
    if n.unsigned_abs() > MAX_EXACT_FLOAT_INT {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let value = n as f64;

    Float64::try_new(value)
}

///
/// FIELD HELPERS
///

pub(crate) fn child_path(path: &str, field: &str) -> String {
    format!("{path}.{field}")
}

fn required<'d>(doc: &'d Document, field: &str, path: &str) -> Result<&'d Document, PredicateError> {
    if doc.as_record().is_none() {
        return Err(PredicateError::malformed(
            path,
            format!("expected a node record, found {}", doc.kind_label()),
        ));
    }

    doc.get(field).ok_or_else(|| {
        PredicateError::malformed(child_path(path, field), "missing required field")
    })
}

fn text_field<'d>(doc: &'d Document, field: &str, path: &str) -> Result<&'d str, PredicateError> {
    let value = required(doc, field, path)?;
    value.as_text().ok_or_else(|| {
        PredicateError::malformed(
            child_path(path, field),
            format!("expected text, found {}", value.kind_label()),
        )
    })
}

fn list_field<'d>(
    doc: &'d Document,
    field: &str,
    path: &str,
) -> Result<&'d [Document], PredicateError> {
    let value = required(doc, field, path)?;
    value.as_list().ok_or_else(|| {
        PredicateError::malformed(
            child_path(path, field),
            format!("expected list, found {}", value.kind_label()),
        )
    })
}

fn parse_tag(name: &str) -> Result<TypeTag, PredicateError> {
    TypeTag::parse(name)
        .map_err(|err| PredicateError::type_resolution(format!("type tag '{name}': {err}")))
}

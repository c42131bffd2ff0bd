use crate::{
    codec::{self, Document},
    config::PredicateConfig,
    decode::{decode, decode_document, decode_with_config},
    error::ErrorKind,
    expr::{CompiledPredicate, Expr, LambdaExpr},
    node::{
        BinaryNode, BinaryOperator, ConstantNode, LambdaNode, MemberNode, MethodCallNode,
        ParameterNode, PredicateNode, UnaryNode,
    },
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    test_fixtures::{Order, Person, person_tag, registry},
    value::{TypeTag, Value},
};
use std::cell::RefCell;

///
/// RecordingSink
///

#[derive(Default)]
struct RecordingSink {
    events: RefCell<Vec<MetricsEvent>>,
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}

fn subject() -> ParameterNode {
    ParameterNode::new("m", person_tag())
}

fn reference(param: &ParameterNode) -> PredicateNode {
    PredicateNode::Parameter(param.clone())
}

fn member(target: PredicateNode, name: &str) -> MemberNode {
    MemberNode {
        target: Box::new(target),
        member: name.to_string(),
    }
}

fn constant(ty: TypeTag, value: impl Into<Value>) -> PredicateNode {
    PredicateNode::Constant(ConstantNode::try_new(ty, value.into()).expect("portable constant"))
}

fn binary(operator: BinaryOperator, left: PredicateNode, right: PredicateNode) -> PredicateNode {
    PredicateNode::Binary(BinaryNode {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn call(
    receiver: Option<MemberNode>,
    method: &str,
    arguments: Vec<PredicateNode>,
) -> PredicateNode {
    PredicateNode::MethodCall(MethodCallNode {
        receiver,
        method: method.to_string(),
        arguments,
    })
}

fn root(body: PredicateNode) -> LambdaNode {
    LambdaNode {
        parameters: vec![subject()],
        body: Box::new(body),
        subject: Some(person_tag()),
    }
}

/// `m => m.Age > 10 && m.Name.StartsWith("Em")`
fn documented_example() -> LambdaNode {
    let m = subject();

    root(binary(
        BinaryOperator::AndAlso,
        binary(
            BinaryOperator::GreaterThan,
            member(reference(&m), "Age").into(),
            constant(TypeTag::INT, 10),
        ),
        call(
            Some(member(reference(&m), "Name")),
            "StartsWith",
            vec![constant(TypeTag::TEXT, "Em")],
        ),
    ))
}

fn decode_kind(node: &LambdaNode) -> Result<LambdaExpr, ErrorKind> {
    decode(node, &registry()).map_err(|err| err.kind())
}

#[test]
fn documented_example_decodes_and_evaluates() {
    let lambda = decode(&documented_example(), &registry()).expect("decodes");
    let predicate = CompiledPredicate::compile(lambda).expect("compiles");

    assert_eq!(predicate.matches(&Person::new("Emre", 29)), Ok(true));
    assert_eq!(predicate.matches(&Person::new("Tony", 40)), Ok(false));
    assert_eq!(predicate.matches(&Person::new("Emily", 7)), Ok(false));
}

#[test]
fn references_share_the_declared_parameter() {
    let lambda = decode(&documented_example(), &registry()).expect("decodes");
    let declared = lambda.params[0].clone();

    let mut seen = Vec::new();
    collect_parameters(&lambda.body, &mut seen);

    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|param| *param == declared));
}

fn collect_parameters(expr: &Expr, out: &mut Vec<crate::expr::ParameterExpr>) {
    match expr {
        Expr::Parameter(param) => out.push(param.clone()),
        Expr::Binary(binary) => {
            collect_parameters(&binary.left, out);
            collect_parameters(&binary.right, out);
        }
        Expr::Unary(unary) => collect_parameters(&unary.operand, out),
        Expr::Member(member) => collect_parameters(&member.target, out),
        Expr::Call(call) => {
            if let Some(receiver) = &call.receiver {
                collect_parameters(receiver, out);
            }
            for arg in &call.args {
                collect_parameters(arg, out);
            }
        }
        Expr::Lambda(lambda) => collect_parameters(&lambda.body, out),
        Expr::Constant(_) | Expr::Conditional(_) => {}
    }
}

#[test]
fn unreferenced_declared_parameters_are_kept_in_order() {
    let m = subject();
    let unused = ParameterNode::new("n", TypeTag::INT);
    let node = LambdaNode {
        parameters: vec![m.clone(), unused],
        body: Box::new(binary(
            BinaryOperator::Equal,
            member(reference(&m), "Name").into(),
            constant(TypeTag::TEXT, "Ada"),
        )),
        subject: None,
    };

    let lambda = decode(&node, &registry()).expect("decodes");
    let names: Vec<_> = lambda.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["m", "n"]);
    assert_ne!(lambda.params[0].id, lambda.params[1].id);
}

#[test]
fn undeclared_reference_is_malformed() {
    let stray = ParameterNode::new("x", person_tag());
    let node = root(binary(
        BinaryOperator::GreaterThan,
        member(reference(&stray), "Age").into(),
        constant(TypeTag::INT, 1),
    ));

    assert_eq!(decode_kind(&node), Err(ErrorKind::MalformedDocument));
}

#[test]
fn duplicate_declaration_is_malformed() {
    let m = subject();
    let node = LambdaNode {
        parameters: vec![m.clone(), m.clone()],
        body: Box::new(constant(TypeTag::BOOL, true)),
        subject: None,
    };

    assert_eq!(decode_kind(&node), Err(ErrorKind::MalformedDocument));
}

#[test]
fn unknown_member_and_type_fail_type_resolution() {
    let m = subject();
    let node = root(binary(
        BinaryOperator::Equal,
        member(reference(&m), "Lastname").into(),
        constant(TypeTag::TEXT, "Yilmaz"),
    ));
    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));

    let ghost = ParameterNode::new("g", TypeTag::entity("Ghost"));
    let node = LambdaNode {
        parameters: vec![ghost],
        body: Box::new(constant(TypeTag::BOOL, true)),
        subject: None,
    };
    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));
}

#[test]
fn constant_of_unregistered_entity_list_fails_type_resolution() {
    let node = root(call(
        None,
        "Any",
        vec![constant(
            TypeTag::list(TypeTag::entity("Ghost")),
            Value::List(Vec::new()),
        )],
    ));

    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));
}

#[test]
fn incompatible_operands_fail_type_resolution() {
    let m = subject();
    let node = root(binary(
        BinaryOperator::GreaterThan,
        member(reference(&m), "Age").into(),
        constant(TypeTag::TEXT, "ten"),
    ));
    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));

    let node = root(PredicateNode::Unary(UnaryNode {
        operand: Box::new(member(reference(&m), "Age").into()),
    }));
    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));
}

#[test]
fn negation_decodes() {
    let m = subject();
    let node = root(PredicateNode::Unary(UnaryNode {
        operand: Box::new(call(
            Some(member(reference(&m), "Name")),
            "StartsWith",
            vec![constant(TypeTag::TEXT, "Em")],
        )),
    }));

    let predicate =
        CompiledPredicate::compile(decode(&node, &registry()).expect("decodes")).expect("compiles");
    assert_eq!(predicate.matches(&Person::new("Tony", 40)), Ok(true));
    assert_eq!(predicate.matches(&Person::new("Emre", 29)), Ok(false));
}

#[test]
fn instance_methods_bind_on_exact_argument_types() {
    let m = subject();

    let wrong_arg = root(call(
        Some(member(reference(&m), "Name")),
        "StartsWith",
        vec![constant(TypeTag::INT, 1)],
    ));
    assert_eq!(decode_kind(&wrong_arg), Err(ErrorKind::MethodResolutionFailure));

    let unknown = root(call(
        Some(member(reference(&m), "Name")),
        "Matches",
        vec![constant(TypeTag::TEXT, ".*")],
    ));
    assert_eq!(decode_kind(&unknown), Err(ErrorKind::MethodResolutionFailure));

    let overload = root(call(
        Some(member(reference(&m), "Name")),
        "Equals",
        vec![constant(TypeTag::TEXT, "EMRE"), constant(TypeTag::BOOL, true)],
    ));
    let predicate = CompiledPredicate::compile(decode(&overload, &registry()).expect("decodes"))
        .expect("compiles");
    assert_eq!(predicate.matches(&Person::new("Emre", 29)), Ok(true));
}

#[test]
fn receiverless_call_over_a_non_sequence_is_unsupported() {
    let m = subject();
    let node = root(call(
        None,
        "StartsWith",
        vec![member(reference(&m), "Name").into(), constant(TypeTag::TEXT, "E")],
    ));

    assert_eq!(decode_kind(&node), Err(ErrorKind::UnsupportedExpressionShape));
}

#[test]
fn nested_lambda_argument_decodes_with_its_own_scope() {
    let m = subject();
    let t = ParameterNode::new("t", TypeTag::TEXT);
    let inner = LambdaNode {
        parameters: vec![t.clone()],
        body: Box::new(binary(
            BinaryOperator::Equal,
            reference(&t),
            constant(TypeTag::TEXT, "vip"),
        )),
        subject: None,
    };
    let node = root(call(
        None,
        "Any",
        vec![
            member(reference(&m), "Tags").into(),
            PredicateNode::Lambda(inner),
        ],
    ));

    let predicate =
        CompiledPredicate::compile(decode(&node, &registry()).expect("decodes")).expect("compiles");
    assert_eq!(
        predicate.matches(&Person::new("Emre", 29).tagged(&["new", "vip"])),
        Ok(true)
    );
    assert_eq!(
        predicate.matches(&Person::new("Tony", 40).tagged(&["new"])),
        Ok(false)
    );
}

#[test]
fn nested_lambda_over_entities_can_reach_the_outer_parameter() {
    let m = subject();
    let o = ParameterNode::new("o", TypeTag::entity("Order"));
    let inner = LambdaNode {
        parameters: vec![o.clone()],
        body: Box::new(binary(
            BinaryOperator::GreaterThan,
            member(reference(&o), "Total").into(),
            member(reference(&m), "Age").into(),
        )),
        subject: None,
    };
    let node = root(call(
        None,
        "Any",
        vec![
            member(reference(&m), "Orders").into(),
            PredicateNode::Lambda(inner),
        ],
    ));

    let predicate =
        CompiledPredicate::compile(decode(&node, &registry()).expect("decodes")).expect("compiles");
    let big = Person::new("Emre", 29).with_order(Order {
        sku: "A-1",
        total: 100,
    });
    let small = Person::new("Tony", 40).with_order(Order {
        sku: "B-2",
        total: 5,
    });
    assert_eq!(predicate.matches(&big), Ok(true));
    assert_eq!(predicate.matches(&small), Ok(false));
}

#[test]
fn nested_lambda_of_the_wrong_element_type_fails_method_resolution() {
    let m = subject();
    let n = ParameterNode::new("n", TypeTag::INT);
    let inner = LambdaNode {
        parameters: vec![n.clone()],
        body: Box::new(binary(
            BinaryOperator::GreaterThan,
            reference(&n),
            constant(TypeTag::INT, 1),
        )),
        subject: None,
    };
    let node = root(call(
        None,
        "Any",
        vec![
            member(reference(&m), "Tags").into(),
            PredicateNode::Lambda(inner),
        ],
    ));

    assert_eq!(decode_kind(&node), Err(ErrorKind::MethodResolutionFailure));
}

#[test]
fn lambda_outside_a_call_argument_is_malformed() {
    let inner = LambdaNode {
        parameters: Vec::new(),
        body: Box::new(constant(TypeTag::BOOL, true)),
        subject: None,
    };
    let node = root(binary(
        BinaryOperator::AndAlso,
        PredicateNode::Lambda(inner),
        constant(TypeTag::BOOL, true),
    ));

    assert_eq!(decode_kind(&node), Err(ErrorKind::MalformedDocument));
}

#[test]
fn root_body_must_be_boolean() {
    let m = subject();
    let node = root(member(reference(&m), "Age").into());

    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));
}

#[test]
fn subject_must_match_the_first_parameter() {
    let mut node = documented_example();
    node.subject = Some(TypeTag::entity("Order"));

    assert_eq!(decode_kind(&node), Err(ErrorKind::TypeResolutionFailure));
}

#[test]
fn configured_limits_bound_the_decoder() {
    let node = documented_example();
    let registry = registry();

    let shallow = PredicateConfig::default().with_max_depth(3);
    assert_eq!(
        decode_with_config(&node, &registry, &shallow).map_err(|e| e.kind()),
        Err(ErrorKind::MalformedDocument)
    );

    let small = PredicateConfig::default().with_max_nodes(10);
    assert_eq!(
        decode_with_config(&node, &registry, &small).map_err(|e| e.kind()),
        Err(ErrorKind::MalformedDocument)
    );

    let exact = PredicateConfig::default().with_max_nodes(node.node_count());
    assert!(decode_with_config(&node, &registry, &exact).is_ok());
}

#[test]
fn decode_reports_nodes_and_parameters() {
    let node = documented_example();
    let sink = RecordingSink::default();

    with_metrics_sink(&sink, || decode(&node, &registry())).expect("decodes");

    assert_eq!(
        sink.events.borrow().as_slice(),
        &[MetricsEvent::DecodeFinish {
            nodes: 11,
            parameters: 1,
        }]
    );
}

#[test]
fn unknown_kind_in_a_document_is_fatal() {
    let mut doc = codec::write_lambda(&documented_example());
    if let Document::Record(fields) = &mut doc {
        fields.insert(
            codec::FIELD_BODY.to_string(),
            Document::Record(
                [(codec::FIELD_KIND.to_string(), Document::from("Conditional"))]
                    .into_iter()
                    .collect(),
            ),
        );
    }

    let sink = RecordingSink::default();
    let result = with_metrics_sink(&sink, || decode_document(&doc, &registry()));

    assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::UnknownNodeKind));
    assert_eq!(
        sink.events.borrow().as_slice(),
        &[MetricsEvent::DecodeRejected {
            kind: ErrorKind::UnknownNodeKind
        }]
    );
}

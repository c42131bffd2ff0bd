use crate::{
    expr::{
        BinaryOp, CompiledPredicate, EvalError, Expr, ExprBuilder, ExprError, evaluate_closed,
    },
    model::EntityValue,
    test_fixtures::{Order, Person, person_tag, registry},
    value::{TypeTag, Value},
};

fn adult_named_em(b: &mut ExprBuilder<'_>) -> CompiledPredicate {
    let p = b.parameter("p", person_tag()).expect("param");
    let age = b.member(Expr::from(&p), "Age").expect("Age");
    let ten = b.constant(10).expect("const");
    let older = b.binary(BinaryOp::GreaterThan, age, ten).expect("gt");

    let name = b.member(Expr::from(&p), "Name").expect("Name");
    let em = b.constant("Em").expect("const");
    let starts = b.call(name, "StartsWith", vec![em]).expect("StartsWith");

    let body = b.and(older, starts).expect("and");
    CompiledPredicate::compile(b.lambda(vec![p], body).expect("lambda")).expect("compile")
}

#[test]
fn compiled_predicate_matches_entities() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let predicate = adult_named_em(&mut b);

    assert_eq!(predicate.matches(&Person::new("Emre", 29)), Ok(true));
    assert_eq!(predicate.matches(&Person::new("Tony", 37)), Ok(false));
    assert_eq!(predicate.matches(&Person::new("Emma", 9)), Ok(false));

    let people = [
        Person::new("Emre", 29),
        Person::new("Tony", 37),
        Person::new("Emily", 41),
    ];
    let kept: Vec<_> = predicate
        .filter(&people)
        .expect("filter")
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(kept, vec!["Emre", "Emily"]);
}

#[test]
fn compiled_predicate_rejects_foreign_subjects() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let predicate = adult_named_em(&mut b);

    let order = Order {
        sku: "A-1",
        total: 3,
    };
    assert!(matches!(
        predicate.evaluate(&order.to_value()),
        Err(EvalError::SubjectMismatch { .. })
    ));
}

#[test]
fn compile_requires_single_bool_parameter_lambda() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let p = b.parameter("p", person_tag()).expect("param");
    let age = b.member(Expr::from(&p), "Age").expect("Age");

    let lambda = b.lambda(vec![p], age).expect("lambda");
    assert_eq!(
        CompiledPredicate::compile(lambda).err(),
        Some(EvalError::PredicateNotBoolean {
            found: TypeTag::INT
        })
    );

    let lambda = b
        .lambda(Vec::new(), b.constant(true).expect("const"))
        .expect("lambda");
    assert_eq!(
        CompiledPredicate::compile(lambda).err(),
        Some(EvalError::PredicateArity { found: 0 })
    );
}

#[test]
fn builder_rejects_unknown_members_and_methods() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let p = b.parameter("p", person_tag()).expect("param");

    assert!(matches!(
        b.member(Expr::from(&p), "Password"),
        Err(ExprError::UnknownMember { .. })
    ));

    let name = b.member(Expr::from(&p), "Name").expect("Name");
    let five = b.constant(5).expect("const");
    assert!(matches!(
        b.call(name, "StartsWith", vec![five]),
        Err(ExprError::UnknownMethod { .. })
    ));

    assert!(matches!(
        b.parameter("s", TypeTag::entity("Secret")),
        Err(ExprError::UnknownType { .. })
    ));
}

#[test]
fn builder_enforces_operand_types() {
    let registry = registry();
    let b = ExprBuilder::new(&registry);

    let err = b
        .binary(
            BinaryOp::LessThan,
            b.constant(1).expect("int"),
            b.constant(1u64).expect("uint"),
        )
        .expect_err("mixed int/uint");
    assert!(matches!(err, ExprError::IncompatibleOperands { .. }));

    assert!(
        b.binary(
            BinaryOp::AndAlso,
            b.constant(true).expect("bool"),
            b.constant(1).expect("int"),
        )
        .is_err()
    );
    assert!(b.not(b.constant(1).expect("int")).is_err());
    assert!(b.negate(b.constant(1u64).expect("uint")).is_err());

    // null compares against anything
    let eq_null = b
        .binary(
            BinaryOp::Equal,
            b.constant("x").expect("text"),
            b.constant(Value::Null).expect("null"),
        )
        .expect("text == null");
    assert_eq!(eq_null.ty(), &TypeTag::BOOL);
}

#[test]
fn typed_constant_checks_conformance() {
    let registry = registry();
    let b = ExprBuilder::new(&registry);

    assert!(matches!(
        b.typed_constant(TypeTag::UINT, Value::Int(3)),
        Err(ExprError::ConstantMismatch { .. })
    ));
    assert!(
        b.typed_constant(TypeTag::list(TypeTag::TEXT), Value::List(Vec::new()))
            .is_ok()
    );
    assert_eq!(
        b.constant(Value::List(Vec::new())).err(),
        Some(ExprError::UninferableConstant)
    );
}

#[test]
fn sequence_calls_bind_nested_lambdas() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);

    let p = b.parameter("p", person_tag()).expect("param");
    let o = b.parameter("o", TypeTag::entity("Order")).expect("param");

    let orders = b.member(Expr::from(&p), "Orders").expect("Orders");
    let total = b.member(Expr::from(&o), "Total").expect("Total");
    let big = b
        .binary(BinaryOp::GreaterThan, total, b.constant(100).expect("const"))
        .expect("gt");
    let inner = b.lambda(vec![o], big).expect("inner lambda");

    let any = b
        .sequence_call("Any", vec![orders, Expr::from(inner)])
        .expect("Any(orders, o => ...)");
    let predicate =
        CompiledPredicate::compile(b.lambda(vec![p], any).expect("lambda")).expect("compile");

    let small = Person::new("Ada", 30).with_order(Order {
        sku: "a",
        total: 10,
    });
    let large = small.clone().with_order(Order {
        sku: "b",
        total: 500,
    });

    assert_eq!(predicate.matches(&small), Ok(false));
    assert_eq!(predicate.matches(&large), Ok(true));
}

#[test]
fn sequence_calls_resolve_by_shape() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let p = b.parameter("p", person_tag()).expect("param");

    let tags = b.member(Expr::from(&p), "Tags").expect("Tags");
    let count = b.sequence_call("Count", vec![tags.clone()]).expect("Count");
    assert_eq!(count.ty(), &TypeTag::INT);

    let contains = b
        .sequence_call("Contains", vec![tags.clone(), b.constant("vip").expect("const")])
        .expect("Contains");
    assert_eq!(contains.ty(), &TypeTag::BOOL);

    // element type mismatch
    assert!(matches!(
        b.sequence_call("Contains", vec![tags, b.constant(1).expect("const")]),
        Err(ExprError::UnknownSequenceOp { .. })
    ));

    // first argument must be a sequence
    let name = b.member(Expr::from(&p), "Name").expect("Name");
    assert!(matches!(
        b.sequence_call("Any", vec![name]),
        Err(ExprError::UnknownSequenceOp { .. })
    ));

    let predicate = CompiledPredicate::compile(b.lambda(vec![p], contains).expect("lambda"))
        .expect("compile");
    assert_eq!(
        predicate.matches(&Person::new("Ada", 30).tagged(&["new", "vip"])),
        Ok(true)
    );
    assert_eq!(predicate.matches(&Person::new("Bo", 30)), Ok(false));
}

#[test]
fn arithmetic_is_checked() {
    let registry = registry();
    let b = ExprBuilder::new(&registry);

    let sum = b
        .binary(
            BinaryOp::Add,
            b.constant(i64::MAX).expect("const"),
            b.constant(1).expect("const"),
        )
        .expect("add");
    assert_eq!(
        evaluate_closed(&sum),
        Err(EvalError::Overflow { op: "+" })
    );

    let div = b
        .binary(
            BinaryOp::Divide,
            b.constant(10).expect("const"),
            b.constant(0).expect("const"),
        )
        .expect("div");
    assert_eq!(evaluate_closed(&div), Err(EvalError::DivideByZero));

    let modulo = b
        .binary(
            BinaryOp::Modulo,
            b.constant(10u64).expect("const"),
            b.constant(4u64).expect("const"),
        )
        .expect("mod");
    assert_eq!(evaluate_closed(&modulo), Ok(Value::Uint(2)));
}

#[test]
fn and_also_short_circuits() {
    let registry = registry();
    let b = ExprBuilder::new(&registry);

    // right side would fail with division by zero if evaluated
    let boom = b
        .binary(
            BinaryOp::Equal,
            b.binary(
                BinaryOp::Divide,
                b.constant(1).expect("const"),
                b.constant(0).expect("const"),
            )
            .expect("div"),
            b.constant(0).expect("const"),
        )
        .expect("eq");

    let guarded = b.and(b.constant(false).expect("const"), boom.clone()).expect("and");
    assert_eq!(evaluate_closed(&guarded), Ok(Value::Bool(false)));

    let guarded = b.or(b.constant(true).expect("const"), boom).expect("or");
    assert_eq!(evaluate_closed(&guarded), Ok(Value::Bool(true)));
}

#[test]
fn conditional_selects_a_branch() {
    let registry = registry();
    let b = ExprBuilder::new(&registry);

    let cond = b
        .conditional(
            b.constant(false).expect("const"),
            b.constant(1).expect("const"),
            b.negate(b.constant(2).expect("const")).expect("neg"),
        )
        .expect("conditional");
    assert_eq!(evaluate_closed(&cond), Ok(Value::Int(-2)));

    assert!(
        b.conditional(
            b.constant(true).expect("const"),
            b.constant(1).expect("const"),
            b.constant("x").expect("const"),
        )
        .is_err()
    );
}

#[test]
fn unbound_parameters_fail_evaluation() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let p = b.parameter("p", TypeTag::INT).expect("param");

    assert!(matches!(
        evaluate_closed(&Expr::from(&p)),
        Err(EvalError::UnboundParameter { .. })
    ));
}

#[test]
fn parameters_have_distinct_identities() {
    let registry = registry();
    let mut b = ExprBuilder::new(&registry);
    let a = b.parameter("x", TypeTag::INT).expect("param");
    let c = b.parameter("x", TypeTag::INT).expect("param");

    assert_ne!(a.id, c.id);
    assert!(matches!(
        b.lambda(vec![a.clone(), a], b.constant(true).expect("const")),
        Err(ExprError::DuplicateParameter { .. })
    ));
}

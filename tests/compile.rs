//! End-to-end driver tests: parse trees built by hand, compiled to
//! textual IR, checked against the behavior the language promises.

use reso_lib::ast::*;
use reso_lib::{compile, CompileOptions};

fn sp() -> Span {
    Span::default()
}

fn id(name: &str) -> Id {
    Id::new(name, sp())
}

fn named(name: &str) -> TypeNode {
    TypeNode::named(name, sp())
}

fn int(value: i128) -> Expression {
    Expression::IntLiteral(IntLiteral { value, span: sp() })
}

fn text(value: &str) -> Expression {
    Expression::StringLiteral(StringLiteral {
        value: value.to_string(),
        span: sp(),
    })
}

fn var(name: &str) -> Expression {
    Expression::Identifier(id(name))
}

fn call(function: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Call(CallExpression {
        function: id(function),
        arguments,
        span: sp(),
    })
}

fn method(receiver: Expression, segments: Vec<CallSegment>, name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::MethodCall(MethodCallExpression {
        receiver: Box::new(receiver),
        segments,
        method: id(name),
        arguments,
        span: sp(),
    })
}

fn ret(value: Option<Expression>) -> Statement {
    Statement::Return(ReturnStatement { value, span: sp() })
}

fn decl(name: &str, type_name: Option<TypeNode>, initializer: Option<Expression>) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        name: id(name),
        is_const: false,
        type_name,
        initializer,
        span: sp(),
    })
}

fn def(
    name: &str,
    visibility: Visibility,
    parameters: Vec<Parameter>,
    return_type: Option<TypeNode>,
    statements: Vec<Statement>,
) -> Item {
    Item::Function(FunctionDef {
        name: id(name),
        visibility,
        parameters,
        return_type,
        body: Block::new(statements),
        span: sp(),
    })
}

fn main_returning(statements: Vec<Statement>) -> Item {
    def(
        "main",
        Visibility::Global,
        vec![],
        Some(named("i32")),
        statements,
    )
}

fn compile_units(units: Vec<SourceUnit>) -> reso_lib::CompilationResult {
    compile(&units, &CompileOptions::default())
}

fn compile_ok(units: Vec<SourceUnit>) -> String {
    let result = compile_units(units);
    assert!(
        result.success,
        "expected success, got: {:#?}",
        result.diagnostics
    );
    result.ir.expect("successful compilations carry IR")
}

fn assert_failure_with(units: Vec<SourceUnit>, needle: &str) {
    let result = compile_units(units);
    assert!(!result.success, "expected a compile failure");
    assert!(
        result
            .diagnostics
            .iter()
            .any(|diagnostic| diagnostic.message.contains(needle)),
        "no diagnostic mentions '{needle}': {:#?}",
        result.diagnostics
    );
}

#[test]
fn hello_world() {
    let ir = compile_ok(vec![SourceUnit::new(
        "hello.reso",
        vec![main_returning(vec![
            Statement::Expression(call("println", vec![text("Hello, world!")])),
            ret(Some(int(0))),
        ])],
    )]);

    assert!(ir.contains("define i32 @main"));
    assert!(ir.contains("Hello, world!"));
    assert!(ir.contains("@printf"));
    assert!(ir.contains("@GC_init"));
}

#[test]
fn unit_function_returns_the_unit_struct() {
    let ir = compile_ok(vec![SourceUnit::new(
        "greet.reso",
        vec![
            def(
                "greet",
                Visibility::Global,
                vec![],
                None,
                vec![
                    decl("name", Some(named("String")), Some(text("Bob"))),
                    Statement::Expression(call("println", vec![var("name")])),
                ],
            ),
            main_returning(vec![Statement::Expression(call("greet", vec![]))]),
        ],
    )]);

    assert!(ir.contains("@greet"));
    assert!(ir.contains("zeroinitializer"), "unit return is `{{}} zeroinitializer`");
    // A fall-through main silently returns zero.
    assert!(ir.contains("ret i32 0"));
}

#[test]
fn missing_return_on_a_branch_fails() {
    let units = vec![SourceUnit::new(
        "f.reso",
        vec![
            def(
                "f",
                Visibility::Global,
                vec![Parameter::new(id("b"), named("bool"))],
                Some(named("i32")),
                vec![Statement::If(IfStatement {
                    condition: var("b"),
                    then_block: Block::new(vec![ret(Some(int(1)))]),
                    else_block: None,
                    span: sp(),
                })],
            ),
            main_returning(vec![ret(Some(int(0)))]),
        ],
    )];

    assert_failure_with(units, "must return a value");
}

#[test]
fn ternary_literals_concretize_through_a_select() {
    let ir = compile_ok(vec![SourceUnit::new(
        "pick.reso",
        vec![
            def(
                "pick",
                Visibility::Global,
                vec![Parameter::new(id("b"), named("bool"))],
                Some(named("i64")),
                vec![ret(Some(Expression::Ternary(TernaryExpression {
                    condition: Box::new(var("b")),
                    then_value: Box::new(int(10)),
                    else_value: Box::new(int(20)),
                    span: sp(),
                })))],
            ),
            main_returning(vec![ret(Some(int(0)))]),
        ],
    )]);

    assert!(ir.contains("select i1"), "branches select at i64: {ir}");
    assert!(ir.contains("i64 10"));
    assert!(ir.contains("i64 20"));
}

#[test]
fn vector_add_and_indexer_get() {
    let vector_i32 = TypeNode::Generic {
        name: "Vector".to_string(),
        arguments: vec![named("i32")],
        span: sp(),
    };
    let ir = compile_ok(vec![SourceUnit::new(
        "vec.reso",
        vec![main_returning(vec![
            decl("v", Some(vector_i32), Some(call("Vector", vec![]))),
            Statement::Expression(method(var("v"), vec![], "add", vec![int(1)])),
            Statement::Expression(method(var("v"), vec![], "add", vec![int(2)])),
            Statement::Expression(method(var("v"), vec![], "add", vec![int(3)])),
            ret(Some(method(
                var("v"),
                vec![CallSegment::Index(int(1))],
                "get",
                vec![],
            ))),
        ])],
    )]);

    assert!(ir.contains("@GC_malloc"), "vector storage is GC-allocated");
    assert!(ir.contains("icmp ult"), "get is bounds-checked");
    assert!(ir.contains("@abort"), "bounds failures abort");
    assert!(ir.contains("llvm.memmove"), "growth moves the elements");
}

#[test]
fn file_private_functions_stay_private() {
    let units = vec![
        SourceUnit::new(
            "a.reso",
            vec![def(
                "helper",
                Visibility::FilePrivate,
                vec![],
                Some(named("i32")),
                vec![ret(Some(int(1)))],
            )],
        ),
        SourceUnit::new(
            "b.reso",
            vec![main_returning(vec![ret(Some(call("helper", vec![])))])],
        ),
    ];

    assert_failure_with(units, "not accessible");
}

#[test]
fn literal_out_of_range_is_rejected() {
    let units = vec![SourceUnit::new(
        "range.reso",
        vec![main_returning(vec![
            decl("x", Some(named("u8")), Some(int(256))),
            ret(Some(int(0))),
        ])],
    )];

    assert_failure_with(units, "out of range");
}

#[test]
fn division_by_literal_zero_is_rejected() {
    let units = vec![SourceUnit::new(
        "div.reso",
        vec![main_returning(vec![ret(Some(Expression::Binary(
            BinaryExpression {
                operator: BinaryOperator::Div,
                left: Box::new(int(1)),
                right: Box::new(int(0)),
                span: sp(),
            },
        )))])],
    )];

    assert_failure_with(units, "Division by zero");
}

#[test]
fn returning_a_value_from_a_unit_function_keeps_the_verbatim_message() {
    let units = vec![SourceUnit::new(
        "unit.reso",
        vec![
            def(
                "noisy",
                Visibility::Global,
                vec![],
                None,
                vec![ret(Some(int(1)))],
            ),
            main_returning(vec![ret(Some(int(0)))]),
        ],
    )];

    assert_failure_with(
        units,
        "Cannot convert integer literal to non-integer type ()",
    );
}

#[test]
fn same_sources_compile_to_identical_ir() {
    let units = || {
        vec![SourceUnit::new(
            "hello.reso",
            vec![main_returning(vec![
                Statement::Expression(call("println", vec![text("same")])),
                ret(Some(int(0))),
            ])],
        )]
    };

    let first = compile_ok(units());
    let second = compile_ok(units());
    assert_eq!(first, second);
}

#[test]
fn output_files_are_written_with_parent_directories() -> anyhow::Result<()> {
    let directory = std::env::temp_dir().join("reso_lib_driver_test");
    let path = directory.join("nested").join("out.ll");
    let _ = std::fs::remove_dir_all(&directory);

    let options = CompileOptions {
        output: Some(path.clone()),
        ..CompileOptions::default()
    };
    let result = compile(
        &[SourceUnit::new(
            "out.reso",
            vec![main_returning(vec![ret(Some(int(0)))])],
        )],
        &options,
    );

    assert!(result.success, "{:#?}", result.diagnostics);
    let written = std::fs::read_to_string(&path)?;
    assert!(written.contains("define i32 @main"));

    std::fs::remove_dir_all(&directory)?;
    Ok(())
}

#[test]
fn unreachable_code_warns_but_compiles() {
    let result = compile_units(vec![SourceUnit::new(
        "warn.reso",
        vec![main_returning(vec![
            ret(Some(int(0))),
            Statement::Expression(call("println", vec![text("never")])),
        ])],
    )]);

    assert!(result.success, "warnings do not fail the build");
    assert!(result
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.message == "Unreachable code"));
}

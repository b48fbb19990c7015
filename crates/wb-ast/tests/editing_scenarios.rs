use std::rc::Rc;
use wb_ast::{
    AstError, BodyDeclarationTarget, ClassPath, CommitOutcome, CompilationContext, ErrorCode, MemoryStorage,
    MethodBinding, NodeId, NodeKind, PersistedStorage, Role, StatementTarget,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn find(context: &CompilationContext, kind: NodeKind, source: &str) -> NodeId {
    let tree = context.tree();
    tree.descendants(tree.root())
        .into_iter()
        .find(|id| tree.kind(*id) == kind && context.node_source(*id) == source)
        .unwrap_or_else(|| panic!("no {kind:?} with source {source:?}"))
}

fn first(context: &CompilationContext, kind: NodeKind) -> NodeId {
    let tree = context.tree();
    tree.descendants(tree.root())
        .into_iter()
        .find(|id| tree.kind(*id) == kind)
        .unwrap_or_else(|| panic!("no {kind:?}"))
}

#[test]
fn test_remove_sole_statement() {
    let mut context = CompilationContext::new("class Test {\n  void foo(){int value = 1;}\n}").unwrap();
    let statement = find(&context, NodeKind::VariableDeclarationStatement, "int value = 1;");
    context.remove_statement(statement).unwrap();
    assert_eq!(context.text(), "class Test {\n  void foo(){}\n}");
}

#[test]
fn test_remove_statement_keeps_line_terminator() {
    let mut context = CompilationContext::new("class Test {\n  void foo(){int value = 1;\t \t\n }\n}").unwrap();
    let statement = find(&context, NodeKind::VariableDeclarationStatement, "int value = 1;");
    context.remove_statement(statement).unwrap();
    assert_eq!(context.text(), "class Test {\n  void foo(){\n }\n}");
}

#[test]
fn test_remove_middle_argument() {
    let source = "class Test {\n  void foo() {\n    bar(0, 1, 2);\n  }\n  void bar(int a, int b, int c) {}\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let invocation = find(&context, NodeKind::MethodInvocation, "bar(0, 1, 2)");
    context.remove_invocation_argument(invocation, 1).unwrap();
    assert_eq!(context.node_source(invocation), "bar(0, 2)");
    let arguments = context.tree().children_with_role(invocation, Role::Argument);
    assert_eq!(arguments.len(), 2);
    let method = context.tree().binding(invocation).and_then(|b| b.as_method()).unwrap();
    assert_eq!(method.parameter_types(), ["int", "int"]);
}

#[test]
fn test_on_demand_import_conflict_keeps_qualified_name() {
    let source = "import java.util.*;\nclass Test {\n  private List m_list;\n}";
    let mut context = CompilationContext::new(source).unwrap();
    assert_eq!(context.ensure_class_import("java.awt.List").unwrap(), "java.awt.List");
    assert_eq!(context.text(), source);
    assert!(context.edits().is_empty());
}

#[test]
fn test_unique_variable_name_avoids_visible_field() {
    let source = "class Test {\n  int m_value;\n  void foo() {\n    int a;\n  }\n}";
    let context = CompilationContext::new(source).unwrap();
    let position = source.find("int a").unwrap();
    assert_eq!(context.unique_variable_name(Some(position), "m_value", None), "m_value_1");
    assert_eq!(context.unique_variable_name(Some(position), "other", None), "other");
}

#[test]
fn test_removing_last_tag_removes_javadoc() {
    let source = "class Test {\n  /**\n   * @tag aaa\n   */\n  int m_value;\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let field = first(&context, NodeKind::FieldDeclaration);
    context.set_javadoc_tag_text(field, "@tag", None).unwrap();
    assert_eq!(context.text(), "class Test {\n  int m_value;\n}");
    assert!(context.tree().child_with_role(field, Role::Javadoc).is_none());
    // nothing left to remove
    context.set_javadoc_tag_text(field, "@tag", None).unwrap();
    assert_eq!(context.text(), "class Test {\n  int m_value;\n}");
}

#[test]
fn test_move_to_same_position_makes_no_edits() {
    let source = "class Test {\n  void foo() {\n    int a;\n    int b;\n  }\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let a = find(&context, NodeKind::VariableDeclarationStatement, "int a;");
    let b = find(&context, NodeKind::VariableDeclarationStatement, "int b;");
    context.move_statement(a, StatementTarget::Before(b)).unwrap();
    context.move_statement(b, StatementTarget::After(a)).unwrap();
    assert_eq!(context.text(), source);
    assert!(context.edits().is_empty());
}

#[test]
fn test_exchange_elements_three_times() {
    let source = "class Test {\n  String[] names = {\"a\", \"bb\", \"ccc\"};\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let array = first(&context, NodeKind::ArrayInitializer);
    context.exchange_array_elements(array, 0, 2).unwrap();
    let once = context.text().to_string();
    context.exchange_array_elements(array, 0, 2).unwrap();
    assert_eq!(context.text(), source);
    assert!(context.edits().is_empty());
    context.exchange_array_elements(array, 0, 2).unwrap();
    assert_eq!(context.text(), once);
}

#[test]
fn test_ensure_class_import_twice() {
    let mut context = CompilationContext::new("package test;\nclass Test {\n}").unwrap();
    assert_eq!(context.ensure_class_import("java.util.ArrayList").unwrap(), "ArrayList");
    assert_eq!(context.ensure_class_import("java.util.ArrayList").unwrap(), "ArrayList");
    assert_eq!(context.text().matches("import java.util.ArrayList;").count(), 1);
}

#[test]
fn test_failed_operations_leave_text_unchanged() {
    init_tracing();
    let source = "class Test {\n  void foo() {\n    int a = 1;\n  }\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let a = find(&context, NodeKind::VariableDeclarationStatement, "int a = 1;");
    let nodes = context.tree().len();

    let err = context.add_statement(&["int b = ;"], StatementTarget::After(a)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Parse);
    assert_eq!(err.parameters()[0], "int b = ;");

    // crosses the end of the statement
    let start = source.find("= 1").unwrap();
    let err = context.replace_substring(start, 6, "").unwrap_err();
    assert!(matches!(err, AstError::EditorReplace { .. }));

    let err = context.replace_substring(source.len(), 10, "").unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadLocation);

    assert_eq!(context.text(), source);
    assert_eq!(context.tree().len(), nodes);
    assert!(context.edits().is_empty());
}

#[test]
fn test_nested_parse_error_keeps_cause() {
    let mut context = CompilationContext::new("class Test {\n}").unwrap();
    let class = context.primary_type().unwrap();
    let err = context
        .add_method_declaration(&[], "void foo()", Some(&["int x = ;"]), BodyDeclarationTarget::Last(class))
        .unwrap_err();
    match err {
        AstError::Parse(error) => {
            assert!(error.cause.is_some());
            assert!(!error.root_cause().diagnostic.is_empty());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(context.text(), "class Test {\n}");
}

#[test]
fn test_class_templates() {
    let source = "class Test {\n  void foo() {\n  }\n  static void bar() {\n  }\n}";
    let context = CompilationContext::new(source).unwrap();
    let foo = source.find("  }").unwrap();
    let bar = source.rfind("  }\n}").unwrap();
    assert_eq!(context.expand_templates(foo, "{wbp_class}"), "getClass()");
    assert_eq!(context.expand_templates(bar, "{wbp_class}"), "Test.class");
    assert_eq!(context.expand_templates(foo, "{wbp_classTop}.getName()"), "Test.class.getName()");
}

#[test]
fn test_edit_then_commit_into_storage() {
    init_tracing();
    let source = "class Test {\n  void foo() {\n  }\n}";
    let storage = Box::new(MemoryStorage::new(source));
    let mut context = CompilationContext::from_storage(storage, Rc::new(ClassPath::with_jdk())).unwrap();
    let method = first(&context, NodeKind::MethodDeclaration);
    let body = context.tree().child_with_role(method, Role::Body).unwrap();
    context
        .add_statement(&["java.util.ArrayList names = new java.util.ArrayList();"], StatementTarget::Last(body))
        .unwrap();

    let expected = "import java.util.ArrayList;\nclass Test {\n  void foo() {\n    ArrayList names = new ArrayList();\n  }\n}";
    assert_eq!(context.text(), expected);
    assert!(matches!(context.commit_changes().unwrap(), CommitOutcome::Written(_)));
    assert_eq!(context.storage().unwrap().current_text().unwrap(), expected);
    assert_eq!(context.commit_changes().unwrap(), CommitOutcome::Unchanged);
}

#[test]
fn test_statement_into_class_without_modifiers() {
    let source = "/** Doc. */\nclass Test {\n  void foo() {\n    int b;\n  }\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let b = find(&context, NodeKind::VariableDeclarationStatement, "int b;");
    context.add_statement(&["int a = 1;"], StatementTarget::Before(b)).unwrap();
    assert_eq!(context.text(), "/** Doc. */\nclass Test {\n  void foo() {\n    int a = 1;\n    int b;\n  }\n}");
}

#[test]
fn test_statement_into_one_line_body() {
    let source = "public class Test {\n  void foo() {}\n}";
    let mut context = CompilationContext::new(source).unwrap();
    let method = first(&context, NodeKind::MethodDeclaration);
    context.add_statement(&["int a;"], StatementTarget::Last(method)).unwrap();
    assert_eq!(context.text(), "public class Test {\n  void foo() {\n    int a;\n  }\n}");
}

#[test]
fn test_enum_members_keep_constants() {
    let mut context = CompilationContext::new("enum E {\n  A, B;\n  int x;\n}").unwrap();
    let x = find(&context, NodeKind::FieldDeclaration, "int x;");
    context.remove_body_declaration(x).unwrap();
    assert_eq!(context.text(), "enum E {\n  A, B;\n}");

    let mut context = CompilationContext::new("enum E {\n  A, B\n}").unwrap();
    let e = context.primary_type().unwrap();
    context.add_field_declaration(&["int y;"], BodyDeclarationTarget::Last(e)).unwrap();
    assert_eq!(context.text(), "enum E {\n  A, B;\n  int y;\n}");
    assert_eq!(context.tree().children_with_role(e, Role::EnumConstant).len(), 2);
}

#[test]
fn test_on_demand_import_with_conflicting_names() {
    let source = "import java.awt.List;\nimport java.util.*;\nclass Test {\n}";
    let mut context = CompilationContext::new(source).unwrap();
    assert_eq!(context.ensure_class_import("java.util.List").unwrap(), "java.util.List");
    assert_eq!(context.text(), source);

    let source = "import java.util.*;\nclass Test {\n  class List {\n  }\n}";
    let mut context = CompilationContext::new(source).unwrap();
    assert_eq!(context.ensure_class_import("java.util.List").unwrap(), "java.util.List");
    assert_eq!(context.text(), source);
}

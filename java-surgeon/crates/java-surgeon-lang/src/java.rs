//! Java grammar vocabulary (tree-sitter-java node kinds).
//!
//! Statement and expression supertypes are hidden in the tree-sitter-java
//! grammar, so callers classify concrete kinds with the helpers below.

pub const PROGRAM: &str = "program";
pub const PACKAGE_DECLARATION: &str = "package_declaration";
pub const IMPORT_DECLARATION: &str = "import_declaration";
pub const CLASS_DECLARATION: &str = "class_declaration";
pub const INTERFACE_DECLARATION: &str = "interface_declaration";
pub const ENUM_DECLARATION: &str = "enum_declaration";
pub const RECORD_DECLARATION: &str = "record_declaration";
pub const ANNOTATION_TYPE_DECLARATION: &str = "annotation_type_declaration";
pub const CLASS_BODY: &str = "class_body";
pub const INTERFACE_BODY: &str = "interface_body";
pub const ENUM_BODY: &str = "enum_body";
pub const ENUM_BODY_DECLARATIONS: &str = "enum_body_declarations";
pub const ENUM_CONSTANT: &str = "enum_constant";
pub const FIELD_DECLARATION: &str = "field_declaration";
pub const CONSTANT_DECLARATION: &str = "constant_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
pub const CONSTRUCTOR_BODY: &str = "constructor_body";
pub const STATIC_INITIALIZER: &str = "static_initializer";
pub const FORMAL_PARAMETERS: &str = "formal_parameters";
pub const FORMAL_PARAMETER: &str = "formal_parameter";
pub const SPREAD_PARAMETER: &str = "spread_parameter";
pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
pub const MODIFIERS: &str = "modifiers";
pub const SUPERCLASS: &str = "superclass";
pub const SUPER_INTERFACES: &str = "super_interfaces";
pub const EXTENDS_INTERFACES: &str = "extends_interfaces";
pub const TYPE_LIST: &str = "type_list";
pub const THROWS: &str = "throws";
pub const BLOCK: &str = "block";
pub const ARGUMENT_LIST: &str = "argument_list";
pub const ARRAY_INITIALIZER: &str = "array_initializer";
pub const LINE_COMMENT: &str = "line_comment";
pub const BLOCK_COMMENT: &str = "block_comment";
pub const IDENTIFIER: &str = "identifier";
pub const TYPE_IDENTIFIER: &str = "type_identifier";
pub const SCOPED_IDENTIFIER: &str = "scoped_identifier";
pub const SCOPED_TYPE_IDENTIFIER: &str = "scoped_type_identifier";
pub const ASTERISK: &str = "asterisk";

/// Kinds that appear where a statement is expected.
pub fn is_statement(kind: &str) -> bool {
    matches!(
        kind,
        "block"
            | "expression_statement"
            | "local_variable_declaration"
            | "if_statement"
            | "while_statement"
            | "do_statement"
            | "for_statement"
            | "enhanced_for_statement"
            | "try_statement"
            | "try_with_resources_statement"
            | "return_statement"
            | "throw_statement"
            | "break_statement"
            | "continue_statement"
            | "yield_statement"
            | "switch_expression"
            | "synchronized_statement"
            | "labeled_statement"
            | "assert_statement"
            | "explicit_constructor_invocation"
            | "local_class_declaration"
            | ";"
    ) || is_type_declaration(kind)
}

/// Declarations that introduce a named type.
pub fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        CLASS_DECLARATION
            | INTERFACE_DECLARATION
            | ENUM_DECLARATION
            | RECORD_DECLARATION
            | ANNOTATION_TYPE_DECLARATION
    )
}

/// Members of a class, interface or enum body.
pub fn is_body_declaration(kind: &str) -> bool {
    matches!(
        kind,
        FIELD_DECLARATION
            | CONSTANT_DECLARATION
            | METHOD_DECLARATION
            | CONSTRUCTOR_DECLARATION
            | STATIC_INITIALIZER
            | BLOCK
    ) || is_type_declaration(kind)
}

/// Type syntax (unannotated).
pub fn is_type(kind: &str) -> bool {
    matches!(
        kind,
        "void_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | TYPE_IDENTIFIER
            | SCOPED_TYPE_IDENTIFIER
            | "generic_type"
            | "array_type"
            | "annotated_type"
    )
}

pub fn is_primitive_type(kind: &str) -> bool {
    matches!(
        kind,
        "void_type" | "integral_type" | "floating_point_type" | "boolean_type"
    )
}

pub fn is_literal(kind: &str) -> bool {
    matches!(
        kind,
        "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "true"
            | "false"
            | "character_literal"
            | "string_literal"
            | "text_block"
            | "null_literal"
    )
}

pub fn is_comment(kind: &str) -> bool {
    matches!(kind, LINE_COMMENT | BLOCK_COMMENT)
}

pub fn is_annotation(kind: &str) -> bool {
    matches!(kind, "marker_annotation" | "annotation")
}

/// Reserved words that can never be used as identifiers.
pub fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "try"
            | "void"
            | "volatile"
            | "while"
            | "true"
            | "false"
            | "null"
    )
}

/// True when `kind` is a statement whose body is a single nested statement
/// (no braces required by the grammar).
pub fn has_statement_body(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement"
            | "while_statement"
            | "do_statement"
            | "for_statement"
            | "enhanced_for_statement"
            | "labeled_statement"
    )
}

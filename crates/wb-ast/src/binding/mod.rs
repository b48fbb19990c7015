//! Semantic facts attached to AST nodes.
//!
//! Bindings come from two places: the class path oracle (types that exist
//! outside the unit) and synthesis (types and members declared in the unit,
//! fragments, and derived copies produced by editor operations). Both are
//! compared through `qualified_name()` and `signature()`.

mod classpath;
mod synth;

pub use classpath::{ClassPath, FieldInfo, MethodInfo, TypeInfo};
pub use synth::{SynthesizedMethod, SynthesizedType, SynthesizedVariable};

use std::fmt;
use std::rc::Rc;

pub trait TypeBinding: fmt::Debug {
    /// Dot-separated, nested types included: `a.b.Outer.Inner`.
    fn qualified_name(&self) -> &str;

    fn is_interface(&self) -> bool;

    /// Qualified name of the superclass; `None` for interfaces and `Object`.
    fn superclass(&self) -> Option<&str>;

    fn interfaces(&self) -> &[String];

    fn declared_methods(&self) -> Vec<Rc<dyn MethodBinding>>;

    fn declared_fields(&self) -> Vec<Rc<dyn VariableBinding>>;

    fn simple_name(&self) -> &str {
        simple_name(self.qualified_name())
    }
}

pub trait MethodBinding: fmt::Debug {
    /// `<init>` for constructors.
    fn name(&self) -> &str;

    fn declaring_type(&self) -> &str;

    fn parameter_types(&self) -> &[String];

    fn return_type(&self) -> &str;

    fn exception_types(&self) -> &[String];

    fn is_static(&self) -> bool;

    fn is_varargs(&self) -> bool {
        false
    }

    fn is_constructor(&self) -> bool {
        self.name() == CONSTRUCTOR_NAME
    }

    /// `name(p1,p2)` with qualified parameter types.
    fn signature(&self) -> String {
        format!("{}({})", self.name(), self.parameter_types().join(","))
    }

    /// Whether a call with `count` arguments can target this method.
    fn accepts_arguments(&self, count: usize) -> bool {
        let parameters = self.parameter_types().len();
        if self.is_varargs() {
            count + 1 >= parameters
        } else {
            count == parameters
        }
    }
}

pub trait VariableBinding: fmt::Debug {
    fn name(&self) -> &str;

    /// Qualified type name, or the source text when the type is unknown.
    fn type_name(&self) -> &str;

    fn is_field(&self) -> bool;

    fn is_static(&self) -> bool;

    fn declaring_type(&self) -> Option<&str>;
}

pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Debug, Clone)]
pub enum Binding {
    Type(Rc<dyn TypeBinding>),
    Method(Rc<dyn MethodBinding>),
    Variable(Rc<dyn VariableBinding>),
}

impl Binding {
    pub fn as_type(&self) -> Option<&Rc<dyn TypeBinding>> {
        match self {
            Binding::Type(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Rc<dyn MethodBinding>> {
        match self {
            Binding::Method(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Rc<dyn VariableBinding>> {
        match self {
            Binding::Variable(binding) => Some(binding),
            _ => None,
        }
    }
}

/// Last segment of a dotted name.
pub fn simple_name(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(index) => &qualified_name[index + 1..],
        None => qualified_name,
    }
}

/// Everything before the last segment; empty for simple names.
pub fn qualifier(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(index) => &qualified_name[..index],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_parts() {
        assert_eq!(simple_name("java.util.Map.Entry"), "Entry");
        assert_eq!(qualifier("java.util.Map.Entry"), "java.util.Map");
        assert_eq!(simple_name("int"), "int");
        assert_eq!(qualifier("int"), "");
    }

    #[test]
    fn test_signature_and_arity() {
        let method = SynthesizedMethod::new("test.Test", "bar")
            .with_parameters(vec!["int".into(), "java.lang.String".into()]);
        assert_eq!(method.signature(), "bar(int,java.lang.String)");
        assert!(method.accepts_arguments(2));
        assert!(!method.accepts_arguments(1));

        let constructor = SynthesizedMethod::new("test.Test", CONSTRUCTOR_NAME);
        assert!(constructor.is_constructor());
        assert_eq!(constructor.signature(), "<init>()");
    }
}

use super::{MethodBinding, TypeBinding, VariableBinding};
use std::rc::Rc;

/// Type binding built from source or derived from another binding.
#[derive(Debug, Clone)]
pub struct SynthesizedType {
    qualified_name: String,
    interface: bool,
    superclass: Option<String>,
    interfaces: Vec<String>,
    methods: Vec<Rc<dyn MethodBinding>>,
    fields: Vec<Rc<dyn VariableBinding>>,
}

impl SynthesizedType {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            interface: false,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Copy of any binding, so that it can be modified.
    pub fn copy_of(binding: &dyn TypeBinding) -> Self {
        Self {
            qualified_name: binding.qualified_name().to_string(),
            interface: binding.is_interface(),
            superclass: binding.superclass().map(str::to_string),
            interfaces: binding.interfaces().to_vec(),
            methods: binding.declared_methods(),
            fields: binding.declared_fields(),
        }
    }

    pub fn interface(mut self, interface: bool) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_superclass(mut self, superclass: Option<String>) -> Self {
        self.superclass = superclass;
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_methods(mut self, methods: Vec<Rc<dyn MethodBinding>>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Rc<dyn VariableBinding>>) -> Self {
        self.fields = fields;
        self
    }
}

impl TypeBinding for SynthesizedType {
    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn is_interface(&self) -> bool {
        self.interface
    }

    fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    fn declared_methods(&self) -> Vec<Rc<dyn MethodBinding>> {
        self.methods.clone()
    }

    fn declared_fields(&self) -> Vec<Rc<dyn VariableBinding>> {
        self.fields.clone()
    }
}

#[derive(Debug, Clone)]
pub struct SynthesizedMethod {
    name: String,
    declaring_type: String,
    parameter_types: Vec<String>,
    return_type: String,
    exception_types: Vec<String>,
    is_static: bool,
    varargs: bool,
}

impl SynthesizedMethod {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            parameter_types: Vec::new(),
            return_type: "void".to_string(),
            exception_types: Vec::new(),
            is_static: false,
            varargs: false,
        }
    }

    pub fn copy_of(binding: &dyn MethodBinding) -> Self {
        Self {
            name: binding.name().to_string(),
            declaring_type: binding.declaring_type().to_string(),
            parameter_types: binding.parameter_types().to_vec(),
            return_type: binding.return_type().to_string(),
            exception_types: binding.exception_types().to_vec(),
            is_static: binding.is_static(),
            varargs: binding.is_varargs(),
        }
    }

    pub fn with_parameters(mut self, parameter_types: Vec<String>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn with_exceptions(mut self, exception_types: Vec<String>) -> Self {
        self.exception_types = exception_types;
        self
    }

    pub fn with_exception(mut self, exception_type: impl Into<String>) -> Self {
        self.exception_types.push(exception_type.into());
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_varargs(mut self, varargs: bool) -> Self {
        self.varargs = varargs;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Copy without the parameter at `index`; unchanged when out of range.
    pub fn without_parameter(mut self, index: usize) -> Self {
        if index < self.parameter_types.len() {
            self.parameter_types.remove(index);
        }
        self
    }
}

impl MethodBinding for SynthesizedMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    fn return_type(&self) -> &str {
        &self.return_type
    }

    fn exception_types(&self) -> &[String] {
        &self.exception_types
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn is_varargs(&self) -> bool {
        self.varargs
    }
}

#[derive(Debug, Clone)]
pub struct SynthesizedVariable {
    pub name: String,
    pub type_name: String,
    pub field: bool,
    pub is_static: bool,
    pub declaring_type: Option<String>,
}

impl VariableBinding for SynthesizedVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_field(&self) -> bool {
        self.field
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }
}

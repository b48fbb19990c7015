//! The class path oracle: descriptions of types that exist outside the
//! edited unit.

use super::{MethodBinding, TypeBinding, VariableBinding};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

const JDK: &str = include_str!("jdk.json");

/// Serialized description of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default = "void")]
    pub return_type: String,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub varargs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_static: bool,
}

fn void() -> String {
    "void".to_string()
}

/// Read-only registry of known types, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    types: HashMap<String, Rc<TypeInfo>>,
}

impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in subset of the JDK.
    pub fn with_jdk() -> Self {
        match Self::from_json(JDK) {
            Ok(class_path) => class_path,
            Err(e) => {
                warn!(error = %e, "built-in JDK descriptions are unreadable");
                Self::new()
            }
        }
    }

    /// A JSON array of `TypeInfo`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut class_path = Self::new();
        class_path.extend_from_json(json)?;
        Ok(class_path)
    }

    pub fn extend_from_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let infos: Vec<TypeInfo> = serde_json::from_str(json)?;
        debug!(count = infos.len(), "loaded type descriptions");
        for info in infos {
            self.add(info);
        }
        Ok(())
    }

    pub fn add(&mut self, info: TypeInfo) {
        self.types.insert(info.name.clone(), Rc::new(info));
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<Rc<dyn TypeBinding>> {
        let info = self.types.get(qualified_name)?;
        Some(Rc::new(ClassPathType { info: Rc::clone(info) }))
    }

    /// Qualified names of the top-level and nested types whose qualifier
    /// is exactly `package`.
    pub fn types_in_package(&self, package: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .keys()
            .filter(|name| super::qualifier(name) == package)
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug)]
struct ClassPathType {
    info: Rc<TypeInfo>,
}

impl TypeBinding for ClassPathType {
    fn qualified_name(&self) -> &str {
        &self.info.name
    }

    fn is_interface(&self) -> bool {
        self.info.is_interface
    }

    fn superclass(&self) -> Option<&str> {
        match &self.info.superclass {
            Some(superclass) => Some(superclass),
            None if self.info.is_interface || self.info.name == "java.lang.Object" => None,
            None => Some("java.lang.Object"),
        }
    }

    fn interfaces(&self) -> &[String] {
        &self.info.interfaces
    }

    fn declared_methods(&self) -> Vec<Rc<dyn MethodBinding>> {
        (0..self.info.methods.len())
            .map(|index| {
                Rc::new(ClassPathMethod {
                    info: Rc::clone(&self.info),
                    index,
                }) as Rc<dyn MethodBinding>
            })
            .collect()
    }

    fn declared_fields(&self) -> Vec<Rc<dyn VariableBinding>> {
        (0..self.info.fields.len())
            .map(|index| {
                Rc::new(ClassPathField {
                    info: Rc::clone(&self.info),
                    index,
                }) as Rc<dyn VariableBinding>
            })
            .collect()
    }
}

#[derive(Debug)]
struct ClassPathMethod {
    info: Rc<TypeInfo>,
    index: usize,
}

impl ClassPathMethod {
    fn method(&self) -> &MethodInfo {
        &self.info.methods[self.index]
    }
}

impl MethodBinding for ClassPathMethod {
    fn name(&self) -> &str {
        &self.method().name
    }

    fn declaring_type(&self) -> &str {
        &self.info.name
    }

    fn parameter_types(&self) -> &[String] {
        &self.method().parameters
    }

    fn return_type(&self) -> &str {
        &self.method().return_type
    }

    fn exception_types(&self) -> &[String] {
        &self.method().exceptions
    }

    fn is_static(&self) -> bool {
        self.method().is_static
    }

    fn is_varargs(&self) -> bool {
        self.method().varargs
    }
}

#[derive(Debug)]
struct ClassPathField {
    info: Rc<TypeInfo>,
    index: usize,
}

impl VariableBinding for ClassPathField {
    fn name(&self) -> &str {
        &self.info.fields[self.index].name
    }

    fn type_name(&self) -> &str {
        &self.info.fields[self.index].type_name
    }

    fn is_field(&self) -> bool {
        true
    }

    fn is_static(&self) -> bool {
        self.info.fields[self.index].is_static
    }

    fn declaring_type(&self) -> Option<&str> {
        Some(&self.info.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jdk_loads() {
        let class_path = ClassPath::with_jdk();
        let object = class_path.lookup("java.lang.Object").unwrap();
        assert_eq!(object.superclass(), None);
        assert!(object.declared_methods().iter().any(|m| m.signature() == "hashCode()"));

        let list = class_path.lookup("java.awt.List").unwrap();
        assert_eq!(list.superclass(), Some("java.awt.Component"));
        assert_eq!(list.simple_name(), "List");
    }

    #[test]
    fn test_implicit_object_superclass() {
        let class_path = ClassPath::with_jdk();
        assert_eq!(
            class_path.lookup("java.lang.Throwable").unwrap().superclass(),
            Some("java.lang.Object")
        );
        assert_eq!(class_path.lookup("java.lang.Runnable").unwrap().superclass(), None);
    }

    #[test]
    fn test_from_json_defaults() {
        let class_path = ClassPath::from_json(
            r#"[{"name": "p.Foo", "methods": [{"name": "bar", "parameters": ["int"]}],
                 "fields": [{"name": "X", "type": "int", "is_static": true}]}]"#,
        )
        .unwrap();
        let foo = class_path.lookup("p.Foo").unwrap();
        let methods = foo.declared_methods();
        assert_eq!(methods[0].signature(), "bar(int)");
        assert_eq!(methods[0].return_type(), "void");
        assert_eq!(methods[0].declaring_type(), "p.Foo");
        assert_eq!(foo.declared_fields()[0].type_name(), "int");
        assert!(class_path.lookup("p.Bar").is_none());
    }

    #[test]
    fn test_types_in_package() {
        let class_path = ClassPath::with_jdk();
        let names = class_path.types_in_package("java.awt.event");
        assert_eq!(names, vec!["java.awt.event.ActionEvent", "java.awt.event.ActionListener"]);
        assert_eq!(class_path.types_in_package("java.util.Map"), vec!["java.util.Map.Entry"]);
    }

    #[test]
    fn test_bad_json() {
        assert!(ClassPath::from_json("{").is_err());
    }
}

//! [`ConfigElement`] – one node of the robot configuration tree.
//!
//! # Example
//!
//! ```rust
//! use revolve_config::ConfigElement;
//!
//! let robot = ConfigElement::new("rv:robot_config")
//!     .with_child(ConfigElement::new("rv:update_rate").with_value("8"));
//!
//! assert!(robot.has_element("rv:update_rate"));
//! let rate: f64 = robot.element("rv:update_rate").unwrap().get().unwrap();
//! assert_eq!(rate, 8.0);
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::slice;
use std::str::FromStr;

use revolve_types::RevolveError;
use serde::{Deserialize, Serialize};

/// A named configuration node with attributes, an optional text value, and
/// ordered children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigElement>,
}

impl ConfigElement {
    /// Create an empty element called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: set attribute `key` to `value`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    /// Builder: set the element's text value.
    pub fn with_value(mut self, value: impl Display) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Builder: append `child` after any existing children.
    pub fn with_child(mut self, child: ConfigElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// `true` if at least one direct child is called `name`.
    pub fn has_element(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }

    /// First direct child called `name`, if any.
    pub fn find(&self, name: &str) -> Option<&ConfigElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Mutable access to the first direct child called `name`, if any.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut ConfigElement> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// First direct child called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RevolveError::MissingElement`] when no such child exists.
    pub fn element(&self, name: &str) -> Result<&ConfigElement, RevolveError> {
        self.find(name).ok_or_else(|| self.missing(name))
    }

    /// Mutable variant of [`element`][Self::element].
    pub fn element_mut(&mut self, name: &str) -> Result<&mut ConfigElement, RevolveError> {
        let parent = self.name.clone();
        self.find_mut(name).ok_or_else(|| RevolveError::MissingElement {
            parent,
            name: name.to_string(),
        })
    }

    /// Iterate every direct child called `name`, in document order.
    ///
    /// Each call returns a fresh iterator, so the sequence can be walked as
    /// many times as needed.
    pub fn elements<'a>(&'a self, name: &'a str) -> Elements<'a> {
        Elements {
            name,
            inner: self.children.iter(),
        }
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Raw text of attribute `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RevolveError::MissingAttribute`] when the attribute is absent.
    pub fn attribute_str(&self, key: &str) -> Result<&str, RevolveError> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| RevolveError::MissingAttribute {
                element: self.name.clone(),
                attribute: key.to_string(),
            })
    }

    /// Attribute `key` parsed as `T`.
    ///
    /// # Errors
    ///
    /// [`RevolveError::MissingAttribute`] when absent,
    /// [`RevolveError::TypeMismatch`] when the text does not parse.
    pub fn attribute<T: FromStr>(&self, key: &str) -> Result<T, RevolveError> {
        let text = self.attribute_str(key)?;
        self.parse(text)
    }

    /// Attribute `key` parsed as `T`, or `default` when the attribute is
    /// absent. A present but malformed attribute is still an error.
    pub fn attribute_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, RevolveError> {
        match self.attributes.get(key) {
            Some(text) => self.parse(text),
            None => Ok(default),
        }
    }

    // -----------------------------------------------------------------------
    // Value
    // -----------------------------------------------------------------------

    /// The element's text value parsed as `T`. An element without a value
    /// reads as the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`RevolveError::TypeMismatch`] when the text does not parse.
    pub fn get<T: FromStr>(&self) -> Result<T, RevolveError> {
        self.parse(self.value.as_deref().unwrap_or(""))
    }

    /// Overwrite the element's text value.
    pub fn set(&mut self, value: impl Display) {
        self.value = Some(value.to_string());
    }

    fn parse<T: FromStr>(&self, text: &str) -> Result<T, RevolveError> {
        text.trim()
            .parse::<T>()
            .map_err(|_| RevolveError::TypeMismatch {
                element: self.name.clone(),
                expected: std::any::type_name::<T>(),
                text: text.to_string(),
            })
    }

    fn missing(&self, name: &str) -> RevolveError {
        RevolveError::MissingElement {
            parent: self.name.clone(),
            name: name.to_string(),
        }
    }
}

/// Iterator over same-named siblings, returned by [`ConfigElement::elements`].
#[derive(Clone)]
pub struct Elements<'a> {
    name: &'a str,
    inner: slice::Iter<'a, ConfigElement>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a ConfigElement;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.name;
        self.inner.find(|c| c.name == name)
    }
}

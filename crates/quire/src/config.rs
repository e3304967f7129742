//! YAML configuration for method tables and loader behavior.
//!
//! The defaults cover HTML, XHTML, XML, text, JS, CSS and SVG. A config
//! document can add or override entries:
//!
//! ```yaml
//! auto_reload: true
//! extensions:
//!   atom: atom
//!   htm: html5
//! methods:
//!   atom:
//!     serializer: xml
//!     mimetype: application/atom+xml
//!   email:
//!     serializer: text
//!     kind: text
//! ```
//!
//! Every serializer and doctype name is checked when the config is applied,
//! and every extension must point at a method that exists afterwards.

use std::collections::BTreeMap;

use quire_markup::{DocType, SerializerKind};
use serde::{Deserialize, Serialize};

use crate::error::QuireError;
use crate::method::{MethodSpec, MethodTable, TemplateKind};

/// One method entry of a config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodConfig {
    pub serializer: String,
    #[serde(default)]
    pub doctype: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub kind: TemplateKind,
}

impl MethodConfig {
    fn to_spec(&self, name: &str) -> Result<MethodSpec, QuireError> {
        let serializer: SerializerKind = self
            .serializer
            .parse()
            .map_err(|e| QuireError::Config(format!("method {name:?}: {e}")))?;
        if let Some(doctype) = &self.doctype {
            DocType::get(doctype).map_err(|e| QuireError::Config(format!("method {name:?}: {e}")))?;
        }
        Ok(MethodSpec {
            serializer,
            doctype: self.doctype.clone(),
            mimetype: self.mimetype.clone(),
            kind: self.kind,
        })
    }
}

/// Overrides for the extension's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuireConfig {
    /// Extension (without dot) to method name.
    pub extensions: BTreeMap<String, String>,
    /// Method name to method definition.
    pub methods: BTreeMap<String, MethodConfig>,
    /// Re-parse changed template files. Defaults to the application's
    /// debug flag when unset.
    pub auto_reload: Option<bool>,
}

impl QuireConfig {
    /// Parses a YAML config document.
    pub fn from_yaml(yaml: &str) -> Result<Self, QuireError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML config file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, QuireError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Applies the overrides to `table`.
    ///
    /// The table is left untouched when any entry is invalid.
    pub fn apply(&self, table: &mut MethodTable) -> Result<(), QuireError> {
        let mut updated = table.clone();
        for (name, method) in &self.methods {
            updated.set_method(name.clone(), method.to_spec(name)?);
        }
        for (extension, method) in &self.extensions {
            if updated.get(method).is_err() {
                return Err(QuireError::Config(format!(
                    "extension {extension:?} maps to unknown method {method:?}"
                )));
            }
            updated.set_extension(extension.trim_start_matches('.'), method.clone());
        }
        *table = updated;
        Ok(())
    }
}

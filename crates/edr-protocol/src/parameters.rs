//! Parameter metadata as published by EDR collections and CoverageJSON documents.
//!
//! Only labels and units are read. Catalogs differ in how much of this they
//! fill in, so all of it is optional.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl Parameter {
    /// Unit symbol, if the catalog provided one.
    pub fn unit_symbol(&self) -> Option<&str> {
        self.unit.as_ref().and_then(Unit::symbol_str)
    }
}

/// Plain or language-keyed text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Label {
    Plain(String),
    ByLanguage(HashMap<String, String>),
}

impl Label {
    /// English text when present, otherwise any language.
    pub fn text(&self) -> &str {
        match self {
            Label::Plain(s) => s,
            Label::ByLanguage(map) => map
                .get("en")
                .or_else(|| map.values().next())
                .map_or("", String::as_str),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<UnitSymbol>,
}

impl Unit {
    /// Symbol text, falling back to the label when no symbol is given.
    pub fn symbol_str(&self) -> Option<&str> {
        self.symbol
            .as_ref()
            .map(UnitSymbol::value)
            .or_else(|| self.label.as_ref().map(Label::text))
    }
}

/// Either `"K"` or `{"value": "K", "type": "<UCUM uri>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UnitSymbol {
    Plain(String),
    Typed {
        value: String,
        #[serde(rename = "type", default)]
        type_: Option<String>,
    },
}

impl UnitSymbol {
    pub fn value(&self) -> &str {
        match self {
            UnitSymbol::Plain(s) => s,
            UnitSymbol::Typed { value, .. } => value,
        }
    }
}

//! Matcher configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options controlling how differential elements are aligned to the base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatcherSettings {
    /// Treat extension elements as sliced by url even without a slicing
    /// declaration
    pub implicit_extension_slicing: bool,

    /// Match renamed choice elements (`valueString`) against `value[x]`
    pub match_choice_renames: bool,

    /// Separator between parent and child in reslice names (`dog/schnauzer`)
    pub reslice_separator: char,

    /// Report slicing declarations without discriminators
    pub report_missing_discriminators: bool,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            implicit_extension_slicing: true,
            match_choice_renames: true,
            reslice_separator: '/',
            report_missing_discriminators: true,
        }
    }
}

impl MatcherSettings {
    /// Parse from JSON Value. Missing keys keep their defaults.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

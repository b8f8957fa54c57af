// Process parameter catalog - static description of selectable parameters
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub label: String,
    pub unit: String,
    /// Chart axis lower bound
    pub min: f64,
    /// Chart axis upper bound
    pub max: f64,
    pub target: f64,
    pub spec_min: f64,
    pub spec_max: f64,
}

impl Parameter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        label: &str,
        unit: &str,
        min: f64,
        max: f64,
        target: f64,
        spec_min: f64,
        spec_max: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            unit: unit.to_string(),
            min,
            max,
            target,
            spec_min,
            spec_max,
        }
    }

    /// True when the value lies outside the regulatory limits
    pub fn is_out_of_spec(&self, value: f64) -> bool {
        value < self.spec_min || value > self.spec_max
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("unknown parameter: {0}")]
    NotFound(String),
    #[error("duplicate parameter id: {0}")]
    Duplicate(String),
    #[error("parameter catalog is empty")]
    Empty,
}

/// Read-only registry of parameters, built once at startup and shared by `Arc`.
#[derive(Debug, Clone)]
pub struct ParameterCatalog {
    parameters: Vec<Parameter>,
}

impl ParameterCatalog {
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, CatalogError> {
        if parameters.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for parameter in &parameters {
            if !seen.insert(parameter.id.as_str()) {
                return Err(CatalogError::Duplicate(parameter.id.clone()));
            }
        }

        Ok(Self { parameters })
    }

    /// The five batch parameters the analytics backend accepts for trends
    pub fn builtin() -> Self {
        Self {
            parameters: vec![
                Parameter::new("hardness", "Hardness", "N", 60.0, 120.0, 88.0, 70.0, 110.0),
                Parameter::new("yield_percent", "Yield", "%", 90.0, 100.0, 98.0, 95.0, 100.0),
                Parameter::new("compression_force", "Compression force", "kN", 14.0, 26.0, 20.0, 17.0, 23.0),
                Parameter::new("weight", "Tablet weight", "mg", 485.0, 515.0, 500.0, 490.0, 510.0),
                Parameter::new("thickness", "Thickness", "mm", 3.6, 4.4, 4.0, 3.8, 4.2),
            ],
        }
    }

    pub fn by_id(&self, id: &str) -> Result<&Parameter, CatalogError> {
        self.parameters
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parameters.iter().any(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }
}

//! Design description shared by every case in a suite.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SuiteError};

/// One physical component inside a block (pin, clad, duct, coolant...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Component name, unique within its block.
    pub name: String,
    /// Geometric shape label.
    pub shape: String,
    /// Material label.
    pub material: String,
    /// Named dimensions (temperatures, radii, pitches...).
    #[serde(default)]
    pub dimensions: BTreeMap<String, f64>,
}

impl ComponentSpec {
    /// Returns the dimension `name` or a lookup error naming it.
    pub fn dimension(&self, name: &str) -> Result<f64, SuiteError> {
        self.dimensions.get(name).copied().ok_or_else(|| {
            SuiteError::Lookup(
                ErrorInfo::new("missing-dimension", format!("dimension `{name}` not found"))
                    .with_context("component", self.name.clone())
                    .with_context("dimension", name),
            )
        })
    }
}

/// An ordered set of components making up one axial block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    /// Block name, unique within the blueprint.
    pub name: String,
    /// Components in declaration order.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

impl BlockSpec {
    /// Returns the component `name` or a lookup error naming it.
    pub fn component(&self, name: &str) -> Result<&ComponentSpec, SuiteError> {
        self.components
            .iter()
            .find(|component| component.name == name)
            .ok_or_else(|| missing_component(&self.name, name))
    }

    fn component_mut(&mut self, name: &str) -> Result<&mut ComponentSpec, SuiteError> {
        let block = self.name.clone();
        self.components
            .iter_mut()
            .find(|component| component.name == name)
            .ok_or_else(|| missing_component(&block, name))
    }
}

/// Axial stack of block references, bottom to top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblySpec {
    /// Assembly name.
    pub name: String,
    /// Block names from bottom to top; order is significant.
    pub blocks: Vec<String>,
}

/// Structured design description cloned into every derived case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Blueprint name.
    pub name: String,
    /// Block definitions.
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    /// Assemblies stacking the blocks.
    #[serde(default)]
    pub assemblies: Vec<AssemblySpec>,
}

fn missing_component(block: &str, component: &str) -> SuiteError {
    SuiteError::Lookup(
        ErrorInfo::new(
            "missing-component",
            format!("component `{component}` not found in block `{block}`"),
        )
        .with_context("block", block)
        .with_context("component", component),
    )
}

impl Blueprint {
    /// Creates an empty blueprint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            assemblies: Vec::new(),
        }
    }

    /// Returns the block `name` or a lookup error naming it.
    pub fn block(&self, name: &str) -> Result<&BlockSpec, SuiteError> {
        self.blocks
            .iter()
            .find(|block| block.name == name)
            .ok_or_else(|| SuiteError::lookup("block", name))
    }

    /// Returns the component `component` of block `block`.
    pub fn component(&self, block: &str, component: &str) -> Result<&ComponentSpec, SuiteError> {
        self.block(block)?.component(component)
    }

    /// Returns a copy with one component dimension replaced.
    ///
    /// The dimension must already exist; modifiers only perturb declared
    /// dimensions.
    pub fn with_dimension(
        &self,
        block: &str,
        component: &str,
        dimension: &str,
        value: f64,
    ) -> Result<Self, SuiteError> {
        let mut next = self.clone();
        let target = next
            .blocks
            .iter_mut()
            .find(|candidate| candidate.name == block)
            .ok_or_else(|| SuiteError::lookup("block", block))?
            .component_mut(component)?;
        target.dimension(dimension)?;
        target.dimensions.insert(dimension.to_string(), value);
        Ok(next)
    }

    /// Checks name uniqueness and that assemblies reference known blocks.
    pub fn validate(&self) -> Result<(), SuiteError> {
        let mut blocks = BTreeSet::new();
        for block in &self.blocks {
            if !blocks.insert(block.name.as_str()) {
                return Err(SuiteError::Configuration(
                    ErrorInfo::new("duplicate-block", "block defined twice")
                        .with_context("block", block.name.clone()),
                ));
            }
            let mut components = BTreeSet::new();
            for component in &block.components {
                if !components.insert(component.name.as_str()) {
                    return Err(SuiteError::Configuration(
                        ErrorInfo::new("duplicate-component", "component defined twice")
                            .with_context("block", block.name.clone())
                            .with_context("component", component.name.clone()),
                    ));
                }
            }
        }
        for assembly in &self.assemblies {
            if let Some(missing) = assembly
                .blocks
                .iter()
                .find(|name| !blocks.contains(name.as_str()))
            {
                return Err(SuiteError::Lookup(
                    ErrorInfo::new(
                        "missing-block",
                        format!("block `{missing}` not found"),
                    )
                    .with_context("assembly", assembly.name.clone())
                    .with_context("block", missing.clone()),
                ));
            }
        }
        Ok(())
    }
}

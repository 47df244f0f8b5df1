use std::fmt;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use suite_core::errors::{ErrorInfo, SuiteError};
use tracing::{debug, info};

use crate::case::Case;
use crate::context::SuiteContext;
use crate::modifier::{ModifierSet, SharedModifier, Unmodified};
use crate::suite::Suite;

/// How registered degrees of freedom are expanded into modifier sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExpansionPolicy {
    /// Cartesian product of every degree of freedom.
    FullFactorial,
    /// Each value of each degree of freedom alone, all others at base.
    SeparateEffects,
    /// Stratified sample of `samples` combinations.
    LatinHypercube { samples: usize, seed: u64 },
}

/// Custom case naming: `(index, modifier set) -> name`.
pub type NamingFn = Box<dyn Fn(usize, &ModifierSet) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Empty,
    Accumulating,
    Built,
}

/// Accumulates degrees of freedom and expands them into a [`Suite`].
///
/// Lifecycle: `Empty -> Accumulating -> Built`. Once a suite was built the
/// builder accepts neither new degrees of freedom nor another build.
pub struct SuiteBuilder {
    base: Case,
    policy: ExpansionPolicy,
    degrees_of_freedom: Vec<Vec<SharedModifier>>,
    naming: Option<NamingFn>,
    state: BuilderState,
}

impl fmt::Debug for SuiteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteBuilder")
            .field("base", &self.base.name())
            .field("policy", &self.policy)
            .field("degrees_of_freedom", &self.degrees_of_freedom.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SuiteBuilder {
    pub fn new(base: Case, policy: ExpansionPolicy) -> Self {
        Self {
            base,
            policy,
            degrees_of_freedom: Vec::new(),
            naming: None,
            state: BuilderState::Empty,
        }
    }

    pub fn full_factorial(base: Case) -> Self {
        Self::new(base, ExpansionPolicy::FullFactorial)
    }

    pub fn separate_effects(base: Case) -> Self {
        Self::new(base, ExpansionPolicy::SeparateEffects)
    }

    /// Replaces the context's naming scheme with a custom function.
    pub fn with_naming<F>(mut self, naming: F) -> Self
    where
        F: Fn(usize, &ModifierSet) -> String + Send + Sync + 'static,
    {
        self.naming = Some(Box::new(naming));
        self
    }

    pub fn policy(&self) -> &ExpansionPolicy {
        &self.policy
    }

    pub fn base(&self) -> &Case {
        &self.base
    }

    /// Lengths of the registered degrees of freedom, in order.
    pub fn shape(&self) -> Vec<usize> {
        self.degrees_of_freedom.iter().map(Vec::len).collect()
    }

    pub fn is_built(&self) -> bool {
        self.state == BuilderState::Built
    }

    /// Registers one degree of freedom.
    ///
    /// Each modifier's independent variables are checked against its declared
    /// schema. Zero-length degrees of freedom are accepted here and rejected
    /// by [`SuiteBuilder::build_suite`].
    pub fn add_degree_of_freedom<I>(&mut self, modifiers: I) -> Result<(), SuiteError>
    where
        I: IntoIterator<Item = SharedModifier>,
    {
        if self.state == BuilderState::Built {
            return Err(SuiteError::Configuration(
                ErrorInfo::new("builder-built", "suite already built")
                    .with_hint("create a new builder to add degrees of freedom"),
            ));
        }
        let modifiers: Vec<SharedModifier> = modifiers.into_iter().collect();
        let position = self.degrees_of_freedom.len();
        for modifier in &modifiers {
            modifier
                .independent_variables()
                .validate(&modifier.schema())
                .map_err(|err| err.with_context("degree_of_freedom", position.to_string()))?;
        }
        debug!(position, members = modifiers.len(), "registered degree of freedom");
        self.degrees_of_freedom.push(modifiers);
        self.state = BuilderState::Accumulating;
        Ok(())
    }

    /// Expands the registered degrees of freedom without applying them.
    pub fn expand(&self) -> Result<Vec<ModifierSet>, SuiteError> {
        if let Some(position) = self.degrees_of_freedom.iter().position(Vec::is_empty) {
            return Err(SuiteError::Configuration(
                ErrorInfo::new(
                    "empty-degree-of-freedom",
                    "degree of freedom has no modifiers",
                )
                .with_context("degree_of_freedom", position.to_string()),
            ));
        }
        if self.degrees_of_freedom.is_empty() {
            return Ok(vec![ModifierSet::new(Vec::new())]);
        }
        match &self.policy {
            ExpansionPolicy::FullFactorial => {
                let mut outputs = Vec::new();
                expand_factorial(&self.degrees_of_freedom, 0, Vec::new(), &mut outputs);
                Ok(outputs)
            }
            ExpansionPolicy::SeparateEffects => Ok(expand_separate(&self.degrees_of_freedom)),
            ExpansionPolicy::LatinHypercube { samples, seed } => {
                expand_lhs(&self.degrees_of_freedom, *samples, *seed)
            }
        }
    }

    /// Expands, applies each modifier set to a clone of the base case and
    /// collects the derived cases into a suite.
    ///
    /// Any modifier failure aborts the whole build. On success the builder
    /// is terminal.
    pub fn build_suite(&mut self, ctx: &SuiteContext) -> Result<Suite, SuiteError> {
        if self.state == BuilderState::Built {
            return Err(SuiteError::Configuration(ErrorInfo::new(
                "builder-built",
                "suite already built",
            )));
        }
        self.base.blueprint().validate()?;
        let sets = self.expand()?;
        let mut cases = Vec::with_capacity(sets.len());
        for (index, set) in sets.iter().enumerate() {
            let name = match &self.naming {
                Some(naming) => naming(index, set),
                None => ctx.naming.name(self.base.title(), index),
            };
            if ctx.layout.is_reserved_name(&name) {
                return Err(SuiteError::Configuration(
                    ErrorInfo::new(
                        "case-name-reserved",
                        "case name ends with the blueprint suffix",
                    )
                    .with_context("case", name)
                    .with_hint(format!(
                        "names must not end with `{}`",
                        ctx.layout.design_suffix
                    )),
                ));
            }
            let (settings, blueprint) = set
                .apply(self.base.settings(), self.base.blueprint())
                .map_err(|err| err.with_context("case", name.clone()))?;
            ctx.schema
                .validate(&settings)
                .map_err(|err| err.with_context("case", name.clone()))?;
            debug!(case = %name, modifiers = %set.label(), "derived case");
            cases.push(Case::derived(
                &self.base,
                name.clone(),
                index,
                settings,
                blueprint,
                set.independent_variables(),
                ctx.case_dir(&name),
            ));
        }
        let suite = Suite::new(cases)?;
        self.state = BuilderState::Built;
        info!(
            title = %self.base.title(),
            policy = ?self.policy,
            cases = suite.len(),
            "built suite"
        );
        Ok(suite)
    }
}

fn expand_factorial(
    dofs: &[Vec<SharedModifier>],
    depth: usize,
    current: Vec<SharedModifier>,
    outputs: &mut Vec<ModifierSet>,
) {
    if depth == dofs.len() {
        outputs.push(ModifierSet::new(current));
        return;
    }
    for modifier in &dofs[depth] {
        let mut next = current.clone();
        next.push(modifier.clone());
        expand_factorial(dofs, depth + 1, next, outputs);
    }
}

fn expand_separate(dofs: &[Vec<SharedModifier>]) -> Vec<ModifierSet> {
    let mut outputs = Vec::new();
    for (position, dof) in dofs.iter().enumerate() {
        for modifier in dof {
            let modifiers = (0..dofs.len())
                .map(|other| {
                    if other == position {
                        modifier.clone()
                    } else {
                        Unmodified::shared()
                    }
                })
                .collect();
            outputs.push(ModifierSet::new(modifiers));
        }
    }
    outputs
}

fn expand_lhs(
    dofs: &[Vec<SharedModifier>],
    samples: usize,
    seed: u64,
) -> Result<Vec<ModifierSet>, SuiteError> {
    if samples == 0 {
        return Err(SuiteError::Configuration(ErrorInfo::new(
            "lhs-empty",
            "latin hypercube sampling requires at least one sample",
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let base_slots: Vec<f64> = (0..samples)
        .map(|i| (i as f64 + 0.5) / samples as f64)
        .collect();
    let mut outputs: Vec<Vec<SharedModifier>> = vec![Vec::with_capacity(dofs.len()); samples];
    for dof in dofs {
        let mut slots = base_slots.clone();
        slots.shuffle(&mut rng);
        for (idx, frac) in slots.into_iter().enumerate() {
            let member = ((frac * dof.len() as f64) as usize).min(dof.len() - 1);
            outputs[idx].push(dof[member].clone());
        }
    }
    Ok(outputs.into_iter().map(ModifierSet::new).collect())
}

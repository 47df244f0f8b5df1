//! Parameter-sweep suite construction, artifact writing and discovery.
//!
//! A [`SuiteBuilder`] expands degrees of freedom (lists of [`Modifier`]s)
//! into modifier sets, applies each set to a clone of the base [`Case`] and
//! collects the results into a [`Suite`]. Suites write one self-contained
//! input directory per case and can be rebuilt later with
//! [`Suite::discover`].

mod builder;
mod case;
mod context;
mod hash;
mod modifier;
mod plan;
mod runner;
mod serde;
mod suite;
mod table;

pub use builder::{ExpansionPolicy, NamingFn, SuiteBuilder};
pub use case::Case;
pub use context::{CaseNaming, InputLayout, SuiteContext};
pub use hash::stable_hash_string;
pub use modifier::{
    DimensionModifier, Modifier, ModifierSet, MultiSettingsModifier, SettingsModifier,
    SharedModifier, Unmodified,
};
pub use plan::{load_plan, ModifierSpec, SweepPlan};
pub use runner::{CaseRunner, CommandRunner, RunOutcome};
pub use suite::{DiscoverOpts, Suite, WriteOpts};
pub use table::Table;

pub use crate::serde::{from_yaml_slice, to_canonical_json_bytes, to_yaml_string};

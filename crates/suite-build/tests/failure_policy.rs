use std::fs;
use std::sync::Arc;

use suite_build::{
    Case, CaseRunner, DimensionModifier, DiscoverOpts, InputLayout, Modifier, RunOutcome,
    SettingsModifier, SharedModifier, Suite, SuiteBuilder, SuiteContext, WriteOpts,
};
use suite_core::{
    BlockSpec, Blueprint, ComponentSpec, ErrorInfo, IndependentVariables, SettingKind,
    SettingValue, Settings, SettingsSchema, SuiteError, VariableSchema,
};

fn blueprint() -> Blueprint {
    Blueprint {
        name: "core".into(),
        blocks: vec![BlockSpec {
            name: "fuel".into(),
            components: vec![ComponentSpec {
                name: "fuel".into(),
                shape: "circle".into(),
                material: "UZr".into(),
                dimensions: [("od".to_string(), 0.6)].into_iter().collect(),
            }],
        }],
        assemblies: Vec::new(),
    }
}

fn base() -> Case {
    Case::new("fail", Settings::new().with("power", 1.0e6), blueprint())
}

fn settings_dof(values: &[f64]) -> Vec<SharedModifier> {
    values
        .iter()
        .map(|value| Arc::new(SettingsModifier::new("power", *value)) as SharedModifier)
        .collect()
}

/// Scales the fuel diameter by a smear fraction.
#[derive(Debug)]
struct SmearModifier {
    variables: IndependentVariables,
}

impl SmearModifier {
    fn new(smear: impl Into<SettingValue>) -> Self {
        Self {
            variables: IndependentVariables::new().with("smear", smear),
        }
    }
}

impl Modifier for SmearModifier {
    fn apply(
        &self,
        settings: &Settings,
        design: &Blueprint,
    ) -> Result<(Settings, Blueprint), SuiteError> {
        let smear = self
            .variables
            .get("smear")
            .and_then(SettingValue::as_f64)
            .ok_or_else(|| SuiteError::lookup("variable", "smear"))?;
        let od = design.component("fuel", "fuel")?.dimension("od")?;
        let design = design.with_dimension("fuel", "fuel", "od", od * smear)?;
        Ok((settings.clone(), design))
    }

    fn independent_variables(&self) -> &IndependentVariables {
        &self.variables
    }

    fn schema(&self) -> VariableSchema {
        VariableSchema::new().declare("smear", SettingKind::Number)
    }
}

#[test]
fn missing_design_element_aborts_the_build() {
    let mut builder = SuiteBuilder::full_factorial(base());
    builder
        .add_degree_of_freedom(settings_dof(&[1.0e6, 2.0e6]))
        .expect("register");
    builder
        .add_degree_of_freedom([
            Arc::new(DimensionModifier::new("fuel", "fuel", "od", 0.7)) as SharedModifier,
            Arc::new(DimensionModifier::new("reflector", "fuel", "od", 0.7)) as SharedModifier,
        ])
        .expect("register");
    let err = builder
        .build_suite(&SuiteContext::new("out"))
        .expect_err("lookup failure");
    assert_eq!(err.family(), "lookup");
    assert_eq!(err.info().context["block"], "reflector");
    assert_eq!(err.info().context["case"], "fail-0001");
    assert!(!builder.is_built());
}

#[test]
fn user_modifier_with_schema() {
    let mut builder = SuiteBuilder::separate_effects(base());
    builder
        .add_degree_of_freedom([
            Arc::new(SmearModifier::new(0.5)) as SharedModifier,
            Arc::new(SmearModifier::new(1i64)) as SharedModifier,
        ])
        .expect("register");
    let suite = builder.build_suite(&SuiteContext::new("out")).expect("build");
    let od = suite.cases()[0]
        .blueprint()
        .component("fuel", "fuel")
        .unwrap()
        .dimension("od")
        .unwrap();
    assert!((od - 0.3).abs() < 1e-12);

    let mut rejected = SuiteBuilder::separate_effects(base());
    let err = rejected
        .add_degree_of_freedom([Arc::new(SmearModifier::new("half")) as SharedModifier])
        .expect_err("wrong kind");
    assert_eq!(err.info().code, "variable-kind");
    assert_eq!(err.info().context["degree_of_freedom"], "0");
}

#[test]
fn settings_modifier_kind_is_checked_on_registration() {
    let mut builder = SuiteBuilder::full_factorial(base());
    builder
        .add_degree_of_freedom([
            Arc::new(SettingsModifier::new("cycles", 2i64).with_kind(SettingKind::Number))
                as SharedModifier,
        ])
        .expect("int is a number");
    let err = builder
        .add_degree_of_freedom([
            Arc::new(SettingsModifier::new("power", "full").with_kind(SettingKind::Float))
                as SharedModifier,
        ])
        .expect_err("text is not a float");
    assert_eq!(err.info().code, "variable-kind");
    assert_eq!(err.info().context["degree_of_freedom"], "1");
    assert_eq!(builder.shape(), vec![1]);
}

#[test]
fn settings_schema_is_enforced_per_case() {
    let mut builder = SuiteBuilder::separate_effects(base());
    builder
        .add_degree_of_freedom([
            Arc::new(SettingsModifier::new("power", 2.0e6)) as SharedModifier,
            Arc::new(SettingsModifier::new("power", "high")) as SharedModifier,
        ])
        .expect("register");
    let ctx = SuiteContext::new("out")
        .with_schema(SettingsSchema::default().declare("power", SettingKind::Number));
    let err = builder.build_suite(&ctx).expect_err("mistyped setting");
    assert_eq!(err.info().code, "setting-kind");
    assert_eq!(err.info().context["case"], "fail-0001");
}

#[test]
fn write_failures_are_aggregated() {
    let tmp = tempfile::tempdir().expect("tmp dir");
    let mut builder = SuiteBuilder::separate_effects(base());
    builder
        .add_degree_of_freedom(settings_dof(&[1.0, 2.0, 3.0, 4.0]))
        .expect("register");
    let suite = builder
        .build_suite(&SuiteContext::new(tmp.path()))
        .expect("build");
    // Regular files where case directories should go.
    fs::write(tmp.path().join("fail-0001"), "blocked").expect("block");
    fs::write(tmp.path().join("fail-0003"), "blocked").expect("block");

    let err = suite
        .write_inputs(&InputLayout::default(), &WriteOpts { concurrency: 2 })
        .expect_err("partial failure");
    let SuiteError::Aggregate(aggregate) = &err else {
        panic!("expected aggregate error, got {err}");
    };
    assert_eq!(aggregate.case_names(), vec!["fail-0001", "fail-0003"]);
    assert!(aggregate.failures.iter().all(|failure| failure.family == "io"));
    assert!(tmp.path().join("fail-0000/fail-0000.yaml").exists());
    assert!(tmp.path().join("fail-0002/fail-0002.yaml").exists());
}

#[test]
fn duplicate_names_are_rejected() {
    let a = Case::new("same", Settings::new(), blueprint());
    let b = Case::new("same", Settings::new(), blueprint());
    let err = Suite::new(vec![a, b]).expect_err("duplicate");
    assert_eq!(err.family(), "configuration");
}

#[test]
fn names_ending_in_the_blueprint_suffix_are_rejected() {
    let tmp = tempfile::tempdir().expect("tmp dir");
    let ctx = SuiteContext::new(tmp.path());
    let mut builder =
        SuiteBuilder::full_factorial(base()).with_naming(|i, _| format!("run{i}-blueprints"));
    builder
        .add_degree_of_freedom(settings_dof(&[2.0e6]))
        .expect("register");
    let err = builder.build_suite(&ctx).expect_err("reserved name");
    assert_eq!(err.family(), "configuration");
    assert_eq!(err.info().code, "case-name-reserved");
    assert_eq!(err.info().context["case"], "run0-blueprints");
    assert!(!builder.is_built());

    let mut builder = SuiteBuilder::full_factorial(base()).with_naming(|i, _| format!("run{i}"));
    builder
        .add_degree_of_freedom(settings_dof(&[2.0e6]))
        .expect("register");
    let suite = builder.build_suite(&ctx).expect("build");
    suite
        .write_inputs(&ctx.layout, &WriteOpts::default())
        .expect("write");
    let found = Suite::discover(tmp.path(), &[], &DiscoverOpts::default()).expect("discover");
    assert_eq!(found, suite);
}

#[derive(Debug)]
struct FlakyRunner;

impl CaseRunner for FlakyRunner {
    fn run(&self, case: &Case) -> Result<RunOutcome, SuiteError> {
        if case.index() % 2 == 1 {
            return Err(SuiteError::Io(
                ErrorInfo::new("runner-exit", "queue rejected case").with_context("case", case.name()),
            ));
        }
        Ok(RunOutcome {
            case: case.name().to_string(),
            exit_code: Some(0),
            output: String::new(),
        })
    }
}

#[test]
fn run_failures_are_aggregated() {
    let mut builder = SuiteBuilder::separate_effects(base());
    builder
        .add_degree_of_freedom(settings_dof(&[1.0, 2.0, 3.0]))
        .expect("register");
    let suite = builder.build_suite(&SuiteContext::new("out")).expect("build");
    let err = suite.run(&FlakyRunner).expect_err("one failure");
    let SuiteError::Aggregate(aggregate) = err else {
        panic!("expected aggregate");
    };
    assert_eq!(aggregate.case_names(), vec!["fail-0001"]);
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use suite_core::schema::SettingsSchema;

/// Zero-padded case naming: `<title><separator><index>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseNaming {
    #[serde(default = "CaseNaming::default_width")]
    pub width: usize,
    #[serde(default = "CaseNaming::default_separator")]
    pub separator: String,
}

impl CaseNaming {
    const fn default_width() -> usize {
        4
    }

    fn default_separator() -> String {
        "-".to_string()
    }

    /// Name of the derived case at `index`.
    pub fn name(&self, title: &str, index: usize) -> String {
        format!(
            "{title}{sep}{index:0width$}",
            sep = self.separator,
            width = self.width
        )
    }

    /// Glob matching every settings file this scheme produces for `title`.
    ///
    /// Indices wider than `width` are not matched.
    pub fn glob(&self, title: &str, extension: &str) -> String {
        format!(
            "{title}{sep}{marks}.{extension}",
            sep = self.separator,
            marks = "?".repeat(self.width.max(1))
        )
    }
}

impl Default for CaseNaming {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            separator: Self::default_separator(),
        }
    }
}

/// File naming inside a case directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLayout {
    #[serde(default = "InputLayout::default_extension")]
    pub extension: String,
    #[serde(default = "InputLayout::default_design_suffix")]
    pub design_suffix: String,
}

impl InputLayout {
    fn default_extension() -> String {
        "yaml".to_string()
    }

    fn default_design_suffix() -> String {
        "-blueprints".to_string()
    }

    /// Settings document path for case `name` inside `dir`.
    pub fn settings_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(self.settings_file_name(name))
    }

    /// File name of the settings document for case `name`.
    pub fn settings_file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.extension)
    }

    /// Whether case `name` would write a settings document that discovery
    /// takes for a blueprint.
    pub fn is_reserved_name(&self, name: &str) -> bool {
        self.is_design_file(&self.settings_file_name(name))
    }

    /// File name of the blueprint document for case `name`.
    pub fn design_file_name(&self, name: &str) -> String {
        format!("{name}{}.{}", self.design_suffix, self.extension)
    }

    /// Whether `file_name` is a blueprint document under this layout.
    pub fn is_design_file(&self, file_name: &str) -> bool {
        file_name.ends_with(&format!("{}.{}", self.design_suffix, self.extension))
    }
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            extension: Self::default_extension(),
            design_suffix: Self::default_design_suffix(),
        }
    }
}

/// Explicit context handed to suite construction.
///
/// Replaces process-wide configuration: everything naming, layout and
/// validation depend on travels through this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteContext {
    #[serde(default)]
    pub naming: CaseNaming,
    #[serde(default)]
    pub layout: InputLayout,
    pub output_root: PathBuf,
    #[serde(default)]
    pub schema: SettingsSchema,
}

impl SuiteContext {
    /// Context writing cases under `output_root` with default naming.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            naming: CaseNaming::default(),
            layout: InputLayout::default(),
            output_root: output_root.into(),
            schema: SettingsSchema::default(),
        }
    }

    pub fn with_naming(mut self, naming: CaseNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_layout(mut self, layout: InputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_schema(mut self, schema: SettingsSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Directory assigned to case `name`.
    pub fn case_dir(&self, name: &str) -> PathBuf {
        self.output_root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_pads_indices() {
        let naming = CaseNaming::default();
        assert_eq!(naming.name("power", 7), "power-0007");
        assert_eq!(naming.glob("power", "yaml"), "power-????.yaml");
        let wide = CaseNaming {
            width: 2,
            separator: "_".into(),
        };
        assert_eq!(wide.name("clad", 3), "clad_03");
        assert_eq!(wide.name("clad", 123), "clad_123");
    }

    #[test]
    fn layout_recognises_design_files() {
        let layout = InputLayout::default();
        assert!(layout.is_design_file("power-0000-blueprints.yaml"));
        assert!(!layout.is_design_file("power-0000.yaml"));
        assert_eq!(layout.design_file_name("power-0000"), "power-0000-blueprints.yaml");
        assert!(layout.is_reserved_name("run0-blueprints"));
        assert!(!layout.is_reserved_name("run0"));
    }
}

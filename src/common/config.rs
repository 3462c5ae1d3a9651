use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout_engine::Gaps;

/// Largest accepted gap, in unscaled pixels.
pub const MAX_GAP: i32 = 1024;

/// Largest accepted gap scale factor.
pub const MAX_DPI: f64 = 16.0;

pub fn config_file() -> PathBuf { dirs::home_dir().unwrap_or_default().join(".forktile.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Scale factor applied to every gap before it reaches the tiler.
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Gap configuration for window spacing
    #[serde(default)]
    pub gaps: GapSettings,
}

/// Gap configuration for window spacing, in unscaled pixels.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Space between sibling windows
    #[serde(default = "default_gap")]
    pub inner: i32,
    /// Margin between the tiled area and the screen edges
    #[serde(default = "default_gap")]
    pub outer: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            layout: LayoutSettings::default(),
        }
    }
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            inner: default_gap(),
            outer: default_gap(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            issues.push(format!("dpi must be positive, got {}", self.dpi));
        } else if self.dpi > MAX_DPI {
            issues.push(format!("dpi must be at most {MAX_DPI}, got {}", self.dpi));
        }

        issues.extend(self.layout.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            self.dpi = default_dpi();
            fixes += 1;
        } else if self.dpi > MAX_DPI {
            self.dpi = MAX_DPI;
            fixes += 1;
        }

        fixes += self.layout.auto_fix_values();

        fixes
    }

    /// Gaps in screen pixels, scaled by `dpi`.
    pub fn gaps(&self) -> Gaps {
        let scale = |gap: i32| (gap as f64 * self.dpi).round() as i32;
        Gaps::new(scale(self.layout.gaps.inner), scale(self.layout.gaps.outer))
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> { self.gaps.validate() }

    pub fn auto_fix_values(&mut self) -> usize { self.gaps.auto_fix_values() }
}

impl GapSettings {
    /// Validates gap configuration values and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, gap) in [("inner", self.inner), ("outer", self.outer)] {
            if gap < 0 {
                issues.push(format!("{name} gap must be non-negative, got {gap}"));
            } else if gap > MAX_GAP {
                issues.push(format!("{name} gap must be at most {MAX_GAP}, got {gap}"));
            }
        }

        issues
    }

    /// Attempts to fix gap configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for gap in [&mut self.inner, &mut self.outer] {
            let fixed = (*gap).clamp(0, MAX_GAP);
            if fixed != *gap {
                *gap = fixed;
                fixes += 1;
            }
        }

        fixes
    }
}

fn default_dpi() -> f64 { 1.0 }

fn default_gap() -> i32 { 8 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        // The embedded file is covered by `default_config_parses`.
        Self::parse(include_str!("../../forktile.default.toml")).unwrap_or_else(|_| Config {
            settings: Settings::default(),
        })
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(include_str!("../../forktile.default.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = Config::parse(
            r#"
            [settings.layout.gaps]
            inner = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.dpi, 1.0);
        assert_eq!(config.settings.layout.gaps.inner, 12);
        assert_eq!(config.settings.layout.gaps.outer, 8);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("[settings]\nanimate = true\n").is_err());
    }

    #[test]
    fn gaps_are_scaled_by_dpi() {
        let mut settings = Settings::default();
        settings.dpi = 2.0;
        settings.layout.gaps = GapSettings { inner: 5, outer: 3 };

        let gaps = settings.gaps();
        assert_eq!(gaps.inner, 10);
        assert_eq!(gaps.inner_half, 5);
        assert_eq!(gaps.outer, 6);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_empty());

        config.settings.dpi = 0.0;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("dpi must be positive"));

        config.settings.layout.gaps.inner = -4;
        config.settings.layout.gaps.outer = -1;
        assert_eq!(config.validate().len(), 3);

        let fixes = config.auto_fix_values();
        assert_eq!(fixes, 3);
        assert_eq!(config.settings.dpi, 1.0);
        assert_eq!(config.settings.layout.gaps, GapSettings { inner: 0, outer: 0 });
        assert!(config.validate().is_empty());
    }

    #[test]
    fn oversized_values_are_capped() {
        let mut config = Config::default();
        config.settings.dpi = 1e9;
        config.settings.layout.gaps = GapSettings { inner: i32::MAX, outer: 8 };

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[1].contains("inner gap must be at most 1024"), "{issues:?}");

        assert_eq!(config.auto_fix_values(), 2);
        assert_eq!(config.settings.dpi, MAX_DPI);
        assert_eq!(config.settings.layout.gaps, GapSettings { inner: MAX_GAP, outer: 8 });
        assert!(config.validate().is_empty());

        let gaps = config.settings.gaps();
        assert_eq!(gaps.inner, 16384);
        assert_eq!(gaps.outer, 128);
    }

    #[test]
    fn save_then_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("forktile.toml");

        let mut config = Config::default();
        config.settings.dpi = 1.5;
        config.settings.layout.gaps.inner = 20;
        config.save(&path).unwrap();

        assert_eq!(Config::read(&path).unwrap(), config);
    }
}

//! Process-manager declaration
//!
//! The backend API server and the frontend dev server are supervised by an
//! external process manager. This module holds the typed form of that
//! declaration and renders it as the `{ "apps": [...] }` JSON document the
//! process manager reads.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AssetDbError, Result};

/// One supervised process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub cwd: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(default = "default_true")]
    pub autorestart: bool,
    #[serde(default)]
    pub watch: bool,
    /// e.g. "1G", "512M"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_restart: Option<String>,
    /// Variable names are upper-cased on render; config keys arrive lower-cased.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

pub fn default_apps() -> Vec<ProcessSpec> {
    vec![
        ProcessSpec {
            name: "backend".to_string(),
            cwd: "./backend".to_string(),
            script: "server.js".to_string(),
            args: None,
            autorestart: true,
            watch: false,
            max_memory_restart: Some("1G".to_string()),
            env: BTreeMap::from([
                ("NODE_ENV".to_string(), "production".to_string()),
                (
                    "ALLOWED_ORIGINS".to_string(),
                    "http://localhost:5173,http://localhost:3000".to_string(),
                ),
            ]),
        },
        ProcessSpec {
            name: "frontend".to_string(),
            cwd: "./frontend".to_string(),
            script: "npm".to_string(),
            args: Some("run dev -- --host 0.0.0.0".to_string()),
            autorestart: true,
            watch: false,
            max_memory_restart: None,
            env: BTreeMap::new(),
        },
    ]
}

/// Memory threshold above which the process manager restarts a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemoryLimit(u64);

impl MemoryLimit {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;

    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl FromStr for MemoryLimit {
    type Err = AssetDbError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let upper = raw.to_ascii_uppercase();
        let digits_end = upper
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(upper.len());
        let (number, suffix) = upper.split_at(digits_end);

        let multiplier = match suffix.trim_end_matches('B') {
            "" => 1,
            "K" => Self::KIB,
            "M" => Self::MIB,
            "G" => Self::GIB,
            _ => {
                return Err(AssetDbError::validation(format!(
                    "Invalid memory limit '{}': expected a number with optional K/M/G suffix",
                    raw
                )));
            }
        };

        let value: u64 = number.parse().map_err(|_| {
            AssetDbError::validation(format!("Invalid memory limit '{}'", raw))
        })?;
        if value == 0 {
            return Err(AssetDbError::validation("Memory limit must be greater than zero"));
        }

        value
            .checked_mul(multiplier)
            .map(MemoryLimit)
            .ok_or_else(|| AssetDbError::validation(format!("Memory limit '{}' overflows", raw)))
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b % Self::GIB == 0 {
            write!(f, "{}G", b / Self::GIB)
        } else if b % Self::MIB == 0 {
            write!(f, "{}M", b / Self::MIB)
        } else if b % Self::KIB == 0 {
            write!(f, "{}K", b / Self::KIB)
        } else {
            write!(f, "{}", b)
        }
    }
}

/// The full set of supervised processes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ecosystem {
    pub apps: Vec<ProcessSpec>,
}

impl Ecosystem {
    pub fn new(apps: Vec<ProcessSpec>) -> Self {
        Self { apps }
    }

    pub fn validate(&self) -> Result<()> {
        if self.apps.is_empty() {
            return Err(AssetDbError::validation("No processes declared"));
        }

        let mut seen = HashSet::new();
        for app in &self.apps {
            if app.name.trim().is_empty() {
                return Err(AssetDbError::validation("Process name must not be empty"));
            }
            if !seen.insert(app.name.as_str()) {
                return Err(AssetDbError::validation(format!(
                    "Duplicate process name '{}'",
                    app.name
                )));
            }
            if app.script.trim().is_empty() {
                return Err(AssetDbError::validation(format!(
                    "Process '{}' has no script",
                    app.name
                )));
            }
            if app.cwd.trim().is_empty() {
                return Err(AssetDbError::validation(format!(
                    "Process '{}' has no working directory",
                    app.name
                )));
            }
            if let Some(limit) = &app.max_memory_restart {
                limit.parse::<MemoryLimit>()?;
            }
            for key in app.env.keys() {
                if !is_env_name(key) {
                    return Err(AssetDbError::validation(format!(
                        "Process '{}' has invalid environment variable name '{}'",
                        app.name, key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validated, normalised copy ready for rendering
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;

        let apps = self
            .apps
            .iter()
            .map(|app| -> Result<ProcessSpec> {
                let max_memory_restart = app
                    .max_memory_restart
                    .as_deref()
                    .map(|s| s.parse::<MemoryLimit>().map(|m| m.to_string()))
                    .transpose()?;
                Ok(ProcessSpec {
                    max_memory_restart,
                    env: app
                        .env
                        .iter()
                        .map(|(k, v)| (k.to_ascii_uppercase(), v.clone()))
                        .collect(),
                    ..app.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { apps })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.normalized()?)?)
    }
}

fn is_env_name(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend() {
        let apps = default_apps();
        let backend = apps.iter().find(|a| a.name == "backend").unwrap();
        assert_eq!(backend.cwd, "./backend");
        assert_eq!(backend.script, "server.js");
        assert!(backend.autorestart);
        assert_eq!(backend.max_memory_restart.as_deref(), Some("1G"));
        assert!(backend.env.contains_key("ALLOWED_ORIGINS"));
    }

    #[test]
    fn test_default_frontend_binds_all_interfaces() {
        let apps = default_apps();
        let frontend = apps.iter().find(|a| a.name == "frontend").unwrap();
        assert_eq!(frontend.cwd, "./frontend");
        assert!(frontend.args.as_deref().unwrap().contains("--host 0.0.0.0"));
    }

    #[test]
    fn test_memory_limit_parse() {
        assert_eq!("1G".parse::<MemoryLimit>().unwrap().bytes(), 1 << 30);
        assert_eq!("512M".parse::<MemoryLimit>().unwrap().bytes(), 512 << 20);
        assert_eq!("300k".parse::<MemoryLimit>().unwrap().bytes(), 300 << 10);
        assert_eq!("2GB".parse::<MemoryLimit>().unwrap().bytes(), 2 << 30);
        assert_eq!("4096".parse::<MemoryLimit>().unwrap().bytes(), 4096);
    }

    #[test]
    fn test_memory_limit_rejects_garbage() {
        assert!("".parse::<MemoryLimit>().is_err());
        assert!("0M".parse::<MemoryLimit>().is_err());
        assert!("1T".parse::<MemoryLimit>().is_err());
        assert!("lots".parse::<MemoryLimit>().is_err());
        assert!("99999999999999999999G".parse::<MemoryLimit>().is_err());
    }

    #[test]
    fn test_memory_limit_display_uses_largest_exact_unit() {
        assert_eq!("1024M".parse::<MemoryLimit>().unwrap().to_string(), "1G");
        assert_eq!("1536M".parse::<MemoryLimit>().unwrap().to_string(), "1536M");
        assert_eq!("1000".parse::<MemoryLimit>().unwrap().to_string(), "1000");
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut apps = default_apps();
        apps[1].name = "backend".to_string();
        let err = Ecosystem::new(apps).validate().unwrap_err();
        assert!(err.message().contains("Duplicate"));
    }

    #[test]
    fn test_validate_rejects_empty_script() {
        let mut apps = default_apps();
        apps[0].script = " ".to_string();
        assert!(Ecosystem::new(apps).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_env_name() {
        let mut apps = default_apps();
        apps[0].env.insert("1BAD".to_string(), "x".to_string());
        assert!(Ecosystem::new(apps).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(Ecosystem::new(Vec::new()).validate().is_err());
    }

    #[test]
    fn test_to_json_shape() {
        let mut apps = default_apps();
        apps[0].env.insert("cors_debug".to_string(), "1".to_string());
        let json = Ecosystem::new(apps).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let rendered = value["apps"].as_array().unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0]["name"], "backend");
        assert_eq!(rendered[0]["max_memory_restart"], "1G");
        assert_eq!(rendered[0]["env"]["CORS_DEBUG"], "1");
        assert_eq!(rendered[1]["script"], "npm");
        assert!(rendered[1].get("max_memory_restart").is_none());
    }
}

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use super::{load_json, save_json};

/// Contents of `projects.json`, keyed by project URN.
///
/// Entries are kept as raw JSON and decoded on lookup, so one entry the
/// add-in does not understand never hides (or erases) the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRegistry {
    #[serde(default)]
    pub projects: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Link between a host project and a ClickUp list.
///
/// Only `clickup_url` is written by the add-in; `clickup_list_id` is added by
/// hand and must survive every rewrite of the entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectBinding {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub clickup_url: String,
    /// Hand-edited files hold the id as a string or a bare number.
    #[serde(default, deserialize_with = "lenient_list_id")]
    pub clickup_list_id: Option<String>,
}

impl ProjectRegistry {
    /// Read-only load: anything unreadable reads as an empty registry.
    pub fn load(path: &Path) -> Self {
        load_json(path)
    }

    /// Load before a rewrite.
    ///
    /// A missing file or one that is not JSON at all starts fresh. A file that
    /// is JSON but not a registry is an error, so it is never overwritten.
    pub fn load_for_update(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let value: Value = match serde_json::from_str(&contents) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "projects file is not valid JSON, starting fresh");
                return Ok(Self::default());
            }
        };
        match serde_json::from_value(value) {
            Ok(registry) => Ok(registry),
            Err(e) => bail!(
                "{} has an unexpected layout ({e}); fix it by hand before saving",
                path.display()
            ),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }

    pub fn get(&self, project_urn: &str) -> Option<ProjectBinding> {
        let raw = self.projects.get(project_urn)?;
        match ProjectBinding::deserialize(raw) {
            Ok(binding) => Some(binding),
            Err(e) => {
                warn!(%project_urn, error = %e, "project entry not understood, ignoring");
                None
            }
        }
    }

    pub fn list_id(&self, project_urn: &str) -> Option<String> {
        self.get(project_urn)?.list_id().map(String::from)
    }

    pub fn url(&self, project_urn: &str) -> Option<String> {
        self.get(project_urn)?.url().map(String::from)
    }

    /// Set name and URL for a project. Returns `true` when the entry already existed.
    ///
    /// Every other key of the entry is left as it was.
    pub fn set_url(&mut self, project_urn: &str, project_name: &str, clickup_url: &str) -> bool {
        let existed = self.projects.contains_key(project_urn);
        let entry = self
            .projects
            .entry(project_urn.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            warn!(%project_urn, "project entry is not an object, replacing it");
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(fields) = entry {
            fields.insert("project_name".into(), Value::String(project_name.into()));
            fields.insert("clickup_url".into(), Value::String(clickup_url.into()));
        }
        existed
    }
}

impl ProjectBinding {
    pub fn list_id(&self) -> Option<&str> {
        self.clickup_list_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn url(&self) -> Option<&str> {
        Some(self.clickup_url.trim()).filter(|u| !u.is_empty())
    }
}

fn lenient_list_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "projects": {
    "urn:adsk.workspace:prod.project:abc": {
      "project_name": "Widgets",
      "clickup_url": "https://app.clickup.com/9011/v/li/901112345678",
      "clickup_list_id": " 901112345678 ",
      "owner": "ops"
    },
    "urn:adsk.workspace:prod.project:def": {
      "project_name": "Gadgets",
      "clickup_url": ""
    }
  }
}"#;

    fn read_raw(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn lookups_trim_and_skip_empty() {
        let registry: ProjectRegistry = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            registry.list_id("urn:adsk.workspace:prod.project:abc").as_deref(),
            Some("901112345678")
        );
        assert_eq!(registry.list_id("urn:adsk.workspace:prod.project:def"), None);
        assert_eq!(registry.url("urn:adsk.workspace:prod.project:def"), None);
        assert_eq!(registry.list_id("urn:unknown"), None);
    }

    #[test]
    fn set_url_preserves_hand_added_list_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut registry = ProjectRegistry::load_for_update(&path).unwrap();
        let existed = registry.set_url(
            "urn:adsk.workspace:prod.project:abc",
            "Widgets v2",
            "https://app.clickup.com/9011/v/li/1",
        );
        assert!(existed);
        registry.save(&path).unwrap();

        let raw = read_raw(&path);
        let entry = &raw["projects"]["urn:adsk.workspace:prod.project:abc"];
        assert_eq!(entry["project_name"], "Widgets v2");
        assert_eq!(entry["clickup_url"], "https://app.clickup.com/9011/v/li/1");
        assert_eq!(entry["clickup_list_id"], " 901112345678 ");
        assert_eq!(entry["owner"], "ops");
    }

    #[test]
    fn numeric_list_id_is_read_and_kept_beside_other_projects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(
            &path,
            r#"{"projects":{
                "urn:a":{"project_name":"A","clickup_url":"https://a","clickup_list_id":901112345678},
                "urn:b":{"project_name":"B","clickup_url":"https://b","clickup_list_id":"42"}
            }}"#,
        )
        .unwrap();

        let registry = ProjectRegistry::load(&path);
        assert_eq!(registry.list_id("urn:a").as_deref(), Some("901112345678"));
        assert_eq!(registry.list_id("urn:b").as_deref(), Some("42"));

        let mut registry = ProjectRegistry::load_for_update(&path).unwrap();
        registry.set_url("urn:b", "B", "https://b2");
        registry.save(&path).unwrap();

        let raw = read_raw(&path);
        assert_eq!(raw["projects"]["urn:a"]["clickup_list_id"], 901112345678u64);
        assert_eq!(raw["projects"]["urn:a"]["clickup_url"], "https://a");
        assert_eq!(raw["projects"]["urn:b"]["clickup_list_id"], "42");
        assert_eq!(raw["projects"]["urn:b"]["clickup_url"], "https://b2");
    }

    #[test]
    fn broken_entry_does_not_hide_the_others() {
        let registry: ProjectRegistry = serde_json::from_str(
            r#"{"projects":{
                "urn:bad":{"project_name":7},
                "urn:good":{"project_name":"G","clickup_url":"https://g","clickup_list_id":"9"}
            }}"#,
        )
        .unwrap();
        assert_eq!(registry.get("urn:bad"), None);
        assert_eq!(registry.list_id("urn:good").as_deref(), Some("9"));
    }

    #[test]
    fn unexpected_layout_refuses_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, r#"{"projects":["urn:a"]}"#).unwrap();

        assert!(ProjectRegistry::load_for_update(&path).is_err());
        assert!(ProjectRegistry::load(&path).projects.is_empty());
    }

    #[test]
    fn update_starts_fresh_when_missing_or_not_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        assert!(ProjectRegistry::load_for_update(&path).unwrap().projects.is_empty());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(ProjectRegistry::load_for_update(&path).unwrap().projects.is_empty());
    }

    #[test]
    fn set_url_on_new_project_has_no_list_id() {
        let mut registry = ProjectRegistry::default();
        let existed = registry.set_url("urn:new", "New", "https://app.clickup.com/x");
        assert!(!existed);

        let raw = serde_json::to_value(&registry).unwrap();
        let entry = raw["projects"]["urn:new"].as_object().unwrap();
        assert_eq!(entry.len(), 2);
        assert!(!entry.contains_key("clickup_list_id"));
    }

    #[test]
    fn registry_without_projects_key_loads_empty() {
        let registry: ProjectRegistry = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert!(registry.projects.is_empty());
        assert_eq!(registry.extra["version"], 1);
    }
}

//! Layered configuration profiles.
//!
//! A profile keeps one value per layer and answers reads from the merge of
//! all layers:
//!
//! 1. Values set programmatically
//! 2. Extension profiles merged on top
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use deepassign_profile::Profile;
//!
//! let mut profile = Profile::load("config/production.yml")?;
//! profile.extend_from_file("config/local.yml")?;
//!
//! let port: u16 = profile.get("server.port").unwrap_or(8080);
//! profile.set("server.port", port + 1)?;
//! profile.save()?;
//! # Ok::<(), deepassign_types::DeepAssignError>(())
//! ```

use deepassign_core::{flat, MergeEngine, PathAccessor};
use deepassign_types::{DeepAssignError, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Profile layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileLayer {
    /// Default values
    Defaults = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Extension profiles merged on top of the loaded values
    Extension = 2,
    /// Values set programmatically
    Set = 3,
}

impl ProfileLayer {
    /// All layers, lowest priority first.
    pub const ALL: [ProfileLayer; 4] = [
        ProfileLayer::Defaults,
        ProfileLayer::Loaded,
        ProfileLayer::Extension,
        ProfileLayer::Set,
    ];
}

/// A named, layered configuration profile.
#[derive(Clone, Debug)]
pub struct Profile {
    name: String,
    layers: HashMap<ProfileLayer, Value>,
    engine: MergeEngine,
    file_path: Option<PathBuf>,
    schema: Option<serde_json::Value>,
}

impl Profile {
    /// Create an empty profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: HashMap::new(),
            engine: MergeEngine::default(),
            file_path: None,
            schema: None,
        }
    }

    /// Create a profile whose loaded layer is `value`.
    ///
    /// # Errors
    ///
    /// Returns a profile error if `value` is not a record.
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self> {
        let mut profile = Self::new(name);
        profile.layers.insert(ProfileLayer::Loaded, ensure_record(value)?);
        Ok(profile)
    }

    /// Load a profile from a YAML or JSON file, named after the file stem.
    ///
    /// If the file doesn't exist, an empty profile bound to that path is created.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("default")
            .to_string();
        let mut profile = Self::new(name);

        if path.exists() {
            profile.layers.insert(ProfileLayer::Loaded, read_document(path)?);
            info!("Loaded profile '{}' from {:?}", profile.name, path);
        } else {
            debug!("No profile file at {:?}; starting empty", path);
        }

        profile.file_path = Some(path.to_path_buf());
        Ok(profile)
    }

    /// Use a different merge engine for combining layers.
    pub fn with_engine(mut self, engine: MergeEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set the default values.
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.layers.insert(ProfileLayer::Defaults, defaults);
        self
    }

    /// Set validation schema.
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The merge engine combining the layers.
    pub fn engine(&self) -> &MergeEngine {
        &self.engine
    }

    /// The file this profile was loaded from, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// The raw value of a single layer.
    pub fn layer(&self, layer: ProfileLayer) -> Option<&Value> {
        self.layers.get(&layer)
    }

    /// Merge an extension profile on top of the loaded values.
    ///
    /// Successive extensions accumulate; later ones win.
    pub fn extend(&mut self, extension: &Value) {
        let merged = match self.layers.get(&ProfileLayer::Extension) {
            Some(existing) => self.engine.assign([existing, extension]),
            None => self.engine.copy(extension),
        };
        self.layers.insert(ProfileLayer::Extension, merged);
    }

    /// Merge an extension profile read from a YAML or JSON file.
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let extension = read_document(path.as_ref())?;
        self.extend(&extension);
        debug!("Extended profile '{}' from {:?}", self.name, path.as_ref());
        Ok(())
    }

    /// The merge of all layers, lowest priority first.
    pub fn resolved(&self) -> Value {
        self.engine
            .assign(ProfileLayer::ALL.iter().filter_map(|layer| self.layers.get(layer)))
    }

    /// Get the value at a dotted path in the resolved profile.
    pub fn get_value(&self, path: &str) -> Option<Value> {
        let resolved = self.resolved();
        deepassign_core::path::get(&resolved, path).cloned()
    }

    /// Get a typed value at a dotted path.
    ///
    /// Returns None if the path is missing or the value doesn't deserialize as `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let json = self.get_value(path)?.to_json().ok()?;
        serde_json::from_value(json).ok()
    }

    /// Set a value programmatically at a dotted path.
    ///
    /// # Errors
    ///
    /// Fails if the value doesn't serialize, or if the path is blocked by a
    /// leaf already set in the programmatic layer.
    pub fn set(&mut self, path: &str, value: impl Serialize) -> Result<()> {
        let json = serde_json::to_value(value)
            .map_err(|e| DeepAssignError::Profile(format!("Failed to serialize value: {}", e)))?;
        self.set_value(path, Value::from(json))
    }

    /// Set a structural value programmatically at a dotted path.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        let accessor = PathAccessor::new().strict(true);
        let current = self
            .layers
            .get(&ProfileLayer::Set)
            .cloned()
            .unwrap_or_else(Value::empty_record);

        if let Some(updated) = accessor.set(&current, path, value)? {
            self.layers.insert(ProfileLayer::Set, updated);
        }
        Ok(())
    }

    /// Remove a programmatically set value. Returns whether anything was removed.
    pub fn unset(&mut self, path: &str) -> bool {
        let accessor = PathAccessor::new();
        let Some(current) = self.layers.get(&ProfileLayer::Set) else {
            return false;
        };
        if !accessor.contains(current, path) {
            return false;
        }

        let updated = deepassign_core::path::delete(current, path);
        self.layers.insert(ProfileLayer::Set, updated);
        true
    }

    /// Dotted paths of all settings whose path matches `pattern`.
    pub fn settings_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let regex = regex::Regex::new(pattern)
            .map_err(|e| DeepAssignError::Profile(format!("Invalid pattern: {}", e)))?;

        let flattened = flat(&self.resolved());
        Ok(flattened
            .as_record()
            .into_iter()
            .flat_map(|map| map.keys())
            .filter_map(|key| key.as_name())
            .filter(|path| regex.is_match(path))
            .map(str::to_string)
            .collect())
    }

    /// Validate the resolved profile against the schema (if set).
    pub fn validate(&self) -> Result<()> {
        if let Some(schema) = &self.schema {
            let instance = self.resolved().to_json()?;

            let compiled = jsonschema::JSONSchema::compile(schema)
                .map_err(|e| DeepAssignError::Validation(format!("Invalid schema: {}", e)))?;

            let result = compiled.validate(&instance);
            if let Err(errors) = result {
                let error_msgs: Vec<String> = errors.map(|e| format!("{}", e)).collect();
                return Err(DeepAssignError::Validation(format!(
                    "Profile '{}' failed validation: {}",
                    self.name,
                    error_msgs.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Save the resolved profile to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = self.file_path.as_ref().ok_or_else(|| {
            DeepAssignError::Profile(format!("Cannot save profile '{}': no file path set", self.name))
        })?;
        self.save_to(path)
    }

    /// Save the resolved profile to `path`: JSON for `.json`, YAML otherwise.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let resolved = self.resolved();

        let content = if is_json(path) {
            serde_json::to_string_pretty(&resolved)
                .map_err(|e| DeepAssignError::Profile(format!("Failed to serialize profile: {}", e)))?
        } else {
            serde_yaml::to_string(&resolved)
                .map_err(|e| DeepAssignError::Profile(format!("Failed to serialize profile: {}", e)))?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
            .map_err(|e| DeepAssignError::Profile(format!("Failed to write profile file: {}", e)))?;

        info!("Saved profile '{}' to {:?}", self.name, path);
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a YAML or JSON document whose root is a record. An empty document is an empty record.
pub(crate) fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| DeepAssignError::Profile(format!("Failed to read profile file {:?}: {}", path, e)))?;

    let value: Value = if is_json(path) {
        serde_json::from_str(&content)
            .map_err(|e| DeepAssignError::Profile(format!("Failed to parse {:?}: {}", path, e)))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| DeepAssignError::Profile(format!("Failed to parse {:?}: {}", path, e)))?
    };

    ensure_record(value)
}

fn ensure_record(value: Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::empty_record()),
        Value::Record(_) => Ok(value),
        other => Err(DeepAssignError::Profile(format!(
            "profile root must be a record, found a {} value",
            other.kind()
        ))),
    }
}

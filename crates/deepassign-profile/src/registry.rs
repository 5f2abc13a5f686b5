//! Named profiles that inherit from one another.
//!
//! A profile may name a parent under the `extends` key. Resolving a profile
//! merges its ancestry base-first, so the most derived profile wins.

use crate::profile::{read_document, Profile};
use deepassign_core::MergeEngine;
use deepassign_types::{bail, DeepAssignError, Key, Result, Value};
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, info};

/// Key naming the parent profile.
pub const EXTENDS_KEY: &str = "extends";

/// Registry of named profile documents.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: IndexMap<String, Value>,
    engine: MergeEngine,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different merge engine when resolving inheritance.
    pub fn with_engine(mut self, engine: MergeEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Register (or replace) a profile document.
    pub fn register(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if !value.is_record() {
            bail!(Profile, "profile '{}' must be a record, found a {} value", name, value.kind());
        }
        debug!("Registered profile '{}'", name);
        self.profiles.insert(name, value);
        Ok(())
    }

    /// Register every top-level entry of a YAML or JSON file as a profile.
    ///
    /// Returns the number of profiles registered.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let document = read_document(path)?;
        let Value::Record(entries) = document else {
            return Ok(0);
        };

        let mut count = 0;
        for (key, value) in entries {
            let Key::Name(name) = key else {
                continue;
            };
            self.register(name, value)?;
            count += 1;
        }

        info!("Loaded {} profiles from {:?}", count, path);
        Ok(count)
    }

    /// Registered profile names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Whether a profile with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// The inheritance chain of `name`, most derived first.
    pub fn chain(&self, name: &str) -> Result<Vec<String>> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = name.to_string();

        loop {
            if chain.contains(&current) {
                chain.push(current);
                bail!(Profile, "inheritance cycle: {}", chain.join(" -> "));
            }

            let document = self
                .profiles
                .get(&current)
                .ok_or_else(|| DeepAssignError::Profile(format!("unknown profile '{}'", current)))?;

            let parent = match document.child(EXTENDS_KEY) {
                None | Some(Value::Null) => None,
                Some(Value::String(parent)) => Some(parent.clone()),
                Some(other) => bail!(
                    Profile,
                    "profile '{}' has a non-string '{}' ({})",
                    current,
                    EXTENDS_KEY,
                    other.kind()
                ),
            };

            chain.push(current);
            match parent {
                Some(parent) => current = parent,
                None => return Ok(chain),
            }
        }
    }

    /// Merge the ancestry of `name` base-first. The `extends` key is removed.
    pub fn resolve(&self, name: &str) -> Result<Value> {
        let chain = self.chain(name)?;
        debug!("Resolving profile '{}' via {}", name, chain.join(" <- "));

        let mut resolved = self
            .engine
            .assign(chain.iter().rev().filter_map(|n| self.profiles.get(n)));
        if let Some(map) = resolved.as_record_mut() {
            map.shift_remove(&Key::from(EXTENDS_KEY));
        }
        Ok(resolved)
    }

    /// Resolve `name` into a [`Profile`] whose loaded layer is the merged ancestry.
    pub fn profile(&self, name: &str) -> Result<Profile> {
        Ok(Profile::from_value(name, self.resolve(name)?)?.with_engine(self.engine))
    }
}

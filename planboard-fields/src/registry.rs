//! PropertyRegistry: the main API surface for custom property definitions.
//!
//! Keeps every scope's definitions in memory with indexes by id and by
//! `(scope, name)`. When opened on a directory, each definition is also
//! persisted as `<root>/<id>.yaml`, written atomically.
//!
//! Deleting a definition here is schema-only. Removing the stored values that
//! reference it is the task layer's job, which performs the cascade before it
//! calls [`PropertyRegistry::remove`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::error::{FieldError, FieldsError, Result};
use crate::types::{NewProperty, PropertyDef, PropertyId, PropertyPatch, PropertyType, Scope};

/// Builder for an on-disk `PropertyRegistry`. Created by `PropertyRegistry::open()`.
pub struct PropertyRegistryBuilder {
    root: PathBuf,
}

impl PropertyRegistryBuilder {
    /// Build the registry: create the directory and load existing definitions.
    pub async fn build(self) -> Result<PropertyRegistry> {
        let root = self.root;
        if root.is_file() {
            return Err(FieldsError::NotInitialized { path: root });
        }
        fs::create_dir_all(&root).await?;

        let mut registry = PropertyRegistry {
            root: Some(root),
            definitions: Vec::new(),
            id_index: HashMap::new(),
            name_index: HashMap::new(),
        };
        registry.load_definitions().await?;

        debug!(
            definitions = registry.definitions.len(),
            "property registry opened"
        );
        Ok(registry)
    }
}

/// Registry of custom property definitions across scopes.
pub struct PropertyRegistry {
    root: Option<PathBuf>,
    definitions: Vec<PropertyDef>,
    id_index: HashMap<PropertyId, usize>,
    name_index: HashMap<(Scope, String), usize>,
}

impl PropertyRegistry {
    /// Open or create an on-disk registry. Returns a builder.
    ///
    /// ```rust,ignore
    /// let registry = PropertyRegistry::open(path).build().await?;
    /// ```
    pub fn open(root: impl Into<PathBuf>) -> PropertyRegistryBuilder {
        PropertyRegistryBuilder { root: root.into() }
    }

    /// A registry that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            root: None,
            definitions: Vec::new(),
            id_index: HashMap::new(),
            name_index: HashMap::new(),
        }
    }

    // --- Reads ---

    /// Get a definition by id.
    pub fn get(&self, id: &PropertyId) -> Option<&PropertyDef> {
        self.id_index.get(id).map(|&i| &self.definitions[i])
    }

    /// Get a definition by its (case-sensitive) name within a scope.
    pub fn get_by_name(&self, scope: &Scope, name: &str) -> Option<&PropertyDef> {
        self.name_index
            .get(&(scope.clone(), name.to_string()))
            .map(|&i| &self.definitions[i])
    }

    /// Definitions of a scope ordered by display order, ties broken by id.
    pub fn list(&self, scope: &Scope) -> Vec<&PropertyDef> {
        let mut defs: Vec<&PropertyDef> = self
            .definitions
            .iter()
            .filter(|d| &d.scope == scope)
            .collect();
        defs.sort_by_key(|d| d.order_key());
        defs
    }

    /// Number of definitions across all scopes.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The root directory, when persisted.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    // --- Writes ---

    /// Create a definition in `scope`.
    ///
    /// Without an explicit order the definition goes to the end: one past the
    /// highest display order currently in the scope.
    pub async fn create(&mut self, scope: Scope, input: NewProperty) -> Result<PropertyDef> {
        let display_order = match input.display_order {
            Some(order) => order,
            None => {
                let last = self
                    .definitions
                    .iter()
                    .filter(|d| d.scope == scope)
                    .map(|d| d.display_order)
                    .max();
                match last {
                    None => 0,
                    Some(last) => last.checked_add(1).ok_or_else(|| {
                        FieldsError::Validation(vec![FieldError::new(
                            "display_order",
                            "no order left after the last property",
                        )])
                    })?,
                }
            }
        };

        let def = PropertyDef {
            id: PropertyId::new(),
            scope,
            name: input.name.trim().to_string(),
            type_: input.type_,
            options: if input.type_.uses_options() {
                clean_options(input.options)
            } else {
                Vec::new()
            },
            required: input.required,
            display_order,
        };
        self.check_definition(&def)?;

        self.persist(&def).await?;
        let idx = self.definitions.len();
        self.id_index.insert(def.id, idx);
        self.name_index
            .insert((def.scope.clone(), def.name.clone()), idx);
        self.definitions.push(def.clone());

        info!(scope = %def.scope, id = %def.id, name = %def.name, "property created");
        Ok(def)
    }

    /// Apply a partial update. The merged definition is validated as a whole.
    pub async fn update(&mut self, id: &PropertyId, patch: PropertyPatch) -> Result<PropertyDef> {
        let idx = self.index_of(id)?;
        let current = self.definitions[idx].clone();

        let mut next = current.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(type_) = patch.type_ {
            next.type_ = type_;
        }
        if let Some(options) = patch.options {
            next.options = clean_options(options);
        }
        if let Some(required) = patch.required {
            next.required = required;
        }
        if let Some(order) = patch.display_order {
            next.display_order = order;
        }
        if !next.type_.uses_options() {
            next.options.clear();
        }
        self.check_definition(&next)?;

        if next.type_ != current.type_ {
            warn!(
                id = %id,
                from = %current.type_,
                to = %next.type_,
                "property type changed; stored values are not migrated"
            );
        }

        self.persist(&next).await?;
        if current.name != next.name {
            self.name_index
                .remove(&(current.scope.clone(), current.name.clone()));
            self.name_index
                .insert((next.scope.clone(), next.name.clone()), idx);
        }
        self.definitions[idx] = next.clone();

        debug!(id = %id, name = %next.name, "property updated");
        Ok(next)
    }

    /// Remove a definition. Schema only: callers cascade stored values first.
    pub async fn remove(&mut self, id: &PropertyId) -> Result<PropertyDef> {
        let idx = self.index_of(id)?;

        if let Some(path) = self.definition_path(id) {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        let def = self.definitions.swap_remove(idx);
        self.id_index.remove(id);
        self.name_index.remove(&(def.scope.clone(), def.name.clone()));

        // Swap-remove moved the last definition into `idx`; fix its indexes
        if idx < self.definitions.len() {
            let moved = &self.definitions[idx];
            self.id_index.insert(moved.id, idx);
            self.name_index
                .insert((moved.scope.clone(), moved.name.clone()), idx);
        }

        info!(scope = %def.scope, id = %def.id, name = %def.name, "property removed");
        Ok(def)
    }

    // --- Internal ---

    fn index_of(&self, id: &PropertyId) -> Result<usize> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| FieldsError::PropertyNotFound { id: id.to_string() })
    }

    /// Collect every problem with a definition, then check name uniqueness.
    fn check_definition(&self, def: &PropertyDef) -> Result<()> {
        let mut errors = Vec::new();
        if def.name.is_empty() {
            errors.push(FieldError::new("name", "cannot be empty"));
        }
        if def.type_ == PropertyType::Dropdown && def.options.is_empty() {
            errors.push(FieldError::new(
                "options",
                "a dropdown needs at least one option",
            ));
        }
        if def.type_ == PropertyType::Tags && def.required && def.options.is_empty() {
            errors.push(FieldError::new(
                "options",
                "a required tags property needs at least one option",
            ));
        }
        if !errors.is_empty() {
            return Err(FieldsError::Validation(errors));
        }

        let clash = self
            .get_by_name(&def.scope, &def.name)
            .is_some_and(|existing| existing.id != def.id);
        if clash {
            return Err(FieldsError::DuplicateName {
                scope: def.scope.to_string(),
                name: def.name.clone(),
            });
        }
        Ok(())
    }

    fn definition_path(&self, id: &PropertyId) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(format!("{id}.yaml")))
    }

    async fn persist(&self, def: &PropertyDef) -> Result<()> {
        let Some(path) = self.definition_path(&def.id) else {
            return Ok(());
        };
        let yaml = serde_yaml_ng::to_string(def)?;
        atomic_write(&path, yaml.as_bytes()).await
    }

    async fn load_definitions(&mut self) -> Result<()> {
        let Some(root) = self.root.clone() else {
            return Ok(());
        };
        let mut entries = fs::read_dir(&root).await?;
        let mut loaded = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            match serde_yaml_ng::from_str::<PropertyDef>(&content) {
                Ok(def) => loaded.push(def),
                Err(e) => {
                    warn!(?path, %e, "skipping invalid property definition");
                }
            }
        }

        // Directory order is arbitrary; index in a stable order
        loaded.sort_by(|a, b| a.scope.cmp(&b.scope).then(a.order_key().cmp(&b.order_key())));
        for def in loaded {
            let idx = self.definitions.len();
            self.id_index.insert(def.id, idx);
            self.name_index
                .insert((def.scope.clone(), def.name.clone()), idx);
            self.definitions.push(def);
        }
        Ok(())
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Trim options, drop empties and duplicates, keep first-seen order.
fn clean_options(options: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(options.len());
    for option in options {
        let option = option.trim().to_string();
        if !option.is_empty() && !cleaned.contains(&option) {
            cleaned.push(option);
        }
    }
    cleaned
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

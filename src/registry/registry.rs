use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    hash::Hash,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::components::{
    id::ItemId,
    items::item::{Item, Rarity},
};

#[derive(Debug, Clone)]
pub struct Registry<K, V> {
    pub entries: HashMap<K, V>,
}

pub trait RegistryEntry {
    type Id: Eq + Hash + Clone + Debug;

    fn id(&self) -> Self::Id;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate id {id} in {path:?}")]
    DuplicateId { id: String, path: Option<PathBuf> },
    #[error("no entry with id {0}")]
    UnknownId(String),
    #[error("failed to load registry: {0}")]
    Load(#[from] std::io::Error),
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: RegistryEntry<Id = K>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(values: impl IntoIterator<Item = V>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for value in values {
            registry.insert(value)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, value: V) -> Result<(), RegistryError> {
        let id = value.id();
        if self.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateId {
                id: format!("{:?}", id),
                path: None,
            });
        }
        self.entries.insert(id, value);
        Ok(())
    }

    /// Replaces an existing entry, returning the previous value.
    pub fn update(&mut self, value: V) -> Result<V, RegistryError> {
        let id = value.id();
        match self.entries.get_mut(&id) {
            Some(existing) => Ok(std::mem::replace(existing, value)),
            None => Err(RegistryError::UnknownId(format!("{:?}", id))),
        }
    }

    pub fn remove(&mut self, id: &K) -> Result<V, RegistryError> {
        self.entries
            .remove(id)
            .ok_or_else(|| RegistryError::UnknownId(format!("{:?}", id)))
    }

    pub fn get(&self, id: &K) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: RegistryEntry<Id = K> + DeserializeOwned,
{
    /// Loads one entry per `.json` file. Files that fail to parse are skipped
    /// with a warning, duplicate ids are an error.
    pub fn load_from_directory(directory: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let mut entries = HashMap::new();

        for entry in fs::read_dir(directory)? {
            let entry = entry?;
            let path: PathBuf = entry.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let file_contents: String = fs::read_to_string(&path)?;
            let value = match serde_json::from_str::<V>(&file_contents) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Failed to deserialize file {:?}: {}", path, e);
                    continue;
                }
            };

            let id = value.id();
            if entries.insert(id.clone(), value).is_some() {
                return Err(RegistryError::DuplicateId {
                    id: format!("{:?}", id),
                    path: Some(path),
                });
            }
        }

        debug!("Loaded {} registry entries", entries.len());
        Ok(Self { entries })
    }
}

impl RegistryEntry for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

pub type ItemRegistry = Registry<ItemId, Item>;

impl Registry<ItemId, Item> {
    /// Items of one rarity, ordered by id.
    pub fn by_rarity(&self, rarity: Rarity) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .entries
            .values()
            .filter(|item| item.rarity == rarity)
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// All items ordered by rarity, then name.
    pub fn sorted(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.entries.values().collect();
        items.sort_by(|a, b| a.rarity.cmp(&b.rarity).then_with(|| a.name.cmp(&b.name)));
        items
    }
}

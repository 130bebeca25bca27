//! Magasin de documents: des collections de documents JSON adressés par id,
//! persistées dans un fichier YAML.

use std::{
    collections::BTreeMap,
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::{anyhow, Result};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use serde_yaml::to_writer;

type Collection = BTreeMap<String, Value>;
type Db = BTreeMap<String, Collection>;

/// Filtre d'une requête. Seule l'égalité sur un champ est supportée.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    fn accepts(&self, document: &Value) -> bool {
        match self {
            Filter::Eq(field, expected) => document.get(field) == Some(expected),
        }
    }
}

pub struct Database {
    path: Option<PathBuf>,
    db: RwLock<Db>,
}

impl Database {
    /// Base non persistée, utilisée par les tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            db: RwLock::new(Db::default()),
        }
    }

    /// Ouvre la base stockée dans `path`, vide si le fichier n'existe pas.
    pub fn open(path: &Path) -> Result<Self> {
        let db = RwLock::new(Db::default());
        load(&db, path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            db,
        })
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let db = self.db.read().or(Err(anyhow!("DB poisoned")))?;
        Ok(db.get(collection).and_then(|c| c.get(id)).cloned())
    }

    /// Documents de `collection` acceptés par `filter`, avec leur id.
    pub fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Value)>> {
        let db = self.db.read().or(Err(anyhow!("DB poisoned")))?;
        Ok(db
            .get(collection)
            .map(|c| {
                c.iter()
                    .filter(|(_, document)| filter.accepts(document))
                    .map(|(id, document)| (id.clone(), document.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Ajoute un document sous un id généré et retourne cet id.
    pub fn create(&self, collection: &str, data: Value) -> Result<String> {
        if !data.is_object() {
            return Err(anyhow!("Document must be an object"));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut db = self.db.write().or(Err(anyhow!("DB poisoned")))?;
        db.entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        self.save(&db)?;
        debug!("Created {}/{}", collection, id);
        Ok(id)
    }

    /// Écrit le document `id`, en remplaçant l'éventuel document existant.
    pub fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        if !data.is_object() {
            return Err(anyhow!("Document must be an object"));
        }

        let mut db = self.db.write().or(Err(anyhow!("DB poisoned")))?;
        db.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        self.save(&db)
    }

    /// Fusionne `fields` dans le document existant `id`.
    pub fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        let mut db = self.db.write().or(Err(anyhow!("DB poisoned")))?;
        let document = db
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| anyhow!("Document not found: {}/{}", collection, id))?;

        document.extend(fields);
        self.save(&db)
    }

    fn save(&self, db: &Db) -> Result<()> {
        match &self.path {
            Some(path) => save(db, path),
            None => Ok(()),
        }
    }
}

/// Fonctions de sauvegarde et chargement YAML
pub(crate) fn save<T: Serialize>(db: &T, path: &Path) -> Result<()> {
    // Crée le dossier parent s'il n'existe pas
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            create_dir_all(parent_dir).or(Err(anyhow!("Failed to create directory")))?;
        }
    }

    let file = File::create(path)?;
    to_writer(file, db).or(Err(anyhow!("Failed to serialize DB")))?;
    Ok(())
}

pub(crate) fn load<T: DeserializeOwned + Default>(db: &RwLock<T>, path: &Path) -> Result<()> {
    let content = match File::open(path) {
        Ok(file) => serde_yaml::from_reader(file).unwrap_or_else(|e| {
            warn!("Could not parse {}: {}", path.display(), e);
            T::default()
        }),
        Err(_) => T::default(),
    };

    let mut db = db.write().or(Err(anyhow!("DB poisoned")))?;
    *db = content;
    Ok(())
}

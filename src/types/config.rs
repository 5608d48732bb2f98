use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use handle_errors::Error as CustomError;
use mongodb::bson::Document;
use mongodb::options::IndexOptions;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub uri: String,
    pub db_name: String,
}

impl ConnectionConfig {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
        }
    }
}

/// An index to create: `keys` maps field names to a direction (`1`, `-1`)
/// or an index type such as `"text"`, in key order. `options` takes the
/// driver's own index options (`unique`, `sparse`, `expireAfterSeconds`,
/// `partialFilterExpression`, ...) as named by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSpec {
    pub keys: Document,
    #[serde(default)]
    pub options: IndexOptions,
}

impl IndexSpec {
    pub fn new(keys: Document) -> Self {
        Self {
            keys,
            options: IndexOptions::default(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.options.unique = Some(true);
        self
    }

    pub fn sparse(mut self) -> Self {
        self.options.sparse = Some(true);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    /// Documents expire `after` their indexed date field's value.
    pub fn expire_after(mut self, after: Duration) -> Self {
        self.options.expire_after = Some(after);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indexes: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    pub connection: ConnectionConfig,
    pub collections: Vec<CollectionSpec>,
}

impl InitConfig {
    pub fn new(connection: ConnectionConfig, collections: Vec<CollectionSpec>) -> Self {
        Self {
            connection,
            collections,
        }
    }

    /// Collection names must be unique within one request.
    pub fn validate(&self) -> Result<(), CustomError> {
        let mut seen = HashSet::new();
        for spec in &self.collections {
            if !seen.insert(spec.name.as_str()) {
                return Err(CustomError::InvalidRequest(format!(
                    "collection `{}` is declared more than once",
                    spec.name
                )));
            }
        }
        Ok(())
    }
}

/// Documents to seed, keyed by collection name. Iteration follows the order
/// in which collections were first inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedData {
    entries: Vec<(String, Vec<Document>)>,
}

impl SeedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the documents for `collection`. Replacing an existing entry keeps
    /// its original position.
    pub fn insert(&mut self, collection: impl Into<String>, documents: Vec<Document>) {
        let collection = collection.into();
        match self.entries.iter_mut().find(|(name, _)| *name == collection) {
            Some((_, existing)) => *existing = documents,
            None => self.entries.push((collection, documents)),
        }
    }

    pub fn with(mut self, collection: impl Into<String>, documents: Vec<Document>) -> Self {
        self.insert(collection, documents);
        self
    }

    pub fn get(&self, collection: &str) -> Option<&[Document]> {
        self.entries
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, documents)| documents.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Document])> {
        self.entries
            .iter()
            .map(|(name, documents)| (name.as_str(), documents.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<Document>)> for SeedData {
    fn from_iter<I: IntoIterator<Item = (S, Vec<Document>)>>(iter: I) -> Self {
        let mut data = SeedData::new();
        for (collection, documents) in iter {
            data.insert(collection, documents);
        }
        data
    }
}

impl Serialize for SeedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (collection, documents) in &self.entries {
            map.serialize_entry(collection, documents)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SeedData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SeedDataVisitor;

        impl<'de> Visitor<'de> for SeedDataVisitor {
            type Value = SeedData;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of collection names to arrays of documents")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SeedData, A::Error> {
                let mut data = SeedData::new();
                while let Some((collection, documents)) =
                    access.next_entry::<String, Vec<Document>>()?
                {
                    data.insert(collection, documents);
                }
                Ok(data)
            }
        }

        deserializer.deserialize_map(SeedDataVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub connection: ConnectionConfig,
    pub data: SeedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_first: Option<bool>,
}

impl SeedConfig {
    pub fn new(connection: ConnectionConfig, data: SeedData) -> Self {
        Self {
            connection,
            data,
            clear_first: None,
        }
    }

    pub fn clear_first(&self) -> bool {
        self.clear_first.unwrap_or(true)
    }
}

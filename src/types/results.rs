use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResult {
    /// Collections created by this call, in request order.
    pub created: Vec<String>,
    /// Collections that were already present, in request order.
    pub existing: Vec<String>,
    pub indexes_created: usize,
}

impl InitResult {
    pub fn collections(&self) -> usize {
        self.created.len() + self.existing.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResult {
    /// Documents inserted per collection, in seeding order.
    pub inserted: Vec<(String, usize)>,
    pub cleared: Vec<String>,
}

impl SeedResult {
    pub fn inserted_into(&self, collection: &str) -> Option<usize> {
        self.inserted
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, count)| *count)
    }

    pub fn total_inserted(&self) -> usize {
        self.inserted.iter().map(|(_, count)| count).sum()
    }
}

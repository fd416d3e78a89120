/// Storage layout and uniqueness rules applied by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPolicy {
    /// Create fails when a record already exists at the id.
    pub enforce_unique_id: bool,
    /// Create/update fail when another id already holds the name.
    pub enforce_unique_name: bool,
    /// Prepended to the id to form the record key.
    pub key_prefix: String,
    /// Prepended to the name to form its index key (`name -> id`).
    pub name_index_prefix: String,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            enforce_unique_id: true,
            enforce_unique_name: false,
            key_prefix: String::new(),
            name_index_prefix: "directory:name:".into(),
        }
    }
}

impl DirectoryPolicy {
    pub fn record_key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    pub fn name_key(&self, name: &str) -> String {
        format!("{}{}", self.name_index_prefix, name)
    }

    /// True when the record key for `id` would land inside the name index.
    pub fn is_reserved_id(&self, id: &str) -> bool {
        !self.name_index_prefix.is_empty() && self.record_key(id).starts_with(&self.name_index_prefix)
    }
}

use std::collections::HashMap;

/// Ordered `application/x-www-form-urlencoded` pairs using the platform's
/// bracket notation for nested fields (`metadata[user_id]=...`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    pub fn metadata(mut self, metadata: &HashMap<String, String>) -> Self {
        let mut keys: Vec<&String> = metadata.keys().collect();
        keys.sort();
        for key in keys {
            self.0
                .push((format!("metadata[{}]", key), metadata[key].clone()));
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

pub mod encoder;

pub use encoder::{ParametersEncoder, PathParametersEncoder, QueryParametersEncoder};

/// Page parameters: ordered named pairs plus positional (indexed) values.
///
/// A name may carry several values (`?a=1&a=2`); [`get`](Self::get) returns
/// the first one. Equality ignores the relative order of different names but
/// keeps the order of values sharing a name.
#[derive(Debug, Clone, Default)]
pub struct PageParameters {
    indexed: Vec<String>,
    named: Vec<NamedPair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPair {
    pub key: String,
    pub value: String,
}

impl PageParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Builder form of [`push_indexed`](Self::push_indexed).
    pub fn with_indexed(mut self, value: impl Into<String>) -> Self {
        self.push_indexed(value);
        self
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.named.push(NamedPair {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }

    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.named
            .iter()
            .filter(move |pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.named.iter().any(|pair| pair.key == key)
    }

    /// Removes every value of `key`, returning the first one.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let first = self.named.iter().position(|pair| pair.key == key)?;
        let removed = self.named.remove(first);
        self.named.retain(|pair| pair.key != key);
        Some(removed.value)
    }

    /// Distinct names in first-occurrence order.
    pub fn named_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for pair in &self.named {
            if !keys.contains(&pair.key.as_str()) {
                keys.push(&pair.key);
            }
        }
        keys
    }

    pub fn all_named(&self) -> &[NamedPair] {
        &self.named
    }

    pub fn indexed(&self) -> &[String] {
        &self.indexed
    }

    pub fn push_indexed(&mut self, value: impl Into<String>) -> &mut Self {
        self.indexed.push(value.into());
        self
    }

    /// Appends all of `other`'s values after the existing ones.
    pub fn append(&mut self, other: PageParameters) -> &mut Self {
        self.indexed.extend(other.indexed);
        self.named.extend(other.named);
        self
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.named.is_empty()
    }

    fn sorted_named(&self) -> Vec<&NamedPair> {
        let mut named: Vec<&NamedPair> = self.named.iter().collect();
        named.sort_by(|a, b| a.key.cmp(&b.key));
        named
    }
}

impl PartialEq for PageParameters {
    fn eq(&self, other: &Self) -> bool {
        self.indexed == other.indexed && self.sorted_named() == other.sorted_named()
    }
}

impl Eq for PageParameters {}

impl<K, V> FromIterator<(K, V)> for PageParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut parameters = Self::new();
        for (key, value) in iter {
            parameters.add(key, value);
        }
        parameters
    }
}

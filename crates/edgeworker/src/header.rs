use std::collections::HashMap;
use std::collections::hash_map;

/// A set of HTTP headers keyed by name.
///
/// Names and values are opaque strings: lookups are exact-match and nothing
/// is normalized, so `Content-Type` and `content-type` are distinct keys.
/// Insertion order is not significant. Inserting an existing name replaces
/// its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a header, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.entries
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<HashMap<String, String>> for Headers {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/html");
        assert_eq!(headers.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn lookups_are_exact_match() {
        let headers = Headers::from([("X-Trace", "abc")]);
        assert_eq!(headers.get("x-trace"), None);
        assert!(headers.contains("X-Trace"));
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut headers = Headers::new();
        assert_eq!(headers.insert("Accept", "*/*"), None);
        assert_eq!(headers.insert("Accept", "text/plain"), Some("*/*".to_string()));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Accept"), Some("text/plain"));
    }

    #[test]
    fn len_and_empty() {
        let mut headers = Headers::new();
        assert!(headers.is_empty());

        headers.insert("X-Test", "1");
        assert!(!headers.is_empty());
        assert_eq!(headers.len(), 1);

        headers.remove("X-Test");
        assert!(headers.is_empty());
    }

    #[test]
    fn from_iterator_keeps_last_duplicate() {
        let headers: Headers = vec![("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")]
            .into_iter()
            .collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Set-Cookie"), Some("b=2"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = Headers::from([("A", "1"), ("B", "2")]);
        let b = Headers::from([("B", "2"), ("A", "1")]);
        assert_eq!(a, b);
    }
}

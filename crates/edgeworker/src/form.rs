use crate::blob::Blob;

/// MIME type of URL-encoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { blob: Blob, file_name: Option<String> },
}

impl FormValue {
    /// The text of a text field, `None` for files.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::Text(text)
    }
}

impl From<Blob> for FormValue {
    fn from(blob: Blob) -> Self {
        FormValue::File {
            blob,
            file_name: None,
        }
    }
}

/// Ordered form fields. Duplicate names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_all(&self, name: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as `application/x-www-form-urlencoded`.
    ///
    /// File fields contribute their file name, or an empty value.
    pub fn to_urlencoded(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    FormValue::Text(text) => text.as_str(),
                    FormValue::File { file_name, .. } => file_name.as_deref().unwrap_or_default(),
                };
                format!("{}={}", encode_component(name), encode_component(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse an `application/x-www-form-urlencoded` string.
    ///
    /// Every field becomes a text value. Malformed escapes are decoded
    /// lossily rather than rejected.
    pub fn from_urlencoded(input: &str) -> Self {
        parse_pairs(input)
            .into_iter()
            .map(|(n, v)| (n, FormValue::Text(v)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<FormValue>,
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

/// Split a query or form string into decoded name/value pairs, in order.
pub(crate) fn parse_pairs(input: &str) -> Vec<(String, String)> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&decoded).into_owned()
}

fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_get() {
        let mut form = FormData::new();
        form.append("name", "ada");
        form.append("tag", "a");
        form.append("tag", "b");

        assert_eq!(form.len(), 3);
        assert_eq!(form.get("name").and_then(FormValue::as_text), Some("ada"));
        assert_eq!(form.get_all("tag").len(), 2);
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn urlencoded_escapes_reserved_characters() {
        let form: FormData = [("q", "a b&c"), ("lang", "ünï")].into_iter().collect();
        assert_eq!(form.to_urlencoded(), "q=a+b%26c&lang=%C3%BCn%C3%AF");
    }

    #[test]
    fn parse_decodes_plus_and_percent() {
        let form = FormData::from_urlencoded("q=a+b%26c&flag&empty=");
        let fields: Vec<_> = form.iter().map(|(n, v)| (n, v.as_text())).collect();
        assert_eq!(
            fields,
            vec![("q", Some("a b&c")), ("flag", Some("")), ("empty", Some(""))]
        );
    }

    #[test]
    fn parse_ignores_empty_pairs() {
        assert!(FormData::from_urlencoded("").is_empty());
        assert_eq!(FormData::from_urlencoded("&&a=1&").len(), 1);
    }

    #[test]
    fn file_fields_encode_their_name() {
        let mut form = FormData::new();
        form.append(
            "upload",
            FormValue::File {
                blob: Blob::new("data"),
                file_name: Some("report.csv".into()),
            },
        );
        form.append("anon", Blob::new("data"));
        assert_eq!(form.to_urlencoded(), "upload=report.csv&anon=");
    }
}

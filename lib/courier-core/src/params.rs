//! Query parameters.
//!
//! [`Params`] is either a mapping encoded with the
//! `application/x-www-form-urlencoded` rules, or a query string the caller
//! already encoded, which is used verbatim.

use std::collections::{BTreeMap, HashMap};

use url::form_urlencoded;

/// Query parameters of a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Key/value pairs, percent-encoded when rendered.
    Map(BTreeMap<String, String>),
    /// An already encoded query string (without the leading `?`).
    Encoded(String),
}

impl Default for Params {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl Params {
    /// Empty parameter mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already encoded query string.
    #[must_use]
    pub fn encoded(query: impl Into<String>) -> Self {
        Self::Encoded(query.into())
    }

    /// Returns `true` if rendering would produce an empty query string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Map(pairs) => pairs.is_empty(),
            Self::Encoded(query) => query.is_empty(),
        }
    }

    /// Add a parameter.
    ///
    /// On an encoded query string the pair is encoded and appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        match self {
            Self::Map(pairs) => {
                pairs.insert(name.into(), value.into());
            }
            Self::Encoded(query) => {
                let pair = form_urlencoded::Serializer::new(String::new())
                    .append_pair(&name.into(), &value.into())
                    .finish();
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&pair);
            }
        }
    }

    /// Render as a query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Map(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
            Self::Encoded(query) => query.clone(),
        }
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(pairs: BTreeMap<String, String>) -> Self {
        Self::Map(pairs)
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(pairs: HashMap<String, String>) -> Self {
        Self::Map(pairs.into_iter().collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_render_nothing() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.to_query_string(), "");

        assert!(Params::encoded("").is_empty());
    }

    #[test]
    fn map_is_percent_encoded() {
        let params: Params = [("q", "rust lang"), ("tag", "a&b=c"), ("page", "1")]
            .into_iter()
            .collect();

        assert!(!params.is_empty());
        assert_eq!(
            params.to_query_string(),
            "page=1&q=rust+lang&tag=a%26b%3Dc"
        );
    }

    #[test]
    fn encoded_is_verbatim() {
        let params = Params::encoded("q=already%20encoded&x=1");
        assert_eq!(params.to_query_string(), "q=already%20encoded&x=1");
    }

    #[test]
    fn insert_into_encoded_appends_pair() {
        let mut params = Params::encoded("a=1");
        params.insert("b", "two words");
        assert_eq!(params.to_query_string(), "a=1&b=two+words");

        let mut params = Params::encoded("");
        params.insert("b", "2");
        assert_eq!(params.to_query_string(), "b=2");
    }

    #[test]
    fn insert_into_map_overrides_key() {
        let mut params = Params::new();
        params.insert("page", "1");
        params.insert("page", "2");
        assert_eq!(params.to_query_string(), "page=2");
    }

    #[test]
    fn from_hash_map() {
        let mut pairs = HashMap::new();
        pairs.insert("limit".to_string(), "10".to_string());
        let params = Params::from(pairs);
        assert_eq!(params.to_query_string(), "limit=10");
    }
}

use crate::params::value::ParameterValue;

/// Parameter name to value mapping decoded from one folder name.
///
/// Keys are unique and keep first-insertion order; re-inserting a key replaces its value in
/// place. Equality ignores order.
#[derive(Clone, Debug, Default)]
pub struct ParameterMap {
    entries: Vec<(String, ParameterValue)>,
}

impl ParameterMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: ParameterValue,
    ) -> Option<ParameterValue> {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Overwrite every key present in `other`.
    pub fn overwrite_with(&mut self, other: ParameterMap) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    /// Value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// `true` if `name` has a value.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was recognized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for ParameterMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>> FromIterator<(K, ParameterValue)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, ParameterValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl serde::Serialize for ParameterMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

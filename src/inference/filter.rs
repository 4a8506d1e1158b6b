use indexmap::{IndexMap, IndexSet};

use crate::error::TypeError;
use crate::ir::Field;

/// Narrows a derived object's root fields.
///
/// `only` keeps the listed names, `except` drops them; both may be set and
/// are applied together. Naming a field the source does not have is an error,
/// so a typo cannot silently widen or narrow the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    only: Option<IndexSet<String>>,
    except: IndexSet<String>,
}

impl FieldFilter {
    pub fn all() -> Self { Self::default() }

    pub fn only<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> Self {
        Self { only: Some(names.into_iter().map(Into::into).collect()), ..Self::default() }
    }

    pub fn except<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> Self {
        Self { except: names.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Add names to the deny-list of an existing filter.
    pub fn and_except<I: IntoIterator<Item = S>, S: Into<String>>(mut self, names: I) -> Self {
        self.except.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_all(&self) -> bool { self.only.is_none() && self.except.is_empty() }

    pub(crate) fn apply(&self, fields: IndexMap<String, Field>) -> Result<IndexMap<String, Field>, TypeError> {
        let lists = self.only.iter().map(|s| ("only", s)).chain(std::iter::once(("except", &self.except)));
        for (filter, names) in lists {
            if let Some(missing) = names.iter().find(|n| !fields.contains_key(*n)) {
                return Err(TypeError::UnknownFilterField { filter, field: missing.clone() });
            }
        }
        Ok(fields
            .into_iter()
            .filter(|(name, _)| self.only.as_ref().is_none_or(|only| only.contains(name)))
            .filter(|(name, _)| !self.except.contains(name))
            .collect())
    }
}

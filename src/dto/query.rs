//! List query parameters shared by every back-office collection.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::{PageSize, TypeConstraintError};

/// Query-string names owned by the list parameters; filters may not shadow them.
const RESERVED_PARAMS: [&str; 5] = ["page", "pageSize", "sortBy", "sortDirection", "search"];

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown sort direction `{other}`"
            ))),
        }
    }
}

/// Trims the search text, mapping blank input to "no search".
fn normalize_search(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Current filter/sort/page state of one list.
///
/// `page` is always at least 1 and `page_size` is one of the allowed sizes.
/// Any change that does not explicitly set the page resets it to 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQueryParams {
    page: usize,
    page_size: PageSize,
    sort_by: String,
    sort_direction: SortDirection,
    search: Option<String>,
    filters: BTreeMap<String, String>,
}

impl ListQueryParams {
    pub fn new(sort_by: impl Into<String>, sort_direction: SortDirection) -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            sort_by: sort_by.into(),
            sort_direction,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = normalize_search(Some(search.into()));
        self
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !RESERVED_PARAMS.contains(&name.as_str()) {
            self.filters.insert(name, value.into());
        }
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Shallow-merges `patch` into the parameters and reports whether anything
    /// changed.
    pub fn apply(&mut self, patch: FilterPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let before = self.clone();

        if let Some(page_size) = patch.page_size {
            self.page_size = page_size;
        }
        if let Some(sort_by) = patch.sort_by {
            let sort_by = sort_by.trim();
            if !sort_by.is_empty() {
                self.sort_by = sort_by.to_string();
            }
        }
        if let Some(direction) = patch.sort_direction {
            self.sort_direction = direction;
        }
        if let Some(search) = patch.search {
            self.search = normalize_search(search);
        }
        for (name, value) in patch.filters {
            if RESERVED_PARAMS.contains(&name.as_str()) {
                log::warn!("Ignoring filter `{name}` that shadows a list parameter");
                continue;
            }
            match value {
                Some(value) => {
                    self.filters.insert(name, value);
                }
                None => {
                    self.filters.remove(&name);
                }
            }
        }

        self.page = patch.page.map_or(1, |page| page.max(1));

        *self != before
    }

    /// Patch produced by clicking a sortable column header: the same column
    /// flips direction, a new column starts ascending.
    pub fn sort_patch(&self, field: &str) -> FilterPatch {
        let direction = if self.sort_by == field {
            self.sort_direction.toggled()
        } else {
            SortDirection::Ascending
        };
        FilterPatch::new().sort_by(field).sort_direction(direction)
    }

    /// Parameters as ordered query-string pairs, in the names the API expects.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
            ("sortBy".to_string(), self.sort_by.clone()),
            ("sortDirection".to_string(), self.sort_direction.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// Canonical url-encoded form of the full parameter set, used as the cache
    /// key of a list page.
    pub fn serialized(&self) -> String {
        let pairs = self.query_pairs();
        serde_html_form::to_string(&pairs).unwrap_or_else(|err| {
            log::warn!("Failed to encode list params: {err}");
            format!("{pairs:?}")
        })
    }
}

/// Partial update of [`ListQueryParams`]. Unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPatch {
    page: Option<usize>,
    page_size: Option<PageSize>,
    sort_by: Option<String>,
    sort_direction: Option<SortDirection>,
    search: Option<Option<String>>,
    filters: BTreeMap<String, Option<String>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    /// Sets the search text; blank text clears the search.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(Some(text.into()));
        self
    }

    pub fn clear_search(mut self) -> Self {
        self.search = Some(None);
        self
    }

    /// Sets a structured filter; a blank value removes it.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        };
        self.filters.insert(name.into(), value);
        self
    }

    pub fn clear_filter(mut self, name: impl Into<String>) -> Self {
        self.filters.insert(name.into(), None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_none()
            && self.page_size.is_none()
            && self.sort_by.is_none()
            && self.sort_direction.is_none()
            && self.search.is_none()
            && self.filters.is_empty()
    }

    pub fn sets_page(&self) -> bool {
        self.page.is_some()
    }
}

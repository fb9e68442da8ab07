//! Listing filters
//!
//! A `SongFilter` is sparse: each present field means "equals", each absent
//! field means "unconstrained". [`build_predicates`] turns it into a flat list
//! of equality constraints that the store joins with `AND`.

use chrono::NaiveDate;
use uuid::Uuid;

/// Sparse equality filter over song attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub id: Option<Uuid>,
    pub group: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
}

/// Filterable song attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongField {
    Id,
    Group,
    Title,
    ReleaseDate,
    Text,
    Link,
}

impl SongField {
    /// Column backing this attribute in the `songs` table
    pub fn column(self) -> &'static str {
        match self {
            SongField::Id => "id",
            SongField::Group => "group_name",
            SongField::Title => "title",
            SongField::ReleaseDate => "release_date",
            SongField::Text => "text",
            SongField::Link => "link",
        }
    }
}

/// Expected value of an equality constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Id(Uuid),
    Text(String),
    Date(NaiveDate),
}

/// One `field = value` constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: SongField,
    pub value: FilterValue,
}

impl Predicate {
    fn new(field: SongField, value: FilterValue) -> Self {
        Self { field, value }
    }
}

/// Build the conjunctive predicate list for a filter
///
/// Unset fields are skipped; an empty result matches every song. Predicates
/// come out in attribute order (id, group, title, release date, text, link).
pub fn build_predicates(filter: &SongFilter) -> Vec<Predicate> {
    let candidates = [
        filter.id.map(|id| Predicate::new(SongField::Id, FilterValue::Id(id))),
        filter
            .group
            .clone()
            .map(|v| Predicate::new(SongField::Group, FilterValue::Text(v))),
        filter
            .title
            .clone()
            .map(|v| Predicate::new(SongField::Title, FilterValue::Text(v))),
        filter
            .release_date
            .map(|d| Predicate::new(SongField::ReleaseDate, FilterValue::Date(d))),
        filter
            .text
            .clone()
            .map(|v| Predicate::new(SongField::Text, FilterValue::Text(v))),
        filter
            .link
            .clone()
            .map(|v| Predicate::new(SongField::Link, FilterValue::Text(v))),
    ];

    candidates.into_iter().flatten().collect()
}

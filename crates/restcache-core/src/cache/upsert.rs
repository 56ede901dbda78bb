use crate::{
    Row,
    cache::{CacheValue, PrimaryKey, RowDelta},
    filter::RowFilter,
};

///
/// UpsertMutation
///
/// Applies an inserted or updated row to one cached container.
///
/// The changed row is first projected into the query's result shape
/// (renamed columns under their alias). Rows matching by key are merged with the change (changed fields win);
/// the merged row stays in place when the query still accepts it and is
/// removed otherwise. When no cached row matched anywhere, the change is
/// prepended to the first page (or the array) once, provided the query
/// accepts it and it carries every key column.
///

pub struct UpsertMutation<'a, F: RowFilter + ?Sized> {
    row: &'a Row,
    primary_key: &'a PrimaryKey,
    filter: &'a F,
}

impl<'a, F: RowFilter + ?Sized> UpsertMutation<'a, F> {
    #[must_use]
    pub const fn new(row: &'a Row, primary_key: &'a PrimaryKey, filter: &'a F) -> Self {
        Self {
            row,
            primary_key,
            filter,
        }
    }

    /// Mutate `value`, returning the new container and what changed.
    /// An absent container passes through untouched.
    #[must_use]
    pub fn apply(&self, value: Option<CacheValue>) -> (Option<CacheValue>, RowDelta) {
        let mut delta = RowDelta::default();
        let Some(value) = value else {
            return (None, delta);
        };

        let row = self.filter.project(self.row, self.primary_key);
        let row = &row;

        let value = match value {
            CacheValue::Single {
                row: Some(existing),
                bare,
            } if self.primary_key.matches(&existing, row) => {
                let merged = merge(&existing, row);
                if self.filter.apply(&merged) {
                    delta.updated += 1;
                    CacheValue::Single {
                        row: Some(merged),
                        bare,
                    }
                } else {
                    delta.removed += 1;
                    CacheValue::Single { row: None, bare }
                }
            }
            single @ CacheValue::Single { .. } => single,

            CacheValue::Array(mut rows) => {
                if !self.update_rows(row, &mut rows, &mut delta) {
                    self.insert_first(row, &mut rows, &mut delta);
                }
                CacheValue::Array(rows)
            }

            CacheValue::CountedArray { mut data, count } => {
                if !self.update_rows(row, &mut data, &mut delta) {
                    self.insert_first(row, &mut data, &mut delta);
                }
                let count = count.adjust(delta.inserted, delta.removed);
                CacheValue::CountedArray { data, count }
            }

            CacheValue::Paged(mut pages) => {
                let mut matched = false;
                for page in &mut pages {
                    matched |= self.update_rows(row, page, &mut delta);
                }
                if !matched && let Some(first) = pages.first_mut() {
                    self.insert_first(row, first, &mut delta);
                }
                CacheValue::Paged(pages)
            }
        };

        (Some(value), delta)
    }

    // Update or drop key matches in place; true if any row matched.
    fn update_rows(&self, row: &Row, rows: &mut Vec<Row>, delta: &mut RowDelta) -> bool {
        let mut matched = false;

        rows.retain_mut(|existing| {
            if !self.primary_key.matches(existing, row) {
                return true;
            }
            matched = true;

            let merged = merge(existing, row);
            if self.filter.apply(&merged) {
                *existing = merged;
                delta.updated += 1;
                true
            } else {
                delta.removed += 1;
                false
            }
        });

        matched
    }

    fn insert_first(&self, row: &Row, rows: &mut Vec<Row>, delta: &mut RowDelta) {
        let keys: &[String] = self.primary_key;

        if self.filter.apply(row) && self.filter.has_paths(row, keys) {
            rows.insert(0, row.clone());
            delta.inserted += 1;
        }
    }
}

/// Build a reusable upsert closure over one changed row.
pub fn build_upsert_mutator<'a, F: RowFilter + ?Sized>(
    row: &'a Row,
    primary_key: &'a PrimaryKey,
    filter: &'a F,
) -> impl Fn(Option<CacheValue>) -> Option<CacheValue> + 'a {
    let mutation = UpsertMutation::new(row, primary_key, filter);

    move |value| mutation.apply(value).0
}

fn merge(existing: &Row, changed: &Row) -> Row {
    let mut merged = existing.clone();
    for (key, value) in changed {
        merged.insert(key.clone(), value.clone());
    }

    merged
}

use crate::{
    Row,
    cache::{CacheValue, PrimaryKey, RowDelta},
};

///
/// DeleteMutation
///
/// Removes every cached row whose key matches the deleted row. Membership
/// filters are not consulted.
///

pub struct DeleteMutation<'a> {
    row: &'a Row,
    primary_key: &'a PrimaryKey,
}

impl<'a> DeleteMutation<'a> {
    #[must_use]
    pub const fn new(row: &'a Row, primary_key: &'a PrimaryKey) -> Self {
        Self { row, primary_key }
    }

    #[must_use]
    pub fn apply(&self, value: Option<CacheValue>) -> (Option<CacheValue>, RowDelta) {
        let mut delta = RowDelta::default();
        let Some(value) = value else {
            return (None, delta);
        };

        let value = match value {
            CacheValue::Single {
                row: Some(existing),
                bare,
            } if self.primary_key.matches(&existing, self.row) => {
                delta.removed += 1;
                CacheValue::Single { row: None, bare }
            }
            single @ CacheValue::Single { .. } => single,
            CacheValue::Array(mut rows) => {
                delta.removed += self.remove_rows(&mut rows);
                CacheValue::Array(rows)
            }
            CacheValue::CountedArray { mut data, count } => {
                let removed = self.remove_rows(&mut data);
                delta.removed += removed;
                CacheValue::CountedArray {
                    data,
                    count: count.adjust(0, removed),
                }
            }
            CacheValue::Paged(mut pages) => {
                for page in &mut pages {
                    delta.removed += self.remove_rows(page);
                }
                CacheValue::Paged(pages)
            }
        };

        (Some(value), delta)
    }

    fn remove_rows(&self, rows: &mut Vec<Row>) -> u64 {
        let before = rows.len();
        rows.retain(|existing| !self.primary_key.matches(existing, self.row));

        (before - rows.len()) as u64
    }
}

/// Build a reusable delete closure over one deleted row.
pub fn build_delete_mutator<'a>(
    row: &'a Row,
    primary_key: &'a PrimaryKey,
) -> impl Fn(Option<CacheValue>) -> Option<CacheValue> + 'a {
    let mutation = DeleteMutation::new(row, primary_key);

    move |value| mutation.apply(value).0
}

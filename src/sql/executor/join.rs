use crate::{
    error::{Error, Result},
    sql::{engine::Catalog, types::Value},
};

use super::{Executor, ResultSet};

/// Nested Loop Join executor - pairs every left row with the right rows
/// whose join column equals its own (`Value::matches`, so NULL pairs with NULL)
///
/// Output columns are the left columns followed by the right columns the
/// left side does not already have. For a matched pair a shared column
/// takes the right row's value. With `outer` set, a left row without any
/// match is emitted once with NULL in the right-only columns.
pub struct NestedLoopJoin<C: Catalog> {
    left: Box<dyn Executor<C>>,
    right: Box<dyn Executor<C>>,
    predicate: (String, String),
    outer: bool,
}

impl<C: Catalog> NestedLoopJoin<C> {
    pub fn new(
        left: Box<dyn Executor<C>>,
        right: Box<dyn Executor<C>>,
        predicate: (String, String),
        outer: bool,
    ) -> Box<Self> {
        Box::new(Self {
            left,
            right,
            predicate,
            outer,
        })
    }
}

/// Positions of the `ON a = b` columns as (left, right); either side of the
/// equality may name either table
fn resolve_predicate(
    predicate: &(String, String),
    lcols: &[String],
    rcols: &[String],
) -> Result<(usize, usize)> {
    let position = |cols: &[String], name: &str| cols.iter().position(|c| c == name);
    let (a, b) = predicate;
    if let (Some(l), Some(r)) = (position(lcols, a), position(rcols, b)) {
        return Ok((l, r));
    }
    if let (Some(l), Some(r)) = (position(lcols, b), position(rcols, a)) {
        return Ok((l, r));
    }
    let missing = if position(lcols, a).is_none() && position(rcols, a).is_none() {
        a
    } else {
        b
    };
    Err(Error::ColumnNotFound(missing.clone()))
}

impl<C: Catalog> Executor<C> for NestedLoopJoin<C> {
    fn execute(self: Box<Self>, catalog: &mut C) -> Result<ResultSet> {
        let (lcols, lrows) = match self.left.execute(catalog)? {
            ResultSet::Scan { columns, rows } => (columns, rows),
            _ => return Err(Error::Internal("Unexpected result set".into())),
        };
        let (rcols, rrows) = match self.right.execute(catalog)? {
            ResultSet::Scan { columns, rows } => (columns, rows),
            _ => return Err(Error::Internal("Unexpected result set".into())),
        };
        let (lpos, rpos) = resolve_predicate(&self.predicate, &lcols, &rcols)?;

        // Where each right column lands in the merged row
        let mut columns = lcols.clone();
        let mut targets = Vec::with_capacity(rcols.len());
        for rcol in &rcols {
            match columns.iter().position(|c| c == rcol) {
                Some(i) => targets.push(i),
                None => {
                    targets.push(columns.len());
                    columns.push(rcol.clone());
                }
            }
        }
        let width = columns.len();

        let mut rows = Vec::new();
        for lrow in &lrows {
            let mut matched = false;
            for rrow in rrows.iter().filter(|r| lrow[lpos].matches(&r[rpos])) {
                let mut row = lrow.clone();
                row.resize(width, Value::Null);
                for (value, &target) in rrow.iter().zip(&targets) {
                    row[target] = value.clone();
                }
                rows.push(row);
                matched = true;
            }

            if self.outer && !matched {
                let mut row = lrow.clone();
                row.resize(width, Value::Null);
                rows.push(row);
            }
        }

        Ok(ResultSet::Scan { columns, rows })
    }
}

#![forbid(unsafe_code)]

//! Index selection: analyze, evaluate every candidate, commit the cheapest.
//!
//! Selection is a single pass over data owned by one call. The filter is
//! analyzed into column ranges once, then the primary index and every
//! secondary index in declared order (or only the hinted index) are priced.
//! Candidates are sorted by cost with a stable sort, so ties go to the primary
//! index first and then to declaration order. The winner's index id and
//! `[start, end)` span are written back to the [`Scan`].

use crate::query::analyze::PredicateAnalyzer;
use crate::query::candidate::IndexCandidate;
use crate::query::explain::SelectionExplain;
use crate::query::keys::KeySpan;
use crate::query::options::PlannerOptions;
use crate::query::scan::Scan;
use crate::types::{IndexId, Result};

/// Chooses the index and key span for table scans.
///
/// Holds only read-only options, so one selector can serve any number of
/// planning calls, concurrently or not.
#[derive(Clone, Debug, Default)]
pub struct IndexSelector {
    options: PlannerOptions,
}

struct Selection {
    index: IndexId,
    span: KeySpan,
    explain: SelectionExplain,
}

impl IndexSelector {
    /// Creates a selector after validating `options`.
    pub fn new(options: PlannerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options in use.
    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Commits the cheapest index and its key span to `scan`.
    ///
    /// Scans without a table or without a filter are returned unchanged.
    pub fn select(&self, scan: Scan) -> Scan {
        self.select_explained(scan).0
    }

    /// Like [`select`](Self::select), also returning how the choice was made.
    pub fn select_explained(&self, mut scan: Scan) -> (Scan, Option<SelectionExplain>) {
        let Some(selection) = self.rank(&scan) else {
            return (scan, None);
        };
        scan.commit(selection.index, selection.span);
        (scan, Some(selection.explain))
    }

    fn rank(&self, scan: &Scan) -> Option<Selection> {
        let table = scan.table()?;
        let filter = scan.filter()?;
        let observer = self.options.observer.as_ref();

        let bounds = PredicateAnalyzer::new(table, self.options.evaluator.as_ref(), observer)
            .analyze(filter);

        let mut candidates: Vec<IndexCandidate<'_>> = if scan.is_hinted() {
            vec![IndexCandidate::new(table, scan.index()?)]
        } else {
            std::iter::once(&table.primary_index)
                .chain(table.indexes.iter())
                .map(|index| IndexCandidate::new(table, index))
                .collect()
        };
        for candidate in &mut candidates {
            candidate.evaluate(scan.columns(), &bounds, &self.options.cost);
        }
        // `sort_by` is stable: equal costs keep primary-then-declared order.
        candidates.sort_by(|a, b| a.cost().total_cmp(&b.cost()));

        let reports: Vec<_> = candidates.iter().map(IndexCandidate::report).collect();
        for (rank, report) in reports.iter().enumerate() {
            observer.candidate_ranked(rank, report);
        }
        let best = candidates.first()?;
        let span = best.span();
        let explain = SelectionExplain {
            table: table.name.clone(),
            filter: filter.to_string(),
            bounds: bounds
                .iter()
                .map(|(id, range)| {
                    let name = table
                        .column_by_id(*id)
                        .map_or_else(|| format!("#{id}"), |c| c.name.clone());
                    if range.is_contradictory() {
                        format!("{name}: {range} (empty)")
                    } else {
                        format!("{name}: {range}")
                    }
                })
                .collect(),
            candidates: reports,
            chosen: best.index().name.clone(),
            start_key: hex::encode(&span.start),
            end_key: hex::encode(&span.end),
        };
        Some(Selection {
            index: best.index().id,
            span,
            explain,
        })
    }
}

/// Runs index selection with default options.
pub fn select_index(scan: Scan) -> Scan {
    IndexSelector::default().select(scan)
}

/// Runs index selection with default options and returns the explain output.
pub fn select_index_explained(scan: Scan) -> (Scan, Option<SelectionExplain>) {
    IndexSelector::default().select_explained(scan)
}

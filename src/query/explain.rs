#![forbid(unsafe_code)]

//! Human and JSON renderings of a selection decision.

use std::fmt;

use serde::Serialize;

use crate::types::IndexId;

/// One ranked candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateReport {
    /// Index name.
    pub index: String,
    /// Index identifier.
    pub index_id: IndexId,
    /// Whether this is the table's primary index.
    pub primary: bool,
    /// Whether the index supplies every referenced column.
    pub covering: bool,
    /// Lower bounds consumed, in index column order.
    pub start_bounds: usize,
    /// Upper bounds consumed, in index column order.
    pub end_bounds: usize,
    /// Estimated cost; `f64::MAX` for non-covering candidates.
    pub cost: f64,
    /// Start key, lowercase hex.
    pub start_key: String,
    /// End key, lowercase hex.
    pub end_key: String,
}

/// Full account of one selection call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectionExplain {
    /// Scanned table.
    pub table: String,
    /// Filter as SQL text.
    pub filter: String,
    /// Derived column ranges as `column: range` lines, in column id order.
    pub bounds: Vec<String>,
    /// Candidates in ranked order; the first one was committed.
    pub candidates: Vec<CandidateReport>,
    /// Name of the committed index.
    pub chosen: String,
    /// Committed start key, lowercase hex.
    pub start_key: String,
    /// Committed end key, lowercase hex.
    pub end_key: String,
}

impl fmt::Display for SelectionExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "table:  {}", self.table)?;
        writeln!(f, "filter: {}", self.filter)?;
        if self.bounds.is_empty() {
            writeln!(f, "bounds: none")?;
        } else {
            writeln!(f, "bounds:")?;
            for line in &self.bounds {
                writeln!(f, "  {line}")?;
            }
        }
        writeln!(
            f,
            "{:<4} {:<20} {:<9} {:<8} {:>5} {:>5} {:>12}",
            "rank", "index", "kind", "covering", "start", "end", "cost"
        )?;
        for (rank, c) in self.candidates.iter().enumerate() {
            let kind = if c.primary { "primary" } else { "secondary" };
            let cost = if c.covering {
                format!("{:.3}", c.cost)
            } else {
                "inf".to_owned()
            };
            writeln!(
                f,
                "{:<4} {:<20} {:<9} {:<8} {:>5} {:>5} {:>12}",
                rank, c.index, kind, c.covering, c.start_bounds, c.end_bounds, cost
            )?;
        }
        writeln!(f, "chosen: {}", self.chosen)?;
        write!(f, "span:   [{}, {})", self.start_key, self.end_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, cost: f64, covering: bool) -> CandidateReport {
        CandidateReport {
            index: name.to_owned(),
            index_id: IndexId(1),
            primary: name == "primary",
            covering,
            start_bounds: 1,
            end_bounds: 1,
            cost,
            start_key: "00".into(),
            end_key: "01".into(),
        }
    }

    fn explain() -> SelectionExplain {
        SelectionExplain {
            table: "t".into(),
            filter: "b = 5".into(),
            bounds: vec!["b: >= 5 AND <= 5".into()],
            candidates: vec![
                report("idx_b", 1.0, true),
                report("primary", 2000.0, true),
                report("uniq_b", f64::MAX, false),
            ],
            chosen: "idx_b".into(),
            start_key: "00".into(),
            end_key: "01".into(),
        }
    }

    #[test]
    fn text_lists_candidates_in_rank_order() {
        let text = explain().to_string();
        let idx = text.find("idx_b").unwrap();
        let primary = text.find("primary").unwrap();
        assert!(idx < primary);
        assert!(text.contains("inf"));
        assert!(text.ends_with("span:   [00, 01)"));
    }

    #[test]
    fn json_carries_hex_keys() {
        let value = serde_json::to_value(explain()).unwrap();
        assert_eq!(value["chosen"], "idx_b");
        assert_eq!(value["candidates"][0]["start_key"], "00");
        assert_eq!(value["candidates"][2]["covering"], false);
    }
}

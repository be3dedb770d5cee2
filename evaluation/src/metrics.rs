//! Ranking metrics.

/// One row per query; `row[i]` is whether the hit at rank `i + 1` was the
/// expected posting. Every row is exactly `top_k` long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceMatrix {
    top_k: usize,
    rows: Vec<Vec<bool>>,
}

impl RelevanceMatrix {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            rows: Vec::new(),
        }
    }

    /// Append the row for one query's ranked ids.
    pub fn push_ranked<S: AsRef<str>>(&mut self, ranked_ids: &[S], expected_id: &str) {
        self.rows
            .push(relevance_row(ranked_ids, expected_id, self.top_k));
    }

    /// Append a query that produced no results.
    pub fn push_miss(&mut self) {
        self.rows.push(vec![false; self.top_k]);
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn hit_rate(&self) -> f64 {
        hit_rate(&self.rows)
    }

    pub fn mrr(&self) -> f64 {
        mrr(&self.rows)
    }

    /// 1-based rank of the first relevant hit per row.
    pub fn first_relevant_ranks(&self) -> Vec<Option<usize>> {
        self.rows.iter().map(|row| first_relevant(row.as_slice())).collect()
    }
}

/// Relevance flags for `ranked_ids`, truncated or padded with `false` to
/// `top_k`.
pub fn relevance_row<S: AsRef<str>>(ranked_ids: &[S], expected_id: &str, top_k: usize) -> Vec<bool> {
    let mut row: Vec<bool> = ranked_ids
        .iter()
        .take(top_k)
        .map(|id| id.as_ref() == expected_id)
        .collect();
    row.resize(top_k, false);
    row
}

fn first_relevant(row: &[bool]) -> Option<usize> {
    row.iter().position(|relevant| *relevant).map(|index| index + 1)
}

/// Fraction of rows with at least one relevant hit; 0.0 for no rows.
pub fn hit_rate(rows: &[Vec<bool>]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let hits = rows.iter().filter(|row| row.contains(&true)).count();
    hits as f64 / rows.len() as f64
}

/// Mean over rows of `1 / rank` of the first relevant hit (0 when none);
/// 0.0 for no rows.
pub fn mrr(rows: &[Vec<bool>]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let total: f64 = rows
        .iter()
        .filter_map(|row| first_relevant(row.as_slice()))
        .map(|rank| 1.0 / rank as f64)
        .sum();
    total / rows.len() as f64
}

use std::fmt::Display;

use tracing::warn;

use crate::{
    error::{KstudyError, Result},
    types::{RankableItem, Ranked},
};

/// Looks up the popularity metric for an identifier.
pub trait MetricResolver {
    type Error: Display;

    fn resolve(&self, id: &str) -> std::result::Result<u64, Self::Error>;
}

impl<F, E> MetricResolver for F
where
    F: Fn(&str) -> std::result::Result<u64, E>,
    E: Display,
{
    type Error = E;

    fn resolve(&self, id: &str) -> std::result::Result<u64, E> {
        self(id)
    }
}

/// Keeps the `top_k` most popular items, most popular first.
#[derive(Debug, Clone, Copy)]
pub struct ViewRanker {
    top_k: usize,
}

impl ViewRanker {
    pub fn new(top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(KstudyError::invalid_input("top_k must be at least 1"));
        }
        Ok(Self { top_k })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn rank<I, S, R>(&self, ids: I, resolver: &R) -> Vec<RankableItem>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: MetricResolver + ?Sized,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        self.rank_by(ids, |id| id.as_str(), resolver)
            .into_iter()
            .map(|ranked| RankableItem {
                id: ranked.item,
                metric: ranked.metric,
            })
            .collect()
    }

    /// Ranks arbitrary records by the metric of the identifier `id_of` picks.
    ///
    /// The resolver is called once per record. A failed lookup ranks the record
    /// with metric 0; ties keep their input order.
    pub fn rank_by<T, F, R>(&self, items: Vec<T>, id_of: F, resolver: &R) -> Vec<Ranked<T>>
    where
        F: Fn(&T) -> &str,
        R: MetricResolver + ?Sized,
    {
        let mut ranked: Vec<Ranked<T>> = items
            .into_iter()
            .map(|item| {
                let metric = match resolver.resolve(id_of(&item)) {
                    Ok(metric) => metric,
                    Err(e) => {
                        warn!(id = id_of(&item), error = %e, "metric unavailable, ranking as 0");
                        0
                    }
                };
                Ranked { item, metric }
            })
            .collect();

        // `sort_by` is stable, so ties stay in input order
        ranked.sort_by(|a, b| b.metric.cmp(&a.metric));
        ranked.truncate(self.top_k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    fn table(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn keeps_top_k_descending_with_stable_ties() {
        let views = table(&[("a", 5), ("b", 9), ("c", 9), ("d", 1)]);
        let resolver = |id: &str| views.get(id).copied().ok_or("missing");

        let ranked = ViewRanker::new(2).unwrap().rank(["a", "b", "c", "d"], &resolver);

        assert_eq!(
            ranked,
            vec![
                RankableItem { id: "b".into(), metric: 9 },
                RankableItem { id: "c".into(), metric: 9 },
            ]
        );
    }

    #[test]
    fn failed_lookups_rank_as_zero() {
        let views = table(&[("a", 3)]);
        let resolver = |id: &str| views.get(id).copied().ok_or("quota exceeded");

        let ranked = ViewRanker::new(5).unwrap().rank(["x", "a", "y"], &resolver);

        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "x", "y"]);
        assert_eq!(ranked[1].metric, 0);
    }

    #[test]
    fn short_input_returns_everything() {
        let resolver = |_: &str| Ok::<u64, String>(7);
        let ranked = ViewRanker::new(50).unwrap().rank(["only"], &resolver);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn resolves_each_item_once() {
        let calls = RefCell::new(Vec::new());
        let resolver = |id: &str| {
            calls.borrow_mut().push(id.to_string());
            Ok::<u64, String>(id.len() as u64)
        };

        ViewRanker::new(1).unwrap().rank(["aaa", "b", "cc"], &resolver);

        assert_eq!(*calls.borrow(), ["aaa", "b", "cc"]);
    }

    #[test]
    fn rank_by_carries_records() {
        let records = vec![("v1", "first"), ("v2", "second")];
        let resolver = |id: &str| Ok::<u64, String>(if id == "v2" { 100 } else { 10 });

        let ranked = ViewRanker::new(3).unwrap().rank_by(records, |r| r.0, &resolver);

        assert_eq!(ranked[0].item.1, "second");
        assert_eq!(ranked[0].metric, 100);
    }

    #[test]
    fn zero_k_is_rejected() {
        assert!(ViewRanker::new(0).is_err());
    }
}

//! In-process evaluation history.
//!
//! Records live only for the lifetime of the process. Each record sits
//! behind its own mutex so concurrent human judgments on the same record
//! are serialized here rather than inside the evaluation core.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use crate::domain::{Decision, Evaluation, HistorySummary, UseCase};
use crate::error::{EvalError, EvalResult};

/// Filter for listing evaluations.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub use_case: Option<UseCase>,
    pub ai_decision: Option<Decision>,
}

impl HistoryFilter {
    fn matches(&self, evaluation: &Evaluation) -> bool {
        self.use_case.map_or(true, |u| evaluation.use_case == u)
            && self.ai_decision.map_or(true, |d| evaluation.ai_decision == d)
    }
}

#[derive(Default)]
struct Records {
    /// Insertion order.
    order: Vec<Uuid>,
    by_id: HashMap<Uuid, Arc<Mutex<Evaluation>>>,
}

/// Shared handle to the evaluation history.
#[derive(Clone, Default)]
pub struct EvaluationHistory {
    records: Arc<RwLock<Records>>,
}

impl EvaluationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly created evaluation.
    pub fn insert(&self, evaluation: Evaluation) -> EvalResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        let id = evaluation.id;
        if records.by_id.contains_key(&id) {
            return Err(EvalError::Internal(format!(
                "evaluation {} is already stored",
                id
            )));
        }
        records.order.push(id);
        records.by_id.insert(id, Arc::new(Mutex::new(evaluation)));
        Ok(())
    }

    /// Snapshot of one evaluation.
    pub fn get(&self, id: Uuid) -> EvalResult<Evaluation> {
        let record = self.record(id)?;
        let evaluation = record.lock().map_err(poisoned)?;
        Ok(evaluation.clone())
    }

    /// Run `update` against one record while holding its lock.
    ///
    /// Returns a snapshot of the record after the update. If `update` fails
    /// the error is returned and nothing else changes.
    pub fn update<F>(&self, id: Uuid, update: F) -> EvalResult<Evaluation>
    where
        F: FnOnce(&mut Evaluation) -> EvalResult<()>,
    {
        let record = self.record(id)?;
        let mut evaluation = record.lock().map_err(poisoned)?;
        update(&mut evaluation)?;
        Ok(evaluation.clone())
    }

    /// Newest-first page of evaluations matching `filter`.
    pub fn list(
        &self,
        filter: HistoryFilter,
        limit: usize,
        offset: usize,
    ) -> EvalResult<(Vec<Evaluation>, usize)> {
        let matching: Vec<Evaluation> = self
            .all()?
            .into_iter()
            .rev()
            .filter(|e| filter.matches(e))
            .collect();
        let total = matching.len();
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    /// Every evaluation, oldest first.
    pub fn all(&self) -> EvalResult<Vec<Evaluation>> {
        let handles: Vec<Arc<Mutex<Evaluation>>> = {
            let records = self.records.read().map_err(poisoned)?;
            records
                .order
                .iter()
                .filter_map(|id| records.by_id.get(id).cloned())
                .collect()
        };

        handles
            .iter()
            .map(|h| h.lock().map(|e| e.clone()).map_err(poisoned))
            .collect()
    }

    pub fn summary(&self) -> EvalResult<HistorySummary> {
        let all = self.all()?;
        Ok(HistorySummary::from_evaluations(&all))
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, id: Uuid) -> EvalResult<Arc<Mutex<Evaluation>>> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| EvalError::NotFound(format!("Evaluation {} not found", id)))
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> EvalError {
    EvalError::Internal("evaluation history lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::domain::{HumanJudgment, ScoreMap};

    fn evaluation(use_case: UseCase, score: f64, decision: Decision) -> Evaluation {
        Evaluation::new(use_case, "content", None, ScoreMap::new(), score, decision)
    }

    #[test]
    fn test_insert_and_get() {
        let history = EvaluationHistory::new();
        let e = evaluation(UseCase::MarketingCopy, 4.2, Decision::AutoPass);
        let id = e.id;
        history.insert(e.clone()).unwrap();

        assert_eq!(history.get(id).unwrap(), e);
        assert_eq!(history.len(), 1);
        assert!(history.insert(e).is_err());
        assert!(matches!(
            history.get(Uuid::new_v4()),
            Err(EvalError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_newest_first_with_filters() {
        let history = EvaluationHistory::new();
        let first = evaluation(UseCase::MarketingCopy, 4.5, Decision::AutoPass);
        let second = evaluation(UseCase::BilingualCompliance, 2.0, Decision::AutoFail);
        let third = evaluation(UseCase::MarketingCopy, 3.0, Decision::HumanReview);
        for e in [&first, &second, &third] {
            history.insert(e.clone()).unwrap();
        }

        let (page, total) = history.list(HistoryFilter::default(), 10, 0).unwrap();
        assert_eq!(total, 3);
        let ids: Vec<Uuid> = page.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let filter = HistoryFilter {
            use_case: Some(UseCase::MarketingCopy),
            ai_decision: None,
        };
        let (page, total) = history.list(filter, 1, 1).unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].id, first.id);

        let all = history.all().unwrap();
        assert_eq!(all[0].id, first.id);
    }

    #[test]
    fn test_concurrent_attach_has_one_winner() {
        const REVIEWERS: usize = 8;

        let history = EvaluationHistory::new();
        let e = evaluation(UseCase::BilingualCompliance, 3.0, Decision::HumanReview);
        let id = e.id;
        history.insert(e).unwrap();

        let barrier = Arc::new(Barrier::new(REVIEWERS));
        let handles: Vec<_> = (0..REVIEWERS)
            .map(|reviewer| {
                let history = history.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let score = 1.0 + reviewer as f64 * 0.5;
                    let judgment = HumanJudgment {
                        scores: ScoreMap::new(),
                        overall_score: score,
                        decision: Decision::HumanReview,
                        feedback: Some(format!("reviewer {}", reviewer)),
                    };
                    barrier.wait();
                    (score, history.update(id, |e| e.attach_human(judgment)))
                })
            })
            .collect();

        let results: Vec<(f64, EvalResult<Evaluation>)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<f64> = results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(score, _)| *score)
            .collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter_map(|(_, r)| r.as_ref().err())
            .all(|err| matches!(err, EvalError::AlreadyJudged(judged) if *judged == id)));
        assert_eq!(history.get(id).unwrap().human_overall_score(), Some(winners[0]));
    }

    #[test]
    fn test_failed_update_leaves_record() {
        let history = EvaluationHistory::new();
        let e = evaluation(UseCase::MarketingCopy, 3.0, Decision::HumanReview);
        let id = e.id;
        history.insert(e).unwrap();

        let judgment = HumanJudgment {
            scores: ScoreMap::new(),
            overall_score: 4.0,
            decision: Decision::AutoPass,
            feedback: None,
        };
        let updated = history
            .update(id, |e| e.attach_human(judgment.clone()))
            .unwrap();
        assert!(updated.is_judged());

        let err = history
            .update(id, |e| e.attach_human(judgment.clone()))
            .unwrap_err();
        assert!(matches!(err, EvalError::AlreadyJudged(_)));
        assert_eq!(history.get(id).unwrap().human_overall_score(), Some(4.0));
        assert_eq!(history.summary().unwrap().human_judged, 1);
    }
}

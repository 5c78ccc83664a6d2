// Counted accumulator for per-record scores
//
// Sized upfront to the anonymized population. Normalization needs population
// statistics, so nothing leaves the accumulator until every slot is filled.

use crate::error::{EvalError, Result};
use crate::scoring::scorer::NeighborScore;

/// Collects exactly one score per anonymized record
#[derive(Debug)]
pub struct ScoreAccumulator {
    slots: Vec<Option<NeighborScore>>,
    received: usize,
}

impl ScoreAccumulator {
    /// Accumulator expecting `expected` scores, indexed `0..expected`
    pub fn new(expected: usize) -> Self {
        Self {
            slots: (0..expected).map(|_| None).collect(),
            received: 0,
        }
    }

    pub fn expected(&self) -> usize {
        self.slots.len()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn is_complete(&self) -> bool {
        self.received == self.slots.len()
    }

    /// Store the score of the record at position `index`
    ///
    /// # Errors
    /// `InvalidInput` if `index` is outside the population or was already
    /// filled.
    pub fn insert(&mut self, index: usize, score: NeighborScore) -> Result<()> {
        let expected = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            EvalError::invalid_input(format!(
                "score index {} outside population of {}",
                index, expected
            ))
        })?;

        if slot.is_some() {
            return Err(EvalError::invalid_input(format!(
                "record at index {} scored twice",
                index
            )));
        }

        *slot = Some(score);
        self.received += 1;
        Ok(())
    }

    /// Release the scores in population order
    ///
    /// # Errors
    /// `IncompletePopulation` unless every record has been scored.
    pub fn into_scores(self) -> Result<Vec<NeighborScore>> {
        if !self.is_complete() {
            return Err(EvalError::IncompletePopulation {
                expected: self.slots.len(),
                received: self.received,
            });
        }

        Ok(self.slots.into_iter().flatten().collect())
    }

    /// Release only the minimum distances, in population order
    pub fn into_minimum_distances(self) -> Result<Vec<f64>> {
        Ok(self
            .into_scores()?
            .into_iter()
            .map(|score| score.minimum)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(id: &str, minimum: f64) -> NeighborScore {
        NeighborScore {
            record_id: id.to_string(),
            candidates: Vec::new(),
            minimum,
            nearest: 0,
        }
    }

    #[test]
    fn test_out_of_order_inserts_restore_population_order() {
        let mut acc = ScoreAccumulator::new(3);
        acc.insert(2, score("c", 3.0)).unwrap();
        acc.insert(0, score("a", 1.0)).unwrap();
        assert!(!acc.is_complete());
        acc.insert(1, score("b", 2.0)).unwrap();
        assert!(acc.is_complete());

        assert_eq!(acc.into_minimum_distances().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_incomplete_population_rejected() {
        let mut acc = ScoreAccumulator::new(3);
        acc.insert(0, score("a", 1.0)).unwrap();

        let err = acc.into_scores().unwrap_err();
        assert!(matches!(
            err,
            EvalError::IncompletePopulation {
                expected: 3,
                received: 1
            }
        ));
    }

    #[test]
    fn test_duplicate_and_out_of_range_rejected() {
        let mut acc = ScoreAccumulator::new(2);
        acc.insert(0, score("a", 1.0)).unwrap();
        assert!(acc.insert(0, score("a", 1.0)).is_err());
        assert!(acc.insert(5, score("z", 1.0)).is_err());
        assert_eq!(acc.received(), 1);
    }

    #[test]
    fn test_empty_population_is_complete() {
        let acc = ScoreAccumulator::new(0);
        assert!(acc.is_complete());
        assert!(acc.into_scores().unwrap().is_empty());
    }
}

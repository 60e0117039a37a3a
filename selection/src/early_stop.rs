//! Plateau detection for iterative optimization.

/// Signals a stop once the loss has stayed within `delta` of the previous
/// value for more than `patience` consecutive observations.
///
/// The first observation never stops. A change of `delta` or more resets
/// the streak.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    pub patience: usize,
    pub delta: f64,
    counter: usize,
    prev_loss: Option<f64>,
}

impl EarlyStopping {
    pub fn new(patience: usize, delta: f64) -> Self {
        EarlyStopping {
            patience,
            delta,
            counter: 0,
            prev_loss: None,
        }
    }

    /// Feed the next loss. Returns `true` when optimization should stop.
    pub fn stop(&mut self, loss: f64) -> bool {
        let Some(prev) = self.prev_loss else {
            self.prev_loss = Some(loss);
            return false;
        };

        if (loss - prev).abs() < self.delta {
            self.counter += 1;
            if self.counter > self.patience {
                return true;
            }
        } else {
            self.counter = 0;
        }
        self.prev_loss = Some(loss);
        false
    }

    /// Length of the current near-constant streak.
    pub fn counter(&self) -> usize {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_never_stops() {
        let mut es = EarlyStopping::new(0, 1.0);
        assert!(!es.stop(5.0));
    }

    #[test]
    fn test_constant_loss_stops_after_patience_plus_two() {
        for patience in 0..6 {
            let mut es = EarlyStopping::new(patience, 1e-4);
            for i in 1..=patience + 1 {
                assert!(!es.stop(2.5), "patience={patience}: stopped early at observation {i}");
            }
            assert!(es.stop(2.5), "patience={patience}: should stop at observation {}", patience + 2);
        }
    }

    #[test]
    fn test_large_change_resets_streak() {
        let mut es = EarlyStopping::new(2, 1e-3);
        assert!(!es.stop(1.0));
        assert!(!es.stop(1.0));
        assert!(!es.stop(1.0));
        assert_eq!(es.counter(), 2);

        assert!(!es.stop(2.0));
        assert_eq!(es.counter(), 0);

        assert!(!es.stop(2.0));
        assert!(!es.stop(2.0));
        assert!(es.stop(2.0));
    }

    #[test]
    fn test_slow_drift_below_delta_counts_as_flat() {
        let mut es = EarlyStopping::new(1, 1e-2);
        assert!(!es.stop(0.000));
        assert!(!es.stop(0.005));
        assert!(es.stop(0.010));
    }
}

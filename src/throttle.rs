/// Timestamp throttle: the first call in a burst fires, later calls are
/// dropped until `interval_ms` has passed since the last one that fired.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last_fired: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_fired: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Returns whether the caller should run its effect at `now_ms`.
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        match self.last_fired {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_fired = Some(now_ms);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_fires_immediately() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.try_fire(0.0));
    }

    #[test]
    fn drops_calls_inside_interval() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.try_fire(100.0));
        assert!(!throttle.try_fire(105.0));
        assert!(!throttle.try_fire(115.9));
        assert!(throttle.try_fire(116.0));
    }

    #[test]
    fn dropped_calls_do_not_extend_the_window() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.try_fire(0.0));
        for t in 1..16 {
            assert!(!throttle.try_fire(t as f64));
        }
        // measured from the last call that fired, not the last call seen
        assert!(throttle.try_fire(16.0));
    }

    #[test]
    fn spaced_calls_all_fire() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.try_fire(0.0));
        assert!(throttle.try_fire(20.0));
        assert!(throttle.try_fire(40.0));
    }
}

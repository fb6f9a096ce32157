/// Leading-edge rate limiter for high-frequency page events

#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last_run_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: u32) -> Self {
        Throttle {
            interval_ms: f64::from(interval_ms),
            last_run_ms: None,
        }
    }

    /// True if a call at `now_ms` may run; records the run if so
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_run_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_run_ms = Some(now_ms);
                true
            }
        }
    }
}

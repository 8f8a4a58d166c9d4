use std::time::Instant;

/// Millisecond stopwatch for the debug timing lines.
pub struct Timer{
    start: Instant,
    prev: u128,
}

impl Timer{
    pub fn new() -> Self{
        Self{ start: Instant::now(), prev: 0 }
    }

    /// Milliseconds since the last checkpoint.
    pub fn elapsed(&self) -> u128{
        self.start.elapsed().as_millis() - self.prev
    }

    pub fn checkpoint(&mut self){
        self.prev = self.start.elapsed().as_millis();
    }

    /// Logs the time spent in `stage` and starts timing the next one.
    pub fn lap(&mut self, stage: &str){
        log::debug!("{}: {:?}ms", stage, self.elapsed());
        self.checkpoint();
    }
}

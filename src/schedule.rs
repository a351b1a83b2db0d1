//! Delayed actions ticked from the main update loop.
//!
//! Nothing here runs on its own thread: the owner advances the clock once per
//! frame and applies whatever came due. Actions due at the same instant come
//! out in the order they were scheduled.

#[derive(Clone, Debug)]
struct Scheduled<E> {
    due: f64,
    seq: u64,
    action: E,
}

#[derive(Clone, Debug)]
pub struct Scheduler<E> {
    now: f64,
    next_seq: u64,
    /// Kept sorted by `(due, seq)`.
    pending: Vec<Scheduled<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds advanced so far.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run `action` once, `delay` seconds from now.
    pub fn schedule_in(&mut self, delay: f32, action: E) {
        let due = self.now + f64::from(delay.max(0.0));
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self
            .pending
            .partition_point(|entry| (entry.due, entry.seq) <= (due, seq));
        self.pending.insert(at, Scheduled { due, seq, action });
    }

    /// Chain of actions; each delay is measured from the previous step.
    pub fn schedule_sequence(&mut self, steps: impl IntoIterator<Item = (f32, E)>) {
        let mut offset = 0.0;
        for (delay, action) in steps {
            offset += delay.max(0.0);
            self.schedule_in(offset, action);
        }
    }

    /// Move the clock forward and hand back every action now due.
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        self.now += f64::from(dt.max(0.0));
        let due = self.pending.partition_point(|entry| entry.due <= self.now);
        self.pending.drain(..due).map(|entry| entry.action).collect()
    }
}

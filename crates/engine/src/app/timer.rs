#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    due_ms: u64,
    payload: T,
}

/// One-shot calls keyed by scene-time deadline. A call is due once the
/// current time reaches its deadline.
#[derive(Debug, Clone)]
pub struct DelayedCalls<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for DelayedCalls<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DelayedCalls<T> {
    pub fn schedule(&mut self, due_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.push(Pending {
            id,
            due_ms,
            payload,
        });
        id
    }

    /// Returns true when the call was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| pending.id != id);
        before != self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|pending| pending.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Removes and returns every call due at `now_ms`, earliest deadline
    /// first, ties in scheduling order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<(TimerId, T)> {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due_ms <= now_ms {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|pending| (pending.due_ms, pending.id));
        due.into_iter()
            .map(|pending| (pending.id, pending.payload))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_fire_once_at_their_deadline() {
        let mut calls = DelayedCalls::default();
        calls.schedule(2000, "expire");
        assert!(calls.drain_due(1999).is_empty());
        let due = calls.drain_due(2000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1, "expire");
        assert!(calls.drain_due(5000).is_empty());
    }

    #[test]
    fn cancelled_calls_never_fire() {
        let mut calls = DelayedCalls::default();
        let hide = calls.schedule(1800, "hide");
        assert!(calls.cancel(hide));
        assert!(!calls.cancel(hide));
        assert!(calls.drain_due(10_000).is_empty());
    }

    #[test]
    fn due_calls_come_back_in_deadline_order() {
        let mut calls = DelayedCalls::default();
        calls.schedule(300, 3);
        calls.schedule(100, 1);
        calls.schedule(200, 2);
        let payloads: Vec<i32> = calls.drain_due(300).into_iter().map(|(_, p)| p).collect();
        assert_eq!(payloads, vec![1, 2, 3]);
    }
}

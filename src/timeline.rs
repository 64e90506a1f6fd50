pub const TYPING_INTERVAL_MS: u64 = 500;
pub const RESPONSE_DELAY_MS: u64 = 1500;
const TYPING_FRAMES: usize = 4;

pub type QueryId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Typing { query_id: QueryId, dots: usize },
    Respond { query_id: QueryId, query: String },
}

#[derive(Debug)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    effect: Effect,
}

#[derive(Debug, Default)]
pub struct Timeline {
    now_ms: u64,
    next_seq: u64,
    next_query_id: QueryId,
    pending: Vec<Scheduled>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|scheduled| scheduled.due_ms).min()
    }

    pub fn schedule_query(&mut self, query: &str) -> QueryId {
        let query_id = self.next_query_id;
        self.next_query_id += 1;

        let mut offset = TYPING_INTERVAL_MS;
        let mut dots = 0;
        while offset < RESPONSE_DELAY_MS {
            dots = (dots + 1) % TYPING_FRAMES;
            self.push(offset, Effect::Typing { query_id, dots });
            offset += TYPING_INTERVAL_MS;
        }

        self.push(
            RESPONSE_DELAY_MS,
            Effect::Respond {
                query_id,
                query: query.to_string(),
            },
        );
        query_id
    }

    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<Effect> {
        self.now_ms += elapsed_ms;

        let now = self.now_ms;
        let (mut due, waiting): (Vec<Scheduled>, Vec<Scheduled>) = self
            .pending
            .drain(..)
            .partition(|scheduled| scheduled.due_ms <= now);
        self.pending = waiting;

        due.sort_by_key(|scheduled| (scheduled.due_ms, scheduled.seq));
        due.into_iter().map(|scheduled| scheduled.effect).collect()
    }

    fn push(&mut self, offset_ms: u64, effect: Effect) {
        self.pending.push(Scheduled {
            due_ms: self.now_ms + offset_ms,
            seq: self.next_seq,
            effect,
        });
        self.next_seq += 1;
    }
}

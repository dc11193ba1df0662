use std::collections::VecDeque;

/// Bounded FIFO buffer; the oldest element is dropped, when a new one exceeds the capacity
pub struct RingBuffer<T> {
    max_buffer_len: usize,
    buffer: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(max_buffer_len: usize) -> Self {
        assert!(max_buffer_len > 0);
        Self {
            max_buffer_len,
            buffer: VecDeque::with_capacity(max_buffer_len),
        }
    }

    pub fn len(&self) -> usize { self.buffer.len() }

    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    pub fn add(
        &mut self,
        element: T,
    ) {
        if self.buffer.len() + 1 > self.max_buffer_len {
            self.buffer.pop_front();
        }
        self.buffer.push_back(element);
    }

    pub fn clear(&mut self) { self.buffer.clear() }

    pub fn iter(&self) -> impl Iterator<Item = &T> { self.buffer.iter() }
}

impl RingBuffer<f32> {
    /// mean of all buffered values; 0.0 for an empty buffer
    pub fn avg(&self) -> f32 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.buffer.iter().sum::<f32>() / self.buffer.len() as f32
        }
    }

    pub fn min(&self) -> f32 {
        self.buffer.iter().copied().reduce(f32::min).unwrap_or(0.0)
    }
}

/// One step of an episode
#[derive(Debug, Clone)]
pub struct StepRecord<K, A> {
    pub state: K,
    pub action: A,
    pub reward: f32,
    pub next_state: K,
    pub done: bool,
}

/// Steps of the running episode.
/// Lives only until the episode ends - afterwards only its cumulative reward is kept.
#[derive(Debug, Clone)]
pub struct EpisodeRecord<K, A> {
    steps: Vec<StepRecord<K, A>>,
}

impl<K, A> EpisodeRecord<K, A> {
    pub fn new() -> Self { Self { steps: vec![] } }

    pub fn add(
        &mut self,
        step: StepRecord<K, A>,
    ) {
        self.steps.push(step)
    }

    pub fn len(&self) -> usize { self.steps.len() }

    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    pub fn cumulative_reward(&self) -> f32 { self.steps.iter().map(|s| s.reward).sum() }

    pub fn ended(&self) -> bool { self.steps.last().is_some_and(|s| s.done) }

    pub fn steps(&self) -> &[StepRecord<K, A>] { &self.steps }

    pub fn clear(&mut self) { self.steps.clear() }
}

impl<K, A> Default for EpisodeRecord<K, A> {
    fn default() -> Self { Self::new() }
}

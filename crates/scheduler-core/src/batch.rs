use std::collections::HashMap;

use crate::color::Color;

/// Monotonic per-color batch sequence numbers.
#[derive(Debug, Clone, Default)]
pub struct BatchCounter {
    sequence: HashMap<Color, u32>,
}

impl BatchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the sequence for `color` and format the resulting batch id as `B-<color>-<NNN>`.
    pub fn next_batch_id(&mut self, color: Color) -> String {
        let seq = self.sequence.entry(color).or_insert(0);
        *seq += 1;
        format!("B-{color}-{seq:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_ids_increment_per_color_independently() {
        let mut counter = BatchCounter::new();
        assert_eq!(counter.next_batch_id(Color::C1), "B-C1-001");
        assert_eq!(counter.next_batch_id(Color::C2), "B-C2-001");
        assert_eq!(counter.next_batch_id(Color::C1), "B-C1-002");
    }
}

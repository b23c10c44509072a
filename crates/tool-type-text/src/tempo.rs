use rand::Rng;

use crate::policy::TypeDelays;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingStep {
    pub ch: char,
    pub delay_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypingPlan {
    pub steps: Vec<TypingStep>,
}

/// Produces the keystroke schedule for natural typing.
pub trait TempoPort: Send + Sync {
    fn build_plan(&self, text: &str) -> TypingPlan;
}

/// Uniformly random delay per keystroke within a range.
#[derive(Clone, Debug)]
pub struct NaturalTempo {
    delays: TypeDelays,
}

impl NaturalTempo {
    pub fn new(delays: TypeDelays) -> Self {
        Self { delays }
    }
}

impl TempoPort for NaturalTempo {
    fn build_plan(&self, text: &str) -> TypingPlan {
        let mut rng = rand::thread_rng();
        let (lo, hi) = (
            self.delays.min_ms.min(self.delays.max_ms),
            self.delays.min_ms.max(self.delays.max_ms),
        );
        TypingPlan {
            steps: text
                .chars()
                .map(|ch| TypingStep {
                    ch,
                    delay_ms: rng.gen_range(lo..=hi),
                })
                .collect(),
        }
    }
}

/// Zero-delay tempo.
#[derive(Clone, Debug, Default)]
pub struct NullTempo;

impl TempoPort for NullTempo {
    fn build_plan(&self, text: &str) -> TypingPlan {
        TypingPlan {
            steps: text.chars().map(|ch| TypingStep { ch, delay_ms: 0 }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_delays_stay_in_range() {
        let tempo = NaturalTempo::new(TypeDelays {
            min_ms: 30,
            max_ms: 120,
        });
        let plan = tempo.build_plan("Widget Pro");
        assert_eq!(plan.steps.len(), 10);
        assert!(plan
            .steps
            .iter()
            .all(|s| (30..=120).contains(&s.delay_ms)));
    }
}

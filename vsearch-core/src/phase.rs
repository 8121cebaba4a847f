/// Defines experiment phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn allows_input(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_instructions(&self) -> bool {
        false
    }
    fn is_trials(&self) -> bool {
        false
    }
    fn is_debrief(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq)]
pub enum StandardPhase {
    Instructions,
    Trials,
    Debrief,
}

impl Default for StandardPhase {
    fn default() -> Self {
        StandardPhase::Instructions
    }
}

impl Phase for StandardPhase {
    fn allows_input(&self) -> bool {
        !matches!(self, Self::Debrief)
    }
    fn next(&self) -> Option<Self> {
        use StandardPhase::*;
        Some(match self {
            Instructions => Trials,
            Trials => Debrief,
            Debrief => return None,
        })
    }

    fn is_instructions(&self) -> bool {
        matches!(self, StandardPhase::Instructions)
    }

    fn is_trials(&self) -> bool {
        matches!(self, StandardPhase::Trials)
    }

    fn is_debrief(&self) -> bool {
        matches!(self, StandardPhase::Debrief)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_run_in_order_and_stop() {
        let mut phase = StandardPhase::default();
        assert!(phase.is_instructions());
        phase = phase.next().unwrap();
        assert!(phase.is_trials() && phase.allows_input());
        phase = phase.next().unwrap();
        assert!(phase.is_debrief() && !phase.allows_input());
        assert_eq!(phase.next(), None);
    }
}

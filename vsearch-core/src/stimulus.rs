use crate::design::Condition;
use crate::geometry::{Aperture, LineGeometry, LineSegment, Orientation};
use rand::Rng;

/// Line segments making up one search display.
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    pub aperture: Aperture,
    pub segments: Vec<LineSegment>,
}

impl Stimulus {
    pub fn set_size(&self) -> usize {
        self.segments.len()
    }

    pub fn count(&self, orientation: Orientation) -> usize {
        self.segments
            .iter()
            .filter(|s| s.orientation == orientation)
            .count()
    }
}

/// Where and how lines are placed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    pub aperture: Aperture,
    pub line: LineGeometry,
}

impl Layout {
    pub fn new(aperture: Aperture, line: LineGeometry) -> Self {
        Self { aperture, line }
    }

    fn place<R: Rng + ?Sized>(&self, orientation: Orientation, rng: &mut R) -> LineSegment {
        let start = self.aperture.choose_start_point(&self.line, rng);
        self.line.segment(orientation, start)
    }

    /// Builds `distractors + 1` segments: `distractors` of the opposite
    /// orientation plus the target, or one more distractor when the target is
    /// absent so set size does not give the answer away.
    ///
    /// Positions are drawn independently; segments may overlap.
    pub fn build_stimulus<R: Rng + ?Sized>(
        &self,
        target_present: bool,
        target: Orientation,
        distractors: usize,
        rng: &mut R,
    ) -> Stimulus {
        let distractor = target.opposite();
        let mut segments = Vec::with_capacity(distractors + 1);
        for _ in 0..distractors {
            segments.push(self.place(distractor, rng));
        }
        let last = if target_present { target } else { distractor };
        segments.push(self.place(last, rng));

        Stimulus {
            aperture: self.aperture,
            segments,
        }
    }

    pub fn build_for<R: Rng + ?Sized>(&self, condition: &Condition, rng: &mut R) -> Stimulus {
        self.build_stimulus(
            condition.target_present,
            condition.target,
            condition.distractors,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn present_trials_hold_exactly_one_target() {
        let layout = Layout::default();
        let mut rng = StdRng::seed_from_u64(2);
        for &distractors in &[0usize, 1, 5, 20] {
            for target in Orientation::ALL {
                let s = layout.build_stimulus(true, target, distractors, &mut rng);
                assert_eq!(s.set_size(), distractors + 1);
                assert_eq!(s.count(target), 1);
                assert_eq!(s.count(target.opposite()), distractors);
            }
        }
    }

    #[test]
    fn absent_trials_pad_with_a_distractor() {
        let layout = Layout::default();
        let mut rng = StdRng::seed_from_u64(4);
        for target in Orientation::ALL {
            let s = layout.build_stimulus(false, target, 10, &mut rng);
            assert_eq!(s.set_size(), 11);
            assert_eq!(s.count(target), 0);
            assert_eq!(s.count(target.opposite()), 11);
        }
    }

    #[test]
    fn repeated_builds_share_composition_not_positions() {
        let layout = Layout::default();
        let condition = Condition::new(Orientation::Oblique, true, 15);
        let mut rng = StdRng::seed_from_u64(8);
        let a = layout.build_for(&condition, &mut rng);
        let b = layout.build_for(&condition, &mut rng);

        assert_eq!(a.set_size(), b.set_size());
        assert_eq!(a.count(Orientation::Oblique), b.count(Orientation::Oblique));
        for seg in a.segments.iter().chain(&b.segments) {
            assert!(layout.aperture.contains_segment(seg));
        }
    }
}

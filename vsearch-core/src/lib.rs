pub mod design;
pub mod geometry;
pub mod key;
pub mod phase;
pub mod scoring;
pub mod screen;
pub mod stimulus;
pub mod trial;

pub use design::{Condition, DesignFactors, TrialList, build_trial_list};
pub use geometry::{Aperture, LineGeometry, LineSegment, Orientation, Point};
pub use key::Key;
pub use phase::{Phase, StandardPhase};
pub use scoring::{Accuracy, Answer, ResponseKeys, Score, accuracy};
pub use screen::{Screen, Style};
pub use stimulus::{Layout, Stimulus};
pub use trial::TrialResult;

use pazuru_core::game::hint_position;
use pazuru_core::PiecePose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealMode {
    #[default]
    Hidden,
    Hint,
    Exact,
}

impl RevealMode {
    pub fn next(self) -> Self {
        match self {
            RevealMode::Hidden => RevealMode::Hint,
            RevealMode::Hint => RevealMode::Exact,
            RevealMode::Exact => RevealMode::Hidden,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RevealMode::Hidden => "hidden",
            RevealMode::Hint => "hint",
            RevealMode::Exact => "exact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hidden" => Some(RevealMode::Hidden),
            "hint" => Some(RevealMode::Hint),
            "exact" => Some(RevealMode::Exact),
            _ => None,
        }
    }
}

/// Reveal cycle plus the poses captured when it left `Hidden`.
#[derive(Debug, Clone, Default)]
pub struct RevealState {
    mode: RevealMode,
    snapshot: Option<Vec<PiecePose>>,
}

impl RevealState {
    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Moves to the next mode and rewrites `poses` for it.
    pub fn advance(&mut self, poses: &mut [PiecePose], targets: &[(f32, f32)], spread: f32) {
        self.mode = self.mode.next();
        match self.mode {
            RevealMode::Hint => {
                self.snapshot = Some(poses.to_vec());
                for (pose, target) in poses.iter_mut().zip(targets) {
                    pose.pos = hint_position(*target, spread);
                    pose.rotation_deg = 0.0;
                }
            }
            RevealMode::Exact => {
                for (pose, target) in poses.iter_mut().zip(targets) {
                    pose.pos = *target;
                    pose.rotation_deg = 0.0;
                }
            }
            RevealMode::Hidden => {
                if let Some(saved) = self.snapshot.take() {
                    for (pose, saved) in poses.iter_mut().zip(saved) {
                        *pose = saved;
                    }
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.mode = RevealMode::Hidden;
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f32, y: f32, rotation_deg: f32) -> PiecePose {
        PiecePose {
            pos: (x, y),
            rotation_deg,
        }
    }

    #[test]
    fn cycle_visits_hint_exact_then_restores() {
        let targets = [(50.0, 50.0), (150.0, 50.0)];
        let start = vec![pose(300.0, 80.0, 15.0), pose(120.0, 210.0, 40.0)];
        let mut poses = start.clone();
        let mut reveal = RevealState::default();

        reveal.advance(&mut poses, &targets, 1.5);
        assert_eq!(reveal.mode(), RevealMode::Hint);
        assert_eq!(poses[1], pose(225.0, 75.0, 0.0));

        reveal.advance(&mut poses, &targets, 1.5);
        assert_eq!(reveal.mode(), RevealMode::Exact);
        assert_eq!(poses[0], pose(50.0, 50.0, 0.0));
        assert!(reveal.has_snapshot());

        reveal.advance(&mut poses, &targets, 1.5);
        assert_eq!(reveal.mode(), RevealMode::Hidden);
        assert_eq!(poses, start);
        assert!(!reveal.has_snapshot());
    }

    #[test]
    fn parse_accepts_labels() {
        for mode in [RevealMode::Hidden, RevealMode::Hint, RevealMode::Exact] {
            assert_eq!(RevealMode::parse(mode.label()), Some(mode));
        }
        assert_eq!(RevealMode::parse("solved"), None);
    }
}

use glam::Vec3;
use serde::{Deserialize, Serialize};
use vigil_collision::CollisionIndex;
use vigil_input::MoveIntent;

/// Anything that can veto a candidate observer position.
pub trait Obstacles {
    /// Whether a sphere of `radius` at `center` touches an obstacle.
    fn blocks(&self, center: Vec3, radius: f32) -> bool;
}

impl Obstacles for CollisionIndex {
    fn blocks(&self, center: Vec3, radius: f32) -> bool {
        self.query(center, radius)
    }
}

/// Tunables for the drop and the walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Horizontal speed while walking, units per second.
    pub walk_speed: f32,
    /// Descent speed while falling, units per second.
    pub fall_speed: f32,
    pub start_height: f32,
    /// Eye height once landed.
    pub ground_height: f32,
    /// Radius of the sphere used for collision.
    pub radius: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            fall_speed: 30.0,
            start_height: 50.0,
            ground_height: 1.6,
            radius: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionPhase {
    Falling,
    Walking,
}

/// The observer's physical state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverState {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl ObserverState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            grounded: false,
        }
    }
}

/// What one step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Fell,
    Landed,
    Moved,
    Blocked,
    Idle,
}

/// Horizontal `(forward, right)` basis for a view direction.
///
/// The forward vector is flattened onto XZ; returns `None` when the view
/// is vertical or degenerate.
pub fn horizontal_basis(forward: Vec3) -> Option<(Vec3, Vec3)> {
    let flat = Vec3::new(forward.x, 0.0, forward.z).try_normalize()?;
    let right = flat.cross(Vec3::Y).try_normalize()?;
    Some((flat, right))
}

/// View direction for yaw/pitch in radians. Yaw 0 looks down +X.
pub fn forward_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize_or_zero()
}

/// Drives the observer through the drop and then the walk.
#[derive(Debug, Clone)]
pub struct MovementResolver {
    params: MotionParams,
    phase: MotionPhase,
}

impl MovementResolver {
    pub fn new(params: MotionParams) -> Self {
        Self {
            params,
            phase: MotionPhase::Falling,
        }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Observer state at the top of the drop above `(x, z)`.
    pub fn spawn(&self, x: f32, z: f32) -> ObserverState {
        ObserverState::at(Vec3::new(x, self.params.start_height, z))
    }

    /// Advance the observer by `dt` seconds.
    pub fn step(
        &mut self,
        observer: &mut ObserverState,
        intent: MoveIntent,
        forward: Vec3,
        dt: f32,
        obstacles: &impl Obstacles,
    ) -> StepOutcome {
        let dt = dt.max(0.0);
        match self.phase {
            MotionPhase::Falling => self.fall(observer, dt),
            MotionPhase::Walking => self.walk(observer, intent, forward, dt, obstacles),
        }
    }

    fn fall(&mut self, observer: &mut ObserverState, dt: f32) -> StepOutcome {
        let ground = self.params.ground_height;
        observer.position.y = (observer.position.y - self.params.fall_speed * dt).max(ground);
        if observer.position.y <= ground {
            observer.position.y = ground;
            observer.vertical_velocity = 0.0;
            observer.grounded = true;
            self.phase = MotionPhase::Walking;
            tracing::info!(
                x = observer.position.x,
                z = observer.position.z,
                "observer landed"
            );
            StepOutcome::Landed
        } else {
            observer.vertical_velocity = -self.params.fall_speed;
            observer.grounded = false;
            StepOutcome::Fell
        }
    }

    fn walk(
        &mut self,
        observer: &mut ObserverState,
        intent: MoveIntent,
        forward: Vec3,
        dt: f32,
        obstacles: &impl Obstacles,
    ) -> StepOutcome {
        observer.position.y = self.params.ground_height;

        let axes = intent.axes();
        let Some((ahead, right)) = horizontal_basis(forward) else {
            return StepOutcome::Idle;
        };
        let distance = self.params.walk_speed * dt;
        let displacement = ahead * (axes.y * distance) + right * (axes.x * distance);
        if displacement == Vec3::ZERO {
            return StepOutcome::Idle;
        }

        let candidate = observer.position + displacement;
        if obstacles.blocks(candidate, self.params.radius) {
            tracing::trace!(?candidate, "move blocked");
            return StepOutcome::Blocked;
        }
        observer.position = candidate;
        StepOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::{GridCell, PlacedRecord, Record};
    use vigil_input::Direction;

    const DT: f32 = 1.0 / 60.0;

    fn walls(positions: &[(f32, f32)]) -> CollisionIndex {
        let mut index = CollisionIndex::new(5.0);
        for (i, &(x, z)) in positions.iter().enumerate() {
            index
                .add_bound(&PlacedRecord {
                    index: i,
                    cell: GridCell::new(0, i as u32),
                    world_position: Vec3::new(x, 0.0, z),
                    label_anchor: Vec3::new(x, 5.0, z),
                    record: Record::new("n", "n", 0),
                })
                .unwrap();
        }
        index
    }

    fn landed(x: f32, z: f32) -> (MovementResolver, ObserverState) {
        let mut resolver = MovementResolver::new(MotionParams::default());
        let mut observer = resolver.spawn(x, z);
        let empty = CollisionIndex::new(5.0);
        while resolver.step(&mut observer, MoveIntent::default(), Vec3::NEG_Z, 1.0, &empty)
            != StepOutcome::Landed
        {}
        (resolver, observer)
    }

    #[test]
    fn fall_reaches_ground_exactly() {
        let mut resolver = MovementResolver::new(MotionParams::default());
        let mut observer = resolver.spawn(0.0, 0.0);
        let empty = CollisionIndex::new(5.0);

        let mut elapsed = 0.0;
        let mut frames = 0;
        loop {
            let out = resolver.step(&mut observer, MoveIntent::default(), Vec3::NEG_Z, DT, &empty);
            elapsed += DT;
            frames += 1;
            assert!(observer.position.y >= 1.6);
            if out == StepOutcome::Landed {
                break;
            }
            assert_eq!(observer.vertical_velocity, -30.0);
            assert!(frames < 1000);
        }
        assert_eq!(observer.position.y, 1.6);
        assert!(observer.grounded);
        assert_eq!(resolver.phase(), MotionPhase::Walking);
        let expected = (50.0 - 1.6) / 30.0;
        assert!(elapsed >= expected - 1e-4 && elapsed < expected + DT + 1e-4);
    }

    #[test]
    fn still_falling_just_before_landing_time() {
        let mut resolver = MovementResolver::new(MotionParams::default());
        let mut observer = resolver.spawn(0.0, 0.0);
        let empty = CollisionIndex::new(5.0);
        assert_eq!(
            resolver.step(&mut observer, MoveIntent::default(), Vec3::NEG_Z, 1.6, &empty),
            StepOutcome::Fell
        );
        assert!((observer.position.y - 2.0).abs() < 1e-4);
        assert_eq!(
            resolver.step(&mut observer, MoveIntent::default(), Vec3::NEG_Z, 0.02, &empty),
            StepOutcome::Landed
        );
        assert_eq!(observer.position.y, 1.6);
    }

    #[test]
    fn falling_ignores_input_and_walls() {
        let mut resolver = MovementResolver::new(MotionParams::default());
        let mut observer = resolver.spawn(0.0, 0.0);
        let index = walls(&[(0.0, 0.0)]);
        let intent = MoveIntent::default().with(Direction::Forward);
        resolver.step(&mut observer, intent, Vec3::NEG_Z, 0.5, &index);
        assert_eq!(observer.position.x, 0.0);
        assert_eq!(observer.position.z, 0.0);
        assert_eq!(resolver.phase(), MotionPhase::Falling);
    }

    #[test]
    fn walk_forward_along_view() {
        let (mut resolver, mut observer) = landed(0.0, 0.0);
        let empty = CollisionIndex::new(5.0);
        let intent = MoveIntent::default().with(Direction::Forward);
        let out = resolver.step(&mut observer, intent, Vec3::NEG_Z, 0.5, &empty);
        assert_eq!(out, StepOutcome::Moved);
        assert!((observer.position - Vec3::new(0.0, 1.6, -2.0)).length() < 1e-5);
    }

    #[test]
    fn strafe_right_is_view_cross_up() {
        let (mut resolver, mut observer) = landed(0.0, 0.0);
        let empty = CollisionIndex::new(5.0);
        let intent = MoveIntent::default().with(Direction::Right);
        resolver.step(&mut observer, intent, Vec3::NEG_Z, 1.0, &empty);
        assert!((observer.position - Vec3::new(4.0, 1.6, 0.0)).length() < 1e-5);
    }

    #[test]
    fn pitch_does_not_slow_walking() {
        let (mut resolver, mut observer) = landed(0.0, 0.0);
        let empty = CollisionIndex::new(5.0);
        let look_down = Vec3::new(0.0, -0.9, -0.1);
        let intent = MoveIntent::default().with(Direction::Forward);
        resolver.step(&mut observer, intent, look_down, 1.0, &empty);
        assert!((observer.position.z + 4.0).abs() < 1e-4);
        assert_eq!(observer.position.y, 1.6);
    }

    #[test]
    fn vertical_view_does_not_move() {
        let (mut resolver, mut observer) = landed(0.0, 0.0);
        let empty = CollisionIndex::new(5.0);
        let intent = MoveIntent::default().with(Direction::Forward);
        let before = observer;
        assert_eq!(
            resolver.step(&mut observer, intent, Vec3::NEG_Y, 1.0, &empty),
            StepOutcome::Idle
        );
        assert_eq!(observer, before);
    }

    #[test]
    fn blocked_move_is_fully_rejected() {
        // Wall block centered 3 units ahead: face at z = -2.
        let (mut resolver, mut observer) = landed(0.0, 0.0);
        let index = walls(&[(0.0, -3.0)]);
        let intent = MoveIntent::default().with(Direction::Forward);

        // 0.5 forward: sphere reaches z = -1.5, clear.
        assert_eq!(
            resolver.step(&mut observer, intent, Vec3::NEG_Z, 0.125, &index),
            StepOutcome::Moved
        );
        let before = observer.position;
        // Another 0.8 would put the sphere edge at z = -2.3, inside the wall.
        assert_eq!(
            resolver.step(&mut observer, intent, Vec3::NEG_Z, 0.2, &index),
            StepOutcome::Blocked
        );
        assert_eq!(observer.position, before);
        assert!(!index.query(observer.position, 1.0));
    }

    #[test]
    fn clear_candidate_always_commits() {
        let (mut resolver, mut observer) = landed(2.5, 2.5);
        let index = walls(&[(-2.5, -2.5), (2.5, -2.5), (-2.5, 2.5)]);
        let intent = MoveIntent::default().with(Direction::Back);
        for _ in 0..30 {
            let before = observer.position;
            let out = resolver.step(&mut observer, intent, Vec3::NEG_Z, DT, &index);
            let candidate = before + Vec3::new(0.0, 0.0, 4.0 * DT);
            if index.query(candidate, 1.0) {
                assert_eq!(out, StepOutcome::Blocked);
                assert_eq!(observer.position, before);
            } else {
                assert_eq!(out, StepOutcome::Moved);
            }
        }
    }

    #[test]
    fn forward_from_angles_matches_axes() {
        let f = forward_from_angles(0.0, 0.0);
        assert!((f - Vec3::X).length() < 1e-6);
        let f = forward_from_angles(-std::f32::consts::FRAC_PI_2, 0.0);
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
    }
}

use anyhow::{Context, bail};
use vigil_input::{Action, Direction};

/// An input action scheduled at a point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub at: f32,
    pub action: Action,
}

/// Parse `SECONDS:ACTION`, where ACTION is `begin`, `+DIR` (press) or
/// `-DIR` (release), e.g. `0:begin`, `2.5:+forward`, `4:-KeyW`.
pub fn parse_cue(s: &str) -> anyhow::Result<Cue> {
    let (at, action) = s
        .split_once(':')
        .with_context(|| format!("cue {s:?} is not SECONDS:ACTION"))?;
    let at: f32 = at
        .trim()
        .parse()
        .with_context(|| format!("bad cue time {at:?}"))?;
    if !(at.is_finite() && at >= 0.0) {
        bail!("cue time must be >= 0, got {at}");
    }

    let action = action.trim();
    let action = if action == "begin" {
        Action::Begin
    } else if let Some(dir) = action.strip_prefix('+') {
        Action::Press(dir.parse::<Direction>()?)
    } else if let Some(dir) = action.strip_prefix('-') {
        Action::Release(dir.parse::<Direction>()?)
    } else {
        bail!("unknown cue action {action:?}");
    };
    Ok(Cue { at, action })
}

/// Cues in time order, handed out as the clock passes them.
#[derive(Debug, Default)]
pub struct Script {
    cues: Vec<Cue>,
    next: usize,
}

impl Script {
    pub fn new(mut cues: Vec<Cue>) -> Self {
        cues.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { cues, next: 0 }
    }

    /// Actions due at or before `now`, each returned once.
    pub fn due(&mut self, now: f32) -> impl Iterator<Item = Action> + '_ {
        let start = self.next;
        while self.next < self.cues.len() && self.cues[self.next].at <= now {
            self.next += 1;
        }
        self.cues[start..self.next].iter().map(|c| c.action)
    }
}

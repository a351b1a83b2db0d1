//! Signals the simulation posts for the outside world: sounds to play and
//! scene changes to perform. The manager queues them; the frontend drains
//! the queue once per frame.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    CannonFire,
    BarrelOpen,
    Pickup,
    Drop,
    Drink,
    Eat,
    Repair,
    /// Incoming shot hit our hull.
    Hit,
    /// Our shot hit the enemy.
    EnemyHit,
    Splash,
    Death,
}

impl Sound {
    pub fn name(self) -> &'static str {
        match self {
            Sound::CannonFire => "cannon",
            Sound::BarrelOpen => "barrel",
            Sound::Pickup => "pickup",
            Sound::Drop => "drop",
            Sound::Drink => "drink",
            Sound::Eat => "eat",
            Sound::Repair => "repair",
            Sound::Hit => "hit",
            Sound::EnemyHit => "enemy_hit",
            Sound::Splash => "splash",
            Sound::Death => "death",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneId {
    Win,
    Lose,
}

/// Why the round was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoseContext {
    /// The player died of scurvy rather than the ship sinking.
    pub scurvy: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneChange {
    pub scene: SceneId,
    pub context: Option<LoseContext>,
}

impl SceneChange {
    pub fn win() -> Self {
        Self {
            scene: SceneId::Win,
            context: None,
        }
    }

    pub fn lose(scurvy: bool) -> Self {
        Self {
            scene: SceneId::Lose,
            context: Some(LoseContext { scurvy }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameEvent {
    PlaySound(Sound),
    ChangeScene(SceneChange),
}

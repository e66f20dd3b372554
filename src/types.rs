use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Path,
    Pellet,
    PowerPellet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Normal,
    Frightened,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostBehavior {
    Chaser,
    RandomWalker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PelletView {
    pub x: i32,
    pub y: i32,
    pub power: bool,
    pub eaten: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct MazeInit {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub pellets: Vec<PelletView>,
    #[serde(rename = "playerSpawn")]
    pub player_spawn: Vec2,
    #[serde(rename = "ghostSpawns")]
    pub ghost_spawns: Vec<Vec2>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "powerMode")]
    pub power_mode: bool,
    #[serde(rename = "powerTicksLeft")]
    pub power_ticks_left: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub mode: GhostMode,
    pub behavior: GhostBehavior,
    pub color: &'static str,
    pub speed: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten { x: i32, y: i32, points: i32 },
    PowerPelletEaten { x: i32, y: i32 },
    GhostEaten { id: String },
    GameOver,
    GameWon { score: i32 },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: i32,
    pub paused: bool,
    #[serde(rename = "gameOver")]
    pub game_over: bool,
    #[serde(rename = "gameWon")]
    pub game_won: bool,
    pub difficulty: Difficulty,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub pellets: Vec<PelletView>,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: i32,
    #[serde(rename = "totalPellets")]
    pub total_pellets: i32,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HighScoresResponse {
    #[serde(rename = "generatedAt")]
    pub generated_at_iso: String,
    pub scores: Vec<i32>,
    pub highest: i32,
}

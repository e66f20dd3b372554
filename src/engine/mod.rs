use crate::constants::{get_difficulty_params, GHOST_COLORS, GHOST_POINTS, TICK_MS};
use crate::maze::{Maze, TunnelPolicy};
use crate::rng::Rng;
use crate::types::{
    Difficulty, Direction, GhostBehavior, GhostMode, MazeInit, PlayerView, RuntimeEvent, Snapshot,
    Vec2,
};

mod ghost;
mod movement;

use self::ghost::GhostAgent;

#[derive(Clone, Debug)]
struct PlayerInternal {
    pos: Vec2,
    dir: Direction,
    next_dir: Direction,
    power_ticks_left: u32,
    power_duration: u32,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub ghost_speed: f32,
    pub power_duration_ticks: u32,
    pub tick_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GameSessionOptions {
    pub tunnel_policy: TunnelPolicy,
}

impl Default for GameSessionOptions {
    fn default() -> Self {
        Self {
            tunnel_policy: TunnelPolicy::Wrap,
        }
    }
}

/// One complete game: maze, player, ghosts, score and terminal flags. All
/// state is created together and discarded together; restart means building
/// a fresh session.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: SessionConfig,
    maze: Maze,
    rng: Rng,
    player: PlayerInternal,
    ghosts: Vec<GhostAgent>,
    score: i32,
    paused: bool,
    game_over: bool,
    game_won: bool,
    tick_counter: u64,
    events: Vec<RuntimeEvent>,
}

impl GameSession {
    pub fn new(difficulty: Difficulty, seed: u32, options: GameSessionOptions) -> Self {
        Self::from_maze(Maze::standard(options.tunnel_policy), difficulty, seed)
    }

    pub fn from_maze(maze: Maze, difficulty: Difficulty, seed: u32) -> Self {
        let params = get_difficulty_params(difficulty);
        let config = SessionConfig {
            difficulty,
            ghost_speed: params.ghost_speed,
            power_duration_ticks: params.power_duration_ticks,
            tick_ms: TICK_MS,
        };

        let player = PlayerInternal {
            pos: maze.player_spawn(),
            dir: Direction::None,
            next_dir: Direction::None,
            power_ticks_left: 0,
            power_duration: params.power_duration_ticks,
        };

        // First spawn slot is the chaser, remaining slots wander randomly.
        let ghosts = maze
            .ghost_spawns()
            .iter()
            .take(GHOST_COLORS.len())
            .enumerate()
            .map(|(index, spawn)| {
                let behavior = if index == 0 {
                    GhostBehavior::Chaser
                } else {
                    GhostBehavior::RandomWalker
                };
                GhostAgent::new(
                    format!("ghost_{}", index + 1),
                    *spawn,
                    behavior,
                    GHOST_COLORS[index],
                    params.ghost_speed,
                    params.power_duration_ticks,
                )
            })
            .collect();

        Self {
            config,
            maze,
            rng: Rng::new(seed),
            player,
            ghosts,
            score: 0,
            paused: false,
            game_over: false,
            game_won: false,
            tick_counter: 0,
            events: Vec::new(),
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_game_won(&self) -> bool {
        self.game_won
    }

    pub fn is_terminal(&self) -> bool {
        self.game_over || self.game_won
    }

    pub fn player_position(&self) -> Vec2 {
        self.player.pos
    }

    pub fn is_power_mode(&self) -> bool {
        self.player.power_ticks_left > 0
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn set_next_direction(&mut self, dir: Direction) {
        self.player.next_dir = dir;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// One fixed-period tick. No-op while paused or after either terminal
    /// flag is set.
    pub fn advance(&mut self) {
        if self.paused || self.game_over || self.game_won {
            return;
        }
        self.tick_counter += 1;

        self.update_player();
        self.resolve_pellet_pickup();
        for ghost in &mut self.ghosts {
            ghost.update(&self.maze, self.player.pos, &mut self.rng);
        }
        self.resolve_collisions();
        self.check_win();
    }

    fn update_player(&mut self) {
        movement::advance_agent(
            &self.maze,
            &mut self.player.pos,
            &mut self.player.dir,
            &mut self.player.next_dir,
        );
        self.player.power_ticks_left = self.player.power_ticks_left.saturating_sub(1);
    }

    fn resolve_pellet_pickup(&mut self) {
        let pos = self.player.pos;
        // Classify before collecting so activation never depends on tile
        // mutation order.
        let was_power = self.maze.is_power_pellet_at(pos);
        let points = self.maze.collect_pellet_at(pos);
        if points == 0 {
            return;
        }
        self.score += points;

        if was_power {
            self.player.power_ticks_left = self.player.power_duration;
            self.events.push(RuntimeEvent::PowerPelletEaten { x: pos.x, y: pos.y });
            for ghost in &mut self.ghosts {
                ghost.frighten();
            }
        } else {
            self.events.push(RuntimeEvent::PelletEaten {
                x: pos.x,
                y: pos.y,
                points,
            });
        }
    }

    fn resolve_collisions(&mut self) {
        let powered = self.is_power_mode();
        for ghost in &mut self.ghosts {
            if ghost.pos != self.player.pos {
                continue;
            }
            if powered && ghost.mode != GhostMode::Eaten {
                ghost.eat();
                self.score += GHOST_POINTS;
                self.events.push(RuntimeEvent::GhostEaten {
                    id: ghost.id.clone(),
                });
            } else if ghost.mode == GhostMode::Normal {
                self.game_over = true;
            }
        }
        if self.game_over {
            self.events.push(RuntimeEvent::GameOver);
        }
    }

    fn check_win(&mut self) {
        if self.game_over || self.game_won {
            return;
        }
        if self.maze.all_pellets_eaten() {
            self.game_won = true;
            self.events.push(RuntimeEvent::GameWon { score: self.score });
        }
    }

    pub fn maze_init(&self) -> MazeInit {
        self.maze.to_maze_init()
    }

    fn player_view(&self) -> PlayerView {
        PlayerView {
            x: self.player.pos.x,
            y: self.player.pos.y,
            dir: self.player.dir,
            power_mode: self.is_power_mode(),
            power_ticks_left: self.player.power_ticks_left,
        }
    }

    /// Read-only state for the render collaborator; `include_events` drains
    /// the per-tick event queue.
    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            score: self.score,
            paused: self.paused,
            game_over: self.game_over,
            game_won: self.game_won,
            difficulty: self.config.difficulty,
            player: self.player_view(),
            ghosts: self.ghosts.iter().map(GhostAgent::view).collect(),
            pellets: self.maze.pellet_views(),
            pellets_eaten: self.maze.pellets_eaten(),
            total_pellets: self.maze.total_pellets(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }
}

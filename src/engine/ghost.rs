use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, GhostBehavior, GhostMode, GhostView, Vec2};

/// Fixed enumeration order; chaser tie-breaks resolve to the first open
/// direction in this order.
const DECISION_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

#[derive(Clone, Debug)]
pub(super) struct GhostAgent {
    pub id: String,
    pub pos: Vec2,
    pub spawn: Vec2,
    pub dir: Direction,
    pub mode: GhostMode,
    pub behavior: GhostBehavior,
    pub color: &'static str,
    pub speed: f32,
    pub frightened_ticks_left: u32,
    pub frightened_duration: u32,
}

impl GhostAgent {
    pub fn new(
        id: String,
        spawn: Vec2,
        behavior: GhostBehavior,
        color: &'static str,
        speed: f32,
        frightened_duration: u32,
    ) -> Self {
        Self {
            id,
            pos: spawn,
            spawn,
            dir: Direction::Up,
            mode: GhostMode::Normal,
            behavior,
            color,
            speed,
            frightened_ticks_left: 0,
            frightened_duration,
        }
    }

    /// No-op while eaten; otherwise restarts the frightened countdown and
    /// reverses the ghost immediately.
    pub fn frighten(&mut self) {
        if self.mode == GhostMode::Eaten {
            return;
        }
        self.mode = GhostMode::Frightened;
        self.frightened_ticks_left = self.frightened_duration;
        self.dir = self.dir.opposite();
    }

    pub fn eat(&mut self) {
        self.mode = GhostMode::Eaten;
    }

    pub fn update(&mut self, maze: &Maze, player_pos: Vec2, rng: &mut Rng) {
        if self.mode == GhostMode::Frightened {
            self.frightened_ticks_left = self.frightened_ticks_left.saturating_sub(1);
            if self.frightened_ticks_left == 0 {
                self.mode = GhostMode::Normal;
            }
        }

        // An eaten ghost spends exactly one tick traveling home.
        if self.mode == GhostMode::Eaten {
            self.pos = self.spawn;
            self.mode = GhostMode::Normal;
            self.dir = Direction::Up;
            return;
        }

        let next = self.choose_direction(maze, player_pos, rng);
        if next != Direction::None {
            self.dir = next;
            self.pos = maze.step(self.pos, next);
        }
    }

    /// Decision point only at a wall ahead or an intersection; otherwise the
    /// ghost keeps going straight.
    fn choose_direction(&self, maze: &Maze, player_pos: Vec2, rng: &mut Rng) -> Direction {
        let ahead = maze.step(self.pos, self.dir);
        if !maze.is_wall(ahead) && !self.at_intersection(maze) {
            return self.dir;
        }

        let open = self.open_directions(maze);
        if open.is_empty() {
            let reverse = self.dir.opposite();
            if reverse != Direction::None && !maze.is_wall(maze.step(self.pos, reverse)) {
                return reverse;
            }
            return Direction::None;
        }

        match (self.mode, self.behavior) {
            (GhostMode::Frightened, _) => open[rng.pick_index(open.len())],
            (GhostMode::Normal, GhostBehavior::Chaser) => {
                self.toward_player(maze, &open, player_pos)
            }
            _ => open[rng.pick_index(open.len())],
        }
    }

    /// Open directions excluding the direct reverse, in decision order.
    fn open_directions(&self, maze: &Maze) -> Vec<Direction> {
        DECISION_ORDER
            .iter()
            .copied()
            .filter(|dir| *dir != self.dir.opposite())
            .filter(|dir| !maze.is_wall(maze.step(self.pos, *dir)))
            .collect()
    }

    /// At least two non-reverse directions open.
    fn at_intersection(&self, maze: &Maze) -> bool {
        self.open_directions(maze).len() > 1
    }

    fn toward_player(&self, maze: &Maze, open: &[Direction], player_pos: Vec2) -> Direction {
        let mut best = open[0];
        let mut best_distance = f64::MAX;
        for dir in open {
            let next = maze.step(self.pos, *dir);
            let dx = (next.x - player_pos.x) as f64;
            let dy = (next.y - player_pos.y) as f64;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < best_distance {
                best_distance = distance;
                best = *dir;
            }
        }
        best
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            id: self.id.clone(),
            x: self.pos.x,
            y: self.pos.y,
            dir: self.dir,
            mode: self.mode,
            behavior: self.behavior,
            color: self.color,
            speed: self.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GhostAgent;
    use crate::maze::{Maze, TunnelPolicy};
    use crate::rng::Rng;
    use crate::types::{Direction, GhostBehavior, GhostMode, Vec2};

    fn make_ghost(spawn: Vec2, behavior: GhostBehavior) -> GhostAgent {
        GhostAgent::new("ghost_1".to_string(), spawn, behavior, "red", 0.2, 5)
    }

    fn open_room() -> Maze {
        Maze::from_layout(
            &["11111", "10001", "10001", "10001", "11111"],
            TunnelPolicy::Blocked,
        )
    }

    #[test]
    fn chaser_ties_resolve_to_first_enumerated_direction() {
        let maze = open_room();
        let mut ghost = make_ghost(Vec2 { x: 2, y: 2 }, GhostBehavior::Chaser);
        let mut rng = Rng::new(1);

        // Up, Left and Right all end one cell from the player; Up wins.
        ghost.update(&maze, Vec2 { x: 2, y: 2 }, &mut rng);
        assert_eq!(ghost.dir, Direction::Up);
        assert_eq!(ghost.pos, Vec2 { x: 2, y: 1 });
    }

    #[test]
    fn chaser_moves_toward_the_player() {
        let maze = open_room();
        let mut ghost = make_ghost(Vec2 { x: 2, y: 2 }, GhostBehavior::Chaser);
        let mut rng = Rng::new(1);

        ghost.update(&maze, Vec2 { x: 1, y: 3 }, &mut rng);
        assert_eq!(ghost.dir, Direction::Left);
        assert_eq!(ghost.pos, Vec2 { x: 1, y: 2 });
    }

    #[test]
    fn frightened_ghost_picks_an_open_non_reverse_direction() {
        let maze = open_room();
        for seed in 0..32 {
            let mut ghost = make_ghost(Vec2 { x: 2, y: 2 }, GhostBehavior::Chaser);
            ghost.frighten();
            assert_eq!(ghost.dir, Direction::Down);
            let mut rng = Rng::new(seed);
            ghost.update(&maze, Vec2 { x: 2, y: 1 }, &mut rng);
            // Reverse of Down is Up, so the ghost went down, left or right.
            assert_ne!(ghost.pos, Vec2 { x: 2, y: 1 });
            assert_ne!(ghost.dir, Direction::Up);
            assert!(!maze.is_wall(ghost.pos));
        }
    }

    #[test]
    fn dead_end_forces_a_reversal() {
        let maze = Maze::from_layout(&["111", "101", "101", "111"], TunnelPolicy::Blocked);
        let mut ghost = make_ghost(Vec2 { x: 1, y: 1 }, GhostBehavior::Chaser);
        let mut rng = Rng::new(1);

        ghost.update(&maze, Vec2 { x: 1, y: 2 }, &mut rng);
        assert_eq!(ghost.dir, Direction::Down);
        assert_eq!(ghost.pos, Vec2 { x: 1, y: 2 });
    }

    #[test]
    fn fully_enclosed_ghost_stays_in_place() {
        let maze = Maze::from_layout(&["111", "101", "111"], TunnelPolicy::Blocked);
        let mut ghost = make_ghost(Vec2 { x: 1, y: 1 }, GhostBehavior::RandomWalker);
        let mut rng = Rng::new(1);

        ghost.update(&maze, Vec2 { x: 1, y: 1 }, &mut rng);
        assert_eq!(ghost.pos, Vec2 { x: 1, y: 1 });
        assert_eq!(ghost.dir, Direction::Up);
    }

    #[test]
    fn frighten_is_a_no_op_while_eaten() {
        let mut ghost = make_ghost(Vec2 { x: 1, y: 1 }, GhostBehavior::Chaser);
        ghost.eat();
        ghost.frighten();
        assert_eq!(ghost.mode, GhostMode::Eaten);
        assert_eq!(ghost.dir, Direction::Up);
    }

    #[test]
    fn eaten_ghost_respawns_normal_on_the_next_update() {
        let maze = open_room();
        let mut ghost = make_ghost(Vec2 { x: 2, y: 3 }, GhostBehavior::RandomWalker);
        let mut rng = Rng::new(1);
        ghost.pos = Vec2 { x: 1, y: 1 };
        ghost.frighten();
        ghost.eat();

        ghost.update(&maze, Vec2 { x: 3, y: 3 }, &mut rng);
        assert_eq!(ghost.pos, ghost.spawn);
        assert_eq!(ghost.mode, GhostMode::Normal);
        assert_eq!(ghost.dir, Direction::Up);
    }

    #[test]
    fn frightened_timer_expiry_restores_normal_mode() {
        let maze = open_room();
        let mut ghost = make_ghost(Vec2 { x: 2, y: 2 }, GhostBehavior::RandomWalker);
        let mut rng = Rng::new(3);
        ghost.frighten();
        assert_eq!(ghost.frightened_ticks_left, 5);

        for _ in 0..5 {
            assert_eq!(ghost.mode, GhostMode::Frightened);
            ghost.update(&maze, Vec2 { x: 1, y: 1 }, &mut rng);
        }
        assert_eq!(ghost.mode, GhostMode::Normal);
        assert_eq!(ghost.frightened_ticks_left, 0);
    }
}

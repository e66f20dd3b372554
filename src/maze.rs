use crate::constants::{PELLET_POINTS, POWER_PELLET_POINTS};
use crate::types::{Direction, MazeInit, PelletView, TileKind, Vec2};

/// Symbols: 0 = open corridor, 1 = wall, 2 = pellet, 3 = power pellet,
/// 4 = player spawn, 5 = ghost spawn. Rows 7 and 9 are the tunnel rows:
/// their outermost cells are open, with no enclosing wall column.
pub const DEFAULT_LAYOUT: [&str; 21] = [
    "1111111111111111111",
    "1222222221222222221",
    "1311211121211121131",
    "1222222222222222221",
    "1211212111112121121",
    "1222212221222122221",
    "1111211101011121111",
    "0001210000000121000",
    "1111210115110121111",
    "0000200155510020000",
    "1111210111110121111",
    "0001210000000121000",
    "1111210111110121111",
    "1222222221222222221",
    "1211211121211121121",
    "1321222224222221231",
    "1121212111112121211",
    "1222212221222122221",
    "1211111121211111121",
    "1222222222222222221",
    "1111111111111111111",
];

/// What happens at the open tunnel edges. The stock layout has corridors
/// flush against the grid boundary; `Wrap` connects the two sides, `Blocked`
/// treats everything off-grid as wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunnelPolicy {
    Wrap,
    Blocked,
}

#[derive(Clone, Debug)]
pub struct Pellet {
    pub pos: Vec2,
    pub power: bool,
    pub eaten: bool,
    pub points: i32,
}

#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    tiles: Vec<Vec<TileKind>>,
    pellets: Vec<Pellet>,
    total_pellets: i32,
    pellets_eaten: i32,
    player_spawn: Vec2,
    ghost_spawns: Vec<Vec2>,
    tunnel_policy: TunnelPolicy,
}

impl Maze {
    pub fn standard(tunnel_policy: TunnelPolicy) -> Self {
        Self::from_layout(&DEFAULT_LAYOUT, tunnel_policy)
    }

    pub fn from_layout(rows: &[&str], tunnel_policy: TunnelPolicy) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map(|row| row.len()).unwrap_or(0) as i32;
        let mut tiles = Vec::with_capacity(rows.len());
        let mut pellets = Vec::new();
        let mut player_spawn = None;
        let mut ghost_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let mut tile_row = Vec::with_capacity(row.len());
            for (x, symbol) in row.chars().enumerate() {
                let pos = Vec2 {
                    x: x as i32,
                    y: y as i32,
                };
                let kind = match symbol {
                    '1' => TileKind::Wall,
                    '2' => {
                        pellets.push(Pellet {
                            pos,
                            power: false,
                            eaten: false,
                            points: PELLET_POINTS,
                        });
                        TileKind::Pellet
                    }
                    '3' => {
                        pellets.push(Pellet {
                            pos,
                            power: true,
                            eaten: false,
                            points: POWER_PELLET_POINTS,
                        });
                        TileKind::PowerPellet
                    }
                    '4' => {
                        player_spawn = Some(pos);
                        TileKind::Path
                    }
                    '5' => {
                        ghost_spawns.push(pos);
                        TileKind::Path
                    }
                    _ => TileKind::Path,
                };
                tile_row.push(kind);
            }
            tiles.push(tile_row);
        }

        let total_pellets = pellets.len() as i32;
        Self {
            width,
            height,
            tiles,
            pellets,
            total_pellets,
            pellets_eaten: 0,
            player_spawn: player_spawn.unwrap_or(Vec2 { x: 1, y: 1 }),
            ghost_spawns,
            tunnel_policy,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tunnel_policy(&self) -> TunnelPolicy {
        self.tunnel_policy
    }

    pub fn player_spawn(&self) -> Vec2 {
        self.player_spawn
    }

    pub fn ghost_spawns(&self) -> &[Vec2] {
        &self.ghost_spawns
    }

    fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn wrap(&self, pos: Vec2) -> Vec2 {
        Vec2 {
            x: pos.x.rem_euclid(self.width),
            y: pos.y.rem_euclid(self.height),
        }
    }

    /// Total for any coordinate; out-of-bounds resolves via the tunnel
    /// policy instead of panicking.
    pub fn is_wall(&self, pos: Vec2) -> bool {
        let pos = match self.tunnel_policy {
            TunnelPolicy::Wrap => self.wrap(pos),
            TunnelPolicy::Blocked => {
                if !self.in_bounds(pos) {
                    return true;
                }
                pos
            }
        };
        self.tiles[pos.y as usize][pos.x as usize] == TileKind::Wall
    }

    /// One cell in `dir`, normalized so agents never hold out-of-bounds
    /// coordinates.
    pub fn step(&self, pos: Vec2, dir: Direction) -> Vec2 {
        let next = offset(pos, dir);
        match self.tunnel_policy {
            TunnelPolicy::Wrap => self.wrap(next),
            TunnelPolicy::Blocked => next,
        }
    }

    /// Marks the pellet at `pos` as eaten and returns its point value.
    /// Returns 0 when there is no pellet or it was already eaten.
    pub fn collect_pellet_at(&mut self, pos: Vec2) -> i32 {
        for pellet in &mut self.pellets {
            if !pellet.eaten && pellet.pos == pos {
                pellet.eaten = true;
                self.pellets_eaten += 1;
                return pellet.points;
            }
        }
        0
    }

    /// Query only; callers that care about power activation must ask before
    /// collecting.
    pub fn is_power_pellet_at(&self, pos: Vec2) -> bool {
        self.pellets
            .iter()
            .any(|pellet| !pellet.eaten && pellet.power && pellet.pos == pos)
    }

    pub fn all_pellets_eaten(&self) -> bool {
        self.pellets_eaten >= self.total_pellets
    }

    pub fn pellets_eaten(&self) -> i32 {
        self.pellets_eaten
    }

    pub fn total_pellets(&self) -> i32 {
        self.total_pellets
    }

    pub fn pellet_views(&self) -> Vec<PelletView> {
        self.pellets
            .iter()
            .map(|pellet| PelletView {
                x: pellet.pos.x,
                y: pellet.pos.y,
                power: pellet.power,
                eaten: pellet.eaten,
            })
            .collect()
    }

    pub fn to_maze_init(&self) -> MazeInit {
        MazeInit {
            width: self.width,
            height: self.height,
            tiles: self
                .tiles
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|kind| if *kind == TileKind::Wall { '#' } else { '.' })
                        .collect()
                })
                .collect(),
            pellets: self.pellet_views(),
            player_spawn: self.player_spawn,
            ghost_spawns: self.ghost_spawns.clone(),
        }
    }
}

pub fn offset(pos: Vec2, dir: Direction) -> Vec2 {
    match dir {
        Direction::Up => Vec2 {
            x: pos.x,
            y: pos.y - 1,
        },
        Direction::Down => Vec2 {
            x: pos.x,
            y: pos.y + 1,
        },
        Direction::Left => Vec2 {
            x: pos.x - 1,
            y: pos.y,
        },
        Direction::Right => Vec2 {
            x: pos.x + 1,
            y: pos.y,
        },
        Direction::None => pos,
    }
}

#[cfg(test)]
mod tests {
    use super::{Maze, TunnelPolicy};
    use crate::types::{Direction, Vec2};

    #[test]
    fn standard_layout_has_expected_shape_and_pellets() {
        let maze = Maze::standard(TunnelPolicy::Wrap);
        assert_eq!(maze.width(), 19);
        assert_eq!(maze.height(), 21);
        assert_eq!(maze.total_pellets(), 150);
        let powers = maze
            .pellet_views()
            .iter()
            .filter(|pellet| pellet.power)
            .count();
        assert_eq!(powers, 4);
        assert_eq!(maze.player_spawn(), Vec2 { x: 9, y: 15 });
        assert_eq!(
            maze.ghost_spawns(),
            &[
                Vec2 { x: 9, y: 8 },
                Vec2 { x: 8, y: 9 },
                Vec2 { x: 9, y: 9 },
                Vec2 { x: 10, y: 9 },
            ]
        );
    }

    #[test]
    fn collecting_a_pellet_is_idempotent() {
        let mut maze = Maze::standard(TunnelPolicy::Wrap);
        let pos = Vec2 { x: 1, y: 1 };
        assert_eq!(maze.collect_pellet_at(pos), 10);
        assert_eq!(maze.pellets_eaten(), 1);
        assert_eq!(maze.collect_pellet_at(pos), 0);
        assert_eq!(maze.pellets_eaten(), 1);
    }

    #[test]
    fn power_query_does_not_mutate_and_goes_false_after_collect() {
        let mut maze = Maze::standard(TunnelPolicy::Wrap);
        let pos = Vec2 { x: 1, y: 2 };
        assert!(maze.is_power_pellet_at(pos));
        assert!(maze.is_power_pellet_at(pos));
        assert_eq!(maze.collect_pellet_at(pos), 50);
        assert!(!maze.is_power_pellet_at(pos));
    }

    #[test]
    fn collecting_at_a_wall_or_corridor_returns_zero() {
        let mut maze = Maze::standard(TunnelPolicy::Wrap);
        assert_eq!(maze.collect_pellet_at(Vec2 { x: 0, y: 0 }), 0);
        assert_eq!(maze.collect_pellet_at(Vec2 { x: 8, y: 7 }), 0);
    }

    #[test]
    fn wrap_policy_connects_tunnel_rows() {
        let maze = Maze::standard(TunnelPolicy::Wrap);
        let left_mouth = Vec2 { x: 0, y: 7 };
        assert!(!maze.is_wall(left_mouth));
        let wrapped = maze.step(left_mouth, Direction::Left);
        assert_eq!(wrapped, Vec2 { x: 18, y: 7 });
        assert!(!maze.is_wall(wrapped));

        let right_mouth = Vec2 { x: 18, y: 9 };
        assert_eq!(
            maze.step(right_mouth, Direction::Right),
            Vec2 { x: 0, y: 9 }
        );
    }

    #[test]
    fn blocked_policy_treats_off_grid_as_wall() {
        let maze = Maze::standard(TunnelPolicy::Blocked);
        assert!(maze.is_wall(Vec2 { x: -1, y: 7 }));
        assert!(maze.is_wall(Vec2 { x: 19, y: 9 }));
        assert!(maze.is_wall(Vec2 { x: 5, y: -3 }));
        assert!(!maze.is_wall(Vec2 { x: 0, y: 7 }));
    }

    #[test]
    fn out_of_bounds_queries_never_panic() {
        let maze = Maze::standard(TunnelPolicy::Wrap);
        let _ = maze.is_wall(Vec2 {
            x: -1_000,
            y: 1_000,
        });
        assert!(!maze.is_power_pellet_at(Vec2 { x: -50, y: -50 }));
    }

    #[test]
    fn all_pellets_eaten_tracks_eaten_count_monotonically() {
        let mut maze = Maze::standard(TunnelPolicy::Wrap);
        let positions: Vec<Vec2> = maze.pellet_views().iter().map(|p| Vec2 { x: p.x, y: p.y }).collect();
        for pos in &positions {
            assert!(!maze.all_pellets_eaten());
            assert!(maze.collect_pellet_at(*pos) > 0);
        }
        assert!(maze.all_pellets_eaten());
        assert_eq!(maze.pellets_eaten(), maze.total_pellets());
    }
}

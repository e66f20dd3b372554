use crate::maze::Maze;
use crate::types::{Direction, Vec2};

/// Shared per-tick movement rule: accept the pending turn if the cell ahead
/// in that direction is open, then move one cell in the current direction if
/// open. A blocked agent stays in place with its direction preserved.
pub(super) fn advance_agent(
    maze: &Maze,
    pos: &mut Vec2,
    current: &mut Direction,
    pending: &mut Direction,
) {
    if *pending != Direction::None {
        let ahead = maze.step(*pos, *pending);
        if !maze.is_wall(ahead) {
            *current = *pending;
            *pending = Direction::None;
        }
    }

    if *current != Direction::None {
        let ahead = maze.step(*pos, *current);
        if !maze.is_wall(ahead) {
            *pos = ahead;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::advance_agent;
    use crate::maze::{Maze, TunnelPolicy};
    use crate::types::{Direction, Vec2};

    fn corridor() -> Maze {
        Maze::from_layout(&["11111", "10001", "11111"], TunnelPolicy::Blocked)
    }

    #[test]
    fn pending_turn_is_accepted_only_when_open() {
        let maze = corridor();
        let mut pos = Vec2 { x: 1, y: 1 };
        let mut current = Direction::None;
        let mut pending = Direction::Up;

        advance_agent(&maze, &mut pos, &mut current, &mut pending);
        assert_eq!(pos, Vec2 { x: 1, y: 1 });
        assert_eq!(current, Direction::None);
        assert_eq!(pending, Direction::Up);

        pending = Direction::Right;
        advance_agent(&maze, &mut pos, &mut current, &mut pending);
        assert_eq!(pos, Vec2 { x: 2, y: 1 });
        assert_eq!(current, Direction::Right);
        assert_eq!(pending, Direction::None);
    }

    #[test]
    fn blocked_agent_keeps_direction_and_position() {
        let maze = corridor();
        let mut pos = Vec2 { x: 3, y: 1 };
        let mut current = Direction::Right;
        let mut pending = Direction::None;

        advance_agent(&maze, &mut pos, &mut current, &mut pending);
        assert_eq!(pos, Vec2 { x: 3, y: 1 });
        assert_eq!(current, Direction::Right);
    }

    #[test]
    fn turn_and_move_happen_in_the_same_tick() {
        let maze = corridor();
        let mut pos = Vec2 { x: 2, y: 1 };
        let mut current = Direction::Right;
        let mut pending = Direction::Left;

        advance_agent(&maze, &mut pos, &mut current, &mut pending);
        assert_eq!(current, Direction::Left);
        assert_eq!(pos, Vec2 { x: 1, y: 1 });
    }
}

use serde_json::Value;

use crate::types::{Difficulty, Direction};

#[derive(Debug)]
pub enum ParsedClientMessage {
    Hello { name: String },
    Input { dir: Direction },
    Pause,
    Restart,
    SelectDifficulty { difficulty: Difficulty },
    Menu,
    Ping { t: f64 },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "hello" => {
            let name = object.get("name")?.as_str()?.to_string();
            Some(ParsedClientMessage::Hello { name })
        }
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "pause" => Some(ParsedClientMessage::Pause),
        "restart" => Some(ParsedClientMessage::Restart),
        "select_difficulty" => {
            let difficulty = Difficulty::parse(object.get("difficulty")?.as_str()?)?;
            Some(ParsedClientMessage::SelectDifficulty { difficulty })
        }
        "menu" => Some(ParsedClientMessage::Menu),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

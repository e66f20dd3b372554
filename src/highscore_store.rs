use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::constants::MAX_HIGH_SCORES;
use crate::types::HighScoresResponse;

/// Plain-text score table: one integer per line, best first, at most
/// `MAX_HIGH_SCORES` lines. Load is permissive, save rewrites the whole file.
pub struct HighScoreStore {
    file_path: PathBuf,
    scores: Vec<i32>,
}

impl HighScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let scores = load_scores(&file_path);
        Self { file_path, scores }
    }

    pub fn high_scores(&self) -> &[i32] {
        &self.scores
    }

    pub fn highest_score(&self) -> i32 {
        self.scores.first().copied().unwrap_or(0)
    }

    /// Inserts `score` if it qualifies for the table and persists the new
    /// table. Returns whether the score made it in.
    pub fn add_score(&mut self, score: i32) -> bool {
        let qualifies = self.scores.len() < MAX_HIGH_SCORES
            || self
                .scores
                .last()
                .map(|lowest| score > *lowest)
                .unwrap_or(true);
        if !qualifies {
            return false;
        }

        self.scores.push(score);
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(MAX_HIGH_SCORES);
        self.save();
        true
    }

    pub fn build_response(&self) -> HighScoresResponse {
        HighScoresResponse {
            generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            scores: self.scores.clone(),
            highest: self.highest_score(),
        }
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[highscore-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                return;
            }
        }

        let mut text = self
            .scores
            .iter()
            .map(|score| score.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        if let Err(error) = fs::write(&self.file_path, text) {
            eprintln!(
                "[highscore-store] failed to write {}: {error}",
                self.file_path.display()
            );
        }
    }
}

fn load_scores(path: &Path) -> Vec<i32> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!(
                    "[highscore-store] failed to read {}: {error}",
                    path.display()
                );
            }
            return Vec::new();
        }
    };

    // Non-numeric lines are skipped rather than failing the whole table.
    let mut scores: Vec<i32> = text
        .lines()
        .filter_map(|line| line.trim().parse::<i32>().ok())
        .collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(MAX_HIGH_SCORES);
    scores
}

use std::time::{SystemTime, UNIX_EPOCH};

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "Player".to_string();
    }
    trimmed.chars().take(16).collect()
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Wall-clock seed mixed with process entropy so concurrent sessions do not
/// share ghost decisions.
pub fn session_seed() -> u32 {
    (now_ms() as u32) ^ rand::random::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_name(""), "Player");
        assert_eq!(sanitize_name("   "), "Player");
        assert_eq!(sanitize_name(" Alice "), "Alice");
        assert_eq!(sanitize_name("12345678901234567890"), "1234567890123456");
    }

    #[test]
    fn session_seed_varies_across_calls() {
        let seeds: std::collections::HashSet<u32> = (0..64).map(|_| session_seed()).collect();
        assert!(seeds.len() > 1);
    }
}

use std::path::PathBuf;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the stderr fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing_once(default_level: &str) {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// `usermine-<username>.db` in the working directory. Anything outside
/// `[A-Za-z0-9._-]` becomes `_`, so the name can never leave that directory.
pub fn default_db_filename(username: &str) -> PathBuf {
    let safe: String = username
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    PathBuf::from(format!("usermine-{}.db", safe))
}

/// Truncate to at most `max_bytes`, backing off to the nearest char boundary.
pub fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

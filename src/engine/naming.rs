//! Container naming.

use std::sync::atomic::{AtomicU64, Ordering};

use camino::Utf8Path;

/// Prefix shared by every container this crate launches.
pub const CONTAINER_NAME_PREFIX: &str = "agentbench";

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a container name unique to this invocation.
///
/// The name combines the sanitised workspace directory name, the current
/// time in milliseconds (base 36) and a process-wide counter, so two launches
/// within the same millisecond still differ.
#[must_use]
pub fn container_name(workspace: &Utf8Path) -> String {
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    let counter = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{CONTAINER_NAME_PREFIX}_{}_{}_{counter}",
        sanitize_container_segment(workspace.file_name().unwrap_or("workspace")),
        to_base36(millis)
    )
}

/// Replace characters Docker rejects in container names with `_`.
fn sanitize_container_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut digits = Vec::new();
    loop {
        let digit = usize::try_from(value.rem_euclid(36)).unwrap_or_default();
        digits.push(char::from(DIGITS.get(digit).copied().unwrap_or(b'0')));
        value = value.div_euclid(36);
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

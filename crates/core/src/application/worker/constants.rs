// Worker constants (no magic values)
use std::time::Duration;

/// How long a single pop waits for a task before re-checking the stop flag (1s).
/// Bounds shutdown latency without needing a wake-up signal on stop.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// How long process shutdown waits for the worker task to finish (5s)
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

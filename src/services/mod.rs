/// Once-a-second scoreboard push while the clock runs.
pub mod clock_ticker;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Live scoreboard operations and startup loading.
pub mod scoreboard_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage health supervision and degraded mode.
pub mod storage_supervisor;

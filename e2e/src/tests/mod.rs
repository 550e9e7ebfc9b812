//! Test registry - all test cases are registered here

pub mod helpers;

use crate::runner::TestCase;

/// Build and return all test cases
///
/// Each test queues what LM Studio would answer, sends a request to the
/// REAL relay, then validates what the browser would see.
pub fn all_tests() -> Vec<TestCase> {
    macro_rules! test {
        ($name:expr, $desc:expr, $func:path) => {
            TestCase {
                name: $name,
                description: $desc,
                run: Box::new(|ctx| Box::pin($func(ctx))),
            }
        };
    }

    vec![
        // ── Streaming relay ───────────────────────────────────────────────────
        test!(
            "chat/streaming_content",
            "Content deltas arrive in order and the stream ends with [DONE]",
            chat::test_streaming_content
        ),
        test!(
            "chat/streaming_forwards_request",
            "Upstream gets stream:true, defaults, and the bearer key",
            chat::test_streaming_forwards_request
        ),
        test!(
            "chat/streaming_reasoning",
            "reasoning_content and thinking deltas land on reasoning",
            chat::test_streaming_reasoning
        ),
        test!(
            "chat/heartbeats_suppressed",
            "Role-only and empty upstream chunks produce no events",
            chat::test_heartbeats_suppressed
        ),
        test!(
            "chat/malformed_line_skipped",
            "A malformed upstream line is skipped without ending the stream",
            chat::test_malformed_line_skipped
        ),
        test!(
            "chat/non_streaming_reasoning_normalized",
            "Non-streaming completion carries reasoning under the canonical key",
            chat::test_non_streaming_reasoning_normalized
        ),

        // ── Errors ────────────────────────────────────────────────────────────
        test!(
            "errors/unreachable_upstream",
            "Unreachable lmStudioUrl answers 503 with the connection hint",
            errors::test_unreachable_upstream
        ),
        test!(
            "errors/upstream_error_status",
            "Upstream 4xx answers 500 with a JSON error body",
            errors::test_upstream_error_status
        ),
        test!(
            "errors/empty_messages",
            "Empty message list is rejected",
            errors::test_empty_messages
        ),
        test!(
            "errors/unregistered_collaborator",
            "/api/system-info answers 404 when nothing is registered",
            errors::test_unregistered_collaborator
        ),

        // ── Models & health ───────────────────────────────────────────────────
        test!("models/health", "/health answers OK", models::test_health),
        test!(
            "models/list",
            "GET /api/models lists upstream models with hasModels",
            models::test_list_models
        ),
        test!(
            "models/unreachable",
            "POST /api/models with a dead upstream answers 503 and an empty list",
            models::test_models_unreachable
        ),
    ]
}

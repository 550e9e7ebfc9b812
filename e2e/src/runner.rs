//! Test runner - executes tests and reports results

use colored::Colorize;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use crate::types::{SharedBackendState, TestResult};

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A single test case
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub run: Box<dyn Fn(TestContext) -> TestFuture + Send + Sync>,
}

/// Context passed to each test - relay address and mock backend state
#[derive(Clone)]
pub struct TestContext {
    pub relay_addr: String,
    pub backend_state: SharedBackendState,
    pub http_client: reqwest::Client,
}

impl TestContext {
    /// Forget queued responses and recorded requests from the previous test
    fn reset_backend(&self) {
        let mut state = self.backend_state.lock().unwrap();
        state.response_queue.clear();
        state.received_requests.clear();
    }
}

const RULE: &str = "═══════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────";

/// Run the selected test cases one after another and report results
pub async fn run_tests(cases: Vec<TestCase>, ctx: TestContext, filter: Option<&str>) -> Vec<TestResult> {
    let selected: Vec<&TestCase> = cases
        .iter()
        .filter(|c| filter.map_or(true, |f| c.name.contains(f)))
        .collect();

    println!("\n{}", RULE.bright_blue());
    println!("{}", "  lm-relay End-to-End Tests".bright_white().bold());
    println!("{}", RULE.bright_blue());
    println!("  Relay:   {}", ctx.relay_addr.bright_cyan());
    println!("  Running: {} test(s)\n", selected.len().to_string().bright_cyan());

    let mut results = Vec::with_capacity(selected.len());
    for case in selected {
        ctx.reset_backend();
        print!("  {} {} ... ", "▶".bright_blue(), case.name.bright_white());

        let start = Instant::now();
        let outcome = (case.run)(ctx.clone()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let error = match outcome {
            Ok(()) => {
                println!("{} ({duration_ms}ms)", "PASS".bright_green().bold());
                None
            }
            Err(e) => {
                println!("{} ({duration_ms}ms)", "FAIL".bright_red().bold());
                for (depth, cause) in e.chain().enumerate() {
                    let label = if depth == 0 { "Error:".bright_red() } else { "Caused by:".yellow() };
                    println!("    {} {}", label, cause);
                }
                Some(e.to_string())
            }
        };

        results.push(TestResult {
            name: case.name.to_string(),
            passed: error.is_none(),
            error,
            duration_ms,
        });
    }

    print_summary(&results);
    results
}

fn print_summary(results: &[TestResult]) {
    let failed: Vec<&TestResult> = results.iter().filter(|r| !r.passed).collect();
    let passed = results.len() - failed.len();

    println!("\n{}", THIN_RULE.bright_blue());
    let summary = format!("  Results: {} passed, {} failed", passed, failed.len());
    if failed.is_empty() {
        println!("{}", summary.bright_green().bold());
    } else {
        println!("{}", summary.bright_red().bold());
        for result in failed {
            println!("    {} {}", "✗".bright_red(), result.name);
        }
    }
    println!("{}\n", RULE.bright_blue());
}

/// List all available tests
pub fn list_tests(cases: &[TestCase]) {
    println!("\n{}", "Available tests:".bright_white().bold());
    for case in cases {
        println!("  {} - {}", case.name.bright_cyan(), case.description);
    }
    println!();
}

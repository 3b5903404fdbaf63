//! Shared test utilities for integration tests

use chrono::NaiveDate;
use intentql::{
    parser, AccessDecision, CallerContext, CompileResult, CompilerConfig, QueryCompiler,
    QueryIntent, StaticPolicy,
};

/// Fixed compilation date so `custom` substitutions are deterministic
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
}

/// Load a policy fixture from the tests/test_data directory
pub fn load_policy(name: &str) -> StaticPolicy {
    let path = format!("tests/test_data/{}", name);
    parser::parse_policy_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load policy {}: {}", name, e))
}

/// Load a compiler configuration fixture from the tests/test_data directory
pub fn load_config(name: &str) -> CompilerConfig {
    let path = format!("tests/test_data/{}", name);
    parser::parse_config_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load config {}: {}", name, e))
}

/// Load an intent fixture from the tests/test_data directory
pub fn load_intent(name: &str) -> QueryIntent {
    let path = format!("tests/test_data/{}", name);
    parser::parse_intent_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load intent {}: {}", name, e))
}

// =============================================================================
// Callers
// =============================================================================

/// Sales rep scoped to one department by row-level policy
pub fn sales_rep(department: &str) -> CallerContext {
    CallerContext::new("rep-7")
        .with_role("sales")
        .with_attribute("department", department)
}

/// Exempt from row filters and allowed restricted fields
pub fn finance() -> CallerContext {
    CallerContext::new("fin-1").with_role("finance")
}

/// No roles at all
pub fn guest() -> CallerContext {
    CallerContext::new("guest")
}

// =============================================================================
// Pipeline
// =============================================================================

/// Compile with the default configuration on the fixed date
pub fn run_pipeline(policy: &StaticPolicy, caller: &CallerContext, intent: &QueryIntent) -> CompileResult {
    run_with_config(&CompilerConfig::default(), policy, caller, intent)
}

pub fn run_with_config(
    config: &CompilerConfig,
    policy: &StaticPolicy,
    caller: &CallerContext,
    intent: &QueryIntent,
) -> CompileResult {
    let compiler = QueryCompiler::new(config.clone())
        .unwrap_or_else(|e| panic!("Invalid compiler config: {}", e));
    compiler.compile_on(intent, &AccessDecision::new(policy, caller), today())
}

/// Parse an intent from inline JSON, then compile it
pub fn run_json(policy: &StaticPolicy, caller: &CallerContext, json: &str) -> CompileResult {
    let intent = parser::parse_intent_str(json)
        .unwrap_or_else(|e| panic!("Failed to parse intent: {}", e));
    run_pipeline(policy, caller, &intent)
}

/// The SQL of a successful result; panics with the error otherwise
pub fn sql_of(result: &CompileResult) -> &str {
    match result.executable_sql() {
        Some(sql) => sql,
        None => panic!("Compilation failed: {:?}", result.error),
    }
}

/// The WHERE clause body, between `WHERE ` and the next clause keyword
pub fn where_body(sql: &str) -> &str {
    let start = sql.find(" WHERE ").map(|i| i + " WHERE ".len()).expect("no WHERE clause");
    let rest = &sql[start..];
    let end = [" GROUP BY ", " ORDER BY ", " LIMIT "]
        .iter()
        .filter_map(|kw| rest.find(kw))
        .min()
        .unwrap_or(rest.len());
    &rest[..end]
}

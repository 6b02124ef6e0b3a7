use crate::types::RunResponse;

/// Render a response for people: a headline, the non-empty streams, the exit
/// code and timings when the API reported them.
pub fn format_result(response: &RunResponse) -> String {
    let mut parts = Vec::new();

    if response.succeeded() {
        parts.push("Execution successful".to_string());
    } else {
        parts.push(format!("Execution {}", response.status));
    }

    if !response.stdout.is_empty() {
        parts.push(format!("\nOutput:\n```\n{}```", response.stdout));
    }
    if !response.stderr.is_empty() {
        parts.push(format!("\nErrors:\n```\n{}```", response.stderr));
    }
    if let Some(code) = response.exit_code {
        parts.push(format!("\nExit code: {}", code));
    }

    if let Some(usage) = &response.usage {
        if let Some(compile_ms) = usage.compile_ms.filter(|ms| *ms > 0) {
            parts.push(format!("\nCompile time: {}ms", compile_ms));
        }
        parts.push(format!("Execution time: {}ms", usage.wall_ms.unwrap_or(0)));
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunUsage;

    fn response(status: &str) -> RunResponse {
        RunResponse {
            status: status.to_string(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            usage: None,
        }
    }

    #[test]
    fn test_success_headline_only() {
        assert_eq!(format_result(&response("succeeded")), "Execution successful");
    }

    #[test]
    fn test_full_report() {
        let report = format_result(&RunResponse {
            stdout: "4\n".to_string(),
            stderr: "warning\n".to_string(),
            exit_code: Some(0),
            usage: Some(RunUsage {
                wall_ms: Some(12),
                compile_ms: Some(850),
                ..Default::default()
            }),
            ..response("succeeded")
        });
        assert_eq!(
            report,
            "Execution successful\n\nOutput:\n```\n4\n```\n\nErrors:\n```\nwarning\n```\n\nExit code: 0\n\nCompile time: 850ms\nExecution time: 12ms"
        );
    }

    #[test]
    fn test_failure_headline_and_missing_wall_time() {
        let report = format_result(&RunResponse {
            usage: Some(RunUsage {
                compile_ms: Some(40),
                ..Default::default()
            }),
            ..response("compile_error")
        });
        assert!(report.starts_with("Execution compile_error"));
        assert!(report.ends_with("Execution time: 0ms"));
        assert!(!report.contains("Exit code"));
    }
}

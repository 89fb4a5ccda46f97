pub mod sarif;

use crate::rules::Finding;
use serde_json::json;

/// Format findings as a JSON document for programmatic consumers.
pub fn to_json(findings: &[Finding]) -> String {
    let doc = json!({
        "total": findings.len(),
        "findings": findings,
    });
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;

    fn finding() -> Finding {
        Finding {
            rule_id: "unpinned-action".to_string(),
            severity: Severity::High,
            title: "Unpinned action reference".to_string(),
            description: "Action 'actions/checkout@v3' is referenced by tag.".to_string(),
            file_path: ".github/workflows/ci.yml".to_string(),
            job_id: "build".to_string(),
            step_name: "actions/checkout@v3".to_string(),
            line: Some(7),
        }
    }

    #[test]
    fn test_json_shape() {
        let out = to_json(&[finding()]);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["total"], 1);
        assert_eq!(parsed["findings"][0]["rule_id"], "unpinned-action");
        assert_eq!(parsed["findings"][0]["severity"], "high");
        assert_eq!(parsed["findings"][0]["line"], 7);
    }

    #[test]
    fn test_empty_findings() {
        let parsed: serde_json::Value = serde_json::from_str(&to_json(&[])).unwrap();
        assert_eq!(parsed["total"], 0);
        assert_eq!(parsed["findings"].as_array().unwrap().len(), 0);
    }
}

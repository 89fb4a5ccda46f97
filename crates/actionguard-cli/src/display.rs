use actionguard_core::enrich::Enrichment;
use actionguard_core::rules::{Finding, Rule, Severity};
use colored::*;

fn severity_badge(severity: Severity) -> ColoredString {
    let label = format!("[{:8}]", severity.symbol());
    match severity {
        Severity::Critical => label.bright_red().bold(),
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow().bold(),
        Severity::Low => label.cyan().bold(),
    }
}

fn print_header(title: &str, scan_path: &str) {
    println!();
    println!("{}", "=".repeat(60).bold());
    println!("{}", format!("  {title}").bold());
    if !scan_path.is_empty() {
        println!("  Path: {scan_path}");
    }
    println!("{}", "=".repeat(60).bold());
    println!();
}

fn print_summary(findings: &[Finding]) {
    println!("  Found {} issue(s):", findings.len().to_string().bold());
    for sev in [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ] {
        let count = findings.iter().filter(|f| f.severity == sev).count();
        if count > 0 {
            println!("    {} x {}", severity_badge(sev), count);
        }
    }
    println!();
    println!("  {}", "-".repeat(56).dimmed());
}

fn print_finding(index: usize, f: &Finding) {
    println!();
    println!(
        "  {} #{}: {}",
        severity_badge(f.severity),
        index,
        f.title.bold()
    );
    println!("    Rule:  {}", f.rule_id);
    println!("    File:  {}", f.file_path);
    if let Some(line) = f.line {
        println!("    Line:  {line}");
    }
    if !f.job_id.is_empty() {
        println!("    Job:   {}", f.job_id);
    }
    if !f.step_name.is_empty() {
        println!("    Step:  {}", f.step_name);
    }
    println!();
    for desc_line in f.description.lines() {
        println!("    {desc_line}");
    }
}

/// Print a full scan report to the terminal.
pub fn print_report(findings: &[Finding], scan_path: &str) {
    print_header("GitHub Actions Security Report", scan_path);

    if findings.is_empty() {
        println!("  {} No security issues found!", "OK".green().bold());
        println!();
        return;
    }

    print_summary(findings);
    for (i, f) in findings.iter().enumerate() {
        print_finding(i + 1, f);
    }
    println!();
}

/// Print a scan report with AI explanations and suggested fixes.
pub fn print_enriched_report(
    findings: &[Finding],
    enrichments: &[Enrichment],
    scan_path: &str,
) {
    print_header("GitHub Actions Security Report (AI-Enhanced)", scan_path);

    if findings.is_empty() {
        println!("  {} No security issues found!", "OK".green().bold());
        println!();
        return;
    }

    print_summary(findings);
    for (i, f) in findings.iter().enumerate() {
        print_finding(i + 1, f);
        if let Some(e) = enrichments.get(i) {
            println!();
            println!("    {}", "Why this matters".bold().underline());
            for line in e.explanation.lines() {
                println!("    {line}");
            }
            println!();
            println!("    {}", "Suggested fix".green().bold().underline());
            for line in e.suggested_fix.lines() {
                println!("    {}", line.green());
            }
        }
    }
    println!();
}

/// Print the rule registry.
pub fn print_rule_list(rules: &[Rule]) {
    println!();
    println!("{}", "  Registered rules".bold().underline());
    println!();
    for rule in rules {
        println!(
            "  {} {:24} {}",
            severity_badge(rule.severity),
            rule.id.bold(),
            rule.summary
        );
    }
    println!();
}

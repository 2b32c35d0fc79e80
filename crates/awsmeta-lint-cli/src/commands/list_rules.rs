//! List rules command implementation.

use awsmeta_lint_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!(
        "{:<7} {:<42} {:<8} Description",
        "Code", "Name", "Default"
    );
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        println!(
            "{:<7} {:<42} {:<8} {}",
            rule.code(),
            rule.name(),
            if rule.enabled_by_default() { "on" } else { "off" },
            rule.description()
        );
    }

    println!("\nPresets:");
    for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
        let codes: Vec<&str> = preset.rules().iter().map(|rule| rule.code()).collect();
        println!("  {:<12} - {}", preset.as_str(), codes.join(", "));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  awsmeta-lint check --rules aws-meta-hardcoded,aws-iam-policy-hardcoded-region");
    println!("  awsmeta-lint check --rules AM001,AM006");
}

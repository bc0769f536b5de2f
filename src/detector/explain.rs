use std::fmt::Write as _;

use crate::domain::{DetectionResult, Feature};

const RULE_WIDTH: usize = 60;

/// Human-readable report for one detection.
///
/// Sections: header, verdict line, method, rule breakdown, classifier
/// breakdown, key features. Percentages use two decimals.
pub fn render(username: Option<&str>, result: &DetectionResult) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Detection Result for user '{}'",
        username.unwrap_or("Unknown")
    );
    let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDTH));

    if result.is_bot {
        let _ = writeln!(out, "BOT DETECTED (Confidence: {})\n", percent(result.confidence));
    } else {
        let _ = writeln!(
            out,
            "Likely Legitimate User (Bot score: {})\n",
            percent(result.confidence)
        );
    }

    let _ = writeln!(out, "Detection Method: {}\n", result.method);

    if let Some(rules) = &result.details.rules {
        out.push_str("Rule-Based Analysis:\n");
        let _ = writeln!(out, "  Score: {}", percent(rules.score));
        if !rules.fired_rules.is_empty() {
            out.push_str("  Triggered Rules:\n");
            for rule in &rules.fired_rules {
                let _ = writeln!(out, "    - {}", rule);
            }
        }
        out.push('\n');
    }

    if let Some(ml) = &result.details.ml {
        out.push_str("Machine Learning Analysis:\n");
        let _ = writeln!(out, "  Confidence: {}", percent(ml.confidence));
        let _ = writeln!(
            out,
            "  Classification: {}\n",
            if ml.is_bot { "Bot" } else { "Legitimate" }
        );
    }

    let f = &result.features;
    out.push_str("Key Features:\n");
    let _ = writeln!(out, "  Account Age: {:.0} days", f.get(Feature::AccountAgeDays));
    let _ = writeln!(out, "  Profile Image: {}", yes_no(f.flag(Feature::HasProfileImage)));
    let _ = writeln!(out, "  Bio: {}", yes_no(f.flag(Feature::HasBio)));
    let _ = writeln!(out, "  Followers: {:.0}", f.get(Feature::FollowerCount));
    let _ = writeln!(out, "  Following: {:.0}", f.get(Feature::FollowingCount));
    let _ = writeln!(
        out,
        "  Post Frequency: {:.2} posts/day",
        f.get(Feature::PostFrequency)
    );

    out
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClassifierVerdict, DetectionDetails, DetectionMethod, FeatureVector, RuleVerdict,
        VerdictSource,
    };

    fn sample() -> DetectionResult {
        DetectionResult {
            is_bot: true,
            confidence: 0.66,
            method: DetectionMethod::Combined,
            details: DetectionDetails {
                rules: Some(RuleVerdict {
                    is_bot: false,
                    score: 0.3,
                    fired_rules: vec!["No profile image".into()],
                    evidence: Vec::new(),
                }),
                ml: Some(ClassifierVerdict {
                    is_bot: true,
                    confidence: 0.9,
                    source: VerdictSource::Model,
                }),
            },
            features: FeatureVector::zeroed()
                .with(Feature::AccountAgeDays, 3.0)
                .with(Feature::FollowerCount, 12.0)
                .with(Feature::PostFrequency, 4.5),
        }
    }

    #[test]
    fn test_render_sections() {
        let text = render(Some("spammer99"), &sample());

        assert!(text.starts_with("Detection Result for user 'spammer99'\n"));
        assert!(text.contains("BOT DETECTED (Confidence: 66.00%)"));
        assert!(text.contains("Detection Method: combined"));
        assert!(text.contains("  Score: 30.00%"));
        assert!(text.contains("    - No profile image"));
        assert!(text.contains("  Confidence: 90.00%"));
        assert!(text.contains("  Classification: Bot"));
        assert!(text.contains("  Account Age: 3 days"));
        assert!(text.contains("  Profile Image: No"));
        assert!(text.contains("  Followers: 12"));
        assert!(text.contains("  Post Frequency: 4.50 posts/day"));
    }

    #[test]
    fn test_render_unknown_user_without_details() {
        let result = DetectionResult::undetermined(FeatureVector::zeroed());
        let text = render(None, &result);

        assert!(text.contains("user 'Unknown'"));
        assert!(text.contains("Likely Legitimate User (Bot score: 0.00%)"));
        assert!(text.contains("Detection Method: none"));
        assert!(!text.contains("Rule-Based Analysis"));
        assert!(!text.contains("Machine Learning Analysis"));
    }
}

//! Derivation rules that fan one accepted submission out into the derived stores.
//!
//! Each rule is a pure function of the submission alone. Rules never see each other's
//! output, so the order the pipeline applies them in does not matter.

use crate::model::{EarlyAdopter, Lead, Submission, Testimonial};

/// Paid offerings that turn any respondent into a lead, matched exactly.
pub const PAID_SERVICES: [&str; 3] = [
    "1-on-1 AI Strategy Coaching",
    "Custom Team Workshop for My Organization",
    "AI Implementation Consulting",
];

/// `testedGPT` answers that, with `builtGPT == "Yes"`, mark an early adopter.
pub const ADOPTION_ANSWERS: [&str; 2] = ["Yes, already used it", "Plan to use it this week"];

const PROMOTER_NPS: i64 = 9;
const HIGH_CONFIDENCE_GAIN: i64 = 4;

/// `sharePublic` opt-in: boolean `true`, or the checkbox strings `"on"` / `"1"`.
pub fn shares_publicly(submission: &Submission) -> bool {
    match submission.get("sharePublic") {
        Some(serde_json::Value::Bool(true)) => true,
        Some(serde_json::Value::String(s)) => s == "on" || s == "1",
        _ => false,
    }
}

pub fn testimonial_for(submission: &Submission) -> Option<Testimonial> {
    if !shares_publicly(submission) {
        return None;
    }

    let nps = submission.int("nps");
    let conf_gain = submission.int("confGain");
    let public_name = submission.text("publicName");
    let name = if public_name.is_empty() {
        submission.text("fullName")
    } else {
        public_name
    };

    Some(Testimonial {
        name,
        title: submission.text("role"),
        quote: submission.text("pullQuote"),
        nps,
        conf_gain,
        submitted_at: submission.text("submittedAt"),
        high_impact: nps >= PROMOTER_NPS && conf_gain >= HIGH_CONFIDENCE_GAIN,
    })
}

pub fn lead_for(submission: &Submission) -> Option<Lead> {
    let nps = submission.int("nps");
    let interest = submission.strings("interest");
    let wants_paid_service = interest
        .iter()
        .any(|item| PAID_SERVICES.contains(&item.as_str()));

    if nps < PROMOTER_NPS && !wants_paid_service {
        return None;
    }

    Some(Lead {
        name: submission.text("fullName"),
        email: submission.text("email"),
        title: submission.text("role"),
        interest,
        nps,
        notes: submission.text("firstAction"),
        submitted_at: submission.text("submittedAt"),
    })
}

pub fn early_adopter_for(submission: &Submission) -> Option<EarlyAdopter> {
    if !submission.is("builtGPT", "Yes") {
        return None;
    }
    let tested = ADOPTION_ANSWERS
        .iter()
        .any(|answer| submission.is("testedGPT", answer));
    if !tested {
        return None;
    }

    Some(EarlyAdopter {
        name: submission.text("fullName"),
        email: submission.text("email"),
        title: submission.text("role"),
        built_gpt: submission.text("builtGPT"),
        tested_gpt: submission.text("testedGPT"),
        gpt_use: submission.text("gptUse"),
        submitted_at: submission.text("submittedAt"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn submission(extra: Value) -> Submission {
        let mut base = json!({
            "fullName": "Dana Whitfield",
            "role": "Program Analyst",
            "organization": "GSA",
            "email": "dana@example.gov",
            "firstAction": "Draft a GPT for intake triage",
            "pullQuote": "Great session",
            "builtGPT": "No",
            "submittedAt": "2026-10-18T09:30:00+00:00",
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
            base.extend(extra);
        }
        match base {
            Value::Object(map) => Submission::new(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn testimonial_requires_exact_opt_in_values() {
        for yes in [json!(true), json!("on"), json!("1")] {
            assert!(
                testimonial_for(&submission(json!({"sharePublic": yes.clone()}))).is_some(),
                "{yes} should opt in"
            );
        }
        for no in [json!(false), json!("yes"), json!("true"), json!(1), json!("")] {
            assert!(
                testimonial_for(&submission(json!({"sharePublic": no.clone()}))).is_none(),
                "{no} should not opt in"
            );
        }
        assert!(testimonial_for(&submission(json!({}))).is_none());
    }

    #[test]
    fn high_impact_boundaries() {
        let cases = [(9, 4, true), (10, 5, true), (8, 4, false), (9, 3, false), (8, 3, false)];
        for (nps, conf_gain, expected) in cases {
            let t = testimonial_for(&submission(json!({
                "sharePublic": "on",
                "nps": nps,
                "confGain": conf_gain,
            })))
            .unwrap();
            assert_eq!(t.high_impact, expected, "nps={nps} confGain={conf_gain}");
        }
    }

    #[test]
    fn testimonial_prefers_public_name() {
        let named = testimonial_for(&submission(json!({
            "sharePublic": true,
            "publicName": "D. W.",
        })))
        .unwrap();
        assert_eq!(named.name, "D. W.");
        assert_eq!(named.title, "Program Analyst");
        assert_eq!(named.quote, "Great session");

        let blank = testimonial_for(&submission(json!({
            "sharePublic": true,
            "publicName": "",
        })))
        .unwrap();
        assert_eq!(blank.name, "Dana Whitfield");
    }

    #[test]
    fn testimonial_coerces_string_scores() {
        let t = testimonial_for(&submission(json!({
            "sharePublic": "1",
            "nps": "10",
            "confGain": "4",
        })))
        .unwrap();
        assert_eq!((t.nps, t.conf_gain, t.high_impact), (10, 4, true));
    }

    #[test]
    fn lead_fires_on_promoter_score() {
        assert!(lead_for(&submission(json!({"nps": 9}))).is_some());
        assert!(lead_for(&submission(json!({"nps": 8}))).is_none());
        assert!(lead_for(&submission(json!({}))).is_none());
    }

    #[test]
    fn lead_fires_on_exact_paid_service_interest() {
        let lead = lead_for(&submission(json!({
            "nps": 5,
            "interest": ["Newsletter", "AI Implementation Consulting"],
        })))
        .unwrap();
        assert_eq!(lead.nps, 5);
        assert_eq!(lead.notes, "Draft a GPT for intake triage");
        assert_eq!(
            lead.interest,
            vec!["Newsletter".to_string(), "AI Implementation Consulting".to_string()]
        );

        for near_miss in [
            "ai implementation consulting",
            "AI Implementation",
            "AI Implementation Consulting ",
        ] {
            assert!(
                lead_for(&submission(json!({"nps": 5, "interest": [near_miss]}))).is_none(),
                "{near_miss:?} should not match"
            );
        }
        assert!(
            lead_for(&submission(json!({"interest": "AI Implementation Consulting"}))).is_none(),
            "interest must be a list"
        );
    }

    #[test]
    fn early_adopter_requires_both_answers() {
        let yes = submission(json!({
            "builtGPT": "Yes",
            "testedGPT": "Plan to use it this week",
            "gptUse": "Drafting memos",
        }));
        let adopter = early_adopter_for(&yes).unwrap();
        assert_eq!(adopter.built_gpt, "Yes");
        assert_eq!(adopter.gpt_use, "Drafting memos");

        assert!(early_adopter_for(&submission(json!({
            "builtGPT": "Yes",
            "testedGPT": "Yes, already used it",
        })))
        .is_some());

        assert!(early_adopter_for(&submission(json!({
            "builtGPT": "No",
            "testedGPT": "Plan to use it this week",
        })))
        .is_none());

        assert!(early_adopter_for(&submission(json!({
            "builtGPT": "Yes",
            "testedGPT": "Not yet",
        })))
        .is_none());

        assert!(early_adopter_for(&submission(json!({"builtGPT": "Yes"}))).is_none());
    }
}

//! Guidance text per severity grade.

use serde::{Deserialize, Serialize};

use super::severity::Severity;

const CONTROLLED_TEXT: &str = "Your asthma condition is currently under control. Continue to monitor your symptoms regularly.";

/// Bullet lines keep the 12-space indent clients already store and display.
const HOME_CARE_TEXT: &str = concat!(
    "You are experiencing mild to moderate asthma symptoms. Try some home remedies such as:\n",
    "            - Steam Inhalation: Inhale steam from hot water to open up the airways.\n",
    "            - Staying Hydrated: Drink plenty of water to keep the airways moist.\n",
    "            - Using a Humidifier: Add moisture to the air with a humidifier to prevent dryness in the airways.\n",
    "            - Breathing Exercises: Practice deep breathing exercises and pursed-lip breathing to improve lung function.\n",
    "            - Avoiding Triggers: Identify and avoid triggers such as smoke, dust, pollen, and pet dander.\n",
    "            - Maintaining a Clean Environment: Keep the home clean and free of dust, mold, and allergens.",
);

const SEVERE_TEXT: &str = "You are experiencing severe asthma symptoms. Please seek immediate medical attention. In the meantime, you may find the following resources helpful:";

const FALLBACK_TEXT: &str = "No recommendation available.";

/// Severe-case resources, in display order.
const SEVERE_RESOURCES: [(&str, &str); 5] = [
    (
        "How to ease asthma symptoms - 3 effective breathing exercises by Airofit",
        "https://www.youtube.com/watch?v=FyjZLPmZ534",
    ),
    (
        "Exercise-Induced Asthma by CNN",
        "https://www.youtube.com/watch?v=B8pNeYFZNew",
    ),
    (
        "ASTHMA / how to cure exercise induced wheezing naturally by Andrew Folts",
        "https://www.youtube.com/watch?v=jv-revgQdPE",
    ),
    (
        "Easy tips to treat Asthma & Bronchitis | Dr. Hansaji Yogendra by The Yoga Institute",
        "https://www.youtube.com/watch?v=JwRG8AsStLQ",
    ),
    (
        "Breathing Exercises for COPD, Asthma, Bronchitis & Emphysema - Ask Doctor Jo by AskDoctorJo",
        "https://www.youtube.com/watch?v=dpTNUGwXbTU",
    ),
];

/// A titled link shown alongside a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

impl Resource {
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Guidance returned to the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub resources: Vec<Resource>,
}

impl Recommendation {
    fn text_only(text: &str) -> Self {
        Self {
            text: text.to_string(),
            resources: Vec::new(),
        }
    }
}

/// Guidance for a severity grade.
#[must_use]
pub fn recommend(severity: Severity) -> Recommendation {
    match severity {
        Severity::Controlled => Recommendation::text_only(CONTROLLED_TEXT),
        Severity::Mild | Severity::Moderate => Recommendation::text_only(HOME_CARE_TEXT),
        Severity::Severe => Recommendation {
            text: SEVERE_TEXT.to_string(),
            resources: SEVERE_RESOURCES
                .iter()
                .map(|(title, url)| Resource::new(*title, *url))
                .collect(),
        },
    }
}

/// Guidance for a raw integer grade. Anything outside 0..=3 gets the
/// fallback text and no resources.
#[must_use]
pub fn recommend_level(level: i64) -> Recommendation {
    match level {
        0..=3 => recommend(Severity::from_raw(level)),
        _ => Recommendation::text_only(FALLBACK_TEXT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controlled_has_no_resources() {
        let rec = recommend(Severity::Controlled);
        assert_eq!(rec.text, CONTROLLED_TEXT);
        assert!(rec.resources.is_empty());
    }

    #[test]
    fn test_mild_and_moderate_share_text() {
        let mild = recommend(Severity::Mild);
        let moderate = recommend(Severity::Moderate);
        assert_eq!(mild.text, moderate.text);
        assert_eq!(mild, moderate);
        assert!(mild.resources.is_empty());
    }

    #[test]
    fn test_home_care_text_exact() {
        let expected = "You are experiencing mild to moderate asthma symptoms. Try some home remedies such as:
            - Steam Inhalation: Inhale steam from hot water to open up the airways.
            - Staying Hydrated: Drink plenty of water to keep the airways moist.
            - Using a Humidifier: Add moisture to the air with a humidifier to prevent dryness in the airways.
            - Breathing Exercises: Practice deep breathing exercises and pursed-lip breathing to improve lung function.
            - Avoiding Triggers: Identify and avoid triggers such as smoke, dust, pollen, and pet dander.
            - Maintaining a Clean Environment: Keep the home clean and free of dust, mold, and allergens.";
        assert_eq!(recommend(Severity::Mild).text, expected);
        assert_eq!(recommend(Severity::Moderate).text, expected);
    }

    #[test]
    fn test_severe_resources_in_order() {
        let rec = recommend(Severity::Severe);
        assert_eq!(
            rec.text,
            "You are experiencing severe asthma symptoms. Please seek immediate medical attention. \
             In the meantime, you may find the following resources helpful:"
        );

        let pairs: Vec<(&str, &str)> = rec
            .resources
            .iter()
            .map(|r| (r.title.as_str(), r.url.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                (
                    "How to ease asthma symptoms - 3 effective breathing exercises by Airofit",
                    "https://www.youtube.com/watch?v=FyjZLPmZ534",
                ),
                (
                    "Exercise-Induced Asthma by CNN",
                    "https://www.youtube.com/watch?v=B8pNeYFZNew",
                ),
                (
                    "ASTHMA / how to cure exercise induced wheezing naturally by Andrew Folts",
                    "https://www.youtube.com/watch?v=jv-revgQdPE",
                ),
                (
                    "Easy tips to treat Asthma & Bronchitis | Dr. Hansaji Yogendra by The Yoga Institute",
                    "https://www.youtube.com/watch?v=JwRG8AsStLQ",
                ),
                (
                    "Breathing Exercises for COPD, Asthma, Bronchitis & Emphysema - Ask Doctor Jo by AskDoctorJo",
                    "https://www.youtube.com/watch?v=dpTNUGwXbTU",
                ),
            ]
        );
    }

    #[test]
    fn test_recommend_is_pure() {
        for severity in Severity::ALL {
            let a = serde_json::to_vec(&recommend(severity)).expect("Should serialize");
            let b = serde_json::to_vec(&recommend(severity)).expect("Should serialize");
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_out_of_range_level() {
        assert_eq!(recommend_level(7).text, FALLBACK_TEXT);
        assert!(recommend_level(-1).resources.is_empty());
        assert_eq!(recommend_level(3), recommend(Severity::Severe));
    }
}

//! Winter readiness scoring for Canadian driving conditions

use serde::{Deserialize, Serialize};

/// Ground clearance (inches) that counts as high
const HIGH_CLEARANCE_INCHES: f64 = 8.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WinterFeatures {
    #[serde(rename = "hasAWD")]
    pub has_awd: bool,
    pub ground_clearance: Option<f64>,
    pub has_heated_seats: bool,
    pub has_remote_start: bool,
    pub has_advanced_traction: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinterScore {
    pub score: u32,
    pub rating: String,
    pub details: Vec<String>,
}

pub fn winter_score(features: &WinterFeatures) -> WinterScore {
    let mut score = 0;
    let mut details = Vec::with_capacity(6);

    if features.has_awd {
        score += 30;
        details.push("AWD/4WD (+30 points)".to_string());
    } else {
        details.push("No AWD/4WD".to_string());
    }

    match features.ground_clearance {
        Some(inches) if inches >= HIGH_CLEARANCE_INCHES => {
            score += 25;
            details.push(format!("Good ground clearance ({}\") (+25 points)", inches));
        }
        // any reported clearance below the threshold still counts
        Some(inches) if inches != 0.0 && !inches.is_nan() => {
            score += 10;
            details.push(format!("Low ground clearance ({}\") (+10 points)", inches));
        }
        _ => {}
    }

    if features.has_heated_seats {
        score += 10;
        details.push("Heated seats (+10 points)".to_string());
    }
    if features.has_remote_start {
        score += 10;
        details.push("Remote start (+10 points)".to_string());
    }
    if features.has_advanced_traction {
        score += 15;
        details.push("Advanced traction control (+15 points)".to_string());
    }

    // every modern car takes winter tires
    score += 10;
    details.push("Winter tire compatible (+10 points)".to_string());

    WinterScore {
        score,
        rating: rating_for(score).to_string(),
        details,
    }
}

fn rating_for(score: u32) -> &'static str {
    match score {
        90.. => "Excellent for Canadian winters",
        75..=89 => "Very good for winter",
        60..=74 => "Good with winter tires",
        _ => "Not recommended for harsh winters",
    }
}

//! MET-based calorie burn estimates.
//!
//! `calories = MET * weight (kg) * duration (hours)`. MET values for the
//! swimming strokes come from the Compendium of Physical Activities.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{ToolError, ToolOptions, require_positive};
use crate::units::mass_to_kg;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SwimStroke {
    FreestyleLight,
    FreestyleVigorous,
    Backstroke,
    Breaststroke,
    Butterfly,
    Sidestroke,
    TreadingWater,
    #[default]
    Leisurely,
}

impl SwimStroke {
    pub fn met(self) -> f64 {
        match self {
            SwimStroke::FreestyleLight => 5.8,
            SwimStroke::FreestyleVigorous => 9.8,
            SwimStroke::Backstroke => 4.8,
            SwimStroke::Breaststroke => 5.3,
            SwimStroke::Butterfly => 13.8,
            SwimStroke::Sidestroke => 7.0,
            SwimStroke::TreadingWater => 3.5,
            SwimStroke::Leisurely => 6.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SwimmingInput {
    pub weight: f64,
    pub minutes: f64,
    #[serde(default)]
    pub stroke: SwimStroke,
    /// Replaces the stroke's MET value when set.
    pub met_override: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CalorieBurnResult {
    pub calories: f64,
    pub calories_per_minute: f64,
    pub met: f64,
    pub minutes: f64,
}

pub fn calories_burned(met: f64, weight_kg: f64, minutes: f64) -> f64 {
    met * weight_kg * minutes / 60.0
}

pub fn calculate_swimming_calories(
    input: &SwimmingInput,
    options: &ToolOptions,
) -> Result<CalorieBurnResult, ToolError> {
    let weight = mass_to_kg(require_positive("weight", input.weight)?, options.units());
    let minutes = require_positive("minutes", input.minutes)?;
    let met = match input.met_override {
        Some(m) => require_positive("met", m)?,
        None => input.stroke.met(),
    };

    let calories = calories_burned(met, weight, minutes);
    debug!("swimming {:?} met={} -> {:.1} kcal", input.stroke, met, calories);

    Ok(CalorieBurnResult {
        calories: options.round(calories),
        calories_per_minute: options.round(calories / minutes),
        met,
        minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hour_at_one_met_burns_body_weight() {
        assert_eq!(calories_burned(1.0, 70.0, 60.0), 70.0);
    }

    #[test]
    fn stroke_met_drives_result() {
        let input = SwimmingInput {
            weight: 70.0,
            minutes: 30.0,
            stroke: SwimStroke::Butterfly,
            met_override: None,
        };
        let res = calculate_swimming_calories(&input, &ToolOptions::default()).unwrap();
        assert_eq!(res.calories, 483.0);
        assert_eq!(res.calories_per_minute, 16.1);
        assert_eq!(res.met, 13.8);
    }

    #[test]
    fn override_and_guards() {
        let mut input = SwimmingInput {
            weight: 80.0,
            minutes: 45.0,
            stroke: SwimStroke::default(),
            met_override: Some(8.0),
        };
        let res = calculate_swimming_calories(&input, &ToolOptions::default()).unwrap();
        assert_eq!(res.calories, 480.0);

        input.minutes = 0.0;
        assert!(calculate_swimming_calories(&input, &ToolOptions::default()).is_err());
    }
}

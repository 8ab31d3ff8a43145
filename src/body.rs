//! # Body Composition and Energy
//!
//! Body fat (US Navy circumference method), BMI, and basal metabolic rate with
//! the TDEE and calorie targets derived from it.
//!
//! All formulas work in kilograms and centimetres; imperial form input is
//! normalised through [`crate::units`] first.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{ActivityLevel, Sex, ToolError, ToolOptions, require_positive};
use crate::units::{length_to_cm, mass_to_kg};

const BODY_FAT_MIN: f64 = 3.0;
const BODY_FAT_MAX: f64 = 50.0;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BodyFatInput {
    pub sex: Sex,
    pub waist: f64,
    pub neck: f64,
    pub height: f64,
    /// Required for the female formula.
    pub hip: Option<f64>,
    /// Enables fat and lean mass in the result.
    pub weight: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BodyFatResult {
    pub body_fat_percentage: f64,
    pub category: String,
    pub fat_mass: Option<f64>,
    pub lean_mass: Option<f64>,
}

/// Body fat percentage by the US Navy formula, clamped to [3, 50].
///
/// All lengths are centimetres.
pub fn body_fat_navy(
    sex: Sex,
    waist: f64,
    neck: f64,
    height: f64,
    hip: Option<f64>,
) -> Result<f64, ToolError> {
    let raw = match sex {
        Sex::Male => {
            let girth = waist - neck;
            if girth <= 0.0 {
                return Err(ToolError::InvalidInput(
                    "waist must be larger than neck".into(),
                ));
            }
            495.0 / (1.0324 - 0.19077 * girth.log10() + 0.15456 * height.log10()) - 450.0
        }
        Sex::Female => {
            let hip = hip.ok_or_else(|| {
                ToolError::InvalidInput("hip measurement is required for women".into())
            })?;
            let girth = waist + hip - neck;
            if girth <= 0.0 {
                return Err(ToolError::InvalidInput(
                    "waist plus hip must be larger than neck".into(),
                ));
            }
            495.0 / (1.29579 - 0.35004 * girth.log10() + 0.22100 * height.log10()) - 450.0
        }
    };
    if !raw.is_finite() {
        return Err(ToolError::InvalidInput(
            "measurements do not produce a body fat estimate".into(),
        ));
    }
    Ok(raw.clamp(BODY_FAT_MIN, BODY_FAT_MAX))
}

/// ACE body fat category.
pub fn body_fat_category(sex: Sex, percentage: f64) -> &'static str {
    let cutoffs = match sex {
        Sex::Male => [6.0, 14.0, 18.0, 25.0],
        Sex::Female => [14.0, 21.0, 25.0, 32.0],
    };
    if percentage < cutoffs[0] {
        "Essential Fat"
    } else if percentage < cutoffs[1] {
        "Athletes"
    } else if percentage < cutoffs[2] {
        "Fitness"
    } else if percentage < cutoffs[3] {
        "Average"
    } else {
        "Obese"
    }
}

pub fn calculate_body_fat(
    input: &BodyFatInput,
    options: &ToolOptions,
) -> Result<BodyFatResult, ToolError> {
    let units = options.units();
    let waist = length_to_cm(require_positive("waist", input.waist)?, units);
    let neck = length_to_cm(require_positive("neck", input.neck)?, units);
    let height = length_to_cm(require_positive("height", input.height)?, units);
    let hip = match input.hip {
        Some(h) => Some(length_to_cm(require_positive("hip", h)?, units)),
        None => None,
    };

    let percentage = body_fat_navy(input.sex, waist, neck, height, hip)?;
    debug!("body fat {:?} -> {:.2}%", input.sex, percentage);

    let (fat_mass, lean_mass) = match input.weight {
        Some(w) => {
            let weight = mass_to_kg(require_positive("weight", w)?, units);
            let fat = weight * percentage / 100.0;
            (Some(options.round(fat)), Some(options.round(weight - fat)))
        }
        None => (None, None),
    };

    Ok(BodyFatResult {
        body_fat_percentage: options.round(percentage),
        category: body_fat_category(input.sex, percentage).into(),
        fat_mass,
        lean_mass,
    })
}

/// Mifflin-St Jeor BMR in kcal/day.
pub fn bmr_mifflin(sex: Sex, weight_kg: f64, height_cm: f64, age: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Revised Harris-Benedict BMR (Roza and Shizgal, 1984).
pub fn bmr_harris_benedict(sex: Sex, weight_kg: f64, height_cm: f64, age: f64) -> f64 {
    match sex {
        Sex::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Sex::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// Katch-McArdle BMR from lean body mass.
pub fn bmr_katch_mcardle(weight_kg: f64, body_fat_percentage: f64) -> f64 {
    let lean_mass = weight_kg * (1.0 - body_fat_percentage / 100.0);
    370.0 + 21.6 * lean_mass
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    #[default]
    MifflinStJeor,
    HarrisBenedict,
    KatchMcardle,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EnergyInput {
    pub sex: Sex,
    pub age: f64,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub formula: BmrFormula,
    /// Needed by Katch-McArdle.
    pub body_fat_percentage: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CalorieGoal {
    pub label: String,
    pub calories: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EnergyResult {
    pub bmr: f64,
    pub tdee: f64,
    pub formula: BmrFormula,
    pub activity_level: ActivityLevel,
    pub goals: Vec<CalorieGoal>,
}

const GOALS: [(&str, f64); 6] = [
    ("Maintain weight", 0.0),
    ("Mild weight loss", -250.0),
    ("Weight loss", -500.0),
    ("Extreme weight loss", -1000.0),
    ("Mild weight gain", 250.0),
    ("Weight gain", 500.0),
];

pub fn calculate_energy(
    input: &EnergyInput,
    options: &ToolOptions,
) -> Result<EnergyResult, ToolError> {
    let units = options.units();
    let age = require_positive("age", input.age)?;
    let weight = mass_to_kg(require_positive("weight", input.weight)?, units);
    let height = length_to_cm(require_positive("height", input.height)?, units);

    let bmr = match input.formula {
        BmrFormula::MifflinStJeor => bmr_mifflin(input.sex, weight, height, age),
        BmrFormula::HarrisBenedict => bmr_harris_benedict(input.sex, weight, height, age),
        BmrFormula::KatchMcardle => {
            let fat = input.body_fat_percentage.ok_or_else(|| {
                ToolError::InvalidInput("Katch-McArdle needs a body fat percentage".into())
            })?;
            if !(0.0..100.0).contains(&fat) {
                return Err(ToolError::OutOfRange {
                    field: "body_fat_percentage",
                    min: 0.0,
                    max: 100.0,
                });
            }
            bmr_katch_mcardle(weight, fat)
        }
    };
    let tdee = bmr * input.activity_level.factor();
    debug!("bmr {:?} = {:.1}, tdee = {:.1}", input.formula, bmr, tdee);

    Ok(EnergyResult {
        bmr: options.round(bmr),
        tdee: options.round(tdee),
        formula: input.formula,
        activity_level: input.activity_level,
        goals: GOALS
            .iter()
            .map(|(label, delta)| CalorieGoal {
                label: (*label).into(),
                calories: options.round(tdee + delta),
            })
            .collect(),
    })
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BmiInput {
    pub weight: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: String,
    /// Weight range (kg) giving a BMI of 18.5-24.9 at this height.
    pub healthy_weight_min: f64,
    pub healthy_weight_max: f64,
}

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

pub fn calculate_bmi(input: &BmiInput, options: &ToolOptions) -> Result<BmiResult, ToolError> {
    let units = options.units();
    let weight = mass_to_kg(require_positive("weight", input.weight)?, units);
    let height_m = length_to_cm(require_positive("height", input.height)?, units) / 100.0;
    let bmi = weight / (height_m * height_m);

    Ok(BmiResult {
        bmi: options.round(bmi),
        category: bmi_category(bmi).into(),
        healthy_weight_min: options.round(18.5 * height_m * height_m),
        healthy_weight_max: options.round(24.9 * height_m * height_m),
    })
}

//! # Growth Percentile
//!
//! Places a child's weight, length or head circumference on the WHO Child
//! Growth Standards for 0-24 months.
//!
//! The reference tables hold one row per age and one column per reference
//! percentile (3rd, 15th, 50th, 85th, 97th). Ages between two rows interpolate
//! every column linearly; a measurement between two columns interpolates the
//! percentile linearly.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{Sex, ToolError, ToolOptions, require_positive};
use crate::units::{length_to_cm, mass_to_kg};

/// Percentile of each reference column.
pub const PERCENTILES: [f64; 5] = [3.0, 15.0, 50.0, 85.0, 97.0];

/// Age in months of each reference row.
const AGES: [f64; 9] = [0.0, 1.0, 2.0, 3.0, 6.0, 9.0, 12.0, 18.0, 24.0];

const MAX_AGE_MONTHS: f64 = 24.0;
const MIN_PERCENTILE: f64 = 0.1;
const MAX_PERCENTILE: f64 = 99.9;

type Table = [[f64; 5]; 9];

const BOYS_WEIGHT: Table = [
    [2.5, 2.9, 3.3, 3.9, 4.3],
    [3.4, 3.9, 4.5, 5.1, 5.7],
    [4.4, 4.9, 5.6, 6.3, 7.0],
    [5.1, 5.6, 6.4, 7.2, 7.9],
    [6.4, 7.1, 7.9, 8.9, 9.7],
    [7.2, 7.9, 8.9, 9.9, 10.9],
    [7.8, 8.6, 9.6, 10.8, 11.8],
    [8.9, 9.7, 10.9, 12.2, 13.3],
    [9.8, 10.8, 12.2, 13.6, 14.8],
];

const GIRLS_WEIGHT: Table = [
    [2.4, 2.8, 3.2, 3.7, 4.2],
    [3.2, 3.6, 4.2, 4.8, 5.4],
    [4.0, 4.5, 5.1, 5.9, 6.5],
    [4.6, 5.1, 5.8, 6.7, 7.4],
    [5.8, 6.4, 7.3, 8.3, 9.2],
    [6.6, 7.3, 8.2, 9.3, 10.4],
    [7.1, 7.9, 8.9, 10.1, 11.3],
    [8.2, 9.1, 10.2, 11.6, 12.9],
    [9.2, 10.2, 11.5, 13.0, 14.4],
];

const BOYS_LENGTH: Table = [
    [46.3, 47.9, 49.9, 51.8, 53.4],
    [51.1, 52.7, 54.7, 56.7, 58.4],
    [54.7, 56.4, 58.4, 60.5, 62.2],
    [57.6, 59.3, 61.4, 63.5, 65.3],
    [63.6, 65.4, 67.6, 69.8, 71.6],
    [68.0, 70.0, 72.0, 74.2, 76.2],
    [71.7, 73.7, 75.7, 78.1, 80.2],
    [77.2, 79.6, 82.3, 85.0, 87.3],
    [82.1, 84.8, 87.8, 90.9, 93.6],
];

const GIRLS_LENGTH: Table = [
    [45.6, 47.2, 49.1, 51.1, 52.7],
    [50.0, 51.7, 53.7, 55.7, 57.4],
    [53.2, 55.0, 57.1, 59.2, 60.9],
    [55.8, 57.6, 59.8, 62.0, 63.8],
    [61.5, 63.4, 65.7, 68.1, 70.0],
    [66.1, 68.0, 70.1, 72.6, 74.7],
    [69.8, 71.8, 74.0, 76.6, 78.9],
    [76.0, 78.4, 80.7, 83.6, 86.2],
    [80.8, 83.4, 86.4, 89.4, 92.2],
];

const BOYS_HEAD: Table = [
    [32.1, 33.1, 34.5, 35.8, 36.9],
    [35.1, 36.1, 37.3, 38.5, 39.5],
    [36.9, 37.9, 39.1, 40.3, 41.3],
    [38.3, 39.3, 40.5, 41.7, 42.7],
    [41.0, 42.0, 43.3, 44.6, 45.6],
    [42.6, 43.6, 44.9, 46.2, 47.2],
    [43.6, 44.7, 46.1, 47.4, 48.4],
    [45.0, 46.1, 47.4, 48.8, 49.8],
    [45.9, 47.0, 48.3, 49.7, 50.7],
];

const GIRLS_HEAD: Table = [
    [31.7, 32.7, 33.9, 35.1, 36.1],
    [34.3, 35.3, 36.5, 37.8, 38.8],
    [36.0, 37.0, 38.3, 39.5, 40.5],
    [37.2, 38.2, 39.5, 40.8, 41.9],
    [39.9, 40.9, 42.2, 43.5, 44.6],
    [41.5, 42.5, 43.8, 45.2, 46.2],
    [42.6, 43.6, 44.9, 46.3, 47.3],
    [43.9, 45.0, 46.4, 47.8, 48.8],
    [44.9, 46.0, 47.4, 48.8, 49.8],
];

/// Measurement being compared against the reference population.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMetric {
    /// Weight-for-age, kilograms.
    Weight,
    /// Length/height-for-age, centimetres.
    Length,
    /// Head circumference-for-age, centimetres.
    HeadCircumference,
}

impl GrowthMetric {
    pub fn unit(self) -> &'static str {
        match self {
            GrowthMetric::Weight => "kg",
            GrowthMetric::Length | GrowthMetric::HeadCircumference => "cm",
        }
    }

    fn table(self, sex: Sex) -> &'static Table {
        match (self, sex) {
            (GrowthMetric::Weight, Sex::Male) => &BOYS_WEIGHT,
            (GrowthMetric::Weight, Sex::Female) => &GIRLS_WEIGHT,
            (GrowthMetric::Length, Sex::Male) => &BOYS_LENGTH,
            (GrowthMetric::Length, Sex::Female) => &GIRLS_LENGTH,
            (GrowthMetric::HeadCircumference, Sex::Male) => &BOYS_HEAD,
            (GrowthMetric::HeadCircumference, Sex::Female) => &GIRLS_HEAD,
        }
    }
}

/// Form input of the growth percentile page.
///
/// The age is taken from `age_months` when present, otherwise it is computed
/// from `birth_date` and `measured_on`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GrowthInput {
    pub sex: Sex,
    pub metric: GrowthMetric,
    /// Measured value in the unit system of the options.
    pub value: f64,
    pub age_months: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub measured_on: Option<NaiveDate>,
}

/// One reference column at the child's age.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReferencePoint {
    pub percentile: f64,
    pub value: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PercentileResult {
    pub metric: GrowthMetric,
    pub age_months: f64,
    /// Measurement in metric units.
    pub value: f64,
    pub unit: String,
    pub percentile: f64,
    pub category: String,
    /// 50th percentile value at this age.
    pub median: f64,
    pub reference: Vec<ReferencePoint>,
}

/// Whole months elapsed between `birth` and `measured`.
pub fn age_in_months(birth: NaiveDate, measured: NaiveDate) -> Result<u32, ToolError> {
    if measured < birth {
        return Err(ToolError::InvalidInput(
            "measurement date is before the birth date".into(),
        ));
    }
    let mut months = (measured.year() - birth.year()) * 12 + measured.month() as i32
        - birth.month() as i32;
    if measured.day() < birth.day() {
        months -= 1;
    }
    Ok(months.max(0) as u32)
}

/// Reference values at `age_months`, interpolating between table rows.
pub fn reference_row(
    sex: Sex,
    metric: GrowthMetric,
    age_months: f64,
) -> Result<[f64; 5], ToolError> {
    if !age_months.is_finite() || !(0.0..=MAX_AGE_MONTHS).contains(&age_months) {
        return Err(ToolError::OutOfRange {
            field: "age_months",
            min: 0.0,
            max: MAX_AGE_MONTHS,
        });
    }
    let table = metric.table(sex);

    let upper = AGES
        .iter()
        .position(|&a| a >= age_months)
        .unwrap_or(AGES.len() - 1);
    if upper == 0 || AGES[upper] == age_months {
        return Ok(table[upper]);
    }
    let lower = upper - 1;
    let t = (age_months - AGES[lower]) / (AGES[upper] - AGES[lower]);

    let mut row = [0.0; 5];
    for (i, cell) in row.iter_mut().enumerate() {
        *cell = table[lower][i] + t * (table[upper][i] - table[lower][i]);
    }
    Ok(row)
}

/// Percentile of `value` within one reference row.
///
/// A value on a breakpoint returns that breakpoint's percentile. Outside the
/// 3rd-97th band the nearest segment's slope is extended and the result is
/// clamped to [0.1, 99.9].
pub fn interpolate_percentile(row: &[f64; 5], value: f64) -> f64 {
    let last = row.len() - 1;

    let percentile = if value < row[0] {
        let slope = (PERCENTILES[1] - PERCENTILES[0]) / (row[1] - row[0]);
        PERCENTILES[0] - (row[0] - value) * slope
    } else if value > row[last] {
        let slope = (PERCENTILES[last] - PERCENTILES[last - 1]) / (row[last] - row[last - 1]);
        PERCENTILES[last] + (value - row[last]) * slope
    } else {
        let mut p = PERCENTILES[last];
        for i in 0..last {
            if value >= row[i] && value <= row[i + 1] {
                let t = (value - row[i]) / (row[i + 1] - row[i]);
                p = PERCENTILES[i] + t * (PERCENTILES[i + 1] - PERCENTILES[i]);
                break;
            }
        }
        p
    };

    percentile.clamp(MIN_PERCENTILE, MAX_PERCENTILE)
}

/// Label shown next to a percentile.
pub fn categorize(percentile: f64) -> &'static str {
    if percentile < 3.0 {
        "Below Normal Range"
    } else if percentile > 97.0 {
        "Above Normal Range"
    } else {
        "Normal Range"
    }
}

pub fn calculate_growth_percentile(
    input: &GrowthInput,
    options: &ToolOptions,
) -> Result<PercentileResult, ToolError> {
    let age_months = match (input.age_months, input.birth_date, input.measured_on) {
        (Some(age), _, _) => age,
        (None, Some(birth), Some(measured)) => age_in_months(birth, measured)? as f64,
        _ => {
            return Err(ToolError::InvalidInput(
                "either age_months or both birth_date and measured_on are required".into(),
            ));
        }
    };

    let raw = require_positive("value", input.value)?;
    let value = match input.metric {
        GrowthMetric::Weight => mass_to_kg(raw, options.units()),
        GrowthMetric::Length | GrowthMetric::HeadCircumference => {
            length_to_cm(raw, options.units())
        }
    };

    let row = reference_row(input.sex, input.metric, age_months)?;
    let percentile = interpolate_percentile(&row, value);
    debug!(
        "growth percentile {:?} age={} value={} -> {}",
        input.metric, age_months, value, percentile
    );

    Ok(PercentileResult {
        metric: input.metric,
        age_months,
        value: options.round(value),
        unit: input.metric.unit().into(),
        percentile: options.round(percentile),
        category: categorize(percentile).into(),
        median: options.round(row[2]),
        reference: PERCENTILES
            .iter()
            .zip(row.iter())
            .map(|(&percentile, &value)| ReferencePoint {
                percentile,
                value: options.round(value),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(metric: GrowthMetric, value: f64, age: f64) -> GrowthInput {
        GrowthInput {
            sex: Sex::Male,
            metric,
            value,
            age_months: Some(age),
            birth_date: None,
            measured_on: None,
        }
    }

    #[test]
    fn breakpoint_value_returns_breakpoint_percentile() {
        let row = reference_row(Sex::Male, GrowthMetric::Weight, 12.0).unwrap();
        assert_eq!(row, BOYS_WEIGHT[6]);
        for (i, &p) in PERCENTILES.iter().enumerate() {
            assert_eq!(interpolate_percentile(&row, row[i]), p);
        }
    }

    #[test]
    fn value_between_breakpoints_is_linear() {
        // 12-month boys: P50 = 9.6, P85 = 10.8; 10.2 is halfway.
        let row = BOYS_WEIGHT[6];
        let p = interpolate_percentile(&row, 10.2);
        assert!((p - 67.5).abs() < 1e-9);
    }

    #[test]
    fn ages_between_rows_interpolate_columns() {
        let row = reference_row(Sex::Female, GrowthMetric::Length, 4.5).unwrap();
        // halfway between the 3 and 6 month medians (59.8, 65.7)
        assert!((row[2] - 62.75).abs() < 1e-9);
    }

    #[test]
    fn extremes_are_clamped() {
        let row = BOYS_LENGTH[0];
        assert_eq!(interpolate_percentile(&row, 10.0), MIN_PERCENTILE);
        assert_eq!(interpolate_percentile(&row, 90.0), MAX_PERCENTILE);
    }

    #[test]
    fn values_past_the_band_extend_the_edge_slope() {
        // 12-month boys: P3..P15 spans 7.8..8.6, P85..P97 spans 10.8..11.8
        let row = BOYS_WEIGHT[6];
        assert!((interpolate_percentile(&row, 7.7) - 1.5).abs() < 1e-9);
        assert!((interpolate_percentile(&row, 12.0) - 99.4).abs() < 1e-9);
    }

    #[test]
    fn age_outside_table_is_rejected() {
        let err = calculate_growth_percentile(
            &input(GrowthMetric::Weight, 10.0, 30.0),
            &ToolOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::OutOfRange { .. }));
    }

    #[test]
    fn categories_follow_fixed_cutoffs() {
        assert_eq!(categorize(2.0), "Below Normal Range");
        assert_eq!(categorize(3.0), "Normal Range");
        assert_eq!(categorize(97.0), "Normal Range");
        assert_eq!(categorize(98.5), "Above Normal Range");
    }

    #[test]
    fn age_in_months_counts_whole_months() {
        let birth = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let measured = NaiveDate::from_ymd_opt(2025, 7, 30).unwrap();
        assert_eq!(age_in_months(birth, measured).unwrap(), 5);
        let measured = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        assert_eq!(age_in_months(birth, measured).unwrap(), 6);
        assert!(age_in_months(measured, birth).is_err());
    }

    #[test]
    fn result_uses_dates_when_age_missing() {
        let mut inp = input(GrowthMetric::HeadCircumference, 46.1, 0.0);
        inp.age_months = None;
        inp.birth_date = NaiveDate::from_ymd_opt(2024, 3, 10);
        inp.measured_on = NaiveDate::from_ymd_opt(2025, 3, 10);
        let res = calculate_growth_percentile(&inp, &ToolOptions::default()).unwrap();
        assert_eq!(res.age_months, 12.0);
        assert_eq!(res.percentile, 50.0);
        assert_eq!(res.category, "Normal Range");
        assert_eq!(res.reference.len(), 5);
    }

    #[test]
    fn non_positive_measurement_yields_no_result() {
        let res = calculate_growth_percentile(
            &input(GrowthMetric::Weight, 0.0, 6.0),
            &ToolOptions::default(),
        );
        assert!(matches!(res, Err(ToolError::InvalidInput(_))));
    }
}

//! Unit conversions applied to imperial form input before any formula runs.

use crate::schema::UnitSystem;

const KG_PER_LB: f64 = 0.453_592_37;
const CM_PER_IN: f64 = 2.54;

pub fn lb_to_kg(lb: f64) -> f64 {
    lb * KG_PER_LB
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg / KG_PER_LB
}

pub fn in_to_cm(inches: f64) -> f64 {
    inches * CM_PER_IN
}

pub fn cm_to_in(cm: f64) -> f64 {
    cm / CM_PER_IN
}

/// Converts a height given as feet plus inches to centimetres.
pub fn ft_in_to_cm(feet: f64, inches: f64) -> f64 {
    in_to_cm(feet * 12.0 + inches)
}

/// Normalises a mass entered in `units` to kilograms.
pub fn mass_to_kg(value: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => lb_to_kg(value),
    }
}

/// Normalises a length entered in `units` to centimetres.
pub fn length_to_cm(value: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => in_to_cm(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imperial_values_normalise_to_metric() {
        assert!((mass_to_kg(154.0, UnitSystem::Imperial) - 69.853).abs() < 0.001);
        assert_eq!(length_to_cm(10.0, UnitSystem::Imperial), 25.4);
        assert_eq!(length_to_cm(175.0, UnitSystem::Metric), 175.0);
    }

    #[test]
    fn feet_and_inches_combine() {
        assert!((ft_in_to_cm(5.0, 9.0) - 175.26).abs() < 1e-9);
        assert!((kg_to_lb(lb_to_kg(200.0)) - 200.0).abs() < 1e-9);
        assert!((cm_to_in(in_to_cm(7.5)) - 7.5).abs() < 1e-9);
    }
}

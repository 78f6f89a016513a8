//! The fixed 100-point rubric as pure band tables.
//!
//! Every band is closed on its upper bound. Keep these tables free of any
//! requirement lookup so they can be tested in isolation.

use super::Classification;
use crate::catalog::{Availability, EfficiencyClass, IpRating};

pub const POWER_MAX: u32 = 20;
pub const VOLTAGE_MAX: u32 = 15;
pub const EFFICIENCY_MAX: u32 = 15;
pub const PROTECTION_MAX: u32 = 10;
pub const ROTATION_MAX: u32 = 10;
pub const INVERTER_MAX: u32 = 10;
pub const LEAD_TIME_MAX: u32 = 10;
pub const AVAILABILITY_MAX: u32 = 5;
pub const WARRANTY_MAX: u32 = 5;

/// The one code that earns partial protection credit when it falls short.
pub const PARTIAL_IP: IpRating = IpRating::new(5, 4);
pub const PROTECTION_PARTIAL: u32 = 5;

/// Lowest rotation band; rotation is never eliminatory.
pub const ROTATION_FLOOR: u32 = 2;

/// Relative power deviation → points. Beyond 10 % is eliminatory (0).
pub fn power_points(dev: f64) -> u32 {
    if dev == 0.0 {
        20
    } else if dev <= 0.05 {
        15
    } else if dev <= 0.10 {
        10
    } else {
        0
    }
}

pub fn efficiency_points(class: EfficiencyClass) -> u32 {
    match class {
        EfficiencyClass::IE4 | EfficiencyClass::IE3 => 15,
        EfficiencyClass::IE2 => 10,
        EfficiencyClass::IE1 => 5,
    }
}

/// Full credit when both digits cover the requirement, IP54 exactly → partial.
pub fn protection_points(offered: IpRating, required: IpRating) -> u32 {
    if offered.covers(&required) {
        PROTECTION_MAX
    } else if offered == PARTIAL_IP {
        PROTECTION_PARTIAL
    } else {
        0
    }
}

/// Relative rotation deviation → points.
pub fn rotation_points(dev: f64) -> u32 {
    if dev <= 0.01 {
        10
    } else if dev <= 0.02 {
        8
    } else if dev <= 0.03 {
        5
    } else {
        ROTATION_FLOOR
    }
}

pub fn inverter_points(item_ready: bool) -> u32 {
    if item_ready {
        10
    } else {
        5
    }
}

pub fn lead_time_points(days: u32) -> u32 {
    match days {
        0..=15 => 10,
        16..=30 => 8,
        31..=45 => 5,
        46..=60 => 3,
        _ => 1,
    }
}

pub fn availability_points(a: Availability) -> u32 {
    match a {
        Availability::InStock => 5,
        Availability::Domestic => 4,
        Availability::Import => 2,
    }
}

pub fn warranty_points(months: u32) -> u32 {
    match months {
        24.. => 5,
        18..=23 => 4,
        12..=17 => 3,
        _ => 1,
    }
}

/// Lower bounds inclusive: 90 / 75 / 60.
pub fn classify(total: u32) -> Classification {
    match total {
        90.. => Classification::Recommended,
        75..=89 => Classification::Alternative,
        60..=74 => Classification::Conditional,
        _ => Classification::NotRecommended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maxima_sum_to_one_hundred() {
        let sum = POWER_MAX
            + VOLTAGE_MAX
            + EFFICIENCY_MAX
            + PROTECTION_MAX
            + ROTATION_MAX
            + INVERTER_MAX
            + LEAD_TIME_MAX
            + AVAILABILITY_MAX
            + WARRANTY_MAX;
        assert_eq!(sum, 100);
    }

    #[test]
    fn lead_time_is_flat_within_bands_and_drops_across() {
        let bands: [(u32, u32); 5] = [(0, 15), (16, 30), (31, 45), (46, 60), (61, 400)];
        let mut prev: Option<u32> = None;
        for (lo, hi) in bands {
            let p = lead_time_points(lo);
            for d in lo..=hi {
                assert_eq!(lead_time_points(d), p, "day {d} left its band");
            }
            if let Some(prev) = prev {
                assert!(p < prev, "band starting at {lo} should score below {prev}");
            }
            prev = Some(p);
        }
    }

    #[test]
    fn warranty_bands() {
        assert_eq!(warranty_points(36), 5);
        assert_eq!(warranty_points(24), 5);
        assert_eq!(warranty_points(23), 4);
        assert_eq!(warranty_points(18), 4);
        assert_eq!(warranty_points(17), 3);
        assert_eq!(warranty_points(12), 3);
        assert_eq!(warranty_points(11), 1);
    }

    #[test]
    fn power_and_rotation_bands() {
        assert_eq!(power_points(0.0), 20);
        assert_eq!(power_points(0.04), 15);
        assert_eq!(power_points(0.08), 10);
        assert_eq!(power_points(0.2), 0);
        assert_eq!(rotation_points(0.005), 10);
        assert_eq!(rotation_points(30.0 / 1750.0), 8);
        assert_eq!(rotation_points(0.025), 5);
        assert_eq!(rotation_points(0.5), ROTATION_FLOOR);
    }

    #[test]
    fn protection_partial_band_is_absolute() {
        let ip = IpRating::new;
        assert_eq!(protection_points(ip(5, 5), ip(5, 5)), 10);
        assert_eq!(protection_points(ip(5, 4), ip(5, 5)), 5);
        assert_eq!(protection_points(ip(5, 4), ip(6, 5)), 5);
        assert_eq!(protection_points(ip(5, 5), ip(5, 6)), 0);
        assert_eq!(protection_points(ip(6, 4), ip(6, 5)), 0);
        assert_eq!(protection_points(ip(4, 4), ip(5, 5)), 0);
    }

    #[test]
    fn classification_boundaries_are_exact() {
        assert_eq!(classify(100), Classification::Recommended);
        assert_eq!(classify(90), Classification::Recommended);
        assert_eq!(classify(89), Classification::Alternative);
        assert_eq!(classify(75), Classification::Alternative);
        assert_eq!(classify(74), Classification::Conditional);
        assert_eq!(classify(60), Classification::Conditional);
        assert_eq!(classify(59), Classification::NotRecommended);
        assert_eq!(classify(0), Classification::NotRecommended);
    }
}

use chrono::NaiveDate;

pub const ROTATION_DAYS: i64 = 15;

#[derive(Debug, PartialEq)]
pub struct FractalDay {
    pub tier4: [&'static str; 3],
    pub recommended: [u8; 3],
}

/// Day 0 of the rotation. Dailies reset at 00:00 UTC.
fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

const ROTATION: [FractalDay; ROTATION_DAYS as usize] = [
    FractalDay {
        tier4: ["Nightmare", "Snowblind", "Volcanic"],
        recommended: [2, 37, 53],
    },
    FractalDay {
        tier4: ["Aetherblade", "Underground Facility", "Thaumanova Reactor"],
        recommended: [6, 28, 61],
    },
    FractalDay {
        tier4: ["Cliffside", "Twilight Oasis", "Chaos Isles"],
        recommended: [10, 32, 65],
    },
    FractalDay {
        tier4: ["Captain Mai Trin Boss", "Deepstone", "Solid Ocean"],
        recommended: [14, 34, 74],
    },
    FractalDay {
        tier4: ["Nightmare", "Snowblind", "Swampland"],
        recommended: [19, 37, 66],
    },
    FractalDay {
        tier4: ["Aetherblade", "Sunqua Peak", "Uncategorized"],
        recommended: [15, 41, 60],
    },
    FractalDay {
        tier4: ["Cliffside", "Molten Boss", "Urban Battleground"],
        recommended: [24, 35, 75],
    },
    FractalDay {
        tier4: ["Lonely Tower", "Siren's Reef", "Silent Surf"],
        recommended: [25, 36, 69],
    },
    FractalDay {
        tier4: ["Kinfall", "Molten Furnace", "Shattered Observatory"],
        recommended: [12, 40, 67],
    },
    FractalDay {
        tier4: ["Aquatic Ruins", "Sunqua Peak", "Nightmare"],
        recommended: [8, 31, 54],
    },
    FractalDay {
        tier4: ["Deepstone", "Snowblind", "Thaumanova Reactor"],
        recommended: [11, 39, 59],
    },
    FractalDay {
        tier4: ["Shattered Observatory", "Twilight Oasis", "Volcanic"],
        recommended: [18, 27, 64],
    },
    FractalDay {
        tier4: ["Chaos Isles", "Siren's Reef", "Underground Facility"],
        recommended: [4, 30, 58],
    },
    FractalDay {
        tier4: ["Lonely Tower", "Solid Ocean", "Urban Battleground"],
        recommended: [16, 42, 62],
    },
    FractalDay {
        tier4: ["Kinfall", "Silent Surf", "Swampland"],
        recommended: [5, 17, 99],
    },
];

pub fn rotation_index(date: NaiveDate) -> usize {
    (date - anchor()).num_days().rem_euclid(ROTATION_DAYS) as usize
}

pub fn for_date(date: NaiveDate) -> &'static FractalDay {
    &ROTATION[rotation_index(date)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_anchor_is_day_zero() {
        assert_eq!(rotation_index(anchor()), 0);
        assert_eq!(for_date(anchor()).tier4[0], "Nightmare");
    }

    #[test]
    fn test_rotation_wraps() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let later = day + Duration::days(ROTATION_DAYS);
        assert_eq!(rotation_index(day), rotation_index(later));
        assert_eq!(for_date(day), for_date(later));
    }

    #[test]
    fn test_consecutive_days_advance() {
        let day = anchor() + Duration::days(3);
        assert_eq!(rotation_index(day), 3);
        assert_eq!(rotation_index(day + Duration::days(1)), 4);
        assert_eq!(rotation_index(anchor() + Duration::days(14)), 14);
        assert_eq!(rotation_index(anchor() + Duration::days(15)), 0);
    }

    #[test]
    fn test_dates_before_anchor() {
        let before = anchor() - Duration::days(1);
        assert_eq!(rotation_index(before), 14);
    }
}

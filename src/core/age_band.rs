/// Discovery age window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeWindow {
    pub min: u8,
    pub max: u8,
}

impl AgeWindow {
    #[inline]
    pub fn contains(&self, age: u8) -> bool {
        age >= self.min && age <= self.max
    }
}

/// Adult floor applied to every computed window.
pub const MIN_ADULT_AGE: u8 = 18;

/// Compute the discovery age window for a user.
///
/// An explicit preference pair wins outright (min still floored to 18).
/// Otherwise the window widens with age: younger users get a fixed [18, 28]
/// band, older users a progressively larger tolerance around their own age.
pub fn discovery_window(
    own_age: u8,
    explicit_min: Option<u8>,
    explicit_max: Option<u8>,
) -> AgeWindow {
    if let (Some(min), Some(max)) = (explicit_min, explicit_max) {
        return AgeWindow {
            min: min.max(MIN_ADULT_AGE),
            max,
        };
    }

    let (min, max) = match own_age {
        18..=25 => (18, 28),
        26..=35 => (own_age - 5, own_age.saturating_add(5)),
        36..=45 => (own_age - 7, own_age.saturating_add(7)),
        46..=55 => (own_age - 8, own_age.saturating_add(8)),
        _ => (own_age.saturating_sub(10), own_age.saturating_add(10)),
    };

    AgeWindow {
        min: min.max(MIN_ADULT_AGE),
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn young_users_get_fixed_band() {
        assert_eq!(discovery_window(20, None, None), AgeWindow { min: 18, max: 28 });
        assert_eq!(discovery_window(18, None, None), AgeWindow { min: 18, max: 28 });
        assert_eq!(discovery_window(25, None, None), AgeWindow { min: 18, max: 28 });
    }

    #[test]
    fn bands_widen_with_age() {
        assert_eq!(discovery_window(30, None, None), AgeWindow { min: 25, max: 35 });
        assert_eq!(discovery_window(40, None, None), AgeWindow { min: 33, max: 47 });
        assert_eq!(discovery_window(50, None, None), AgeWindow { min: 42, max: 58 });
        assert_eq!(discovery_window(60, None, None), AgeWindow { min: 50, max: 70 });
    }

    #[test]
    fn lower_bound_never_below_eighteen() {
        // 26 - 5 = 21, fine; 26-year-old explicit prefs can still try to go
        // lower and get floored.
        let window = discovery_window(26, Some(16), Some(30));
        assert_eq!(window.min, 18);
        assert_eq!(window.max, 30);
    }

    #[test]
    fn explicit_preference_wins() {
        let window = discovery_window(30, Some(27), Some(33));
        assert_eq!(window, AgeWindow { min: 27, max: 33 });
    }

    #[test]
    fn partial_preference_falls_back_to_bands() {
        // Only one bound supplied: the adaptive band applies.
        assert_eq!(discovery_window(30, Some(27), None), AgeWindow { min: 25, max: 35 });
        assert_eq!(discovery_window(30, None, Some(33)), AgeWindow { min: 25, max: 35 });
    }

    #[test]
    fn window_contains_is_inclusive() {
        let window = AgeWindow { min: 25, max: 35 };
        assert!(window.contains(25));
        assert!(window.contains(35));
        assert!(!window.contains(24));
        assert!(!window.contains(36));
    }
}

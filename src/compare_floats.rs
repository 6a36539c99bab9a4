pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Whether two values differ by no more than an absolute tolerance (inclusive).
pub(crate) fn within_tolerance(value: f64, target: f64, abs_tol: f64) -> bool {
    is_close!(value, target, abs_tol = abs_tol)
}

/// A sum that can safely be used as a divisor.
pub(crate) fn is_usable_divisor(sum: f64) -> bool {
    sum != 0. && sum.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    pub fn should_calc_4_as_max_of_2_and_4_ints() {
        assert_eq!(max_of_2(2, 4), 4);
    }

    #[rstest]
    pub fn should_calc_0_as_max_of_negative_and_0_floats() {
        assert_eq!(max_of_2(-12.5, 0.), 0.);
    }

    #[rstest]
    #[case(1.0, true)]
    #[case(1.005, true)]
    #[case(0.995, true)]
    #[case(1.02, false)]
    #[case(0.9, false)]
    fn should_compare_within_tolerance(#[case] value: f64, #[case] expected: bool) {
        assert_eq!(within_tolerance(value, 1.0, 0.01), expected);
    }

    #[rstest]
    #[case(0., false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    #[case(-3.5, true)]
    fn should_identify_usable_divisors(#[case] sum: f64, #[case] expected: bool) {
        assert_eq!(is_usable_divisor(sum), expected);
    }
}

//! Property-based checks for the algebraic laws T-/S-norms must satisfy for
//! any scalar in `[0, 1]`, and for the `μ(x) ∈ [0, 1] ∪ {NaN}` invariant that
//! every membership term must uphold regardless of its parameters.

use fuzzylogic_core::norm::{SNorm, TNorm};
use fuzzylogic_core::term::{Term, TermKind};
use proptest::prelude::*;

const TNORMS: [TNorm; 7] = [
    TNorm::Minimum,
    TNorm::AlgebraicProduct,
    TNorm::BoundedDifference,
    TNorm::DrasticProduct,
    TNorm::EinsteinProduct,
    TNorm::HamacherProduct,
    TNorm::NilpotentMinimum,
];

const SNORMS: [SNorm; 9] = [
    SNorm::Maximum,
    SNorm::AlgebraicSum,
    SNorm::BoundedSum,
    SNorm::DrasticSum,
    SNorm::EinsteinSum,
    SNorm::HamacherSum,
    SNorm::NilpotentMaximum,
    SNorm::NormalizedSum,
    SNorm::UnboundedSum,
];

fn unit() -> impl Strategy<Value = f64> {
    0.0..=1.0f64
}

proptest! {
    #[test]
    fn tnorm_is_commutative_over_the_unit_interval(a in unit(), b in unit()) {
        for norm in TNORMS {
            let ab = norm.apply(a, b);
            let ba = norm.apply(b, a);
            prop_assert!((ab - ba).abs() < 1e-9, "{:?} not commutative at ({a}, {b})", norm);
        }
    }

    #[test]
    fn tnorm_identity_law_holds_for_any_a(a in unit()) {
        for norm in TNORMS {
            let result = norm.apply(a, 1.0);
            prop_assert!((result - a).abs() < 1e-9, "{:?} failed T(a,1)=a at a={a}", norm);
        }
    }

    #[test]
    fn tnorm_result_stays_within_the_unit_interval(a in unit(), b in unit()) {
        for norm in TNORMS {
            let result = norm.apply(a, b);
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&result), "{:?}({a}, {b}) = {result} out of range", norm);
        }
    }

    #[test]
    fn tnorm_is_monotonic_in_its_first_argument(a in unit(), b in unit(), delta in 0.0..=1.0f64) {
        let raised = (a + delta).min(1.0);
        for norm in TNORMS {
            let lo = norm.apply(a, b);
            let hi = norm.apply(raised, b);
            prop_assert!(lo <= hi + 1e-9, "{:?} not monotonic: T({a},{b})={lo} > T({raised},{b})={hi}", norm);
        }
    }

    #[test]
    fn snorm_is_commutative_over_the_unit_interval(a in unit(), b in unit()) {
        for norm in SNORMS {
            let ab = norm.apply(a, b);
            let ba = norm.apply(b, a);
            prop_assert!((ab - ba).abs() < 1e-9, "{:?} not commutative at ({a}, {b})", norm);
        }
    }

    #[test]
    fn snorm_identity_law_holds_for_any_a(a in unit()) {
        for norm in SNORMS {
            let result = norm.apply(a, 0.0);
            prop_assert!((result - a).abs() < 1e-9, "{:?} failed S(a,0)=a at a={a}", norm);
        }
    }

    #[test]
    fn snorm_result_stays_within_the_unit_interval(a in unit(), b in unit()) {
        for norm in SNORMS {
            let result = norm.apply(a, b);
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&result), "{:?}({a}, {b}) = {result} out of range", norm);
        }
    }

    #[test]
    fn snorm_is_monotonic_in_its_first_argument(a in unit(), b in unit(), delta in 0.0..=1.0f64) {
        let raised = (a + delta).min(1.0);
        for norm in SNORMS {
            let lo = norm.apply(a, b);
            let hi = norm.apply(raised, b);
            prop_assert!(lo <= hi + 1e-9, "{:?} not monotonic: S({a},{b})={lo} > S({raised},{b})={hi}", norm);
        }
    }

    #[test]
    fn triangle_membership_is_always_in_unit_range_or_nan(
        a in -10.0..10.0f64,
        width1 in 0.01..10.0f64,
        width2 in 0.01..10.0f64,
        x in -20.0..20.0f64,
    ) {
        let b = a + width1;
        let c = b + width2;
        let term = Term::new("t", TermKind::Triangle { a, b, c });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "triangle({a},{b},{c}) at x={x} gave {mu}");
    }

    #[test]
    fn gaussian_membership_is_always_in_unit_range_or_nan(
        mean in -10.0..10.0f64,
        sigma in 0.01..10.0f64,
        x in -50.0..50.0f64,
    ) {
        let term = Term::new("t", TermKind::Gaussian { mean, sigma });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "gaussian({mean},{sigma}) at x={x} gave {mu}");
    }

    #[test]
    fn sigmoid_membership_is_always_in_unit_range_or_nan(
        inflection in -10.0..10.0f64,
        slope in -20.0..20.0f64,
        x in -50.0..50.0f64,
    ) {
        let term = Term::new("t", TermKind::Sigmoid { inflection, slope });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "sigmoid({inflection},{slope}) at x={x} gave {mu}");
    }

    #[test]
    fn rectangle_membership_is_always_in_unit_range_or_nan(
        a in -10.0..10.0f64,
        width in 0.01..10.0f64,
        x in -20.0..20.0f64,
    ) {
        let b = a + width;
        let term = Term::new("t", TermKind::Rectangle { a, b });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "rectangle({a},{b}) at x={x} gave {mu}");
    }

    #[test]
    fn gaussian_product_membership_is_always_in_unit_range_or_nan(
        mean1 in -10.0..10.0f64,
        sigma1 in 0.01..10.0f64,
        width in 0.0..10.0f64,
        sigma2 in 0.01..10.0f64,
        x in -50.0..50.0f64,
    ) {
        let mean2 = mean1 + width;
        let term = Term::new("t", TermKind::GaussianProduct { mean1, sigma1, mean2, sigma2 });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "gaussianProduct({mean1},{sigma1},{mean2},{sigma2}) at x={x} gave {mu}");
    }

    #[test]
    fn concave_membership_is_always_in_unit_range_or_nan(
        inflection in -10.0..10.0f64,
        width in 0.01..10.0f64,
        x in -20.0..20.0f64,
    ) {
        let end = inflection + width;
        let term = Term::new("t", TermKind::Concave { inflection, end });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "concave({inflection},{end}) at x={x} gave {mu}");
    }

    #[test]
    fn s_shape_membership_is_always_in_unit_range_or_nan(
        start in -10.0..10.0f64,
        width in 0.01..10.0f64,
        x in -20.0..20.0f64,
    ) {
        let end = start + width;
        let term = Term::new("t", TermKind::SShape { start, end });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "sShape({start},{end}) at x={x} gave {mu}");
    }

    #[test]
    fn z_shape_membership_is_always_in_unit_range_or_nan(
        start in -10.0..10.0f64,
        width in 0.01..10.0f64,
        x in -20.0..20.0f64,
    ) {
        let end = start + width;
        let term = Term::new("t", TermKind::ZShape { start, end });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "zShape({start},{end}) at x={x} gave {mu}");
    }

    #[test]
    fn pi_shape_membership_is_always_in_unit_range_or_nan(
        a in -10.0..10.0f64,
        w1 in 0.01..5.0f64,
        w2 in 0.01..5.0f64,
        w3 in 0.01..5.0f64,
        x in -20.0..20.0f64,
    ) {
        let b = a + w1;
        let c = b + w2;
        let d = c + w3;
        let term = Term::new("t", TermKind::PiShape { a, b, c, d });
        let mu = term.membership_of(x);
        prop_assert!(mu.is_nan() || (0.0..=1.0).contains(&mu), "piShape({a},{b},{c},{d}) at x={x} gave {mu}");
    }

    #[test]
    fn nan_x_propagates_for_rectangle_gaussian_product_concave_and_the_shape_family(
        a in -10.0..10.0f64,
        width in 0.01..10.0f64,
    ) {
        let b = a + width;
        prop_assert!(Term::new("t", TermKind::Rectangle { a, b }).membership_of(f64::NAN).is_nan());
        prop_assert!(Term::new("t", TermKind::GaussianProduct { mean1: a, sigma1: width, mean2: b, sigma2: width })
            .membership_of(f64::NAN)
            .is_nan());
        prop_assert!(Term::new("t", TermKind::Concave { inflection: a, end: b }).membership_of(f64::NAN).is_nan());
        prop_assert!(Term::new("t", TermKind::SShape { start: a, end: b }).membership_of(f64::NAN).is_nan());
        prop_assert!(Term::new("t", TermKind::ZShape { start: a, end: b }).membership_of(f64::NAN).is_nan());
        prop_assert!(Term::new("t", TermKind::PiShape { a, b, c: b, d: b + width }).membership_of(f64::NAN).is_nan());
    }
}

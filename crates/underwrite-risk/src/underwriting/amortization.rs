/// Annual debt service on a fixed-rate, fully amortizing loan.
///
/// `annual_rate_pct` is a percentage (7.5 means 7.5%). A zero term yields 0,
/// which callers read as "coverage undefined". Negative inputs are not
/// validated.
pub fn annual_debt_service(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return 0.0;
    }

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let payments = f64::from(term_months);

    let monthly_payment = if monthly_rate == 0.0 {
        principal / payments
    } else {
        let growth = (1.0 + monthly_rate).powf(payments);
        principal * (monthly_rate * growth) / (growth - 1.0)
    };

    monthly_payment * 12.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn zero_term_has_no_debt_service() {
        assert_eq!(annual_debt_service(5_000_000.0, 7.5, 0), 0.0);
    }

    #[test]
    fn zero_rate_is_straight_line() {
        assert_close(annual_debt_service(1_200_000.0, 0.0, 120), 120_000.0, 1e-6);
    }

    #[test]
    fn thirty_year_mortgage_matches_reference_payment() {
        // 1,000,000 at 6% over 360 months pays 5,995.51 a month.
        let annual = annual_debt_service(1_000_000.0, 6.0, 360);
        assert_close(annual / 12.0, 5_995.51, 0.01);
    }

    #[test]
    fn short_term_payment_covers_principal_and_interest() {
        let annual = annual_debt_service(5_000_000.0, 7.5, 36);
        // Three years of payments must exceed the principal but not by more
        // than simple interest on the full balance.
        let total = annual * 3.0;
        assert!(total > 5_000_000.0);
        assert!(total < 5_000_000.0 * (1.0 + 0.075 * 3.0));
        assert_close(annual / 12.0, 155_531.0, 5.0);
    }
}

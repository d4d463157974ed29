//! Taiwan payroll and income tax parameters (2025 schedule).

// ---------------------------------------------------------------------------
// Insurance and pension
// ---------------------------------------------------------------------------

/// Labor insurance premium rate, employment insurance included.
pub const LABOR_INSURANCE_RATE: f64 = 0.12;
pub const HEALTH_INSURANCE_RATE: f64 = 0.0517;
/// Employee share of the labor insurance premium.
pub const LABOR_SHARE: f64 = 0.2;
/// Employee share of the health insurance premium.
pub const HEALTH_SHARE: f64 = 0.3;
/// Minimum employer pension contribution.
pub const PENSION_EMPLOYER_RATE: f64 = 0.06;
/// Monthly wage cap for pension contributions.
pub const PENSION_WAGE_CAP: f64 = 150_000.0;
/// Dependents beyond this count add nothing to the health premium.
pub const MAX_HEALTH_DEPENDENTS: u32 = 3;

pub const MINIMUM_WAGE: f64 = 28_590.0;

/// Labor insurance insured-salary grades; tops out at 45,800.
pub const LABOR_INSURANCE_GRADES: &[f64] = &[
    28_590.0, 29_000.0, 30_300.0, 31_800.0, 33_300.0, 34_800.0, 36_300.0, 38_200.0, 40_100.0,
    42_000.0, 43_900.0, 45_800.0,
];

/// Health insurance insured-amount grades; tops out at 219,500.
pub const HEALTH_INSURANCE_GRADES: &[f64] = &[
    28_590.0, 29_000.0, 30_300.0, 31_800.0, 33_300.0, 34_800.0, 36_300.0, 38_200.0, 40_100.0,
    42_000.0, 43_900.0, 45_800.0, 48_200.0, 50_600.0, 53_000.0, 55_400.0, 57_800.0, 60_800.0,
    63_800.0, 66_800.0, 69_800.0, 72_800.0, 76_500.0, 80_200.0, 83_900.0, 87_600.0, 92_100.0,
    96_600.0, 101_100.0, 105_600.0, 110_100.0, 115_500.0, 120_900.0, 126_300.0, 131_700.0,
    137_100.0, 142_500.0, 147_900.0, 150_000.0, 156_400.0, 162_800.0, 169_200.0, 175_600.0,
    182_000.0, 189_500.0, 197_000.0, 204_500.0, 212_000.0, 219_500.0,
];

/// The first grade at or above `salary`, or the top grade when it exceeds them all.
pub fn insured_amount(salary: f64, grades: &[f64]) -> f64 {
    grades
        .iter()
        .copied()
        .find(|&g| g >= salary)
        .or_else(|| grades.last().copied())
        .unwrap_or(salary)
}

// ---------------------------------------------------------------------------
// Income tax
// ---------------------------------------------------------------------------

pub const EXEMPTION: f64 = 97_000.0;
pub const STANDARD_DEDUCTION_SINGLE: f64 = 131_000.0;
pub const STANDARD_DEDUCTION_MARRIED: f64 = 262_000.0;
pub const SALARY_SPECIAL_DEDUCTION: f64 = 218_000.0;
pub const BASIC_LIVING_EXPENSE: f64 = 202_000.0;

/// Progressive bracket: `tax = taxable * rate - quick_deduction` when
/// `taxable <= limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub limit: f64,
    pub rate: f64,
    pub quick_deduction: f64,
}

pub const INCOME_TAX_BRACKETS: &[TaxBracket] = &[
    TaxBracket {
        limit: 590_000.0,
        rate: 0.05,
        quick_deduction: 0.0,
    },
    TaxBracket {
        limit: 1_330_000.0,
        rate: 0.12,
        quick_deduction: 41_300.0,
    },
    TaxBracket {
        limit: 2_660_000.0,
        rate: 0.20,
        quick_deduction: 147_700.0,
    },
    TaxBracket {
        limit: 4_980_000.0,
        rate: 0.30,
        quick_deduction: 413_700.0,
    },
    TaxBracket {
        limit: f64::INFINITY,
        rate: 0.40,
        quick_deduction: 911_700.0,
    },
];

/// Bracket that applies to `taxable` income.
pub fn bracket_for(taxable: f64) -> TaxBracket {
    INCOME_TAX_BRACKETS
        .iter()
        .copied()
        .find(|b| taxable <= b.limit)
        .unwrap_or(INCOME_TAX_BRACKETS[INCOME_TAX_BRACKETS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insured_amount_rounds_up_to_grade() {
        assert_eq!(insured_amount(30_000.0, LABOR_INSURANCE_GRADES), 30_300.0);
        assert_eq!(insured_amount(28_590.0, LABOR_INSURANCE_GRADES), 28_590.0);
        assert_eq!(insured_amount(80_000.0, LABOR_INSURANCE_GRADES), 45_800.0);
        assert_eq!(insured_amount(1.0, HEALTH_INSURANCE_GRADES), 28_590.0);
    }

    #[test]
    fn test_brackets_are_continuous() {
        for pair in INCOME_TAX_BRACKETS.windows(2) {
            let at_limit = pair[0].limit * pair[0].rate - pair[0].quick_deduction;
            let next = pair[0].limit * pair[1].rate - pair[1].quick_deduction;
            assert!((at_limit - next).abs() < 1.0, "gap at {}", pair[0].limit);
        }
        assert_eq!(bracket_for(0.0).rate, 0.05);
        assert_eq!(bracket_for(10_000_000.0).rate, 0.40);
    }
}

//! Income tax skills: `tax.calculate` and `tax.optimize`.

use abacus_core::skill::SkillDescriptor;
use abacus_types::schema::SchemaNode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rates::{
    BASIC_LIVING_EXPENSE, EXEMPTION, PENSION_EMPLOYER_RATE, PENSION_WAGE_CAP,
    SALARY_SPECIAL_DEDUCTION, STANDARD_DEDUCTION_MARRIED, STANDARD_DEDUCTION_SINGLE, bracket_for,
};
use crate::util::{decode, encode, round_half_up};

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Filing options. Defaults describe a single filer claiming one exemption
/// with the standard deduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxOptions {
    pub exemption_count: f64,
    pub household_size: f64,
    pub is_married: bool,
    pub use_standard_deduction: bool,
}

impl Default for TaxOptions {
    fn default() -> Self {
        Self {
            exemption_count: 1.0,
            household_size: 1.0,
            is_married: false,
            use_standard_deduction: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    pub exemption: f64,
    pub standard_deduction: f64,
    pub salary_special: f64,
    pub basic_living: f64,
    pub total_deductions: f64,
}

pub fn deductions(annual_income: f64, opts: &TaxOptions) -> Deductions {
    let exemption = opts.exemption_count * EXEMPTION;
    let standard_deduction = match (opts.use_standard_deduction, opts.is_married) {
        (false, _) => 0.0,
        (true, true) => STANDARD_DEDUCTION_MARRIED,
        (true, false) => STANDARD_DEDUCTION_SINGLE,
    };
    let salary_special = annual_income.min(SALARY_SPECIAL_DEDUCTION);

    // Basic living expense difference: only the part not already covered by
    // exemptions and the standard deduction.
    let basic_living =
        (opts.household_size * BASIC_LIVING_EXPENSE - (exemption + standard_deduction)).max(0.0);

    Deductions {
        exemption,
        standard_deduction,
        salary_special,
        basic_living,
        total_deductions: exemption + standard_deduction + salary_special + basic_living,
    }
}

pub fn taxable_income(annual_income: f64, opts: &TaxOptions) -> f64 {
    (annual_income - deductions(annual_income, opts).total_deductions).max(0.0)
}

/// Annual income tax, rounded to whole dollars.
pub fn income_tax(annual_income: f64, opts: &TaxOptions) -> f64 {
    let taxable = taxable_income(annual_income, opts);
    let bracket = bracket_for(taxable);
    round_half_up(taxable * bracket.rate - bracket.quick_deduction)
}

// ---------------------------------------------------------------------------
// tax.calculate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateInput {
    pub annual_income: f64,
    pub exemption_count: f64,
    pub household_size: f64,
    pub is_married: bool,
    pub use_standard_deduction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculation {
    pub annual_income: f64,
    pub tax_amount: f64,
    pub effective_tax_rate: f64,
    pub tax_bracket: String,
    pub deduction_details: Deductions,
    pub taxable_income: f64,
}

pub fn calculate(input: &CalculateInput) -> TaxCalculation {
    let opts = TaxOptions {
        exemption_count: input.exemption_count,
        household_size: input.household_size,
        is_married: input.is_married,
        use_standard_deduction: input.use_standard_deduction,
    };
    let details = deductions(input.annual_income, &opts);
    let taxable = (input.annual_income - details.total_deductions).max(0.0);
    let tax_amount = income_tax(input.annual_income, &opts);

    TaxCalculation {
        annual_income: input.annual_income,
        tax_amount,
        effective_tax_rate: if input.annual_income > 0.0 {
            tax_amount / input.annual_income * 100.0
        } else {
            0.0
        },
        tax_bracket: format!("{:.0}%", bracket_for(taxable).rate * 100.0),
        deduction_details: details,
        taxable_income: taxable,
    }
}

// ---------------------------------------------------------------------------
// tax.optimize
// ---------------------------------------------------------------------------

/// Maximum voluntary pension contribution, in percent of wage.
const MAX_SELF_CONTRIBUTION: f64 = 6.0;
const HIGH_INCOME_THRESHOLD: f64 = 2_520_000.0;
const MARRIAGE_HINT_THRESHOLD: f64 = 1_000_000.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeInput {
    pub annual_income: f64,
    pub current_self_contribution: f64,
    pub is_married: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxOptimization {
    pub current_tax: f64,
    pub optimized_tax: f64,
    pub savings_amount: f64,
    pub recommendations: Vec<String>,
}

pub fn optimize(input: &OptimizeInput) -> TaxOptimization {
    let opts = TaxOptions {
        is_married: input.is_married,
        ..TaxOptions::default()
    };
    let current_tax = income_tax(input.annual_income, &opts);

    let monthly = input.annual_income / 12.0;
    let max_contribution = monthly.min(PENSION_WAGE_CAP) * PENSION_EMPLOYER_RATE * 12.0;
    let optimized_tax = income_tax(input.annual_income - max_contribution, &opts);
    let savings = current_tax - optimized_tax;

    let mut recommendations = Vec::new();
    if input.current_self_contribution < MAX_SELF_CONTRIBUTION && savings > 0.0 {
        recommendations.push(format!(
            "Raise the voluntary pension contribution to 6% to save about {} per year",
            round_half_up(savings)
        ));
    }
    if input.annual_income > HIGH_INCOME_THRESHOLD {
        recommendations.push(
            "Income reaches the upper brackets; professional tax planning is worth considering"
                .to_string(),
        );
    }
    if !input.is_married && input.annual_income > MARRIAGE_HINT_THRESHOLD {
        recommendations.push(
            "Married filers receive a higher standard deduction (262,000 vs 131,000)".to_string(),
        );
    }
    if recommendations.is_empty() {
        recommendations.push("Current tax setup is already well optimized".to_string());
    }

    TaxOptimization {
        current_tax,
        optimized_tax,
        savings_amount: savings,
        recommendations,
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

pub fn skills() -> Vec<SkillDescriptor> {
    vec![
        SkillDescriptor::builder("tax.calculate", "Income Tax Calculator")
            .description(
                "Annual income tax with exemptions, deductions, and the basic living expense difference",
            )
            .tags(["tax", "low-risk", "beginner"])
            .input(SchemaNode::object([
                ("annualIncome", SchemaNode::number().min(0.0).describe("Annual income")),
                (
                    "exemptionCount",
                    SchemaNode::integer().min(1.0).with_default(1).describe("Exemptions claimed"),
                ),
                (
                    "householdSize",
                    SchemaNode::integer().min(1.0).with_default(1).describe("Household size"),
                ),
                ("isMarried", SchemaNode::boolean().with_default(false).describe("Married")),
                (
                    "useStandardDeduction",
                    SchemaNode::boolean().with_default(true).describe("Use standard deduction"),
                ),
            ]))
            .output(SchemaNode::object([
                ("annualIncome", SchemaNode::number()),
                ("taxAmount", SchemaNode::number()),
                ("effectiveTaxRate", SchemaNode::number()),
                ("taxBracket", SchemaNode::string()),
                (
                    "deductionDetails",
                    SchemaNode::object([
                        ("exemption", SchemaNode::number()),
                        ("standardDeduction", SchemaNode::number()),
                        ("salarySpecial", SchemaNode::number()),
                        ("basicLiving", SchemaNode::number()),
                        ("totalDeductions", SchemaNode::number()),
                    ]),
                ),
                ("taxableIncome", SchemaNode::number()),
            ]))
            .param("annualIncome", "Total annual income (TWD)")
            .param("exemptionCount", "Number of exemptions that can be claimed")
            .param("householdSize", "People in the filing household, for the basic living expense")
            .param("isMarried", "Married filers get the larger standard deduction")
            .param("useStandardDeduction", "Use the standard deduction instead of itemizing")
            .handle(run_calculate),
        SkillDescriptor::builder("tax.optimize", "Tax Optimization Advice")
            .description("Estimates savings from voluntary pension contributions and filing choices")
            .tags(["tax", "advanced"])
            .input(SchemaNode::object([
                ("annualIncome", SchemaNode::number().min(0.0).describe("Annual income")),
                (
                    "currentSelfContribution",
                    SchemaNode::number()
                        .min(0.0)
                        .max(MAX_SELF_CONTRIBUTION)
                        .with_default(0)
                        .describe("Current voluntary pension contribution (%)"),
                ),
                ("isMarried", SchemaNode::boolean().with_default(false).describe("Married")),
            ]))
            .param("annualIncome", "Total annual income (TWD)")
            .param("currentSelfContribution", "Current voluntary pension contribution, 0-6%")
            .param("isMarried", "Marital status")
            .handle(run_optimize),
    ]
}

fn run_calculate(input: Value) -> anyhow::Result<Value> {
    let input: CalculateInput = decode("tax.calculate", input)?;
    encode(&calculate(&input))
}

fn run_optimize(input: Value) -> anyhow::Result<Value> {
    let input: OptimizeInput = decode("tax.optimize", input)?;
    encode(&optimize(&input))
}

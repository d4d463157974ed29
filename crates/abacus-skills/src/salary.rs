//! Payroll skills: `salary.analyze`, `salary.reverse`, and `salary.structure`.

use abacus_core::skill::SkillDescriptor;
use abacus_types::schema::SchemaNode;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rates::{
    HEALTH_INSURANCE_GRADES, HEALTH_INSURANCE_RATE, HEALTH_SHARE, LABOR_INSURANCE_GRADES,
    LABOR_INSURANCE_RATE, LABOR_SHARE, MAX_HEALTH_DEPENDENTS, MINIMUM_WAGE,
    PENSION_EMPLOYER_RATE, PENSION_WAGE_CAP, insured_amount,
};
use crate::tax::{TaxOptions, income_tax};
use crate::util::{decode, encode, round_half_up};

const FULL_SELF_CONTRIBUTION: f64 = 6.0;

// ---------------------------------------------------------------------------
// Monthly deductions
// ---------------------------------------------------------------------------

/// Employee share of the labor insurance premium.
pub fn labor_insurance(monthly_salary: f64) -> f64 {
    let insured = insured_amount(monthly_salary, LABOR_INSURANCE_GRADES);
    round_half_up(insured * LABOR_INSURANCE_RATE * LABOR_SHARE)
}

/// Employee share of the health insurance premium, covering up to three
/// dependents.
pub fn health_insurance(monthly_salary: f64, dependents: f64) -> f64 {
    let insured = insured_amount(monthly_salary, HEALTH_INSURANCE_GRADES);
    let covered = dependents.clamp(0.0, f64::from(MAX_HEALTH_DEPENDENTS));
    round_half_up(insured * HEALTH_INSURANCE_RATE * HEALTH_SHARE * (1.0 + covered))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pension {
    pub employer: f64,
    pub employee: f64,
}

/// Pension contributions on the capped wage. `self_rate` is a percentage.
pub fn pension(monthly_salary: f64, self_rate: f64) -> Pension {
    let grades: Vec<f64> = HEALTH_INSURANCE_GRADES
        .iter()
        .copied()
        .filter(|&g| g <= PENSION_WAGE_CAP)
        .collect();
    let insured = insured_amount(monthly_salary.min(PENSION_WAGE_CAP), &grades);
    Pension {
        employer: round_half_up(insured * PENSION_EMPLOYER_RATE),
        employee: round_half_up(insured * self_rate / 100.0),
    }
}

pub fn take_home(monthly_salary: f64, dependents: f64, self_rate: f64) -> f64 {
    monthly_salary
        - labor_insurance(monthly_salary)
        - health_insurance(monthly_salary, dependents)
        - pension(monthly_salary, self_rate).employee
}

// ---------------------------------------------------------------------------
// salary.analyze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeInput {
    pub monthly_salary: f64,
    pub bonus_months: f64,
    pub dependents: f64,
    pub self_contribution_rate: f64,
    pub is_married: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub gross: f64,
    pub insurance: f64,
    pub labor_insurance: f64,
    pub health_insurance: f64,
    pub pension: f64,
    pub pension_employer: f64,
    pub take_home: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualBreakdown {
    pub gross: f64,
    pub insurance: f64,
    pub pension: f64,
    pub tax: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub self_contribution_savings: f64,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryAnalysis {
    pub monthly: MonthlyBreakdown,
    pub annual: AnnualBreakdown,
    pub chart_data: Vec<ChartSlice>,
    pub effective_tax_rate: f64,
    pub insights: Insights,
}

pub fn analyze(input: &AnalyzeInput) -> SalaryAnalysis {
    let monthly = input.monthly_salary;
    let annual_gross = monthly * (12.0 + input.bonus_months);

    let labor = labor_insurance(monthly);
    let health = health_insurance(monthly, input.dependents);
    let insurance = labor + health;
    let pension_now = pension(monthly, input.self_contribution_rate);

    let tax_opts = TaxOptions {
        is_married: input.is_married,
        ..TaxOptions::default()
    };
    let annual_tax = income_tax(annual_gross, &tax_opts);
    let annual_insurance = insurance * 12.0;
    let annual_pension = pension_now.employee * 12.0;
    let annual_net = annual_gross - annual_insurance - annual_pension - annual_tax;

    // Voluntary contributions are deducted from taxable income, so a filer
    // not contributing yet can lower their tax by starting at 6%.
    let self_contribution_savings = if input.self_contribution_rate == 0.0 {
        let full = pension(monthly, FULL_SELF_CONTRIBUTION).employee * 12.0;
        (annual_tax - income_tax(annual_gross - full, &tax_opts)).max(0.0)
    } else {
        0.0
    };
    let recommendation = (self_contribution_savings > 0.0).then(|| {
        format!(
            "A 6% voluntary pension contribution would cut income tax by about {self_contribution_savings} per year"
        )
    });

    SalaryAnalysis {
        monthly: MonthlyBreakdown {
            gross: monthly,
            insurance,
            labor_insurance: labor,
            health_insurance: health,
            pension: pension_now.employee,
            pension_employer: pension_now.employer,
            take_home: monthly - insurance - pension_now.employee,
        },
        annual: AnnualBreakdown {
            gross: annual_gross,
            insurance: annual_insurance,
            pension: annual_pension,
            tax: annual_tax,
            net: annual_net,
        },
        chart_data: vec![
            slice("Take-home", annual_net, "#10b981"),
            slice("Income tax", annual_tax, "#ef4444"),
            slice("Insurance", annual_insurance, "#f59e0b"),
            slice("Pension", annual_pension, "#6366f1"),
        ],
        effective_tax_rate: if annual_gross > 0.0 {
            annual_tax / annual_gross * 100.0
        } else {
            0.0
        },
        insights: Insights {
            self_contribution_savings,
            recommendation,
        },
    }
}

fn slice(name: &str, value: f64, color: &'static str) -> ChartSlice {
    ChartSlice {
        name: name.to_string(),
        value,
        color,
    }
}

// ---------------------------------------------------------------------------
// salary.reverse
// ---------------------------------------------------------------------------

const REVERSE_SEARCH_FLOOR: f64 = 300_000.0;

/// Largest take-home target accepted; keeps the search inside the range
/// where whole-dollar steps are exact in `f64`.
pub const MAX_TARGET_NET_SALARY: f64 = 10_000_000.0;

/// Bisection over a range this size needs far fewer steps than this.
const REVERSE_MAX_STEPS: u32 = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseInput {
    pub target_net_salary: f64,
    pub dependents: f64,
    pub self_contribution_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseResult {
    pub gross_salary: f64,
    pub target_net_salary: f64,
    /// Gross minus target: what insurance and pension withhold each month.
    pub difference: f64,
}

/// Smallest whole-dollar gross salary whose take-home pay reaches the target.
pub fn reverse(input: &ReverseInput) -> anyhow::Result<ReverseResult> {
    let target = input.target_net_salary;
    if !target.is_finite() || !(0.0..=MAX_TARGET_NET_SALARY).contains(&target) {
        bail!("target take-home pay must be between 0 and {MAX_TARGET_NET_SALARY}, got {target}");
    }
    let net_of = |gross: f64| take_home(gross, input.dependents, input.self_contribution_rate);

    let mut low = target.floor();
    let mut high = (target * 1.5).max(REVERSE_SEARCH_FLOOR).ceil();
    let mut best = high;

    for _ in 0..REVERSE_MAX_STEPS {
        if low > high {
            break;
        }
        let mid = ((low + high) / 2.0).floor();
        let net = net_of(mid);
        if net == target {
            best = mid;
            break;
        }
        if net < target {
            low = mid + 1.0;
        } else {
            best = mid;
            high = mid - 1.0;
        }
    }

    Ok(ReverseResult {
        gross_salary: best,
        target_net_salary: target,
        difference: best - target,
    })
}

// ---------------------------------------------------------------------------
// salary.structure
// ---------------------------------------------------------------------------

const HIGH_EARNER_SALARY: f64 = 100_000.0;
const NEAR_GRADE_GAP: f64 = 1_000.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInput {
    pub monthly_salary: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryTier {
    MinimumWage,
    Standard,
    HighEarner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStructure {
    pub tier: SalaryTier,
    pub labor_insured_amount: f64,
    pub health_insured_amount: f64,
    pub suggestions: Vec<String>,
}

/// Insured-salary grades for a monthly salary, with hints when the salary
/// sits at the minimum wage, in high-earner territory, or just under the
/// next labor insurance grade.
pub fn structure(input: &StructureInput) -> SalaryStructure {
    let salary = input.monthly_salary;
    let labor_insured = insured_amount(salary, LABOR_INSURANCE_GRADES);
    let health_insured = insured_amount(salary, HEALTH_INSURANCE_GRADES);

    let mut suggestions = Vec::new();
    let tier = if salary <= MINIMUM_WAGE {
        suggestions.push("Salary is at the minimum wage; review career growth options".to_string());
        SalaryTier::MinimumWage
    } else if salary >= HIGH_EARNER_SALARY {
        suggestions.push(
            "Consider a 6% voluntary pension contribution to lower income tax and grow retirement savings"
                .to_string(),
        );
        SalaryTier::HighEarner
    } else {
        SalaryTier::Standard
    };

    let next_grade = LABOR_INSURANCE_GRADES
        .iter()
        .position(|&g| g == labor_insured)
        .and_then(|i| LABOR_INSURANCE_GRADES.get(i + 1));
    if let Some(&next) = next_grade {
        let gap = next - salary;
        if gap > 0.0 && gap <= NEAR_GRADE_GAP {
            suggestions.push(format!(
                "Only {gap} below the next labor insurance grade; worth raising in a salary negotiation"
            ));
        }
    }

    SalaryStructure {
        tier,
        labor_insured_amount: labor_insured,
        health_insured_amount: health_insured,
        suggestions,
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

pub fn skills() -> Vec<SkillDescriptor> {
    vec![
        SkillDescriptor::builder("salary.analyze", "Salary Breakdown")
            .description("Take-home pay after labor and health insurance, pension, and income tax")
            .tags(["salary", "tax", "beginner"])
            .input(SchemaNode::object([
                ("monthlySalary", SchemaNode::number().min(0.0).describe("Monthly salary")),
                (
                    "bonusMonths",
                    SchemaNode::number()
                        .min(0.0)
                        .max(12.0)
                        .with_default(0)
                        .describe("Bonus months"),
                ),
                (
                    "dependents",
                    SchemaNode::integer()
                        .min(0.0)
                        .max(10.0)
                        .with_default(0)
                        .describe("Dependents"),
                ),
                (
                    "selfContributionRate",
                    SchemaNode::number()
                        .min(0.0)
                        .max(FULL_SELF_CONTRIBUTION)
                        .with_default(0)
                        .describe("Voluntary pension contribution (%)"),
                ),
                ("isMarried", SchemaNode::boolean().with_default(false).describe("Married")),
            ]))
            .param("monthlySalary", "Gross monthly salary (TWD)")
            .param("bonusMonths", "Annual bonus expressed in months of salary")
            .param("dependents", "Dependents covered by health insurance")
            .param("selfContributionRate", "Voluntary pension contribution, 0-6%")
            .param("isMarried", "Marital status, used for the income tax estimate")
            .handle(run_analyze),
        SkillDescriptor::builder("salary.reverse", "Gross Salary Finder")
            .description("Finds the gross monthly salary needed for a target take-home pay")
            .tags(["salary", "advanced"])
            .input(SchemaNode::object([
                (
                    "targetNetSalary",
                    SchemaNode::number()
                        .min(0.0)
                        .max(MAX_TARGET_NET_SALARY)
                        .describe("Target take-home pay"),
                ),
                (
                    "dependents",
                    SchemaNode::integer()
                        .min(0.0)
                        .max(10.0)
                        .with_default(0)
                        .describe("Dependents"),
                ),
                (
                    "selfContributionRate",
                    SchemaNode::number()
                        .min(0.0)
                        .max(FULL_SELF_CONTRIBUTION)
                        .with_default(0)
                        .describe("Voluntary pension contribution (%)"),
                ),
            ]))
            .param("targetNetSalary", "Desired monthly take-home pay (TWD)")
            .handle(run_reverse),
        SkillDescriptor::builder("salary.structure", "Insurance Grade Check")
            .description("Labor and health insurance grades for a salary, with negotiation hints")
            .tags(["salary", "insurance", "beginner"])
            .input(SchemaNode::object([(
                "monthlySalary",
                SchemaNode::number().min(0.0).describe("Monthly salary"),
            )]))
            .param("monthlySalary", "Gross monthly salary (TWD)")
            .handle(run_structure),
    ]
}

fn run_analyze(input: Value) -> anyhow::Result<Value> {
    let input: AnalyzeInput = decode("salary.analyze", input)?;
    encode(&analyze(&input))
}

fn run_reverse(input: Value) -> anyhow::Result<Value> {
    let input: ReverseInput = decode("salary.reverse", input)?;
    encode(&reverse(&input)?)
}

fn run_structure(input: Value) -> anyhow::Result<Value> {
    let input: StructureInput = decode("salary.structure", input)?;
    encode(&structure(&input))
}

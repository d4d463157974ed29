//! Capital planning skills.
//!
//! `capital.growth` projects a savings plan in nominal and
//! inflation-adjusted terms. The rest answer planning questions against the
//! same monthly-compounding model: when financial independence arrives
//! (`capital.fire`), what monthly amount reaches a goal
//! (`capital.goalReverse`), how much capital a passive income needs
//! (`capital.passiveIncome`), and when round-number balances are crossed
//! (`capital.milestones`).

use abacus_core::skill::SkillDescriptor;
use abacus_types::schema::SchemaNode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::{decode, encode, round_half_up};

/// Annual withdrawal rate used for the passive income estimate.
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthInput {
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub annual_return_rate: f64,
    pub inflation_rate: f64,
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    pub principal: f64,
    pub interest: f64,
    pub total_assets: f64,
    pub real_assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub year: u32,
    pub total_assets: f64,
    pub real_assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSummary {
    pub total_contribution: f64,
    pub total_interest: f64,
    pub total_assets: f64,
    pub real_assets: f64,
    pub monthly_passive_income: f64,
    pub real_monthly_passive_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthProjection {
    pub final_year: YearSnapshot,
    pub summary: GrowthSummary,
    pub yearly_data: Vec<YearPoint>,
}

/// Year-end snapshots from year 0 (the initial capital) through `years`.
///
/// Returns compound monthly at `annual_rate / 12`; contributions land at the
/// end of each month.
pub fn project(input: &GrowthInput) -> Vec<YearSnapshot> {
    let monthly_rate = input.annual_return_rate / 100.0 / 12.0;
    let inflation = input.inflation_rate / 100.0;
    let years = input.years.max(0.0) as u32;

    let mut assets = input.initial_capital;
    let mut principal = input.initial_capital;
    let mut snapshots = Vec::with_capacity(years as usize + 1);

    for year in 0..=years {
        if year > 0 {
            for _ in 0..12 {
                assets = assets * (1.0 + monthly_rate) + input.monthly_contribution;
                principal += input.monthly_contribution;
            }
        }
        let deflator = (1.0 + inflation).powi(year as i32);
        snapshots.push(YearSnapshot {
            year,
            principal: round_half_up(principal),
            interest: round_half_up(assets - principal),
            total_assets: round_half_up(assets),
            real_assets: round_half_up(assets / deflator),
        });
    }
    snapshots
}

pub fn growth(input: &GrowthInput) -> GrowthProjection {
    let snapshots = project(input);
    let final_year = snapshots.last().cloned().unwrap_or(YearSnapshot {
        year: 0,
        principal: input.initial_capital,
        interest: 0.0,
        total_assets: input.initial_capital,
        real_assets: input.initial_capital,
    });

    let monthly_income = |assets: f64| round_half_up(assets * SAFE_WITHDRAWAL_RATE / 12.0);

    GrowthProjection {
        summary: GrowthSummary {
            total_contribution: final_year.principal,
            total_interest: final_year.interest,
            total_assets: final_year.total_assets,
            real_assets: final_year.real_assets,
            monthly_passive_income: monthly_income(final_year.total_assets),
            real_monthly_passive_income: monthly_income(final_year.real_assets),
        },
        yearly_data: snapshots
            .iter()
            .map(|s| YearPoint {
                year: s.year,
                total_assets: s.total_assets,
                real_assets: s.real_assets,
            })
            .collect(),
        final_year,
    }
}

// ---------------------------------------------------------------------------
// capital.fire
// ---------------------------------------------------------------------------

/// Horizon used for the "monthly investment needed" estimate.
const FIRE_TARGET_YEARS: u32 = 20;
/// The year-by-year search for the FIRE date gives up after this many years.
const FIRE_MAX_YEARS: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireInput {
    pub monthly_expense: f64,
    pub current_savings: f64,
    pub monthly_investment: f64,
    pub expected_return: f64,
    pub safe_withdrawal_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirePlan {
    pub fire_number: f64,
    pub monthly_expense: f64,
    pub annual_expense: f64,
    pub safe_withdrawal_rate: f64,
    /// `None` when savings never grow (no monthly investment) and the
    /// target is not already met.
    pub years_to_fire: Option<u32>,
    pub monthly_investment_needed: f64,
    pub current_progress: f64,
}

/// Level monthly payment that grows `gap` to zero over `months`.
fn sinking_fund_payment(gap: f64, monthly_rate: f64, months: f64) -> f64 {
    if monthly_rate == 0.0 {
        return gap / months;
    }
    gap * monthly_rate / ((1.0 + monthly_rate).powf(months) - 1.0)
}

pub fn fire(input: &FireInput) -> FirePlan {
    let annual_expense = input.monthly_expense * 12.0;
    let fire_number = annual_expense * (100.0 / input.safe_withdrawal_rate);
    let monthly_rate = input.expected_return / 100.0 / 12.0;

    let current_progress = if fire_number > 0.0 {
        (input.current_savings / fire_number * 100.0).min(100.0)
    } else {
        100.0
    };

    let years_to_fire = if input.monthly_investment > 0.0 {
        let mut balance = input.current_savings;
        let mut years = 0;
        while balance < fire_number && years < FIRE_MAX_YEARS {
            for _ in 0..12 {
                balance = balance * (1.0 + monthly_rate) + input.monthly_investment;
            }
            years += 1;
        }
        Some(years)
    } else if input.current_savings >= fire_number {
        Some(0)
    } else {
        None
    };

    let months = f64::from(FIRE_TARGET_YEARS * 12);
    let gap = fire_number - input.current_savings * (1.0 + monthly_rate).powf(months);
    let monthly_investment_needed = if gap > 0.0 {
        round_half_up(sinking_fund_payment(gap, monthly_rate, months)).max(0.0)
    } else {
        0.0
    };

    FirePlan {
        fire_number: round_half_up(fire_number),
        monthly_expense: input.monthly_expense,
        annual_expense,
        safe_withdrawal_rate: input.safe_withdrawal_rate,
        years_to_fire,
        monthly_investment_needed,
        current_progress,
    }
}

// ---------------------------------------------------------------------------
// capital.goalReverse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub target_amount: f64,
    pub years: f64,
    pub expected_return: f64,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    pub target_amount: f64,
    pub years: f64,
    pub monthly_investment: f64,
    pub total_contribution: f64,
    pub total_interest: f64,
    /// Target over total contribution, as a percentage gain.
    pub effective_return: f64,
}

/// Monthly investment that grows `initial_capital` into `target_amount`.
pub fn goal_reverse(input: &GoalInput) -> GoalPlan {
    let monthly_rate = input.expected_return / 100.0 / 12.0;
    let months = input.years * 12.0;

    let gap = input.target_amount - input.initial_capital * (1.0 + monthly_rate).powf(months);
    let monthly_investment = if gap > 0.0 && monthly_rate > 0.0 {
        round_half_up(sinking_fund_payment(gap, monthly_rate, months))
    } else if gap > 0.0 {
        round_half_up(gap / months)
    } else {
        0.0
    };

    let total_contribution = monthly_investment * months + input.initial_capital;
    let effective_return = if total_contribution > 0.0 {
        (input.target_amount / total_contribution - 1.0) * 100.0
    } else {
        0.0
    };

    GoalPlan {
        target_amount: input.target_amount,
        years: input.years,
        monthly_investment: monthly_investment.max(0.0),
        total_contribution,
        total_interest: (input.target_amount - total_contribution).max(0.0),
        effective_return,
    }
}

// ---------------------------------------------------------------------------
// capital.passiveIncome
// ---------------------------------------------------------------------------

/// Yields (%) shown side by side with the requested one.
const YIELD_SCENARIOS: [f64; 5] = [3.0, 4.0, 5.0, 6.0, 7.0];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveIncomeInput {
    pub target_monthly_income: f64,
    pub yield_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldScenario {
    pub yield_rate: f64,
    pub required_capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveIncomePlan {
    pub target_monthly_income: f64,
    pub target_annual_income: f64,
    pub required_capital: f64,
    pub yield_rate: f64,
    pub scenarios: Vec<YieldScenario>,
}

pub fn passive_income(input: &PassiveIncomeInput) -> PassiveIncomePlan {
    let annual = input.target_monthly_income * 12.0;
    let capital_at = |yield_rate: f64| round_half_up(annual / (yield_rate / 100.0));

    PassiveIncomePlan {
        target_monthly_income: input.target_monthly_income,
        target_annual_income: annual,
        required_capital: capital_at(input.yield_rate),
        yield_rate: input.yield_rate,
        scenarios: YIELD_SCENARIOS
            .iter()
            .map(|&yield_rate| YieldScenario {
                yield_rate,
                required_capital: capital_at(yield_rate),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// capital.milestones
// ---------------------------------------------------------------------------

const MILESTONES: [(f64, &str); 6] = [
    (1_000_000.0, "First 1M"),
    (5_000_000.0, "5M"),
    (10_000_000.0, "10M"),
    (30_000_000.0, "30M"),
    (50_000_000.0, "50M"),
    (100_000_000.0, "100M"),
];

/// Milestones not reached within this many months are left out.
const MILESTONE_HORIZON_MONTHS: u32 = 600;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonesInput {
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub annual_return_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub milestone: f64,
    pub label: &'static str,
    pub year: u32,
    pub months_to_reach: u32,
}

/// Balances crossed within fifty years, in ascending order. Milestones the
/// initial capital already covers are reported at month 0.
pub fn milestones(input: &MilestonesInput) -> Vec<Milestone> {
    let monthly_rate = input.annual_return_rate / 100.0 / 12.0;
    let mut pending = MILESTONES.iter().peekable();
    let mut reached = Vec::new();
    let mut balance = input.initial_capital;
    let mut month: u32 = 0;

    loop {
        while let Some(&&(amount, label)) = pending.peek() {
            if balance < amount {
                break;
            }
            reached.push(Milestone {
                milestone: amount,
                label,
                year: month.div_ceil(12),
                months_to_reach: month,
            });
            pending.next();
        }
        if pending.peek().is_none() || month >= MILESTONE_HORIZON_MONTHS {
            break;
        }
        balance = balance * (1.0 + monthly_rate) + input.monthly_contribution;
        month += 1;
    }
    reached
}

pub fn skills() -> Vec<SkillDescriptor> {
    vec![
        SkillDescriptor::builder("capital.growth", "Capital Growth Projection")
            .description("Compound growth with monthly contributions and inflation-adjusted value")
            .tags(["investment", "retirement", "beginner"])
            .input(SchemaNode::object([
                (
                    "initialCapital",
                    SchemaNode::number().min(0.0).describe("Initial capital"),
                ),
                (
                    "monthlyContribution",
                    SchemaNode::number().min(0.0).describe("Monthly contribution"),
                ),
                (
                    "annualReturnRate",
                    SchemaNode::number()
                        .min(-50.0)
                        .max(100.0)
                        .with_default(7)
                        .describe("Annual return (%)"),
                ),
                (
                    "inflationRate",
                    SchemaNode::number()
                        .min(0.0)
                        .max(20.0)
                        .with_default(2.5)
                        .describe("Inflation (%)"),
                ),
                (
                    "years",
                    SchemaNode::integer()
                        .min(1.0)
                        .max(100.0)
                        .with_default(30)
                        .describe("Years"),
                ),
            ]))
            .param("initialCapital", "Amount invested at the start (TWD)")
            .param("monthlyContribution", "Amount added every month (TWD)")
            .param("annualReturnRate", "Expected annual return in percent")
            .param("inflationRate", "Expected annual inflation in percent")
            .param("years", "Investment horizon in years")
            .handle(run_growth),
        SkillDescriptor::builder("capital.fire", "FIRE Planner")
            .description("Financial independence target, years to reach it, and the monthly investment needed")
            .tags(["retirement", "fire", "passive-income"])
            .input(SchemaNode::object([
                (
                    "monthlyExpense",
                    SchemaNode::number().min(0.0).describe("Monthly expenses"),
                ),
                (
                    "currentSavings",
                    SchemaNode::number().min(0.0).with_default(0).describe("Current savings"),
                ),
                (
                    "monthlyInvestment",
                    SchemaNode::number().min(0.0).with_default(0).describe("Monthly investment"),
                ),
                (
                    "expectedReturn",
                    SchemaNode::number()
                        .min(-50.0)
                        .max(100.0)
                        .with_default(7)
                        .describe("Expected return (%)"),
                ),
                (
                    "safeWithdrawalRate",
                    SchemaNode::number()
                        .min(0.1)
                        .max(20.0)
                        .with_default(4)
                        .describe("Safe withdrawal rate (%)"),
                ),
            ]))
            .param("monthlyExpense", "Monthly living expenses (TWD)")
            .param("currentSavings", "Savings and investments accumulated so far (TWD)")
            .param("monthlyInvestment", "Amount invested every month (TWD)")
            .param("expectedReturn", "Expected annual return in percent")
            .param("safeWithdrawalRate", "Share of the portfolio withdrawn per year, classically 4%")
            .output(SchemaNode::object([
                ("fireNumber", SchemaNode::number()),
                ("annualExpense", SchemaNode::number()),
                ("yearsToFire", SchemaNode::integer().nullable()),
                ("monthlyInvestmentNeeded", SchemaNode::number()),
                ("currentProgress", SchemaNode::number()),
            ]))
            .handle(run_fire),
        SkillDescriptor::builder("capital.goalReverse", "Savings Goal Planner")
            .description("Monthly investment needed to reach a target amount within a number of years")
            .tags(["investment", "goal", "advanced"])
            .input(SchemaNode::object([
                (
                    "targetAmount",
                    SchemaNode::number().min(0.0).describe("Target amount"),
                ),
                (
                    "years",
                    SchemaNode::integer().min(1.0).max(100.0).describe("Years"),
                ),
                (
                    "expectedReturn",
                    SchemaNode::number()
                        .min(-50.0)
                        .max(100.0)
                        .with_default(7)
                        .describe("Expected return (%)"),
                ),
                (
                    "initialCapital",
                    SchemaNode::number().min(0.0).with_default(0).describe("Current assets"),
                ),
            ]))
            .param("targetAmount", "Amount to accumulate (TWD)")
            .param("years", "Years until the goal")
            .param("initialCapital", "Assets already set aside for the goal (TWD)")
            .handle(run_goal_reverse),
        SkillDescriptor::builder("capital.passiveIncome", "Passive Income Capital")
            .description("Capital needed to fund a monthly passive income at a given yield")
            .tags(["passive-income", "dividend", "beginner"])
            .input(SchemaNode::object([
                (
                    "targetMonthlyIncome",
                    SchemaNode::number().min(0.0).describe("Target monthly income"),
                ),
                (
                    "yieldRate",
                    SchemaNode::number()
                        .min(0.1)
                        .max(20.0)
                        .with_default(5)
                        .describe("Yield (%)"),
                ),
            ]))
            .param("targetMonthlyIncome", "Desired monthly passive income (TWD)")
            .param("yieldRate", "Expected dividend or rental yield in percent")
            .handle(run_passive_income),
        SkillDescriptor::builder("capital.milestones", "Wealth Milestones")
            .description("When a savings plan crosses 1M, 5M, 10M, 30M, 50M, and 100M")
            .tags(["investment", "goal", "beginner"])
            .input(SchemaNode::object([
                (
                    "initialCapital",
                    SchemaNode::number().min(0.0).describe("Current assets"),
                ),
                (
                    "monthlyContribution",
                    SchemaNode::number().min(0.0).describe("Monthly contribution"),
                ),
                (
                    "annualReturnRate",
                    SchemaNode::number()
                        .min(-50.0)
                        .max(100.0)
                        .with_default(7)
                        .describe("Annual return (%)"),
                ),
            ]))
            .param("initialCapital", "Assets invested today (TWD)")
            .param("monthlyContribution", "Amount added every month (TWD)")
            .handle(run_milestones),
    ]
}

fn run_growth(input: Value) -> anyhow::Result<Value> {
    let input: GrowthInput = decode("capital.growth", input)?;
    encode(&growth(&input))
}

fn run_fire(input: Value) -> anyhow::Result<Value> {
    let input: FireInput = decode("capital.fire", input)?;
    encode(&fire(&input))
}

fn run_goal_reverse(input: Value) -> anyhow::Result<Value> {
    let input: GoalInput = decode("capital.goalReverse", input)?;
    encode(&goal_reverse(&input))
}

fn run_passive_income(input: Value) -> anyhow::Result<Value> {
    let input: PassiveIncomeInput = decode("capital.passiveIncome", input)?;
    encode(&passive_income(&input))
}

fn run_milestones(input: Value) -> anyhow::Result<Value> {
    let input: MilestonesInput = decode("capital.milestones", input)?;
    encode(&milestones(&input))
}

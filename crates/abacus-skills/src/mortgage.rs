//! Mortgage skills: `mortgage.calculate` for a level-payment loan with an
//! optional interest-only grace period, `mortgage.refinance` to compare a
//! new rate against the current loan, and `mortgage.earlyRepayment` for the
//! effect of paying down principal ahead of schedule.

use abacus_core::skill::SkillDescriptor;
use abacus_types::schema::SchemaNode;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::{decode, encode, round_half_up};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageInput {
    pub loan_amount: f64,
    pub annual_rate: f64,
    pub years: f64,
    pub grace_period: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleYear {
    pub year: u32,
    pub balance: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageSummary {
    /// Monthly payment per 10,000 borrowed.
    pub per_ten_thousand: f64,
    pub yearly_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgagePlan {
    pub monthly_payment: f64,
    pub grace_period_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub interest_ratio: f64,
    pub summary: MortgageSummary,
    pub amortization_schedule: Vec<ScheduleYear>,
}

/// Level monthly payment for `principal` over `months`, rounded.
pub fn monthly_payment(principal: f64, annual_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    let n = f64::from(months);
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return round_half_up(principal / n);
    }
    let growth = (1.0 + r).powf(n);
    round_half_up(principal * r * growth / (growth - 1.0))
}

pub fn calculate(input: &MortgageInput) -> anyhow::Result<MortgagePlan> {
    if input.grace_period >= input.years {
        bail!(
            "grace period ({} years) must be shorter than the loan term ({} years)",
            input.grace_period,
            input.years
        );
    }

    let total_months = (input.years * 12.0) as u32;
    let grace_months = (input.grace_period * 12.0) as u32;
    let paying_months = total_months - grace_months;
    let monthly_rate = input.annual_rate / 100.0 / 12.0;

    let grace_payment = round_half_up(input.loan_amount * monthly_rate);
    let payment = monthly_payment(input.loan_amount, input.annual_rate, paying_months);
    let total_payment =
        grace_payment * f64::from(grace_months) + payment * f64::from(paying_months);
    let total_interest = total_payment - input.loan_amount;

    Ok(MortgagePlan {
        monthly_payment: payment,
        grace_period_payment: grace_payment,
        total_payment,
        total_interest,
        interest_ratio: if total_payment > 0.0 {
            total_interest / total_payment * 100.0
        } else {
            0.0
        },
        summary: MortgageSummary {
            per_ten_thousand: if input.loan_amount > 0.0 {
                round_half_up(payment / input.loan_amount * 10_000.0)
            } else {
                0.0
            },
            yearly_payment: payment * 12.0,
        },
        amortization_schedule: schedule(
            input.loan_amount,
            monthly_rate,
            grace_months,
            total_months,
            payment,
        ),
    })
}

/// Year-end balances. Grace months pay interest only; the final month
/// absorbs rounding so the balance closes at zero.
fn schedule(
    loan: f64,
    monthly_rate: f64,
    grace_months: u32,
    total_months: u32,
    payment: f64,
) -> Vec<ScheduleYear> {
    let mut balance = loan;
    let mut principal_paid = 0.0;
    let mut interest_paid = 0.0;
    let mut rows = Vec::with_capacity(total_months as usize / 12);

    for month in 1..=total_months {
        let interest = balance * monthly_rate;
        interest_paid += interest;
        if month > grace_months {
            let principal = if month == total_months {
                balance
            } else {
                (payment - interest).min(balance)
            };
            balance -= principal;
            principal_paid += principal;
        }

        if month % 12 == 0 {
            rows.push(ScheduleYear {
                year: month / 12,
                balance: round_half_up(balance.max(0.0)),
                principal_paid: round_half_up(principal_paid),
                interest_paid: round_half_up(interest_paid),
            });
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// mortgage.refinance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceInput {
    pub current_balance: f64,
    pub current_rate: f64,
    pub remaining_years: f64,
    pub new_rate: f64,
    /// Defaults to the remaining term.
    pub new_years: Option<f64>,
    pub refinance_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinancePlan {
    pub current_monthly: f64,
    pub current_total_payment: f64,
    pub current_total_interest: f64,
    pub new_monthly: f64,
    pub new_total_payment: f64,
    pub new_total_interest: f64,
    pub monthly_savings: f64,
    pub total_savings: f64,
    pub refinance_cost: f64,
    pub net_savings: f64,
    /// `None` when the new loan does not lower the monthly payment.
    pub break_even_months: Option<f64>,
    pub is_worth_it: bool,
}

pub fn refinance(input: &RefinanceInput) -> RefinancePlan {
    let balance = input.current_balance;
    let current_months = (input.remaining_years * 12.0) as u32;
    let new_months = (input.new_years.unwrap_or(input.remaining_years) * 12.0) as u32;

    let current_monthly = monthly_payment(balance, input.current_rate, current_months);
    let current_total_payment = current_monthly * f64::from(current_months);
    let current_total_interest = current_total_payment - balance;

    let new_monthly = monthly_payment(balance, input.new_rate, new_months);
    let new_total_payment = new_monthly * f64::from(new_months);
    let new_total_interest = new_total_payment - balance;

    let monthly_savings = current_monthly - new_monthly;
    let total_savings = current_total_interest - new_total_interest;
    let net_savings = total_savings - input.refinance_cost;
    let break_even_months =
        (monthly_savings > 0.0).then(|| (input.refinance_cost / monthly_savings).ceil());
    let is_worth_it = net_savings > 0.0
        && break_even_months.is_some_and(|months| months < f64::from(current_months));

    RefinancePlan {
        current_monthly,
        current_total_payment,
        current_total_interest,
        new_monthly,
        new_total_payment,
        new_total_interest,
        monthly_savings,
        total_savings,
        refinance_cost: input.refinance_cost,
        net_savings,
        break_even_months,
        is_worth_it,
    }
}

// ---------------------------------------------------------------------------
// mortgage.earlyRepayment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyRepaymentInput {
    pub loan_balance: f64,
    pub annual_rate: f64,
    pub remaining_years: f64,
    pub extra_payment: f64,
    /// Extra amount paid every month instead of once up front.
    pub is_monthly: bool,
}

/// Two ways to use an early repayment: keep the payment and finish sooner
/// (`shorten_*`), or keep the term and pay less each month (`reduced_*`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyRepaymentPlan {
    pub original_monthly: f64,
    pub original_total_months: u32,
    pub original_total_interest: f64,
    pub shorten_months: f64,
    pub shorten_total_interest: f64,
    pub shorten_saved_interest: f64,
    pub shorten_saved_years: f64,
    pub reduced_monthly: f64,
    pub reduced_total_interest: f64,
    pub reduced_monthly_savings: f64,
    pub reduced_saved_interest: f64,
}

/// Months of level `payment` needed to clear `balance`, or `fallback` when
/// the payment does not cover the interest.
fn months_to_repay(balance: f64, monthly_rate: f64, payment: f64, fallback: f64) -> f64 {
    if balance <= 0.0 {
        return 0.0;
    }
    if payment <= 0.0 {
        return fallback;
    }
    if monthly_rate == 0.0 {
        return (balance / payment).ceil();
    }
    let ratio = balance * monthly_rate / payment;
    if ratio >= 1.0 {
        return fallback;
    }
    (-(1.0 - ratio).ln() / (1.0 + monthly_rate).ln()).ceil()
}

pub fn early_repayment(input: &EarlyRepaymentInput) -> EarlyRepaymentPlan {
    let monthly_rate = input.annual_rate / 100.0 / 12.0;
    let original_months = (input.remaining_years * 12.0) as u32;
    let months = f64::from(original_months);

    let original_monthly = monthly_payment(input.loan_balance, input.annual_rate, original_months);
    let original_total_interest = original_monthly * months - input.loan_balance;

    // A lump sum larger than the balance simply clears the loan.
    let new_balance = if input.is_monthly {
        input.loan_balance
    } else {
        (input.loan_balance - input.extra_payment).max(0.0)
    };
    let shorten_payment = if input.is_monthly {
        original_monthly + input.extra_payment
    } else {
        original_monthly
    };

    let shorten_months =
        months_to_repay(new_balance, monthly_rate, shorten_payment, months).max(1.0);
    let shorten_total_interest = shorten_payment * shorten_months - new_balance;

    let reduced_monthly = monthly_payment(new_balance, input.annual_rate, original_months);
    let reduced_total_interest = reduced_monthly * months - new_balance;

    EarlyRepaymentPlan {
        original_monthly,
        original_total_months: original_months,
        original_total_interest,
        shorten_months,
        shorten_total_interest,
        shorten_saved_interest: original_total_interest - shorten_total_interest,
        shorten_saved_years: (months - shorten_months) / 12.0,
        reduced_monthly,
        reduced_total_interest,
        reduced_monthly_savings: original_monthly - reduced_monthly,
        reduced_saved_interest: original_total_interest - reduced_total_interest,
    }
}

pub fn skills() -> Vec<SkillDescriptor> {
    vec![
        SkillDescriptor::builder("mortgage.calculate", "Mortgage Calculator")
            .description("Monthly payment, total interest, and yearly balance of a mortgage")
            .tags(["mortgage", "housing", "beginner"])
            .input(SchemaNode::object([
                ("loanAmount", SchemaNode::number().min(0.0).describe("Loan amount")),
                (
                    "annualRate",
                    SchemaNode::number()
                        .min(0.0)
                        .max(30.0)
                        .describe("Annual interest rate (%)"),
                ),
                (
                    "years",
                    SchemaNode::integer().min(1.0).max(50.0).describe("Loan term"),
                ),
                (
                    "gracePeriod",
                    SchemaNode::integer()
                        .min(0.0)
                        .max(10.0)
                        .with_default(0)
                        .describe("Grace period (years)"),
                ),
            ]))
            .output(SchemaNode::object([
                ("monthlyPayment", SchemaNode::number()),
                ("gracePeriodPayment", SchemaNode::number()),
                ("totalPayment", SchemaNode::number()),
                ("totalInterest", SchemaNode::number()),
                ("interestRatio", SchemaNode::number()),
                (
                    "summary",
                    SchemaNode::object([
                        ("perTenThousand", SchemaNode::number()),
                        ("yearlyPayment", SchemaNode::number()),
                    ]),
                ),
                (
                    "amortizationSchedule",
                    SchemaNode::array(SchemaNode::object([
                        ("year", SchemaNode::integer()),
                        ("balance", SchemaNode::number()),
                        ("principalPaid", SchemaNode::number()),
                        ("interestPaid", SchemaNode::number()),
                    ])),
                ),
            ]))
            .param("loanAmount", "Amount borrowed (TWD)")
            .param("annualRate", "Annual interest rate in percent")
            .param("years", "Loan term in years")
            .param("gracePeriod", "Interest-only years at the start of the loan")
            .handle(run_calculate),
        SkillDescriptor::builder("mortgage.refinance", "Refinance Check")
            .description("Whether moving a mortgage to a new rate pays off, and how fast")
            .tags(["mortgage", "housing", "advanced"])
            .input(SchemaNode::object([
                (
                    "currentBalance",
                    SchemaNode::number().min(0.0).describe("Outstanding balance"),
                ),
                (
                    "currentRate",
                    SchemaNode::number().min(0.0).max(30.0).describe("Current rate (%)"),
                ),
                (
                    "remainingYears",
                    SchemaNode::integer().min(1.0).max(50.0).describe("Remaining years"),
                ),
                (
                    "newRate",
                    SchemaNode::number().min(0.0).max(30.0).describe("New rate (%)"),
                ),
                (
                    "newYears",
                    SchemaNode::integer()
                        .min(1.0)
                        .max(50.0)
                        .optional()
                        .describe("New loan term"),
                ),
                (
                    "refinanceCost",
                    SchemaNode::number()
                        .min(0.0)
                        .with_default(30_000)
                        .describe("Refinance cost"),
                ),
            ]))
            .param("currentBalance", "Balance still owed on the current loan (TWD)")
            .param("currentRate", "Current annual interest rate in percent")
            .param("remainingYears", "Years left on the current loan")
            .param("newRate", "Annual rate offered by the new lender in percent")
            .param("newYears", "Term of the new loan; defaults to the remaining years")
            .param("refinanceCost", "Fees and early-termination penalties combined (TWD)")
            .handle(run_refinance),
        SkillDescriptor::builder("mortgage.earlyRepayment", "Early Repayment")
            .description("Interest saved by prepaying, as a shorter term or a lower monthly payment")
            .tags(["mortgage", "housing", "advanced"])
            .input(SchemaNode::object([
                (
                    "loanBalance",
                    SchemaNode::number().min(0.0).describe("Outstanding balance"),
                ),
                (
                    "annualRate",
                    SchemaNode::number().min(0.0).max(30.0).describe("Annual rate (%)"),
                ),
                (
                    "remainingYears",
                    SchemaNode::integer().min(1.0).max(50.0).describe("Remaining years"),
                ),
                (
                    "extraPayment",
                    SchemaNode::number().min(0.0).describe("Extra payment"),
                ),
                (
                    "isMonthly",
                    SchemaNode::boolean().with_default(false).describe("Pay extra every month"),
                ),
            ]))
            .param("loanBalance", "Balance still owed (TWD)")
            .param("extraPayment", "Amount prepaid, once or every month (TWD)")
            .param("isMonthly", "Prepay every month instead of a single lump sum")
            .handle(run_early_repayment),
    ]
}

fn run_calculate(input: Value) -> anyhow::Result<Value> {
    let input: MortgageInput = decode("mortgage.calculate", input)?;
    encode(&calculate(&input)?)
}

fn run_refinance(input: Value) -> anyhow::Result<Value> {
    let input: RefinanceInput = decode("mortgage.refinance", input)?;
    encode(&refinance(&input))
}

fn run_early_repayment(input: Value) -> anyhow::Result<Value> {
    let input: EarlyRepaymentInput = decode("mortgage.earlyRepayment", input)?;
    encode(&early_repayment(&input))
}

//! Presentation adapters for the built-in skills.
//!
//! Each adapter adds a `chartData` series to the raw output. Adapters read
//! fields loosely: a missing number counts as zero and a missing series
//! yields an empty chart, so they never fail on partial output.

use abacus_core::adapter::{AdapterRegistry, enrich, number_at};
use serde_json::{Value, json};

pub fn register_all(adapters: &mut AdapterRegistry) {
    adapters.register("capital.growth", capital_growth);
    adapters.register("mortgage.calculate", mortgage_calculate);
    adapters.register("tax.calculate", tax_calculate);
    adapters.register("salary.analyze", salary_analyze);
}

fn series<'a>(output: &'a Value, key: &str) -> &'a [Value] {
    output
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn point(name: impl Into<String>, value: f64) -> Value {
    json!({ "name": name.into(), "value": value })
}

/// Nominal and real asset curve, one point per year.
fn capital_growth(_input: &Value, output: &Value) -> Value {
    let chart: Vec<Value> = series(output, "yearlyData")
        .iter()
        .map(|row| {
            json!({
                "name": format!("Year {}", number_at(row, "year")),
                "value": number_at(row, "totalAssets"),
                "real": number_at(row, "realAssets"),
            })
        })
        .collect();
    enrich(output, [("chartData", Value::Array(chart))])
}

/// Outstanding balance per year, starting from the full loan at year 0.
fn mortgage_calculate(input: &Value, output: &Value) -> Value {
    let schedule = series(output, "amortizationSchedule");
    let mut chart = Vec::with_capacity(schedule.len() + 1);
    if !schedule.is_empty() {
        chart.push(point("Year 0", number_at(input, "loanAmount")));
        chart.extend(schedule.iter().map(|row| {
            point(
                format!("Year {}", number_at(row, "year")),
                number_at(row, "balance"),
            )
        }));
    }
    enrich(output, [("chartData", Value::Array(chart))])
}

/// Where the income went: exemptions, deductions, taxable, and tax.
fn tax_calculate(_input: &Value, output: &Value) -> Value {
    let details = output.get("deductionDetails").unwrap_or(&Value::Null);
    let deductions = number_at(details, "standardDeduction")
        + number_at(details, "salarySpecial")
        + number_at(details, "basicLiving");
    let chart = vec![
        point("Exemptions", number_at(details, "exemption")),
        point("Deductions", deductions),
        point("Taxable income", number_at(output, "taxableIncome")),
        point("Tax", number_at(output, "taxAmount")),
    ];
    enrich(output, [("chartData", Value::Array(chart))])
}

fn salary_analyze(_input: &Value, output: &Value) -> Value {
    let annual = output.get("annual").unwrap_or(&Value::Null);
    let chart = vec![
        point("Take-home", number_at(annual, "net")),
        point("Insurance", number_at(annual, "insurance")),
        point("Pension", number_at(annual, "pension")),
        point("Income tax", number_at(annual, "tax")),
    ];
    enrich(output, [("chartData", Value::Array(chart))])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapters() -> AdapterRegistry {
        let mut adapters = AdapterRegistry::new();
        register_all(&mut adapters);
        adapters
    }

    #[test]
    fn test_capital_growth_chart() {
        let output = json!({
            "summary": {"totalAssets": 1200},
            "yearlyData": [
                {"year": 0, "totalAssets": 1000, "realAssets": 1000},
                {"year": 1, "totalAssets": 1200, "realAssets": 1150},
            ],
        });
        let adapted = adapters().adapt("capital.growth", &json!({}), &output);
        assert_eq!(adapted["chartData"][1]["name"], "Year 1");
        assert_eq!(adapted["chartData"][1]["value"], 1200.0);
        assert_eq!(adapted["chartData"][1]["real"], 1150.0);
        assert_eq!(adapted["summary"], output["summary"]);
    }

    #[test]
    fn test_mortgage_chart_prepends_loan() {
        let output = json!({
            "amortizationSchedule": [
                {"year": 1, "balance": 900},
                {"year": 2, "balance": 0},
            ],
        });
        let adapted = adapters().adapt("mortgage.calculate", &json!({"loanAmount": 1000}), &output);
        let chart = adapted["chartData"].as_array().unwrap();
        assert_eq!(chart.len(), 3);
        assert_eq!(chart[0], json!({"name": "Year 0", "value": 1000.0}));
        assert_eq!(chart[2]["value"], 0.0);
    }

    #[test]
    fn test_tax_chart_sums_deductions() {
        let output = json!({
            "taxAmount": 27700,
            "taxableIncome": 554000,
            "deductionDetails": {
                "exemption": 97000,
                "standardDeduction": 131000,
                "salarySpecial": 218000,
                "basicLiving": 0,
            },
        });
        let adapted = adapters().adapt("tax.calculate", &json!({}), &output);
        assert_eq!(adapted["chartData"][1]["value"], 349000.0);
        assert_eq!(adapted["chartData"][3]["value"], 27700.0);
    }

    #[test]
    fn test_partial_output_degrades_to_zero() {
        let adapters = adapters();

        let salary = adapters.adapt("salary.analyze", &json!({}), &json!({}));
        assert_eq!(salary["chartData"][0], json!({"name": "Take-home", "value": 0.0}));

        let tax = adapters.adapt("tax.calculate", &json!({}), &json!({"taxAmount": 5}));
        assert_eq!(tax["chartData"][0]["value"], 0.0);
        assert_eq!(tax["taxAmount"], 5);

        let mortgage = adapters.adapt("mortgage.calculate", &json!({}), &json!({}));
        assert_eq!(mortgage["chartData"], json!([]));
    }

    #[test]
    fn test_unadapted_skill_passes_through() {
        let output = json!({"grossSalary": 50000});
        assert_eq!(adapters().adapt("salary.reverse", &json!({}), &output), output);
    }
}

//! Built-in financial skills for Abacus.
//!
//! Each module holds pure calculation functions plus the descriptors that
//! expose them through the registry. [`register_builtin`] installs the whole
//! catalog and [`builtin_adapters`] the matching presentation adapters.

pub mod adapters;
pub mod capital;
pub mod mortgage;
pub mod rates;
pub mod salary;
pub mod tax;

mod util;

use abacus_core::adapter::AdapterRegistry;
use abacus_core::registry::Registry;
use abacus_core::skill::SkillDescriptor;
use abacus_types::error::RegistryError;

/// Every built-in descriptor, in catalog order.
pub fn builtin_skills() -> Vec<SkillDescriptor> {
    let mut skills = Vec::new();
    skills.extend(tax::skills());
    skills.extend(salary::skills());
    skills.extend(capital::skills());
    skills.extend(mortgage::skills());
    skills
}

/// Register the built-in catalog into `registry`.
pub fn register_builtin(registry: &Registry) -> Result<usize, RegistryError> {
    let skills = builtin_skills();
    let count = skills.len();
    for skill in skills {
        registry.register(skill)?;
    }
    tracing::info!(count, "built-in skills registered");
    Ok(count)
}

pub fn builtin_adapters() -> AdapterRegistry {
    let mut adapters = AdapterRegistry::new();
    adapters::register_all(&mut adapters);
    adapters
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use abacus_core::executor::{Executor, SkillExecutor};
    use abacus_core::logger::ExecutionLogger;
    use abacus_types::chain::ChainStep;
    use serde_json::json;

    use super::*;

    fn executor() -> Executor {
        let registry = Arc::new(Registry::new());
        register_builtin(&registry).unwrap();
        Executor::new(registry, Arc::new(ExecutionLogger::new(100)))
    }

    #[test]
    fn test_builtin_catalog_registers_cleanly() {
        let registry = Registry::new();
        let count = register_builtin(&registry).unwrap();
        assert_eq!(count, registry.len());
        for id in [
            "tax.calculate",
            "tax.optimize",
            "salary.analyze",
            "salary.reverse",
            "salary.structure",
            "capital.growth",
            "capital.fire",
            "capital.goalReverse",
            "capital.passiveIncome",
            "capital.milestones",
            "mortgage.calculate",
            "mortgage.refinance",
            "mortgage.earlyRepayment",
        ] {
            assert!(registry.contains(id), "missing {id}");
        }
    }

    #[test]
    fn test_every_skill_describes_with_fields() {
        let registry = Registry::new();
        register_builtin(&registry).unwrap();
        for id in registry.ids() {
            let description = registry.describe(&id).unwrap();
            assert!(!description.fields.is_empty(), "{id} has no fields");
            assert_eq!(description.fields.len(), description.default_values.len());
        }
    }

    #[test]
    fn test_executing_tax_calculate_is_deterministic() {
        let executor = executor();
        let input = json!({"annualIncome": 1_500_000, "isMarried": true, "householdSize": 3});
        let first = executor.execute("tax.calculate", input.clone(), None).unwrap();
        let second = executor.execute("tax.calculate", input, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(executor.logger().len(), 2);
    }

    #[test]
    fn test_growth_result_feeds_goal_reverse() {
        let executor = executor();
        let steps: Vec<ChainStep> = serde_json::from_value(json!([
            {
                "skillId": "capital.growth",
                "input": {"initialCapital": 500_000, "monthlyContribution": 10_000, "years": 20}
            },
            {
                "skillId": "capital.goalReverse",
                "input": {"targetAmount": "$previous.summary.totalAssets", "years": 20}
            },
        ]))
        .unwrap();

        let result = executor.execute_chain(&steps).unwrap();
        assert!(result.success, "{result:?}");
        let plan = result.final_output.unwrap();
        // Reaching the projected total from nothing takes more than 10,000 a month.
        assert!(plan["monthlyInvestment"].as_f64().unwrap() > 10_000.0);
    }
}

//! CLI skill subcommands: list, describe, run, and chain.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::Value;

use abacus_core::executor::SkillExecutor;
use abacus_types::chain::{ChainResult, ChainStep};
use abacus_types::envelope::Envelope;
use abacus_types::schema::FieldMeta;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

pub fn list_skills(state: &AppState, query: Option<&str>, prompt: bool, json: bool) -> Result<()> {
    if prompt {
        print!("{}", state.registry.prompt_summary());
        return Ok(());
    }

    let terms: Vec<&str> = query.unwrap_or_default().split_whitespace().collect();
    let skills: Vec<_> = if terms.is_empty() {
        state.registry.summaries()
    } else {
        state
            .registry
            .search(&terms)
            .iter()
            .map(|skill| skill.summary())
            .collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&Envelope::ok(&skills))?);
        return Ok(());
    }

    if skills.is_empty() {
        println!();
        println!("  No skills match '{}'.", query.unwrap_or_default());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Id").fg(Color::Cyan),
            Cell::new("Name"),
            Cell::new("Version"),
            Cell::new("Tags"),
            Cell::new("Description"),
        ]);

    for skill in &skills {
        table.add_row(vec![
            Cell::new(&skill.id).fg(Color::Cyan),
            Cell::new(&skill.name),
            Cell::new(&skill.version),
            Cell::new(skill.tags.join(", ")),
            Cell::new(&skill.description),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

pub fn describe_skill(state: &AppState, id: &str, json: bool) -> Result<()> {
    let description = state.registry.describe(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&Envelope::ok(&description))?);
        return Ok(());
    }

    let summary = &description.summary;
    println!();
    println!(
        "  {} {} {}",
        style("Skill:").bold(),
        style(&summary.name).cyan().bold(),
        style(format!("({} v{})", summary.id, summary.version)).dim()
    );
    if !summary.description.is_empty() {
        println!("  {}", summary.description);
    }
    if !summary.tags.is_empty() {
        println!("  {} {}", style("Tags:").bold(), summary.tags.join(", "));
    }
    println!();

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field").fg(Color::Cyan),
            Cell::new("Type"),
            Cell::new("Label"),
            Cell::new("Required"),
            Cell::new("Default"),
            Cell::new("Range"),
            Cell::new("Unit"),
        ]);

    for field in &description.fields {
        table.add_row(vec![
            Cell::new(&field.name).fg(Color::Cyan),
            Cell::new(format!("{:?}", field.field_type).to_lowercase()),
            Cell::new(&field.label),
            Cell::new(if field.required { "yes" } else { "no" }),
            Cell::new(
                description
                    .default_values
                    .get(&field.name)
                    .map(Value::to_string)
                    .unwrap_or_default(),
            ),
            Cell::new(range_label(field)),
            Cell::new(field.unit.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!();
    Ok(())
}

fn range_label(field: &FieldMeta) -> String {
    match (field.min, field.max) {
        (Some(lo), Some(hi)) => format!("{lo} .. {hi}"),
        (Some(lo), None) => format!(">= {lo}"),
        (None, Some(hi)) => format!("<= {hi}"),
        (None, None) => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

pub fn run_skill(state: &AppState, id: &str, input: &str, adapt: bool, json: bool) -> Result<()> {
    let input: Value = serde_json::from_str(input).context("--input must be valid JSON")?;

    let result = state.executor.execute(id, input.clone(), None);
    let output = match result {
        Ok(output) if adapt => state.adapters.adapt(id, &input, &output),
        Ok(output) => output,
        Err(e) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&Envelope::<Value>::err(&e))?);
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&Envelope::ok(&output))?);
    } else {
        println!();
        println!("  {} {}", style("*").green().bold(), style(id).cyan());
        println!();
        println!("{}", serde_json::to_string_pretty(&output)?);
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Parse a chain definition: a bare step array or `{ "skills": [...] }`.
pub fn parse_chain(text: &str) -> Result<Vec<ChainStep>> {
    let value: Value = serde_json::from_str(text).context("chain file is not valid JSON")?;
    let steps = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("skills") {
            Some(steps) => steps,
            None => bail!("chain object must have a \"skills\" array"),
        },
        _ => bail!("chain must be an array of steps or an object with \"skills\""),
    };
    serde_json::from_value(steps).context("invalid chain step")
}

fn read_chain_file(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading chain from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

pub fn run_chain(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let steps = parse_chain(&read_chain_file(file)?)?;
    let result = state.executor.execute_chain(&steps)?;

    if json {
        let envelope = Envelope {
            success: result.success,
            data: Some(&result),
            error: result
                .steps
                .iter()
                .find(|step| !step.success)
                .and_then(|step| step.error.clone()),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        print_chain(&result)?;
    }

    if !result.success {
        bail!("chain aborted after {} step(s)", result.steps.len());
    }
    Ok(())
}

fn print_chain(result: &ChainResult) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#"),
            Cell::new("Skill").fg(Color::Cyan),
            Cell::new("Status"),
            Cell::new("Duration"),
            Cell::new("Error"),
        ]);

    for (i, step) in result.steps.iter().enumerate() {
        let (status, color) = if step.success {
            ("ok", Color::Green)
        } else {
            ("failed", Color::Red)
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&step.skill_id).fg(Color::Cyan),
            Cell::new(status).fg(color),
            Cell::new(format!("{} ms", step.duration_ms)),
            Cell::new(
                step.error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("-"),
            ),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} total",
        style(format!("{} ms", result.total_duration_ms)).dim()
    );
    if let Some(output) = &result.final_output {
        println!();
        println!("{}", serde_json::to_string_pretty(output)?);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chain_accepts_both_shapes() {
        let bare = parse_chain(r#"[{"skillId": "tax.calculate", "input": {"annualIncome": 1}}]"#)
            .unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].input.get("annualIncome"), Some(&json!(1)));

        let wrapped = parse_chain(
            r#"{"skills": [{"skillId": "salary.analyze"}, {"skillId": "tax.calculate"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped[1].skill_id, "tax.calculate");
        assert!(wrapped[0].input.is_empty());
    }

    #[test]
    fn test_parse_chain_rejects_other_shapes() {
        assert!(parse_chain("42").is_err());
        assert!(parse_chain(r#"{"steps": []}"#).is_err());
        assert!(parse_chain("not json").is_err());
    }

    #[test]
    fn test_range_label() {
        let mut field = FieldMeta {
            name: "years".into(),
            field_type: abacus_types::schema::FieldType::Number,
            label: "Years".into(),
            required: true,
            default: None,
            min: Some(1.0),
            max: Some(50.0),
            step: Some(1000.0),
            unit: None,
        };
        assert_eq!(range_label(&field), "1 .. 50");
        field.max = None;
        assert_eq!(range_label(&field), ">= 1");
    }

    #[test]
    fn test_run_chain_from_file() {
        let state = AppState::init(Default::default()).unwrap();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("chain.json");
        std::fs::write(
            &path,
            json!([
                {"skillId": "salary.analyze", "input": {"monthlySalary": 60000}},
                {"skillId": "tax.calculate", "input": {"annualIncome": "$previous.annual.gross"}},
            ])
            .to_string(),
        )
        .unwrap();

        run_chain(&state, &path, true).unwrap();
        assert_eq!(state.logger.len(), 2);
    }
}

//! Plain-text views of the store

use std::fmt::Write;

use farmoptima_common::editors::UNSPECIFIED_CROP;
use farmoptima_common::models::{AnalysisResult, Field, FieldWork, Machine, MachineRepair};
use farmoptima_common::{time, FarmStore};

/// Append one line; writing to a String cannot fail
macro_rules! push_line {
    ($out:expr) => {
        $out.push('\n');
    };
    ($out:expr, $($arg:tt)*) => {
        let _ = writeln!($out, $($arg)*);
    };
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn fields(fields: &[Field], total_acres: f64) -> String {
    if fields.is_empty() {
        return "No fields yet. Add one with `farmoptima field add`.".to_string();
    }

    let mut out = String::new();
    push_line!(out, "{:<36}  {:<24}  {:>10}  {}", "ID", "NAME", "ACRES", "CROP");
    for field in fields {
        push_line!(
            out,
            "{:<36}  {:<24}  {:>10}  {}",
            field.id,
            field.name,
            field.acres,
            field.crop_type.as_deref().unwrap_or(UNSPECIFIED_CROP)
        );
    }
    push_line!(out, "{} fields, {} acres", fields.len(), total_acres);
    out.trim_end().to_string()
}

pub fn machines(machines: &[Machine]) -> String {
    if machines.is_empty() {
        return "No machines yet. Add one with `farmoptima machine add`.".to_string();
    }

    let mut out = String::new();
    push_line!(
        out,
        "{:<36}  {:<28}  {:<10}  {:>6}  {:>4}  {}",
        "ID",
        "NAME",
        "TYPE",
        "HP",
        "YEAR",
        "PLATE"
    );
    for machine in machines {
        push_line!(
            out,
            "{:<36}  {:<28}  {:<10}  {:>6}  {:>4}  {}",
            machine.id,
            machine.name,
            machine.machine_type,
            machine.horsepower.map(|hp| hp.to_string()).unwrap_or_else(|| "-".into()),
            machine.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into()),
            or_dash(machine.license_plate.as_deref())
        );
    }
    out.trim_end().to_string()
}

pub fn machine_types(types: &[String]) -> String {
    types
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{:>2}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Each row carries the resolved field label
pub fn works(rows: &[(FieldWork, String)], unfiltered: bool) -> String {
    if rows.is_empty() {
        return if unfiltered {
            "No field work logged yet.".to_string()
        } else {
            "No field work matches the filter.".to_string()
        };
    }

    let mut out = String::new();
    push_line!(out, "{:<10}  {:<24}  {:<16}  {}", "DATE", "FIELD", "TASK", "NOTES");
    for (work, field_label) in rows {
        push_line!(
            out,
            "{:<10}  {:<24}  {:<16}  {}",
            work.date,
            field_label,
            work.task,
            or_dash(work.notes.as_deref())
        );
    }
    out.trim_end().to_string()
}

/// Each row carries the resolved machine label and the upcoming flag
pub fn repairs(rows: &[(MachineRepair, String, bool)], total_cost: f64) -> String {
    if rows.is_empty() {
        return "No repairs logged.".to_string();
    }

    let mut out = String::new();
    push_line!(
        out,
        "{:<10}  {:<28}  {:>10}  {:<10}  {}",
        "DATE",
        "MACHINE",
        "COST",
        "NEXT DUE",
        "DESCRIPTION"
    );
    for (repair, machine_label, upcoming) in rows {
        let next_due = match (&repair.next_due_date, upcoming) {
            (Some(date), true) => format!("{} !", date),
            (Some(date), false) => date.clone(),
            (None, _) => "-".to_string(),
        };
        push_line!(
            out,
            "{:<10}  {:<28}  {:>10}  {:<10}  {}",
            repair.date,
            machine_label,
            repair.cost.map(money).unwrap_or_else(|| "-".into()),
            next_due,
            repair.description
        );
    }
    push_line!(out, "Total maintenance cost: {}", money(total_cost));
    out.trim_end().to_string()
}

pub fn analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    push_line!(out, "Efficiency score: {}/100", result.efficiency_score);
    push_line!(out);
    push_line!(out, "{}", result.summary);
    if !result.recommendations.is_empty() {
        push_line!(out);
        push_line!(out, "Recommendations:");
        for (i, recommendation) in result.recommendations.iter().enumerate() {
            push_line!(out, "  {}. {}", i + 1, recommendation);
        }
    }
    out.trim_end().to_string()
}

/// Dashboard counts and totals
pub fn summary(store: &FarmStore) -> String {
    let fields = store.field_editor();
    let machines = store.machine_editor();
    let repairs = store.repair_editor();
    let upcoming = repairs.upcoming(time::today());

    let mut out = String::new();
    push_line!(out, "Fields:      {} ({} acres)", fields.list().len(), fields.total_acres());
    push_line!(
        out,
        "Machines:    {} ({} hp total)",
        machines.list().len(),
        machines.total_horsepower()
    );
    for (machine_type, count) in machines.count_by_type() {
        push_line!(out, "  {:<10} {}", machine_type, count);
    }
    push_line!(out, "Field work:  {}", store.works().get().len());
    push_line!(
        out,
        "Repairs:     {} ({} total)",
        repairs.list().len(),
        money(repairs.total_cost())
    );
    push_line!(out, "Due soon:    {}", upcoming.len());
    for repair in &upcoming {
        push_line!(
            out,
            "  {} {}",
            repair.next_due_date.as_deref().unwrap_or("-"),
            repairs.machine_label(repair)
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmoptima_common::editors::{NewField, NewMachine, NewRepair};

    fn field(name: &str, crop: Option<&str>) -> Field {
        Field {
            id: format!("id-{}", name),
            name: name.to_string(),
            acres: 10.0,
            crop_type: crop.map(str::to_string),
        }
    }

    #[test]
    fn test_fields_empty_state() {
        assert!(fields(&[], 0.0).starts_with("No fields yet"));
    }

    #[test]
    fn test_fields_shows_unspecified_crop() {
        let out = fields(&[field("Creek", None), field("Hill", Some("Corn"))], 20.0);
        assert!(out.contains("Unspecified"));
        assert!(out.contains("Corn"));
        assert!(out.ends_with("2 fields, 20 acres"));
    }

    #[test]
    fn test_works_empty_states_differ() {
        assert_ne!(works(&[], true), works(&[], false));
    }

    #[test]
    fn test_repairs_marks_upcoming() {
        let repair = MachineRepair {
            id: "r1".to_string(),
            machine_id: "gone".to_string(),
            date: "2024-05-01".to_string(),
            description: "Hydraulic hose".to_string(),
            cost: Some(120.5),
            next_due_date: Some("2024-05-10".to_string()),
        };
        let out = repairs(&[(repair, "Unknown Machine".to_string(), true)], 120.5);
        assert!(out.contains("Unknown Machine"));
        assert!(out.contains("2024-05-10 !"));
        assert!(out.contains("$120.50"));
    }

    #[test]
    fn test_analysis_numbers_recommendations() {
        let out = analysis(&AnalysisResult {
            efficiency_score: 82.0,
            summary: "Well matched fleet.".to_string(),
            recommendations: vec!["Service the planter".to_string()],
        });
        assert!(out.starts_with("Efficiency score: 82/100"));
        assert!(out.contains("  1. Service the planter"));
    }

    #[test]
    fn test_summary_totals() {
        let store = FarmStore::in_memory();
        store
            .field_editor()
            .create(NewField {
                name: "North".to_string(),
                acres: 40.0,
                crop_type: None,
            })
            .unwrap();
        let machine = store
            .machine_editor()
            .create(NewMachine {
                manufacturer: "Kubota".to_string(),
                model: "M7".to_string(),
                machine_type: "Tractor".to_string(),
            })
            .unwrap();
        store
            .repair_editor()
            .create(NewRepair {
                machine_id: machine.id,
                date: "2024-01-01".to_string(),
                description: "Oil change".to_string(),
                cost: Some(80.0),
                next_due_date: None,
            })
            .unwrap();

        let out = summary(&store);
        assert!(out.contains("Fields:      1 (40 acres)"));
        assert!(out.contains("Tractor"));
        assert!(out.contains("Repairs:     1 ($80.00 total)"));
        assert!(out.contains("Due soon:    0"));
    }
}

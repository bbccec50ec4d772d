//! Console output formatter for assignment results

use colored::Colorize;
use leadflow_application::{
    AssignLeadsOutput, DealProjection, DistributeLeadsOutput, OrphanGroup, TransferLeadsOutput,
};
use leadflow_domain::{AgentId, AssignmentReport};
use serde::Serialize;
use serde_json::json;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors on or off for everything formatted afterwards
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Format an assignment report as a table grouped by agent
    pub fn format_report(report: &AssignmentReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Lead Assignments"));
        output.push('\n');

        if report.is_empty() {
            output.push_str(&format!("\n{}\n", "No assigned leads.".dimmed()));
            output.push_str(&Self::footer());
            return output;
        }

        output.push_str(&format!(
            "\n{:<8} {:<24} {:>6} {:>14}\n",
            "Agent".bold(),
            "Name".bold(),
            "Leads".bold(),
            "Value".bold()
        ));
        output.push_str(&format!("{}\n", "-".repeat(55)));

        for group in &report.groups {
            output.push_str(&format!(
                "{:<8} {:<24} {:>6} {:>14.2}\n",
                format!("#{}", group.agent_id).yellow(),
                truncate(&group.agent_name, 24),
                group.count,
                group.total_value
            ));
            output.push_str(&format!(
                "         {}\n",
                Self::indent(&wrap_ids(&group.lead_ids, 60), "         ")
                    .trim_start()
                    .dimmed()
            ));
        }

        output.push_str(&format!("{}\n", "-".repeat(55)));
        output.push_str(&format!(
            "{:<8} {:<24} {:>6} {:>14.2}\n",
            "Total".cyan().bold(),
            "",
            report.total_count,
            report.total_value
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format the result of a distribution run
    pub fn format_distribution(result: &DistributeLeadsOutput) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} leads distributed\n",
            "v".green(),
            result.plan.len()
        ));
        if let (Some(agent), remainder) = (result.plan.remainder_agent, result.plan.remainder)
            && remainder > 0
        {
            output.push_str(&format!(
                "  {} {} leftover lead(s) went to agent #{}\n",
                "*".dimmed(),
                remainder,
                agent
            ));
        }
        if let Some(deals) = &result.deals {
            output.push_str(&Self::format_deals(deals));
        }
        output.push('\n');
        output.push_str(&Self::format_report(&result.report));
        output
    }

    /// Format the result of a manual assignment
    pub fn format_assignment(result: &AssignLeadsOutput) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} leads assigned\n",
            "v".green(),
            result.report.total_count
        ));
        if !result.reassigned.is_empty() {
            output.push_str(&format!(
                "  {} taken over from other agents: {}\n",
                "!".yellow(),
                join_ids(&result.reassigned)
            ));
        }
        if let Some(deals) = &result.deals {
            output.push_str(&Self::format_deals(deals));
        }
        output.push('\n');
        output.push_str(&Self::format_report(&result.report));
        output
    }

    pub fn format_transfer(from: AgentId, to: AgentId, result: &TransferLeadsOutput) -> String {
        if result.moved.is_empty() {
            return format!("{} Agent #{} holds no leads\n", "-".dimmed(), from);
        }
        format!(
            "{} Moved {} leads from agent #{} to agent #{}\n  {}\n",
            "v".green(),
            result.moved.len(),
            from,
            to,
            join_ids(&result.moved).dimmed()
        )
    }

    pub fn format_unassigned(count: usize) -> String {
        format!("{} Released {} leads\n", "v".green(), count)
    }

    /// Format orphaned leads, one block per unavailable agent
    pub fn format_orphans(orphans: &[OrphanGroup]) -> String {
        if orphans.is_empty() {
            return format!("{} No orphaned leads\n", "v".green());
        }

        let mut output = String::new();
        output.push_str(&Self::section_header("Orphaned Leads"));
        for group in orphans {
            let label = match &group.agent_name {
                Some(name) => format!("#{} {} (inactive)", group.agent_id, name),
                None => format!("#{} (deleted)", group.agent_id),
            };
            output.push_str(&format!(
                "\n{} {} leads\n  {}\n",
                label.red().bold(),
                group.lead_ids.len(),
                join_ids(&group.lead_ids)
            ));
        }
        output.push_str(&format!(
            "\n{}\n",
            "Use `leadflow transfer --from <agent> --to <agent>` to reassign them.".dimmed()
        ));
        output
    }

    pub fn format_deals(deals: &DealProjection) -> String {
        let mut output = format!("{} {} deals created", "v".green(), deals.created.len());
        if !deals.skipped.is_empty() {
            output.push_str(&format!(
                ", {} skipped (already had a deal)",
                deals.skipped.len()
            ));
        }
        output.push('\n');
        output
    }

    /// Format any serializable result as pretty JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_distribution_json(result: &DistributeLeadsOutput) -> String {
        Self::format_json(&json!({
            "assigned": result.plan.len(),
            "remainder": result.plan.remainder,
            "remainder_agent": result.plan.remainder_agent,
            "assignments": result.plan.assignments,
            "report": result.report,
            "deals": result.deals,
        }))
    }

    pub fn format_assignment_json(result: &AssignLeadsOutput) -> String {
        Self::format_json(&json!({
            "reassigned": result.reassigned,
            "report": result.report,
            "deals": result.deals,
        }))
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(55);
        format!("{}\n{:^55}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(55).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-separated ids broken into lines of at most `width` characters
fn wrap_ids<T: std::fmt::Display>(ids: &[T], width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for id in ids {
        let id = id.to_string();
        if !current.is_empty() && current.len() + id.len() + 2 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(", ");
        }
        current.push_str(&id);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

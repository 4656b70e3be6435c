//! Versions command
//!
//! Loads the version matrix of a project and prints it as a table, one row
//! per pipeline and one column per environment.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use colored::*;
use waypoint_core::domain::pipeline::EnvironmentInstance;
use waypoint_core::domain::status::PipelineStatus;
use waypoint_core::domain::version::{EnvironmentVersion, VersionItem};
use waypoint_view::status::indicator;
use waypoint_view::{
    Filter, FilterCriteria, SortColumn, SortOrder, TableView, VersionsHub, VersionsTable,
};

use crate::config::Config;

/// Arguments of `waypoint versions`
#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Project id or name
    #[arg(short, long, env = "SYSTEM_TEAMPROJECTID")]
    project: String,

    /// Keep pipelines whose name or build numbers contain this text
    #[arg(short, long)]
    keyword: Option<String>,

    /// Keep pipelines with an environment in this status (repeatable)
    #[arg(short, long)]
    status: Vec<PipelineStatus>,

    /// Keep pipelines that deployed this build number (repeatable)
    #[arg(short, long)]
    build_number: Vec<String>,

    /// Sort by "name" or by an environment name
    #[arg(long)]
    sort: Option<String>,

    /// Sort in descending order
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Print the visible rows as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl VersionsArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            keyword: self.keyword.clone(),
            statuses: self.status.iter().copied().collect(),
            build_numbers: self.build_number.iter().cloned().collect(),
        }
    }

    fn order(&self) -> SortOrder {
        if self.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Handle `waypoint versions`
pub async fn handle_versions(args: VersionsArgs, config: &Config) -> Result<()> {
    let hub = VersionsHub::new(config.client(), config.store()?);
    let data = hub
        .load(&args.project)
        .await
        .with_context(|| format!("Failed to load versions of project '{}'", args.project))?;

    let sort = args
        .sort
        .as_deref()
        .map(|sort| resolve_sort_column(sort, &data.environments))
        .transpose()?;

    let filter = Filter::new();
    let table = VersionsTable::attach(&filter, data.items);
    if let Some(column) = sort {
        table.apply_sort(column, args.order());
    }
    filter.set_criteria(args.criteria());

    if args.json {
        let json = table.render(|view| match view {
            TableView::Items(items) => serde_json::to_string_pretty(items),
            TableView::NoMatchingItems => Ok("[]".to_string()),
        })?;
        println!("{}", json);
    } else {
        println!(
            "{}",
            format!("Versions of {}", data.project.name).bold()
        );
        println!();
        table.render(|view| print_view(&data.environments, view));
    }

    Ok(())
}

/// Map a `--sort` value to a column, matching environment names
/// case-insensitively
fn resolve_sort_column(sort: &str, environments: &[EnvironmentInstance]) -> Result<SortColumn> {
    if sort.eq_ignore_ascii_case("name") {
        return Ok(SortColumn::Name);
    }

    environments
        .iter()
        .find(|env| env.name.eq_ignore_ascii_case(sort))
        .map(|env| SortColumn::Environment(env.id))
        .ok_or_else(|| {
            let known = environments
                .iter()
                .map(|env| env.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!(
                "Unknown sort column '{}': expected 'name' or one of the environments ({})",
                sort,
                known
            )
        })
}

fn print_view(environments: &[EnvironmentInstance], view: TableView<'_>) {
    let items = match view {
        TableView::NoMatchingItems => {
            println!("{}", "No pipeline items match the current filter.".yellow());
            return;
        }
        TableView::Items([]) => {
            println!("{}", "No pipelines found.".yellow());
            return;
        }
        TableView::Items(items) => items,
    };

    let name_width = items
        .iter()
        .map(|item| item.name.chars().count())
        .chain(std::iter::once("Pipeline".len()))
        .max()
        .unwrap_or_default();

    let column_widths: Vec<usize> = environments
        .iter()
        .map(|env| {
            items
                .iter()
                .map(|item| cell_text(item.environment(env.id)).chars().count())
                .chain(std::iter::once(env.name.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut header = format!("{:<name_width$}", "Pipeline");
    for (env, width) in environments.iter().zip(column_widths.iter().copied()) {
        header.push_str(&format!("  {:<width$}", env.name));
    }
    println!("{}", header.bold());

    let rule_width = name_width + column_widths.iter().map(|w| w + 2).sum::<usize>();
    println!("{}", "─".repeat(rule_width).dimmed());

    for item in items {
        print_row(item, environments, &column_widths, name_width);
    }

    println!();
    println!("{}", format!("{} pipeline(s)", items.len()).dimmed());
    println!("{}", legend().dimmed());
}

fn legend() -> String {
    PipelineStatus::ALL
        .iter()
        .map(|status| {
            let indicator = indicator(*status);
            format!("{} {}", indicator.symbol, indicator.label)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_row(
    item: &VersionItem,
    environments: &[EnvironmentInstance],
    column_widths: &[usize],
    name_width: usize,
) {
    let mut line = format!("{:<name_width$}", item.name).bold().to_string();

    if item.environments.is_empty() {
        line.push_str(&format!("  {}", "no metadata yet".dimmed()));
        println!("{}", line);
        return;
    }

    for (env, width) in environments.iter().zip(column_widths.iter().copied()) {
        let cell = item.environment(env.id);
        let text = format!("{:<width$}", cell_text(cell));
        let text = match cell {
            Some(cell) => colorize(&text, cell.status),
            None => text.dimmed(),
        };
        line.push_str(&format!("  {}", text));
    }

    println!("{}", line);
}

fn cell_text(cell: Option<&EnvironmentVersion>) -> String {
    match cell {
        Some(cell) => format!("{} {}", indicator(cell.status).symbol, cell.build_number),
        None => "-".to_string(),
    }
}

fn colorize(text: &str, status: PipelineStatus) -> ColoredString {
    match status {
        PipelineStatus::Succeeded => text.green(),
        PipelineStatus::Failed => text.red(),
        PipelineStatus::Running => text.cyan(),
        PipelineStatus::Warning => text.yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: VersionsArgs,
    }

    fn environment(id: u32, name: &str) -> EnvironmentInstance {
        EnvironmentInstance {
            id,
            name: name.to_string(),
            description: None,
            resources: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_sort_column() {
        let environments = vec![environment(10, "dev"), environment(11, "Prod")];

        assert_eq!(
            resolve_sort_column("NAME", &environments).unwrap(),
            SortColumn::Name
        );
        assert_eq!(
            resolve_sort_column("prod", &environments).unwrap(),
            SortColumn::Environment(11)
        );

        let err = resolve_sort_column("qa", &environments).unwrap_err();
        assert!(err.to_string().contains("dev, Prod"));
    }

    #[test]
    fn test_args_to_criteria() {
        let args = TestCli::try_parse_from([
            "waypoint",
            "--project",
            "P",
            "--keyword",
            "svc",
            "--status",
            "FAILED",
            "--status",
            "warning",
            "--build-number",
            "1.0",
        ])
        .unwrap()
        .args;

        let criteria = args.criteria();

        assert_eq!(criteria.keyword.as_deref(), Some("svc"));
        assert_eq!(
            criteria.statuses.into_iter().collect::<Vec<_>>(),
            [PipelineStatus::Failed, PipelineStatus::Warning]
        );
        assert!(criteria.build_numbers.contains("1.0"));
        assert_eq!(args.order(), SortOrder::Ascending);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result =
            TestCli::try_parse_from(["waypoint", "--project", "P", "--status", "exploded"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_desc_requires_sort() {
        let result = TestCli::try_parse_from(["waypoint", "--project", "P", "--desc"]);
        assert!(result.is_err());

        let args = TestCli::try_parse_from(["waypoint", "--project", "P", "--sort", "name", "--desc"])
            .unwrap()
            .args;
        assert_eq!(args.order(), SortOrder::Descending);
    }

    #[test]
    fn test_cell_text() {
        let cell = EnvironmentVersion {
            status: PipelineStatus::Failed,
            build_id: 1,
            build_number: "1.4".to_string(),
        };
        assert_eq!(cell_text(Some(&cell)), "✗ 1.4");
        assert_eq!(cell_text(None), "-");
    }

    #[test]
    fn test_legend_lists_every_status() {
        assert_eq!(legend(), "✓ Success  ✗ Failed  ▸ Running  ! Warning");
    }
}

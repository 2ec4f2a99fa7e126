use colored::Colorize;
use log::debug;
use std::{
    io::{self, Write},
    path::Path,
};

use crate::project::{AnalyzeResult, PageReport};

pub fn print_no_pages_message<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{} No page files found - is this an app-router project?", "✋".yellow())?;
    writer.flush()?;
    Ok(())
}

/// Print one line per page, client-boundary routes marked, then a
/// summary block.
pub fn print_route_report<W: Write>(
    writer: &mut W,
    result: &AnalyzeResult,
    root: &Path,
) -> io::Result<()> {
    debug!("Printing route report for {} pages", result.reports.len());

    writeln!(writer, "{}\n", "Routes".bold())?;
    for report in &result.reports {
        print_page_line(writer, report, root)?;
    }

    let client_count =
        result.reports.iter().filter(|r| r.uses_client_side_rendering).count();

    writeln!(writer, "\n{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Pages: {}", result.reports.len().to_string().cyan())?;
    writeln!(
        writer,
        "  Client-rendered routes: {}",
        client_count.to_string().yellow().bold()
    )?;
    writeln!(writer, "  Files analyzed: {}", result.files_analyzed.to_string().cyan())?;

    writer.flush()?;
    Ok(())
}

fn print_page_line<W: Write>(writer: &mut W, report: &PageReport, root: &Path) -> io::Result<()> {
    let display_path = report
        .page
        .strip_prefix(root)
        .unwrap_or(&report.page)
        .to_string_lossy()
        .to_string();

    let route = match &report.route {
        Some(route) => route.clone(),
        None => "(no route)".to_string(),
    };

    if report.uses_client_side_rendering {
        writeln!(
            writer,
            "  {} {:<28} {} {}",
            "●".yellow(),
            route.bold(),
            display_path.blue(),
            "client".yellow()
        )?;
    } else {
        writeln!(
            writer,
            "  {} {:<28} {} {}",
            "○".green(),
            route.bold(),
            display_path.blue(),
            "server".dimmed()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(route: Option<&str>, client: bool) -> PageReport {
        PageReport {
            page: PathBuf::from("/proj/app/page.tsx"),
            route: route.map(|r| r.to_string()),
            uses_client_side_rendering: client,
        }
    }

    #[test]
    fn test_report_lists_routes_and_summary() {
        // Strip colors so assertions see plain text
        colored::control::set_override(false);

        let result = AnalyzeResult {
            reports: vec![report(Some("/"), true), report(Some("/about"), false)],
            files_analyzed: 7,
        };

        let mut out: Vec<u8> = Vec::new();
        print_route_report(&mut out, &result, Path::new("/proj")).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("/about"));
        assert!(text.contains("client"));
        assert!(text.contains("server"));
        assert!(text.contains("Client-rendered routes: 1"));
        assert!(text.contains("Files analyzed: 7"));
    }

    #[test]
    fn test_page_outside_router_root_is_labelled() {
        colored::control::set_override(false);

        let result =
            AnalyzeResult { reports: vec![report(None, false)], files_analyzed: 1 };

        let mut out: Vec<u8> = Vec::new();
        print_route_report(&mut out, &result, Path::new("/proj")).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("(no route)"));
    }
}

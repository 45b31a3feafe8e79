use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bids_report::ReconciliationReport;

use crate::types::CurateSummary;

pub fn print_summary(summary: &CurateSummary) {
    if let Some(organize) = &summary.organize {
        println!(
            "Organized {} subject(s): {} moved, {} unclassified, {} quarantined, {} renamed, {} compressed",
            organize.subject_count,
            organize.moved,
            organize.unclassified,
            organize.quarantined,
            organize.renamed,
            organize.compressed,
        );
        if !organize.residue.is_empty() {
            eprintln!("Raw scan folders with residue:");
            for (dir, entries) in &organize.residue {
                eprintln!("- {} ({} entries)", dir.display(), entries.len());
            }
        }
        if !organize.structure_warnings.is_empty() {
            eprintln!("Layout warnings:");
            for warning in &organize.structure_warnings {
                eprintln!("- {warning}");
            }
        }
    }

    if let Some(enrich) = &summary.enrich {
        println!("Enriched dataset: {}", enrich.output_csv.display());
        if let Some(path) = &enrich.exclusion_log {
            println!("Exclusion log: {}", path.display());
        }
        if let Some(path) = &enrich.report_path {
            println!("Reconciliation report: {}", path.display());
        }
        print_subject_table(&enrich.report);
    }

    let errors = summary.errors();
    if !errors.is_empty() {
        eprintln!("Warnings:");
        for error in errors {
            eprintln!("- {error}");
        }
    }
}

fn print_subject_table(report: &ReconciliationReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Subject"),
        header_cell("Bound"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    for subject in &report.missing_subjects {
        table.add_row(vec![
            Cell::new(subject),
            dim_cell("-"),
            Cell::new("missing").fg(Color::Red),
        ]);
    }
    for (subject, scans) in &report.bound {
        let status = if report.subjects_with_gaps.contains(subject) {
            Cell::new("gaps").fg(Color::Yellow)
        } else {
            Cell::new("complete").fg(Color::Green)
        };
        table.add_row(vec![Cell::new(subject), Cell::new(scans.len()), status]);
    }
    // Subjects present on disk but with nothing bound at all.
    for subject in &report.subjects_with_gaps {
        if report.bound.contains_key(subject) {
            continue;
        }
        table.add_row(vec![
            Cell::new(subject),
            Cell::new(0),
            Cell::new("gaps").fg(Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.total_bound()).add_attribute(Attribute::Bold),
        dim_cell(format!(
            "{} subject(s), {} missing",
            report.total_subjects,
            report.missing_subjects.len()
        )),
    ]);
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

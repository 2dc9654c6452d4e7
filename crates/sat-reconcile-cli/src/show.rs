use anstyle::{AnsiColor, Color, Style};
use anyhow::Result;
use sat_reconcile::reconcile::{
    CancellationStatus, ComparisonRecord, ComparisonStatus, ReconcileConfig, ReconcileSummary,
};

const MISSING_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
const ONLY_SAT_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const MISMATCH_STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

pub fn show_diff(config: &ReconcileConfig) -> Result<()> {
    let state = config.read()?;
    let records = state.reconcile();
    let reset = Style::new();

    let mut current_section = None;
    for record in &records {
        let Some((title, style)) = section(record) else {
            continue;
        };
        if current_section != Some(title) {
            if current_section.is_some() {
                println!();
            }
            println!("{style}━━━ {title} ━━━{reset}");
            current_section = Some(title);
        }
        println!("{}", describe(record));
    }
    if current_section.is_some() {
        println!();
    }

    print_summary(&ReconcileSummary::from_records(&records));
    Ok(())
}

pub fn print_summary(summary: &ReconcileSummary) {
    let reset = Style::new();

    if summary.discrepancies() == 0 {
        println!("✓ All invoices match!");
        return;
    }

    println!("{}━━━ Summary ━━━{}", Style::new().bold(), reset);
    let missing = summary.count(ComparisonStatus::MissingInAuthority);
    if missing > 0 {
        println!("  {MISSING_STYLE}{missing}{reset} invoice(s) not found in SAT");
    }
    let only_sat = summary.count(ComparisonStatus::OnlyInAuthority);
    if only_sat > 0 {
        println!("  {ONLY_SAT_STYLE}{only_sat}{reset} invoice(s) only in SAT");
    }
    let mismatched = summary.cancellations(CancellationStatus::Mismatch);
    if mismatched > 0 {
        println!("  {MISMATCH_STYLE}{mismatched}{reset} invoice(s) with a cancellation mismatch");
    }
    println!(
        "  {} of {} invoice(s) match",
        summary.count(ComparisonStatus::Match),
        summary.total
    );
}

fn section(record: &ComparisonRecord) -> Option<(&'static str, Style)> {
    match (record.status, record.cancellation) {
        (ComparisonStatus::MissingInAuthority, _) => Some(("Not found in SAT", MISSING_STYLE)),
        (ComparisonStatus::OnlyInAuthority, _) => Some(("Only in SAT", ONLY_SAT_STYLE)),
        (ComparisonStatus::Match, CancellationStatus::Mismatch) => {
            Some(("Cancellation mismatch", MISMATCH_STYLE))
        }
        (ComparisonStatus::Match, _) => None,
    }
}

fn describe(record: &ComparisonRecord) -> String {
    let id = record
        .accounting_id
        .as_deref()
        .or(record.authority_id.as_deref())
        .unwrap_or_default();

    let mut line = format!("  {id}");
    if let Some(status) = record.payment_status.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!("  odoo: {status}"));
    }
    if let Some(status) = record.sat_status.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!("  sat: {status}"));
    }
    line
}

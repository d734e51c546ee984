//! Plain-text rendering of the lead table.

use shared::protocol::Lead;

const HEADERS: [&str; 6] = ["ID", "Full Name", "Position", "Company", "Location", "Profile"];

fn row(lead: &Lead) -> [String; 6] {
    [
        lead.id.to_string(),
        lead.full_name.clone(),
        lead.position.clone(),
        lead.company.clone(),
        lead.location.clone(),
        lead.profile_url.clone(),
    ]
}

pub fn render_table(leads: &[Lead]) -> String {
    let rows: Vec<[String; 6]> = leads.iter().map(row).collect();
    let mut widths = HEADERS.map(|header| header.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for cells in &rows {
        push_line(&mut out, cells.iter().map(String::as_str), &widths);
    }
    if rows.is_empty() {
        out.push_str("(no leads)\n");
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use client_core::repository::sample_leads;

    use super::*;

    #[test]
    fn renders_header_rule_and_rows_in_server_order() {
        let table = render_table(&sample_leads());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  Full Name"));
        assert!(lines[1].starts_with("--  ---------"));
        assert!(lines[2].starts_with("2   John doe Doe"));
        assert!(lines[2].ends_with("https://www.linkedin.com/in/johndoe"));
        assert!(lines[3].starts_with("3   Jane Smith"));
    }

    #[test]
    fn columns_line_up_across_rows() {
        let table = render_table(&sample_leads());
        let lines: Vec<&str> = table.lines().collect();
        let company_col = lines[0].find("Company").expect("company header");

        assert_eq!(lines[2].find("TechCorp International"), Some(company_col));
        assert_eq!(lines[3].find("Innovate Inc."), Some(company_col));
    }

    #[test]
    fn empty_collection_still_shows_headers() {
        let table = render_table(&[]);
        assert!(table.starts_with("ID  Full Name"));
        assert!(table.ends_with("(no leads)\n"));
    }
}

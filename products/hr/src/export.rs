//! CSV export of the current collection and the import template.
//!
//! Fields are written unquoted, so a comma inside a name or department
//! shifts that row's columns when re-imported.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use entity::Employee;

use crate::{HrError, HrResult};

pub const EXPORT_FILE_NAME: &str = "employees_export.csv";
pub const TEMPLATE_FILE_NAME: &str = "employee_upload_template.csv";
pub const HEADER: [&str; 4] = ["ID", "Name", "Department", "Salary"];

const TEMPLATE_ROWS: [[&str; 4]; 2] = [
    ["", "John Doe", "IT", "600000"],
    ["", "Jane Smith", "HR", "550000"],
];

/// Header plus one line per employee, no trailing newline.
pub fn export_csv(employees: &[Employee]) -> HrResult<String> {
    let rows = employees.iter().map(|e| {
        [
            e.id.to_string(),
            e.name.clone(),
            e.department.clone(),
            e.salary.to_string(),
        ]
    });
    write_unquoted(rows)
}

/// Two example rows in the four-column import layout.
pub fn template_csv() -> HrResult<String> {
    write_unquoted(TEMPLATE_ROWS)
}

fn write_unquoted<R, F>(rows: impl IntoIterator<Item = R>) -> HrResult<String>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| HrError::CsvOutput(err.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|err| HrError::CsvOutput(err.to_string()))?;
    Ok(text.trim_end_matches('\n').to_string())
}

//! CSV import reconciliation.
//!
//! Uploaded text is parsed into rows, each row becomes a create or an update
//! against the employee API, and per-row outcomes are tallied. Dispatch is
//! strictly sequential in row order and a failed row never aborts the batch.

use std::fmt;

use csv::{ReaderBuilder, StringRecord, Terminator};
use entity::{Employee, NewEmployee};
use platform_api::EmployeeApi;
use tracing::{debug, info, warn};

use crate::HrResult;

/// What the first line looked like.
///
/// Only decides whether line 0 is skipped; every data row picks its own
/// layout from its column count. A data row whose first cell is literally
/// `id` or `name` is taken for a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderLayout {
    /// `ID,Name,Department,Salary`
    WithId,
    /// `Name,Department,Salary`
    WithoutId,
    Absent,
}

impl HeaderLayout {
    fn detect(first: &StringRecord) -> Self {
        match first.get(0) {
            Some(cell) if cell.eq_ignore_ascii_case("id") => HeaderLayout::WithId,
            Some(cell) if cell.eq_ignore_ascii_case("name") => HeaderLayout::WithoutId,
            _ => HeaderLayout::Absent,
        }
    }

    fn data_start(self) -> usize {
        match self {
            HeaderLayout::Absent => 0,
            HeaderLayout::WithId | HeaderLayout::WithoutId => 1,
        }
    }
}

/// Raw cells of one data row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowCells {
    pub name: String,
    pub department: String,
    pub salary: String,
}

impl RowCells {
    /// Salaries keep their leading integer (`600000.50` is 600000); cells
    /// without one become 0.
    pub fn candidate(&self) -> NewEmployee {
        NewEmployee {
            name: self.name.trim().to_string(),
            department: self.department.trim().to_string(),
            salary: parse_leading_int(&self.salary).unwrap_or(0),
        }
    }
}

/// Leading integer of a cell: optional sign, then ASCII digits up to the
/// first other character. `None` when no digit follows the sign or the value
/// overflows `i64`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let text = raw.trim();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

/// Layout of a single row, chosen by its column count alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportRow {
    /// `id,name,department,salary`; extra trailing columns are ignored.
    FourColumn { raw_id: String, cells: RowCells },
    /// `name,department,salary`
    ThreeColumn(RowCells),
}

impl ImportRow {
    /// `None` for rows with fewer than three columns.
    pub fn from_record(record: &StringRecord) -> Option<Self> {
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
        match record.len() {
            0..=2 => None,
            3 => Some(ImportRow::ThreeColumn(RowCells {
                name: cell(0),
                department: cell(1),
                salary: cell(2),
            })),
            _ => Some(ImportRow::FourColumn {
                raw_id: cell(0),
                cells: RowCells {
                    name: cell(1),
                    department: cell(2),
                    salary: cell(3),
                },
            }),
        }
    }

    /// Rows whose id cell starts with an integer update that record;
    /// everything else creates.
    pub fn dispatch(&self) -> Dispatch {
        match self {
            ImportRow::FourColumn { raw_id, cells } => match parse_leading_int(raw_id) {
                Some(id) => Dispatch::Update(cells.candidate().with_id(id)),
                None => Dispatch::Create(cells.candidate()),
            },
            ImportRow::ThreeColumn(cells) => Dispatch::Create(cells.candidate()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Create(NewEmployee),
    Update(Employee),
}

impl Dispatch {
    async fn send<A: EmployeeApi>(&self, api: &A) -> platform_api::ApiResult<()> {
        match self {
            Dispatch::Create(fields) => api.create(fields).await.map(|_| ()),
            Dispatch::Update(employee) => api.update(employee).await.map(|_| ()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRow {
    /// Zero-based position among the non-blank lines, header included.
    pub row: usize,
    pub dispatch: Dispatch,
}

/// Parsed upload, ready to dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportPlan {
    /// Non-blank lines in the upload, header included.
    pub line_count: usize,
    pub header: HeaderLayout,
    pub rows: Vec<PlannedRow>,
    /// Data rows dropped for having fewer than three columns.
    pub skipped: usize,
}

impl ImportPlan {
    pub fn parse(text: &str) -> HrResult<Self> {
        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Ok(Self {
                line_count: 0,
                header: HeaderLayout::Absent,
                rows: Vec::new(),
                skipped: 0,
            });
        }

        let joined = lines.join("\n");
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(joined.as_bytes());
        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, _>>()?;

        let header = records
            .first()
            .map(HeaderLayout::detect)
            .unwrap_or(HeaderLayout::Absent);
        let mut rows = Vec::new();
        let mut skipped = 0;
        for (row, record) in records.iter().enumerate().skip(header.data_start()) {
            match ImportRow::from_record(record) {
                Some(parsed) => rows.push(PlannedRow {
                    row,
                    dispatch: parsed.dispatch(),
                }),
                None => {
                    debug!(row, columns = record.len(), "skipping short import row");
                    skipped += 1;
                }
            }
        }
        Ok(Self {
            line_count: records.len(),
            header,
            rows,
            skipped,
        })
    }

    /// True when the upload had no non-blank lines at all.
    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    /// Send every row in order, awaiting each before the next.
    pub async fn execute<A: EmployeeApi>(&self, api: &A) -> ImportOutcome {
        let mut outcome = ImportOutcome {
            skipped: self.skipped,
            ..ImportOutcome::default()
        };
        for planned in &self.rows {
            match planned.dispatch.send(api).await {
                Ok(()) => outcome.success_count += 1,
                Err(err) => {
                    warn!(row = planned.row, error = %err, "import row failed");
                    outcome.fail_count += 1;
                }
            }
        }
        info!(
            success = outcome.success_count,
            failed = outcome.fail_count,
            skipped = outcome.skipped,
            "csv import finished"
        );
        outcome
    }
}

/// Tally of one import run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    /// Short rows; counted in neither bucket.
    pub skipped: usize,
}

impl ImportOutcome {
    pub fn processed(&self) -> usize {
        self.success_count + self.fail_count
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} records: {} successful, {} failed.",
            self.processed(),
            self.success_count,
            self.fail_count
        )
    }
}

/// Parse `text` and push every row to `api`. Does not reload anything.
pub async fn reconcile<A: EmployeeApi>(api: &A, text: &str) -> HrResult<ImportOutcome> {
    let plan = ImportPlan::parse(text)?;
    Ok(plan.execute(api).await)
}

use std::mem;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use log::{debug, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::TranscriptError;
use crate::models::{Category, CellValue, Course, Semester, SemesterTotal, Snapshot, Transcript};

// Element id the portal gives to every per-level transcript table.
pub const TABLE_ID: &str = "transdetail";

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// The shape of one table row, decided by its cell count alone.
#[derive(Debug, PartialEq)]
pub enum RowKind<'a> {
    Category(&'a [String; 2]),
    Course(&'a [String; 9]),
    Total(&'a [String; 8]),
    SemesterBoundary,
    Unknown(usize),
}

pub fn classify(cells: &[String]) -> RowKind<'_> {
    if let Ok(cells) = <&[String; 2]>::try_from(cells) {
        return RowKind::Category(cells);
    }
    if let Ok(cells) = <&[String; 9]>::try_from(cells) {
        return RowKind::Course(cells);
    }
    if let Ok(cells) = <&[String; 8]>::try_from(cells) {
        return RowKind::Total(cells);
    }
    if cells.len() == 1 {
        return RowKind::SemesterBoundary;
    }
    RowKind::Unknown(cells.len())
}

pub fn build_course(cells: &[String; 9]) -> Course {
    let [code, title, credits, graded, grade, gp, percent, credit_points, gpa] = cells;
    Course {
        code: code.clone(),
        title: title.clone(),
        credits: CellValue::coerce(credits),
        graded: CellValue::coerce(graded),
        grade: CellValue::coerce(grade),
        gp: CellValue::coerce(gp),
        percent: CellValue::coerce(percent),
        credit_points: CellValue::coerce(credit_points),
        gpa: CellValue::coerce(gpa),
    }
}

pub fn build_category(cells: &[String; 2]) -> Category {
    let [code, title] = cells;
    Category {
        code: code.clone(),
        title: title.clone(),
        courses: Vec::new(),
    }
}

// The first cell is a label and is dropped. The rest must parse strictly.
pub fn build_total(level: u32, cells: &[String; 8]) -> Result<SemesterTotal, TranscriptError> {
    let [_label, credits, graded, grade, gp, percent, credit_points, gpa] = cells;
    Ok(SemesterTotal {
        credits: strict(level, "credits", credits)?,
        graded: strict(level, "graded", graded)?,
        grade: (!grade.is_empty()).then(|| grade.clone()),
        gp: strict(level, "gp", gp)?,
        percent: strict(level, "percent", percent)?,
        credit_points: strict(level, "credit_points", credit_points)?,
        gpa: strict(level, "gpa", gpa)?,
    })
}

fn strict<T: std::str::FromStr>(level: u32, field: &'static str, text: &str) -> Result<T, TranscriptError> {
    text.parse().map_err(|_| TranscriptError::InvalidTotal {
        level,
        field,
        value: text.to_string(),
    })
}

enum AssemblerState {
    BeforeFirstCategory,
    InSemester {
        closed: Vec<Category>,
        current: Category,
    },
}

// Walks the rows of one level's table and groups them into semesters.
// Categories accumulate until a total row closes the semester. A course
// always lands in the most recently opened category of the open semester.
pub struct TableAssembler {
    level: u32,
    state: AssemblerState,
    semesters: Vec<Semester>,
}

impl TableAssembler {
    pub fn new(level: u32) -> Self {
        TableAssembler {
            level,
            state: AssemblerState::BeforeFirstCategory,
            semesters: Vec::new(),
        }
    }

    pub fn feed(&mut self, row: usize, cells: &[String]) -> Result<(), TranscriptError> {
        match classify(cells) {
            RowKind::Category(cells) => {
                let category = build_category(cells);
                self.state = match mem::replace(&mut self.state, AssemblerState::BeforeFirstCategory) {
                    AssemblerState::BeforeFirstCategory => AssemblerState::InSemester {
                        closed: Vec::new(),
                        current: category,
                    },
                    AssemblerState::InSemester { mut closed, current } => {
                        closed.push(current);
                        AssemblerState::InSemester { closed, current: category }
                    }
                };
            }
            RowKind::Course(cells) => match &mut self.state {
                AssemblerState::InSemester { current, .. } => current.courses.push(build_course(cells)),
                AssemblerState::BeforeFirstCategory => warn!(
                    "Level {}: course row {} ({}) appears before any category, skipping it",
                    self.level, row, cells[0]
                ),
            },
            RowKind::Total(cells) => {
                let total = build_total(self.level, cells)?;
                let categories = self.take_categories();
                self.semesters.push(Semester {
                    categories,
                    total: Some(total),
                });
            }
            // A boundary only resets; it never closes a semester.
            RowKind::SemesterBoundary => {
                let dropped = self.take_categories();
                if !dropped.is_empty() {
                    warn!(
                        "Level {}: boundary row {} discards {} category row(s) that had no total",
                        self.level,
                        row,
                        dropped.len()
                    );
                }
            }
            RowKind::Unknown(count) => {
                debug!("Level {}: ignoring row {} with {} cells", self.level, row, count);
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Transcript {
        let pending = self.take_categories();
        if !pending.is_empty() {
            self.semesters.push(Semester {
                categories: pending,
                total: None,
            });
        }

        if self.semesters.len() > 2 {
            warn!(
                "Level {}: found {} semesters, keeping the first two",
                self.level,
                self.semesters.len()
            );
        }

        let mut semesters = self.semesters.into_iter();
        Transcript {
            level: self.level,
            first_semester: semesters.next().unwrap_or_default(),
            second_semester: semesters.next().unwrap_or_default(),
        }
    }

    fn take_categories(&mut self) -> Vec<Category> {
        match mem::replace(&mut self.state, AssemblerState::BeforeFirstCategory) {
            AssemblerState::BeforeFirstCategory => Vec::new(),
            AssemblerState::InSemester { mut closed, current } => {
                closed.push(current);
                closed
            }
        }
    }
}

// Assembles one table. The first row is the header and is always skipped.
pub fn assemble_table<R>(level: u32, rows: &[R]) -> Result<Transcript, TranscriptError>
where
    R: AsRef<[String]>,
{
    let mut assembler = TableAssembler::new(level);
    for (i, row) in rows.iter().enumerate().skip(1) {
        assembler.feed(i, row.as_ref())?;
    }
    Ok(assembler.finish())
}

fn selector(css: &str) -> Result<Selector, TranscriptError> {
    Selector::parse(css).map_err(|e| TranscriptError::Selector(e.to_string()))
}

fn cell_text(cell: ElementRef) -> String {
    let raw: String = cell.text().collect();
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

// Pulls the cell texts of every transcript table out of the page, in
// document order.
pub fn extract_tables(html: &str) -> Result<Vec<Vec<Vec<String>>>, TranscriptError> {
    let document = Html::parse_document(html);
    let table_selector = selector(&format!("#{}", TABLE_ID))?;
    let tr_selector = selector("tr")?;
    let td_selector = selector("td")?;

    let tables = document
        .select(&table_selector)
        .map(|table| {
            table
                .select(&tr_selector)
                .map(|tr| tr.select(&td_selector).map(cell_text).collect())
                .collect()
        })
        .collect();
    Ok(tables)
}

// Parses every transcript table on the page into a snapshot taken at `captured_at`.
pub fn parse_snapshot(html: &str, captured_at: NaiveDateTime) -> Result<Snapshot, TranscriptError> {
    let transcripts = extract_tables(html)?
        .iter()
        .enumerate()
        .map(|(i, rows)| assemble_table(i as u32 + 1, rows))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Snapshot::new(captured_at, transcripts))
}

//! Consolidated export workbook assembly.
//!
//! Builds the summary `.xlsx` by hand: one worksheet of inline strings
//! inside a minimal OOXML package. Cell values never go through shared
//! strings or styles, which keeps the package to five parts.

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::{Result, SpreadsheetError};
use crate::record::ProfileRecord;

/// Sheet name of the consolidated export.
pub const EXPORT_SHEET_NAME: &str = "学员画像汇总";

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

struct ExportColumn {
    header: &'static str,
    value: fn(&ProfileRecord) -> Option<&str>,
}

/// Column layout of the consolidated export. The order is fixed; downstream
/// reporting reads these positionally.
const EXPORT_COLUMNS: &[ExportColumn] = &[
    ExportColumn {
        header: "文件名",
        value: |r| Some(r.file_name.as_str()),
    },
    ExportColumn {
        header: "学员姓名",
        value: |r| r.fields.name.as_deref(),
    },
    ExportColumn {
        header: "性别",
        value: |r| r.fields.gender.as_deref(),
    },
    ExportColumn {
        header: "所报套餐名称",
        value: |r| r.fields.package_name.as_deref(),
    },
    ExportColumn {
        header: "单独报名课程",
        value: |r| r.fields.single_course.as_deref(),
    },
    ExportColumn {
        header: "学生电话",
        value: |r| r.fields.phone.as_deref(),
    },
    ExportColumn {
        header: "家长电话",
        value: |r| r.fields.parent_phone.as_deref(),
    },
    ExportColumn {
        header: "学校",
        value: |r| r.fields.school.as_deref(),
    },
    ExportColumn {
        header: "年级",
        value: |r| r.fields.grade.as_deref(),
    },
    ExportColumn {
        header: "意向国家",
        value: |r| r.fields.target_country.as_deref(),
    },
    ExportColumn {
        header: "留学阶段",
        value: |r| r.fields.target_degree.as_deref(),
    },
    ExportColumn {
        header: "目标分数",
        value: |r| r.fields.target_score.as_deref(),
    },
    ExportColumn {
        header: "递交成绩时间",
        value: |r| r.fields.submission_time.as_deref(),
    },
    ExportColumn {
        header: "实考成绩",
        value: |r| r.fields.current_score.as_deref(),
    },
    ExportColumn {
        header: "考试账号",
        value: |r| r.fields.account_info.as_deref(),
    },
    ExportColumn {
        header: "入学测试成绩",
        value: |r| r.fields.entry_test_score.as_deref(),
    },
    ExportColumn {
        header: "四六级成绩",
        value: |r| r.fields.cet_score.as_deref(),
    },
    ExportColumn {
        header: "生源地",
        value: |r| r.fields.origin.as_deref(),
    },
    ExportColumn {
        header: "是否脱产",
        value: |r| r.fields.is_full_time.as_deref(),
    },
    ExportColumn {
        header: "报名日期",
        value: |r| r.fields.enrollment_date.as_deref(),
    },
    ExportColumn {
        header: "报名金额",
        value: |r| r.fields.enrollment_amount.as_deref(),
    },
    ExportColumn {
        header: "报名折扣",
        value: |r| r.fields.discount.as_deref(),
    },
    ExportColumn {
        header: "是否KOL",
        value: |r| r.fields.is_kol.as_deref(),
    },
    ExportColumn {
        header: "课程规划方案",
        value: |r| r.fields.course_plan.as_deref(),
    },
    ExportColumn {
        header: "学员画像/性格",
        value: |r| r.fields.student_personality.as_deref(),
    },
    ExportColumn {
        header: "方便上课时间",
        value: |r| r.fields.class_time_preference.as_deref(),
    },
    ExportColumn {
        header: "考试计划",
        value: |r| r.fields.exam_plan.as_deref(),
    },
    ExportColumn {
        header: "特殊要求",
        value: |r| r.fields.special_requests.as_deref(),
    },
    ExportColumn {
        header: "校区",
        value: |r| r.fields.campus.as_deref(),
    },
    ExportColumn {
        header: "顾问",
        value: |r| r.fields.consultant.as_deref(),
    },
    ExportColumn {
        header: "学管",
        value: |r| r.fields.study_manager.as_deref(),
    },
    ExportColumn {
        header: "处理状态",
        value: |r| Some(r.status.export_label()),
    },
];

/// Builds the consolidated export workbook from a batch's records.
///
/// The sheet holds one header row plus one row per record, in record
/// order. Fields that were never extracted export as blank cells; the
/// final column carries the localized outcome label.
pub fn write_records(records: &[ProfileRecord]) -> Result<Vec<u8>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(
        EXPORT_COLUMNS
            .iter()
            .map(|column| column.header.to_string())
            .collect(),
    );
    for record in records {
        rows.push(
            EXPORT_COLUMNS
                .iter()
                .map(|column| (column.value)(record).unwrap_or_default().to_string())
                .collect(),
        );
    }
    write_sheet(EXPORT_SHEET_NAME, &rows)
}

/// Builds a single-sheet workbook from raw rows.
///
/// Empty cells are omitted from the sheet XML; readers see them as blank.
pub fn write_sheet(sheet_name: &str, rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let workbook = workbook_xml(sheet_name)?;
    let sheet = worksheet_xml(rows)?;
    build_container(&workbook, &sheet)
}

/// Default file name of the export: 学员画像汇总_全字段_<date>.xlsx.
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("学员画像汇总_全字段_{}.xlsx", date.format("%Y-%m-%d"))
}

fn worksheet_xml(rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    emit(&mut writer, Event::Start(worksheet))?;
    emit(&mut writer, Event::Start(BytesStart::new("sheetData")))?;

    for (row_index, cells) in rows.iter().enumerate() {
        let row_number = row_index + 1;
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", row_number.to_string().as_str()));
        emit(&mut writer, Event::Start(row))?;

        for (column_index, value) in cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let reference = format!("{}{}", column_reference(column_index), row_number);
            let mut cell = BytesStart::new("c");
            cell.push_attribute(("r", reference.as_str()));
            cell.push_attribute(("t", "inlineStr"));
            emit(&mut writer, Event::Start(cell))?;
            emit(&mut writer, Event::Start(BytesStart::new("is")))?;

            let mut text = BytesStart::new("t");
            if needs_space_preserve(value) {
                text.push_attribute(("xml:space", "preserve"));
            }
            emit(&mut writer, Event::Start(text))?;
            emit(&mut writer, Event::Text(BytesText::new(value)))?;
            emit(&mut writer, Event::End(BytesEnd::new("t")))?;

            emit(&mut writer, Event::End(BytesEnd::new("is")))?;
            emit(&mut writer, Event::End(BytesEnd::new("c")))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("row")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("sheetData")))?;
    emit(&mut writer, Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut workbook = BytesStart::new("workbook");
    workbook.push_attribute(("xmlns", SPREADSHEET_NS));
    workbook.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
    emit(&mut writer, Event::Start(workbook))?;
    emit(&mut writer, Event::Start(BytesStart::new("sheets")))?;

    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", sheet_name));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    emit(&mut writer, Event::Empty(sheet))?;

    emit(&mut writer, Event::End(BytesEnd::new("sheets")))?;
    emit(&mut writer, Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner())
}

fn build_container(workbook: &[u8], sheet: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];
    for (name, bytes) in parts {
        archive
            .start_file(name, options)
            .map_err(|e| SpreadsheetError::Build(format!("Failed to start entry '{}': {}", name, e)))?;
        archive
            .write_all(bytes)
            .map_err(|e| SpreadsheetError::Build(format!("Failed to write entry '{}': {}", name, e)))?;
    }

    let cursor = archive
        .finish()
        .map_err(|e| SpreadsheetError::Build(format!("Failed to finalize archive: {}", e)))?;
    Ok(cursor.into_inner())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SpreadsheetError::Build(format!("Failed to write XML event: {}", e)))
}

/// Leading/trailing whitespace and line breaks survive only with an
/// explicit xml:space hint.
fn needs_space_preserve(value: &str) -> bool {
    value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.contains('\n')
}

/// Converts a zero-based column index to its A1-style name.
fn column_reference(index: usize) -> String {
    let mut n = index + 1;
    let mut name = String::new();
    while n > 0 {
        let remainder = (n - 1) % 26;
        name.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }
    name
}

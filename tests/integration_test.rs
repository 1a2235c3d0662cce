//! Integration tests for inventory-convert

use inventory_convert::streaming_reader::StreamingReader;
use inventory_convert::types::CellValue;
use inventory_convert::{Category, ConvertError, ConvertOptions, Converter, SheetSelector};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const HEADER_LINE: &str =
    "category,name,manufacturer,part_number,quantity,weight_g,cost_usd,link,notes\r\n";

enum Cell<'a> {
    Str(&'a str),
    Num(&'a str),
    Blank,
}

use Cell::{Blank, Num, Str};

struct Sheet<'a> {
    name: &'a str,
    dimension: Option<&'a str>,
    rows: Vec<Vec<Cell<'a>>>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    if let Some(dimension) = sheet.dimension {
        xml.push_str(&format!(r#"<dimension ref="{}"/>"#, dimension));
    }
    xml.push_str("<sheetData>");
    for (r, cells) in sheet.rows.iter().enumerate() {
        let number = r + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, number));
        for (c, cell) in cells.iter().enumerate() {
            let reference = format!("{}{}", column_letter(c), number);
            match cell {
                Str(text) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference,
                    escape(text)
                )),
                Num(value) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value))
                }
                Blank => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_xlsx(path: &Path, sheets: &[Sheet], active_tab: Option<usize>) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);

    zip.start_file("[Content_Types].xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();

    let view = active_tab
        .map(|tab| format!(r#"<bookViews><workbookView activeTab="{}"/></bookViews>"#, tab))
        .unwrap_or_default();
    let mut workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}<sheets>"#,
        view
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(sheet.name),
            i + 1,
            i + 1
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    zip.start_file("xl/workbook.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(workbook.as_bytes()).unwrap();
    zip.start_file("xl/_rels/workbook.xml.rels", SimpleFileOptions::default()).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(sheet_xml(sheet).as_bytes()).unwrap();
    }

    zip.finish().unwrap();
}

fn header_row<'a>() -> Vec<Cell<'a>> {
    vec![
        Str("Category"),
        Str("Component"),
        Str("Item"),
        Str("Qty"),
        Str("Link"),
    ]
}

fn quiet() -> Converter {
    Converter::new(ConvertOptions::new().quiet(true))
}

fn paths(dir: &TempDir) -> (PathBuf, PathBuf) {
    (
        dir.path().join("inventory.xlsx"),
        dir.path().join("parts.csv"),
    )
}

#[test]
fn test_convert_inventory() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[Sheet {
            name: "Inventory",
            dimension: Some("A1:E6"),
            rows: vec![
                header_row(),
                vec![Str("UAS"), Str("ESC"), Str("Hobbywing 40A"), Num("2"), Str("http://x")],
                vec![Str("FAB"), Str("Filament"), Str("PLA 1kg"), Str("5.5"), Str("")],
                vec![Str("UAS"), Str("Motor"), Blank, Num("4")],
                vec![Blank, Str("Glue"), Str("CA thin"), Num("1")],
                vec![Str("UAS"), Str("Radio Receiver"), Str("  ELRS 2.4GHz  "), Blank],
            ],
        }],
        None,
    );

    let summary = quiet().convert(&input, &output).unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.rows_seen, 5);
    assert_eq!(summary.rows_skipped, 2);
    assert_eq!(summary.count(Category::Esc), 1);
    assert_eq!(summary.count(Category::Accessory), 1);
    assert_eq!(summary.count(Category::Radio), 1);

    let csv = std::fs::read_to_string(&output).unwrap();
    let expected = format!(
        "{}{}{}{}",
        HEADER_LINE,
        "esc,Hobbywing 40A,,,2,,,http://x,UAS/ESC\r\n",
        "accessory,PLA 1kg,,,5,,,,FAB/Filament\r\n",
        "radio,ELRS 2.4GHz,,,1,,,,UAS/Radio Receiver\r\n",
    );
    assert_eq!(csv, expected);
}

#[test]
fn test_header_only_when_no_rows() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[Sheet {
            name: "Sheet1",
            dimension: Some("A1:E1"),
            rows: vec![header_row()],
        }],
        None,
    );

    let summary = quiet().convert(&input, &output).unwrap();
    assert_eq!(summary.records, 0);
    assert!(summary.breakdown().is_empty());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), HEADER_LINE);
}

#[test]
fn test_narrow_sheet_produces_no_records() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[Sheet {
            name: "Sheet1",
            dimension: Some("A1:C3"),
            rows: vec![
                vec![Str("Category"), Str("Component"), Str("Item")],
                vec![Str("UAS"), Str("ESC"), Str("Hobbywing 40A")],
                vec![Str("UAS"), Str("Frame"), Str("Source One")],
            ],
        }],
        None,
    );

    let summary = quiet().convert(&input, &output).unwrap();
    assert_eq!(summary.records, 0);
    assert_eq!(summary.rows_skipped, 2);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), HEADER_LINE);
}

#[test]
fn test_short_row_padded_to_widest_row() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[Sheet {
            name: "Sheet1",
            dimension: None,
            rows: vec![
                header_row(),
                vec![Str("UAS"), Str("Battery"), Str("4S 1500mAh")],
                vec![Str("UAS"), Str("Battery"), Str("6S 1100mAh"), Num("3")],
            ],
        }],
        None,
    );

    let summary = quiet().convert(&input, &output).unwrap();
    assert_eq!(summary.records, 2);
    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        format!(
            "{}{}{}",
            HEADER_LINE,
            "battery,4S 1500mAh,,,1,,,,UAS/Battery\r\n",
            "battery,6S 1100mAh,,,3,,,,UAS/Battery\r\n",
        )
    );
}

#[test]
fn test_stale_dimension_is_ignored() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[Sheet {
            name: "Sheet1",
            dimension: Some("A1:C2"),
            rows: vec![
                header_row(),
                vec![Str("UAS"), Str("Radio"), Str("TX16S")],
            ],
        }],
        None,
    );

    let summary = quiet().convert(&input, &output).unwrap();
    assert_eq!(summary.records, 1);
    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.ends_with("radio,TX16S,,,1,,,,UAS/Radio\r\n"));
}

#[test]
fn test_active_sheet_is_default() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[
            Sheet {
                name: "Readme",
                dimension: None,
                rows: vec![vec![Str("Exported from the stock tracker")]],
            },
            Sheet {
                name: "Parts",
                dimension: Some("A1:E2"),
                rows: vec![
                    header_row(),
                    vec![Str("UAS"), Str("Camera"), Str("Caddx Ratel"), Num("1")],
                ],
            },
        ],
        Some(1),
    );

    let summary = quiet().convert(&input, &output).unwrap();
    assert_eq!(summary.records, 1);
    assert_eq!(summary.count(Category::Sensor), 1);

    // explicit selection overrides the active tab
    let converter = Converter::new(
        ConvertOptions::new()
            .quiet(true)
            .sheet(SheetSelector::Name("Readme".to_string())),
    );
    assert_eq!(converter.convert(&input, &output).unwrap().records, 0);

    let converter = Converter::new(
        ConvertOptions::new()
            .quiet(true)
            .sheet(SheetSelector::Name("Stock".to_string())),
    );
    let err = converter.convert(&input, &output).unwrap_err();
    assert!(matches!(err, ConvertError::SheetNotFound { .. }));
}

#[test]
fn test_csv_quoting() {
    let dir = TempDir::new().unwrap();
    let (input, output) = paths(&dir);

    write_xlsx(
        &input,
        &[Sheet {
            name: "Sheet1",
            dimension: Some("A1:E2"),
            rows: vec![
                header_row(),
                vec![
                    Str("UAS"),
                    Str("Frame, 5\""),
                    Str("Source One \"V5\", 5 inch"),
                    Num("1"),
                    Str("https://shop.example/p?a=1&b=2"),
                ],
            ],
        }],
        None,
    );

    quiet().convert(&input, &output).unwrap();
    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        format!(
            "{}airframe,\"Source One \"\"V5\"\", 5 inch\",,,1,,,https://shop.example/p?a=1&b=2,\"UAS/Frame, 5\"\"\"\r\n",
            HEADER_LINE
        )
    );
}

#[test]
fn test_shared_strings() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("shared.xlsx");

    let sst = concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sst count="3" uniqueCount="3">"#,
        r#"<si><t>UAS</t></si>"#,
        r#"<si><r><rPr><b/></rPr><t xml:space="preserve">Flight </t></r><r><t>Controller</t></r></si>"#,
        r#"<si><t>Matek H743 &amp; GPS</t></si>"#,
        r#"</sst>"#
    );
    let sheet = concat!(
        r#"<worksheet><dimension ref="A1:D2"/><sheetData>"#,
        r#"<row r="2"><c r="A2" t="s"><v>0</v></c><c r="B2" t="s"><v>1</v></c><c r="C2" t="s"><v>2</v></c><c r="D2"><v>1</v></c></row>"#,
        r#"</sheetData></worksheet>"#
    );

    let file = std::fs::File::create(&input).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("xl/workbook.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(br#"<workbook><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#)
        .unwrap();
    zip.start_file("xl/_rels/workbook.xml.rels", SimpleFileOptions::default()).unwrap();
    zip.write_all(br#"<Relationships><Relationship Id="rId1" Target="/xl/worksheets/sheet1.xml"/></Relationships>"#)
        .unwrap();
    zip.start_file("xl/sharedStrings.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(sst.as_bytes()).unwrap();
    zip.start_file("xl/worksheets/sheet1.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(sheet.as_bytes()).unwrap();
    zip.finish().unwrap();

    let mut reader = StreamingReader::open(&input).unwrap();
    assert_eq!(reader.sheet_names().to_vec(), vec!["Sheet1".to_string()]);

    let rows: Vec<_> = reader
        .rows_by_index(0)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].number(), 2);
    assert_eq!(
        rows[0].cells,
        vec![
            CellValue::from("UAS"),
            CellValue::from("Flight Controller"),
            CellValue::from("Matek H743 & GPS"),
            CellValue::Int(1),
        ]
    );

    let conversion = quiet()
        .convert_rows(reader.rows_by_index(0).unwrap())
        .unwrap();
    assert_eq!(conversion.records[0].category, Category::FlightController);
    assert_eq!(conversion.records[0].notes, "UAS/Flight Controller");
}

#[test]
fn test_preflight_errors() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("parts.csv");

    let err = quiet()
        .convert(dir.path().join("missing.xlsx"), &output)
        .unwrap_err();
    assert!(matches!(err, ConvertError::InputNotFound(_)));

    let csv_input = dir.path().join("inventory.csv");
    std::fs::write(&csv_input, "UAS,ESC,Hobbywing,1\n").unwrap();
    let err = quiet().convert(&csv_input, &output).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFormat(_)));

    assert!(!output.exists());
}

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// A one-page bill with an overview table, a historical table and a service
/// number line. Cells are separated by two spaces so they read back as tables.
pub const SAMPLE_BILL: &[&str] = &[
    "COMISION FEDERAL DE ELECTRICIDAD",
    "NO. DE SERVICIO 123456789012",
    "JUAN PEREZ LOPEZ",
    "Current Reading  12,765",
    "Previous Reading  12,345",
    "Energy Used (kWh)  420",
    "HISTORY",
    "Period  kWh  Amount  Payment",
    "2024-01  1,200  500.00  500.00",
    "2023-11  900  410.00  410.00",
    "2023-09  n/a  0.00  0.00",
];

fn build_document(pages: &[Vec<&str>]) -> Result<Document, Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![40.into(), 800.into()]),
        ];

        for (index, line) in lines.iter().enumerate() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            if index + 1 < lines.len() {
                operations.push(Operation::new("T*", vec![]));
            }
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

pub fn create_test_pdf(path: &Path, pages: &[Vec<&str>]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = build_document(pages)?;
    doc.save(path)?;
    Ok(())
}

pub fn test_pdf_bytes(pages: &[Vec<&str>]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = build_document(pages)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

pub fn read_csv_rows(csv: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv.as_bytes())
        .records()
        .map(|record| {
            record
                .expect("CSV record should parse")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Rows of the section that starts with `label`, up to the next section label.
pub fn section_rows(rows: &[Vec<String>], label: &str) -> Vec<Vec<String>> {
    const LABELS: [&str; 4] = [
        "General Information",
        "Energy Costs",
        "Historical Consumption",
        "Payment History",
    ];

    rows.iter()
        .skip_while(|row| row.first().map(String::as_str) != Some(label))
        .skip(1)
        .take_while(|row| {
            !(row.len() == 2
                && row[1].is_empty()
                && LABELS.contains(&row[0].as_str()))
        })
        .cloned()
        .collect()
}

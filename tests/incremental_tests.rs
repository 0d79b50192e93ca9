//! Incremental updates: stacked bodies, xref sections and trailers.

use pdf_spine::{ObjectId, PdfParser, PdfReference, PdfValue};

struct IncrementalPdf {
    data: Vec<u8>,
    xref1_offset: u64,
    xref2_offset: u64,
}

/// A minimal document followed by one update revision that adds a second
/// generation of the Pages node and re-points nothing else.
fn build_incremental_pdf() -> IncrementalPdf {
    let mut pdf = String::new();
    pdf.push_str("%PDF-1.4\n");

    let obj1_offset = pdf.len();
    pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    let obj2_offset = pdf.len();
    pdf.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    let obj3_offset = pdf.len();
    pdf.push_str("3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 200] >>\nendobj\n");

    let xref1_offset = pdf.len();
    pdf.push_str("xref\n0 4\n");
    pdf.push_str("0000000000 65535 f \n");
    pdf.push_str(&format!("{:010} 00000 n \n", obj1_offset));
    pdf.push_str(&format!("{:010} 00000 n \n", obj2_offset));
    pdf.push_str(&format!("{:010} 00000 n \n", obj3_offset));
    pdf.push_str("trailer\n<< /Size 4 /Root 1 0 R >>\n");
    pdf.push_str(&format!("startxref\n{}\n%%EOF\n", xref1_offset));

    let obj2_gen1_offset = pdf.len();
    pdf.push_str("2 1 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 /Updated true >>\nendobj\n");

    let xref2_offset = pdf.len();
    pdf.push_str("xref\n2 1\n");
    pdf.push_str(&format!("{:010} 00001 n \n", obj2_gen1_offset));
    pdf.push_str(&format!(
        "trailer\n<< /Size 4 /Root 1 0 R /Prev {} >>\n",
        xref1_offset
    ));
    pdf.push_str(&format!("startxref\n{}\n%%EOF\n", xref2_offset));

    IncrementalPdf {
        data: pdf.into_bytes(),
        xref1_offset: xref1_offset as u64,
        xref2_offset: xref2_offset as u64,
    }
}

#[test]
fn test_both_generations_stay_addressable() {
    let pdf = build_incremental_pdf();
    let document = PdfParser::new()
        .parse_bytes(&pdf.data)
        .expect("parse incremental pdf");

    assert_eq!(document.objects().len(), 4);

    let mut resolver = document.resolver();
    let old = resolver
        .resolve_shallow(&PdfReference::new(2, 0))
        .expect("first generation");
    assert!(old.value.as_dict().unwrap().get("Updated").is_none());

    let new = resolver
        .resolve_shallow(&PdfReference::new(2, 1))
        .expect("second generation");
    assert_eq!(
        new.value.as_dict().unwrap().get("Updated"),
        Some(&PdfValue::Boolean(true))
    );

    assert_eq!(
        document.objects().latest(2).unwrap().id,
        ObjectId::new(2, 1)
    );
}

#[test]
fn test_trailers_recorded_in_file_order() {
    let pdf = build_incremental_pdf();
    let document = PdfParser::new().parse_bytes(&pdf.data).unwrap();

    let trailers = document.trailers();
    assert_eq!(trailers.len(), 2);
    assert_eq!(trailers[0].prev, None);
    assert_eq!(trailers[0].startxref, Some(pdf.xref1_offset));
    assert_eq!(trailers[1].prev, Some(pdf.xref1_offset));
    assert_eq!(trailers[1].startxref, Some(pdf.xref2_offset));

    // The head trailer is the last-written one.
    assert_eq!(document.trailer().prev, Some(pdf.xref1_offset));
}

#[test]
fn test_xref_sections_merge_latest_wins() {
    let pdf = build_incremental_pdf();
    let document = PdfParser::new().parse_bytes(&pdf.data).unwrap();

    let xref = document.xref();
    assert_eq!(xref.len(), 4);
    // The update revision shadows object 2's row.
    let entry = xref.get(2).expect("object 2 entry");
    assert_eq!(entry.generation, 1);
    assert!(entry.in_use);
    // Untouched rows keep their first-revision offsets.
    assert_eq!(xref.get(0).map(|e| e.in_use), Some(false));
}

#[test]
fn test_pages_follow_the_head_trailer() {
    let pdf = build_incremental_pdf();
    let document = PdfParser::new().parse_bytes(&pdf.data).unwrap();

    // The catalog still points at 2 0 R, so the original Pages node
    // drives the walk even though a newer generation exists.
    let pages = document.pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].object_ref, PdfReference::new(3, 0));
    assert_eq!(pages[0].media_box.as_array(), [0.0, 0.0, 200.0, 200.0]);
}

#[test]
fn test_update_can_repoint_the_catalog() {
    // A second revision that replaces the catalog so the head trailer's
    // root leads to a different page tree.
    let mut pdf = String::new();
    pdf.push_str("%PDF-1.4\n");
    pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    pdf.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    pdf.push_str("3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 100 100] >>\nendobj\n");
    pdf.push_str("trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n9\n%%EOF\n");
    // The update rebuilds the tree under new object numbers.
    pdf.push_str("4 0 obj\n<< /Type /Catalog /Pages 5 0 R >>\nendobj\n");
    pdf.push_str("5 0 obj\n<< /Type /Pages /Kids [6 0 R] /Count 1 >>\nendobj\n");
    pdf.push_str("6 0 obj\n<< /Type /Page /Parent 5 0 R /MediaBox [0 0 400 400] >>\nendobj\n");
    pdf.push_str("trailer\n<< /Size 7 /Root 4 0 R /Prev 9 >>\nstartxref\n99\n%%EOF\n");

    let document = PdfParser::new().parse_bytes(pdf.as_bytes()).unwrap();
    assert_eq!(document.trailer().root, PdfReference::new(4, 0));

    let pages = document.pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].object_ref, PdfReference::new(6, 0));
    assert_eq!(pages[0].media_box.as_array(), [0.0, 0.0, 400.0, 400.0]);
}

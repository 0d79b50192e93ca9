//! Whole-file parsing: header, bodies, xref sections, trailers.

use pdf_spine::{
    ObjectId, OnCycle, PdfError, PdfParser, PdfReference, PdfValue, ResolveMode,
    StructuralErrorKind,
};

/// The minimal five-object document: catalog, pages, page, content
/// stream, font.
fn minimal_pdf() -> (Vec<u8>, usize) {
    let content = "BT /F1 24 Tf 72 712 Td (Hello, world) Tj ET";
    let mut pdf = String::new();
    pdf.push_str("%PDF-1.7\n");

    let mut offsets = Vec::new();
    offsets.push(pdf.len());
    pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    offsets.push(pdf.len());
    pdf.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    offsets.push(pdf.len());
    pdf.push_str(
        "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>\nendobj\n",
    );
    offsets.push(pdf.len());
    pdf.push_str(&format!(
        "4 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
        content.len(),
        content
    ));
    offsets.push(pdf.len());
    pdf.push_str("5 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n");

    let xref_offset = pdf.len();
    pdf.push_str("xref\n0 6\n");
    pdf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str("trailer\n<< /Size 6 /Root 1 0 R >>\n");
    pdf.push_str(&format!("startxref\n{}\n%%EOF\n", xref_offset));

    (pdf.into_bytes(), xref_offset)
}

#[test]
fn test_minimal_document() {
    let (data, xref_offset) = minimal_pdf();
    let document = PdfParser::new().parse_bytes(&data).expect("parse");

    assert_eq!(document.version().to_string(), "1.7");
    assert_eq!(document.objects().len(), 5);
    assert_eq!(document.trailers().len(), 1);

    let trailer = document.trailer();
    assert_eq!(trailer.size, 6);
    assert_eq!(trailer.root, PdfReference::new(1, 0));
    assert_eq!(trailer.startxref, Some(xref_offset as u64));
    assert!(trailer.info.is_none());
    assert!(!trailer.is_encrypted());
}

#[test]
fn test_minimal_document_xref() {
    let (data, _) = minimal_pdf();
    let document = PdfParser::new().parse_bytes(&data).expect("parse");

    let xref = document.xref();
    assert_eq!(xref.len(), 6);
    assert!(xref.has_valid_free_list_head());
    assert_eq!(xref.in_use_count(), 5);

    // Offsets point at the object headers.
    for number in 1..=5u32 {
        let entry = xref.get(number).expect("entry");
        assert!(entry.in_use);
        let header = format!("{} 0 obj", number);
        assert!(
            data[entry.offset as usize..].starts_with(header.as_bytes()),
            "xref offset for object {} does not hit its header",
            number
        );
    }
}

#[test]
fn test_object_values_survive_parsing() {
    let (data, _) = minimal_pdf();
    let document = PdfParser::new().parse_bytes(&data).expect("parse");

    let catalog = document
        .objects()
        .get_pair(1, 0)
        .expect("catalog object");
    let dict = catalog.value.as_dict().unwrap();
    assert_eq!(dict.type_name().unwrap().as_str(), "Catalog");
    assert_eq!(
        dict.get("Pages"),
        Some(&PdfValue::Reference(PdfReference::new(2, 0)))
    );

    let stream_object = document.objects().get_pair(4, 0).expect("content stream");
    let stream = stream_object.value.as_stream().unwrap();
    assert_eq!(stream.declared_length(), Some(stream.len() as i64));
    assert!(stream.data().starts_with(b"BT /F1"));
}

#[test]
fn test_deep_resolution_of_pages_node() {
    let (data, _) = minimal_pdf();
    let document = PdfParser::new().parse_bytes(&data).expect("parse");
    let mut resolver = document.resolver();

    let pages = resolver
        .resolve(
            &PdfReference::new(2, 0),
            ResolveMode::Deep,
            OnCycle::Silent,
        )
        .expect("pages node");
    let dict = pages.value.as_dict().unwrap();
    assert_eq!(dict.type_name().unwrap().as_str(), "Pages");

    let kids = dict.get("Kids").unwrap().as_array().unwrap();
    assert_eq!(kids.len(), 1);
    let kid = kids[0].as_indirect().expect("resolved kid");
    assert_eq!(kid.id, ObjectId::new(3, 0));
    assert_eq!(
        kid.value.unwrap_indirect().as_dict().unwrap().type_name().unwrap().as_str(),
        "Page"
    );
}

#[test]
fn test_info_dictionary_and_catalog_version() {
    let data = b"%PDF-1.4\n\
        1 0 obj << /Type /Catalog /Pages 2 0 R /Version /1.6 >> endobj\n\
        2 0 obj << /Type /Pages /Kids [] /Count 0 >> endobj\n\
        3 0 obj << /Producer (pdf-spine tests) >> endobj\n\
        trailer << /Size 4 /Root 1 0 R /Info 3 0 R /ID [<DEADBEEF> <CAFE>] >>\nstartxref\n9\n%%EOF";
    let document = PdfParser::new().parse_bytes(data).expect("parse");
    let mut resolver = document.resolver();

    let id = document.trailer().id.as_ref().expect("file ID");
    assert_eq!(id[0].as_bytes(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(id[1].as_bytes(), &[0xCA, 0xFE]);

    let info = document
        .info_dict(&mut resolver)
        .expect("resolve info")
        .expect("info dict present");
    assert_eq!(
        info.get("Producer").unwrap().as_string().unwrap().as_bytes(),
        b"pdf-spine tests"
    );

    // The catalog /Version is later than the header and wins.
    assert_eq!(document.version().to_string(), "1.4");
    assert_eq!(document.effective_version(&mut resolver).to_string(), "1.6");

    let catalog = document.catalog(&mut resolver).expect("catalog");
    assert_eq!(catalog.type_name().unwrap().as_str(), "Catalog");
}

#[test]
fn test_header_preamble_is_tolerated() {
    let (mut data, _) = minimal_pdf();
    let mut with_preamble = b"\x00\x01binary junk\x02".to_vec();
    with_preamble.append(&mut data);
    let document = PdfParser::new().parse_bytes(&with_preamble).expect("parse");
    assert_eq!(document.version().to_string(), "1.7");
    assert_eq!(document.objects().len(), 5);
}

#[test]
fn test_missing_trailer_is_fatal() {
    let data = b"%PDF-1.4\n1 0 obj null endobj\n";
    let err = PdfParser::new().parse_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        PdfError::Structural {
            kind: StructuralErrorKind::MissingTrailer,
            ..
        }
    ));
}

#[test]
fn test_trailer_without_root_is_fatal() {
    let data = b"%PDF-1.4\n1 0 obj null endobj\ntrailer\n<< /Size 2 >>\nstartxref\n9\n%%EOF";
    let err = PdfParser::new().parse_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        PdfError::Structural {
            kind: StructuralErrorKind::MissingTrailerKey("Root"),
            ..
        }
    ));
}

#[test]
fn test_trailer_without_size_is_fatal() {
    let data = b"%PDF-1.4\n1 0 obj null endobj\ntrailer\n<< /Root 1 0 R >>\nstartxref\n9\n%%EOF";
    let err = PdfParser::new().parse_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        PdfError::Structural {
            kind: StructuralErrorKind::MissingTrailerKey("Size"),
            ..
        }
    ));
}

#[test]
fn test_malformed_xref_flag_is_fatal() {
    let data = b"%PDF-1.4\n1 0 obj null endobj\nxref\n0 1\n0000000000 65535 x \n\
        trailer\n<< /Size 1 /Root 1 0 R >>\nstartxref\n30\n%%EOF";
    let err = PdfParser::new().parse_bytes(data).unwrap_err();
    match err {
        PdfError::Structural {
            kind: StructuralErrorKind::InvalidXrefEntry,
            object,
        } => assert_eq!(object, Some(ObjectId::new(0, 0))),
        other => panic!("expected xref entry error, got {}", other),
    }
}

#[test]
fn test_empty_xref_section_is_fatal() {
    let data =
        b"%PDF-1.4\nxref\ntrailer\n<< /Size 1 /Root 1 0 R >>\nstartxref\n9\n%%EOF";
    let err = PdfParser::new().parse_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        PdfError::Structural {
            kind: StructuralErrorKind::InvalidXrefSection,
            ..
        }
    ));
}

#[test]
fn test_stray_token_at_file_level() {
    let data = b"%PDF-1.4\n(a string does not belong here)\n";
    let err = PdfParser::new().parse_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        PdfError::Structural {
            kind: StructuralErrorKind::UnexpectedToken(_),
            ..
        }
    ));
}

#[test]
fn test_missing_eof_marker_is_tolerated() {
    let data = b"%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
        trailer\n<< /Size 2 /Root 1 0 R >>\nstartxref\n9\n";
    let document = PdfParser::new().parse_bytes(data).expect("parse");
    assert_eq!(document.objects().len(), 1);
}

#[test]
fn test_multiple_xref_subsections() {
    let data = b"%PDF-1.4\n1 0 obj null endobj\n7 0 obj null endobj\n\
        xref\n0 2\n0000000000 65535 f \n0000000009 00000 n \n\
        7 1\n0000000031 00000 n \n\
        trailer\n<< /Size 8 /Root 1 0 R >>\nstartxref\n53\n%%EOF";
    let document = PdfParser::new().parse_bytes(data).expect("parse");
    assert_eq!(document.xref().len(), 3);
    assert!(document.xref().get(7).unwrap().in_use);
}

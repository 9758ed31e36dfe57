use std::io::Cursor;

use stars_reader::StarsError;
use stars_reader::stars::format::dispatch::counted_header;
use stars_reader::stars::format::index::IndexStreamReader;
use stars_reader::stars::types::models::RecordKind;

fn index(text: &str) -> IndexStreamReader<Cursor<Vec<u8>>> {
    IndexStreamReader::new(Cursor::new(text.as_bytes().to_vec()), encoding_rs::UTF_8)
}

fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

#[test]
fn peek_does_not_consume() {
    let mut reader = index("TIME 1 0.0\nNCOMP 3\n");

    assert_eq!(reader.peek_keyword().expect("peek"), Some("TIME"));
    assert_eq!(reader.peek_keyword().expect("peek"), Some("TIME"));
    assert_eq!(reader.peek_tokens().expect("peek").map(<[String]>::len), Some(3));

    assert_eq!(reader.next_line_tokens().expect("next"), Some(tokens("TIME 1 0.0")));
    assert_eq!(reader.peek_keyword().expect("peek"), Some("NCOMP"));
}

#[test]
fn blank_lines_are_skipped_but_counted() {
    let mut reader = index("\n   \nNCOMP 3\n\n\t\nTIME 1 0.0");

    reader.next_line_tokens().expect("next");
    assert_eq!(reader.line_number(), 3);

    assert_eq!(reader.peek_keyword().expect("peek"), Some("TIME"));
    assert_eq!(reader.line_number(), 6);
    reader.next_line_tokens().expect("next");
    assert_eq!(reader.next_line_tokens().expect("next"), None);
    assert_eq!(reader.peek_keyword().expect("peek"), None);
}

#[test]
fn multi_line_record_joins_tokens_and_drops_terminator() {
    let mut reader = index("GRID-VALUE 1 0 ALL PRES\n  TEMP\nSG /\nTIME 2 1.0\n");

    let record = reader.read_record_until("/").expect("record");
    assert_eq!(record, tokens("GRID-VALUE 1 0 ALL PRES TEMP SG"));
    assert_eq!(reader.line_number(), 3);
    assert_eq!(reader.peek_keyword().expect("peek"), Some("TIME"));
}

#[test]
fn terminator_must_be_the_last_token_of_a_line() {
    let mut reader = index("WELL-REC a / b\nc /\n");
    let record = reader.read_record_until("/").expect("record");
    assert_eq!(record, tokens("WELL-REC a / b c"));
}

#[test]
fn missing_terminator_is_malformed() {
    let mut reader = index("\nWELL-REC 'PROD'\n'INJ'\n");

    match reader.read_record_until("/") {
        Err(StarsError::MalformedIndex { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn expect_line_at_end_of_stream_is_malformed() {
    let mut reader = index("OUTPUT-UNIT-TABLE\n");
    reader.expect_line("header").expect("header");
    let err = reader.expect_line("unit row").unwrap_err();
    assert!(matches!(err, StarsError::MalformedIndex { line: 1, .. }), "unexpected error: {:?}", err);
}

#[test]
fn rewind_restarts_from_first_line() {
    let mut reader = index("NCOMP 2\nTIME 1 0.0\n");
    reader.next_line_tokens().expect("next");
    reader.peek_keyword().expect("peek");

    reader.rewind().expect("rewind");
    assert_eq!(reader.line_number(), 0);
    assert_eq!(reader.peek_keyword().expect("peek"), Some("NCOMP"));
    assert_eq!(reader.line_number(), 1);
}

#[test]
fn invalid_utf8_is_replaced() {
    let mut reader = IndexStreamReader::new(Cursor::new(b"COMPNAME 'O\xff2'\n".to_vec()), encoding_rs::UTF_8);
    let line = reader.next_line_tokens().expect("next").expect("line");
    assert_eq!(line[1], "'O\u{FFFD}2'");
}

#[test]
fn keywords_map_to_record_kinds() {
    assert_eq!(RecordKind::from("TIME"), RecordKind::Time);
    assert_eq!(RecordKind::from("GRID"), RecordKind::GridStructure);
    assert_eq!(RecordKind::from("GRID-VALUE"), RecordKind::GridValue);
    assert_eq!(RecordKind::from("SPEC-HISTORY"), RecordKind::SpeciesHistory);
    assert_eq!(RecordKind::from("LAYER-ARRAY"), RecordKind::BinaryArray);
    assert_eq!(RecordKind::from("SECTOR-REC"), RecordKind::StructuralList);
    assert_eq!(RecordKind::from("RSTSPEC01-REC"), RecordKind::StructuralList);
    assert_eq!(RecordKind::from("RSTSPEC22-REC"), RecordKind::StructuralList);
    assert_eq!(RecordKind::from("RSTSPEC00-REC"), RecordKind::Unknown);
    assert_eq!(RecordKind::from("RSTSPEC23-REC"), RecordKind::Unknown);
    assert_eq!(RecordKind::from("RSTSPEC5-REC"), RecordKind::Unknown);
    assert_eq!(RecordKind::from("time"), RecordKind::Unknown);
    assert_eq!(RecordKind::from("SECTOR-ARRAY"), RecordKind::Unknown);
}

#[test]
fn counted_headers_are_recognized() {
    let count = |line: &str| counted_header(&tokens(line), 1).expect("count");
    assert_eq!(count("SECTOR-ARRAY ( 3 )"), Some(3));
    assert_eq!(count("X(2)"), Some(2));
    assert_eq!(count("FLUX-SECTOR (0)"), Some(0));
    assert_eq!(count("X 3"), None);
    assert_eq!(count("NOTE ( 3 ) trailing"), None);
}

#[test]
fn oversized_counted_header_is_invalid_field() {
    let err = counted_header(&tokens("SECTOR-ARRAY ( 99999999999999999999999 )"), 7).unwrap_err();
    match err {
        StarsError::InvalidField { line, keyword, field, value } => {
            assert_eq!(line, 7);
            assert_eq!(keyword, "SECTOR-ARRAY");
            assert_eq!(field, "block count");
            assert_eq!(value, "99999999999999999999999");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
